use super::{Aig, AigLit};
use crate::error::Error;
use crate::expr::Expr;
use crate::network::{BnNetwork, LogicKind};
use crate::prim::PrimType;
use crate::tvfunc::TvFunc;

/// Lowers logic functions into two-input AND gates of an [`Aig`].
///
/// Multi-input operators are split by bisection so the depth stays
/// logarithmic in the operand count.
pub struct AigEncoder<'a> {
    aig: &'a mut Aig,
}

impl<'a> AigEncoder<'a> {
    pub fn new(aig: &'a mut Aig) -> Self {
        Self { aig }
    }

    pub fn make_and(&mut self, lits: &[AigLit]) -> AigLit {
        self.and_range(lits, false)
    }

    /// OR by De Morgan: AND of the complemented operands, complemented.
    pub fn make_or(&mut self, lits: &[AigLit]) -> AigLit {
        !self.and_range(lits, true)
    }

    pub fn make_xor(&mut self, lits: &[AigLit]) -> AigLit {
        assert!(!lits.is_empty(), "XOR needs at least one operand");
        if lits.len() == 1 {
            return lits[0];
        }
        let half = lits.len() / 2;
        let a = self.make_xor(&lits[..half]);
        let b = self.make_xor(&lits[half..]);
        let t1 = self.aig.make_and(a, b);
        let t2 = self.aig.make_and(!a, !b);
        self.aig.make_and(!t1, !t2)
    }

    pub fn make_prim(&mut self, prim: PrimType, lits: &[AigLit]) -> AigLit {
        let lit = match prim.positive() {
            PrimType::C0 => AigLit::zero(),
            PrimType::Buff => lits[0],
            PrimType::And => self.make_and(lits),
            PrimType::Or => self.make_or(lits),
            _ => self.make_xor(lits),
        };
        lit ^ prim.is_inverted()
    }

    /// `lits[i]` is the literal of expression input `i`.
    pub fn make_expr(&mut self, expr: &Expr, lits: &[AigLit]) -> AigLit {
        match expr {
            Expr::Zero => AigLit::zero(),
            Expr::One => AigLit::one(),
            &Expr::Literal(var, inv) => lits[var] ^ inv,
            Expr::And(ops) | Expr::Or(ops) | Expr::Xor(ops) => {
                let children: Vec<AigLit> = ops.iter().map(|e| self.make_expr(e, lits)).collect();
                match expr {
                    Expr::And(_) => self.make_and(&children),
                    Expr::Or(_) => self.make_or(&children),
                    _ => self.make_xor(&children),
                }
            }
        }
    }

    /// Sum of minterms.
    pub fn make_tv(&mut self, tv: &TvFunc, lits: &[AigLit]) -> AigLit {
        let ni = tv.input_num();
        let minterms: Vec<AigLit> = tv
            .minterms()
            .map(|p| {
                let cube: Vec<AigLit> = (0..ni).map(|i| lits[i] ^ ((p >> i) & 1 == 0)).collect();
                if cube.is_empty() {
                    AigLit::one()
                } else {
                    self.make_and(&cube)
                }
            })
            .collect();
        if minterms.is_empty() {
            AigLit::zero()
        } else {
            self.make_or(&minterms)
        }
    }

    fn and_range(&mut self, lits: &[AigLit], inv: bool) -> AigLit {
        assert!(!lits.is_empty(), "AND needs at least one operand");
        if lits.len() == 1 {
            return lits[0] ^ inv;
        }
        let half = lits.len() / 2;
        let a = self.and_range(&lits[..half], inv);
        let b = self.and_range(&lits[half..], inv);
        self.aig.make_and(a, b)
    }
}

impl BnNetwork {
    /// Lowers this network into an AIG.
    ///
    /// Primary inputs become AIG inputs in order (implicit clock and reset
    /// ports included), each DFF becomes a latch fed by its data-in source,
    /// and primary outputs become AIG outputs. Input, latch and output
    /// symbols carry the node and DFF names.
    ///
    /// Fails with [`Error::NotSane`] before `wrap_up`, and with
    /// [`Error::Handler`] if the network has latches or a cell node without
    /// a logic function.
    pub fn to_aig(&self) -> Result<Aig, Error> {
        if !self.is_sane() {
            return Err(Error::NotSane);
        }
        if self.latch_num() > 0 {
            return Err(Error::Handler(format!(
                "{}: {} latch(es) cannot be written as AIG",
                self.name(),
                self.latch_num()
            )));
        }

        let inputs = self.primary_inputs();
        let mut aig = Aig::new(inputs.len(), self.dff_num());
        let mut lits: Vec<Option<AigLit>> = vec![None; self.node_num()];
        for (i, &id) in inputs.iter().enumerate() {
            lits[id.index()] = Some(aig.input(i));
        }
        for (i, dff) in self.dffs().iter().enumerate() {
            lits[dff.data_out().index()] = Some(aig.latch(i));
        }

        let lit_of = |lits: &[Option<AigLit>], id: crate::types::NodeId| -> AigLit {
            // `wrap_up` guarantees every source is emitted before its readers.
            lits[id.index()].unwrap_or_else(|| panic!("node {} has no literal", id))
        };

        {
            let mut enc = AigEncoder::new(&mut aig);
            for &id in self.logic_list() {
                let node = self.node(id);
                let fanins: Vec<AigLit> = node.fanins().map(|src| lit_of(&lits, src)).collect();
                let lit = match node.logic_kind() {
                    Some(LogicKind::Primitive(prim)) => enc.make_prim(prim, &fanins),
                    Some(LogicKind::Expr(e)) => enc.make_expr(self.expr(e), &fanins),
                    Some(LogicKind::TvFunc(t)) => enc.make_tv(self.tv(t), &fanins),
                    Some(LogicKind::Cell(_)) => {
                        let expr = self.logic_expr(id).ok_or_else(|| {
                            Error::Handler(format!("{}: cell has no logic function", node.name()))
                        })?;
                        enc.make_expr(&expr, &fanins)
                    }
                    None => unreachable!("logic list holds logic nodes only"),
                };
                lits[id.index()] = Some(lit);
            }
        }

        for (i, dff) in self.dffs().iter().enumerate() {
            if let Some(src) = self.output_src(dff.data_in()) {
                aig.set_latch_next(i, lit_of(&lits, src));
            }
            if !dff.name().is_empty() {
                aig.set_latch_symbol(i, dff.name());
            }
        }
        for &id in self.primary_outputs() {
            let src = self.output_src(id).map_or(AigLit::zero(), |src| lit_of(&lits, src));
            let pos = aig.add_output(src);
            let name = self.node(id).name();
            if !name.is_empty() {
                aig.set_output_symbol(pos, name);
            }
        }
        for (i, &id) in inputs.iter().enumerate() {
            let name = self.node(id).name();
            if !name.is_empty() {
                aig.set_input_symbol(i, name);
            }
        }

        log::debug!(
            "to_aig '{}': {} input(s), {} latch(es), {} output(s), {} AND gate(s)",
            self.name(),
            aig.input_num(),
            aig.latch_num(),
            aig.output_num(),
            aig.and_num()
        );
        Ok(aig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn exhaustive(aig: &Aig, f: impl Fn(&[bool]) -> bool) {
        let n = aig.input_num();
        for p in 0..(1usize << n) {
            let inputs: Vec<bool> = (0..n).map(|i| (p >> i) & 1 == 1).collect();
            let (out, _) = aig.eval(&inputs, &[]);
            assert_eq!(out[0], f(&inputs), "pattern {:b}", p);
        }
    }

    fn single_gate(n: usize, build: impl FnOnce(&mut AigEncoder, &[AigLit]) -> AigLit) -> Aig {
        let mut aig = Aig::new(n, 0);
        let lits: Vec<AigLit> = (0..n).map(|i| aig.input(i)).collect();
        let out = build(&mut AigEncoder::new(&mut aig), &lits);
        aig.add_output(out);
        aig
    }

    #[test]
    fn test_and_bisects() {
        let aig = single_gate(5, |e, l| e.make_and(l));
        assert_eq!(aig.and_num(), 4);
        exhaustive(&aig, |x| x.iter().all(|&b| b));
        // (i0 i1) (i2 (i3 i4)): the last gate joins both halves
        let last = aig.and_srcs(3);
        assert_eq!(last, (aig.and_lit(2), aig.and_lit(0)));
    }

    #[test]
    fn test_or_and_nor() {
        let aig = single_gate(3, |e, l| e.make_or(l));
        exhaustive(&aig, |x| x.iter().any(|&b| b));
        let aig = single_gate(3, |e, l| e.make_prim(PrimType::Nor, l));
        exhaustive(&aig, |x| !x.iter().any(|&b| b));
    }

    #[test]
    fn test_xor_uses_three_ands() {
        let aig = single_gate(2, |e, l| e.make_xor(l));
        assert_eq!(aig.and_num(), 3);
        exhaustive(&aig, |x| x[0] ^ x[1]);

        let aig = single_gate(5, |e, l| e.make_prim(PrimType::Xnor, l));
        assert_eq!(aig.and_num(), 12);
        exhaustive(&aig, |x| x.iter().filter(|&&b| b).count() % 2 == 0);
    }

    #[test]
    fn test_expr_and_tv() {
        let expr = Expr::or(vec![
            Expr::and(vec![Expr::posi_literal(0), Expr::nega_literal(1)]),
            Expr::xor(vec![Expr::posi_literal(1), Expr::posi_literal(2)]),
        ]);
        let aig = single_gate(3, |e, l| e.make_expr(&expr, l));
        exhaustive(&aig, |x| expr.eval(x));

        let tv = expr.make_tv(3);
        let aig = single_gate(3, |e, l| e.make_tv(&tv, l));
        exhaustive(&aig, |x| tv.eval(x));

        let aig = single_gate(2, |e, l| e.make_tv(&TvFunc::zero(2), l));
        assert_eq!(aig.output(0), AigLit::zero());
        assert_eq!(aig.and_num(), 0);
    }

    #[test]
    fn test_constants_and_buffers() {
        let aig = single_gate(1, |e, l| e.make_prim(PrimType::C1, l));
        assert_eq!(aig.output(0), AigLit::one());
        let aig = single_gate(1, |e, l| e.make_prim(PrimType::Not, l));
        assert_eq!(aig.output(0), !aig.input(0));
        assert_eq!(aig.and_num(), 0);
    }

    #[test]
    fn test_network_not_sane() {
        let mut net = BnNetwork::new();
        net.new_input("a");
        assert!(matches!(net.to_aig(), Err(Error::NotSane)));
    }

    #[test]
    fn test_network_with_dff() {
        let mut net = BnNetwork::new();
        let a = net.new_input("a");
        let clk = net.new_input("clock");
        let d = net.new_dff("q", false, false);
        let dff = net.dff(d).clone();
        let x = net.new_primitive("x", 2, PrimType::Xor);
        net.connect(a, x, 0);
        net.connect(dff.data_out(), x, 1);
        net.connect(x, dff.data_in(), 0);
        net.connect(clk, dff.clock(), 0);
        let o = net.new_output("o");
        net.connect(dff.data_out(), o, 0);
        net.wrap_up().unwrap();

        let aig = net.to_aig().unwrap();
        assert_eq!((aig.input_num(), aig.latch_num(), aig.output_num(), aig.and_num()), (2, 1, 1, 3));
        assert_eq!(aig.latch_next(0), aig.and_lit(2));
        assert_eq!(aig.output(0), aig.latch(0));
        assert_eq!(aig.input_symbol(1), Some("clock"));
        assert_eq!(aig.latch_symbol(0), Some("q"));
        assert_eq!(aig.output_symbol(0), Some("o"));
    }
}
