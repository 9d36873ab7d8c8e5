use super::Iscas89Handler;
use crate::builder::NetBuilder;
use crate::error::Error;
use crate::expr::Expr;
use crate::location::Span;
use crate::network::BnNetwork;
use crate::prim::PrimType;

use super::parser::mux_select_num;

/// Name given to networks read from `.bench` files.
pub const DEFAULT_NETWORK_NAME: &str = "iscas89_network";

#[derive(Debug, Clone)]
pub struct Iscas89ReadOptions {
    /// Name of the input port that clocks every `DFF`.
    pub clock_name: String,
}

impl Default for Iscas89ReadOptions {
    fn default() -> Self {
        Self {
            clock_name: "clock".to_string(),
        }
    }
}

/// Builds a [`BnNetwork`] from `.bench` statements.
pub struct BnIscas89Handler<'n> {
    builder: NetBuilder<'n>,
    options: Iscas89ReadOptions,
}

impl<'n> BnIscas89Handler<'n> {
    pub fn new(network: &'n mut BnNetwork, options: &Iscas89ReadOptions) -> Self {
        Self {
            builder: NetBuilder::new(network),
            options: options.clone(),
        }
    }
}

/// `n` select inputs pick data input `p` when bit `i` of `p` equals select
/// `i`.
fn mux_expr(select_num: usize) -> Expr {
    let data_num = 1 << select_num;
    Expr::or((0..data_num).map(|p| {
        let mut lits: Vec<Expr> = (0..select_num).map(|i| Expr::literal(i, (p >> i) & 1 == 0)).collect();
        lits.push(Expr::posi_literal(select_num + p));
        Expr::and(lits)
    }))
}

impl Iscas89Handler for BnIscas89Handler<'_> {
    fn init(&mut self) -> Result<(), Error> {
        self.builder.clear();
        self.builder.network().set_name(DEFAULT_NETWORK_NAME);
        Ok(())
    }

    fn read_input(&mut self, _span: Span, id: usize, name: &str) -> Result<(), Error> {
        self.builder.new_input(id, name);
        Ok(())
    }

    fn read_output(&mut self, _span: Span, id: usize, name: &str) -> Result<(), Error> {
        let node = self.builder.network().new_output(name);
        self.builder.add_fanins(node, vec![id]);
        Ok(())
    }

    fn read_gate(&mut self, _span: Span, id: usize, name: &str, prim: PrimType, fanins: &[usize]) -> Result<(), Error> {
        let node = self.builder.network().new_primitive(name, fanins.len(), prim);
        self.builder.define(id, node);
        self.builder.add_fanins(node, fanins.to_vec());
        Ok(())
    }

    fn read_mux(&mut self, _span: Span, id: usize, name: &str, fanins: &[usize]) -> Result<(), Error> {
        let select_num = mux_select_num(fanins.len())
            .ok_or_else(|| Error::Handler(format!("{}: Wrong # of inputs for MUX-type.", name)))?;
        let node = self.builder.network().new_expr(name, fanins.len(), mux_expr(select_num));
        self.builder.define(id, node);
        self.builder.add_fanins(node, fanins.to_vec());
        Ok(())
    }

    fn read_dff(&mut self, _span: Span, id: usize, name: &str, fanin: usize) -> Result<(), Error> {
        let dff_id = self.builder.network().new_dff(name, false, false);
        let dff = self.builder.network().dff(dff_id).clone();
        self.builder.define(id, dff.data_out());
        self.builder.add_fanins(dff.data_in(), vec![fanin]);
        let clock = self.builder.implicit_input(&self.options.clock_name);
        self.builder.network().connect(clock, dff.clock(), 0);
        Ok(())
    }

    fn end(&mut self) -> Result<(), Error> {
        self.builder.finish(|sym| format!("#{}", sym))
    }

    fn error_exit(&mut self) {
        self.builder.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iscas89::read_iscas89_str;
    use test_log::test;

    fn read(text: &str) -> Result<BnNetwork, Error> {
        read_iscas89_str(text, "test.bench", &Iscas89ReadOptions::default())
    }

    #[test]
    fn test_and_gate() {
        let net = read("INPUT(a)\nINPUT(b)\nc = AND(a,b)\nOUTPUT(c)\n").unwrap();
        assert!(net.is_sane());
        assert_eq!(net.name(), DEFAULT_NETWORK_NAME);
        assert_eq!(net.primary_inputs().len(), 2);
        assert_eq!(net.primary_outputs().len(), 1);
        assert_eq!(net.logic_list().len(), 1);
        let c = net.node(net.logic_list()[0]);
        assert_eq!(c.primitive_type(), Some(PrimType::And));
        assert_eq!(net.output_src(net.primary_outputs()[0]), Some(c.id()));
    }

    #[test]
    fn test_mux_function() {
        let e = mux_expr(2);
        for p in 0..64usize {
            let inputs: Vec<bool> = (0..6).map(|i| (p >> i) & 1 == 1).collect();
            let sel = p & 3;
            assert_eq!(e.eval(&inputs), inputs[2 + sel], "pattern {:06b}", p);
        }
        let e = mux_expr(0);
        assert!(e.eval(&[true]) && !e.eval(&[false]));
    }

    #[test]
    fn test_dff_gets_clock() {
        let text = "INPUT(d)\nOUTPUT(q)\nq = DFF(n)\nn = NOT(q)\nz = XOR(d, q)\nOUTPUT(z)\n";
        let net = read(text).unwrap();
        assert_eq!(net.dff_num(), 1);
        let names: Vec<&str> = net.primary_inputs().iter().map(|&id| net.node(id).name()).collect();
        assert_eq!(names, vec!["d", "clock"]);
        let dff = &net.dffs()[0];
        assert_eq!(net.output_src(dff.clock()), Some(net.primary_inputs()[1]));
        let n = net.output_src(dff.data_in()).unwrap();
        assert_eq!(net.node(n).primitive_type(), Some(PrimType::Not));
        assert_eq!(net.node(n).fanin(0), Some(dff.data_out()));
    }

    #[test]
    fn test_undefined_fanin_fails() {
        let err = read("INPUT(a)\nOUTPUT(b)\nb = AND(a, c)\n").unwrap_err();
        assert!(err.has_label("UNDEF01"));
    }
}
