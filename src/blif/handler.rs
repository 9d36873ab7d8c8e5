use super::BlifHandler;
use crate::builder::NetBuilder;
use crate::cover::Cover;
use crate::error::Error;
use crate::location::Span;
use crate::network::BnNetwork;

#[derive(Debug, Clone)]
pub struct BlifReadOptions {
    /// Name of the input port that clocks every `.latch`.
    pub clock_name: String,
    /// Name of the input port driving the clear/preset of latches with a
    /// reset value.
    pub reset_name: String,
}

impl Default for BlifReadOptions {
    fn default() -> Self {
        Self {
            clock_name: "clock".to_string(),
            reset_name: "reset".to_string(),
        }
    }
}

/// Builds a [`BnNetwork`] from BLIF statements.
///
/// `.names` become expression nodes (downgraded to primitives where
/// possible), `.gate` becomes a cell node, and `.latch` becomes a DFF whose
/// clock is the implicit clock input. A reset value of `0` gives the DFF a
/// clear terminal and `1` a preset terminal, both driven by the implicit
/// reset input.
pub struct BnBlifHandler<'n> {
    builder: NetBuilder<'n>,
    options: BlifReadOptions,
}

impl<'n> BnBlifHandler<'n> {
    pub fn new(network: &'n mut BnNetwork, options: &BlifReadOptions) -> Self {
        Self {
            builder: NetBuilder::new(network),
            options: options.clone(),
        }
    }
}

impl BlifHandler for BnBlifHandler<'_> {
    fn init(&mut self) -> Result<(), Error> {
        self.builder.clear();
        Ok(())
    }

    fn model(&mut self, _span: Span, name: &str) -> Result<(), Error> {
        self.builder.network().set_name(name);
        Ok(())
    }

    fn inputs_elem(&mut self, id: usize, name: &str) -> Result<(), Error> {
        self.builder.new_input(id, name);
        Ok(())
    }

    fn outputs_elem(&mut self, id: usize, name: &str) -> Result<(), Error> {
        let node = self.builder.network().new_output(name);
        self.builder.add_fanins(node, vec![id]);
        Ok(())
    }

    fn names(&mut self, id: usize, name: &str, fanins: &[usize], cover: &Cover) -> Result<(), Error> {
        let node = self.builder.network().new_expr(name, fanins.len(), cover.expr());
        self.builder.define(id, node);
        self.builder.add_fanins(node, fanins.to_vec());
        Ok(())
    }

    fn gate(&mut self, id: usize, name: &str, fanins: &[usize], cell_id: usize) -> Result<(), Error> {
        let node = self.builder.network().new_cell_logic(name, cell_id)?;
        self.builder.define(id, node);
        self.builder.add_fanins(node, fanins.to_vec());
        Ok(())
    }

    fn latch(&mut self, id: usize, name: &str, fanin: usize, _span: Span, reset: Option<bool>) -> Result<(), Error> {
        let has_clear = reset == Some(false);
        let has_preset = reset == Some(true);
        let dff_id = self.builder.network().new_dff(name, has_clear, has_preset);
        let dff = self.builder.network().dff(dff_id).clone();

        self.builder.define(id, dff.data_out());
        self.builder.add_fanins(dff.data_in(), vec![fanin]);

        let clock = self.builder.implicit_input(&self.options.clock_name);
        self.builder.network().connect(clock, dff.clock(), 0);
        if let Some(term) = dff.clear().or(dff.preset()) {
            let reset = self.builder.implicit_input(&self.options.reset_name);
            self.builder.network().connect(reset, term, 0);
        }
        Ok(())
    }

    fn end(&mut self, _span: Span) -> Result<(), Error> {
        self.builder.finish(|sym| format!("#{}", sym))
    }

    fn error_exit(&mut self) {
        self.builder.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::blif::{read_blif_str, BlifReadOptions};
    use crate::cell::{Cell, CellLibrary};
    use crate::error::Error;
    use crate::expr::Expr;
    use crate::prim::PrimType;
    use test_log::test;

    fn read(text: &str) -> Result<crate::network::BnNetwork, Error> {
        read_blif_str(text, "test.blif", None, &BlifReadOptions::default())
    }

    #[test]
    fn test_and_gate() {
        let net = read(".model m\n.inputs a b\n.outputs y\n.names a b y\n11 1\n.end\n").unwrap();
        assert!(net.is_sane());
        assert_eq!(net.name(), "m");
        assert_eq!(net.primary_inputs().len(), 2);
        assert_eq!(net.primary_outputs().len(), 1);
        assert_eq!(net.logic_list().len(), 1);
        let y = net.node(net.logic_list()[0]);
        assert_eq!(y.name(), "y");
        assert_eq!(y.primitive_type(), Some(PrimType::And));
        let names: Vec<&str> = y.fanins().map(|id| net.node(id).name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_complex_cover_is_expr() {
        let text = ".model m\n.inputs a b c\n.outputs y\n.names a b c y\n11- 1\n--1 1\n.end\n";
        let net = read(text).unwrap();
        let y = net.node(net.logic_list()[0]);
        assert_eq!(y.expr_id(), Some(0));
        assert_eq!(net.expr_num(), 1);
    }

    #[test]
    fn test_latches_share_clock_and_reset() {
        let text = ".model m\n.inputs d e\n.outputs q r\n.latch d q 0\n.latch e r 1\n.latch q s\n.end\n";
        let net = read(text).unwrap();
        assert_eq!(net.dff_num(), 3);
        let names: Vec<&str> = net.primary_inputs().iter().map(|&id| net.node(id).name()).collect();
        assert_eq!(names, vec!["d", "e", "clock", "reset"]);
        let dffs = net.dffs();
        assert!(dffs[0].clear().is_some() && dffs[0].preset().is_none());
        assert!(dffs[1].preset().is_some() && dffs[1].clear().is_none());
        assert!(dffs[2].clear().is_none() && dffs[2].preset().is_none());
        let clock = net.primary_inputs()[2];
        assert!(dffs.iter().all(|d| net.output_src(d.clock()) == Some(clock)));
        assert_eq!(net.output_src(net.primary_outputs()[0]), Some(dffs[0].data_out()));
    }

    #[test]
    fn test_declared_clock_is_reused() {
        let text = ".model m\n.inputs clock d\n.outputs q\n.latch d q\n.end\n";
        let net = read(text).unwrap();
        assert_eq!(net.primary_inputs().len(), 2);
    }

    #[test]
    fn test_gate_builds_cell_node() {
        let mut lib = CellLibrary::new("lib");
        lib.add_cell(Cell::logic(
            "AOI21",
            &["A", "B", "C"],
            "Y",
            !Expr::or(vec![Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]), Expr::posi_literal(2)]),
        ));
        let text = ".model m\n.inputs a b c\n.outputs y\n.gate AOI21 A=a B=b C=c Y=y\n.end\n";
        let net = read_blif_str(text, "t", Some(&lib), &BlifReadOptions::default()).unwrap();
        let y = net.node(net.logic_list()[0]);
        assert_eq!(y.cell_id(), Some(0));
        assert_eq!(net.library().map(|l| l.name()), Some("lib"));
    }

    #[test]
    fn test_redefinition_fails() {
        let err = read(".model m\n.inputs a\n.outputs y\n.names y a\n1 1\n.end\n").unwrap_err();
        assert!(err.has_label("MLTDEF01"));
    }

    #[test]
    fn test_combinational_loop_is_structural() {
        let text = ".model m\n.inputs a\n.outputs y\n.names a t y\n11 1\n.names y t\n0 1\n.end\n";
        match read(text) {
            Err(Error::Structural(diags)) => assert_eq!(diags.len(), 2),
            other => panic!("unexpected result: {:?}", other.map(|n| n.node_num())),
        }
    }
}
