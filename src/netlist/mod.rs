//! Structural gate-level netlist front end.
//!
//! Accepts a single module built from Verilog gate primitives:
//!
//! ```text
//! module top(a, b, y);
//!   input a, b;
//!   output y;
//!   wire t;
//!   nand g1(t, a, b);   // first terminal is the output
//!   not (y, t);         // instance name is optional
//! endmodule
//! ```
//!
//! Gate inputs may be the constants `1'b0` and `1'b1`.

mod parser;
mod scanner;

use std::path::Path;

pub use parser::NetlistParser;
pub use scanner::{NetlistScanner, NetlistToken};

use crate::error::Error;
use crate::network::BnNetwork;

pub fn read_netlist(path: impl AsRef<Path>) -> Result<BnNetwork, Error> {
    NetlistParser::new().read(path)
}

/// Reads netlist text. `source` names the text in diagnostics.
pub fn read_netlist_str(text: &str, source: &str) -> Result<BnNetwork, Error> {
    NetlistParser::new().read_str(text, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prim::PrimType;
    use test_log::test;

    fn labels(err: &Error) -> Vec<&'static str> {
        err.diagnostics().iter().map(|d| d.label).collect()
    }

    #[test]
    fn test_read_module() {
        let text = "// half adder\nmodule ha(a, b, s, c);\n  input a, b;\n  output s, c;\n  wire t;\n  xor x1(s, a, b);\n  and (c, a, b);\nendmodule\n";
        let net = read_netlist_str(text, "ha.v").unwrap();
        assert!(net.is_sane());
        assert_eq!(net.name(), "ha");
        assert_eq!(net.primary_inputs().len(), 2);
        assert_eq!(net.primary_outputs().len(), 2);
        let prims: Vec<_> = net.logic_list().iter().map(|&id| net.node(id).primitive_type()).collect();
        assert_eq!(prims, vec![Some(PrimType::Xor), Some(PrimType::And)]);
    }

    #[test]
    fn test_forward_reference_and_constants() {
        let text = "module m(a, y);\ninput a;\noutput y;\nnot (y, t);\nand (t, a, 1'b1, 1'b1);\nendmodule";
        let net = read_netlist_str(text, "m.v").unwrap();
        // one shared constant, the AND, the NOT
        assert_eq!(net.logic_list().len(), 3);
        let and = net.node(net.logic_list()[1]);
        assert_eq!(and.primitive_type(), Some(PrimType::And));
        assert_eq!(and.fanin(1), and.fanin(2));
        assert_eq!(net.node(net.logic_list()[0]).primitive_type(), Some(PrimType::C1));
    }

    #[test]
    fn test_reports_every_error() {
        let text = "module m(a, b, y, z);\n\
                    input a;\n\
                    input b;\n\
                    output y;\n\
                    and (y, a, b;\n\
                    foo (y, a);\n\
                    not (y, b);\n\
                    buf (1'b0, a);\n\
                    or (w, a, q);\n\
                    endmodule\n";
        let err = read_netlist_str(text, "m.v").unwrap_err();
        assert_eq!(labels(&err), vec!["SYN03", "SYN04", "CONST01", "PORT01", "UNDEF01"]);
        let last = err.diagnostics().last().unwrap();
        assert_eq!(last.message, "q: Undefined.");
        assert_eq!(last.span.map(|s| s.to_string()), Some("9:11".to_string()));
    }

    #[test]
    fn test_redefinition() {
        let text = "module m(a, y);\ninput a;\noutput y;\nnot (y, a);\nbuf (y, a);\nendmodule\n";
        let err = read_netlist_str(text, "m.v").unwrap_err();
        assert_eq!(labels(&err), vec!["MLTDEF01"]);
        assert_eq!(err.diagnostics()[0].message, "y: Defined more than once. Previous definition is at 4:6.");
    }

    #[test]
    fn test_missing_endmodule() {
        let err = read_netlist_str("module m(a);\ninput a;\n", "m.v").unwrap_err();
        assert_eq!(labels(&err), vec!["SYN05"]);
    }

    #[test]
    fn test_arity() {
        let text = "module m(a, y);\ninput a;\noutput y;\nnot (y, a, a);\nendmodule\n";
        let err = read_netlist_str(text, "m.v").unwrap_err();
        assert_eq!(labels(&err), vec!["ARITY01", "UNDEF01"]);
    }
}
