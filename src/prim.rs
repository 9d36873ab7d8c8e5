//! Built-in gate types and truth-table classification.

use std::fmt;

use crate::expr::Expr;
use crate::tvfunc::TvFunc;

/// Largest input count for which functions are classified and deduplicated.
pub const MAX_ANALYZE_INPUTS: usize = 10;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimType {
    C0,
    C1,
    Buff,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
}

impl PrimType {
    pub const ALL: [PrimType; 10] = [
        PrimType::C0,
        PrimType::C1,
        PrimType::Buff,
        PrimType::Not,
        PrimType::And,
        PrimType::Nand,
        PrimType::Or,
        PrimType::Nor,
        PrimType::Xor,
        PrimType::Xnor,
    ];

    /// Returns `true` if a gate of this type may have `n` inputs.
    pub fn accepts_arity(self, n: usize) -> bool {
        match self {
            PrimType::C0 | PrimType::C1 => n == 0,
            PrimType::Buff | PrimType::Not => n == 1,
            _ => n >= 1,
        }
    }

    /// The complemented gate type.
    pub fn negated(self) -> PrimType {
        match self {
            PrimType::C0 => PrimType::C1,
            PrimType::C1 => PrimType::C0,
            PrimType::Buff => PrimType::Not,
            PrimType::Not => PrimType::Buff,
            PrimType::And => PrimType::Nand,
            PrimType::Nand => PrimType::And,
            PrimType::Or => PrimType::Nor,
            PrimType::Nor => PrimType::Or,
            PrimType::Xor => PrimType::Xnor,
            PrimType::Xnor => PrimType::Xor,
        }
    }

    /// Returns `true` for the types whose output is complemented
    /// with respect to their positive form.
    pub fn is_inverted(self) -> bool {
        matches!(self, PrimType::C1 | PrimType::Not | PrimType::Nand | PrimType::Nor | PrimType::Xnor)
    }

    pub fn eval(self, inputs: &[bool]) -> bool {
        let v = match self.positive() {
            PrimType::C0 => false,
            PrimType::Buff => inputs[0],
            PrimType::And => inputs.iter().all(|&x| x),
            PrimType::Or => inputs.iter().any(|&x| x),
            _ => inputs.iter().filter(|&&x| x).count() % 2 == 1,
        };
        v != self.is_inverted()
    }

    /// Positive form: `C0`, `Buff`, `And`, `Or` or `Xor`.
    pub fn positive(self) -> PrimType {
        if self.is_inverted() {
            self.negated()
        } else {
            self
        }
    }

    pub fn make_expr(self, input_num: usize) -> Expr {
        let lits = (0..input_num).map(Expr::posi_literal);
        let e = match self.positive() {
            PrimType::C0 => Expr::zero(),
            PrimType::Buff => Expr::posi_literal(0),
            PrimType::And => Expr::and(lits),
            PrimType::Or => Expr::or(lits),
            _ => Expr::xor(lits),
        };
        if self.is_inverted() {
            !e
        } else {
            e
        }
    }

    pub fn make_tv(self, input_num: usize) -> TvFunc {
        TvFunc::from_fn(input_num, |p| {
            let inputs: Vec<bool> = (0..input_num).map(|i| (p >> i) & 1 == 1).collect();
            self.eval(&inputs)
        })
    }

    /// Gate keyword as used by `.bench` files.
    pub fn bench_name(self) -> &'static str {
        match self {
            PrimType::C0 => "CONST0",
            PrimType::C1 => "CONST1",
            PrimType::Buff => "BUFF",
            PrimType::Not => "NOT",
            PrimType::And => "AND",
            PrimType::Nand => "NAND",
            PrimType::Or => "OR",
            PrimType::Nor => "NOR",
            PrimType::Xor => "XOR",
            PrimType::Xnor => "XNOR",
        }
    }
}

impl fmt::Display for PrimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimType::C0 => "C0",
            PrimType::C1 => "C1",
            PrimType::Buff => "Buff",
            PrimType::Not => "Not",
            PrimType::And => "And",
            PrimType::Nand => "Nand",
            PrimType::Or => "Or",
            PrimType::Nor => "Nor",
            PrimType::Xor => "Xor",
            PrimType::Xnor => "Xnor",
        };
        write!(f, "{}", s)
    }
}

/// Detects a built-in gate type with exactly the function of `tv`.
///
/// Constants are only recognized for 0 inputs, buffers and inverters only for
/// 1 input; functions with more than [`MAX_ANALYZE_INPUTS`] inputs are never
/// classified.
pub fn analyze_tv(tv: &TvFunc) -> Option<PrimType> {
    let ni = tv.input_num();
    if ni > MAX_ANALYZE_INPUTS {
        return None;
    }
    if ni == 0 {
        return Some(if tv.value(0) { PrimType::C1 } else { PrimType::C0 });
    }
    let row_num = tv.row_num();
    let val_0 = tv.value(0);
    let val_1 = tv.value(row_num - 1);
    if ni == 1 {
        return match (val_0, val_1) {
            (false, true) => Some(PrimType::Buff),
            (true, false) => Some(PrimType::Not),
            _ => None,
        };
    }

    let middle = || (1..row_num - 1).map(|p| tv.value(p));
    match (val_0, val_1) {
        (false, true) => {
            if middle().all(|v| v) {
                return Some(PrimType::Or);
            }
            if middle().all(|v| !v) {
                return Some(PrimType::And);
            }
        }
        (true, false) => {
            if middle().all(|v| v) {
                return Some(PrimType::Nand);
            }
            if middle().all(|v| !v) {
                return Some(PrimType::Nor);
            }
        }
        _ => {}
    }

    let odd = |p: usize| p.count_ones() % 2 == 1;
    if (0..row_num).all(|p| tv.value(p) == odd(p)) {
        return Some(PrimType::Xor);
    }
    if (0..row_num).all(|p| tv.value(p) != odd(p)) {
        return Some(PrimType::Xnor);
    }
    None
}

/// Classifies an expression over `input_num` inputs through its truth table.
pub fn analyze_expr(expr: &Expr, input_num: usize) -> Option<PrimType> {
    if input_num > MAX_ANALYZE_INPUTS {
        return None;
    }
    analyze_tv(&expr.make_tv(input_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_make_tv_roundtrip() {
        for n in 0..=4 {
            for &t in PrimType::ALL.iter().filter(|t| t.accepts_arity(n)) {
                if n == 1 && !matches!(t, PrimType::Buff | PrimType::Not) {
                    // 1-input AND/OR/XOR are buffers; NAND/NOR/XNOR are inverters.
                    continue;
                }
                assert_eq!(analyze_tv(&t.make_tv(n)), Some(t), "{} with {} inputs", t, n);
                assert_eq!(analyze_expr(&t.make_expr(n), n), Some(t), "{} expr with {} inputs", t, n);
            }
        }
    }

    #[test]
    fn test_semantic_match() {
        // ~(~a | ~b) is an AND even though it is written as a NOR of complements.
        let e = !Expr::or(vec![Expr::nega_literal(0), Expr::nega_literal(1)]);
        assert_eq!(analyze_expr(&e, 2), Some(PrimType::And));
        // a & ~b is not a built-in type.
        let e = Expr::and(vec![Expr::posi_literal(0), Expr::nega_literal(1)]);
        assert_eq!(analyze_expr(&e, 2), None);
    }

    #[test]
    fn test_constant_with_inputs_is_not_primitive() {
        assert_eq!(analyze_tv(&TvFunc::zero(2)), None);
        assert_eq!(analyze_tv(&TvFunc::one(1)), None);
    }

    #[test]
    fn test_wide_function_not_analyzed() {
        let tv = PrimType::And.make_tv(11);
        assert_eq!(analyze_tv(&tv), None);
    }

    #[test]
    fn test_eval() {
        assert!(PrimType::Nand.eval(&[true, false]));
        assert!(!PrimType::Nand.eval(&[true, true]));
        assert!(PrimType::Xnor.eval(&[true, true, false, false]));
        assert!(PrimType::C1.eval(&[]));
        assert_eq!(PrimType::Nor.negated(), PrimType::Or);
    }
}
