//! Boolean expressions over numbered inputs.

use std::fmt;
use std::ops::Not;

use crate::tvfunc::TvFunc;

/// A Boolean expression tree.
///
/// Constructors keep the tree in a light normal form: nested operators of the
/// same kind are flattened, constants are absorbed, and single-operand
/// operators collapse to their operand.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr {
    Zero,
    One,
    /// Input `var`, complemented when the flag is set.
    Literal(usize, bool),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
}

// Constructors
impl Expr {
    pub fn zero() -> Self {
        Expr::Zero
    }

    pub fn one() -> Self {
        Expr::One
    }

    pub fn literal(var: usize, inv: bool) -> Self {
        Expr::Literal(var, inv)
    }

    pub fn posi_literal(var: usize) -> Self {
        Expr::Literal(var, false)
    }

    pub fn nega_literal(var: usize) -> Self {
        Expr::Literal(var, true)
    }

    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for e in operands {
            match e {
                Expr::One => {}
                Expr::Zero => return Expr::Zero,
                Expr::And(inner) => flat.extend(inner),
                e => flat.push(e),
            }
        }
        match flat.len() {
            0 => Expr::One,
            1 => flat.pop().unwrap_or(Expr::One),
            _ => Expr::And(flat),
        }
    }

    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        for e in operands {
            match e {
                Expr::Zero => {}
                Expr::One => return Expr::One,
                Expr::Or(inner) => flat.extend(inner),
                e => flat.push(e),
            }
        }
        match flat.len() {
            0 => Expr::Zero,
            1 => flat.pop().unwrap_or(Expr::Zero),
            _ => Expr::Or(flat),
        }
    }

    pub fn xor(operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut flat = Vec::new();
        let mut inv = false;
        for e in operands {
            match e {
                Expr::Zero => {}
                Expr::One => inv = !inv,
                Expr::Xor(inner) => flat.extend(inner),
                e => flat.push(e),
            }
        }
        let e = match flat.len() {
            0 => Expr::Zero,
            1 => flat.pop().unwrap_or(Expr::Zero),
            _ => Expr::Xor(flat),
        };
        if inv {
            !e
        } else {
            e
        }
    }
}

// Queries
impl Expr {
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Zero)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::One)
    }

    pub fn is_constant(&self) -> bool {
        self.is_zero() || self.is_one()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(..))
    }

    pub fn operands(&self) -> &[Expr] {
        match self {
            Expr::And(ops) | Expr::Or(ops) | Expr::Xor(ops) => ops,
            _ => &[],
        }
    }

    /// One more than the largest input index mentioned (0 for constants).
    pub fn input_size(&self) -> usize {
        match self {
            Expr::Zero | Expr::One => 0,
            Expr::Literal(var, _) => var + 1,
            Expr::And(ops) | Expr::Or(ops) | Expr::Xor(ops) => ops.iter().map(Expr::input_size).max().unwrap_or(0),
        }
    }

    /// Number of literal occurrences.
    pub fn literal_num(&self) -> usize {
        match self {
            Expr::Zero | Expr::One => 0,
            Expr::Literal(..) => 1,
            Expr::And(ops) | Expr::Or(ops) | Expr::Xor(ops) => ops.iter().map(Expr::literal_num).sum(),
        }
    }

    /// Returns `true` for a literal or an AND of literals.
    pub fn is_cube(&self) -> bool {
        match self {
            Expr::Literal(..) | Expr::One => true,
            Expr::And(ops) => ops.iter().all(Expr::is_literal),
            _ => false,
        }
    }

    /// Returns `true` for a sum of products (constants included).
    pub fn is_sop(&self) -> bool {
        match self {
            Expr::Zero => true,
            Expr::Or(ops) => ops.iter().all(Expr::is_cube),
            e => e.is_cube(),
        }
    }

    pub fn eval(&self, inputs: &[bool]) -> bool {
        match self {
            Expr::Zero => false,
            Expr::One => true,
            Expr::Literal(var, inv) => inputs[*var] != *inv,
            Expr::And(ops) => ops.iter().all(|e| e.eval(inputs)),
            Expr::Or(ops) => ops.iter().any(|e| e.eval(inputs)),
            Expr::Xor(ops) => ops.iter().fold(false, |acc, e| acc ^ e.eval(inputs)),
        }
    }

    /// Truth table of this expression over `input_num` inputs.
    ///
    /// # Panics
    ///
    /// Panics if the expression mentions an input `>= input_num`.
    pub fn make_tv(&self, input_num: usize) -> TvFunc {
        match self {
            Expr::Zero => TvFunc::zero(input_num),
            Expr::One => TvFunc::one(input_num),
            Expr::Literal(var, inv) => TvFunc::literal(input_num, *var, *inv),
            Expr::And(ops) => ops.iter().fold(TvFunc::one(input_num), |acc, e| &acc & &e.make_tv(input_num)),
            Expr::Or(ops) => ops.iter().fold(TvFunc::zero(input_num), |acc, e| &acc | &e.make_tv(input_num)),
            Expr::Xor(ops) => ops.iter().fold(TvFunc::zero(input_num), |acc, e| &acc ^ &e.make_tv(input_num)),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    /// Complement, pushed down to the literals.
    fn not(self) -> Expr {
        match self {
            Expr::Zero => Expr::One,
            Expr::One => Expr::Zero,
            Expr::Literal(var, inv) => Expr::Literal(var, !inv),
            Expr::And(ops) => Expr::or(ops.into_iter().map(|e| !e)),
            Expr::Or(ops) => Expr::and(ops.into_iter().map(|e| !e)),
            Expr::Xor(mut ops) => {
                if let Some(first) = ops.first_mut() {
                    *first = !std::mem::replace(first, Expr::Zero);
                }
                Expr::Xor(ops)
            }
        }
    }
}

impl Not for &Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        !self.clone()
    }
}

fn fmt_nary(f: &mut fmt::Formatter<'_>, ops: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, e) in ops.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", e)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Zero => write!(f, "0"),
            Expr::One => write!(f, "1"),
            Expr::Literal(var, false) => write!(f, "x{}", var),
            Expr::Literal(var, true) => write!(f, "~x{}", var),
            Expr::And(ops) => fmt_nary(f, ops, "&"),
            Expr::Or(ops) => fmt_nary(f, ops, "|"),
            Expr::Xor(ops) => fmt_nary(f, ops, "^"),
        }
    }
}
