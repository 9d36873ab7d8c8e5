use std::fmt::{Debug, Display, Formatter};
use std::ops::{BitXor, Not};

/// An AIGER literal: `2 * var + inverted`.
///
/// Variable 0 is the constant, so literal 0 is false and 1 is true.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct AigLit(u32);

// Constructors
impl AigLit {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    pub const fn from_var(var: u32) -> Self {
        Self(var << 1)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

// Getters
impl AigLit {
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn var(self) -> u32 {
        self.0 >> 1
    }

    /// The literal with the inversion bit cleared.
    pub const fn positive(self) -> Self {
        Self(self.0 & !1)
    }
}

// Checks
impl AigLit {
    pub const fn is_const(self) -> bool {
        self.var() == 0
    }

    pub const fn is_negated(self) -> bool {
        self.0 & 1 != 0
    }
}

impl From<bool> for AigLit {
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl Not for AigLit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

/// Complements the literal when the right-hand side is `true`.
impl BitXor<bool> for AigLit {
    type Output = Self;

    fn bitxor(self, inv: bool) -> Self::Output {
        Self(self.0 ^ inv as u32)
    }
}

impl Display for AigLit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for AigLit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_const() {
            write!(f, "{}", self.0 & 1)
        } else {
            if self.is_negated() {
                write!(f, "!")?;
            }
            write!(f, "v{}", self.var())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_const() {
        let zero = AigLit::zero();
        let one = AigLit::one();

        assert!(zero.is_const());
        assert!(one.is_const());
        assert_eq!(zero, !one);
        assert_eq!(AigLit::from(true), one);
        assert!(!zero.is_negated());
        assert!(one.is_negated());
    }

    #[test]
    fn test_var() {
        let a = AigLit::from_var(3);
        assert_eq!(a.raw(), 6);
        assert_eq!((!a).raw(), 7);
        assert_eq!((!a).var(), 3);
        assert_eq!((!a).positive(), a);
        assert_eq!(a ^ true, !a);
        assert_eq!(a ^ false, a);
        assert_eq!(format!("{:?}", !a), "!v3");
        assert_eq!(format!("{}", !a), "7");
    }
}
