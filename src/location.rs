//! Source positions attached to tokens, symbols and diagnostics.

use std::fmt;

/// A position in a source text (1-based line and column).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Loc {
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Loc {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A closed range of positions, `start..=end`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: Loc,
    pub end: Loc,
}

impl Span {
    pub const fn new(start: Loc, end: Loc) -> Self {
        Self { start, end }
    }

    pub const fn point(loc: Loc) -> Self {
        Self { start: loc, end: loc }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            if self.start.column == self.end.column {
                write!(f, "{}", self.start)
            } else {
                write!(f, "{}-{}", self.start, self.end.column)
            }
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_span_display() {
        let a = Span::new(Loc::new(3, 4), Loc::new(3, 4));
        let b = Span::new(Loc::new(3, 4), Loc::new(3, 9));
        let c = Span::new(Loc::new(3, 4), Loc::new(5, 1));
        assert_eq!(a.to_string(), "3:4");
        assert_eq!(b.to_string(), "3:4-9");
        assert_eq!(c.to_string(), "3:4-5:1");
    }

    #[test]
    fn test_span_to() {
        let a = Span::point(Loc::new(2, 7));
        let b = Span::new(Loc::new(1, 3), Loc::new(1, 5));
        let c = a.to(b);
        assert_eq!(c.start, Loc::new(1, 3));
        assert_eq!(c.end, Loc::new(2, 7));
    }
}
