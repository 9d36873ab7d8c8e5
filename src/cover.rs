//! Sum-of-products covers as read from `.names` statements, and their pool.

use std::collections::HashMap;
use std::fmt;

use crate::expr::Expr;

/// One cell of a cube: `0`, `1` or `-`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SopPat {
    Zero,
    One,
    DontCare,
}

impl SopPat {
    pub fn from_char(c: char) -> Option<SopPat> {
        match c {
            '0' => Some(SopPat::Zero),
            '1' => Some(SopPat::One),
            '-' => Some(SopPat::DontCare),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            SopPat::Zero => '0',
            SopPat::One => '1',
            SopPat::DontCare => '-',
        }
    }

    fn bits(self) -> u64 {
        match self {
            SopPat::DontCare => 0b00,
            SopPat::Zero => 0b01,
            SopPat::One => 0b10,
        }
    }

    fn from_bits(bits: u64) -> SopPat {
        match bits & 0b11 {
            0b01 => SopPat::Zero,
            0b10 => SopPat::One,
            _ => SopPat::DontCare,
        }
    }
}

/// Key of a cover: arity, cube count, packed literal matrix and output polarity.
///
/// Two bits per cell, 32 cells per word, row-major.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct CoverKey {
    input_num: usize,
    cube_num: usize,
    matrix: Vec<u64>,
    output_pat: char,
}

const CELLS_PER_WORD: usize = 32;

/// A single-output SOP cover.
///
/// The output pattern is `'1'` (on-set cover), `'0'` (off-set cover) or `'-'`
/// for a cover without cubes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cover {
    id: usize,
    key: CoverKey,
}

impl Cover {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn input_num(&self) -> usize {
        self.key.input_num
    }

    pub fn cube_num(&self) -> usize {
        self.key.cube_num
    }

    pub fn output_pat(&self) -> char {
        self.key.output_pat
    }

    pub fn input_pat(&self, cube: usize, var: usize) -> SopPat {
        assert!(cube < self.cube_num() && var < self.input_num());
        let cell = cube * self.input_num() + var;
        let word = self.key.matrix[cell / CELLS_PER_WORD];
        SopPat::from_bits(word >> ((cell % CELLS_PER_WORD) * 2))
    }

    /// The cover as an expression over inputs `0..input_num`.
    pub fn expr(&self) -> Expr {
        let cubes = (0..self.cube_num()).map(|c| {
            Expr::and((0..self.input_num()).filter_map(|i| match self.input_pat(c, i) {
                SopPat::Zero => Some(Expr::nega_literal(i)),
                SopPat::One => Some(Expr::posi_literal(i)),
                SopPat::DontCare => None,
            }))
        });
        let sop = Expr::or(cubes);
        if self.output_pat() == '0' {
            !sop
        } else {
            sop
        }
    }

    pub fn eval(&self, inputs: &[bool]) -> bool {
        let hit = (0..self.cube_num()).any(|c| {
            (0..self.input_num()).all(|i| match self.input_pat(c, i) {
                SopPat::Zero => !inputs[i],
                SopPat::One => inputs[i],
                SopPat::DontCare => true,
            })
        });
        match self.output_pat() {
            '0' => !hit,
            _ => hit,
        }
    }
}

impl fmt::Display for Cover {
    /// BLIF cube lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in 0..self.cube_num() {
            for i in 0..self.input_num() {
                write!(f, "{}", self.input_pat(c, i).to_char())?;
            }
            if self.input_num() > 0 {
                write!(f, " ")?;
            }
            writeln!(f, "{}", self.output_pat())?;
        }
        Ok(())
    }
}

/// Interns covers by content.
///
/// Equality is structural on the cube matrix: the same cubes in a different
/// order give a different cover.
#[derive(Debug, Clone, Default)]
pub struct CoverPool {
    covers: Vec<Cover>,
    index: HashMap<CoverKey, usize>,
}

impl CoverPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.covers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covers.is_empty()
    }

    pub fn cover(&self, id: usize) -> &Cover {
        &self.covers[id]
    }

    /// Returns the id of the cover with the given content, creating it if new.
    ///
    /// `ipat` is the concatenation of all input cubes, `input_num` characters
    /// each. `opat` is ignored (stored as `'-'`) when there are no cubes.
    ///
    /// # Panics
    ///
    /// Panics if `ipat.len()` is not `input_num * cube_num` or contains a
    /// character outside `{0,1,-}`.
    pub fn intern(&mut self, input_num: usize, cube_num: usize, ipat: &str, opat: char) -> usize {
        let cells: Vec<SopPat> = ipat
            .chars()
            .map(|c| SopPat::from_char(c).unwrap_or_else(|| panic!("illegal cube character {:?}", c)))
            .collect();
        assert_eq!(cells.len(), input_num * cube_num, "cube matrix size mismatch");
        let mut matrix = vec![0u64; (cells.len() + CELLS_PER_WORD - 1) / CELLS_PER_WORD];
        for (k, pat) in cells.iter().enumerate() {
            matrix[k / CELLS_PER_WORD] |= pat.bits() << ((k % CELLS_PER_WORD) * 2);
        }
        let key = CoverKey {
            input_num,
            cube_num,
            matrix,
            output_pat: if cube_num == 0 { '-' } else { opat },
        };
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.covers.len();
        log::debug!("new cover #{}: {} inputs, {} cubes, output '{}'", id, input_num, cube_num, key.output_pat);
        self.covers.push(Cover { id, key: key.clone() });
        self.index.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prim::{analyze_expr, PrimType};
    use test_log::test;

    #[test]
    fn test_intern_same_content() {
        let mut pool = CoverPool::new();
        let a = pool.intern(2, 1, "11", '1');
        let b = pool.intern(2, 1, "11", '1');
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_intern_distinct_content() {
        let mut pool = CoverPool::new();
        let base = pool.intern(2, 2, "1--1", '1');
        assert_ne!(pool.intern(2, 2, "1--1", '0'), base);
        assert_ne!(pool.intern(2, 2, "-11-", '1'), base); // reordered cubes
        assert_ne!(pool.intern(2, 1, "1-", '1'), base);
        assert_ne!(pool.intern(4, 1, "1--1", '1'), base);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_empty_cover_ignores_output() {
        let mut pool = CoverPool::new();
        let a = pool.intern(2, 0, "", '1');
        let b = pool.intern(2, 0, "", '0');
        assert_eq!(a, b);
        assert_eq!(pool.cover(a).output_pat(), '-');
        assert!(pool.cover(a).expr().is_zero());
    }

    #[test]
    fn test_wide_matrix() {
        let mut pool = CoverPool::new();
        let ipat: String = (0..40).map(|i| if i % 3 == 0 { '1' } else { '-' }).collect();
        let id = pool.intern(40, 1, &ipat, '1');
        let cover = pool.cover(id);
        for i in 0..40 {
            let expected = if i % 3 == 0 { SopPat::One } else { SopPat::DontCare };
            assert_eq!(cover.input_pat(0, i), expected);
        }
    }

    #[test]
    fn test_expr_and_eval() {
        let mut pool = CoverPool::new();
        let and = pool.intern(2, 1, "11", '1');
        assert_eq!(analyze_expr(&pool.cover(and).expr(), 2), Some(PrimType::And));
        let nand = pool.intern(2, 1, "11", '0');
        assert_eq!(analyze_expr(&pool.cover(nand).expr(), 2), Some(PrimType::Nand));
        let mux = pool.intern(3, 2, "1-10-1", '1');
        let cover = pool.cover(mux);
        for p in 0..8usize {
            let inputs: Vec<bool> = (0..3).map(|i| (p >> i) & 1 == 1).collect();
            assert_eq!(cover.eval(&inputs), cover.expr().eval(&inputs));
        }
        assert_eq!(cover.to_string(), "1-1 1\n0-1 1\n");
    }
}
