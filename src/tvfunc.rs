//! Truth tables.
//!
//! Row `p` of a [`TvFunc`] holds the function value when input `i` takes the
//! value of bit `i` of `p`. Rows are packed 64 per word.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Largest supported input count (2^20 rows).
pub const MAX_INPUTS: usize = 20;

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TvFunc {
    input_num: usize,
    words: Vec<u64>,
}

impl TvFunc {
    const BITS_PER_WORD: usize = 64;

    fn word_num(input_num: usize) -> usize {
        let rows = 1usize << input_num;
        (rows + Self::BITS_PER_WORD - 1) / Self::BITS_PER_WORD
    }

    /// Mask of the meaningful rows in the (single) word of a small table.
    fn tail_mask(input_num: usize) -> u64 {
        let rows = 1usize << input_num;
        if rows >= Self::BITS_PER_WORD {
            u64::MAX
        } else {
            (1u64 << rows) - 1
        }
    }

    fn word_and_bit(row: usize) -> (usize, usize) {
        (row / Self::BITS_PER_WORD, row % Self::BITS_PER_WORD)
    }

    /// Constant-0 function of `input_num` inputs.
    ///
    /// # Panics
    ///
    /// Panics if `input_num > MAX_INPUTS`.
    pub fn zero(input_num: usize) -> Self {
        assert!(input_num <= MAX_INPUTS, "too many inputs for a truth table: {}", input_num);
        Self {
            input_num,
            words: vec![0; Self::word_num(input_num)],
        }
    }

    pub fn one(input_num: usize) -> Self {
        !Self::zero(input_num)
    }

    /// Literal of input `var`, complemented when `inv` is set.
    pub fn literal(input_num: usize, var: usize, inv: bool) -> Self {
        assert!(var < input_num, "literal {} out of range for {} inputs", var, input_num);
        Self::from_fn(input_num, |p| ((p >> var) & 1 == 1) != inv)
    }

    pub fn posi_literal(input_num: usize, var: usize) -> Self {
        Self::literal(input_num, var, false)
    }

    pub fn nega_literal(input_num: usize, var: usize) -> Self {
        Self::literal(input_num, var, true)
    }

    /// Builds a table by evaluating `f` on every row index.
    pub fn from_fn(input_num: usize, f: impl Fn(usize) -> bool) -> Self {
        let mut tv = Self::zero(input_num);
        for p in 0..tv.row_num() {
            if f(p) {
                tv.set(p, true);
            }
        }
        tv
    }

    pub fn input_num(&self) -> usize {
        self.input_num
    }

    pub fn row_num(&self) -> usize {
        1 << self.input_num
    }

    pub fn value(&self, row: usize) -> bool {
        let (w, b) = Self::word_and_bit(row);
        (self.words[w] >> b) & 1 == 1
    }

    pub fn set(&mut self, row: usize, value: bool) {
        let (w, b) = Self::word_and_bit(row);
        if value {
            self.words[w] |= 1 << b;
        } else {
            self.words[w] &= !(1 << b);
        }
    }

    /// Evaluates the function on explicit input values.
    pub fn eval(&self, inputs: &[bool]) -> bool {
        let row = inputs
            .iter()
            .take(self.input_num)
            .enumerate()
            .fold(0, |acc, (i, &v)| if v { acc | (1 << i) } else { acc });
        self.value(row)
    }

    /// Number of rows where the function is 1.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_one(&self) -> bool {
        *self == Self::one(self.input_num)
    }

    /// Iterates over the rows where the function is 1, in increasing order.
    pub fn minterms(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.row_num()).filter(move |&p| self.value(p))
    }

    fn zip_with(&self, rhs: &TvFunc, op: impl Fn(u64, u64) -> u64) -> TvFunc {
        assert_eq!(self.input_num, rhs.input_num, "truth tables of different arity");
        let words = self.words.iter().zip(rhs.words.iter()).map(|(&a, &b)| op(a, b)).collect();
        TvFunc {
            input_num: self.input_num,
            words,
        }
    }
}

impl Not for TvFunc {
    type Output = TvFunc;

    fn not(mut self) -> TvFunc {
        let mask = Self::tail_mask(self.input_num);
        for w in self.words.iter_mut() {
            *w = !*w & mask;
        }
        self
    }
}

impl Not for &TvFunc {
    type Output = TvFunc;

    fn not(self) -> TvFunc {
        !self.clone()
    }
}

impl BitAnd for &TvFunc {
    type Output = TvFunc;

    fn bitand(self, rhs: &TvFunc) -> TvFunc {
        self.zip_with(rhs, |a, b| a & b)
    }
}

impl BitOr for &TvFunc {
    type Output = TvFunc;

    fn bitor(self, rhs: &TvFunc) -> TvFunc {
        self.zip_with(rhs, |a, b| a | b)
    }
}

impl BitXor for &TvFunc {
    type Output = TvFunc;

    fn bitxor(self, rhs: &TvFunc) -> TvFunc {
        self.zip_with(rhs, |a, b| a ^ b)
    }
}

impl fmt::Display for TvFunc {
    /// Most significant row first, as in a hexadecimal truth-table literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in (0..self.row_num()).rev() {
            write!(f, "{}", if self.value(p) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl fmt::Debug for TvFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TvFunc({}: {})", self.input_num, self)
    }
}
