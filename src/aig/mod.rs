//! And-Inverter Graphs in the AIGER format.
//!
//! [`Aig`] is the in-memory model: inputs, latches, outputs and two-input
//! AND gates, addressed through [`AigLit`]s laid out the canonical AIGER
//! way. Input `i` is variable `i + 1`, latch `i` is variable `I + i + 1` and
//! the `k`-th AND gate is variable `I + L + k + 1`.
//!
//! [`BnNetwork::to_aig`](crate::network::BnNetwork::to_aig) lowers a sane
//! network into an `Aig`; [`write_aag`] and [`write_aig`] emit the ASCII and
//! binary formats. [`Aig::parse`] reads both formats back, and
//! [`BnNetwork::from_aig`](crate::network::BnNetwork::from_aig) turns the
//! result into a network again.
//!
//! Clock, clear and preset terminals of DFFs have no AIGER counterpart: every
//! DFF becomes a latch with initial value 0 that updates on each step.

mod encode;
mod literal;
mod reader;
mod writer;

pub use literal::AigLit;
pub use reader::AigReadOptions;
pub use writer::{write_aag, write_aig, write_network_aag, write_network_aig, AigWriteOptions};

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Aig {
    input_num: usize,
    /// Next-state literal of each latch.
    latches: Vec<AigLit>,
    outputs: Vec<AigLit>,
    /// Operands of each AND gate, larger literal first.
    ands: Vec<(AigLit, AigLit)>,
    input_symbols: Vec<Option<String>>,
    latch_symbols: Vec<Option<String>>,
    output_symbols: Vec<Option<String>>,
    comment: Option<String>,
}

// Construction
impl Aig {
    /// Creates an AIG with the given inputs and latches and no gates.
    ///
    /// Latch next-state literals start as constant 0.
    pub fn new(input_num: usize, latch_num: usize) -> Self {
        Self {
            input_num,
            latches: vec![AigLit::zero(); latch_num],
            outputs: Vec::new(),
            ands: Vec::new(),
            input_symbols: vec![None; input_num],
            latch_symbols: vec![None; latch_num],
            output_symbols: Vec::new(),
            comment: None,
        }
    }

    /// Allocates one AND gate and returns its positive literal.
    ///
    /// # Panics
    ///
    /// Panics if an operand refers to an undefined variable.
    pub fn make_and(&mut self, a: AigLit, b: AigLit) -> AigLit {
        let max = self.max_var() as u32;
        assert!(a.var() <= max && b.var() <= max, "operand of AND gate is not defined");
        let (src0, src1) = if a >= b { (a, b) } else { (b, a) };
        self.ands.push((src0, src1));
        AigLit::from_var(self.max_var() as u32)
    }

    pub fn set_latch_next(&mut self, pos: usize, src: AigLit) {
        self.latches[pos] = src;
    }

    /// Appends an output and returns its position.
    pub fn add_output(&mut self, src: AigLit) -> usize {
        self.outputs.push(src);
        self.output_symbols.push(None);
        self.outputs.len() - 1
    }

    pub fn set_input_symbol(&mut self, pos: usize, name: &str) {
        self.input_symbols[pos] = Some(name.to_string());
    }

    pub fn set_latch_symbol(&mut self, pos: usize, name: &str) {
        self.latch_symbols[pos] = Some(name.to_string());
    }

    pub fn set_output_symbol(&mut self, pos: usize, name: &str) {
        self.output_symbols[pos] = Some(name.to_string());
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Drops every input, latch and output symbol.
    pub fn clear_symbols(&mut self) {
        self.input_symbols.iter_mut().for_each(|s| *s = None);
        self.latch_symbols.iter_mut().for_each(|s| *s = None);
        self.output_symbols.iter_mut().for_each(|s| *s = None);
    }
}

// Queries
impl Aig {
    pub fn input_num(&self) -> usize {
        self.input_num
    }

    pub fn latch_num(&self) -> usize {
        self.latches.len()
    }

    pub fn output_num(&self) -> usize {
        self.outputs.len()
    }

    pub fn and_num(&self) -> usize {
        self.ands.len()
    }

    /// The `M` of the AIGER header.
    pub fn max_var(&self) -> usize {
        self.input_num + self.latches.len() + self.ands.len()
    }

    pub fn input(&self, pos: usize) -> AigLit {
        assert!(pos < self.input_num, "input #{} is out of range", pos);
        AigLit::from_var((pos + 1) as u32)
    }

    pub fn latch(&self, pos: usize) -> AigLit {
        assert!(pos < self.latches.len(), "latch #{} is out of range", pos);
        AigLit::from_var((self.input_num + pos + 1) as u32)
    }

    pub fn latch_next(&self, pos: usize) -> AigLit {
        self.latches[pos]
    }

    pub fn output(&self, pos: usize) -> AigLit {
        self.outputs[pos]
    }

    /// Positive literal of the `k`-th AND gate.
    pub fn and_lit(&self, k: usize) -> AigLit {
        assert!(k < self.ands.len(), "AND #{} is out of range", k);
        AigLit::from_var((self.input_num + self.latches.len() + k + 1) as u32)
    }

    /// Operands of the `k`-th AND gate, larger literal first.
    pub fn and_srcs(&self, k: usize) -> (AigLit, AigLit) {
        self.ands[k]
    }

    pub fn input_symbol(&self, pos: usize) -> Option<&str> {
        self.input_symbols[pos].as_deref()
    }

    pub fn latch_symbol(&self, pos: usize) -> Option<&str> {
        self.latch_symbols[pos].as_deref()
    }

    pub fn output_symbol(&self, pos: usize) -> Option<&str> {
        self.output_symbols[pos].as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Evaluates one step.
    ///
    /// Returns the output values and the next latch state.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` or `state` has the wrong length.
    pub fn eval(&self, inputs: &[bool], state: &[bool]) -> (Vec<bool>, Vec<bool>) {
        assert_eq!(inputs.len(), self.input_num, "wrong number of input values");
        assert_eq!(state.len(), self.latches.len(), "wrong number of latch values");

        let mut values = Vec::with_capacity(self.max_var() + 1);
        values.push(false);
        values.extend_from_slice(inputs);
        values.extend_from_slice(state);
        for &(a, b) in self.ands.iter() {
            let v = lit_value(&values, a) && lit_value(&values, b);
            values.push(v);
        }
        let outputs = self.outputs.iter().map(|&lit| lit_value(&values, lit)).collect();
        let next = self.latches.iter().map(|&lit| lit_value(&values, lit)).collect();
        (outputs, next)
    }
}

fn lit_value(values: &[bool], lit: AigLit) -> bool {
    values[lit.var() as usize] != lit.is_negated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_layout() {
        let mut aig = Aig::new(2, 1);
        assert_eq!(aig.input(0).raw(), 2);
        assert_eq!(aig.input(1).raw(), 4);
        assert_eq!(aig.latch(0).raw(), 6);
        let g = aig.make_and(aig.input(0), !aig.latch(0));
        assert_eq!(g.raw(), 8);
        assert_eq!(aig.and_srcs(0), (!aig.latch(0), aig.input(0)));
        assert_eq!(aig.max_var(), 4);
    }

    #[test]
    fn test_eval_toggle() {
        // q' = q xor a, out = q
        let mut aig = Aig::new(1, 1);
        let (a, q) = (aig.input(0), aig.latch(0));
        let t1 = aig.make_and(a, q);
        let t2 = aig.make_and(!a, !q);
        let x = aig.make_and(!t1, !t2);
        aig.set_latch_next(0, x);
        aig.add_output(q);

        let mut state = vec![false];
        let mut seen = Vec::new();
        for a in [true, false, true, true] {
            let (out, next) = aig.eval(&[a], &state);
            seen.push(out[0]);
            state = next;
        }
        assert_eq!(seen, vec![false, true, true, false]);
        assert_eq!(state, vec![true]);
    }

    #[test]
    #[should_panic(expected = "not defined")]
    fn test_and_of_undefined_var() {
        let mut aig = Aig::new(1, 0);
        aig.make_and(AigLit::from_var(1), AigLit::from_var(5));
    }
}
