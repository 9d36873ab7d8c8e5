use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{Aig, AigLit};
use crate::error::{Diagnostic, DiagnosticKind, Error};
use crate::expr::Expr;
use crate::location::{Loc, Span};
use crate::network::BnNetwork;
use crate::prim::PrimType;
use crate::types::NodeId;

/// Settings for converting an [`Aig`] into a network.
#[derive(Debug, Clone)]
pub struct AigReadOptions {
    /// Name of the input port clocking every latch.
    pub clock_name: String,
    /// Name of the input port driving the clear terminal of every latch.
    pub reset_name: String,
}

impl Default for AigReadOptions {
    fn default() -> Self {
        Self {
            clock_name: "clock".to_string(),
            reset_name: "reset".to_string(),
        }
    }
}

/// Byte cursor with line tracking for diagnostics.
struct Input<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    source: &'a str,
}

impl<'a> Input<'a> {
    fn error(&self, label: &'static str, message: String) -> Error {
        let span = Span::point(Loc::new(self.line, 1));
        let d = Diagnostic::error(DiagnosticKind::Syntax, self.source, Some(span), label, message);
        d.log();
        Error::Parse(vec![d])
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Next line without its terminator, or `None` at end of input.
    fn line(&mut self) -> Option<&'a str> {
        if self.is_eof() {
            return None;
        }
        let rest = &self.bytes[self.pos..];
        let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (len + 1).min(rest.len());
        self.line += 1;
        let text = std::str::from_utf8(&rest[..len]).unwrap_or("");
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Reads a line of exactly `n` unsigned numbers.
    fn numbers(&mut self, n: usize, what: &str) -> Result<Vec<u32>, Error> {
        let text = self
            .line()
            .ok_or_else(|| self.error("AIG02", format!("Unexpected EOF while reading {}.", what)))?;
        let nums: Result<Vec<u32>, _> = text.split_whitespace().map(str::parse::<u32>).collect();
        match nums {
            Ok(nums) if nums.len() == n => Ok(nums),
            _ => Err(self.error("AIG03", format!("{}: {} number(s) expected for {}.", text, n, what))),
        }
    }

    /// Reads one variable-length number of the binary AND section.
    fn varint(&mut self) -> Result<u32, Error> {
        let mut value: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .bytes
                .get(self.pos)
                .ok_or_else(|| self.error("AIG02", "Unexpected EOF in AND section.".to_string()))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(self.error("AIG03", "Number too large in AND section.".to_string()));
            }
        }
        u32::try_from(value).map_err(|_| self.error("AIG03", "Number too large in AND section.".to_string()))
    }
}

impl Aig {
    /// Reads an `aag` or `aig` file; the header decides which.
    pub fn read(path: impl AsRef<Path>) -> Result<Aig, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Aig::parse(&bytes, &path.display().to_string())
    }

    /// Parses AIGER data. `source` names the data in diagnostics.
    ///
    /// In `aag` input, variables may be numbered freely; they are renumbered
    /// into the canonical layout. AND gates must only refer to inputs,
    /// latches and AND gates listed before them.
    pub fn parse(bytes: &[u8], source: &str) -> Result<Aig, Error> {
        log::debug!("reading AIGER from '{}'", source);
        let mut input = Input {
            bytes,
            pos: 0,
            line: 0,
            source,
        };
        let header = input
            .line()
            .ok_or_else(|| input.error("AIG01", "Empty file.".to_string()))?;
        let mut fields = header.split_whitespace();
        let tag = fields.next().unwrap_or("");
        let nums: Result<Vec<usize>, _> = fields.map(str::parse::<usize>).collect();
        let (m, i, l, o, a) = match (tag, nums.as_deref()) {
            ("aag" | "aig", Ok(&[m, i, l, o, a])) => (m, i, l, o, a),
            _ => {
                let message = format!("{}: Illegal header, 'aag M I L O A' or 'aig M I L O A' expected.", header);
                return Err(input.error("AIG01", message));
            }
        };
        if m < i + l + a {
            return Err(input.error("AIG01", format!("{}: M is smaller than I + L + A.", header)));
        }

        if tag == "aig" && m != i + l + a {
            return Err(input.error("AIG01", format!("{}: M must equal I + L + A in binary AIGER.", header)));
        }
        let mut aig = if tag == "aag" {
            parse_aag_body(&mut input, m, i, l, o, a)?
        } else {
            parse_aig_body(&mut input, i, l, o, a)?
        };
        parse_symbols(&mut input, &mut aig)?;
        log::debug!(
            "read '{}': {} input(s), {} latch(es), {} output(s), {} AND gate(s)",
            source,
            aig.input_num(),
            aig.latch_num(),
            aig.output_num(),
            aig.and_num()
        );
        Ok(aig)
    }
}

fn parse_aag_body(input: &mut Input<'_>, m: usize, i: usize, l: usize, o: usize, a: usize) -> Result<Aig, Error> {
    let mut aig = Aig::new(i, l);
    // file variable -> canonical literal
    let mut map: HashMap<u32, AigLit> = HashMap::new();
    map.insert(0, AigLit::zero());

    for pos in 0..i {
        let nums = input.numbers(1, "an input")?;
        define(&mut map, input, m, nums[0], aig.input(pos))?;
    }
    let mut latch_srcs = Vec::with_capacity(l);
    for pos in 0..l {
        let nums = input.numbers(2, "a latch")?;
        define(&mut map, input, m, nums[0], aig.latch(pos))?;
        latch_srcs.push((input.line, nums[1]));
    }
    let mut output_srcs = Vec::with_capacity(o);
    for _ in 0..o {
        let nums = input.numbers(1, "an output")?;
        output_srcs.push((input.line, nums[0]));
    }
    let mut and_lines = Vec::with_capacity(a);
    for _ in 0..a {
        let nums = input.numbers(3, "an AND gate")?;
        and_lines.push((input.line, nums));
    }

    for (line, nums) in and_lines {
        let src0 = lookup(&map, input, line, nums[1])?;
        let src1 = lookup(&map, input, line, nums[2])?;
        let lit = aig.make_and(src0, src1);
        define(&mut map, input, m, nums[0], lit)?;
    }
    for (pos, (line, raw)) in latch_srcs.into_iter().enumerate() {
        let src = lookup(&map, input, line, raw)?;
        aig.set_latch_next(pos, src);
    }
    for (line, raw) in output_srcs {
        let src = lookup(&map, input, line, raw)?;
        aig.add_output(src);
    }
    Ok(aig)
}

fn lookup(map: &HashMap<u32, AigLit>, input: &Input<'_>, line: u32, raw: u32) -> Result<AigLit, Error> {
    match map.get(&(raw >> 1)) {
        Some(&lit) => Ok(lit ^ (raw & 1 == 1)),
        None => {
            let d = Diagnostic::error(
                DiagnosticKind::Semantic,
                input.source,
                Some(Span::point(Loc::new(line, 1))),
                "AIG06",
                format!("{}: Undefined literal.", raw),
            );
            d.log();
            Err(Error::Parse(vec![d]))
        }
    }
}

/// Records the `aag` variable defined by the positive literal `raw`.
fn define(map: &mut HashMap<u32, AigLit>, input: &Input<'_>, m: usize, raw: u32, lit: AigLit) -> Result<(), Error> {
    if raw & 1 == 1 || raw == 0 || (raw >> 1) as usize > m {
        return Err(input.error("AIG04", format!("{}: Positive literal expected.", raw)));
    }
    if map.insert(raw >> 1, lit).is_some() {
        return Err(input.error("AIG05", format!("{}: Defined more than once.", raw)));
    }
    Ok(())
}

fn parse_aig_body(input: &mut Input<'_>, i: usize, l: usize, o: usize, a: usize) -> Result<Aig, Error> {
    let mut aig = Aig::new(i, l);
    let max = (i + l + a) as u32;

    let mut latch_srcs = Vec::with_capacity(l);
    for _ in 0..l {
        let nums = input.numbers(1, "a latch")?;
        latch_srcs.push(check_literal(input, max, nums[0])?);
    }
    let mut output_srcs = Vec::with_capacity(o);
    for _ in 0..o {
        let nums = input.numbers(1, "an output")?;
        output_srcs.push(check_literal(input, max, nums[0])?);
    }
    for k in 0..a {
        let lhs = ((i + l + k + 1) * 2) as u32;
        let d0 = input.varint()?;
        let d1 = input.varint()?;
        let src0 = lhs
            .checked_sub(d0)
            .ok_or_else(|| input.error("AIG07", format!("AND #{}: Delta out of range.", k)))?;
        let src1 = src0
            .checked_sub(d1)
            .ok_or_else(|| input.error("AIG07", format!("AND #{}: Delta out of range.", k)))?;
        if src0 >= lhs {
            return Err(input.error("AIG07", format!("AND #{}: Operand is not smaller than the gate.", k)));
        }
        aig.make_and(AigLit::from_raw(src0), AigLit::from_raw(src1));
    }
    for (pos, src) in latch_srcs.into_iter().enumerate() {
        aig.set_latch_next(pos, src);
    }
    for src in output_srcs {
        aig.add_output(src);
    }
    Ok(aig)
}

fn check_literal(input: &Input<'_>, max: u32, raw: u32) -> Result<AigLit, Error> {
    if raw >> 1 > max {
        return Err(input.error("AIG06", format!("{}: Undefined literal.", raw)));
    }
    Ok(AigLit::from_raw(raw))
}

fn parse_symbols(input: &mut Input<'_>, aig: &mut Aig) -> Result<(), Error> {
    while let Some(line) = input.line() {
        if line == "c" {
            let rest = &input.bytes[input.pos..];
            let comment = String::from_utf8_lossy(rest).into_owned();
            input.pos = input.bytes.len();
            aig.set_comment(Some(comment));
            break;
        }
        if line.is_empty() {
            continue;
        }
        let (key, name) = line.split_once(' ').unwrap_or((line, ""));
        let mut chars = key.chars();
        let kind = chars.next().unwrap_or(' ');
        let pos: Option<usize> = chars.as_str().parse().ok();
        let limit = match kind {
            'i' => aig.input_num(),
            'l' => aig.latch_num(),
            'o' => aig.output_num(),
            _ => 0,
        };
        match pos {
            Some(pos) if pos < limit && !name.is_empty() => match kind {
                'i' => aig.set_input_symbol(pos, name),
                'l' => aig.set_latch_symbol(pos, name),
                _ => aig.set_output_symbol(pos, name),
            },
            _ => return Err(input.error("AIG08", format!("{}: Illegal symbol line.", line))),
        }
    }
    Ok(())
}

impl BnNetwork {
    /// Builds a network from an AIG.
    ///
    /// Inputs, outputs and latches are named after their symbols, or `i#`,
    /// `o#` and `l#` when they have none. With latches present, a clock port
    /// and a reset port are added; each latch becomes a DFF with a clear
    /// terminal driven by the reset port. AND gates become two-input logic
    /// nodes; an inverter is added for every complemented literal read by
    /// an output or a latch.
    pub fn from_aig(aig: &Aig, options: &AigReadOptions) -> Result<BnNetwork, Error> {
        let mut net = BnNetwork::new();
        net.set_name("aig");
        let mut nodes: Vec<Option<NodeId>> = vec![None; aig.max_var() + 1];

        for pos in 0..aig.input_num() {
            let name = aig.input_symbol(pos).map_or_else(|| format!("i{}", pos), str::to_string);
            nodes[aig.input(pos).var() as usize] = Some(net.new_input(&name));
        }
        let outputs: Vec<NodeId> = (0..aig.output_num())
            .map(|pos| {
                let name = aig.output_symbol(pos).map_or_else(|| format!("o{}", pos), str::to_string);
                net.new_output(&name)
            })
            .collect();

        let mut latch_inputs = Vec::with_capacity(aig.latch_num());
        if aig.latch_num() > 0 {
            let clock = net.new_input(&options.clock_name);
            let reset = net.new_input(&options.reset_name);
            for pos in 0..aig.latch_num() {
                let name = aig.latch_symbol(pos).map_or_else(|| format!("l{}", pos), str::to_string);
                let id = net.new_dff(&name, true, false);
                let dff = net.dff(id).clone();
                net.connect(clock, dff.clock(), 0);
                if let Some(clear) = dff.clear() {
                    net.connect(reset, clear, 0);
                }
                nodes[aig.latch(pos).var() as usize] = Some(dff.data_out());
                latch_inputs.push(dff.data_in());
            }
        }

        let mut conv = AigToNetwork {
            net: &mut net,
            nodes,
            inverted: HashMap::new(),
        };
        for k in 0..aig.and_num() {
            let (src0, src1) = aig.and_srcs(k);
            let f0 = conv.source(src0.positive());
            let f1 = conv.source(src1.positive());
            let expr = Expr::and(vec![
                Expr::literal(0, src0.is_negated()),
                Expr::literal(1, src1.is_negated()),
            ]);
            let node = conv.net.new_expr("", 2, expr);
            conv.net.connect(f0, node, 0);
            conv.net.connect(f1, node, 1);
            conv.nodes[aig.and_lit(k).var() as usize] = Some(node);
        }
        for (pos, &output) in outputs.iter().enumerate() {
            let src = conv.source(aig.output(pos));
            conv.net.connect(src, output, 0);
        }
        for (pos, &data_in) in latch_inputs.iter().enumerate() {
            let src = conv.source(aig.latch_next(pos));
            conv.net.connect(src, data_in, 0);
        }

        net.wrap_up()?;
        Ok(net)
    }
}

struct AigToNetwork<'n> {
    net: &'n mut BnNetwork,
    /// AIG variable -> node computing it.
    nodes: Vec<Option<NodeId>>,
    /// AIG variable -> inverter reading it.
    inverted: HashMap<u32, NodeId>,
}

impl AigToNetwork<'_> {
    /// Node computing `lit`, adding constants and inverters on demand.
    fn source(&mut self, lit: AigLit) -> NodeId {
        let var = lit.var();
        let positive = match self.nodes[var as usize] {
            Some(node) => node,
            None => {
                // only variable 0 is left undefined by a parsed AIG
                let node = self.net.new_primitive("", 0, PrimType::C0);
                self.nodes[var as usize] = Some(node);
                node
            }
        };
        if !lit.is_negated() {
            return positive;
        }
        if let Some(&node) = self.inverted.get(&var) {
            return node;
        }
        let node = self.net.new_primitive("", 1, PrimType::Not);
        self.net.connect(positive, node, 0);
        self.inverted.insert(var, node);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_aag() {
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 4 2\ni0 a\ni1 b\no0 y\nc\nhello\n";
        let aig = Aig::parse(text.as_bytes(), "t.aag").unwrap();
        assert_eq!((aig.input_num(), aig.output_num(), aig.and_num()), (2, 1, 1));
        assert_eq!(aig.output(0), aig.and_lit(0));
        assert_eq!(aig.input_symbol(1), Some("b"));
        assert_eq!(aig.output_symbol(0), Some("y"));
        assert_eq!(aig.comment(), Some("hello\n"));
    }

    #[test]
    fn test_parse_aag_renumbers() {
        // input is variable 5, latch variable 2, AND variable 7
        let text = "aag 7 1 1 1 1\n10\n4 15\n14\n14 10 5\n";
        let aig = Aig::parse(text.as_bytes(), "t.aag").unwrap();
        assert_eq!(aig.and_srcs(0), (!aig.latch(0), aig.input(0)));
        assert_eq!(aig.latch_next(0), !aig.and_lit(0));
        assert_eq!(aig.output(0), aig.and_lit(0));
    }

    #[test]
    fn test_parse_aig_binary() {
        let mut bytes = b"aig 3 2 0 1 1\n6\n".to_vec();
        bytes.extend_from_slice(&[0x02, 0x02]);
        bytes.extend_from_slice(b"i0 a\nc\nnote");
        let aig = Aig::parse(&bytes, "t.aig").unwrap();
        assert_eq!(aig.and_srcs(0), (aig.input(1), aig.input(0)));
        assert_eq!(aig.input_symbol(0), Some("a"));
        assert_eq!(aig.comment(), Some("note"));
    }

    #[test]
    fn test_parse_errors() {
        let cases: [(&[u8], &str); 5] = [
            (b"", "AIG01"),
            (b"aag 1 1 0 1\n", "AIG01"),
            (b"aag 1 1 0 1 0\n2\n", "AIG02"),
            (b"aag 2 1 0 1 1\n2\n4\n4 2 6\n", "AIG06"),
            (b"aag 1 1 0 0 0\n3\n", "AIG04"),
        ];
        for (bytes, label) in cases {
            let err = Aig::parse(bytes, "t").unwrap_err();
            assert!(err.has_label(label), "{:?} should fail with {}", String::from_utf8_lossy(bytes), label);
        }
    }

    #[test]
    fn test_from_aig() {
        let text = "aag 4 2 1 2 1\n2\n4\n6 8\n9\n6\n8 6 2\no0 nq\n";
        let aig = Aig::parse(text.as_bytes(), "t.aag").unwrap();
        let net = BnNetwork::from_aig(&aig, &AigReadOptions::default()).unwrap();
        assert!(net.is_sane());
        let names: Vec<&str> = net.primary_inputs().iter().map(|&id| net.node(id).name()).collect();
        assert_eq!(names, vec!["i0", "i1", "clock", "reset"]);
        let outs: Vec<&str> = net.primary_outputs().iter().map(|&id| net.node(id).name()).collect();
        assert_eq!(outs, vec!["nq", "o1"]);
        assert_eq!(net.dff_num(), 1);
        assert_eq!(net.dffs()[0].name(), "l0");
        // one AND, one inverter for output 0
        assert_eq!(net.logic_list().len(), 2);
        let sim = net.simulate(&[true, false, false, false], &[true]).unwrap();
        assert_eq!(sim.outputs, vec![false, true]);
    }
}
