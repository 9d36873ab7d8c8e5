//! BLIF output.
//!
//! The writer emits one `.model`: the data inputs, the primary outputs, one
//! `.latch` per DFF, then one `.names` (or `.gate` for cell nodes) per logic
//! node in topological order. Inputs that only drive clock or reset
//! terminals are left out; the reader recreates them from `.latch`.
//!
//! # Naming
//!
//! Every written node gets a unique name. Primary inputs are named first,
//! then DFF outputs (after the DFF), then primary outputs, then logic nodes
//! in logic order. A node whose own name is empty or already taken gets a
//! generated `{prefix}{n}{suffix}` name. A logic node driving a primary
//! output takes the output's name when its own name is empty or taken;
//! otherwise a buffer `.names src out` is appended for that output.
//!
//! # Examples
//!
//! ```
//! use bnet_rs::blif::{write_blif_string, BlifWriteOptions};
//! use bnet_rs::network::BnNetwork;
//! use bnet_rs::prim::PrimType;
//!
//! let mut net = BnNetwork::new();
//! net.set_name("inv");
//! let a = net.new_input("a");
//! let g = net.new_primitive("y", 1, PrimType::Not);
//! let y = net.new_output("y");
//! net.connect(a, g, 0);
//! net.connect(g, y, 0);
//! net.wrap_up().unwrap();
//!
//! let text = write_blif_string(&net, &BlifWriteOptions::default()).unwrap();
//! assert_eq!(text, ".model inv\n.inputs a\n.outputs y\n.names a y\n0 1\n.end\n");
//! ```

use std::collections::HashSet;
use std::io::Write;

use crate::error::Error;
use crate::expr::Expr;
use crate::network::{BnNetwork, LogicKind};
use crate::prim::PrimType;
use crate::types::NodeId;

/// Names emitted per `.inputs` / `.outputs` line.
const NAMES_PER_LINE: usize = 10;

#[derive(Debug, Clone)]
pub struct BlifWriteOptions {
    /// Prefix of generated node names (default: `"__node"`)
    pub prefix: String,
    /// Suffix of generated node names (default: empty)
    pub suffix: String,
}

impl Default for BlifWriteOptions {
    fn default() -> Self {
        Self {
            prefix: "__node".to_string(),
            suffix: String::new(),
        }
    }
}

/// Writes `network` as BLIF.
///
/// Fails with [`Error::NotSane`] unless the network has passed `wrap_up`,
/// and with [`Error::Handler`] if it holds latches (BLIF has no
/// level-sensitive element) or cell nodes without a library.
pub fn write_blif(network: &BnNetwork, out: &mut impl Write, options: &BlifWriteOptions) -> Result<(), Error> {
    if !network.is_sane() {
        return Err(Error::NotSane);
    }
    if let Some(latch) = network.latches().first() {
        return Err(Error::Handler(format!("{}: latches cannot be written as BLIF", latch.name())));
    }
    let names = NameTable::build(network, options);
    log::debug!("writing BLIF for '{}'", network.name());

    writeln!(out, ".model {}", network.name())?;

    let control = control_terminals(network);
    let inputs: Vec<&str> = network
        .primary_inputs()
        .iter()
        .filter(|&&id| {
            let fanouts = network.node(id).fanouts();
            fanouts.is_empty() || fanouts.iter().any(|fo| !control.contains(fo))
        })
        .map(|&id| names.get(id))
        .collect();
    write_name_list(out, ".inputs", &inputs)?;
    let outputs: Vec<&str> = network.primary_outputs().iter().map(|&id| names.get(id)).collect();
    write_name_list(out, ".outputs", &outputs)?;

    for dff in network.dffs() {
        write!(out, ".latch {} {}", names.src(network, dff.data_in()), names.get(dff.data_out()))?;
        match (dff.clear().is_some(), dff.preset().is_some()) {
            (true, false) => writeln!(out, " 0")?,
            (false, true) => writeln!(out, " 1")?,
            _ => writeln!(out)?,
        }
    }

    for &id in network.logic_list() {
        write_logic(network, &names, id, out)?;
    }

    for &id in network.primary_outputs() {
        let src = names.src(network, id);
        let name = names.get(id);
        if src != name {
            writeln!(out, ".names {} {}", src, name)?;
            writeln!(out, "1 1")?;
        }
    }

    writeln!(out, ".end")?;
    Ok(())
}

/// Writes `network` as BLIF into a string.
pub fn write_blif_string(network: &BnNetwork, options: &BlifWriteOptions) -> Result<String, Error> {
    let mut buf = Vec::new();
    write_blif(network, &mut buf, options)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_name_list(out: &mut impl Write, keyword: &str, names: &[&str]) -> Result<(), Error> {
    for chunk in names.chunks(NAMES_PER_LINE) {
        write!(out, "{}", keyword)?;
        for name in chunk {
            write!(out, " {}", name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Clock, clear and preset terminals of every DFF.
fn control_terminals(network: &BnNetwork) -> HashSet<NodeId> {
    let mut set = HashSet::new();
    for dff in network.dffs() {
        set.insert(dff.clock());
        set.extend(dff.clear());
        set.extend(dff.preset());
    }
    set
}

fn write_logic(network: &BnNetwork, names: &NameTable, id: NodeId, out: &mut impl Write) -> Result<(), Error> {
    let node = network.node(id);
    let ni = node.fanin_num();

    if let Some(LogicKind::Cell(cell_id)) = node.logic_kind() {
        let library = network
            .library()
            .ok_or_else(|| Error::Handler(format!("{}: cell node without a library", node.name())))?;
        let cell = library.cell(cell_id);
        write!(out, ".gate {}", cell.name())?;
        for (i, src) in node.fanins().enumerate() {
            let pin = cell.input_name(i).unwrap_or_default();
            write!(out, " {}={}", pin, names.get(src))?;
        }
        writeln!(out, " {}={}", cell.output_name().unwrap_or_default(), names.get(id))?;
        return Ok(());
    }

    write!(out, ".names")?;
    for src in node.fanins() {
        write!(out, " {}", names.get(src))?;
    }
    writeln!(out, " {}", names.get(id))?;

    match node.logic_kind() {
        Some(LogicKind::Primitive(prim)) => write_primitive(out, prim, ni),
        Some(LogicKind::Expr(e)) => write_expr(out, network.expr(e), ni),
        Some(LogicKind::TvFunc(t)) => {
            let tv = network.tv(t);
            write_minterms(out, ni, tv.minterms())
        }
        Some(LogicKind::Cell(_)) | None => Ok(()),
    }
}

fn write_primitive(out: &mut impl Write, prim: PrimType, ni: usize) -> Result<(), Error> {
    match prim {
        PrimType::C0 => writeln!(out, "0")?,
        PrimType::C1 => writeln!(out, "1")?,
        PrimType::Buff => writeln!(out, "1 1")?,
        PrimType::Not => writeln!(out, "0 1")?,
        PrimType::And => writeln!(out, "{} 1", "1".repeat(ni))?,
        PrimType::Nor => writeln!(out, "{} 1", "0".repeat(ni))?,
        PrimType::Nand | PrimType::Or => {
            let c = if prim == PrimType::Nand { '0' } else { '1' };
            for i in 0..ni {
                let cube: String = (0..ni).map(|j| if i == j { c } else { '-' }).collect();
                writeln!(out, "{} 1", cube)?;
            }
        }
        PrimType::Xor | PrimType::Xnor => {
            let odd = prim == PrimType::Xor;
            let rows = (0..1usize << ni).filter(|p| (p.count_ones() % 2 == 1) == odd);
            write_minterms(out, ni, rows)?;
        }
    }
    Ok(())
}

fn write_expr(out: &mut impl Write, expr: &Expr, ni: usize) -> Result<(), Error> {
    if !expr.is_sop() {
        let tv = expr.make_tv(ni);
        return write_minterms(out, ni, tv.minterms());
    }
    match expr {
        Expr::Zero => Ok(()),
        Expr::Or(cubes) => {
            for cube in cubes {
                write_cube(out, cube, ni)?;
            }
            Ok(())
        }
        cube => write_cube(out, cube, ni),
    }
}

fn write_cube(out: &mut impl Write, cube: &Expr, ni: usize) -> Result<(), Error> {
    let mut pat = vec!['-'; ni];
    let lits = match cube {
        Expr::Literal(..) => std::slice::from_ref(cube),
        e => e.operands(),
    };
    for lit in lits {
        if let Expr::Literal(var, inv) = *lit {
            pat[var] = if inv { '0' } else { '1' };
        }
    }
    let pat: String = pat.into_iter().collect();
    if ni == 0 {
        writeln!(out, "1")?;
    } else {
        writeln!(out, "{} 1", pat)?;
    }
    Ok(())
}

fn write_minterms(out: &mut impl Write, ni: usize, rows: impl Iterator<Item = usize>) -> Result<(), Error> {
    for p in rows {
        let pat: String = (0..ni).map(|i| if (p >> i) & 1 == 1 { '1' } else { '0' }).collect();
        if ni == 0 {
            writeln!(out, "1")?;
        } else {
            writeln!(out, "{} 1", pat)?;
        }
    }
    Ok(())
}

/// Unique names of the written nodes.
struct NameTable {
    names: Vec<Option<String>>,
}

impl NameTable {
    fn build(network: &BnNetwork, options: &BlifWriteOptions) -> Self {
        let mut used = HashSet::new();
        let mut counter = 0usize;
        let mut unique = |wanted: &str, used: &mut HashSet<String>| -> String {
            if !wanted.is_empty() && used.insert(wanted.to_string()) {
                return wanted.to_string();
            }
            loop {
                let name = format!("{}{}{}", options.prefix, counter, options.suffix);
                counter += 1;
                if used.insert(name.clone()) {
                    return name;
                }
            }
        };

        let mut names: Vec<Option<String>> = vec![None; network.node_num()];
        for &id in network.primary_inputs() {
            names[id.index()] = Some(unique(network.node(id).name(), &mut used));
        }
        for dff in network.dffs() {
            names[dff.data_out().index()] = Some(unique(dff.name(), &mut used));
        }
        for &id in network.primary_outputs() {
            let wanted = network.node(id).name();
            let src = match network.output_src(id) {
                Some(src) => src,
                None => continue,
            };
            if let Some(src_name) = &names[src.index()] {
                if src_name == wanted {
                    names[id.index()] = Some(wanted.to_string());
                    continue;
                }
            }
            let name = unique(wanted, &mut used);
            let src_node = network.node(src);
            let own_name_lost = src_node.name().is_empty() || used.contains(src_node.name());
            if names[src.index()].is_none() && src_node.is_logic() && own_name_lost {
                names[src.index()] = Some(name.clone());
            }
            names[id.index()] = Some(name);
        }
        for &id in network.logic_list() {
            if names[id.index()].is_none() {
                names[id.index()] = Some(unique(network.node(id).name(), &mut used));
            }
        }
        Self { names }
    }

    fn get(&self, id: NodeId) -> &str {
        self.names[id.index()].as_deref().unwrap_or("")
    }

    /// Name of the node driving the output-type node `id`.
    fn src(&self, network: &BnNetwork, id: NodeId) -> &str {
        network.output_src(id).map(|src| self.get(src)).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blif::{read_blif_str, BlifReadOptions};
    use crate::cell::{Cell, CellLibrary};
    use crate::tvfunc::TvFunc;
    use test_log::test;

    fn write(net: &BnNetwork) -> String {
        write_blif_string(net, &BlifWriteOptions::default()).unwrap()
    }

    #[test]
    fn test_not_sane() {
        let mut net = BnNetwork::new();
        net.new_input("a");
        assert!(matches!(write_blif_string(&net, &BlifWriteOptions::default()), Err(Error::NotSane)));
    }

    #[test]
    fn test_primitive_covers() {
        let mut net = BnNetwork::new();
        net.set_name("prims");
        let a = net.new_input("a");
        let b = net.new_input("b");
        let mut expected = String::from(".model prims\n.inputs a b\n");
        let prims = [
            (PrimType::Nand, "0- 1\n-0 1\n"),
            (PrimType::Or, "1- 1\n-1 1\n"),
            (PrimType::Nor, "00 1\n"),
            (PrimType::Xor, "10 1\n01 1\n"),
            (PrimType::Xnor, "00 1\n11 1\n"),
        ];
        let mut body = String::new();
        let mut outs = Vec::new();
        for (prim, cubes) in prims {
            let name = prim.bench_name().to_lowercase();
            let g = net.new_primitive(&name, 2, prim);
            net.connect(a, g, 0);
            net.connect(b, g, 1);
            let o = net.new_output(&name);
            net.connect(g, o, 0);
            body.push_str(&format!(".names a b {}\n{}", name, cubes));
            outs.push(name);
        }
        let c0 = net.new_primitive("zero", 0, PrimType::C0);
        let o = net.new_output("zero");
        net.connect(c0, o, 0);
        net.wrap_up().unwrap();

        expected.push_str(&format!(".outputs {} zero\n", outs.join(" ")));
        expected.push_str(".names zero\n0\n");
        expected.push_str(&body);
        expected.push_str(".end\n");
        assert_eq!(write(&net), expected);
    }

    #[test]
    fn test_generated_names_and_buffers() {
        let mut net = BnNetwork::new();
        net.set_name("m");
        let a = net.new_input("a");
        let g1 = net.new_primitive("", 1, PrimType::Not);
        let g2 = net.new_primitive("a", 1, PrimType::Not);
        let y = net.new_output("y");
        let z = net.new_output("z");
        let w = net.new_output("w");
        net.connect(a, g1, 0);
        net.connect(g1, g2, 0);
        net.connect(g2, y, 0);
        net.connect(g1, z, 0);
        net.connect(a, w, 0);
        net.wrap_up().unwrap();

        let text = write(&net);
        assert_eq!(
            text,
            ".model m\n.inputs a\n.outputs y z w\n\
             .names a z\n0 1\n\
             .names z y\n0 1\n\
             .names a w\n1 1\n\
             .end\n"
        );
    }

    #[test]
    fn test_duplicate_names_are_renamed() {
        let mut net = BnNetwork::new();
        let a = net.new_input("a");
        let g1 = net.new_primitive("t", 1, PrimType::Not);
        let g2 = net.new_primitive("t", 1, PrimType::Not);
        let y = net.new_output("y");
        net.connect(a, g1, 0);
        net.connect(g1, g2, 0);
        net.connect(g2, y, 0);
        net.wrap_up().unwrap();
        let text = write_blif_string(&net, &BlifWriteOptions { prefix: "n".into(), suffix: "_".into() }).unwrap();
        assert!(text.contains(".names a t\n0 1\n.names t n0_\n0 1\n.names n0_ y\n1 1\n"), "{}", text);
    }

    #[test]
    fn test_many_inputs_wrap() {
        let mut net = BnNetwork::new();
        let ins: Vec<NodeId> = (0..12).map(|i| net.new_input(&format!("i{}", i))).collect();
        let g = net.new_primitive("y", 12, PrimType::And);
        for (pos, &i) in ins.iter().enumerate() {
            net.connect(i, g, pos);
        }
        let y = net.new_output("y");
        net.connect(g, y, 0);
        net.wrap_up().unwrap();
        let text = write(&net);
        assert!(text.contains(".inputs i0 i1 i2 i3 i4 i5 i6 i7 i8 i9\n.inputs i10 i11\n"));
        assert!(text.contains("111111111111 1\n"));
    }

    #[test]
    fn test_latch_and_clock_omitted() {
        let text = ".model m\n.inputs d\n.outputs q\n.latch d q 1\n.end\n";
        let net = read_blif_str(text, "t", None, &BlifReadOptions::default()).unwrap();
        assert_eq!(write(&net), text);
    }

    #[test]
    fn test_expr_and_tv_nodes() {
        let mut net = BnNetwork::new();
        let ins: Vec<NodeId> = (0..3).map(|i| net.new_input(&format!("x{}", i))).collect();
        let sop = Expr::or(vec![
            Expr::and(vec![Expr::posi_literal(0), Expr::nega_literal(2)]),
            Expr::posi_literal(1),
        ]);
        let e = net.new_expr("e", 3, sop);
        let maj = net.new_tv("m", TvFunc::from_fn(3, |p| p.count_ones() >= 2));
        let nested = Expr::and(vec![
            Expr::posi_literal(0),
            Expr::or(vec![Expr::posi_literal(1), Expr::posi_literal(2)]),
        ]);
        let n = net.new_expr("n", 3, nested);
        for g in [e, maj, n] {
            for (pos, &i) in ins.iter().enumerate() {
                net.connect(i, g, pos);
            }
            let name = net.node(g).name().to_string();
            let o = net.new_output(&name);
            net.connect(g, o, 0);
        }
        net.wrap_up().unwrap();
        let text = write(&net);
        assert!(text.contains(".names x0 x1 x2 e\n1-0 1\n-1- 1\n"), "{}", text);
        assert!(text.contains(".names x0 x1 x2 m\n110 1\n101 1\n011 1\n111 1\n"), "{}", text);
        assert!(text.contains(".names x0 x1 x2 n\n110 1\n101 1\n111 1\n"), "{}", text);
    }

    #[test]
    fn test_gate_output() {
        let mut lib = CellLibrary::new("lib");
        lib.add_cell(Cell::logic(
            "NAND2",
            &["A", "B"],
            "Y",
            !Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]),
        ));
        let text = ".model m\n.inputs a b\n.outputs y\n.gate NAND2 A=a B=b Y=y\n.end\n";
        let net = read_blif_str(text, "t", Some(&lib), &BlifReadOptions::default()).unwrap();
        assert_eq!(write(&net), text);
    }

    #[test]
    fn test_latches_rejected() {
        let mut net = BnNetwork::new();
        let l = net.new_latch("l", false, false);
        let (din, dout, en) = (net.latch(l).data_in(), net.latch(l).data_out(), net.latch(l).enable());
        let e = net.new_input("e");
        net.connect(dout, din, 0);
        net.connect(e, en, 0);
        net.wrap_up().unwrap();
        assert!(matches!(write_blif_string(&net, &BlifWriteOptions::default()), Err(Error::Handler(_))));
    }
}
