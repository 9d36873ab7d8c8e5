//! The Boolean network.
//!
//! A [`BnNetwork`] owns every record it refers to: ports, DFF and latch
//! bundles, nodes, and the expression and truth-table pools that logic nodes
//! index into. Records are appended during construction; fan-in slots are
//! bound with [`connect`](BnNetwork::connect) in any order, so readers can
//! create a node before its fan-ins exist.
//!
//! Before a network is handed to a back end it must pass
//! [`wrap_up`](BnNetwork::wrap_up), which validates that every terminal and
//! fan-in is bound and computes fan-out lists and a topological order of the
//! logic nodes. Any later mutation invalidates that result.
//!
//! # Example
//!
//! ```
//! use bnet_rs::network::BnNetwork;
//! use bnet_rs::prim::PrimType;
//!
//! let mut net = BnNetwork::new();
//! net.set_name("half_adder");
//! let a = net.new_input("a");
//! let b = net.new_input("b");
//! let s = net.new_primitive("s", 2, PrimType::Xor);
//! let c = net.new_primitive("c", 2, PrimType::And);
//! for gate in [s, c] {
//!     net.connect(a, gate, 0);
//!     net.connect(b, gate, 1);
//! }
//! let os = net.new_output("s");
//! let oc = net.new_output("c");
//! net.connect(s, os, 0);
//! net.connect(c, oc, 0);
//! net.wrap_up().unwrap();
//! assert_eq!(net.logic_list().len(), 2);
//! ```

mod node;
mod port;
mod seq;
mod sim;
mod wrap_up;

pub use node::{BnNode, LogicKind, NodeKind};
pub use port::{BnPort, PortDirection};
pub use seq::{BnDff, BnLatch};
pub use sim::SimResult;

use crate::cell::CellLibrary;
use crate::error::Error;
use crate::expr::Expr;
use crate::pool::{ExprPool, TvPool};
use crate::prim::{analyze_expr, analyze_tv, PrimType};
use crate::tvfunc::TvFunc;
use crate::types::{DffId, LatchId, NodeId, PortId};

#[derive(Debug, Clone, Default)]
pub struct BnNetwork {
    name: String,
    library: Option<CellLibrary>,
    ports: Vec<BnPort>,
    dffs: Vec<BnDff>,
    latches: Vec<BnLatch>,
    nodes: Vec<BnNode>,
    /// All input-type nodes in creation order.
    inputs: Vec<NodeId>,
    /// All output-type nodes in creation order.
    outputs: Vec<NodeId>,
    primary_inputs: Vec<NodeId>,
    primary_outputs: Vec<NodeId>,
    /// Logic nodes in topological order (valid while `sane`).
    logic: Vec<NodeId>,
    exprs: ExprPool,
    tvs: TvPool,
    sane: bool,
}

impl BnNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every record; the network becomes empty and unnamed.
    pub fn clear(&mut self) {
        log::debug!("clear network '{}'", self.name);
        *self = Self {
            library: self.library.take(),
            ..Self::default()
        };
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn library(&self) -> Option<&CellLibrary> {
        self.library.as_ref()
    }

    pub fn set_library(&mut self, library: CellLibrary) {
        self.library = Some(library);
        self.sane = false;
    }

    /// Returns `true` after a successful `wrap_up` with no mutation since.
    pub fn is_sane(&self) -> bool {
        self.sane
    }
}

// Construction
impl BnNetwork {
    fn push_node(&mut self, name: &str, kind: NodeKind, fanin_num: usize) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(BnNode::new(id, name, kind, fanin_num));
        match kind {
            NodeKind::Input => self.inputs.push(id),
            NodeKind::Output => self.outputs.push(id),
            NodeKind::Logic(_) => {}
        }
        self.sane = false;
        id
    }

    /// Creates a port with one node per entry of `dirs`.
    ///
    /// Bit nodes are named after the port; multi-bit ports name them
    /// `name[i]`.
    pub fn new_port(&mut self, name: &str, dirs: &[PortDirection]) -> PortId {
        let id = PortId::new(self.ports.len());
        let mut bits = Vec::with_capacity(dirs.len());
        for (i, &dir) in dirs.iter().enumerate() {
            let bit_name = if dirs.len() == 1 {
                name.to_string()
            } else {
                format!("{}[{}]", name, i)
            };
            let node = match dir {
                PortDirection::Input => {
                    let node = self.push_node(&bit_name, NodeKind::Input, 0);
                    self.primary_inputs.push(node);
                    node
                }
                PortDirection::Output => {
                    let node = self.push_node(&bit_name, NodeKind::Output, 1);
                    self.primary_outputs.push(node);
                    node
                }
            };
            bits.push(node);
        }
        log::debug!("new port {} '{}' with {} bit(s)", id, name, bits.len());
        self.ports.push(BnPort::new(id, name, bits, dirs.to_vec()));
        id
    }

    pub fn new_input_port(&mut self, name: &str, width: usize) -> PortId {
        self.new_port(name, &vec![PortDirection::Input; width])
    }

    pub fn new_output_port(&mut self, name: &str, width: usize) -> PortId {
        self.new_port(name, &vec![PortDirection::Output; width])
    }

    /// Creates a 1-bit input port and returns its node.
    pub fn new_input(&mut self, name: &str) -> NodeId {
        let port = self.new_input_port(name, 1);
        self.ports[port.index()].bit(0)
    }

    /// Creates a 1-bit output port and returns its node.
    pub fn new_output(&mut self, name: &str) -> NodeId {
        let port = self.new_output_port(name, 1);
        self.ports[port.index()].bit(0)
    }

    /// Creates a DFF bundle: `name.input`, `name.output`, `name.clock`
    /// and the optional `name.clear` / `name.preset` terminals.
    pub fn new_dff(&mut self, name: &str, has_clear: bool, has_preset: bool) -> DffId {
        let id = DffId::new(self.dffs.len());
        let data_in = self.push_node(&format!("{}.input", name), NodeKind::Output, 1);
        let data_out = self.push_node(&format!("{}.output", name), NodeKind::Input, 0);
        let clock = self.push_node(&format!("{}.clock", name), NodeKind::Output, 1);
        let clear = has_clear.then(|| self.push_node(&format!("{}.clear", name), NodeKind::Output, 1));
        let preset = has_preset.then(|| self.push_node(&format!("{}.preset", name), NodeKind::Output, 1));
        log::debug!("new dff {} '{}'", id, name);
        self.dffs.push(BnDff {
            id,
            name: name.to_string(),
            data_in,
            data_out,
            clock,
            clear,
            preset,
        });
        id
    }

    /// Creates a latch bundle; like [`new_dff`](Self::new_dff) with an
    /// `name.enable` terminal in place of the clock.
    pub fn new_latch(&mut self, name: &str, has_clear: bool, has_preset: bool) -> LatchId {
        let id = LatchId::new(self.latches.len());
        let data_in = self.push_node(&format!("{}.input", name), NodeKind::Output, 1);
        let data_out = self.push_node(&format!("{}.output", name), NodeKind::Input, 0);
        let enable = self.push_node(&format!("{}.enable", name), NodeKind::Output, 1);
        let clear = has_clear.then(|| self.push_node(&format!("{}.clear", name), NodeKind::Output, 1));
        let preset = has_preset.then(|| self.push_node(&format!("{}.preset", name), NodeKind::Output, 1));
        log::debug!("new latch {} '{}'", id, name);
        self.latches.push(BnLatch {
            id,
            name: name.to_string(),
            data_in,
            data_out,
            enable,
            clear,
            preset,
        });
        id
    }

    /// Creates a built-in gate with `input_num` unbound fan-ins.
    ///
    /// # Panics
    ///
    /// Panics if `prim` does not accept `input_num` inputs.
    pub fn new_primitive(&mut self, name: &str, input_num: usize, prim: PrimType) -> NodeId {
        assert!(prim.accepts_arity(input_num), "{} gate cannot have {} inputs", prim, input_num);
        self.push_node(name, NodeKind::Logic(LogicKind::Primitive(prim)), input_num)
    }

    /// Creates a logic node computing `expr` over `input_num` fan-ins.
    ///
    /// If the function equals a built-in gate type, a primitive node is
    /// created instead.
    ///
    /// # Panics
    ///
    /// Panics if `expr` mentions an input `>= input_num`.
    pub fn new_expr(&mut self, name: &str, input_num: usize, expr: Expr) -> NodeId {
        assert!(expr.input_size() <= input_num, "expression uses more than {} inputs", input_num);
        if let Some(prim) = analyze_expr(&expr, input_num) {
            return self.new_primitive(name, input_num, prim);
        }
        let expr_id = self.exprs.reg(input_num, expr);
        self.push_node(name, NodeKind::Logic(LogicKind::Expr(expr_id)), input_num)
    }

    /// Creates a logic node computing the truth table `tv`.
    ///
    /// If the function equals a built-in gate type, a primitive node is
    /// created instead.
    pub fn new_tv(&mut self, name: &str, tv: TvFunc) -> NodeId {
        let input_num = tv.input_num();
        if let Some(prim) = analyze_tv(&tv) {
            return self.new_primitive(name, input_num, prim);
        }
        let tv_id = self.tvs.reg(tv);
        self.push_node(name, NodeKind::Logic(LogicKind::TvFunc(tv_id)), input_num)
    }

    /// Creates an instance of a combinational library cell.
    pub fn new_cell_logic(&mut self, name: &str, cell_id: usize) -> Result<NodeId, Error> {
        let library = self
            .library
            .as_ref()
            .ok_or_else(|| Error::Handler("no cell library is bound to the network".to_string()))?;
        if cell_id >= library.len() {
            return Err(Error::Handler(format!("cell #{} does not exist", cell_id)));
        }
        let cell = library.cell(cell_id);
        if !cell.is_logic() || cell.output_num() != 1 || cell.function().is_none() {
            return Err(Error::Handler(format!("{}: not a single-output logic cell", cell.name())));
        }
        let input_num = cell.input_num();
        Ok(self.push_node(name, NodeKind::Logic(LogicKind::Cell(cell_id)), input_num))
    }

    /// Binds fan-in slot `pos` of `dst` to `src`.
    ///
    /// A previously bound slot is rebound.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range, `src` is an output-type node, or
    /// `pos` is not a fan-in slot of `dst`.
    pub fn connect(&mut self, src: NodeId, dst: NodeId, pos: usize) {
        assert!(src.index() < self.nodes.len(), "source {} out of range", src);
        assert!(dst.index() < self.nodes.len(), "destination {} out of range", dst);
        assert!(!self.nodes[src.index()].is_output(), "output node {} cannot drive a fan-in", src);
        let fanin_num = self.nodes[dst.index()].fanin_num();
        assert!(pos < fanin_num, "{} has {} fan-in(s), got position {}", dst, fanin_num, pos);

        if let Some(old) = self.nodes[dst.index()].set_fanin(pos, src) {
            let fanouts = self.nodes[old.index()].fanouts_mut();
            if let Some(i) = fanouts.iter().position(|&id| id == dst) {
                fanouts.remove(i);
            }
        }
        self.nodes[src.index()].fanouts_mut().push(dst);
        self.sane = false;
    }
}

// Access
impl BnNetwork {
    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &BnNode {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[BnNode] {
        &self.nodes
    }

    pub fn port_num(&self) -> usize {
        self.ports.len()
    }

    pub fn port(&self, id: PortId) -> &BnPort {
        &self.ports[id.index()]
    }

    pub fn ports(&self) -> &[BnPort] {
        &self.ports
    }

    /// Finds a port by name.
    pub fn find_port(&self, name: &str) -> Option<PortId> {
        self.ports.iter().find(|p| p.name() == name).map(BnPort::id)
    }

    pub fn dff_num(&self) -> usize {
        self.dffs.len()
    }

    pub fn dff(&self, id: DffId) -> &BnDff {
        &self.dffs[id.index()]
    }

    pub fn dffs(&self) -> &[BnDff] {
        &self.dffs
    }

    pub fn latch_num(&self) -> usize {
        self.latches.len()
    }

    pub fn latch(&self, id: LatchId) -> &BnLatch {
        &self.latches[id.index()]
    }

    pub fn latches(&self) -> &[BnLatch] {
        &self.latches
    }

    /// All input-type nodes (primary inputs and DFF/latch outputs).
    pub fn input_list(&self) -> &[NodeId] {
        &self.inputs
    }

    /// All output-type nodes (primary outputs and DFF/latch terminals).
    pub fn output_list(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn primary_inputs(&self) -> &[NodeId] {
        &self.primary_inputs
    }

    pub fn primary_outputs(&self) -> &[NodeId] {
        &self.primary_outputs
    }

    /// Logic nodes in topological order, as computed by the last `wrap_up`.
    pub fn logic_list(&self) -> &[NodeId] {
        &self.logic
    }

    /// Node driving the output-type node `id`.
    pub fn output_src(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if node.is_output() {
            node.fanin(0)
        } else {
            None
        }
    }

    pub fn expr_num(&self) -> usize {
        self.exprs.len()
    }

    pub fn expr(&self, id: usize) -> &Expr {
        self.exprs.expr(id)
    }

    pub fn tv_num(&self) -> usize {
        self.tvs.len()
    }

    pub fn tv(&self, id: usize) -> &TvFunc {
        self.tvs.func(id)
    }

    /// Function of a logic node as an expression over its fan-in positions.
    pub fn logic_expr(&self, id: NodeId) -> Option<Expr> {
        let node = self.node(id);
        let ni = node.fanin_num();
        match node.logic_kind()? {
            LogicKind::Primitive(prim) => Some(prim.make_expr(ni)),
            LogicKind::Expr(e) => Some(self.expr(e).clone()),
            LogicKind::TvFunc(t) => {
                let tv = self.tv(t);
                let minterms = tv.minterms().map(|p| Expr::and((0..ni).map(|i| Expr::literal(i, (p >> i) & 1 == 0))));
                Some(Expr::or(minterms))
            }
            LogicKind::Cell(c) => self.library.as_ref()?.cell(c).function().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use test_log::test;

    #[test]
    fn test_ports() {
        let mut net = BnNetwork::new();
        let p = net.new_input_port("data", 3);
        let q = net.new_port("mixed", &[PortDirection::Input, PortDirection::Output]);
        assert_eq!(net.port(p).bit_width(), 3);
        assert_eq!(net.node(net.port(p).bit(2)).name(), "data[2]");
        assert_eq!(net.primary_inputs().len(), 4);
        assert_eq!(net.primary_outputs().len(), 1);
        assert!(net.node(net.port(q).bit(1)).is_output());
        assert_eq!(net.find_port("mixed"), Some(q));
    }

    #[test]
    fn test_dff_bundle() {
        let mut net = BnNetwork::new();
        let d = net.new_dff("r", true, false);
        let dff = net.dff(d);
        assert_eq!(net.node(dff.data_in()).name(), "r.input");
        assert!(net.node(dff.data_in()).is_output());
        assert!(net.node(dff.data_out()).is_input());
        assert!(net.node(dff.clock()).is_output());
        assert!(dff.clear().is_some());
        assert!(dff.preset().is_none());
        assert_eq!(net.input_list(), &[dff.data_out()]);
        assert!(net.primary_inputs().is_empty());

        let l = net.new_latch("q", false, true);
        assert_eq!(net.node(net.latch(l).enable()).name(), "q.enable");
        assert!(net.latch(l).preset().is_some());
    }

    #[test]
    fn test_expr_downgrades_to_primitive() {
        let mut net = BnNetwork::new();
        let e = !Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]);
        let n = net.new_expr("g", 2, e);
        assert_eq!(net.node(n).primitive_type(), Some(PrimType::Nand));
        assert_eq!(net.expr_num(), 0);

        let e = Expr::and(vec![Expr::posi_literal(0), Expr::nega_literal(1)]);
        let m = net.new_expr("h", 2, e.clone());
        let k = net.new_expr("k", 2, e);
        assert_eq!(net.node(m).expr_id(), Some(0));
        assert_eq!(net.node(k).expr_id(), Some(0));
        assert_eq!(net.expr_num(), 1);
    }

    #[test]
    fn test_tv_downgrades_to_primitive() {
        let mut net = BnNetwork::new();
        let n = net.new_tv("x", PrimType::Xnor.make_tv(3));
        assert_eq!(net.node(n).primitive_type(), Some(PrimType::Xnor));
        let maj = TvFunc::from_fn(3, |p| p.count_ones() >= 2);
        let m = net.new_tv("m", maj);
        assert_eq!(net.node(m).tv_id(), Some(0));
        assert_eq!(net.node(m).fanin_num(), 3);
    }

    #[test]
    fn test_cell_logic() {
        let mut net = BnNetwork::new();
        assert!(net.new_cell_logic("u1", 0).is_err());
        let mut lib = CellLibrary::new("lib");
        let aoi = lib.add_cell(Cell::logic(
            "AOI21",
            &["A", "B", "C"],
            "Y",
            !Expr::or(vec![Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]), Expr::posi_literal(2)]),
        ));
        net.set_library(lib);
        let u = net.new_cell_logic("u1", aoi).unwrap();
        assert_eq!(net.node(u).cell_id(), Some(aoi));
        assert_eq!(net.node(u).fanin_num(), 3);
        assert!(net.logic_expr(u).is_some());
    }

    #[test]
    fn test_connect_rebinds() {
        let mut net = BnNetwork::new();
        let a = net.new_input("a");
        let b = net.new_input("b");
        let g = net.new_primitive("g", 1, PrimType::Not);
        net.connect(a, g, 0);
        assert_eq!(net.node(a).fanouts(), &[g]);
        net.connect(b, g, 0);
        assert!(net.node(a).fanouts().is_empty());
        assert_eq!(net.node(b).fanouts(), &[g]);
        assert_eq!(net.node(g).fanin(0), Some(b));
    }

    #[test]
    #[should_panic]
    fn test_connect_bad_position() {
        let mut net = BnNetwork::new();
        let a = net.new_input("a");
        let g = net.new_primitive("g", 1, PrimType::Buff);
        net.connect(a, g, 1);
    }

    #[test]
    fn test_clear_keeps_library() {
        let mut net = BnNetwork::new();
        net.set_library(CellLibrary::new("lib"));
        net.set_name("top");
        net.new_input("a");
        net.clear();
        assert_eq!(net.node_num(), 0);
        assert_eq!(net.name(), "");
        assert!(net.library().is_some());
    }
}
