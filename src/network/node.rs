use crate::prim::PrimType;
use crate::types::NodeId;

/// Function carried by a logic node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LogicKind {
    Primitive(PrimType),
    /// Index into the network's expression pool.
    Expr(usize),
    /// Index into the network's truth-table pool.
    TvFunc(usize),
    /// Index into the network's cell library.
    Cell(usize),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// Source node: a primary input bit or the output of a DFF or latch.
    Input,
    /// Sink node with exactly one fan-in: a primary output bit or a
    /// DFF/latch data-in, clock, enable, clear or preset terminal.
    Output,
    Logic(LogicKind),
}

#[derive(Debug, Clone)]
pub struct BnNode {
    id: NodeId,
    name: String,
    kind: NodeKind,
    fanins: Vec<Option<NodeId>>,
    fanouts: Vec<NodeId>,
}

impl BnNode {
    pub(crate) fn new(id: NodeId, name: &str, kind: NodeKind, fanin_num: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            fanins: vec![None; fanin_num],
            fanouts: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_input(&self) -> bool {
        self.kind == NodeKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == NodeKind::Output
    }

    pub fn is_logic(&self) -> bool {
        matches!(self.kind, NodeKind::Logic(_))
    }

    pub fn logic_kind(&self) -> Option<LogicKind> {
        match self.kind {
            NodeKind::Logic(k) => Some(k),
            _ => None,
        }
    }

    pub fn primitive_type(&self) -> Option<PrimType> {
        match self.kind {
            NodeKind::Logic(LogicKind::Primitive(t)) => Some(t),
            _ => None,
        }
    }

    pub fn expr_id(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Logic(LogicKind::Expr(id)) => Some(id),
            _ => None,
        }
    }

    pub fn tv_id(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Logic(LogicKind::TvFunc(id)) => Some(id),
            _ => None,
        }
    }

    pub fn cell_id(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Logic(LogicKind::Cell(id)) => Some(id),
            _ => None,
        }
    }

    pub fn fanin_num(&self) -> usize {
        self.fanins.len()
    }

    /// Fan-in bound to slot `pos`, if any.
    pub fn fanin(&self, pos: usize) -> Option<NodeId> {
        self.fanins[pos]
    }

    /// Fan-in slots in order; `None` marks an unbound slot.
    pub fn fanin_slots(&self) -> &[Option<NodeId>] {
        &self.fanins
    }

    /// Bound fan-ins in slot order.
    pub fn fanins(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.fanins.iter().flatten().copied()
    }

    /// Fan-outs as of the last successful `wrap_up`.
    pub fn fanouts(&self) -> &[NodeId] {
        &self.fanouts
    }

    pub(crate) fn set_fanin(&mut self, pos: usize, src: NodeId) -> Option<NodeId> {
        self.fanins[pos].replace(src)
    }

    pub(crate) fn fanouts_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.fanouts
    }
}
