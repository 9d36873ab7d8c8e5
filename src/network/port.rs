use crate::types::{NodeId, PortId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

/// A named connector whose bits are input or output nodes.
#[derive(Debug, Clone)]
pub struct BnPort {
    id: PortId,
    name: String,
    bits: Vec<NodeId>,
    dirs: Vec<PortDirection>,
}

impl BnPort {
    pub(crate) fn new(id: PortId, name: &str, bits: Vec<NodeId>, dirs: Vec<PortDirection>) -> Self {
        debug_assert_eq!(bits.len(), dirs.len());
        Self {
            id,
            name: name.to_string(),
            bits,
            dirs,
        }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bit_width(&self) -> usize {
        self.bits.len()
    }

    pub fn bit(&self, i: usize) -> NodeId {
        self.bits[i]
    }

    pub fn bits(&self) -> &[NodeId] {
        &self.bits
    }

    pub fn direction(&self, i: usize) -> PortDirection {
        self.dirs[i]
    }
}
