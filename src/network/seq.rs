//! Sequential elements.
//!
//! A DFF or latch is a bundle of terminal nodes. Data-in, clock/enable,
//! clear and preset are output-type nodes (they sink a signal from the
//! combinational part); data-out is an input-type node (it sources one).

use crate::types::{DffId, LatchId, NodeId};

#[derive(Debug, Clone)]
pub struct BnDff {
    pub(crate) id: DffId,
    pub(crate) name: String,
    pub(crate) data_in: NodeId,
    pub(crate) data_out: NodeId,
    pub(crate) clock: NodeId,
    pub(crate) clear: Option<NodeId>,
    pub(crate) preset: Option<NodeId>,
}

impl BnDff {
    pub fn id(&self) -> DffId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_in(&self) -> NodeId {
        self.data_in
    }

    pub fn data_out(&self) -> NodeId {
        self.data_out
    }

    pub fn clock(&self) -> NodeId {
        self.clock
    }

    pub fn clear(&self) -> Option<NodeId> {
        self.clear
    }

    pub fn preset(&self) -> Option<NodeId> {
        self.preset
    }
}

#[derive(Debug, Clone)]
pub struct BnLatch {
    pub(crate) id: LatchId,
    pub(crate) name: String,
    pub(crate) data_in: NodeId,
    pub(crate) data_out: NodeId,
    pub(crate) enable: NodeId,
    pub(crate) clear: Option<NodeId>,
    pub(crate) preset: Option<NodeId>,
}

impl BnLatch {
    pub fn id(&self) -> LatchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_in(&self) -> NodeId {
        self.data_in
    }

    pub fn data_out(&self) -> NodeId {
        self.data_out
    }

    pub fn enable(&self) -> NodeId {
        self.enable
    }

    pub fn clear(&self) -> Option<NodeId> {
        self.clear
    }

    pub fn preset(&self) -> Option<NodeId> {
        self.preset
    }
}
