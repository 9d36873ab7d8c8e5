//! Forward-reference resolution shared by the network readers.
//!
//! Readers create a node as soon as its defining statement is seen and record
//! the symbol ids of its fan-ins. Once the whole file has been read,
//! [`NetBuilder::finish`] binds every recorded fan-in and wraps up the network.

use std::collections::HashMap;

use crate::error::Error;
use crate::network::BnNetwork;
use crate::types::NodeId;

pub(crate) struct NetBuilder<'n> {
    network: &'n mut BnNetwork,
    /// Symbol id -> node that defines the symbol.
    defs: HashMap<usize, NodeId>,
    /// Node -> fan-in symbol ids, slot by slot.
    pending: Vec<(NodeId, Vec<usize>)>,
    /// Primary inputs by name, for implicit clock/reset ports.
    named_inputs: HashMap<String, NodeId>,
}

impl<'n> NetBuilder<'n> {
    pub(crate) fn new(network: &'n mut BnNetwork) -> Self {
        Self {
            network,
            defs: HashMap::new(),
            pending: Vec::new(),
            named_inputs: HashMap::new(),
        }
    }

    pub(crate) fn network(&mut self) -> &mut BnNetwork {
        &mut *self.network
    }

    /// Resets both the builder and the network.
    pub(crate) fn clear(&mut self) {
        self.network.clear();
        self.defs.clear();
        self.pending.clear();
        self.named_inputs.clear();
    }

    /// Records that `node` defines the symbol `sym`.
    pub(crate) fn define(&mut self, sym: usize, node: NodeId) {
        self.defs.insert(sym, node);
    }

    /// Creates a primary input for symbol `sym`.
    ///
    /// An implicit input of the same name created earlier is reused.
    pub(crate) fn new_input(&mut self, sym: usize, name: &str) -> NodeId {
        let node = match self.named_inputs.get(name) {
            Some(&node) => node,
            None => {
                let node = self.network.new_input(name);
                self.named_inputs.insert(name.to_string(), node);
                node
            }
        };
        self.define(sym, node);
        node
    }

    /// Records the fan-in symbols of `node`, bound later by `finish`.
    pub(crate) fn add_fanins(&mut self, node: NodeId, syms: Vec<usize>) {
        self.pending.push((node, syms));
    }

    /// Returns the primary input called `name`, creating a port on first use.
    pub(crate) fn implicit_input(&mut self, name: &str) -> NodeId {
        if let Some(&node) = self.named_inputs.get(name) {
            return node;
        }
        log::debug!("create implicit input port '{}'", name);
        let node = self.network.new_input(name);
        self.named_inputs.insert(name.to_string(), node);
        node
    }

    /// Binds every recorded fan-in and runs `wrap_up`.
    pub(crate) fn finish(&mut self, sym_name: impl Fn(usize) -> String) -> Result<(), Error> {
        let pending = std::mem::take(&mut self.pending);
        for (node, syms) in pending {
            for (pos, sym) in syms.into_iter().enumerate() {
                let src = self
                    .defs
                    .get(&sym)
                    .copied()
                    .ok_or_else(|| Error::Handler(format!("{}: undefined signal", sym_name(sym))))?;
                self.network.connect(src, node, pos);
            }
        }
        self.network.wrap_up()
    }
}
