use std::collections::VecDeque;

use super::{BnNetwork, NodeKind, PortDirection};
use crate::error::{Diagnostic, Error};
use crate::types::NodeId;

impl BnNetwork {
    /// Validates the network and computes fan-outs and the logic order.
    ///
    /// Every violation is reported (logged and returned), not only the first.
    /// On success the network is sane; calling `wrap_up` again without a
    /// mutation in between does nothing.
    pub fn wrap_up(&mut self) -> Result<(), Error> {
        if self.sane {
            return Ok(());
        }

        let mut errors = Vec::new();
        self.check_terminals(&mut errors);
        self.check_fanins(&mut errors);
        if !errors.is_empty() {
            for e in errors.iter() {
                e.log();
            }
            return Err(Error::Structural(errors));
        }

        self.rebuild_fanouts();

        let unsorted = self.sort_logic();
        if !unsorted.is_empty() {
            let errors: Vec<Diagnostic> = unsorted
                .iter()
                .map(|&id| {
                    let node = self.node(id);
                    Diagnostic::structural(format!("{}({}): on a combinational loop", node.name(), id))
                })
                .collect();
            for e in errors.iter() {
                e.log();
            }
            self.logic.clear();
            return Err(Error::Structural(errors));
        }

        log::debug!(
            "wrap_up '{}': {} input(s), {} output(s), {} dff(s), {} latch(es), {} logic node(s)",
            self.name,
            self.primary_inputs.len(),
            self.primary_outputs.len(),
            self.dffs.len(),
            self.latches.len(),
            self.logic.len()
        );
        self.sane = true;
        Ok(())
    }

    fn check_kind(&self, id: NodeId, expected: NodeKind, what: &str, errors: &mut Vec<Diagnostic>) {
        if id.index() >= self.nodes.len() {
            errors.push(Diagnostic::structural(format!("{}: {} is not a valid node", what, id)));
        } else if self.node(id).kind() != expected {
            errors.push(Diagnostic::structural(format!(
                "{}: {} is {:?}, expected {:?}",
                what,
                id,
                self.node(id).kind(),
                expected
            )));
        }
    }

    fn check_terminals(&self, errors: &mut Vec<Diagnostic>) {
        for port in self.ports.iter() {
            for (i, &bit) in port.bits().iter().enumerate() {
                let expected = match port.direction(i) {
                    PortDirection::Input => NodeKind::Input,
                    PortDirection::Output => NodeKind::Output,
                };
                let what = format!("port '{}' bit {}", port.name(), i);
                self.check_kind(bit, expected, &what, errors);
            }
        }

        for dff in self.dffs.iter() {
            let what = |t: &str| format!("dff '{}' {}", dff.name(), t);
            self.check_kind(dff.data_in(), NodeKind::Output, &what("data-in"), errors);
            self.check_kind(dff.data_out(), NodeKind::Input, &what("data-out"), errors);
            self.check_kind(dff.clock(), NodeKind::Output, &what("clock"), errors);
            if let Some(id) = dff.clear() {
                self.check_kind(id, NodeKind::Output, &what("clear"), errors);
            }
            if let Some(id) = dff.preset() {
                self.check_kind(id, NodeKind::Output, &what("preset"), errors);
            }
        }

        for latch in self.latches.iter() {
            let what = |t: &str| format!("latch '{}' {}", latch.name(), t);
            self.check_kind(latch.data_in(), NodeKind::Output, &what("data-in"), errors);
            self.check_kind(latch.data_out(), NodeKind::Input, &what("data-out"), errors);
            self.check_kind(latch.enable(), NodeKind::Output, &what("enable"), errors);
            if let Some(id) = latch.clear() {
                self.check_kind(id, NodeKind::Output, &what("clear"), errors);
            }
            if let Some(id) = latch.preset() {
                self.check_kind(id, NodeKind::Output, &what("preset"), errors);
            }
        }
    }

    fn check_fanins(&self, errors: &mut Vec<Diagnostic>) {
        for node in self.nodes.iter() {
            for (pos, slot) in node.fanin_slots().iter().enumerate() {
                match slot {
                    None => errors.push(Diagnostic::structural(format!(
                        "{}({}): fan-in #{} is not connected",
                        node.name(),
                        node.id(),
                        pos
                    ))),
                    Some(src) if src.index() >= self.nodes.len() => errors.push(Diagnostic::structural(format!(
                        "{}({}): fan-in #{} refers to invalid node {}",
                        node.name(),
                        node.id(),
                        pos,
                        src
                    ))),
                    Some(_) => {}
                }
            }
        }
    }

    /// Recomputes fan-out lists in (destination id, slot) order.
    fn rebuild_fanouts(&mut self) {
        for node in self.nodes.iter_mut() {
            node.fanouts_mut().clear();
        }
        for i in 0..self.nodes.len() {
            let dst = self.nodes[i].id();
            let srcs: Vec<NodeId> = self.nodes[i].fanins().collect();
            for src in srcs {
                self.nodes[src.index()].fanouts_mut().push(dst);
            }
        }
    }

    /// Kahn-style sort seeded by input nodes and fan-in-less logic nodes.
    ///
    /// Returns the logic nodes that could not be ordered.
    fn sort_logic(&mut self) -> Vec<NodeId> {
        let n = self.nodes.len();
        let mut emitted = vec![false; n];
        let mut queue = VecDeque::new();
        self.logic.clear();

        for &id in self.inputs.iter() {
            emitted[id.index()] = true;
            queue.push_back(id);
        }
        for node in self.nodes.iter() {
            if node.is_logic() && node.fanin_num() == 0 {
                emitted[node.id().index()] = true;
                self.logic.push(node.id());
                queue.push_back(node.id());
            }
        }

        while let Some(id) = queue.pop_front() {
            for &fo in self.nodes[id.index()].fanouts() {
                let node = &self.nodes[fo.index()];
                if emitted[fo.index()] || !node.is_logic() {
                    continue;
                }
                if node.fanins().all(|src| emitted[src.index()]) {
                    emitted[fo.index()] = true;
                    self.logic.push(fo);
                    queue.push_back(fo);
                }
            }
        }

        self.nodes
            .iter()
            .filter(|node| node.is_logic() && !emitted[node.id().index()])
            .map(|node| node.id())
            .collect()
    }
}
