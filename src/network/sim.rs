use super::{BnNetwork, LogicKind, NodeKind};
use crate::error::Error;
use crate::types::NodeId;

/// Values computed by one simulation step.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimResult {
    /// One value per primary output, in `primary_outputs()` order.
    pub outputs: Vec<bool>,
    /// Next state of each DFF, then each latch (value at data-in).
    pub next_state: Vec<bool>,
}

impl BnNetwork {
    /// Evaluates the combinational part once.
    ///
    /// `inputs` holds one value per primary input; `state` holds the current
    /// output of each DFF followed by each latch (missing entries are 0).
    pub fn simulate(&self, inputs: &[bool], state: &[bool]) -> Result<SimResult, Error> {
        if !self.sane {
            return Err(Error::NotSane);
        }
        if inputs.len() != self.primary_inputs.len() {
            return Err(Error::Handler(format!(
                "expected {} input value(s), got {}",
                self.primary_inputs.len(),
                inputs.len()
            )));
        }

        let mut values = vec![false; self.nodes.len()];
        for (&id, &v) in self.primary_inputs.iter().zip(inputs) {
            values[id.index()] = v;
        }
        let seq_outputs = self
            .dffs
            .iter()
            .map(|d| d.data_out())
            .chain(self.latches.iter().map(|l| l.data_out()));
        for (k, id) in seq_outputs.enumerate() {
            values[id.index()] = state.get(k).copied().unwrap_or(false);
        }

        for &id in self.logic.iter() {
            values[id.index()] = self.eval_node(id, &values)?;
        }
        let src_value = |id: NodeId| self.output_src(id).map(|src| values[src.index()]).unwrap_or(false);

        let outputs = self.primary_outputs.iter().map(|&id| src_value(id)).collect();
        let next_state = self
            .dffs
            .iter()
            .map(|d| d.data_in())
            .chain(self.latches.iter().map(|l| l.data_in()))
            .map(src_value)
            .collect();
        Ok(SimResult { outputs, next_state })
    }

    fn eval_node(&self, id: NodeId, values: &[bool]) -> Result<bool, Error> {
        let node = self.node(id);
        let ins: Vec<bool> = node.fanins().map(|src| values[src.index()]).collect();
        let v = match node.kind() {
            NodeKind::Logic(LogicKind::Primitive(prim)) => prim.eval(&ins),
            NodeKind::Logic(LogicKind::Expr(e)) => self.expr(e).eval(&ins),
            NodeKind::Logic(LogicKind::TvFunc(t)) => self.tv(t).eval(&ins),
            NodeKind::Logic(LogicKind::Cell(_)) => self
                .logic_expr(id)
                .ok_or_else(|| Error::Handler(format!("{}: cell function is unavailable", node.name())))?
                .eval(&ins),
            NodeKind::Input | NodeKind::Output => values[id.index()],
        };
        Ok(v)
    }
}
