//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }

    /// Whether this node adds a layer to the circuit depth.
    #[inline]
    fn counts_toward_depth(&self) -> bool {
        match self {
            DagNode::Op(inst) => !matches!(inst.kind, InstructionKind::Barrier),
            _ => false,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    Qubit(QubitId),
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    pub wire: WireId,
}

/// DAG-based circuit representation.
///
/// Every wire runs from an `In` node through the operations touching it to an
/// `Out` node. `wire_front` tracks the last node before `Out` on each wire so
/// appending an operation is O(arity).
#[derive(Debug, Default)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    clbit_outputs: FxHashMap<ClbitId, NodeIndex>,
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Operation nodes in insertion order, which is a valid topological order.
    ops: Vec<NodeIndex>,
}

impl CircuitDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qubit wire. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_outputs.contains_key(&qubit) {
            return;
        }
        let out = self.add_wire(WireId::Qubit(qubit));
        self.qubit_outputs.insert(qubit, out);
    }

    /// Add a classical wire. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_outputs.contains_key(&clbit) {
            return;
        }
        let out = self.add_wire(WireId::Clbit(clbit));
        self.clbit_outputs.insert(clbit, out);
    }

    fn add_wire(&mut self, wire: WireId) -> NodeIndex {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, in_node);
        out_node
    }

    /// Append an instruction at the end of every wire it touches.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = instruction.as_gate().map(|g| g.name().to_string());

        if let Some(gate) = instruction.as_gate() {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::InvalidDag(format!(
                "measure: {} qubits but {} classical bits",
                instruction.qubits.len(),
                instruction.clbits.len()
            )));
        }

        for &qubit in &instruction.qubits {
            if !self.qubit_outputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }
        for clbit in instruction.classical_wires() {
            if !self.clbit_outputs.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<(WireId, NodeIndex)> = instruction
            .qubits
            .iter()
            .map(|q| (WireId::Qubit(*q), self.qubit_outputs[q]))
            .chain(
                instruction
                    .classical_wires()
                    .map(|c| (WireId::Clbit(c), self.clbit_outputs[&c])),
            )
            .collect();

        let op_node = self.graph.add_node(DagNode::Op(instruction));
        for (wire, out_node) in wires {
            self.splice(wire, out_node, op_node)?;
        }
        self.ops.push(op_node);
        Ok(op_node)
    }

    /// Insert `op_node` between the current wire front and the output node.
    fn splice(&mut self, wire: WireId, out_node: NodeIndex, op_node: NodeIndex) -> IrResult<()> {
        let prev_node = self.wire_front[&wire];
        let edge = self
            .graph
            .edges_directed(prev_node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire && e.target() == out_node)
            .map(|e| e.id())
            .ok_or_else(|| {
                IrError::InvalidDag(format!("missing edge to output on wire {wire:?}"))
            })?;
        self.graph.remove_edge(edge);
        self.graph.add_edge(prev_node, op_node, DagEdge { wire });
        self.graph.add_edge(op_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, op_node);
        Ok(())
    }

    /// Operations in program order.
    pub fn ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.ops
            .iter()
            .filter_map(|&idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Operations that must run directly before `node`.
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut preds: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|&n| matches!(self.graph[n], DagNode::Op(_)))
            .collect();
        preds.sort_unstable();
        preds.dedup();
        preds
    }

    /// Length of the longest chain of dependent operations.
    ///
    /// Barriers order operations across wires but do not add a layer.
    pub fn depth(&self) -> IrResult<usize> {
        let order = petgraph::algo::toposort(&self.graph, None)
            .map_err(|_| IrError::InvalidDag("cycle detected in circuit graph".into()))?;

        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(order.len(), Default::default());
        let mut max_depth = 0usize;

        for node in order {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if self.graph[node].counts_toward_depth() {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        Ok(max_depth)
    }

    pub fn num_ops(&self) -> usize {
        self.ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn dag_with(qubits: u32, clbits: u32) -> CircuitDag {
        let mut dag = CircuitDag::new();
        for q in 0..qubits {
            dag.add_qubit(QubitId(q));
        }
        for c in 0..clbits {
            dag.add_clbit(ClbitId(c));
        }
        dag
    }

    #[test]
    fn test_empty_depth() {
        assert_eq!(dag_with(2, 2).depth().unwrap(), 0);
    }

    #[test]
    fn test_parallel_gates_share_a_layer() {
        let mut dag = dag_with(2, 0);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        assert_eq!(dag.depth().unwrap(), 1);

        dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0), QubitId(1)]))
            .unwrap();
        assert_eq!(dag.depth().unwrap(), 2);
    }

    #[test]
    fn test_barrier_does_not_add_depth() {
        let mut dag = dag_with(2, 0);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::barrier([QubitId(0), QubitId(1)]))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        // x on q1 is ordered after h on q0 through the barrier
        assert_eq!(dag.depth().unwrap(), 2);
    }

    #[test]
    fn test_measure_chains_through_classical_wire() {
        let mut dag = dag_with(2, 1);
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0))).unwrap();
        let second = dag.apply(Instruction::measure(QubitId(1), ClbitId(0))).unwrap();
        assert_eq!(dag.depth().unwrap(), 2);
        assert_eq!(dag.predecessors(second).len(), 1);
    }

    #[test]
    fn test_rejects_arity_mismatch() {
        let mut dag = dag_with(1, 0);
        let err = dag
            .apply(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(err, IrError::QubitCountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_rejects_duplicate_and_unknown_qubits() {
        let mut dag = dag_with(2, 0);
        assert!(matches!(
            dag.apply(Instruction::gate(StandardGate::CX, [QubitId(1), QubitId(1)])),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(7))),
            Err(IrError::QubitNotFound { .. })
        ));
    }

    #[test]
    fn test_ops_preserve_program_order() {
        let mut dag = dag_with(1, 1);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0))).unwrap();
        let names: Vec<_> = dag.ops().map(|(_, i)| i.name().to_string()).collect();
        assert_eq!(names, vec!["x", "measure"]);
    }
}
