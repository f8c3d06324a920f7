//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::dag::{CircuitDag, NodeIndex};
use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A named, contiguous register of qubits or classical bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    /// Id of the first element.
    pub start: u32,
    pub size: u32,
}

impl Register {
    /// Absolute id of element `index`, or `None` when out of range.
    pub fn get(&self, index: u32) -> Option<u32> {
        (index < self.size).then(|| self.start + index)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.start..self.start + self.size
    }
}

/// A quantum circuit.
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    dag: CircuitDag,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            qregs: vec![],
            cregs: vec![],
            dag: CircuitDag::new(),
        }
    }

    /// Declare a quantum register and return its qubit ids.
    ///
    /// Redeclaring a name returns [`IrError::DuplicateRegister`].
    pub fn try_add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.qreg(&name).is_some() || self.creg(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = first_id(self.qubits.len(), size, &name)?;
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = QubitId(start + i);
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        self.qregs.push(Register { name, start, size });
        Ok(ids)
    }

    /// Declare a classical register and return its bit ids.
    pub fn try_add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.qreg(&name).is_some() || self.creg(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = first_id(self.clbits.len(), size, &name)?;
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = ClbitId(start + i);
            self.clbits.push(Clbit::with_register(id, &name, i));
            self.dag.add_clbit(id);
            ids.push(id);
        }
        self.cregs.push(Register { name, start, size });
        Ok(ids)
    }

    /// Like [`Circuit::try_add_qreg`], for builders with fresh names.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        self.try_add_qreg(name, size).unwrap_or_default()
    }

    /// Like [`Circuit::try_add_creg`], for builders with fresh names.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        self.try_add_creg(name, size).unwrap_or_default()
    }

    /// Append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.dag.apply(instruction)
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))?;
        Ok(self)
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))?;
        Ok(self)
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CX, [control, target]))?;
        Ok(self)
    }

    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Longest chain of dependent operations, barriers excluded.
    pub fn depth(&self) -> IrResult<usize> {
        self.dag.depth()
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Bell pair on a fresh 2-qubit register with full measurement.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Circuit::new("bell");
        let q = circuit.add_qreg("q", 2);
        let c = circuit.add_creg("c", 2);
        circuit.h(q[0])?.cx(q[0], q[1])?;
        circuit.measure(q[0], c[0])?.measure(q[1], c[1])?;
        Ok(circuit)
    }
}

/// Id of the first element of a register appended after `allocated` wires.
fn first_id(allocated: usize, size: u32, name: &str) -> IrResult<u32> {
    u32::try_from(allocated)
        .ok()
        .filter(|start| start.checked_add(size).is_some())
        .ok_or_else(|| IrError::RegisterOverflow(name.to_string()))
}

impl std::fmt::Debug for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Circuit")
            .field("name", &self.name)
            .field("qregs", &self.qregs)
            .field("cregs", &self.cregs)
            .field("ops", &self.dag.num_ops())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_past_id_space_rejected() {
        assert!(matches!(
            first_id(10, u32::MAX, "big"),
            Err(IrError::RegisterOverflow(ref name)) if name == "big"
        ));
        assert_eq!(first_id(10, u32::MAX - 10, "fits").unwrap(), 10);
    }

    #[test]
    fn test_registers_are_contiguous() {
        let mut circuit = Circuit::new("regs");
        let a = circuit.add_qreg("a", 2);
        let b = circuit.add_qreg("b", 3);
        assert_eq!(a, vec![QubitId(0), QubitId(1)]);
        assert_eq!(b[0], QubitId(2));
        assert_eq!(circuit.qreg("b").unwrap().get(2), Some(4));
        assert_eq!(circuit.qreg("b").unwrap().get(3), None);
        assert_eq!(circuit.num_qubits(), 5);
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut circuit = Circuit::new("dup");
        circuit.try_add_qreg("q", 1).unwrap();
        assert!(matches!(
            circuit.try_add_creg("q", 1),
            Err(IrError::DuplicateRegister(name)) if name == "q"
        ));
    }

    #[test]
    fn test_bell_depth() {
        let bell = Circuit::bell().unwrap();
        assert_eq!(bell.num_qubits(), 2);
        assert_eq!(bell.num_ops(), 4);
        assert_eq!(bell.depth().unwrap(), 3);
    }
}
