//! Circuit intermediate representation for qjob.
//!
//! Circuits are stored as a DAG of operations over qubit and classical-bit
//! wires. The [`Circuit`] wrapper keeps register metadata alongside the DAG so
//! a parsed program can be re-emitted with its original register names.
//!
//! ```rust
//! use qjob_ir::{Circuit, QubitId, ClbitId};
//!
//! let mut circuit = Circuit::new("flip");
//! let q = circuit.add_qreg("q", 1);
//! let c = circuit.add_creg("c", 1);
//! circuit.x(q[0]).unwrap();
//! circuit.measure(q[0], c[0]).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 1);
//! assert_eq!(circuit.depth().unwrap(), 2);
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, Register};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{Gate, StandardGate};
pub use instruction::{ClassicalCondition, Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
