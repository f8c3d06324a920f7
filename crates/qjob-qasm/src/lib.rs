//! OpenQASM 2 front end for qjob.
//!
//! Parses the circuit text users edit in the control panel, lowers it into a
//! [`qjob_ir::Circuit`] and writes it back out as OpenQASM 3 for submission.
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version header | `OPENQASM 2.0;` |
//! | Standard library | `include "qelib1.inc";` |
//! | Registers | `qreg q[2];`, `creg c[2];` |
//! | Gates and broadcasting | `h q;`, `cx q[0], q[1];`, `rz(pi/4) q[0];` |
//! | User-defined gates | `gate bell a, b { h a; cx a, b; }` |
//! | Measurement | `measure q -> c;` |
//! | Conditionals | `if (c == 1) x q[0];` |
//! | Reset / barrier | `reset q[0];`, `barrier q;` |
//!
//! ```rust
//! use qjob_qasm::{parse, emit_qasm3};
//!
//! let circuit = parse(r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth().unwrap(), 3);
//! assert!(emit_qasm3(&circuit).contains("c[1] = measure q[1];"));
//! ```

pub mod ast;
mod emitter;
mod error;
mod lexer;
mod lowering;
mod parser;

pub use emitter::{emit_qasm2, emit_qasm3};
pub use error::{ParseError, ParseResult};
pub use lowering::{MAX_OPERATIONS, MAX_WIRES, QELIB};
pub use parser::parse_program;

use qjob_ir::Circuit;

/// Parse OpenQASM 2 source into a circuit named `"circuit"`.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    parse_named(source, "circuit")
}

/// Parse OpenQASM 2 source into a circuit with the given name.
pub fn parse_named(source: &str, name: &str) -> ParseResult<Circuit> {
    let program = parser::parse_program(source)?;
    lowering::lower_to_circuit(&program, name)
}
