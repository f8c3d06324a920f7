//! Abstract syntax tree for OpenQASM 2.

use serde::{Deserialize, Serialize};

/// A parsed program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub version: String,
    pub statements: Vec<Located>,
}

/// A statement together with the line it starts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Located {
    pub line: usize,
    pub statement: Statement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Include(String),
    QReg { name: String, size: u64 },
    CReg { name: String, size: u64 },
    GateDef(GateDef),
    Opaque { name: String },
    Op(QuantumOp),
    If {
        register: String,
        value: u64,
        op: QuantumOp,
    },
}

/// A user-defined gate: `gate name(params) qubits { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<GateBodyOp>,
}

/// Operation inside a gate body; operands are the gate's formal qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateBodyOp {
    Call {
        name: String,
        params: Vec<Expression>,
        qubits: Vec<String>,
    },
    Barrier(Vec<String>),
}

/// A top-level quantum operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuantumOp {
    Gate {
        name: String,
        params: Vec<Expression>,
        args: Vec<Argument>,
    },
    Measure { qubit: Argument, clbit: Argument },
    Reset(Argument),
    Barrier(Vec<Argument>),
}

/// `reg` or `reg[index]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub register: String,
    pub index: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Real(f64),
    Int(u64),
    Pi,
    Identifier(String),
    Neg(Box<Expression>),
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// `sin`, `cos`, `tan`, `exp`, `ln`, `sqrt`.
    Call { function: String, arg: Box<Expression> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
