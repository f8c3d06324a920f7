//! Error types for the OpenQASM 2 parser.

use thiserror::Error;

/// Errors that can occur during parsing and lowering.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("line {line}: {message}")]
    LexerError { line: usize, message: String },

    #[error("line {line}: expected {expected}, found '{found}'")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    #[error("missing 'OPENQASM 2.0;' header")]
    MissingHeader,

    #[error("unsupported OPENQASM version {0}, expected 2.0")]
    InvalidVersion(String),

    #[error("line {line}: cannot include \"{file}\"")]
    UnsupportedInclude { line: usize, file: String },

    #[error("line {line}: '{name}' is not defined")]
    UndefinedIdentifier { line: usize, name: String },

    #[error("line {line}: '{name}' is already defined")]
    DuplicateDeclaration { line: usize, name: String },

    #[error("line {line}: unknown gate '{name}'{hint}")]
    UnknownGate {
        line: usize,
        name: String,
        hint: String,
    },

    #[error("line {line}: gate '{gate}' expects {expected} qubit arguments, got {got}")]
    WrongQubitCount {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        line: usize,
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: index {index} out of range for register '{register}' of size {size}")]
    IndexOutOfBounds {
        line: usize,
        register: String,
        index: u64,
        size: u32,
    },

    #[error("line {line}: '{name}' is not a {expected} register")]
    WrongRegisterKind {
        line: usize,
        name: String,
        expected: &'static str,
    },

    #[error("line {line}: register size mismatch: {message}")]
    SizeMismatch { line: usize, message: String },

    #[error("line {line}: {message}")]
    InvalidExpression { line: usize, message: String },

    #[error("line {line}: {feature} is not supported")]
    Unsupported { line: usize, feature: String },

    #[error("circuit error: {0}")]
    CircuitError(#[from] qjob_ir::IrError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
