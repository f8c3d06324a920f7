//! Circuit validation.

use serde::Serialize;

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub ok: bool,
    /// Qubit count and depth on success, the parser diagnostic otherwise.
    pub detail: String,
}

/// Parse `source` as OpenQASM 2.0 and summarize it.
///
/// Pure: the same text always yields the same answer, and every failure is
/// reported through `detail` rather than an error.
pub fn validate(source: &str) -> Validation {
    let summary = qjob_qasm::parse(source)
        .map_err(|e| e.to_string())
        .and_then(|circuit| {
            let depth = circuit.depth().map_err(|e| e.to_string())?;
            Ok(format!(
                "Circuit: {} qubits, {} depth",
                circuit.num_qubits(),
                depth
            ))
        });

    match summary {
        Ok(detail) => Validation { ok: true, detail },
        Err(detail) => Validation { ok: false, detail },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_QASM;

    #[test]
    fn test_default_circuit() {
        let v = validate(DEFAULT_QASM);
        assert!(v.ok);
        assert_eq!(v.detail, "Circuit: 1 qubits, 2 depth");
    }

    #[test]
    fn test_bell_circuit() {
        let v = validate(
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q -> c;",
        );
        assert_eq!(v.detail, "Circuit: 2 qubits, 3 depth");
    }

    #[test]
    fn test_missing_header() {
        let v = validate("qreg q[1];\nx q[0];");
        assert!(!v.ok);
        assert!(!v.detail.is_empty());
        assert!(v.detail.contains("OPENQASM"), "{}", v.detail);
    }

    #[test]
    fn test_unknown_gate_reported() {
        let v = validate("OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nfoo q[0];");
        assert!(!v.ok);
        assert!(v.detail.contains("foo"), "{}", v.detail);
    }

    #[test]
    fn test_empty_input() {
        assert!(!validate("").ok);
    }
}
