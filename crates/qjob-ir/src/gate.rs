//! Quantum gate types.
//!
//! Parameters are plain angles in radians. Symbolic parameters never reach
//! the IR: user-defined gates are expanded and their arguments evaluated
//! while the program is lowered.

use serde::{Deserialize, Serialize};

/// Gates from the OpenQASM 2 standard library (`qelib1.inc`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    SXdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// Phase gate, `u1` in OpenQASM 2.
    P(f64),
    /// `u2(φ, λ)`.
    U2(f64, f64),
    /// Universal single-qubit gate `U(θ, φ, λ)`, `u3` in OpenQASM 2.
    U(f64, f64, f64),

    CX,
    CY,
    CZ,
    CH,
    Swap,
    CRx(f64),
    CRy(f64),
    CRz(f64),
    /// Controlled phase, `cu1` in OpenQASM 2.
    CP(f64),
    /// `cu3(θ, φ, λ)`.
    CU3(f64, f64, f64),
    RXX(f64),
    RZZ(f64),

    CCX,
    CSwap,
}

impl StandardGate {
    /// Canonical lower-case name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U2(_, _) => "u2",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::CU3(_, _, _) => "cu3",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U2(_, _)
            | StandardGate::U(_, _, _) => 1,
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::CU3(_, _, _)
            | StandardGate::RXX(_)
            | StandardGate::RZZ(_) => 2,
            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Angle parameters in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(a)
            | StandardGate::Ry(a)
            | StandardGate::Rz(a)
            | StandardGate::P(a)
            | StandardGate::CRx(a)
            | StandardGate::CRy(a)
            | StandardGate::CRz(a)
            | StandardGate::CP(a)
            | StandardGate::RXX(a)
            | StandardGate::RZZ(a) => vec![a],
            StandardGate::U2(a, b) => vec![a, b],
            StandardGate::U(a, b, c) | StandardGate::CU3(a, b, c) => vec![a, b, c],
            _ => vec![],
        }
    }

    /// Build a gate from an OpenQASM 2 name and evaluated arguments.
    ///
    /// Returns `None` for unknown names or a wrong number of parameters.
    /// Accepts both the `qelib1.inc` spellings (`u1`, `u3`, `cu1`) and the
    /// canonical ones (`p`, `u`, `cp`).
    pub fn from_qasm(name: &str, params: &[f64]) -> Option<Self> {
        let gate = match (name, params) {
            ("id" | "i", []) => StandardGate::I,
            ("x", []) => StandardGate::X,
            ("y", []) => StandardGate::Y,
            ("z", []) => StandardGate::Z,
            ("h", []) => StandardGate::H,
            ("s", []) => StandardGate::S,
            ("sdg", []) => StandardGate::Sdg,
            ("t", []) => StandardGate::T,
            ("tdg", []) => StandardGate::Tdg,
            ("sx", []) => StandardGate::SX,
            ("sxdg", []) => StandardGate::SXdg,
            ("rx", [a]) => StandardGate::Rx(*a),
            ("ry", [a]) => StandardGate::Ry(*a),
            ("rz", [a]) => StandardGate::Rz(*a),
            ("u1" | "p", [a]) => StandardGate::P(*a),
            ("u2", [a, b]) => StandardGate::U2(*a, *b),
            ("u3" | "u" | "U", [a, b, c]) => StandardGate::U(*a, *b, *c),
            ("cx" | "CX", []) => StandardGate::CX,
            ("cy", []) => StandardGate::CY,
            ("cz", []) => StandardGate::CZ,
            ("ch", []) => StandardGate::CH,
            ("swap", []) => StandardGate::Swap,
            ("crx", [a]) => StandardGate::CRx(*a),
            ("cry", [a]) => StandardGate::CRy(*a),
            ("crz", [a]) => StandardGate::CRz(*a),
            ("cu1" | "cp", [a]) => StandardGate::CP(*a),
            ("cu3", [a, b, c]) => StandardGate::CU3(*a, *b, *c),
            ("rxx", [a]) => StandardGate::RXX(*a),
            ("rzz", [a]) => StandardGate::RZZ(*a),
            ("ccx", []) => StandardGate::CCX,
            ("cswap", []) => StandardGate::CSwap,
            _ => return None,
        };
        Some(gate)
    }

    /// Expected parameter count for a known gate name.
    pub fn arity(name: &str) -> Option<(usize, u32)> {
        let (params, qubits) = match name {
            "id" | "i" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "sx" | "sxdg" => {
                (0, 1)
            }
            "rx" | "ry" | "rz" | "u1" | "p" => (1, 1),
            "u2" => (2, 1),
            "u3" | "u" | "U" => (3, 1),
            "cx" | "CX" | "cy" | "cz" | "ch" | "swap" => (0, 2),
            "crx" | "cry" | "crz" | "cu1" | "cp" | "rxx" | "rzz" => (1, 2),
            "cu3" => (3, 2),
            "ccx" | "cswap" => (0, 3),
            _ => return None,
        };
        Some((params, qubits))
    }
}

/// A gate applied in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub kind: StandardGate,
}

impl Gate {
    pub fn standard(kind: StandardGate) -> Self {
        Self { kind }
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_qelib_aliases() {
        assert_eq!(StandardGate::from_qasm("u1", &[PI]), Some(StandardGate::P(PI)));
        assert_eq!(
            StandardGate::from_qasm("u3", &[1.0, 2.0, 3.0]),
            Some(StandardGate::U(1.0, 2.0, 3.0))
        );
        assert_eq!(StandardGate::from_qasm("CX", &[]), Some(StandardGate::CX));
        assert_eq!(StandardGate::from_qasm("cu1", &[0.5]), Some(StandardGate::CP(0.5)));
    }

    #[test]
    fn test_wrong_parameter_count_is_rejected() {
        assert!(StandardGate::from_qasm("rx", &[]).is_none());
        assert!(StandardGate::from_qasm("h", &[1.0]).is_none());
        assert!(StandardGate::from_qasm("frobnicate", &[]).is_none());
    }

    #[test]
    fn test_arity_matches_constructed_gate() {
        for name in ["h", "rx", "u2", "u3", "cx", "cu3", "ccx", "rzz"] {
            let (params, qubits) = StandardGate::arity(name).unwrap();
            let gate = StandardGate::from_qasm(name, &vec![0.1; params]).unwrap();
            assert_eq!(gate.num_qubits(), qubits, "{name}");
            assert_eq!(gate.parameters().len(), params, "{name}");
        }
    }
}
