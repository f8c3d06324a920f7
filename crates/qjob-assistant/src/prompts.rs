//! Canned prompts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssistantError;

/// Default system instruction sent ahead of every user prompt.
pub const SYSTEM_PROMPT: &str = "You are a quantum computing assistant helping users create and modify QASM code for quantum circuits. 

You can help users with:
1. Creating QASM 2.0 code for quantum circuits
2. Modifying existing QASM code
3. Suggesting optimal shot counts and job parameters
4. Explaining quantum circuits and operations

When providing QASM code, always use proper QASM 2.0 format starting with:
OPENQASM 2.0;
include \"qelib1.inc\";

Keep responses concise and focused on quantum computing topics.";

/// One-click prompts offered next to the chat box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    BellState,
    RandomCircuit,
}

impl QuickAction {
    pub const ALL: [QuickAction; 2] = [QuickAction::BellState, QuickAction::RandomCircuit];

    pub fn name(self) -> &'static str {
        match self {
            QuickAction::BellState => "bell_state",
            QuickAction::RandomCircuit => "random_circuit",
        }
    }

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            QuickAction::BellState => "Generate Bell State",
            QuickAction::RandomCircuit => "Generate Random Circuit",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            QuickAction::BellState => {
                "Generate QASM code for a Bell state (|00⟩ + |11⟩)/√2 using two qubits"
            }
            QuickAction::RandomCircuit => {
                "Generate a random quantum circuit with 2-3 qubits using different gates like H, X, Y, Z, CNOT"
            }
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuickAction {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| AssistantError::UnknownQuickAction(s.to_string()))
    }
}
