//! Pull an OpenQASM block out of free-form assistant text.
//!
//! This is a line heuristic, not a parser: capture starts at the first line
//! containing the header token and stops at the first blank line once
//! `min_lines` lines (the blank one included) have been captured.

use serde::{Deserialize, Serialize};

/// Tuning for [`extract_circuit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Substring that marks the first line of a circuit.
    pub header_token: String,
    /// Lines that must be captured before a blank line ends the block.
    pub min_lines: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            header_token: "OPENQASM".to_string(),
            min_lines: 6,
        }
    }
}

/// The circuit embedded in `text`, trimmed, or `None` when no line contains
/// the header token.
pub fn extract_circuit(text: &str, options: &ExtractOptions) -> Option<String> {
    let mut captured: Vec<&str> = Vec::new();
    let mut in_circuit = false;

    for line in text.split('\n') {
        if !in_circuit && line.contains(options.header_token.as_str()) {
            in_circuit = true;
        }
        if !in_circuit {
            continue;
        }
        captured.push(line);
        if line.trim().is_empty() && captured.len() >= options.min_lines {
            break;
        }
    }

    in_circuit.then(|| captured.join("\n").trim().to_string())
}

/// Whether `text` looks like it carries a circuit.
pub fn contains_circuit(text: &str, options: &ExtractOptions) -> bool {
    text.contains(options.header_token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q -> c;";

    #[test]
    fn test_absent_without_header() {
        let options = ExtractOptions::default();
        assert_eq!(extract_circuit("Sure, here is a circuit: h q[0];", &options), None);
        assert_eq!(extract_circuit("", &options), None);
        assert!(!contains_circuit("no code", &options));
    }

    #[test]
    fn test_stops_at_blank_after_enough_lines() {
        let reply = format!("Here you go:\n\n{BELL}\n\nThis prepares a Bell state.\nmore text");
        let extracted = extract_circuit(&reply, &ExtractOptions::default()).unwrap();
        assert_eq!(extracted, BELL);
    }

    #[test]
    fn test_short_block_keeps_reading_past_blank() {
        // Three lines precede the first blank, so it does not end capture.
        let reply = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\n\ncreg c[1];\nx q[0];\n\ntrailing";
        let extracted = extract_circuit(reply, &ExtractOptions::default()).unwrap();
        assert_eq!(
            extracted,
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\n\ncreg c[1];\nx q[0];"
        );
    }

    #[test]
    fn test_blank_line_counts_towards_threshold() {
        // Five code lines plus the blank reach six.
        let reply = "OPENQASM 2.0;\na;\nb;\nc;\nd;\n\nafter";
        assert_eq!(
            extract_circuit(reply, &ExtractOptions::default()).unwrap(),
            "OPENQASM 2.0;\na;\nb;\nc;\nd;"
        );
    }

    #[test]
    fn test_header_mid_line_and_fence() {
        let reply = "```qasm OPENQASM 2.0;\nqreg q[1];\n```";
        assert_eq!(
            extract_circuit(reply, &ExtractOptions::default()).unwrap(),
            "```qasm OPENQASM 2.0;\nqreg q[1];\n```"
        );
    }

    #[test]
    fn test_custom_threshold() {
        let options = ExtractOptions {
            min_lines: 2,
            ..ExtractOptions::default()
        };
        let reply = "OPENQASM 2.0;\n\nqreg q[1];";
        assert_eq!(extract_circuit(reply, &options).unwrap(), "OPENQASM 2.0;");
    }
}
