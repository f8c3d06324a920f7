//! Chat history owned by a session.

use qjob_assistant::{AssistantError, ExtractOptions, Role, contains_circuit, extract_circuit};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
    /// Assistant reply that carries a circuit the editor can take over.
    pub has_circuit: bool,
}

/// Append-only conversation, cleared only on request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.entries.push(ChatEntry {
            role: Role::User,
            content: content.into(),
            has_circuit: false,
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>, extract: &ExtractOptions) {
        let content = content.into();
        let has_circuit = contains_circuit(&content, extract);
        self.entries.push(ChatEntry {
            role: Role::Assistant,
            content,
            has_circuit,
        });
    }

    /// Record a failed request as an assistant message for display.
    pub fn push_error(&mut self, error: &AssistantError) {
        self.entries.push(ChatEntry {
            role: Role::Assistant,
            content: format!("Error: {error}"),
            has_circuit: false,
        });
    }

    /// Record the outcome of an assistant call.
    pub fn record(&mut self, reply: &Result<String, AssistantError>, extract: &ExtractOptions) {
        match reply {
            Ok(text) => self.push_assistant(text.clone(), extract),
            Err(e) => self.push_error(e),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Circuit from the most recent assistant reply that has one.
    pub fn latest_circuit(&self, extract: &ExtractOptions) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.role == Role::Assistant && e.has_circuit)
            .find_map(|e| extract_circuit(&e.content, extract))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_flags_circuits() {
        let extract = ExtractOptions::default();
        let mut chat = ChatHistory::new();
        chat.push_user("make a bell state");
        chat.push_assistant("OPENQASM 2.0;\nqreg q[2];", &extract);
        chat.push_assistant("Happy to help.", &extract);

        assert_eq!(chat.len(), 3);
        assert!(chat.entries()[1].has_circuit);
        assert!(!chat.entries()[2].has_circuit);
        assert_eq!(
            chat.latest_circuit(&extract).as_deref(),
            Some("OPENQASM 2.0;\nqreg q[2];")
        );
    }

    #[test]
    fn test_error_is_displayed_not_extracted() {
        let extract = ExtractOptions::default();
        let mut chat = ChatHistory::new();
        chat.record(&Err(AssistantError::MissingApiKey), &extract);
        assert_eq!(chat.entries()[0].role, Role::Assistant);
        assert!(chat.entries()[0].content.starts_with("Error: "));
        assert_eq!(chat.latest_circuit(&extract), None);

        chat.clear();
        assert!(chat.is_empty());
    }
}
