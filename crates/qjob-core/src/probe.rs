//! Which external clients this build can use.
//!
//! The probe runs once when [`crate::Services`] is built and the answer is
//! cached for the life of the process.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ClientStatus {
    pub fn available(provider: impl Into<String>) -> Self {
        Self {
            available: true,
            provider: Some(provider.into()),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            provider: None,
        }
    }
}

/// Snapshot of client availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAvailability {
    pub quantum: ClientStatus,
    pub assistant: ClientStatus,
    pub validator: ClientStatus,
}

/// Whether caller-supplied credentials are present for each service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialPresence {
    pub quantum: bool,
    pub assistant: bool,
}

impl CredentialPresence {
    pub fn new(quantum_token: Option<&str>, assistant_key: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
        Self {
            quantum: present(quantum_token),
            assistant: present(assistant_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_presence() {
        let presence = CredentialPresence::new(Some("tok"), Some("  "));
        assert!(presence.quantum);
        assert!(!presence.assistant);
        assert!(!CredentialPresence::new(None, None).quantum);
    }
}
