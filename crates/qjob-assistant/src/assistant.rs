//! The assistant bridge: fixed system prompt, fixed sampling parameters.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ChatBackend, ChatMessage, ChatRequest, GROQ_ENDPOINT, GroqClient};
use crate::error::{AssistantError, AssistantResult};
use crate::extract::{ExtractOptions, extract_circuit};
use crate::prompts::{QuickAction, SYSTEM_PROMPT};

/// Model and prompt settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint: String,
    pub system_prompt: String,
    pub extract: ExtractOptions,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            endpoint: GROQ_ENDPOINT.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            extract: ExtractOptions::default(),
        }
    }
}

/// Sends prompts to a chat backend and extracts circuits from the replies.
///
/// An assistant built without a backend answers every request with
/// [`AssistantError::Unavailable`].
#[derive(Clone)]
pub struct Assistant {
    backend: Option<Arc<dyn ChatBackend>>,
    settings: AssistantSettings,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("provider", &self.backend.as_ref().map(|b| b.provider()))
            .field("settings", &self.settings)
            .finish()
    }
}

impl Assistant {
    pub fn new(backend: Arc<dyn ChatBackend>, settings: AssistantSettings) -> Self {
        Self {
            backend: Some(backend),
            settings,
        }
    }

    pub fn unavailable(settings: AssistantSettings) -> Self {
        Self {
            backend: None,
            settings,
        }
    }

    /// Assistant backed by [`GroqClient`] at `settings.endpoint`.
    pub fn groq(settings: AssistantSettings) -> Self {
        match GroqClient::with_endpoint(settings.endpoint.clone()) {
            Ok(client) => Self::new(Arc::new(client), settings),
            Err(e) => {
                tracing::warn!("chat client unavailable: {e}");
                Self::unavailable(settings)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn provider(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.provider())
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// The request sent for `prompt`.
    pub fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(self.settings.system_prompt.clone()),
                ChatMessage::user(prompt),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Ask the model. Returns the generated text.
    pub async fn ask(&self, prompt: &str, api_key: &str) -> AssistantResult<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| AssistantError::Unavailable("no chat client configured".into()))?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AssistantError::MissingApiKey);
        }

        tracing::debug!(model = %self.settings.model, prompt_len = prompt.len(), "asking assistant");
        let reply = backend.complete(&self.request(prompt), api_key).await;
        if let Err(e) = &reply {
            tracing::warn!("assistant request failed: {e}");
        }
        reply
    }

    pub async fn quick_action(&self, action: QuickAction, api_key: &str) -> AssistantResult<String> {
        self.ask(action.prompt(), api_key).await
    }

    /// Circuit embedded in `reply`, using the configured extraction options.
    pub fn extract_circuit(&self, reply: &str) -> Option<String> {
        extract_circuit(reply, &self.settings.extract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and replies with a canned answer.
    struct Scripted {
        reply: String,
        seen: Mutex<Vec<(ChatRequest, String)>>,
    }

    impl Scripted {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: text.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for Scripted {
        fn provider(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &ChatRequest, api_key: &str) -> AssistantResult<String> {
            self.seen
                .lock()
                .unwrap()
                .push((request.clone(), api_key.to_string()));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_ask_sends_fixed_system_prompt_and_parameters() {
        let backend = Scripted::replying("hello");
        let assistant = Assistant::new(backend.clone(), AssistantSettings::default());

        let reply = assistant.ask("make a circuit", " key ").await.unwrap();
        assert_eq!(reply, "hello");

        let seen = backend.seen.lock().unwrap();
        let (request, key) = &seen[0];
        assert_eq!(key, "key");
        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.max_tokens, 1000);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(request.messages[1], ChatMessage::user("make a circuit"));
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() {
        let backend = Scripted::replying("unused");
        let assistant = Assistant::new(backend.clone(), AssistantSettings::default());
        assert!(matches!(
            assistant.ask("hi", "  ").await,
            Err(AssistantError::MissingApiKey)
        ));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_assistant() {
        let assistant = Assistant::unavailable(AssistantSettings::default());
        assert!(!assistant.is_available());
        assert!(matches!(
            assistant.ask("hi", "key").await,
            Err(AssistantError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_quick_action_uses_canned_prompt() {
        let backend = Scripted::replying("ok");
        let assistant = Assistant::new(backend.clone(), AssistantSettings::default());
        assistant
            .quick_action(QuickAction::BellState, "key")
            .await
            .unwrap();
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].0.messages[1].content, QuickAction::BellState.prompt());
    }

    #[test]
    fn test_extract_uses_settings() {
        let settings = AssistantSettings {
            extract: ExtractOptions {
                header_token: "QASM".into(),
                min_lines: 1,
            },
            ..AssistantSettings::default()
        };
        let assistant = Assistant::unavailable(settings);
        assert_eq!(
            assistant.extract_circuit("intro\nQASM here\n\nrest").as_deref(),
            Some("QASM here")
        );
    }
}
