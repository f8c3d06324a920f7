//! External clients wired from configuration.

use std::sync::Arc;

use qjob_assistant::{Assistant, AssistantResult, QuickAction};
use qjob_hal::{BackendAvailability, BackendConnector};

use crate::batch::{self, BatchOptions, BatchOutcome, Credentials, ExecutionRequest, ProgressObserver};
use crate::config::{ExecutionConfig, QjobConfig};
use crate::error::{CoreError, CoreResult};
use crate::probe::{ClientStatus, ServiceAvailability};
use crate::session::Session;

const QUANTUM_CLIENT: &str = "IBM Quantum client";

/// Quantum connector and assistant shared by every session.
pub struct Services {
    connector: Option<Arc<dyn BackendConnector>>,
    assistant: Assistant,
    capabilities: ServiceAvailability,
    execution: ExecutionConfig,
}

impl Services {
    /// Build from explicit parts. Capabilities are probed here, once.
    pub fn new(
        connector: Option<Arc<dyn BackendConnector>>,
        assistant: Assistant,
        execution: ExecutionConfig,
    ) -> Self {
        let capabilities = ServiceAvailability {
            quantum: connector
                .as_deref()
                .map_or_else(ClientStatus::missing, |c| ClientStatus::available(c.provider())),
            assistant: assistant
                .provider()
                .map_or_else(ClientStatus::missing, ClientStatus::available),
            validator: ClientStatus::available("qjob-qasm"),
        };
        tracing::info!(
            quantum = capabilities.quantum.available,
            assistant = capabilities.assistant.available,
            "service capabilities probed"
        );
        Self {
            connector,
            assistant,
            capabilities,
            execution,
        }
    }

    /// Clients compiled into this build.
    pub fn from_config(config: &QjobConfig) -> Self {
        #[cfg(feature = "ibm")]
        let connector: Option<Arc<dyn BackendConnector>> =
            Some(Arc::new(qjob_adapter_ibm::IbmConnector::new()));
        #[cfg(not(feature = "ibm"))]
        let connector: Option<Arc<dyn BackendConnector>> = None;

        #[cfg(feature = "groq")]
        let assistant = Assistant::groq(config.assistant.clone());
        #[cfg(not(feature = "groq"))]
        let assistant = Assistant::unavailable(config.assistant.clone());

        Self::new(connector, assistant, config.execution.clone())
    }

    pub fn capabilities(&self) -> &ServiceAvailability {
        &self.capabilities
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn execution(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Fresh session seeded with the configured defaults.
    pub fn new_session(&self) -> Session {
        Session::new(self.execution.clone(), self.capabilities.clone())
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            label: self.execution.circuit_label.clone(),
            policy: self.execution.failure_policy,
        }
    }

    /// Run a batch with the configured options.
    ///
    /// Without a quantum client the batch short-circuits to an error outcome.
    pub async fn run_batch(
        &self,
        request: &ExecutionRequest,
        credentials: &Credentials,
        options: &BatchOptions,
        observer: &dyn ProgressObserver,
    ) -> BatchOutcome {
        match self.connector.as_deref() {
            Some(connector) => {
                batch::run_batch(connector, request, credentials, options, observer).await
            }
            None => BatchOutcome::failed(CoreError::Unavailable(QUANTUM_CLIENT).to_string()),
        }
    }

    /// Remote liveness and queue depth of `backend`.
    pub async fn backend_status(
        &self,
        credentials: &Credentials,
        backend: &str,
    ) -> CoreResult<BackendAvailability> {
        let connector = self
            .connector
            .as_deref()
            .ok_or(CoreError::Unavailable(QUANTUM_CLIENT))?;
        let handle = connector
            .connect(&credentials.backend_config(backend))
            .await?;
        Ok(handle.availability().await?)
    }

    pub async fn ask(&self, prompt: &str, api_key: &str) -> AssistantResult<String> {
        self.assistant.ask(prompt, api_key).await
    }

    pub async fn quick_action(&self, action: QuickAction, api_key: &str) -> AssistantResult<String> {
        self.assistant.quick_action(action, api_key).await
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("connector", &self.connector.as_ref().map(|c| c.provider()))
            .field("assistant", &self.assistant.provider())
            .finish_non_exhaustive()
    }
}
