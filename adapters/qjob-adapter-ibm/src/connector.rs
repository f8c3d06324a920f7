//! Resolves caller credentials and a backend name into an [`IbmBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use qjob_hal::{Backend, BackendConfig, BackendConnector, HalError, HalResult};

use crate::api::{IbmClient, LEGACY_ENDPOINT, exchange_api_key, quantum_instances};
use crate::backend::IbmBackend;
use crate::error::{IbmError, IbmResult};

/// How a [`BackendConfig`] authenticates against IBM Quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode<'a> {
    /// IBM Cloud API key. Without a CRN every visible instance is tried.
    Cloud { service_crn: Option<&'a str> },
    /// Bearer token sent as-is. Only chosen when the caller asks for it.
    Legacy {
        endpoint: &'a str,
        hub: Option<&'a str>,
    },
}

fn auth_mode(config: &BackendConfig) -> HalResult<AuthMode<'_>> {
    let instance = config
        .instance
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty());
    let endpoint = config.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty());

    match (instance, endpoint) {
        (Some(crn), _) if crn.starts_with("crn:") => Ok(AuthMode::Cloud {
            service_crn: Some(crn),
        }),
        (Some(hub), endpoint) if hub.contains('/') => Ok(AuthMode::Legacy {
            endpoint: endpoint.unwrap_or(LEGACY_ENDPOINT),
            hub: Some(hub),
        }),
        (None, Some(endpoint)) => Ok(AuthMode::Legacy {
            endpoint,
            hub: None,
        }),
        (None, None) => Ok(AuthMode::Cloud { service_crn: None }),
        (Some(other), _) => Err(HalError::Configuration(format!(
            "instance '{other}' is neither a service CRN (crn:...) nor hub/group/project"
        ))),
    }
}

/// Connector for IBM Quantum.
///
/// The token is an IBM Cloud API key exchanged through IAM. With
/// `config.instance` set to a service CRN that instance is used, otherwise
/// the instances visible to the key are looked up. A legacy bearer token is
/// only used when the caller passes an `endpoint` or a hub/group/project
/// instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct IbmConnector;

impl IbmConnector {
    pub fn new() -> Self {
        Self
    }

    /// Candidate clients in the order they should be tried.
    async fn clients(config: &BackendConfig) -> HalResult<Vec<IbmClient>> {
        let token = config.require_token()?;
        let clients = match auth_mode(config)? {
            AuthMode::Cloud {
                service_crn: Some(crn),
            } => {
                tracing::info!("connecting to IBM Cloud API (IAM key exchange)");
                vec![IbmClient::connect(token, crn).await?]
            }
            AuthMode::Cloud { service_crn: None } => {
                tracing::info!("connecting to IBM Cloud API, looking up instances");
                let iam = exchange_api_key(token).await?;
                let crns = quantum_instances(&iam).await?;
                if crns.is_empty() {
                    return Err(IbmError::MissingInstance.into());
                }
                tracing::debug!(instances = crns.len(), "found IBM Quantum instances");
                crns.iter()
                    .map(|crn| IbmClient::with_iam_token(&iam, crn))
                    .collect::<IbmResult<Vec<_>>>()?
            }
            AuthMode::Legacy { endpoint, hub } => {
                tracing::info!(endpoint, "connecting with IBM Quantum bearer token");
                let client = IbmClient::new(endpoint, token)?;
                vec![match hub {
                    Some(hub) => client.with_instance(hub),
                    None => client,
                }]
            }
        };
        Ok(clients)
    }
}

#[async_trait]
impl BackendConnector for IbmConnector {
    fn provider(&self) -> &str {
        "ibm"
    }

    async fn connect(&self, config: &BackendConfig) -> HalResult<Arc<dyn Backend>> {
        // Resolve the backend now so a bad name or credential fails the
        // setup rather than the first submission.
        let mut last_error = IbmError::UnknownBackend(config.name.clone());
        for client in Self::clients(config).await? {
            let backend = IbmBackend::new(Arc::new(client), config.name.clone());
            match backend.backend_info().await {
                Ok(info) => {
                    tracing::debug!(
                        backend = %info.name,
                        qubits = info.num_qubits,
                        "resolved IBM backend"
                    );
                    return Ok(Arc::new(backend));
                }
                // The backend may live in another instance.
                Err(e @ IbmError::UnknownBackend(_)) => last_error = e,
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRN: &str = "crn:v1:bluemix:public:quantum-computing:us-east:a/abc:def::";

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let result = IbmConnector::new()
            .connect(&BackendConfig::new("ibm_brisbane"))
            .await;
        assert!(matches!(result, Err(HalError::AuthenticationFailed(_))));
    }

    #[tokio::test]
    async fn test_blank_token_rejected() {
        let config = BackendConfig::new("ibm_brisbane").with_token("  ");
        assert!(matches!(
            IbmConnector::new().connect(&config).await,
            Err(HalError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn test_bare_key_uses_cloud_api() {
        let config = BackendConfig::new("ibm_brisbane").with_token("key");
        assert_eq!(
            auth_mode(&config).unwrap(),
            AuthMode::Cloud { service_crn: None }
        );

        let config = config.with_instance(format!(" {CRN} "));
        assert_eq!(
            auth_mode(&config).unwrap(),
            AuthMode::Cloud {
                service_crn: Some(CRN)
            }
        );
    }

    #[test]
    fn test_crn_wins_over_endpoint() {
        let config = BackendConfig::new("ibm_brisbane")
            .with_token("key")
            .with_endpoint("https://example.invalid")
            .with_instance(CRN);
        assert!(matches!(
            auth_mode(&config).unwrap(),
            AuthMode::Cloud { service_crn: Some(_) }
        ));
    }

    #[test]
    fn test_legacy_is_opt_in() {
        let config = BackendConfig::new("ibm_lagos")
            .with_token("token")
            .with_instance("ibm-q/open/main");
        assert_eq!(
            auth_mode(&config).unwrap(),
            AuthMode::Legacy {
                endpoint: LEGACY_ENDPOINT,
                hub: Some("ibm-q/open/main")
            }
        );

        let config = BackendConfig::new("ibm_lagos")
            .with_token("token")
            .with_endpoint("https://example.invalid");
        assert_eq!(
            auth_mode(&config).unwrap(),
            AuthMode::Legacy {
                endpoint: "https://example.invalid",
                hub: None
            }
        );
    }

    #[test]
    fn test_unrecognised_instance_rejected() {
        let config = BackendConfig::new("ibm_lagos")
            .with_token("token")
            .with_instance("my-instance");
        assert!(matches!(
            auth_mode(&config),
            Err(HalError::Configuration(msg)) if msg.contains("my-instance")
        ));
    }

    #[tokio::test]
    async fn test_legacy_client_keeps_hub() {
        let config = BackendConfig::new("ibm_lagos")
            .with_token("token")
            .with_endpoint("https://example.invalid")
            .with_instance("ibm-q/open/main");
        let clients = IbmConnector::clients(&config).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert!(!clients[0].is_cloud_api());
        assert_eq!(clients[0].endpoint(), "https://example.invalid");
        assert!(format!("{:?}", clients[0]).contains("ibm-q/open/main"));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(IbmConnector::new().provider(), "ibm");
    }
}
