//! Token-exchange strategy
//!
//! Credential material arrives out-of-band (an interactive prompt, a pasted
//! personal access token, a deep-link code) through a caller-supplied
//! `CredentialSource`, then goes straight to the backend exchange. An empty
//! acquisition means the user backed out: neutral, no request, no error.

use async_trait::async_trait;
use std::sync::Arc;

use super::{AuthStrategy, Credential, StrategyOutcome};
use crate::backend::BackendClient;
use crate::config::ProviderConfig;
use crate::Result;

/// Supplies raw credential material for the exchange
///
/// Returning `Ok(None)` means the user cancelled acquisition.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn acquire(&self) -> Result<Option<Credential>>;
}

/// A pre-acquired credential, e.g. from a CLI prompt or flag
pub struct StaticCredential(Option<Credential>);

impl StaticCredential {
    pub fn new(credential: Credential) -> Self {
        Self(Some(credential))
    }

    /// An empty source, behaving like a cancelled prompt
    pub fn empty() -> Self {
        Self(None)
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn acquire(&self) -> Result<Option<Credential>> {
        Ok(self.0.clone())
    }
}

pub struct TokenExchangeStrategy {
    source: Arc<dyn CredentialSource>,
}

impl TokenExchangeStrategy {
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AuthStrategy for TokenExchangeStrategy {
    async fn execute(
        &self,
        config: &ProviderConfig,
        backend: &BackendClient,
    ) -> Result<StrategyOutcome> {
        let credential = match self.source.acquire().await? {
            Some(credential) => credential,
            None => {
                tracing::debug!(
                    "{} credential acquisition cancelled",
                    config.provider.display_name()
                );
                return Ok(StrategyOutcome::Cancelled);
            }
        };

        let tokens = backend.exchange(config, &credential).await?;
        Ok(StrategyOutcome::Tokens(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use crate::error::Error;
    use crate::testutil::{json_response, unreachable_base_url, StubBackend};

    fn github_config() -> ProviderConfig {
        ProviderConfig::new(Provider::GitHub, "cid", "http://localhost/cb")
    }

    #[tokio::test]
    async fn test_empty_acquisition_is_neutral() {
        // The backend is unreachable, so a request would fail loudly
        let backend = BackendClient::new(unreachable_base_url().await).unwrap();
        let strategy = TokenExchangeStrategy::new(Arc::new(StaticCredential::empty()));

        let outcome = strategy.execute(&github_config(), &backend).await.unwrap();
        assert_eq!(outcome, StrategyOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let stub = StubBackend::spawn(json_response(
            200,
            r#"{"access":"a","refresh":"r","user":{"id":1}}"#,
        ))
        .await;
        let backend = BackendClient::new(stub.base_url()).unwrap();
        let strategy = TokenExchangeStrategy::new(Arc::new(StaticCredential::new(
            Credential::access_token("tok"),
        )));

        let outcome = strategy.execute(&github_config(), &backend).await.unwrap();
        match outcome {
            StrategyOutcome::Tokens(tokens) => {
                assert_eq!(tokens.access, "a");
                assert_eq!(tokens.refresh, "r");
                assert_eq!(tokens.user["id"], 1);
            }
            other => panic!("Expected tokens, got {:?}", other),
        }
        assert_eq!(stub.request_count(), 1);
    }

    #[tokio::test]
    async fn test_acquisition_error_propagates() {
        struct FailingSource;

        #[async_trait]
        impl CredentialSource for FailingSource {
            async fn acquire(&self) -> Result<Option<Credential>> {
                Err(Error::OAuth("device unavailable".to_string()))
            }
        }

        let backend = BackendClient::new(unreachable_base_url().await).unwrap();
        let strategy = TokenExchangeStrategy::new(Arc::new(FailingSource));

        let err = strategy.execute(&github_config(), &backend).await.unwrap_err();
        assert!(err.to_string().contains("device unavailable"));
    }
}
