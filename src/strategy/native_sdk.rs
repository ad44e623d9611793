//! Native-SDK strategy
//!
//! Delegates sign-in to a provider-supplied client script (e.g. Google
//! Identity Services). The script is loaded at most once per loader via the
//! single-flight `ScriptLoader`; the credential it yields then goes through
//! the same exchange path as the token-exchange strategy. SDK impls whose
//! entry point resolves through a registered callback use
//! `sdk::credential_slot` to surface exactly one result from `sign_in`.

use async_trait::async_trait;
use std::sync::Arc;

use super::{AuthStrategy, StrategyOutcome};
use crate::backend::BackendClient;
use crate::config::ProviderConfig;
use crate::sdk::{ProviderSdk, ScriptLoader};
use crate::Result;

pub struct NativeSdkStrategy {
    sdk: Arc<dyn ProviderSdk>,
    loader: Arc<ScriptLoader>,
}

impl NativeSdkStrategy {
    /// Use a private loader; the script loads once per strategy instance
    pub fn new(sdk: Arc<dyn ProviderSdk>) -> Self {
        Self {
            sdk,
            loader: Arc::new(ScriptLoader::new()),
        }
    }

    /// Share a loader so several strategy instances reuse one script load
    pub fn with_loader(sdk: Arc<dyn ProviderSdk>, loader: Arc<ScriptLoader>) -> Self {
        Self { sdk, loader }
    }
}

#[async_trait]
impl AuthStrategy for NativeSdkStrategy {
    async fn execute(
        &self,
        config: &ProviderConfig,
        backend: &BackendClient,
    ) -> Result<StrategyOutcome> {
        self.loader.ensure_loaded(self.sdk.as_ref()).await?;

        let credential = match self.sdk.sign_in().await? {
            Some(credential) => credential,
            None => {
                tracing::debug!(
                    "{} SDK sign-in dismissed",
                    config.provider.display_name()
                );
                return Ok(StrategyOutcome::Cancelled);
            }
        };

        let tokens = backend.exchange(config, &credential).await?;
        Ok(StrategyOutcome::Tokens(tokens))
    }
}
