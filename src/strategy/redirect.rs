//! Redirect strategy
//!
//! Sends the user agent to the provider's authorization page. The URL either
//! comes from the backend (which knows its own callback route) or is built
//! locally from the provider config. Navigation is terminal for this flow
//! instance; the rest of the sign-in completes out-of-band.

use async_trait::async_trait;
use std::sync::Arc;

use super::{AuthStrategy, StrategyOutcome};
use crate::backend::BackendClient;
use crate::config::ProviderConfig;
use crate::error::Error;
use crate::Result;

/// Where the authorization URL comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthUrlSource {
    /// Ask the backend's auth-url endpoint
    Backend,
    /// Build it locally from the provider config
    Local,
}

/// Something that can send the user agent to a URL
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> Result<()>;
}

/// Opens the URL in the system browser
pub struct SystemBrowser;

impl Navigator for SystemBrowser {
    fn navigate(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| Error::OAuth(format!("Failed to open browser: {}", e)))
    }
}

pub struct RedirectStrategy {
    source: AuthUrlSource,
    navigator: Arc<dyn Navigator>,
}

impl RedirectStrategy {
    pub fn new(source: AuthUrlSource, navigator: Arc<dyn Navigator>) -> Self {
        Self { source, navigator }
    }

    /// Redirect via the backend-provided authorization URL
    pub fn backend(navigator: Arc<dyn Navigator>) -> Self {
        Self::new(AuthUrlSource::Backend, navigator)
    }

    /// Redirect via a locally built authorization URL
    pub fn local(navigator: Arc<dyn Navigator>) -> Self {
        Self::new(AuthUrlSource::Local, navigator)
    }
}

#[async_trait]
impl AuthStrategy for RedirectStrategy {
    async fn execute(
        &self,
        config: &ProviderConfig,
        backend: &BackendClient,
    ) -> Result<StrategyOutcome> {
        let url = match self.source {
            AuthUrlSource::Backend => backend.fetch_auth_url(config).await?,
            AuthUrlSource::Local => config.authorize_url()?,
        };

        tracing::info!(
            "Redirecting to {} authorization page",
            config.provider.display_name()
        );
        self.navigator.navigate(&url)?;

        Ok(StrategyOutcome::Redirecting)
    }
}
