//! Flow coordination
//!
//! One user-facing trigger maps to exactly one strategy execution. While an
//! execution is in flight further triggers are ignored without comment, the
//! same way a disabled button swallows clicks. Every outcome releases the
//! in-flight flag; only a success touches the token store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::BackendClient;
use crate::config::ProviderConfig;
use crate::session::{SessionTokens, TokenStore};
use crate::strategy::{AuthStrategy, StrategyOutcome};

/// Caller-visible result of one sign-in trigger
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The user agent left for the provider; nothing more happens here
    Redirecting,
    /// Tokens were exchanged and persisted
    SignedIn(SessionTokens),
    /// The user backed out, or a sign-in was already in flight
    Cancelled,
    /// The flow failed; the message is ready for display
    Failed(String),
}

pub struct AuthFlowCoordinator {
    config: ProviderConfig,
    backend: BackendClient,
    store: Arc<dyn TokenStore>,
    in_flight: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl AuthFlowCoordinator {
    pub fn new(config: ProviderConfig, backend: BackendClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            backend,
            store,
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Whether a sign-in is currently executing
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The most recent failure message, cleared by the next accepted trigger
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    /// Run one sign-in attempt with the given strategy
    ///
    /// A trigger arriving while another attempt is in flight is dropped
    /// silently and reported as `Cancelled`; no strategy work happens and no
    /// error is recorded.
    pub async fn sign_in(&self, strategy: &dyn AuthStrategy) -> AuthOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(
                "{} sign-in already in flight; ignoring trigger",
                self.config.provider.display_name()
            );
            return AuthOutcome::Cancelled;
        }
        let _guard = InFlightGuard(&self.in_flight);

        // Every accepted trigger starts with a clean slate; a cancelled or
        // redirecting attempt must not keep showing an old failure
        *self.last_error.lock().unwrap() = None;

        match strategy.execute(&self.config, &self.backend).await {
            Ok(StrategyOutcome::Redirecting) => AuthOutcome::Redirecting,
            Ok(StrategyOutcome::Cancelled) => AuthOutcome::Cancelled,
            Ok(StrategyOutcome::Tokens(tokens)) => self.complete(tokens),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn complete(&self, tokens: SessionTokens) -> AuthOutcome {
        if let Err(e) = self.store.persist(&tokens) {
            return self.fail(format!("Failed to persist session: {}", e));
        }

        tracing::info!("{} sign-in complete", self.config.provider.display_name());
        AuthOutcome::SignedIn(tokens)
    }

    fn fail(&self, message: String) -> AuthOutcome {
        tracing::warn!(
            "{} sign-in failed: {}",
            self.config.provider.display_name(),
            message
        );
        *self.last_error.lock().unwrap() = Some(message.clone());
        AuthOutcome::Failed(message)
    }
}

/// Releases the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
