//! Provider SDK surface and script bootstrap
//!
//! `ProviderSdk` is the seam to a provider-supplied client script: loading it
//! is a process-visible side effect that must happen at most once, and its
//! sign-in entry point yields credential material through a callback.
//! `ScriptLoader` serializes loads so concurrent callers share one attempt; a
//! failed load is not cached and the next caller retries.

use async_trait::async_trait;
use std::sync::Mutex as StdMutex;
use tokio::sync::{oneshot, Mutex};

use crate::error::Error;
use crate::strategy::Credential;
use crate::Result;

/// A provider-supplied sign-in SDK
///
/// `load` performs the one-time bootstrap (fetching and evaluating the client
/// script); `sign_in` invokes the SDK's entry point and resolves with the
/// credential it produced, or `None` when the user dismissed it. SDKs that
/// deliver the credential through a registered callback rather than a return
/// value bridge the two with [`credential_slot`].
#[async_trait]
pub trait ProviderSdk: Send + Sync {
    fn script_url(&self) -> &str;

    async fn load(&self) -> Result<()>;

    async fn sign_in(&self) -> Result<Option<Credential>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    NotLoaded,
    Loaded,
}

/// Memoizes a script load
///
/// The async mutex is held across the load itself, so a second caller
/// arriving mid-load waits for the first attempt instead of starting its
/// own. Failure leaves the state at `NotLoaded`, making retry possible.
pub struct ScriptLoader {
    state: Mutex<LoadState>,
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoadState::NotLoaded),
        }
    }

    /// Load the SDK's script unless a previous call already has
    pub async fn ensure_loaded(&self, sdk: &dyn ProviderSdk) -> Result<()> {
        let mut state = self.state.lock().await;

        if *state == LoadState::Loaded {
            return Ok(());
        }

        tracing::debug!("Loading provider script {}", sdk.script_url());
        match sdk.load().await {
            Ok(()) => {
                *state = LoadState::Loaded;
                Ok(())
            }
            Err(Error::SdkInit(message)) => Err(Error::SdkInit(message)),
            Err(other) => Err(Error::SdkInit(other.to_string())),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        *self.state.lock().await == LoadState::Loaded
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a one-shot slot for a callback-style sign-in
///
/// SDK callbacks may fire more than once; the sender side swallows every
/// resolution after the first so the flow sees exactly one result. A
/// `ProviderSdk` impl wrapping such an SDK hands the sender to the callback
/// and waits on the receiver inside `sign_in`:
///
/// ```
/// use loginflow::sdk::credential_slot;
/// use loginflow::strategy::Credential;
///
/// # tokio_test::block_on(async {
/// let (sender, receiver) = credential_slot();
///
/// // Registered as the SDK callback; a duplicate firing is swallowed
/// sender.resolve(Some(Credential::identity_token("jwt")));
/// assert!(!sender.resolve(None));
///
/// let credential = receiver.wait().await.unwrap();
/// assert_eq!(credential.unwrap().value, "jwt");
/// # });
/// ```
pub fn credential_slot() -> (CredentialSender, CredentialReceiver) {
    let (tx, rx) = oneshot::channel();
    (
        CredentialSender {
            tx: StdMutex::new(Some(tx)),
        },
        CredentialReceiver { rx },
    )
}

pub struct CredentialSender {
    tx: StdMutex<Option<oneshot::Sender<Option<Credential>>>>,
}

impl CredentialSender {
    /// Resolve the slot; returns false if it was already resolved
    pub fn resolve(&self, credential: Option<Credential>) -> bool {
        match self.tx.lock().unwrap().take() {
            Some(tx) => tx.send(credential).is_ok(),
            None => false,
        }
    }
}

pub struct CredentialReceiver {
    rx: oneshot::Receiver<Option<Credential>>,
}

impl CredentialReceiver {
    /// Wait for the callback to resolve
    pub async fn wait(self) -> Result<Option<Credential>> {
        self.rx
            .await
            .map_err(|_| Error::SdkInit("Sign-in callback dropped without resolving".to_string()))
    }
}
