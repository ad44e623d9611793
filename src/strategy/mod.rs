//! Strategy abstraction for credential acquisition
//!
//! Each sign-in method is an `AuthStrategy`: it obtains raw credential
//! material (by redirecting the user agent, from a caller-supplied source, or
//! through a provider SDK) and, for non-redirect strategies, hands it to the
//! backend exchange. Failures surface as `Err` at this boundary; the
//! coordinator turns them into a displayable message.

mod native_sdk;
mod redirect;
mod token_exchange;

pub use native_sdk::NativeSdkStrategy;
pub use redirect::{AuthUrlSource, Navigator, RedirectStrategy, SystemBrowser};
pub use token_exchange::{CredentialSource, StaticCredential, TokenExchangeStrategy};

use async_trait::async_trait;

use crate::backend::BackendClient;
use crate::config::ProviderConfig;
use crate::session::SessionTokens;
use crate::Result;

/// Raw credential material obtained by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub kind: CredentialKind,
    pub value: String,
}

impl Credential {
    pub fn access_token(value: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::AccessToken,
            value: value.into(),
        }
    }

    pub fn identity_token(value: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::IdentityToken,
            value: value.into(),
        }
    }

    pub fn authorization_code(value: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::AuthorizationCode,
            value: value.into(),
        }
    }
}

/// What the credential value is, which decides the exchange body field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// A provider access token, sent as `access_token`
    AccessToken,
    /// A signed identity assertion from a provider SDK, sent as `credential`
    IdentityToken,
    /// An authorization code from a redirect callback, sent as `code`
    AuthorizationCode,
}

impl CredentialKind {
    /// JSON field name used in the exchange request body
    pub fn wire_name(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken => "access_token",
            CredentialKind::IdentityToken => "credential",
            CredentialKind::AuthorizationCode => "code",
        }
    }
}

/// Terminal outcome of one strategy execution
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// The user agent was sent to the provider; this flow instance is done
    Redirecting,
    /// The exchange succeeded
    Tokens(SessionTokens),
    /// The user cancelled or dismissed; not an error, nothing to report
    Cancelled,
}

/// One interchangeable way of signing a user in
///
/// Within one execution, acquisition strictly precedes the exchange, and the
/// exchange strictly precedes the outcome. At most one exchange request is
/// issued per execution.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn execute(
        &self,
        config: &ProviderConfig,
        backend: &BackendClient,
    ) -> Result<StrategyOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_wire_names() {
        assert_eq!(Credential::access_token("t").kind.wire_name(), "access_token");
        assert_eq!(Credential::identity_token("t").kind.wire_name(), "credential");
        assert_eq!(Credential::authorization_code("c").kind.wire_name(), "code");
    }
}
