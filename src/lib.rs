//! Loginflow - multi-strategy social sign-in client
//!
//! This library implements the credential acquisition and exchange flow for
//! third-party sign-in (GitHub, Google) against a JWT-issuing backend:
//! interchangeable strategies obtain raw credential material (a redirect, an
//! out-of-band token, or a provider SDK), a backend client exchanges it for
//! session tokens, and a coordinator gates and orchestrates the whole flow.

pub mod backend;
pub mod callback;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod sdk;
pub mod session;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
