//! Human-verification challenge resolution.
//!
//! Some sites interpose a distorted-text image during login. Recognition is
//! delegated to an external service; the resolver collapses every failure
//! mode (transport, timeout, rejection, empty text) into `None` so the
//! login engine treats an unsolved challenge like any other failed attempt.

pub mod remote;

use async_trait::async_trait;

pub use remote::{RecognizerConfig, RemoteResolver};

/// Resolves a challenge image to the text it encodes.
///
/// Stateless between invocations and free of internal retries; the caller
/// decides whether an attempt continues.
#[async_trait]
pub trait ChallengeResolver: Send + Sync {
    async fn resolve(&self, image: &[u8]) -> Option<String>;
}
