//! Acquisition contract.

use async_trait::async_trait;

use crate::browser::BrowserSession;
use crate::types::AcquireOutcome;

/// Drives an interactive login against one site and extracts a token.
///
/// Implementations own their failure handling: any transport or automation
/// error is logged and mapped to [`AcquireOutcome::Absent`] so a single
/// account's failure never halts the generation pass.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Site this acquirer logs into, e.g. "weibo".
    fn site_name(&self) -> &'static str;

    /// Attempt one login with the given credentials inside `session`.
    async fn acquire(
        &self,
        session: &dyn BrowserSession,
        username: &str,
        password: &str,
    ) -> AcquireOutcome;
}
