//! Validation contract.

use async_trait::async_trait;

use crate::types::{CookieEntry, TokenStatus};

/// Checks whether a pooled token still authenticates.
///
/// Validators probe, they never mutate: eviction is the validation loop's
/// decision, keeping store-mutation policy in one place. A failed probe is
/// reported as [`TokenStatus::Unreachable`] so the loop can apply the
/// configured keep-or-evict policy.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Site this validator probes, e.g. "weibo".
    fn site_name(&self) -> &'static str;

    async fn validate(&self, entry: &CookieEntry) -> TokenStatus;
}
