//! Per-site login profiles.
//!
//! Site variants differ only in URLs, selectors and markers; the state
//! machine itself lives in [`super::LoginEngine`]. Adding a site means
//! writing one profile plus a validator, not another login flow.

use std::time::Duration;

/// Default wait for form and challenge elements to appear.
pub const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default wait for the post-submit success marker.
pub const DEFAULT_OUTCOME_TIMEOUT: Duration = Duration::from_secs(5);

/// Selectors for a site's human-verification block.
#[derive(Debug, Clone)]
pub struct ChallengeSelectors {
    /// Element carrying the challenge image (its `src` is fetched).
    pub image_selector: &'static str,
    /// Field the recognized text is typed into.
    pub input_selector: &'static str,
}

/// Everything site-specific about one login flow.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Registry name, e.g. "weibo".
    pub site: &'static str,
    /// Unauthenticated entry point the flow starts from.
    pub entry_url: &'static str,
    /// Click target that reveals the login form, when it is hidden behind
    /// a toggle.
    pub reveal_selector: Option<&'static str>,
    pub username_selector: &'static str,
    pub password_selector: &'static str,
    pub submit_selector: &'static str,
    /// Element whose visibility signals a successful login.
    pub success_selector: &'static str,
    /// Post-login confirmation: navigate here and require the title
    /// fragment below.
    pub confirm_url: &'static str,
    pub confirm_title_contains: &'static str,
    /// Challenge block, for sites that interpose one.
    pub challenge: Option<ChallengeSelectors>,
    /// Wait budget for form/challenge elements.
    pub element_timeout: Duration,
    /// Wait budget for the success marker after submit.
    pub outcome_timeout: Duration,
}
