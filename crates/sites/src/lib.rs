//! Per-site login drivers and session validators for the cookie pool.
//!
//! This crate knows how to obtain an authenticated session for a supported
//! site and how to check whether a previously captured session still works.
//!
//! ## Core Types
//!
//! - [`Acquirer`] - Trait for driving one site's login flow end to end
//! - [`TokenValidator`] - Trait for probing whether a stored session is live
//! - [`ChallengeResolver`] - Trait for turning a challenge image into text
//! - [`BrowserSession`] / [`SessionProvider`] - Remote browser abstraction
//! - [`SiteFactory`] - Resolves a site name into its acquirer/validator pair
//!
//! ## Component Overview
//!
//! - `browser`: WebDriver-backed browser sessions
//! - `challenge`: remote challenge recognition service client
//! - `engine`: the shared login state machine, parameterized per site
//! - `sites`: site profiles and validators for each supported site
//! - `factory`: the static site registry

pub mod acquirer;
pub mod browser;
pub mod challenge;
pub mod engine;
pub mod error;
pub mod factory;
pub mod sites;
pub mod types;
pub mod validator;

pub use acquirer::Acquirer;
pub use browser::{BrowserSession, SessionProvider, WebDriverClient, WebDriverConfig};
pub use challenge::{ChallengeResolver, RecognizerConfig, RemoteResolver};
pub use error::SiteError;
pub use factory::{SiteBinding, SiteFactory, supported_sites};
pub use types::{AcquireOutcome, CookieEntry, CookiePayload, TokenStatus};
pub use validator::TokenValidator;

/// User agent sent on plain HTTP requests made outside the browser.
pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
