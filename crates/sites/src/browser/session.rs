//! The session trait consumed by the login engine.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// One cookie as reported by the browser.
///
/// Drivers return more fields (expiry, httpOnly, ...); only the ones the
/// pool stores are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// An interactive browser session.
///
/// All waits are bounded; `wait_visible` reports a timeout as `Ok(false)`,
/// never as an error, so the engine can branch on it.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn title(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    /// Click the first element matching the CSS selector.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Clear the field matching the selector and type `text` into it.
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Poll until the selector matches a displayed element or `timeout`
    /// elapses.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Read an attribute of the first element matching the selector.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    async fn cookies(&self) -> Result<Vec<SessionCookie>>;

    async fn delete_all_cookies(&self) -> Result<()>;

    /// End the session. Must be called on every exit path of a generation
    /// pass; sessions are never held as ambient state.
    async fn close(&self) -> Result<()>;
}

/// Opens sessions for the generation loop, one per site pass.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}
