//! Browser automation over the W3C WebDriver wire protocol.
//!
//! The pool only needs a narrow slice of the protocol: open a session,
//! navigate, wait for an element, fill and click, read cookies, close.
//! [`BrowserSession`] is that slice as a trait so the login engine can be
//! driven by a scripted fake in tests; [`WebDriverClient`] talks to a real
//! chromedriver/geckodriver over HTTP.

pub mod client;
pub mod session;

pub use client::{WebDriverClient, WebDriverConfig, WebDriverSession};
pub use session::{BrowserSession, SessionCookie, SessionProvider};
