//! cookiepool library crate.
//!
//! A self-refreshing pool of authenticated session cookies: a generation
//! loop logs registered accounts in through a remote browser, a validation
//! loop probes pooled tokens and evicts dead ones, and an HTTP API serves
//! random live tokens per site.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod pool;
pub mod registry;
pub mod scheduler;
pub mod utils;

pub use error::{Error, Result};
