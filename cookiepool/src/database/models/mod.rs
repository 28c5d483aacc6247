//! Database models for cookiepool.
//!
//! These models map directly to the database schema.

pub mod account;
pub mod cookie;

pub use account::*;
pub use cookie::*;
