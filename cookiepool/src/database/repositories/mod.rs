//! Repository layer for database access.
//!
//! This module implements the Repository Pattern to abstract all database
//! interactions behind traits the pool and API layers depend on.

pub mod account;
pub mod cookie;

pub use account::*;
pub use cookie::*;
