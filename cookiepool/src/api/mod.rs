//! REST API server module.
//!
//! Provides HTTP endpoints for fetching pooled tokens, inspecting pool
//! health and managing the account roster.

pub mod error;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod server;

pub use server::ApiServer;
