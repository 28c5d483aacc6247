//! Account database model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account database model.
/// Represents one credential the pool may log in with, keyed by (site, username).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccountDbModel {
    /// Site this account belongs to
    pub site: String,
    /// Login name, unique within a site
    pub username: String,
    /// Login password, stored as provided
    pub password: String,
    /// When the account was added to the roster
    pub created_at: DateTime<Utc>,
}

impl AccountDbModel {
    pub fn new(
        site: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            username: username.into(),
            password: password.into(),
            created_at: Utc::now(),
        }
    }
}
