//! API request and response models (DTOs).
//!
//! These models define the wire shapes for the serving layer. Account
//! passwords are accepted on create and never serialized back out.

use chrono::{DateTime, Utc};
use pool_sites::CookiePayload;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status indicator
    pub status: String,
    /// Running crate version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
}

/// Liveness check response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LivenessResponse {
    /// Status indicator (always "alive" if responding)
    pub status: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
}

/// Generic message response for operations that return only a status message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Status or result message
    pub message: String,
}

// ============================================================================
// Pool
// ============================================================================

/// Roster and pool counts for one registered site.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SitePoolSummary {
    /// Site name
    pub site: String,
    /// Accounts registered for the site
    pub accounts: i64,
    /// Tokens currently pooled
    pub tokens: i64,
}

/// Pool summary across every registered site.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PoolSummaryResponse {
    pub sites: Vec<SitePoolSummary>,
}

/// One served token, or the explicit absence of one.
///
/// An empty pool is a normal condition, not an error: `available` is false
/// and the remaining fields are omitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RandomTokenResponse {
    /// Site the token was requested for
    pub site: String,
    /// Whether a token was available
    pub available: bool,
    /// Account the token belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Cookie name/value pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<CookiePayload>,
    /// When the token was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl RandomTokenResponse {
    /// The "pool is empty" success shape.
    pub fn empty(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            available: false,
            username: None,
            cookies: None,
            captured_at: None,
        }
    }
}

/// Pool size for one site.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenCountResponse {
    /// Site name
    pub site: String,
    /// Tokens currently pooled
    pub count: i64,
}

// ============================================================================
// Accounts
// ============================================================================

/// Account as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Site the account belongs to
    pub site: String,
    /// Login name
    pub username: String,
    /// When the account was added
    pub created_at: DateTime<Utc>,
}

/// Request to register a new account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Site the account belongs to; must be registered
    pub site: String,
    /// Login name
    pub username: String,
    /// Login password
    pub password: String,
}

/// Filter parameters for account listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AccountFilterParams {
    /// Restrict the listing to one site
    pub site: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_response_omits_fields() {
        let response = RandomTokenResponse::empty("weibo");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"available\":false"));
        assert!(!json.contains("username"));
        assert!(!json.contains("cookies"));
    }
}
