//! Cookie database model.

use chrono::{DateTime, Utc};
use pool_sites::{CookieEntry, CookiePayload};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Result;

/// Cookie database model.
/// One pooled session token, keyed by (site, username). The payload column
/// holds the captured cookie jar as a JSON object of name/value pairs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CookieDbModel {
    /// Site the token was captured for
    pub site: String,
    /// Account the token belongs to
    pub username: String,
    /// Cookie jar serialized as a JSON object
    pub payload: String,
    /// When the token was captured
    pub captured_at: DateTime<Utc>,
}

impl CookieDbModel {
    /// Build a row from a freshly captured entry.
    pub fn from_entry(entry: &CookieEntry) -> Result<Self> {
        Ok(Self {
            site: entry.site.clone(),
            username: entry.username.clone(),
            payload: serde_json::to_string(&entry.payload)?,
            captured_at: entry.captured_at,
        })
    }

    /// Decode the stored row back into a cookie entry.
    pub fn to_entry(&self) -> Result<CookieEntry> {
        let payload: CookiePayload = serde_json::from_str(&self.payload)?;
        Ok(CookieEntry {
            site: self.site.clone(),
            username: self.username.clone(),
            payload,
            captured_at: self.captured_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_round_trip() {
        let mut payload = CookiePayload::new();
        payload.insert("SUB".to_string(), "abc123".to_string());

        let entry = CookieEntry::new("weibo", "alice", payload);
        let model = CookieDbModel::from_entry(&entry).unwrap();
        assert_eq!(model.site, "weibo");
        assert!(model.payload.contains("SUB"));

        let decoded = model.to_entry().unwrap();
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.payload.get("SUB").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn test_to_entry_rejects_malformed_payload() {
        let model = CookieDbModel {
            site: "weibo".to_string(),
            username: "alice".to_string(),
            payload: "not json".to_string(),
            captured_at: Utc::now(),
        };
        assert!(model.to_entry().is_err());
    }
}
