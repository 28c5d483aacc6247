//! Domain types shared by acquirers, validators and the pool service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque session token: cookie name -> cookie value.
pub type CookiePayload = HashMap<String, String>;

/// One pooled token, keyed by `(site, username)`.
///
/// At most one entry exists per key at any time; acquisition upserts,
/// a failed validation deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub site: String,
    pub username: String,
    pub payload: CookiePayload,
    pub captured_at: DateTime<Utc>,
}

impl CookieEntry {
    pub fn new(site: impl Into<String>, username: impl Into<String>, payload: CookiePayload) -> Self {
        Self {
            site: site.into(),
            username: username.into(),
            payload,
            captured_at: Utc::now(),
        }
    }

    /// Render the payload as a `Cookie` request-header value.
    pub fn cookie_header(&self) -> String {
        let mut header = String::with_capacity(
            self.payload
                .iter()
                .map(|(k, v)| k.len() + 1 + v.len() + 2)
                .sum(),
        );
        for (name, value) in &self.payload {
            if !header.is_empty() {
                header.push_str("; ");
            }
            header.push_str(name);
            header.push('=');
            header.push_str(value);
        }
        header
    }
}

/// Result of one acquisition attempt.
///
/// `Absent` is the ordinary "no token this cycle" outcome; every transport
/// or automation failure inside an acquirer collapses into it so the
/// generation loop can simply retry on its next cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquireOutcome {
    Token(CookiePayload),
    Absent,
}

impl AcquireOutcome {
    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Result of one validation probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// The token still authenticates.
    Valid,
    /// The site rejected the token; the entry should be evicted.
    Invalid,
    /// The probe itself failed (network, parse); validity is unknown.
    Unreachable,
}

impl TokenStatus {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_joins_pairs() {
        let mut payload = CookiePayload::new();
        payload.insert("sid".to_string(), "123".to_string());
        let entry = CookieEntry::new("weibo", "a", payload);
        assert_eq!(entry.cookie_header(), "sid=123");
    }

    #[test]
    fn test_cookie_header_multiple_pairs() {
        let mut payload = CookiePayload::new();
        payload.insert("a".to_string(), "1".to_string());
        payload.insert("b".to_string(), "2".to_string());
        let entry = CookieEntry::new("weibo", "a", payload);
        let header = entry.cookie_header();
        assert!(header == "a=1; b=2" || header == "b=2; a=1");
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(AcquireOutcome::Token(CookiePayload::new()).is_token());
        assert!(AcquireOutcome::Absent.is_absent());
        assert!(TokenStatus::Invalid.is_invalid());
        assert!(!TokenStatus::Unreachable.is_invalid());
    }
}
