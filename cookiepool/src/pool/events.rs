//! Pool lifecycle events.
//!
//! This module defines events emitted by the generation and validation
//! loops for consumption by logging or monitoring subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the pool loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PoolEvent {
    /// A login succeeded and its token entered the pool.
    TokenCaptured {
        site: String,
        username: String,
        timestamp: DateTime<Utc>,
    },
    /// A pooled token failed validation and was removed.
    TokenEvicted {
        site: String,
        username: String,
        timestamp: DateTime<Utc>,
    },
    /// One generation pass over a site finished.
    GenerationPassCompleted {
        site: String,
        attempted: usize,
        captured: usize,
        timestamp: DateTime<Utc>,
    },
    /// One validation pass over a site finished.
    ValidationPassCompleted {
        site: String,
        checked: usize,
        evicted: usize,
        timestamp: DateTime<Utc>,
    },
}

impl PoolEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            PoolEvent::TokenCaptured { site, username, .. } => {
                format!("{}/{}: token captured", site, username)
            }
            PoolEvent::TokenEvicted { site, username, .. } => {
                format!("{}/{}: token evicted", site, username)
            }
            PoolEvent::GenerationPassCompleted {
                site,
                attempted,
                captured,
                ..
            } => {
                format!(
                    "{}: generation pass captured {}/{} pending accounts",
                    site, captured, attempted
                )
            }
            PoolEvent::ValidationPassCompleted {
                site,
                checked,
                evicted,
                ..
            } => {
                format!(
                    "{}: validation pass evicted {}/{} tokens",
                    site, evicted, checked
                )
            }
        }
    }
}

/// Broadcaster for pool events.
pub struct PoolEventBroadcaster {
    sender: broadcast::Sender<PoolEvent>,
}

impl PoolEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new broadcaster with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to pool events.
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    /// Publish a pool event. Delivery is best effort; an event with no
    /// subscribers is dropped.
    pub fn publish(&self, event: PoolEvent) {
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PoolEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broadcaster = PoolEventBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(PoolEvent::TokenCaptured {
            site: "weibo".to_string(),
            username: "alice".to_string(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert!(event.description().contains("alice"));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let broadcaster = PoolEventBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
        broadcaster.publish(PoolEvent::TokenEvicted {
            site: "weibo".to_string(),
            username: "bob".to_string(),
            timestamp: Utc::now(),
        });
    }
}
