//! Pool maintenance: the generation and validation passes and their events.

pub mod events;
pub mod service;

pub use events::{PoolEvent, PoolEventBroadcaster};
pub use service::PoolService;
