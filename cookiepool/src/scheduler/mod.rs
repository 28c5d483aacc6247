//! The periodic pool loops.
//!
//! Generation and validation each run in their own task with their own
//! cadence. A failed pass is logged and retried next cycle; a panic in
//! one loop never takes down the other, or the API. Serving has no loop
//! here: it is the API server, driven by incoming requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::pool::PoolService;

/// Loop cadence and enablement.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub generation_cycle: Duration,
    pub validation_cycle: Duration,
    pub generation_enabled: bool,
    pub validation_enabled: bool,
}

impl SchedulerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            generation_cycle: config.generation_cycle,
            validation_cycle: config.validation_cycle,
            generation_enabled: config.generation_enabled,
            validation_enabled: config.validation_enabled,
        }
    }
}

/// Drives the periodic pool loops.
pub struct PoolScheduler {
    config: SchedulerConfig,
    service: Arc<PoolService>,
    cancel_token: CancellationToken,
}

impl PoolScheduler {
    pub fn new(config: SchedulerConfig, service: Arc<PoolService>) -> Self {
        Self {
            config,
            service,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token cancelled on shutdown; shared with the loops.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Spawn every enabled loop. Returns named handles for supervision.
    pub fn start(&self) -> Vec<(&'static str, JoinHandle<()>)> {
        let mut handles = Vec::new();

        if self.config.generation_enabled {
            handles.push(("generation", self.spawn_generation_loop()));
        } else {
            info!("generation loop disabled");
        }

        if self.config.validation_enabled {
            handles.push(("validation", self.spawn_validation_loop()));
        } else {
            info!("validation loop disabled");
        }

        handles
    }

    fn spawn_generation_loop(&self) -> JoinHandle<()> {
        let service = self.service.clone();
        let cycle = self.config.generation_cycle;
        let cancel = self.cancel_token.clone();

        tokio::spawn(async move {
            info!(cycle_secs = cycle.as_secs(), "generation loop started");
            loop {
                service.generation_pass().await;

                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        info!("generation loop shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(cycle) => {}
                }
            }
            debug!("generation loop stopped");
        })
    }

    fn spawn_validation_loop(&self) -> JoinHandle<()> {
        let service = self.service.clone();
        let cycle = self.config.validation_cycle;
        let cancel = self.cancel_token.clone();

        tokio::spawn(async move {
            info!(cycle_secs = cycle.as_secs(), "validation loop started");
            loop {
                service.validation_pass().await;

                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        info!("validation loop shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(cycle) => {}
                }
            }
            debug!("validation loop stopped");
        })
    }

    /// Wait for the spawned loops, logging any that panicked.
    pub async fn supervise(handles: Vec<(&'static str, JoinHandle<()>)>) {
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                error!("{} loop task panicked: {}", name, e);
            }
        }
    }

    /// Cancel the loops. Each finishes its current pass first.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
