//! Pool maintenance service.
//!
//! Implements the generation and validation passes the scheduler drives.
//! Each pass walks every registered site; a failure on one site is logged
//! and never stops the others. A store failure aborts the current site's
//! pass, leaving whatever it had already written in place.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use pool_sites::{AcquireOutcome, BrowserSession, CookieEntry, SessionProvider, TokenStatus};
use tracing::{debug, info, instrument, warn};

use crate::config::UnreachablePolicy;
use crate::database::models::{AccountDbModel, CookieDbModel};
use crate::database::repositories::{AccountRepository, CookieRepository};
use crate::error::Result;
use crate::pool::events::{PoolEvent, PoolEventBroadcaster};
use crate::registry::{RegisteredSite, SiteRegistry};

/// Maintains the pool: logs pending accounts in, evicts dead tokens.
pub struct PoolService {
    registry: Arc<SiteRegistry>,
    accounts: Arc<dyn AccountRepository>,
    cookies: Arc<dyn CookieRepository>,
    sessions: Arc<dyn SessionProvider>,
    events: PoolEventBroadcaster,
    policy: UnreachablePolicy,
}

impl PoolService {
    pub fn new(
        registry: Arc<SiteRegistry>,
        accounts: Arc<dyn AccountRepository>,
        cookies: Arc<dyn CookieRepository>,
        sessions: Arc<dyn SessionProvider>,
        policy: UnreachablePolicy,
    ) -> Self {
        Self {
            registry,
            accounts,
            cookies,
            sessions,
            events: PoolEventBroadcaster::new(),
            policy,
        }
    }

    /// Subscribe-side access to the pool event stream.
    pub fn events(&self) -> &PoolEventBroadcaster {
        &self.events
    }

    /// Run one generation pass over every registered site.
    pub async fn generation_pass(&self) {
        for site in self.registry.sites() {
            if let Err(e) = self.generate_for_site(site).await {
                warn!(site = %site.name, error = %e, "generation pass aborted for site");
            }
        }
    }

    /// Run one validation pass over every registered site.
    pub async fn validation_pass(&self) {
        for site in self.registry.sites() {
            if let Err(e) = self.validate_for_site(site).await {
                warn!(site = %site.name, error = %e, "validation pass aborted for site");
            }
        }
    }

    #[instrument(skip(self, site), fields(site = %site.name))]
    async fn generate_for_site(&self, site: &RegisteredSite) -> Result<()> {
        let accounts = self.accounts.for_site(&site.name).await?;
        if accounts.is_empty() {
            debug!("no accounts registered");
            return Ok(());
        }

        let pooled: HashSet<String> = self
            .cookies
            .for_site(&site.name)
            .await?
            .into_iter()
            .map(|cookie| cookie.username)
            .collect();

        let pending: Vec<AccountDbModel> = accounts
            .into_iter()
            .filter(|account| !pooled.contains(&account.username))
            .collect();

        if pending.is_empty() {
            debug!("every account already pooled");
            return Ok(());
        }

        info!(pending = pending.len(), "logging in pending accounts");

        // The browser session is opened only once at least one account is
        // known to need a login, and closed before this pass returns.
        let session = match self.sessions.open().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not open a browser session");
                return Ok(());
            }
        };

        let result = self.acquire_pending(site, session.as_ref(), &pending).await;

        if let Err(e) = session.close().await {
            debug!(error = %e, "browser session close failed");
        }

        let (attempted, captured) = result?;
        self.events.publish(PoolEvent::GenerationPassCompleted {
            site: site.name.clone(),
            attempted,
            captured,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn acquire_pending(
        &self,
        site: &RegisteredSite,
        session: &dyn BrowserSession,
        pending: &[AccountDbModel],
    ) -> Result<(usize, usize)> {
        let mut captured = 0usize;
        for account in pending {
            let outcome = site
                .acquirer
                .acquire(session, &account.username, &account.password)
                .await;
            match outcome {
                AcquireOutcome::Token(payload) => {
                    let entry =
                        CookieEntry::new(site.name.clone(), account.username.clone(), payload);
                    let model = CookieDbModel::from_entry(&entry)?;
                    self.cookies.set(&model).await?;
                    captured += 1;
                    self.events.publish(PoolEvent::TokenCaptured {
                        site: site.name.clone(),
                        username: account.username.clone(),
                        timestamp: Utc::now(),
                    });
                }
                AcquireOutcome::Absent => {
                    debug!(username = %account.username, "no token obtained");
                }
            }
        }
        Ok((pending.len(), captured))
    }

    #[instrument(skip(self, site), fields(site = %site.name))]
    async fn validate_for_site(&self, site: &RegisteredSite) -> Result<()> {
        let pooled = self.cookies.for_site(&site.name).await?;
        if pooled.is_empty() {
            return Ok(());
        }

        let checked = pooled.len();
        let mut evicted = 0usize;
        for model in pooled {
            let entry = match model.to_entry() {
                Ok(entry) => entry,
                Err(e) => {
                    // A row that no longer decodes can never be served.
                    warn!(username = %model.username, error = %e, "evicting undecodable token");
                    self.evict(&site.name, &model.username).await?;
                    evicted += 1;
                    continue;
                }
            };

            match site.validator.validate(&entry).await {
                TokenStatus::Valid => {
                    debug!(username = %entry.username, "token still valid");
                }
                TokenStatus::Invalid => {
                    info!(username = %entry.username, "token invalid, evicting");
                    self.evict(&site.name, &entry.username).await?;
                    evicted += 1;
                }
                TokenStatus::Unreachable => match self.policy {
                    UnreachablePolicy::Lenient => {
                        debug!(username = %entry.username, "probe unreachable, keeping token");
                    }
                    UnreachablePolicy::Conservative => {
                        info!(username = %entry.username, "probe unreachable, evicting");
                        self.evict(&site.name, &entry.username).await?;
                        evicted += 1;
                    }
                },
            }
        }

        self.events.publish(PoolEvent::ValidationPassCompleted {
            site: site.name.clone(),
            checked,
            evicted,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn evict(&self, site: &str, username: &str) -> Result<()> {
        self.cookies.delete(site, username).await?;
        self.events.publish(PoolEvent::TokenEvicted {
            site: site.to_string(),
            username: username.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}
