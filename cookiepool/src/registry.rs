//! Site registry resolved once at startup.

use std::sync::Arc;

use pool_sites::{Acquirer, SiteFactory, TokenValidator, supported_sites};

use crate::error::{Error, Result};

/// One site the pool maintains, with its resolved driver pair.
pub struct RegisteredSite {
    pub name: String,
    pub acquirer: Arc<dyn Acquirer>,
    pub validator: Arc<dyn TokenValidator>,
}

/// The set of sites this process maintains.
///
/// Resolved from the configured names exactly once at startup. An unknown
/// name is a configuration error and aborts startup; nothing is resolved
/// lazily afterwards.
pub struct SiteRegistry {
    sites: Vec<RegisteredSite>,
}

impl SiteRegistry {
    /// Resolve the configured site names against the factory.
    pub fn from_names(names: &[String], factory: &SiteFactory) -> Result<Self> {
        let mut sites: Vec<RegisteredSite> = Vec::with_capacity(names.len());
        for name in names {
            if sites.iter().any(|site| &site.name == name) {
                continue;
            }
            let binding = factory.create_binding(name).map_err(|_| {
                Error::config(format!(
                    "unknown site '{}' (supported: {})",
                    name,
                    supported_sites().join(", ")
                ))
            })?;
            sites.push(RegisteredSite {
                name: name.clone(),
                acquirer: binding.acquirer,
                validator: binding.validator,
            });
        }
        Ok(Self { sites })
    }

    /// Build a registry from already-resolved sites.
    pub fn from_sites(sites: Vec<RegisteredSite>) -> Self {
        Self { sites }
    }

    pub fn sites(&self) -> &[RegisteredSite] {
        &self.sites
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sites.iter().any(|site| site.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sites.iter().map(|site| site.name.as_str()).collect()
    }
}
