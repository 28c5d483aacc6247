use std::sync::Arc;

use reqwest::Client;

use crate::acquirer::Acquirer;
use crate::challenge::ChallengeResolver;
use crate::engine::{LoginEngine, SiteProfile};
use crate::error::{Result, SiteError};
use crate::sites::{mweibo, weibo};
use crate::validator::TokenValidator;

// Type aliases for thread-safe constructor functions.
type ProfileConstructor = fn() -> SiteProfile;
type ValidatorConstructor = fn(Client) -> Arc<dyn TokenValidator>;

struct SiteEntry {
    name: &'static str,
    profile: ProfileConstructor,
    validator: ValidatorConstructor,
}

macro_rules! site_registry {
    ( $( $name:literal => ($profile:path, $validator:path) ),+ $(,)? ) => {
        &[
            $(
                SiteEntry {
                    name: $name,
                    profile: $profile,
                    validator: |client| {
                        Arc::new($validator(client)) as Arc<dyn TokenValidator>
                    },
                },
            )+
        ]
    };
}

// Static site registry.
static SITES: &[SiteEntry] = site_registry![
    "weibo" => (weibo::profile, weibo::WeiboValidator::new),
    "mweibo" => (mweibo::profile, mweibo::MWeiboValidator::new),
];

/// Returns the names of every site this crate can drive.
pub fn supported_sites() -> Vec<&'static str> {
    SITES.iter().map(|entry| entry.name).collect()
}

/// The acquirer/validator pair resolved for a single site.
pub struct SiteBinding {
    pub acquirer: Arc<dyn Acquirer>,
    pub validator: Arc<dyn TokenValidator>,
}

/// A factory for creating site-specific login drivers and validators.
pub struct SiteFactory {
    resolver: Arc<dyn ChallengeResolver>,
    client: Client,
}

impl SiteFactory {
    pub fn new(resolver: Arc<dyn ChallengeResolver>, client: Client) -> Self {
        Self { resolver, client }
    }

    pub fn create_binding(&self, name: &str) -> Result<SiteBinding> {
        for site in SITES {
            if site.name == name {
                let engine =
                    LoginEngine::new((site.profile)(), self.resolver.clone(), self.client.clone());
                return Ok(SiteBinding {
                    acquirer: Arc::new(engine),
                    validator: (site.validator)(self.client.clone()),
                });
            }
        }

        Err(SiteError::UnknownSite(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopResolver;

    #[async_trait::async_trait]
    impl ChallengeResolver for NoopResolver {
        async fn resolve(&self, _image: &[u8]) -> Option<String> {
            None
        }
    }

    fn factory() -> SiteFactory {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        SiteFactory::new(Arc::new(NoopResolver), Client::new())
    }

    #[test]
    fn test_supported_sites_lists_registry() {
        let sites = supported_sites();
        assert!(sites.contains(&"weibo"));
        assert!(sites.contains(&"mweibo"));
    }

    #[test]
    fn test_create_binding_for_registered_site() {
        let binding = factory().create_binding("weibo").unwrap();
        assert_eq!(binding.acquirer.site_name(), "weibo");
        assert_eq!(binding.validator.site_name(), "weibo");
    }

    #[test]
    fn test_create_binding_rejects_unknown_site() {
        let Err(err) = factory().create_binding("myspace") else {
            panic!("expected unknown site to fail binding");
        };
        assert!(matches!(err, SiteError::UnknownSite(name) if name == "myspace"));
    }
}
