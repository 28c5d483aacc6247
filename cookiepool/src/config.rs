//! Application configuration loaded from the environment.

use std::time::Duration;

use pool_sites::{RecognizerConfig, WebDriverConfig};

/// Default delay between passes of the generation and validation loops.
const DEFAULT_CYCLE_SECS: u64 = 120;

/// How the validation loop treats tokens whose probe could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnreachablePolicy {
    /// Keep the token; a later pass will see it again.
    #[default]
    Lenient,
    /// Evict the token as if the probe had found it invalid.
    Conservative,
}

impl UnreachablePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(Self::Lenient),
            "conservative" => Some(Self::Conservative),
            _ => None,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database URL
    pub database_url: String,
    /// Names of the sites the pool maintains
    pub sites: Vec<String>,
    /// Delay between generation passes
    pub generation_cycle: Duration,
    /// Delay between validation passes
    pub validation_cycle: Duration,
    /// Run the generation loop
    pub generation_enabled: bool,
    /// Run the validation loop
    pub validation_enabled: bool,
    /// Run the HTTP API
    pub api_enabled: bool,
    /// Unreachable-probe handling for the validation loop
    pub unreachable_policy: UnreachablePolicy,
    /// Remote browser endpoint configuration
    pub webdriver: WebDriverConfig,
    /// Challenge recognition service configuration
    pub recognizer: RecognizerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:cookiepool.db?mode=rwc".to_string(),
            sites: vec!["weibo".to_string()],
            generation_cycle: Duration::from_secs(DEFAULT_CYCLE_SECS),
            validation_cycle: Duration::from_secs(DEFAULT_CYCLE_SECS),
            generation_enabled: true,
            validation_enabled: true,
            api_enabled: true,
            unreachable_policy: UnreachablePolicy::default(),
            webdriver: WebDriverConfig::default(),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Supported env vars:
    /// - `DATABASE_URL` (e.g. "sqlite:cookiepool.db?mode=rwc")
    /// - `POOL_SITES` (comma-separated site names, e.g. "weibo,mweibo")
    /// - `GENERATION_CYCLE_SECS` / `VALIDATION_CYCLE_SECS`
    /// - `GENERATION_ENABLED` / `VALIDATION_ENABLED` / `API_ENABLED`
    /// - `VALIDATION_POLICY` ("lenient" or "conservative")
    /// - `WEBDRIVER_URL` / `WEBDRIVER_BROWSER` / `WEBDRIVER_HEADLESS`
    /// - `RECOGNIZER_ENDPOINT` / `RECOGNIZER_API_KEY` / `RECOGNIZER_TIMEOUT_SECS`
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.trim().is_empty()
        {
            config.database_url = url;
        }

        if let Ok(sites) = std::env::var("POOL_SITES")
            && !sites.trim().is_empty()
        {
            config.sites = sites
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(secs) = std::env::var("GENERATION_CYCLE_SECS")
            && let Ok(parsed) = secs.parse::<u64>()
        {
            config.generation_cycle = Duration::from_secs(parsed);
        }

        if let Ok(secs) = std::env::var("VALIDATION_CYCLE_SECS")
            && let Ok(parsed) = secs.parse::<u64>()
        {
            config.validation_cycle = Duration::from_secs(parsed);
        }

        if let Ok(value) = std::env::var("GENERATION_ENABLED") {
            config.generation_enabled = parse_bool(&value);
        }

        if let Ok(value) = std::env::var("VALIDATION_ENABLED") {
            config.validation_enabled = parse_bool(&value);
        }

        if let Ok(value) = std::env::var("API_ENABLED") {
            config.api_enabled = parse_bool(&value);
        }

        if let Ok(policy) = std::env::var("VALIDATION_POLICY")
            && let Some(parsed) = UnreachablePolicy::parse(&policy)
        {
            config.unreachable_policy = parsed;
        }

        if let Ok(url) = std::env::var("WEBDRIVER_URL")
            && !url.trim().is_empty()
        {
            config.webdriver.endpoint = url;
        }

        if let Ok(browser) = std::env::var("WEBDRIVER_BROWSER")
            && !browser.trim().is_empty()
        {
            config.webdriver.browser = browser;
        }

        if let Ok(value) = std::env::var("WEBDRIVER_HEADLESS") {
            config.webdriver.headless = parse_bool(&value);
        }

        if let Ok(endpoint) = std::env::var("RECOGNIZER_ENDPOINT") {
            config.recognizer.endpoint = endpoint;
        }

        if let Ok(key) = std::env::var("RECOGNIZER_API_KEY") {
            config.recognizer.api_key = key;
        }

        if let Ok(secs) = std::env::var("RECOGNIZER_TIMEOUT_SECS")
            && let Ok(parsed) = secs.parse::<u64>()
        {
            config.recognizer.timeout_secs = parsed;
        }

        config
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
