use std::{sync::OnceLock, time::Duration};

use tracing::debug;

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Build the shared HTTP client used for validation probes and challenge
/// image fetches.
pub fn build_probe_client(timeout: Duration) -> reqwest::Client {
    install_rustls_provider();

    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
