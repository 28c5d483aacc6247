use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cookiepool::api::server::{ApiServer, ApiServerConfig, AppState};
use cookiepool::config::AppConfig;
use cookiepool::database;
use cookiepool::database::repositories::{SqlxAccountRepository, SqlxCookieRepository};
use cookiepool::pool::PoolService;
use cookiepool::registry::SiteRegistry;
use cookiepool::scheduler::{PoolScheduler, SchedulerConfig};
use cookiepool::utils::http_client;
use pool_sites::{ChallengeResolver, RemoteResolver, SessionProvider, SiteFactory, WebDriverClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let _log_guard = init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env_or_default();

    http_client::install_rustls_provider();

    // Initialize database
    let pool = database::init_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;
    let write_pool = database::init_write_pool(&config.database_url).await?;

    let accounts = Arc::new(SqlxAccountRepository::new(pool.clone(), write_pool.clone()));
    let cookies = Arc::new(SqlxCookieRepository::new(pool.clone(), write_pool.clone()));

    // Resolve the configured sites up front; an unknown name aborts startup.
    let resolver: Arc<dyn ChallengeResolver> =
        Arc::new(RemoteResolver::new(config.recognizer.clone()));
    let probe_client = http_client::build_probe_client(Duration::from_secs(30));
    let factory = SiteFactory::new(resolver, probe_client);
    let registry = Arc::new(SiteRegistry::from_names(&config.sites, &factory)?);
    tracing::info!(sites = ?registry.names(), "site registry resolved");

    let sessions: Arc<dyn SessionProvider> =
        Arc::new(WebDriverClient::new(config.webdriver.clone())?);

    let service = Arc::new(PoolService::new(
        registry.clone(),
        accounts.clone(),
        cookies.clone(),
        sessions,
        config.unreachable_policy,
    ));

    let scheduler = PoolScheduler::new(SchedulerConfig::from_app_config(&config), service.clone());
    let handles = scheduler.start();

    let api_server = if config.api_enabled {
        let api_config = ApiServerConfig::from_env_or_default();
        // A bind address that does not parse aborts startup.
        api_config.socket_addr()?;
        let state = AppState::new()
            .with_account_repository(accounts.clone())
            .with_cookie_repository(cookies.clone())
            .with_registry(registry.clone())
            .with_db_pool(pool.clone());
        let server = Arc::new(ApiServer::with_state(api_config, state));
        let runner = server.clone();
        tokio::spawn(async move {
            if let Err(e) = runner.run().await {
                tracing::error!("API server error: {}", e);
            }
        });
        Some(server)
    } else {
        tracing::info!("API disabled");
        None
    };

    tracing::info!("cookiepool started");

    // Run until interrupted, then stop every loop.
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    scheduler.shutdown();
    if let Some(server) = &api_server {
        server.shutdown();
    }

    PoolScheduler::supervise(handles).await;

    Ok(())
}

/// Set up the subscriber stack: env-filtered stdout, plus a daily-rolling
/// file layer when `LOG_DIR` is set. The returned guard must stay alive for
/// the file writer to flush.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cookiepool=debug,pool_sites=debug,sqlx=warn".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if let Ok(dir) = std::env::var("LOG_DIR")
        && !dir.trim().is_empty()
    {
        let appender = tracing_appender::rolling::daily(dir, "cookiepool.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init();
        Some(guard)
    } else {
        registry.init();
        None
    }
}
