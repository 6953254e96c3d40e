use std::sync::Arc;

use anyhow::{Context, Result};
use houle_site::config::Config;
use houle_site::content::{ContentStore, FsContentStore, NS_METADATA, NS_NAVBAR, NS_RESSOURCES};
use houle_site::i18n::Locale;
use houle_site::paths::PathLocalizer;
use houle_site::server::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("houle_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting houle site ({}, {})",
        config.environment.as_str(),
        config.site_url
    );

    let placeholders: Vec<&str> = Locale::all()
        .into_iter()
        .filter(|locale| config.is_placeholder(*locale))
        .map(|locale| locale.code())
        .collect();
    if !placeholders.is_empty() {
        info!("Placeholder locales served noindex: {}", placeholders.join(", "));
    }

    // A broken path table would produce colliding URLs; refuse to start.
    let paths = PathLocalizer::new();
    paths.validate().context("Localized path table is inconsistent")?;

    let production = config.environment.is_production();
    let store = FsContentStore::from_candidates(&config.translations_candidates(), production);
    info!("Serving content from {}", store.base_dir().display());
    store.warm(&Locale::all(), &[NS_RESSOURCES, NS_METADATA, NS_NAVBAR]);

    let port = config.port;
    let state = AppState::new(config, Arc::new(store), paths);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("Server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}
