//! Query Cache - headless admin session
//!
//! Logs in against the student backend and prints one page of the student
//! list through the request cache.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use query_cache::api::{self, auth, etudiants};
use query_cache::models::{Credentials, EtudiantListParams, EtudiantPage};
use query_cache::transport::TokenStore;
use query_cache::{spawn_eviction_task, Config, EntryStatus};

/// Main entry point for the admin session.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store over the HTTP transport
/// 4. Start background eviction task
/// 5. Log in when `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set
/// 6. Subscribe to one page of students and print it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "query_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, timeout={}ms, eviction_grace={}s",
        config.api_base_url, config.request_timeout_ms, config.eviction_grace
    );

    let tokens = Arc::new(TokenStore::new());
    let store = api::store_from_config(&config, tokens.clone()).context("building cache store")?;
    let eviction = spawn_eviction_task(
        store.clone(),
        std::time::Duration::from_secs(config.eviction_interval),
    );

    match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            auth::login(&store, &tokens, &Credentials::new(email, password))
                .await
                .context("login failed")?;
        }
        _ => warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, continuing without a token"),
    }

    let params = EtudiantListParams::new(
        env_or("PAGE", 1),
        env_or("LIMIT", 10),
        env::var("SEARCH").unwrap_or_default(),
    );
    let (subscription, mut watch) = etudiants::subscribe_page(&store, &params)?;
    let entry = watch
        .settled()
        .await
        .context("student list subscription closed")?;

    if entry.status == EntryStatus::Error {
        subscription.unsubscribe();
        eviction.abort();
        let error = entry.error.context("error entry without detail")?;
        anyhow::bail!("loading students failed ({}): {}", error.code(), error);
    }

    let page: EtudiantPage = serde_json::from_value(entry.data.unwrap_or_default())
        .context("unexpected student list body")?;
    println!("Page {} of {}", params.page, page.total_pages);
    for etudiant in &page.data {
        println!(
            "{:>6}  {:<30}  {:<8}  {}",
            etudiant.id.to_string(),
            etudiant.full_name(),
            etudiant.niveau.as_deref().unwrap_or("-"),
            etudiant.etablissement.as_deref().unwrap_or("-"),
        );
    }

    subscription.unsubscribe();
    eviction.abort();
    info!(stats = ?store.stats(), "Session finished");
    Ok(())
}

fn env_or(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
