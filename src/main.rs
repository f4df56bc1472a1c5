//! nscache - policy table check and store probe
//!
//! Loads the cache configuration the same way an application would, fails
//! fast on an invalid policy table, prints the resolved table and pings the
//! configured backing store.

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nscache::{Config, PolicyTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nscache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        redis = config.redis_url.as_deref().unwrap_or("<memory>"),
        policy_file = ?config.policy_file,
        default_ttl_secs = config.default_ttl_secs,
        timeout_ms = config.store_timeout_ms,
        "Configuration loaded"
    );

    let registry = config
        .policy_registry()
        .context("policy table rejected")?;
    for namespace in registry.namespaces() {
        let policy = registry.resolve(namespace);
        info!(
            namespace,
            ttl = %policy.ttl(),
            cache_nulls = policy.cache_nulls(),
            "Policy"
        );
    }

    if std::env::args().any(|arg| arg == "--dump") {
        let table = match &config.policy_file {
            Some(path) => PolicyTable::from_path(path)?,
            None => PolicyTable::standard(),
        };
        println!("{}", serde_json::to_string_pretty(&table)?);
    }

    let facade = config
        .build_facade()
        .await
        .context("backing store unavailable")?;
    match facade.ping().await {
        Ok(()) => info!(store = facade.store_name(), "Backing store reachable"),
        Err(e) => {
            error!(store = facade.store_name(), error = %e, "Backing store ping failed");
            anyhow::bail!("backing store ping failed: {}", e);
        }
    }

    Ok(())
}
