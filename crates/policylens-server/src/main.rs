use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use policylens_runtime::{BriefGenerator, InMemoryCache, ProviderChain, RuntimeConfig};
use policylens_server::{build_app, AppState};

#[derive(Parser, Debug)]
#[command(name = "policylens-server", version, about = "Policy brief generation API")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; it's optional, so only real read errors warrant a warning
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = RuntimeConfig::from_env().context("invalid runtime configuration")?;
    let chain = ProviderChain::from_env(&config)
        .context("provider credentials missing; set GOOGLE_API_KEY")?;
    tracing::info!(
        providers = chain.len(),
        primary_model = %config.primary_model,
        cache_ttl = ?config.cache_ttl,
        "provider chain configured"
    );

    let cache = Arc::new(InMemoryCache::new(config.cache_ttl));
    let generator = Arc::new(BriefGenerator::new(chain, cache, config));

    let app = build_app(AppState { generator });

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %args.bind, "policylens listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
