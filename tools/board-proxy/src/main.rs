use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use board_proxy::{router, ProxyState};

#[derive(Parser)]
#[command(
    name = "board-proxy",
    about = "Serve the message board UI and forward /api/* to the rephrase webhook host"
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "BOARD_PROXY_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Base URL that `/api/<path>` is forwarded to (e.g. "https://hooks.example.com/webhook").
    #[arg(long, env = "BOARD_PROXY_UPSTREAM")]
    upstream: String,

    /// Directory with the built UI. Without it only `/api` and `/health` are served.
    #[arg(long, env = "BOARD_PROXY_DIST")]
    dist: Option<PathBuf>,

    /// Upstream request timeout.
    #[arg(long, env = "BOARD_PROXY_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("board_proxy=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let state = ProxyState::new(&cli.upstream, Duration::from_secs(cli.timeout_secs))?;
    let app = router(state, cli.dist.as_deref());

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    tracing::info!(
        addr = %cli.listen,
        upstream = %cli.upstream,
        dist = ?cli.dist,
        "board proxy listening"
    );

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
