use clap::Parser;
use client::init_tracing;
use kod_core::{Config, Context};
use kod_http::serve as http_serve;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Local web explorer for KOD escrow trades")]
#[command(long_about = r#"Serves the KOD trade explorer on a local HTTP port.

The explorer connects to a KOD node over websocket RPC, shows chain
statistics, looks up trades by id and decrypts trade contracts with the
recovery phrase of one of the trade parties. Phrases are only used inside
this process and are never sent to the node.

Environment variables:
  KOD_WS_URL          - Node websocket endpoint (default ws://127.0.0.1:9944)
  HTTP_IPV4           - Address to listen on (default 127.0.0.1)
  HTTP_PORT           - Port to listen on (default 3000)
  RPC_TIMEOUT_SECS    - Timeout for a single RPC request (default 30)
  SS58_PREFIX         - Address prefix for rendered accounts (default 42)
  STATS_REFRESH_SECS  - Dashboard refresh interval, 0 disables (default 6)
  RUST_LOG            - Log filter (default info)"#)]
struct Args {
    /// Node websocket endpoint, overrides KOD_WS_URL
    #[arg(long)]
    url: Option<String>,
    /// Do not connect on startup, wait for the dashboard connect form
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = match args.url.as_deref() {
        Some(url) => Config::with_ws_url(url),
        None => Config::from_env(),
    };
    let (ip, port) = config.http_addr();
    if !ip.is_loopback() {
        warn!("listening on {ip}, recovery phrases submitted to the decrypt form will cross the network");
    }

    let ws_url = config.ws_url.clone();
    let ctx = Context::new(config);

    // on failure the dashboard connect form is the retry path
    if !args.offline {
        match ctx.connect(&ws_url).await {
            Ok(chain) => info!("connected to {chain} at {ws_url}"),
            Err(e) => warn!("initial connect to {ws_url} failed: {e}"),
        }
    }

    let socket = TcpListener::bind((ip, port)).await?;
    http_serve(socket, ctx.clone()).await?;

    ctx.disconnect().await;
    Ok(())
}
