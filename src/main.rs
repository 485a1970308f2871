//! registry-mirror
//!
//! ```text
//!   docker client                     registry-mirror                        upstreams
//!  ───────────────┐   ┌──────────────────────────────────────────────┐
//!  GET /v2/...    │──▶│ request id → context (host label → route)    │
//!                 │   │   ├─ browser path on disguised host → disguise│──▶ hub web / static page
//!                 │   │   ├─ /token                         → token   │──▶ auth.docker.io
//!                 │   │   └─ registry API → rewrite → fetch          │──▶ registry-1.docker.io, ghcr.io, ...
//!                 │   │          Location? → re-proxy (bounded hops)  │──▶ blob storage / CDN
//!  ◀──────────────┘◀──│ challenge rewrite, CORS, cache policy         │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use registry_mirror::config::loader::load_config;
use registry_mirror::config::watcher::ConfigWatcher;
use registry_mirror::lifecycle::Shutdown;
use registry_mirror::observability::{logging, metrics};
use registry_mirror::HttpServer;

#[derive(Parser)]
#[command(name = "registry-mirror")]
#[command(about = "Docker Registry v2 pull-through mirror", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload the configuration file when it changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("registry-mirror v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        default_upstream = %config.upstream.default_host,
        max_redirects = config.upstream.max_redirects,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must stay alive for updates to flow.
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        (None, true) => {
            tracing::warn!("--watch given without --config, hot reload disabled");
            (None, mpsc::unbounded_channel().1)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
