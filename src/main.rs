use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use callgate::config::{self, Config, EndpointConfig, Settings};
use callgate::infrastructure::ethereum::{create_provider, EthereumProvider};
use callgate::infrastructure::http;
use callgate::CallService;

#[derive(Debug, Parser)]
#[command(
    name = "callgate",
    version,
    about = "callgate: evaluate read-only contract calls over HTTP"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (default ws://localhost:8545)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// Address to serve HTTP on (default 0.0.0.0:8080)
    #[arg(long)]
    listen: Option<String>,

    /// Sender address placed in every call (default zero address)
    #[arg(long)]
    from: Option<String>,

    /// Config file (default $XDG_CONFIG_HOME/callgate/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Config {
        Config {
            endpoint: EndpointConfig {
                rpc: self.rpc.clone(),
                ws: self.ws.clone(),
                ipc: self
                    .ipc
                    .as_ref()
                    .map(|path| path.to_string_lossy().into_owned()),
            },
            listen: self.listen.clone(),
            from: self.from.clone(),
            log: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let file = config::load(args.config.as_deref())?;
    let settings = Settings::resolve(&args.overrides(), &file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log)),
        )
        .init();

    let endpoint = settings.provider.display();
    let provider: Arc<dyn EthereumProvider> = create_provider(settings.provider)
        .await
        .with_context(|| format!("Failed to connect to {endpoint}"))?
        .into();

    // Informational only; some nodes do not answer web3_clientVersion
    match provider.client_version().await {
        Ok(version) => tracing::info!(%endpoint, %version, "connected"),
        Err(err) => tracing::warn!(%endpoint, error = %err, "client version unavailable"),
    }

    let service = CallService::new(provider).with_from(settings.from);
    let listener = TcpListener::bind(settings.listen)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen))?;

    http::serve(listener, service, shutdown_signal()).await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
