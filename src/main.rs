//! Lambda gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   LAMBDA GATEWAY                     │
//!                     │                                                      │
//!   Client Request    │  ┌────────┐   ┌─────────┐   ┌──────────┐             │
//!   ──────────────────┼─▶│  http  │──▶│ routing │──▶│ envelope │             │
//!                     │  │ server │   │ + names │   │  encode  │             │
//!                     │  └────────┘   └────┬────┘   └────┬─────┘             │
//!                     │                    │ no match    │                   │
//!                     │                    ▼             ▼                   │
//!                     │              ┌──────────┐   ┌──────────┐             │
//!                     │              │ fallback │   │ invoker  │─────────────┼──▶ Function
//!                     │              │  (404)   │   └────┬─────┘             │
//!                     │              └──────────┘        ▼                   │
//!   Client Response   │                             ┌──────────┐             │
//!   ◀─────────────────┼─────────────────────────────│ envelope │             │
//!                     │                             │  decode  │             │
//!                     │                             └──────────┘             │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lambda_gateway::config::load_config;
use lambda_gateway::lifecycle::{build_gateway, startup::describe_route};
use lambda_gateway::observability::{logging, metrics};
use lambda_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "lambda-gateway")]
#[command(about = "HTTP gateway that routes requests to remote functions", long_about = None)]
struct Cli {
    /// Config file: `.toml`, or directive blocks for any other extension.
    #[arg(short, long)]
    config: PathBuf,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the config, print the route table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lambda-gateway starting");

    let gateway = build_gateway(&config).await?;

    if cli.check {
        for route in gateway.router().routes() {
            println!("{}", describe_route(route));
        }
        return Ok(());
    }

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.listen();
    shutdown.trigger_on_os_signal();

    let server = GatewayServer::new(gateway, &config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
