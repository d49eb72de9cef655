//! Tutor admin gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │               ADMIN GATEWAY                  │
//!   Browser            │                                              │
//!   ───────────────────┼─▶ request id ─▶ access gate ─┬─▶ static pages│
//!                      │                (cookies)    │               │
//!                      │                             ├─▶ /api/auth/* │
//!                      │                             │               │
//!                      │                             └─▶ /api/proxy/*┼──▶ PHP service
//!                      │                                  body kind  │    (API_BASE_URL)
//!   ◀──────────────────┼── JSON relay / error envelope ◀──────────── │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use tutor_admin_gateway::config;
use tutor_admin_gateway::lifecycle::{signals, startup, Shutdown};
use tutor_admin_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "tutor-admin-gateway")]
#[command(about = "Same-origin proxy and access gate for the tutoring admin dashboard", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        "tutor-admin-gateway starting"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    startup::launch(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
