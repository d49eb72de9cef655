use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use tutor_admin_gateway::config;
use tutor_admin_gateway::routing::matcher::canonical_path;
use tutor_admin_gateway::routing::Upstream;
use tutor_admin_gateway::security::{AccessGate, Session};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Diagnostics for the tutor admin gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query a running gateway's health endpoint
    Health {
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
    /// Show the upstream URL a proxied path resolves to
    Resolve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Path after /api/proxy/, query included (e.g. "users.php?id=3")
        path: String,
    },
    /// Evaluate the access gate for a page navigation
    CheckAccess {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Page path (e.g. "/users")
        path: String,
        /// Value of the role cookie
        #[arg(short, long)]
        role: Option<String>,
        /// Treat the request as carrying an auth token
        #[arg(long)]
        signed_in: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health { url } => {
            let res = reqwest::Client::new()
                .get(format!("{}/api/health", url.trim_end_matches('/')))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Resolve { config, path } => {
            let config = config::load(config.as_deref())?;
            let upstream = Upstream::from_config(&config.upstream)?;
            let (rest, query) = match path.split_once('?') {
                Some((rest, query)) => (rest, Some(query)),
                None => (path.as_str(), None),
            };
            println!("{}", upstream.resolve(rest, query)?);
        }
        Commands::CheckAccess {
            config,
            path,
            role,
            signed_in,
        } => {
            let config = config::load(config.as_deref())?;
            let gate = AccessGate::from_config(&config.gate);
            let session = Session::classify(signed_in.then_some("cli"), role.as_deref());
            let Some(path) = canonical_path(&path) else {
                println!("rejected: invalid path");
                return Ok(());
            };
            let decision = gate.evaluate(&path, &session);
            match gate.redirect_target(&decision) {
                Some(target) => println!("{} -> redirect {}", decision.label(), target),
                None => println!("{}", decision.label()),
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
