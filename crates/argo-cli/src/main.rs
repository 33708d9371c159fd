use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use argo_api::{HttpTransport, TunnelClient};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use rand::RngCore;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::CliConfig;

/// Minimum decoded length of a tunnel secret
const MIN_SECRET_LEN: usize = 32;

/// argo-tunnels - manage Argo tunnels of an account
#[derive(Parser, Debug)]
#[command(name = "argo-tunnels")]
#[command(about = "List, create and delete Argo tunnels", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/argo-tunnels/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Account ID (overrides ARGO_ACCOUNT_ID and config)
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all tunnels
    List,

    /// Show a single tunnel
    Get {
        /// Tunnel ID
        tunnel_id: String,
    },

    /// Create a new tunnel
    Create {
        /// Tunnel name
        name: String,

        /// Base64 tunnel secret (at least 32 bytes); generated when omitted
        #[arg(long)]
        secret: Option<String>,
    },

    /// Delete a tunnel
    Delete {
        /// Tunnel ID
        tunnel_id: String,

        /// Remove stale connections before deleting
        #[arg(long)]
        cleanup: bool,
    },

    /// Remove inactive connections from a tunnel
    Cleanup {
        /// Tunnel ID
        tunnel_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);
    let config = CliConfig::load(&config_path)
        .resolve(cli.account.clone())
        .context("Configuration error")?;

    let mut builder = HttpTransport::builder(config.credentials).base_url(config.base_url);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let transport = builder.build().context("Failed to build HTTP client")?;
    let client = TunnelClient::new(transport);

    // Ctrl+C drops the in-flight request
    tokio::select! {
        result = run(&client, &config.account_id, cli.command, cli.json) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, request cancelled");
            std::process::exit(130);
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("argo_api={}", level).parse()?)
                .add_directive(format!("argo_tunnels={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(
    client: &TunnelClient<HttpTransport>,
    account_id: &str,
    command: Commands,
    json: bool,
) -> Result<()> {
    match command {
        Commands::List => {
            let tunnels = client
                .list(account_id)
                .await
                .context("Failed to list tunnels")?;
            if json {
                println!("{}", output::to_json(&tunnels)?);
            } else {
                println!("{}", output::tunnel_table(&tunnels));
            }
        }

        Commands::Get { tunnel_id } => {
            let tunnel = client
                .get(account_id, &tunnel_id)
                .await
                .with_context(|| format!("Failed to get tunnel {}", tunnel_id))?;
            if json {
                println!("{}", output::to_json(&tunnel)?);
            } else {
                println!("{}", output::tunnel_detail(&tunnel));
            }
        }

        Commands::Create { name, secret } => {
            let secret = match secret {
                Some(secret) => {
                    validate_secret(&secret)?;
                    secret
                }
                None => generate_secret(),
            };

            let mut tunnel = client
                .create(account_id, &name, &secret)
                .await
                .with_context(|| format!("Failed to create tunnel {}", name))?;
            tracing::info!("Created tunnel {} with ID {}", tunnel.name, tunnel.id);

            // The API does not echo the secret; show the one that was sent
            tunnel.secret = secret;
            if json {
                println!("{}", output::to_json(&tunnel)?);
            } else {
                println!("{}", output::tunnel_detail(&tunnel));
                println!("Secret:      {}", tunnel.secret);
            }
        }

        Commands::Delete { tunnel_id, cleanup } => {
            if cleanup {
                client
                    .cleanup_connections(account_id, &tunnel_id)
                    .await
                    .with_context(|| format!("Failed to clean up connections of {}", tunnel_id))?;
            }
            client
                .delete(account_id, &tunnel_id)
                .await
                .with_context(|| format!("Failed to delete tunnel {}", tunnel_id))?;
            tracing::info!("Deleted tunnel {}", tunnel_id);
        }

        Commands::Cleanup { tunnel_id } => {
            client
                .cleanup_connections(account_id, &tunnel_id)
                .await
                .with_context(|| format!("Failed to clean up connections of {}", tunnel_id))?;
            tracing::info!("Cleaned up connections of tunnel {}", tunnel_id);
        }
    }

    Ok(())
}

/// Generate a random base64 tunnel secret
fn generate_secret() -> String {
    let mut bytes = [0u8; MIN_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Check that a user-supplied secret is base64 and long enough
fn validate_secret(secret: &str) -> Result<()> {
    let decoded = BASE64
        .decode(secret)
        .context("Tunnel secret must be base64 encoded")?;
    if decoded.len() < MIN_SECRET_LEN {
        anyhow::bail!(
            "Tunnel secret must decode to at least {} bytes, got {}",
            MIN_SECRET_LEN,
            decoded.len()
        );
    }
    Ok(())
}
