//! CopyBridge CLI - runs the clipboard server and related utilities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

use copybridge_crypto::hash_password;
use copybridge_server::{serve, shutdown_signal, ServerConfig, StoreConfig};

const DEFAULT_DB_PATH: &str = "copybridge.db";

#[derive(Parser)]
#[command(name = "copybridge")]
#[command(about = "CopyBridge - Password-protected clipboard server")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// JSON configuration file. Flags override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on.
        #[arg(short, long, env = "LISTEN_ADDR")]
        listen: Option<SocketAddr>,

        /// Port to listen on, keeping the configured host.
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Store backend: "memory" or "sqlite".
        #[arg(short, long, env = "COPYBRIDGE_STORE")]
        store: Option<String>,

        /// Database path for the SQLite store.
        #[arg(short, long, env = "DB_URL")]
        db: Option<String>,
    },

    /// Hash a password with the configured credential cost and print it.
    HashPassword {
        /// JSON configuration file supplying the credential cost.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve {
            config,
            listen,
            port,
            store,
            db,
        } => cmd_serve(config, listen, port, store, db).await,

        Commands::HashPassword { config } => cmd_hash_password(config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

/// Pick the store from flags, falling back to the config file.
fn resolve_store(
    configured: StoreConfig,
    kind: Option<String>,
    db: Option<String>,
) -> StoreConfig {
    match (kind.as_deref(), db) {
        (Some("memory"), _) => StoreConfig::memory(),
        (Some("sqlite"), db) => StoreConfig::sqlite(db.unwrap_or_else(|| DEFAULT_DB_PATH.into())),
        (Some(other), db) => StoreConfig {
            kind: other.to_string(),
            config: match db {
                Some(path) => serde_json::json!({ "path": path }),
                None => serde_json::Value::Null,
            },
        },
        (None, Some(db)) => StoreConfig::sqlite(db),
        (None, None) => configured,
    }
}

/// Run the server until Ctrl+C.
async fn cmd_serve(
    config: Option<PathBuf>,
    listen: Option<SocketAddr>,
    port: Option<u16>,
    store: Option<String>,
    db: Option<String>,
) -> Result<()> {
    let mut config = load_config(config)?;

    if let Some(addr) = listen {
        config.listen_addr = addr;
    }
    if let Some(port) = port {
        config.listen_addr.set_port(port);
    }
    config.store = resolve_store(config.store, store, db);

    info!(addr = %config.listen_addr, store = %config.store.kind, "Starting CopyBridge");

    serve(config, shutdown_signal())
        .await
        .context("Server failed")
}

/// Prompt for a password and print its credential hash.
fn cmd_hash_password(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;

    let password = Zeroizing::new(
        rpassword::prompt_password("Enter password: ").context("Failed to read password")?,
    );
    let confirm = Zeroizing::new(
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?,
    );

    if *password != *confirm {
        anyhow::bail!("Passwords do not match");
    }
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = hash_password(password.as_bytes(), &config.credential_cost)
        .context("Failed to hash password")?;
    println!("{}", hash.as_str());

    Ok(())
}
