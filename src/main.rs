//! Duocache command line
//!
//! Inspect and modify a named cache from the shell. Each invocation starts
//! with a cold memory tier, so reads are served from disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duocache::{Cache, CacheConfig, ExpiresAfter};

#[derive(Debug, Parser)]
#[command(name = "duocache", version, about = "Two-tier key/value cache")]
struct Cli {
    /// Name of the cache to operate on
    #[arg(long, short, default_value = "default", env = "DUOCACHE_NAME")]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value (JSON, or a plain string if it does not parse)
    Set {
        key: String,
        value: String,
        /// Expiry such as 30s, 5m, 1d12h, 3mo or 1y
        #[arg(long, short)]
        expires: Option<ExpiresAfter>,
    },
    /// Remove a key from both tiers
    Remove { key: String },
    /// Remove every entry
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info"; override with RUST_LOG. Logs go to stderr, values to stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duocache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CacheConfig::from_env();
    debug!(?config, "configuration loaded");

    let cache: Cache<Value> = Cache::open_with(&cli.name, config)
        .with_context(|| format!("failed to open cache '{}'", cli.name))?;

    match cli.command {
        Command::Get { key } => match cache.get(&key)?.await {
            Some(hit) => {
                println!("{}", serde_json::to_string_pretty(&hit.value)?);
                eprintln!("(from {:?})", hit.location);
            }
            None => {
                eprintln!("{}: not cached", key);
                std::process::exit(1);
            }
        },
        Command::Set {
            key,
            value,
            expires,
        } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let location = cache.set(&key, value, expires)?.await;
            match expires {
                Some(expires) => println!("stored {} in {:?}, expires after {}", key, location, expires),
                None => println!("stored {} in {:?}", key, location),
            }
        }
        Command::Remove { key } => {
            cache.remove(&key)?.await;
            println!("removed {}", key);
        }
        Command::Clear => {
            cache.clear().await;
            println!("cleared {}", cache.name());
        }
    }

    Ok(())
}
