// SPDX-License-Identifier: MIT
//
// QRNG Client: Quantum Random Numbers over HTTP
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! qrng - command-line access to the ANU quantum random number service
//!
//! Configuration comes from `QRNG_*` environment variables or a config file,
//! with command-line flags taking precedence. Supplying an API key switches to
//! the authenticated endpoint.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qrng_client::{
    config::{AUTHENTICATED_ENDPOINT, LEGACY_ENDPOINT},
    AuthMode, ClientConfig, HexType, QrngClient,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "qrng")]
#[command(about = "Fetch quantum random numbers from the ANU QRNG service", long_about = None)]
struct Args {
    /// Configuration file (YAML, TOML or JSON); defaults to QRNG_* environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key for the authenticated endpoint
    #[arg(long)]
    api_key: Option<String>,

    /// Override the endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, default_value = "false")]
    json_logs: bool,

    /// Print request metrics to stderr when done
    #[arg(long, default_value = "false")]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Random bits (1-8192)
    Bits { count: usize },

    /// Random bytes (1-1024)
    Bytes { count: usize },

    /// Random 16-bit words (1-1024)
    Uint16 { count: usize },

    /// Random hex blocks
    Hex {
        count: usize,

        /// Bytes per block for hex8 (1-10)
        #[arg(short, long, default_value = "1")]
        block_size: usize,

        /// hex8 or hex16
        #[arg(short = 't', long, default_value = "hex8")]
        hex_type: HexType,
    },

    /// Uniform integer in [min, max]
    Number {
        #[arg(allow_negative_numbers = true)]
        min: i64,

        #[arg(allow_negative_numbers = true)]
        max: i64,
    },

    /// Exercise bits, bytes and a 1-100 number on the configured client
    Demo,
}

fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::from_env().context("Failed to load config from environment")?,
    };

    if let Some(key) = &args.api_key {
        config = apply_api_key(config, key);
    }

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }

    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

/// Switch to key authentication, moving off the legacy endpoint unless another
/// endpoint was configured.
fn apply_api_key(mut config: ClientConfig, key: &str) -> ClientConfig {
    if config.endpoint == LEGACY_ENDPOINT {
        config.endpoint = AUTHENTICATED_ENDPOINT.to_string();
    }
    config.auth = AuthMode::ApiKey(key.to_string());
    config
}

async fn run_demo(client: &QrngClient) {
    let name = if client.config().auth.requires_api_key() {
        "Authenticated Client"
    } else {
        "Legacy Client"
    };
    println!("--- Testing {} ---", name);

    match client.get_random_bits(8).await {
        Ok(bits) => println!("[{}] Random bits: {:?}", name, bits),
        Err(e) => error!("[{}] Error getting bits: {}", name, e),
    }

    match client.get_random_uint8(3).await {
        Ok(bytes) => println!("[{}] Random bytes: {:?}", name, bytes),
        Err(e) => error!("[{}] Error getting bytes: {}", name, e),
    }

    match client.get_random_number(1, 100).await {
        Ok(n) => println!("[{}] Random number: {}", name, n),
        Err(e) => error!("[{}] Error getting number: {}", name, e),
    }
}

async fn run(client: &QrngClient, command: &Command) -> Result<()> {
    match command {
        Command::Bits { count } => {
            let bits = client.get_random_bits(*count).await?;
            let line: String = bits.iter().map(|b| char::from(b'0' + b)).collect();
            println!("{}", line);
        }
        Command::Bytes { count } => {
            let bytes = client.get_random_uint8(*count).await?;
            println!("{}", join(&bytes));
        }
        Command::Uint16 { count } => {
            let words = client.get_random_uint16(*count).await?;
            println!("{}", join(&words));
        }
        Command::Hex {
            count,
            block_size,
            hex_type,
        } => {
            for block in client.get_random_hex(*count, *block_size, *hex_type).await? {
                println!("{}", block);
            }
        }
        Command::Number { min, max } => {
            println!("{}", client.get_random_number(*min, *max).await?);
        }
        Command::Demo => run_demo(client).await,
    }
    Ok(())
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = build_config(&args)?;
    info!(
        "qrng v{} using {} (timeout {:?})",
        qrng_client::VERSION,
        config.endpoint,
        config.timeout
    );

    let client = QrngClient::from_config(config).context("Failed to create client")?;
    let result = run(&client, &args.command).await;

    if args.stats {
        eprintln!("{}", serde_json::to_string_pretty(&client.metrics().snapshot())?);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_with_negative_bounds() {
        let args = Args::try_parse_from(["qrng", "number", "-10", "10"]).unwrap();
        assert!(matches!(args.command, Command::Number { min: -10, max: 10 }));
    }

    #[test]
    fn test_parse_hex_type() {
        let args = Args::try_parse_from(["qrng", "hex", "4", "-t", "hex16"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Hex {
                count: 4,
                block_size: 1,
                hex_type: HexType::Hex16
            }
        ));

        assert!(Args::try_parse_from(["qrng", "hex", "4", "-t", "hex32"]).is_err());
    }

    #[test]
    fn test_api_key_switches_endpoint() {
        let config = apply_api_key(ClientConfig::legacy(), "k");
        assert_eq!(config.auth, AuthMode::ApiKey("k".to_string()));
        assert_eq!(config.endpoint, AUTHENTICATED_ENDPOINT);

        let custom = ClientConfig::legacy().with_endpoint("http://localhost:9000/");
        let config = apply_api_key(custom, "k");
        assert_eq!(config.endpoint, "http://localhost:9000/");
    }

    #[test]
    fn test_missing_config_file() {
        let args =
            Args::try_parse_from(["qrng", "--config", "/nonexistent.yaml", "bits", "8"]).unwrap();
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&[1u8, 2, 3]), "1 2 3");
    }
}
