use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use abidex::config;
use abidex::domain::abi::{compute_selector, SharedRegistry};
use abidex::infrastructure::abi::{
    AbiFetcher, BatchPolicy, CallDecoder, CommandAbiFetcher, DecodeCoordinator, SourcifyFetcher,
};
use abidex::store::AbiCache;

#[derive(Debug, Parser)]
#[command(
    name = "abidex",
    version,
    about = "Abidex: register contract ABIs and decode call inputs against them"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch a contract's ABI and store it in the local cache
    AddAbi {
        /// Contract address to resolve
        address: String,

        /// Read the ABI from a local JSON file instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Decode one or a comma-separated batch of call-input hex strings
    Decode {
        /// Call inputs, comma-separated (e.g. "0xa9059cbb...,0x095ea7b3...")
        inputs: String,

        /// ABI JSON file(s) to register before decoding
        #[arg(long = "abi")]
        abi_files: Vec<PathBuf>,

        /// Contract address(es) whose ABIs to load (cache first, then fetch)
        #[arg(long)]
        address: Vec<String>,

        /// Report a batch-level "no ABI" result when the first input is
        /// unresolvable, instead of one result per input
        #[arg(long)]
        gate_on_first: bool,
    },

    /// Print the 4-byte selector for a canonical function signature
    Selector {
        /// Signature, e.g. "transfer(address,uint256)"
        signature: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load();

    match args.command {
        Command::AddAbi { address, file } => add_abi(&config, &address, file).await,
        Command::Decode {
            inputs,
            abi_files,
            address,
            gate_on_first,
        } => decode(&config, &inputs, &abi_files, &address, gate_on_first).await,
        Command::Selector { signature } => {
            println!("0x{}", hex::encode(compute_selector(&signature)));
            Ok(())
        }
    }
}

async fn add_abi(config: &config::Config, address: &str, file: Option<PathBuf>) -> Result<()> {
    let document = match file {
        Some(path) => {
            let content =
                fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            let document: serde_json::Value =
                serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
            Some(document)
        }
        None => build_fetcher(config)?.fetch(address).await?,
    };

    match document {
        Some(document) => {
            let cache = open_cache()?;
            cache.save_abi(address, &document.to_string())?;
            info!(%address, "ABI cached");
            println!("{}", serde_json::json!({ "success": true }));
        }
        None => {
            println!("{}", serde_json::json!({ "success": false }));
        }
    }
    Ok(())
}

async fn decode(
    config: &config::Config,
    inputs: &str,
    abi_files: &[PathBuf],
    addresses: &[String],
    gate_on_first: bool,
) -> Result<()> {
    let registry = SharedRegistry::new();

    for path in abi_files {
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let document: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
        let added = registry.add_abi(&abi_array(&document));
        debug!(path = %path.display(), added, "registered ABI file");
    }

    if !addresses.is_empty() {
        let cache = open_cache()?;
        let fetcher = build_fetcher(config)?;
        for address in addresses {
            let document = match cache.get_abi(address)? {
                Some(cached) => Some(serde_json::from_str(&cached.abi_json)
                    .with_context(|| format!("parse cached ABI for {address}"))?),
                None => {
                    let fetched = fetcher.fetch(address).await?;
                    if let Some(document) = &fetched {
                        cache.save_abi(address, &document.to_string())?;
                    }
                    fetched
                }
            };
            match document {
                Some(document) => {
                    let added = registry.add_abi(&abi_array(&document));
                    debug!(%address, added, "registered contract ABI");
                }
                None => info!(%address, "no ABI available"),
            }
        }
    }

    let policy = if gate_on_first {
        BatchPolicy::GateOnFirst
    } else {
        config.batch_policy
    };
    let coordinator = DecodeCoordinator::with_policy(CallDecoder::new(registry), policy);

    let outcome = coordinator.decode_batch(inputs.split(',').filter(|s| !s.trim().is_empty()));
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Accept both a bare entry array and the `{"abi": [...]}` wrapper emitted by
/// build artifacts and explorer APIs.
fn abi_array(document: &serde_json::Value) -> serde_json::Value {
    if document.is_array() {
        document.clone()
    } else if let Some(abi) = document.get("abi") {
        abi.clone()
    } else {
        document.clone()
    }
}

fn build_fetcher(config: &config::Config) -> Result<Box<dyn AbiFetcher>> {
    if let Some(command) = &config.fetch_command {
        let cache_dir = config
            .abi_cache_dir()
            .context("no ABI cache directory available for the fetch command")?;
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("create {}", cache_dir.display()))?;
        Ok(Box::new(CommandAbiFetcher::new(command.clone(), cache_dir)))
    } else {
        Ok(Box::new(SourcifyFetcher::new(config.chain_id)?))
    }
}

fn open_cache() -> Result<AbiCache> {
    let path = config::abi_db_path().context("no data directory available for the ABI cache")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    AbiCache::open(&path)
}
