//! ABI source lookup
//!
//! The registry does not know where ABI documents come from. A fetcher takes
//! a contract address and returns zero or one ABI JSON document; "not found"
//! is `None`, not an error. Two implementations: an external grabber command
//! that drops `<address>.json` files into a cache directory, and the Sourcify
//! contract API over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

/// Resolves a contract address to its ABI JSON document
#[async_trait]
pub trait AbiFetcher: Send + Sync {
    /// Fetch the ABI for `address`. `Ok(None)` means the source has no ABI
    /// for this contract, which is an expected outcome.
    async fn fetch(&self, address: &str) -> Result<Option<serde_json::Value>>;
}

/// Fetcher that shells out to an external ABI grabber.
///
/// The command is a template with `{address}` substituted (or the address
/// appended when no placeholder is present). After it runs, the fetcher reads
/// `<cache_dir>/<address>.json`; a file the command did not produce means the
/// ABI is unavailable.
pub struct CommandAbiFetcher {
    command: String,
    cache_dir: PathBuf,
}

impl CommandAbiFetcher {
    pub fn new(command: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            cache_dir: cache_dir.into(),
        }
    }

    fn abi_file(&self, address: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", address.to_lowercase()))
    }

    fn command_for(&self, address: &str) -> String {
        if self.command.contains("{address}") {
            self.command.replace("{address}", address)
        } else {
            format!("{} {}", self.command, address)
        }
    }
}

#[async_trait]
impl AbiFetcher for CommandAbiFetcher {
    async fn fetch(&self, address: &str) -> Result<Option<serde_json::Value>> {
        let path = self.abi_file(address);

        if !path.exists() {
            let command = self.command_for(address);
            debug!(%address, command, "running ABI grabber");
            let status = Command::new("sh")
                .arg("-c")
                .arg(&command)
                .status()
                .await
                .with_context(|| format!("spawn ABI grabber for {address}"))?;
            if !status.success() {
                warn!(%address, %status, "ABI grabber exited non-zero");
            }
        }

        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(document))
    }
}

/// Sourcify API response structure
#[derive(Debug, Deserialize)]
struct SourcifyResponse {
    #[serde(default)]
    abi: Option<serde_json::Value>,
}

/// Fetcher backed by the Sourcify contract API
pub struct SourcifyFetcher {
    http: reqwest::Client,
    chain_id: u64,
}

impl SourcifyFetcher {
    pub fn new(chain_id: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, chain_id })
    }
}

#[async_trait]
impl AbiFetcher for SourcifyFetcher {
    async fn fetch(&self, address: &str) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "https://sourcify.dev/server/v2/contract/{}/{}?fields=abi",
            self.chain_id,
            address.to_lowercase()
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("query Sourcify API")?;

        if !response.status().is_success() {
            debug!(%address, status = %response.status(), "Sourcify has no ABI");
            return Ok(None);
        }

        let data: SourcifyResponse = response
            .json()
            .await
            .context("parse Sourcify response")?;
        Ok(data.abi)
    }
}
