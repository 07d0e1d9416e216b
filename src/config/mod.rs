use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::infrastructure::abi::BatchPolicy;

/// Tool configuration, loaded from `config.toml`. Every field has a working
/// default so a missing or partial file is never an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// External ABI grabber command; `{address}` is substituted, or the
    /// address is appended. When unset, ABIs are fetched from Sourcify.
    #[serde(default)]
    pub fetch_command: Option<String>,

    /// Directory where the grabber command drops `<address>.json` files
    #[serde(default)]
    pub abi_cache_dir: Option<PathBuf>,

    /// Chain id for Sourcify lookups
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Batch decode policy
    #[serde(default)]
    pub batch_policy: BatchPolicy,
}

fn default_chain_id() -> u64 {
    1
}

impl Config {
    pub fn abi_cache_dir(&self) -> Option<PathBuf> {
        self.abi_cache_dir.clone().or_else(|| data_dir().map(|dir| dir.join("abis")))
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ABIDEX_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("abidex").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("abidex").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "abidex", "abidex")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("abidex"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("abidex"));
    }
    directories::ProjectDirs::from("io", "abidex", "abidex")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn abi_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("abis.sqlite3"))
}
