// fuego-wallet/src/wallet/config.rs
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fuego_core::network::Network;
use fuego_core::utils::{read_json_or_default, write_json};
use fuego_core::{WalletError, WalletResult};
use log::{debug, info};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wallet::paths::FuegoPaths;

pub const KEY_RPC_URL: &str = "rpcUrl";
pub const KEY_NETWORK: &str = "network";
pub const KEY_EXECUTOR: &str = "executor";
pub const KEY_SERVER_URL: &str = "serverUrl";
pub const KEY_SCRIPT_RUNTIME: &str = "scriptRuntime";

/// Version-tracking sub-object keys.
pub const TOOL_CLI: &str = "fuego-cli";
pub const TOOL_PROJECT: &str = "fuego";

pub type ConfigMap = Map<String, Value>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolVersion {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<PathBuf>,
}

/// Free-form key/value settings in `config.json`.
///
/// Every write re-reads the whole file, merges, and writes it back; keys it
/// does not touch are preserved.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(paths: &FuegoPaths) -> Self {
        ConfigStore {
            path: paths.config_file(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn list(&self) -> WalletResult<ConfigMap> {
        read_json_or_default(&self.path)
    }

    pub fn get(&self, key: &str) -> WalletResult<Option<Value>> {
        Ok(self.list()?.remove(key))
    }

    /// String values as-is; anything else rendered as compact JSON.
    pub fn get_string(&self, key: &str) -> WalletResult<Option<String>> {
        Ok(self.get(key)?.map(|value| display_value(&value)))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> WalletResult<()> {
        self.update(|config| {
            config.insert(key.to_string(), value.into());
        })
    }

    /// Sets several keys in a single read-merge-write.
    pub fn set_many<I, K, V>(&self, entries: I) -> WalletResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.update(|config| {
            for (key, value) in entries {
                config.insert(key.into(), value.into());
            }
        })
    }

    /// Fills in keys that are absent; existing values win. Returns the keys
    /// that were written.
    pub fn apply_defaults(&self, defaults: &[(&str, &str)]) -> WalletResult<Vec<String>> {
        let mut config = self.list()?;
        let mut written = Vec::new();
        for (key, value) in defaults {
            if !config.contains_key(*key) {
                config.insert(key.to_string(), Value::String(value.to_string()));
                written.push(key.to_string());
            }
        }
        if !written.is_empty() {
            write_json(&self.path, &config)?;
            info!("Applied config defaults: {:?}", written);
        }
        Ok(written)
    }

    fn update(&self, apply: impl FnOnce(&mut ConfigMap)) -> WalletResult<()> {
        let mut config = self.list()?;
        apply(&mut config);
        write_json(&self.path, &config)?;
        debug!("Config saved to {:?}", self.path);
        Ok(())
    }

    pub fn network(&self) -> WalletResult<Network> {
        match self.get_string(KEY_NETWORK)? {
            Some(network) => network.parse(),
            None => Ok(Network::default()),
        }
    }

    /// Configured RPC URL, falling back to the public endpoint of the
    /// configured network.
    pub fn rpc_url(&self) -> WalletResult<String> {
        match self.get_string(KEY_RPC_URL)? {
            Some(url) => Ok(url),
            None => Ok(self.network()?.default_rpc_url().to_string()),
        }
    }

    pub fn tool_version(&self, tool: &str) -> WalletResult<Option<ToolVersion>> {
        match self.get(tool)? {
            Some(value @ Value::Object(_)) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| WalletError::json(&self.path, e)),
            _ => Ok(None),
        }
    }

    /// Records a tool version stamped now. An existing install path is kept
    /// when `install_path` is `None`.
    pub fn set_tool_version(
        &self,
        tool: &str,
        version: &str,
        install_path: Option<PathBuf>,
    ) -> WalletResult<ToolVersion> {
        let previous_path = self.tool_version(tool)?.and_then(|v| v.install_path);
        let record = ToolVersion {
            version: version.to_string(),
            last_updated: Utc::now(),
            install_path: install_path.or(previous_path),
        };
        let value = serde_json::to_value(&record).map_err(|e| WalletError::json(&self.path, e))?;
        self.set(tool, value)?;
        Ok(record)
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Splits `key=value` at the first `=`; the value may itself contain `=`.
pub fn parse_assignment(assignment: &str) -> WalletResult<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(WalletError::validation(
            "Usage: fuego config set key=value".to_string(),
        )),
    }
}

/// Checks that `url` parses as an absolute http(s) URL with a host.
pub fn validate_rpc_url(url: &str) -> WalletResult<Url> {
    let invalid = || WalletError::validation("Invalid URL. Please provide a valid RPC endpoint.");
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(parsed)
}
