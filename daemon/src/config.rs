//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use election_ledger::{AccessTable, Role};
use election_types::Principal;
use election_utils::LogFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("at least one admin is required")]
    NoAdmin,
}

/// Configuration for one election.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; every field
/// has a default so an empty file is valid apart from the admin list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Identity of the ledger; receives the token minter capability.
    #[serde(default = "default_ledger_id")]
    pub ledger_id: Principal,

    /// Administrators. The first one also owns the participation token issuer.
    #[serde(default)]
    pub admins: Vec<Principal>,

    /// Principals allowed to fund candidates.
    #[serde(default)]
    pub funders: Vec<Principal>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where the election state is loaded from and saved to between runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// Initial script clock in unix seconds; wall-clock time when unset.
    /// The vote phase cannot open while the clock still reads 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
}

fn default_ledger_id() -> Principal {
    Principal::repeat_byte(0x1e)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The issuer owner and initial role table.
    pub fn access_table(&self) -> Result<(Principal, AccessTable), ConfigError> {
        let owner = *self.admins.first().ok_or(ConfigError::NoAdmin)?;
        let mut table = AccessTable::new();
        for admin in &self.admins {
            table.grant(Role::Admin, *admin);
        }
        for funder in &self.funders {
            table.grant(Role::Funder, *funder);
        }
        Ok((owner, table))
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            ledger_id: default_ledger_id(),
            admins: Vec::new(),
            funders: Vec::new(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            snapshot_path: None,
            start_time: None,
        }
    }
}
