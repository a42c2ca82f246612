use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// Settings for the replay pipeline itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// EDNS0 UDP buffer size forced on every replayed query.
    /// Zero leaves the captured query's EDNS untouched.
    #[serde(default = "default_edns_size")]
    pub edns_size: u32,

    /// Replay with the original (clear) question names.
    #[serde(default)]
    pub clear_names: bool,

    /// Obfuscation secret, 16 hex characters. Random when absent.
    #[serde(default)]
    pub secret: Option<String>,

    /// Target ordering policy for the shadow server pool.
    #[serde(default)]
    pub strategy: SelectionPolicy,

    /// Per-attempt DNS exchange timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Print each captured exchange before its replay output.
    #[serde(default)]
    pub dump_exchanges: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            edns_size: default_edns_size(),
            clear_names: false,
            secret: None,
            strategy: SelectionPolicy::default(),
            timeout_ms: default_timeout_ms(),
            dump_exchanges: false,
        }
    }
}

/// How the pool orders targets for each replayed query.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Rotate the first-tried server by one position per query.
    #[default]
    RoundRobin,
    /// Ascending smoothed RTT, untested servers first.
    SrttPreferred,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::SrttPreferred => "srtt-preferred",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "round-robin" => Ok(Self::RoundRobin),
            "srtt-preferred" => Ok(Self::SrttPreferred),
            other => Err(ConfigError::Validation(format!(
                "unknown selection policy '{other}' (expected round-robin or srtt-preferred)"
            ))),
        }
    }
}

fn default_edns_size() -> u32 {
    4093
}

fn default_timeout_ms() -> u64 {
    5000
}
