use serde::{Deserialize, Serialize};

use super::comparison::ComparisonConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::replay::{ReplayConfig, SelectionPolicy};

/// Maximum EDNS0 UDP payload size representable on the wire.
const MAX_EDNS_SIZE: u32 = 65535;

/// Main configuration structure for rootdiff.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Replay pipeline settings (EDNS size, obfuscation, pool policy)
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Response comparator settings
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shadow server list; empty means the built-in root hints
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

/// One configured shadow server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerEntry {
    pub name: String,
    pub address: String,
}

impl Config {
    /// Load configuration from file or use defaults.
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. rootdiff.toml in current directory
    /// 3. /etc/rootdiff/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("rootdiff.toml").exists() {
            Self::from_file("rootdiff.toml")?
        } else if std::path::Path::new("/etc/rootdiff/config.toml").exists() {
            Self::from_file("/etc/rootdiff/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration.
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if overrides.clear_names {
            self.replay.clear_names = true;
        }
        if let Some(secret) = overrides.secret {
            self.replay.secret = Some(secret);
        }
        if let Some(size) = overrides.edns_size {
            self.replay.edns_size = size;
        }
        if let Some(strategy) = overrides.strategy {
            self.replay.strategy = SelectionPolicy::from_name(&strategy)?;
        }
        if overrides.compare_checking_disabled {
            self.comparison.compare_checking_disabled = true;
        }
        if overrides.dump_exchanges {
            self.replay.dump_exchanges = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        match overrides.servers.len() {
            0 => {}
            1 => {
                return Err(ConfigError::Validation(
                    "at least two shadow server addresses are needed to override the built-in list"
                        .to_string(),
                ))
            }
            _ => {
                self.servers = overrides
                    .servers
                    .into_iter()
                    .map(|address| ServerEntry {
                        name: address.clone(),
                        address,
                    })
                    .collect();
            }
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replay.edns_size > MAX_EDNS_SIZE {
            return Err(ConfigError::Validation(format!(
                "EDNS0 buffer size maximum is {MAX_EDNS_SIZE}"
            )));
        }

        if self.replay.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "exchange timeout cannot be 0".to_string(),
            ));
        }

        if let Some(secret) = &self.replay.secret {
            if secret.len() != 16 || !secret.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::Validation(
                    "obfuscation secret must be exactly 16 hex characters".to_string(),
                ));
            }
        }

        for server in &self.servers {
            if server.address.parse::<std::net::IpAddr>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "unrecognized IP address '{}'",
                    server.address
                )));
            }
        }

        Ok(())
    }
}

/// Command-line overrides for configuration.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub clear_names: bool,
    pub secret: Option<String>,
    pub edns_size: Option<u32>,
    pub strategy: Option<String>,
    pub compare_checking_disabled: bool,
    pub dump_exchanges: bool,
    pub log_level: Option<String>,
    pub servers: Vec<String>,
}
