pub mod config;
pub mod errors;
pub mod server_target;

pub use config::{
    CliOverrides, ComparisonConfig, Config, ConfigError, LoggingConfig, ReplayConfig,
    SelectionPolicy, ServerEntry,
};
pub use errors::ReplayError;
pub use server_target::{default_shadow_servers, ServerTarget};
