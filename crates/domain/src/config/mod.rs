mod comparison;
mod errors;
mod logging;
mod replay;
mod root;

pub use comparison::ComparisonConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use replay::{ReplayConfig, SelectionPolicy};
pub use root::{CliOverrides, Config, ServerEntry};
