use serde::{Deserialize, Serialize};

/// Knobs for the response comparator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ComparisonConfig {
    /// Also compare the CD header bit. Off by default: recursive captures
    /// routinely disagree on it for reasons unrelated to the shadow system.
    #[serde(default)]
    pub compare_checking_disabled: bool,
}
