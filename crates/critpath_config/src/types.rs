//! Configuration types deserialized from `critpath.toml`.

use critpath_common::Frequency;
use critpath_timing::DelayTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The top-level configuration parsed from `critpath.toml`.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CritpathConfig {
    /// Component delay overrides, keyed by component type keyword
    /// (e.g. `ADD = 1.5`, `XOR = 0.4`). Entries extend the default table.
    #[serde(default)]
    pub delays: BTreeMap<String, f64>,
    /// Report and unit settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Circuits analyzed by a batch run without explicit files.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl From<&CritpathConfig> for DelayTable {
    /// The default table extended by the `[delays]` section.
    fn from(config: &CritpathConfig) -> Self {
        DelayTable::with_overrides(config.delays.iter().map(|(k, v)| (k, *v)))
    }
}

/// How delays are labelled and converted to physical time.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Label printed after delay values.
    #[serde(default = "default_time_unit")]
    pub time_unit: String,
    /// Length of one delay unit in nanoseconds. Enables the Fmax line of
    /// the report.
    #[serde(default)]
    pub unit_ns: Option<f64>,
    /// Target clock frequency (e.g. `"100MHz"`), checked against the
    /// critical path. Requires `unit_ns`.
    #[serde(default)]
    pub target_frequency: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_unit: default_time_unit(),
            unit_ns: None,
            target_frequency: None,
        }
    }
}

impl AnalysisConfig {
    /// Returns the parsed target frequency, if one is configured and valid.
    pub fn target(&self) -> Option<Frequency> {
        self.target_frequency.as_deref()?.parse().ok()
    }
}

fn default_time_unit() -> String {
    "time units".to_string()
}

/// The batch circuit list.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Circuit description paths, relative to the configuration file.
    #[serde(default)]
    pub circuits: Vec<String>,
}

impl BatchConfig {
    /// Resolves the circuit paths against `root`, the directory holding the
    /// configuration file. Absolute paths are kept as written.
    pub fn resolve(&self, root: &Path) -> Vec<PathBuf> {
        self.circuits.iter().map(|c| root.join(c)).collect()
    }
}
