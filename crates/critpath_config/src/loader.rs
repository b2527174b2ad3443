//! Configuration file discovery, loading, and validation.

use crate::error::ConfigError;
use crate::types::CritpathConfig;
use critpath_common::Frequency;
use critpath_timing::ComponentType;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The configuration file name searched for by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "critpath.toml";

/// Walks up from `start` looking for a `critpath.toml`.
///
/// Returns the path of the first one found, or `None` at the filesystem root.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Reads, parses, and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<CritpathConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<CritpathConfig, ConfigError> {
    let config: CritpathConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks delay values, the time unit, and the target frequency.
fn validate_config(config: &CritpathConfig) -> Result<(), ConfigError> {
    let mut seen: BTreeMap<ComponentType, &str> = BTreeMap::new();
    for (name, delay) in &config.delays {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "delay table contains an empty component type".to_string(),
            ));
        }
        if !delay.is_finite() || *delay < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "delay for `{name}` must be a finite non-negative number, got {delay}"
            )));
        }
        let component = ComponentType::parse(name);
        // Arrival is measured at the OUTPUT, so its own delay never counts.
        if component == ComponentType::Output && *delay != 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "delay for `{name}` must be 0, OUTPUT delay is not part of any path"
            )));
        }
        if let Some(previous) = seen.insert(component, name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "delays `{previous}` and `{name}` name the same component type"
            )));
        }
    }

    if let Some(unit_ns) = config.analysis.unit_ns {
        if !unit_ns.is_finite() || unit_ns <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "analysis.unit_ns must be positive, got {unit_ns}"
            )));
        }
    }

    if let Some(target) = &config.analysis.target_frequency {
        target
            .parse::<Frequency>()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        if config.analysis.unit_ns.is_none() {
            return Err(ConfigError::ValidationError(
                "analysis.target_frequency requires analysis.unit_ns".to_string(),
            ));
        }
    }

    Ok(())
}
