//! Shared pipeline helpers for CLI commands.
//!
//! Contains what `analyze` and `view` both need: locating and loading
//! `critpath.toml`, turning it into a delay table, picking the circuit files
//! to read, and rendering diagnostics.

use std::path::{Path, PathBuf};

use critpath_config::{find_config, load_config, CritpathConfig};
use critpath_diagnostics::{Diagnostic, DiagnosticRenderer, SourceDb, TerminalRenderer};

use crate::GlobalArgs;

/// The loaded configuration and the directory relative paths resolve against.
#[derive(Debug)]
pub struct Settings {
    /// The parsed configuration, or the defaults if no file was found.
    pub config: CritpathConfig,
    /// Directory holding the configuration file, or the starting directory.
    pub root: PathBuf,
    /// The configuration file that was loaded, if any.
    pub config_path: Option<PathBuf>,
}

/// Loads settings for a CLI invocation.
///
/// An explicit `--config` file must exist. Otherwise the nearest
/// `critpath.toml` above the current directory is used, and a missing file
/// means defaults.
pub fn resolve_settings(global: &GlobalArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => load_settings(Path::new(config_path)),
        None => discover_settings(&std::env::current_dir()?),
    }
}

/// Walks up from `start` for a `critpath.toml`, falling back to defaults.
pub fn discover_settings(start: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    match find_config(start) {
        Some(path) => load_settings(&path),
        None => {
            log::debug!("no config file above {}, using defaults", start.display());
            Ok(Settings {
                config: CritpathConfig::default(),
                root: start.to_path_buf(),
                config_path: None,
            })
        }
    }
}

/// Loads the configuration file at `path`.
pub fn load_settings(path: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    let config = load_config(path).map_err(|e| format!("{}: {e}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok(Settings {
        config,
        root,
        config_path: Some(path.to_path_buf()),
    })
}

/// Picks the circuit files to analyze.
///
/// Files named on the command line win; otherwise the `[batch] circuits`
/// list is used, relative to the configuration directory.
pub fn circuit_files(
    files: &[String],
    settings: &Settings,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if !files.is_empty() {
        return Ok(files.iter().map(PathBuf::from).collect());
    }
    let batch = settings.config.batch.resolve(&settings.root);
    if batch.is_empty() {
        return Err("no circuit files given and no `[batch] circuits` configured".into());
    }
    Ok(batch)
}

/// Whether diagnostics should be shown: always with errors among them,
/// otherwise only when not `--quiet`.
pub fn should_render(diagnostics: &[Diagnostic], quiet: bool) -> bool {
    !quiet || diagnostics.iter().any(|d| d.severity.is_error())
}

/// Renders diagnostics to stderr using the terminal renderer.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(diagnostics: &[Diagnostic], source_db: &SourceDb, color: bool) -> usize {
    let renderer = TerminalRenderer::new(color);
    for diag in diagnostics {
        eprintln!("{}", renderer.render(diag, source_db));
    }
    diagnostics.len()
}
