//! Loading and validation of `critpath.toml`.
//!
//! The configuration file overrides the component delay table, sets how
//! delays are labelled and converted to clock frequencies, and lists the
//! circuits a batch run analyzes when none are given on the command line.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
