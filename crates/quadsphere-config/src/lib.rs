//! Configuration for quadsphere tools.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line. Every section falls back to defaults for missing fields, so
//! older files keep loading as settings are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, DemoConfig, LodConfig, MeshConfig, SphereConfig};
pub use error::ConfigError;
