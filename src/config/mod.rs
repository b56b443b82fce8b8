//! Configuration management for habitkit.
//!
//! This module handles loading and saving configuration from `~/.habitkit/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{Config, LoggingConfig, StorageConfig};
