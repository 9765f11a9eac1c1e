//! Configuration management for the idsync CLI

mod paths;
mod settings;

pub use paths::ConfigPaths;
pub use settings::{Config, Deployment};
