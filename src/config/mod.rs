//! Configuration management
//!
//! Node address, socket timeout and the transaction and search defaults,
//! resolved from the environment, then a toml file, then built-in defaults.

pub mod settings;

pub use settings::{Config, Settings, GLOBAL_CONFIG};
