use crate::error::{Error, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

const CONFIG_PATH_KEY: &str = "QWALLET_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "qwallet.toml";

const NODE_ADDRESS_KEY: &str = "QWALLET_NODE_ADDRESS";
const NODE_PORT_KEY: &str = "QWALLET_NODE_PORT";
const IO_TIMEOUT_KEY: &str = "QWALLET_IO_TIMEOUT_MS";

/// Client settings. Missing keys in a file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub node_address: String,
    pub node_port: u16,
    /// Connect timeout, and the silence that ends a receive
    pub io_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            node_address: String::from("127.0.0.1"),
            node_port: 21841,
            io_timeout_ms: 1000,
        }
    }
}

impl Settings {
    /// Load from the config file if there is one, then apply `QWALLET_*`
    /// environment overrides
    pub fn load() -> Result<Settings> {
        let path = Settings::file_path();
        let mut settings = if path.exists() {
            Settings::from_file(&path)?
        } else {
            Settings::default()
        };
        settings.apply_overrides(|key| env::var(key).ok());
        Ok(settings)
    }

    /// `$QWALLET_CONFIG`, or `qwallet.toml` in the working directory
    pub fn file_path() -> PathBuf {
        env::var(CONFIG_PATH_KEY)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", path.display())))?;
        let settings = toml::from_str(&text)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Values that are set but do not parse are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(NODE_ADDRESS_KEY) {
            self.node_address = v;
        }
        if let Some(p) = lookup(NODE_PORT_KEY).and_then(|v| v.parse().ok()) {
            self.node_port = p;
        }
        if let Some(ms) = lookup(IO_TIMEOUT_KEY).and_then(|v| v.parse().ok()) {
            self.io_timeout_ms = ms;
        }
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

/// Process wide settings for the front end
pub struct Config {
    inner: RwLock<Settings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Falls back to defaults when the config file cannot be read
    pub fn new() -> Config {
        let settings = Settings::load().unwrap_or_else(|e| {
            warn!("Ignoring config file: {e}");
            let mut settings = Settings::default();
            settings.apply_overrides(|key| env::var(key).ok());
            settings
        });
        Config::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Config {
        Config {
            inner: RwLock::new(settings),
        }
    }

    pub fn settings(&self) -> Settings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current settings with the contents of `path`
    pub fn load_from_path(&self, path: &Path) -> Result<()> {
        let settings = Settings::from_file(path)?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = settings;
        Ok(())
    }

    pub fn get_node_address(&self) -> String {
        self.settings().node_address
    }

    pub fn set_node_address(&self, address: String) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .node_address = address;
    }

    pub fn get_node_port(&self) -> u16 {
        self.settings().node_port
    }

    pub fn set_node_port(&self, port: u16) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .node_port = port;
    }
}
