//! Configuration management for p1d.
//!
//! Loads settings from /etc/p1d/config.toml or uses defaults; CLI
//! flags override both.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

use crate::cli::Cli;

/// Config file path
pub const CONFIG_PATH: &str = "/etc/p1d/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the exposition server binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Seconds between meter read cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Serial device carrying the P1 stream
    #[serde(default = "default_serial_device")]
    pub serial_device: String,

    /// Serial baud rate (the P1 standard is 115200)
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Seconds to wait for one telegram from the source
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// HTTP endpoint serving raw telegrams, used instead of serial
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Serve the builtin sample telegram instead of reading a meter
    #[serde(default)]
    pub mock: bool,

    /// Consecutive failed cycles tolerated before the process exits
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Accept telegrams without verifying the CRC trailer
    #[serde(default)]
    pub skip_checksum: bool,
}

fn default_listen() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_serial_device() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    115_200
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_failure_threshold() -> u32 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            interval_secs: default_interval_secs(),
            serial_device: default_serial_device(),
            baud: default_baud(),
            read_timeout_secs: default_read_timeout_secs(),
            api_endpoint: None,
            mock: false,
            failure_threshold: default_failure_threshold(),
            skip_checksum: false,
        }
    }
}

impl Config {
    /// Load the config. An explicitly given path must exist; the
    /// default path falls back to built-in defaults when absent.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::load_from_path(CONFIG_PATH).unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })),
        }
    }

    /// Load config from specific path
    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Fold CLI flags over the file values. Flags win when given;
    /// switch flags only ever turn features on.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }
        if let Some(interval) = cli.interval_secs {
            self.interval_secs = interval;
        }
        if let Some(device) = &cli.serial_device {
            self.serial_device = device.clone();
        }
        if let Some(endpoint) = &cli.api_endpoint {
            self.api_endpoint = Some(endpoint.clone());
        }
        if let Some(threshold) = cli.failure_threshold {
            self.failure_threshold = threshold;
        }
        if cli.mock {
            self.mock = true;
        }
        if cli.skip_checksum {
            self.skip_checksum = true;
        }
    }

    /// The API endpoint, with empty strings treated as unset.
    pub fn api_endpoint(&self) -> Option<&str> {
        self.api_endpoint.as_deref().filter(|e| !e.is_empty())
    }
}
