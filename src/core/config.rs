//! Server configuration.
//!
//! Values are resolved in three layers: built-in defaults, an optional TOML
//! file, then command-line flags (some of which also read environment
//! variables through clap).

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::logging::LogFormat;

/// Six hours, the age after which an unrefreshed device is culled.
pub const DEFAULT_MAX_AGE_SECS: u64 = 6 * 60 * 60;

/// The culler runs once per hour by default.
pub const DEFAULT_CULL_INTERVAL_SECS: u64 = 60 * 60;

/// Every interface, so devices on the LAN can reach the service.
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_ROOT: &str = "static";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`ServerConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Command line interface of the `lan-discovery` binary.
#[derive(Debug, Default, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "LAN_DISCOVERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding `assets/` and per-host `<host>/index.html` templates
    #[arg(long)]
    pub static_root: Option<PathBuf>,

    /// Use the left-most `X-Forwarded-For` address as the client address
    #[arg(long, action = clap::ArgAction::Set)]
    pub trust_proxy: Option<bool>,

    /// Seconds after which an unrefreshed device is removed
    #[arg(long)]
    pub max_age_secs: Option<u64>,

    /// Seconds between cull passes
    #[arg(long)]
    pub cull_interval_secs: Option<u64>,

    /// Log line format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_root: PathBuf,
    pub trust_proxy: bool,
    pub max_age_secs: u64,
    pub cull_interval_secs: u64,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_root: PathBuf::from(DEFAULT_STATIC_ROOT),
            trust_proxy: true,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            cull_interval_secs: DEFAULT_CULL_INTERVAL_SECS,
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Resolve defaults, the optional file named by `cli.config`, then flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.merge_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Overlay every flag that was given on the command line.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(root) = &cli.static_root {
            self.static_root = root.clone();
        }
        if let Some(trust) = cli.trust_proxy {
            self.trust_proxy = trust;
        }
        if let Some(secs) = cli.max_age_secs {
            self.max_age_secs = secs;
        }
        if let Some(secs) = cli.cull_interval_secs {
            self.cull_interval_secs = secs;
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        // tokio intervals panic on a zero period
        if self.cull_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cull_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn cull_interval(&self) -> Duration {
        Duration::from_secs(self.cull_interval_secs)
    }

    /// Directory served for requests that match no route.
    pub fn assets_dir(&self) -> PathBuf {
        self.static_root.join("assets")
    }
}
