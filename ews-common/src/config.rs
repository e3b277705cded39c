//! Configuration loading and root folder resolution
//!
//! Resolution order for every tier-resolved value:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: the service logs a
//! warning and starts with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "EWS_ROOT_FOLDER";
/// Environment variable overriding the TOML config path
pub const ENV_CONFIG_PATH: &str = "EWS_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "ews.db";
/// Default HTTP port for ews-admin
pub const DEFAULT_PORT: u16 = 5780;
/// Default bind address (local operator console)
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
/// Hubtel SMS API
pub const DEFAULT_GATEWAY_URL: &str = "https://sms.hubtel.com";
/// Outbound gateway request timeout
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Contents of `ews.toml`
///
/// Every field is optional so that a partial file still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[gateway]` section
///
/// Credentials here are the lowest-priority tier; the settings table and
/// environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub sender_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl GatewayConfig {
    /// Gateway base URL without trailing slash
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_GATEWAY_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS))
    }
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub config_path: Option<PathBuf>,
    pub port: u16,
    pub bind_address: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            config_path: dirs::config_dir().map(|d| d.join("ews").join("ews.toml")),
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/ews (or /var/lib/ews for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("ews"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ews"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("ews"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ews"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("ews"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ews"))
    } else {
        PathBuf::from("./ews_data")
    }
}

/// Pick the TOML config path: CLI, then `EWS_CONFIG`, then the platform default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    CompiledDefaults::for_current_platform().config_path
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Outcome of looking for the TOML config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Loaded(PathBuf),
    NotFound(PathBuf),
    /// No CLI/env path and no platform config directory
    NoLocation,
    /// File exists but could not be read or parsed; defaults are in use
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    /// Report the outcome through `tracing`
    ///
    /// Kept separate from loading because the TOML file decides the log
    /// level, so the subscriber is installed in between.
    pub fn log(&self) {
        match self {
            ConfigSource::Loaded(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::NotFound(path) => {
                info!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::NoLocation => {
                warn!("No config file location available, using defaults")
            }
            ConfigSource::Invalid { error, .. } => {
                warn!("{} (continuing with defaults)", error)
            }
        }
    }
}

/// Load the TOML config, falling back to defaults on any problem
///
/// Returns how the file was found alongside the config; nothing is logged.
pub fn load_toml_config_with_source(path: Option<&Path>) -> (TomlConfig, ConfigSource) {
    let Some(path) = path else {
        return (TomlConfig::default(), ConfigSource::NoLocation);
    };

    if !path.exists() {
        return (TomlConfig::default(), ConfigSource::NotFound(path.to_path_buf()));
    }

    match load_toml_config(path) {
        Ok(config) => (config, ConfigSource::Loaded(path.to_path_buf())),
        Err(e) => (
            TomlConfig::default(),
            ConfigSource::Invalid {
                path: path.to_path_buf(),
                error: e.to_string(),
            },
        ),
    }
}

/// Load the TOML config, falling back to defaults, and log the outcome
pub fn load_toml_config_or_default(path: Option<&Path>) -> TomlConfig {
    let (config, source) = load_toml_config_with_source(path);
    source.log();
    config
}

/// Resolve the root folder: CLI, then `EWS_ROOT_FOLDER`, then TOML, then default
pub struct RootFolderResolver<'a> {
    cli_arg: Option<&'a Path>,
    toml: &'a TomlConfig,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new(cli_arg: Option<&'a Path>, toml: &'a TomlConfig) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = self.cli_arg {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml.root_folder {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder and locates files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_parses_with_defaults() {
        let config: TomlConfig = toml::from_str("port = 9000\n").unwrap();
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.logging.level, "info");
        assert!(config.gateway.client_id.is_none());
    }

    #[test]
    fn test_gateway_base_url_trims_trailing_slash() {
        let gateway = GatewayConfig {
            base_url: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        };
        assert_eq!(gateway.base_url(), "http://127.0.0.1:9999");
        assert_eq!(GatewayConfig::default().base_url(), DEFAULT_GATEWAY_URL);
    }

    #[test]
    fn test_gateway_timeout_default() {
        assert_eq!(
            GatewayConfig::default().timeout(),
            Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS)
        );
    }
}
