//! Bootstrap configuration loading
//!
//! Settings are resolved once at startup in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (read by the binary's argument parser)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not fatal: compiled defaults are used and `source` is `None`.
//! A malformed file is reported as [`Error::TomlParse`], out-of-range values as [`Error::Config`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default bind host (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// Default location of the exported model artifact
pub const DEFAULT_MODEL_PATH: &str = "model/best_transfer.onnx";

/// Square input edge length expected by the model
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Predictions scoring below this are reported as unknown
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Largest accepted request body (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Class names in model output order
pub const DEFAULT_LABELS: [&str; 3] = ["paper", "rock", "scissors"];

/// Raw contents of the TOML config file
///
/// Every field is optional; anything left out falls back to the compiled default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
}

/// `[model]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// Relative paths are resolved against the config file's directory
    pub path: Option<PathBuf>,
    pub image_size: Option<u32>,
    pub confidence_threshold: Option<f32>,
    pub labels: Option<Vec<String>>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl TomlConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse TOML config text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Values taken from the command line or environment
///
/// `None` means "not given"; the TOML file or compiled default is used instead.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub image_size: u32,
    pub confidence_threshold: f32,
    pub labels: Vec<String>,
    pub max_upload_bytes: usize,
    pub log_level: String,
    /// Config file the values were read from, if any
    pub source: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            image_size: DEFAULT_IMAGE_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            source: None,
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the config file and compiled defaults
    ///
    /// An explicitly requested config file must exist. Without one, the platform
    /// config locations are probed and defaults are used when none is present.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let (toml_config, source) = match overrides.config_file.clone() {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                (TomlConfig::load(&path)?, Some(path))
            }
            None => match default_config_path() {
                Some(path) => (TomlConfig::load(&path)?, Some(path)),
                None => (TomlConfig::default(), None),
            },
        };

        Self::from_parts(toml_config, source, overrides)
    }

    /// Merge a parsed TOML config with overrides and validate the result
    pub fn from_parts(
        toml_config: TomlConfig,
        source: Option<PathBuf>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let defaults = Self::default();
        let TomlConfig {
            server,
            model,
            logging,
        } = toml_config;

        let config_dir = source.as_deref().and_then(Path::parent);
        let toml_model_path = model.path.map(|path| match config_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        });

        let config = Self {
            host: overrides.host.or(server.host).unwrap_or(defaults.host),
            port: overrides.port.or(server.port).unwrap_or(defaults.port),
            model_path: overrides
                .model_path
                .or(toml_model_path)
                .unwrap_or(defaults.model_path),
            image_size: model.image_size.unwrap_or(defaults.image_size),
            confidence_threshold: model
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            labels: model.labels.unwrap_or(defaults.labels),
            max_upload_bytes: server.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            log_level: overrides
                .log_level
                .or(logging.level)
                .unwrap_or(defaults.log_level),
            source,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.image_size == 0 {
            return Err(Error::Config("image_size must be greater than 0".to_string()));
        }
        if self.labels.is_empty() {
            return Err(Error::Config("labels must not be empty".to_string()));
        }
        if self.labels.iter().any(|label| label.trim().is_empty()) {
            return Err(Error::Config("labels must not contain blank names".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be greater than 0".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Locate the platform config file
///
/// Linux checks ~/.config/rps/config.toml, then /etc/rps/config.toml.
/// Other platforms check the user config directory only.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("rps").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/rps/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
