//! Command-line arguments
//!
//! Each option can also come from its `RPS_*` environment variable; anything left
//! unset falls through to the TOML config file and then the compiled defaults.

use std::path::PathBuf;

use clap::Parser;
use rps_common::ConfigOverrides;

/// Command-line arguments for rps-classifier
#[derive(Parser, Debug)]
#[command(name = "rps-classifier")]
#[command(about = "Rock/paper/scissors image classification service")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "RPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "RPS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RPS_PORT")]
    pub port: Option<u16>,

    /// ONNX model artifact
    #[arg(short, long, env = "RPS_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RPS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config,
            host: self.host,
            port: self.port,
            model_path: self.model,
            log_level: self.log_level,
        }
    }
}
