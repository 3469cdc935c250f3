//! # RPS Common Library
//!
//! Shared code for the rock/paper/scissors classification service:
//! - Error types
//! - Bootstrap configuration loading (CLI / environment / TOML / compiled defaults)

pub mod config;
pub mod error;

pub use config::{ConfigOverrides, ServiceConfig};
pub use error::{Error, Result};
