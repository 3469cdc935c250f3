//! HTTP API handlers for rps-classifier

pub mod health;
pub mod predict;

pub use health::health_routes;
pub use predict::predict;
