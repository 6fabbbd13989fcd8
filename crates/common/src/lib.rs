//! Shared types, config, and error definitions for the lineup engine.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod types;

pub use config::EngineConfig;
pub use error::Error;
pub use snapshot::{LineupDocument, PortfolioSnapshot};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
