//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CollectorConfig (validated, immutable)
//!
//! environment / keys file
//!     → keys.rs (ordered KeyMaterial list)
//!     → validation.rs (duplicate detection)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a run never mutates it
//! - All fields have defaults to allow minimal configs
//! - Secrets never appear in the config file

pub mod keys;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CollectorConfig, NativeSweepConfig, ObservabilityConfig, PacingConfig, RpcConfig,
    SweepTargetConfig, TokenSweepConfig,
};
