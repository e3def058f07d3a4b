//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, deserialize, merge built-in networks)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → read by the CLI to build the client and batch settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the tool runs without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    AppConfig, BatchConfig, GasConfig, NetworkConfig, ObservabilityConfig, RpcConfig, SwapConfig,
};
