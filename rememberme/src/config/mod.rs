//! Configuration system for RememberMe.
//!
//! Configuration is layered: built-in defaults, then the first configuration
//! file found, then an explicit file, then environment variables. Values are
//! validated once all layers are merged.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "rememberme.toml",
    "rememberme.yaml",
    "rememberme.yml",
    "rememberme.json",
    ".rememberme/config.toml",
    ".rememberme/config.yaml",
    ".rememberme/config.yml",
    ".rememberme/config.json",
];

/// Environment variable prefix for RememberMe configuration
///
/// Nested keys are separated with `__`, e.g. `REMEMBERME_DATA__BACKEND=rest`.
pub const ENV_PREFIX: &str = "REMEMBERME_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
