//! Configuration data models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RememberMeConfig {
    /// Data service (records and files)
    pub data: DataConfig,

    /// Conversational and photo-recognition API
    pub backend: BackendConfig,

    /// Relationship resolver
    pub resolver: ResolverConfig,

    /// Speech input
    pub speech: SpeechConfig,

    pub logging: LoggingConfig,
}

/// Which data store implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataBackend {
    /// Hosted data service reached over REST
    Rest,

    /// Process-local store, optionally seeded from a fixture file
    #[default]
    Memory,
}

impl fmt::Display for DataBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataBackend::Rest => write!(f, "rest"),
            DataBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Storage bucket names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BucketConfig {
    pub profiles: String,
    pub voice_samples: String,
    pub memory_audio: String,
    pub patient: String,
    pub videos: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_string(),
            voice_samples: "voice-samples".to_string(),
            memory_audio: "memory-audio".to_string(),
            patient: "patient".to_string(),
            videos: "videos".to_string(),
        }
    }
}

/// Data service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub backend: DataBackend,

    /// Base URL of the data service, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,

    /// Public (anon) API key
    pub anon_key: Option<String>,

    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// JSON fixture used to seed the in-memory store
    pub fixture: Option<PathBuf>,

    pub buckets: BucketConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            backend: DataBackend::Memory,
            url: None,
            anon_key: None,
            timeout: Duration::from_secs(30),
            fixture: None,
            buckets: BucketConfig::default(),
        }
    }
}

/// Retry behaviour for idempotent backend requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,

    pub backoff_multiplier: f64,

    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub retry: RetryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Extra keywords for one relationship category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Appended to the built-in keyword table in order
    pub extra_keywords: Vec<KeywordRule>,
}

/// Speech input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,

    /// BCP 47 language tag passed to the recognizer
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-US".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-oriented development format
    Default,
    Json,
    Compact,
    Pretty,
}
