//! Configuration builder.

use super::{Result, models::*, validation};
use std::path::Path;
use std::time::Duration;

/// Builder for creating RememberMeConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: RememberMeConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: RememberMeConfig::default(),
        }
    }

    /// Use the hosted data service at `url`.
    pub fn with_rest_data(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.config.data.backend = DataBackend::Rest;
        self.config.data.url = Some(url.into());
        self.config.data.anon_key = Some(anon_key.into());
        self
    }

    /// Use the in-memory data store.
    pub fn with_memory_data(mut self) -> Self {
        self.config.data.backend = DataBackend::Memory;
        self
    }

    /// Seed the in-memory data store from a JSON fixture.
    pub fn with_fixture<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data.backend = DataBackend::Memory;
        self.config.data.fixture = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_data_timeout(mut self, timeout: Duration) -> Self {
        self.config.data.timeout = timeout;
        self
    }

    /// Set the backend API base URL.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.timeout = timeout;
        self
    }

    /// Set how idempotent backend reads are retried.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.backend.retry = retry;
        self
    }

    /// Add keywords for a relationship category.
    pub fn with_keywords<I, S>(mut self, category: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.resolver.extra_keywords.push(KeywordRule {
            category: category.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Disable speech input.
    pub fn without_speech(mut self) -> Self {
        self.config.speech.enabled = false;
        self
    }

    pub fn with_speech_language(mut self, language: impl Into<String>) -> Self {
        self.config.speech.language = language.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use default logging configuration (console output at Info level)
    pub fn with_default_logging(mut self) -> Self {
        self.config.logging.level = LogLevel::Info;
        self.config.logging.format = LogFormat::Json;
        self.config.logging.file = None;
        self
    }

    /// Local development: in-memory data, local backend, debug logging.
    pub fn development() -> Self {
        Self::new()
            .with_memory_data()
            .with_log_level(LogLevel::Debug)
    }

    /// Automated tests: in-memory data, no retries, no speech.
    pub fn testing() -> Self {
        Self::development()
            .with_retry(RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            })
            .without_speech()
    }

    /// Production: hosted data service taken from `SUPABASE_URL` and
    /// `SUPABASE_ANON_KEY`, JSON logs.
    ///
    /// Building fails validation unless both variables are set.
    pub fn production() -> Self {
        let mut builder = Self::new().with_default_logging();
        builder.config.data.backend = DataBackend::Rest;
        builder.with_supabase_if_configured()
    }

    /// Sensible defaults: in-memory data unless a hosted data service is
    /// configured in the environment.
    pub fn defaults() -> Self {
        Self::new().with_supabase_if_configured()
    }

    /// Point the data service and backend at the environment's services, if set
    pub fn with_supabase_if_configured(mut self) -> Self {
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            tracing::info!("Configuring data service at: {}", url);
            self.config.data.backend = DataBackend::Rest;
            self.config.data.url = Some(url);
        }

        if let Ok(key) = std::env::var("SUPABASE_ANON_KEY") {
            self.config.data.anon_key = Some(key);
        }

        if let Ok(api_url) = std::env::var("REMEMBERME_API_URL") {
            tracing::info!("Configuring backend API at: {}", api_url);
            self.config.backend.base_url = api_url;
        }

        self
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<RememberMeConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
