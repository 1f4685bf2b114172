//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;
use std::time::Duration;

/// Validate the entire configuration.
pub fn validate_config(config: &RememberMeConfig) -> Result<(), ConfigError> {
    validate_data_config(&config.data)?;
    validate_backend_config(&config.backend)?;
    validate_resolver_config(&config.resolver)?;

    if config.speech.enabled && config.speech.language.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech language cannot be empty when speech is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be an http:// or https:// URL, got '{}'",
            field, url
        )));
    }
    Ok(())
}

fn validate_timeout(field: &str, timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::ValidationError(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}

/// Validate data service configuration.
fn validate_data_config(config: &DataConfig) -> Result<(), ConfigError> {
    validate_timeout("data.timeout", config.timeout)?;

    match config.backend {
        DataBackend::Rest => {
            let url = config
                .url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    ConfigError::ValidationError(
                        "data.url is required for the rest data backend (set SUPABASE_URL)"
                            .to_string(),
                    )
                })?;
            validate_url("data.url", url)?;

            if config.anon_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
                return Err(ConfigError::ValidationError(
                    "data.anon_key is required for the rest data backend (set SUPABASE_ANON_KEY)"
                        .to_string(),
                ));
            }
        }
        DataBackend::Memory => {
            if let Some(fixture) = &config.fixture
                && fixture.as_os_str().is_empty()
            {
                return Err(ConfigError::ValidationError(
                    "data.fixture cannot be an empty path".to_string(),
                ));
            }
        }
    }

    let buckets = &config.buckets;
    for (name, bucket) in [
        ("profiles", &buckets.profiles),
        ("voice_samples", &buckets.voice_samples),
        ("memory_audio", &buckets.memory_audio),
        ("patient", &buckets.patient),
        ("videos", &buckets.videos),
    ] {
        if bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "data.buckets.{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

/// Validate backend API configuration.
fn validate_backend_config(config: &BackendConfig) -> Result<(), ConfigError> {
    validate_url("backend.base_url", &config.base_url)?;
    validate_timeout("backend.timeout", config.timeout)?;

    if config.retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "backend.retry.backoff_multiplier must be at least 1.0".to_string(),
        ));
    }

    Ok(())
}

/// Validate resolver configuration.
fn validate_resolver_config(config: &ResolverConfig) -> Result<(), ConfigError> {
    for rule in &config.extra_keywords {
        if rule.category.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "resolver.extra_keywords entries need a category".to_string(),
            ));
        }
        if rule.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "resolver.extra_keywords for '{}' has no keywords",
                rule.category
            )));
        }
    }

    Ok(())
}
