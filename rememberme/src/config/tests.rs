#[cfg(test)]
mod tests {
    use crate::config::{
        ConfigBuilder, ConfigLoader, DataBackend, LogFormat, LogLevel, RememberMeConfig,
        RetryConfig, validation,
    };
    use figment::Jail;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = RememberMeConfig::default();
        assert_eq!(config.data.backend, DataBackend::Memory);
        assert_eq!(config.data.buckets.voice_samples, "voice-samples");
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.backend.retry.max_retries, 2);
        assert_eq!(config.backend.retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(config.speech.language, "en-US");
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.resolver.extra_keywords.is_empty());
    }

    #[test]
    fn test_config_builder_with_rest_data() {
        let config = ConfigBuilder::new()
            .with_rest_data("https://demo.supabase.co", "anon-key")
            .with_backend_url("https://api.example.com/api")
            .with_keywords("caregiver", ["nurse"])
            .with_log_level(LogLevel::Debug)
            .build()
            .unwrap();

        assert_eq!(config.data.backend, DataBackend::Rest);
        assert_eq!(config.data.url.as_deref(), Some("https://demo.supabase.co"));
        assert_eq!(config.backend.base_url, "https://api.example.com/api");
        assert_eq!(config.resolver.extra_keywords[0].keywords, vec!["nurse"]);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_validation() {
        assert!(ConfigBuilder::new().build().is_ok());
        assert!(validation::validate_config(&RememberMeConfig::default()).is_ok());
    }

    #[test]
    fn test_rest_backend_requires_url_and_key() {
        let mut config = RememberMeConfig::default();
        config.data.backend = DataBackend::Rest;
        let err = validation::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("data.url"));

        config.data.url = Some("https://demo.supabase.co".to_string());
        let err = validation::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("data.anon_key"));

        config.data.anon_key = Some("key".to_string());
        assert!(validation::validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = ConfigBuilder::new().with_backend_url("ftp://example.com").build();
        assert!(bad_url.is_err());

        let zero_timeout = ConfigBuilder::new()
            .with_backend_timeout(Duration::ZERO)
            .build();
        assert!(zero_timeout.is_err());

        let empty_rule = ConfigBuilder::new()
            .with_keywords("friend", Vec::<String>::new())
            .build();
        assert!(empty_rule.is_err());

        let bad_multiplier = ConfigBuilder::new()
            .with_retry(RetryConfig {
                backoff_multiplier: 0.5,
                ..RetryConfig::default()
            })
            .build();
        assert!(bad_multiplier.is_err());
    }

    #[test]
    fn test_predefined_configs() {
        let dev = ConfigBuilder::development().build().unwrap();
        let test = ConfigBuilder::testing().build().unwrap();

        assert_eq!(dev.data.backend, DataBackend::Memory);
        assert_eq!(dev.logging.level, LogLevel::Debug);

        assert_eq!(test.backend.retry.max_retries, 0);
        assert!(!test.speech.enabled);
    }

    #[test]
    fn test_production_preset_reads_environment() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            assert!(ConfigBuilder::production().build().is_err());

            jail.set_env("SUPABASE_URL", "https://prod.supabase.co");
            jail.set_env("SUPABASE_ANON_KEY", "prod-key");
            let prod = ConfigBuilder::production()
                .build()
                .map_err(|e| e.to_string())?;
            assert_eq!(prod.data.backend, DataBackend::Rest);
            assert_eq!(prod.logging.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_loader_layers_file_then_environment() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "rememberme.toml",
                r#"
                [backend]
                base_url = "https://file.example.com/api"
                timeout = "5s"

                [logging]
                level = "warn"

                [[resolver.extra_keywords]]
                category = "caregiver"
                keywords = ["nurse", "carer"]
                "#,
            )?;
            jail.set_env("REMEMBERME_LOGGING__LEVEL", "debug");
            jail.set_env("REMEMBERME_DATA__BUCKETS__VIDEOS", "family-videos");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.base_url, "https://file.example.com/api");
            assert_eq!(config.backend.timeout, Duration::from_secs(5));
            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.data.buckets.videos, "family-videos");
            assert_eq!(config.resolver.extra_keywords[0].keywords.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn test_loader_environment_shortcuts() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("REMEMBERME_DATA__BACKEND", "rest");
            jail.set_env("SUPABASE_URL", "https://env.supabase.co");
            jail.set_env("SUPABASE_ANON_KEY", "env-key");
            jail.set_env("REMEMBERME_API_URL", "https://env-api.example.com/api");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.data.backend, DataBackend::Rest);
            assert_eq!(config.data.url.as_deref(), Some("https://env.supabase.co"));
            assert_eq!(config.data.anon_key.as_deref(), Some("env-key"));
            assert_eq!(config.backend.base_url, "https://env-api.example.com/api");
            Ok(())
        });
    }

    #[test]
    fn test_load_explicit_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "speech:\n  language: fr-FR\ndata:\n  timeout: 250ms").unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(file.path()).unwrap();
        let config = loader.extract().unwrap();
        assert_eq!(config.speech.language, "fr-FR");
        assert_eq!(config.data.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_load_file_errors() {
        let mut loader = ConfigLoader::new();
        assert!(loader.load_file(PathBuf::from("/nonexistent/rememberme.toml")).is_err());

        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(loader.load_file(file.path()).is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ConfigBuilder::new()
            .with_fixture("/tmp/family.json")
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: RememberMeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.data.fixture, Some(PathBuf::from("/tmp/family.json")));
        assert_eq!(deserialized.backend.retry, config.backend.retry);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }
}
