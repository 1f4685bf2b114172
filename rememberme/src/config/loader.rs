//! Configuration loader.

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, Result, models::*, validation};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Configuration loader that handles loading from multiple sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    /// Create a new configuration loader with default values.
    pub fn new() -> Self {
        let figment = Figment::new().merge(Serialized::defaults(RememberMeConfig::default()));
        Self { figment }
    }

    /// Load configuration from a file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let extension = path.extension().and_then(|ext| ext.to_str());
        if !matches!(extension, Some("toml" | "yaml" | "yml" | "json")) {
            return Err(ConfigError::FileLoadError(format!(
                "Unsupported file format: {}",
                path.display()
            )));
        }

        let figment = std::mem::take(&mut self.figment);
        self.figment = match extension {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Yaml::file(path)),
        };

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(self)
    }

    /// Load the first configuration file found in the working directory,
    /// then the first one found in the platform configuration directory.
    pub fn load_default_files(&mut self) -> &mut Self {
        for file in DEFAULT_CONFIG_FILES {
            let path = PathBuf::from(file);
            if path.exists() && self.load_file(&path).is_ok() {
                break;
            }
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "rememberme", "rememberme") {
            let config_dir = proj_dirs.config_dir();

            for ext in &["toml", "yaml", "yml", "json"] {
                let path = config_dir.join(format!("config.{}", ext));
                if path.exists() && self.load_file(&path).is_ok() {
                    break;
                }
            }
        }

        self
    }

    /// Load configuration from environment variables.
    ///
    /// `REMEMBERME_*` variables map onto the configuration tree with `__`
    /// between levels. `SUPABASE_URL` and `SUPABASE_ANON_KEY` fill in the data
    /// service, and `REMEMBERME_API_URL` sets the backend base URL.
    pub fn load_env(&mut self) -> &mut Self {
        let supabase_url = Env::raw()
            .only(&["SUPABASE_URL"])
            .map(|_| "data.url".into());
        let supabase_key = Env::raw()
            .only(&["SUPABASE_ANON_KEY"])
            .map(|_| "data.anon_key".into());
        let api_url = Env::raw()
            .only(&["REMEMBERME_API_URL"])
            .map(|_| "backend.base_url".into());

        let figment = std::mem::take(&mut self.figment)
            .merge(supabase_url)
            .merge(supabase_key)
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["api_url"]).split("__"))
            .merge(api_url);
        self.figment = figment;
        self
    }

    /// Load configuration from a custom source.
    pub fn merge<T: figment::Provider>(&mut self, provider: T) -> &mut Self {
        let figment = std::mem::take(&mut self.figment).merge(provider);
        self.figment = figment;
        self
    }

    /// Extract and validate the configuration.
    pub fn extract(&self) -> Result<RememberMeConfig> {
        let config: RememberMeConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validation::validate_config(&config)?;

        Ok(config)
    }

    /// Defaults, default files, an optional explicit file, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<RememberMeConfig> {
        let mut loader = Self::new();
        loader.load_default_files();
        if let Some(path) = explicit {
            loader.load_file(path)?;
        }
        loader.load_env();
        loader.extract()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
