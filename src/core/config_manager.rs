// src/core/config_manager.rs
//! Unified configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub generation: GenerationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub templates_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("jobmatch.db"),
            templates_path: PathBuf::from("templates"),
            output_path: PathBuf::from("out"),
        }
    }
}

/// Settings for the hosted generation endpoint. The API key itself is user
/// data and lives in storage, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileConfig {
    #[serde(default)]
    environment: Option<EnvironmentConfig>,
    #[serde(default)]
    generation: Option<GenerationSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ProfileConfig,
    #[serde(default)]
    production: ProfileConfig,
}

impl ConfigManager {
    /// Load configuration for the active environment. A missing
    /// `config.yaml` falls back to built-in defaults so the CLI works from
    /// any directory.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = PathBuf::from(CONFIG_FILE);
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", CONFIG_FILE))?;
            Self::from_yaml_str(&content, &environment)?
        } else {
            Self {
                environment: EnvironmentConfig::default(),
                generation: GenerationSettings::default(),
            }
        };

        config.apply_env_overrides();
        config.environment = config.environment.resolved()?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBMATCH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;

        let profile = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(Self {
            environment: profile.environment.unwrap_or_default(),
            generation: profile.generation.unwrap_or_default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("GEMINI_API_URL") {
            self.generation.base_url = url;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Ok(timeout) = std::env::var("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse() {
                self.generation.timeout_seconds = seconds;
            }
        }
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.environment.templates_path,
            &self.environment.output_path,
        ] {
            crate::utils::ensure_directory(dir).await?;
        }

        if let Some(db_parent) = self.environment.database_path.parent() {
            if !db_parent.as_os_str().is_empty() {
                crate::utils::ensure_directory(db_parent).await?;
            }
        }

        Ok(())
    }
}

impl EnvironmentConfig {
    fn resolved(&self) -> Result<Self> {
        Ok(Self {
            database_path: resolve_path(&self.database_path)?,
            templates_path: resolve_path(&self.templates_path)?,
            output_path: resolve_path(&self.output_path)?,
        })
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_selects_environment() {
        let yaml = r#"
local:
  environment:
    database_path: local.db
    templates_path: templates
    output_path: out
  generation:
    base_url: http://127.0.0.1:9999
    model: test-model
    timeout_seconds: 5
production:
  environment:
    database_path: /app/jobmatch.db
    templates_path: /app/templates
    output_path: /app/out
"#;

        let local = ConfigManager::from_yaml_str(yaml, "local").unwrap();
        assert_eq!(local.generation.model, "test-model");
        assert_eq!(local.generation.timeout_seconds, 5);
        assert_eq!(local.environment.database_path, PathBuf::from("local.db"));

        let production = ConfigManager::from_yaml_str(yaml, "production").unwrap();
        assert_eq!(
            production.environment.database_path,
            PathBuf::from("/app/jobmatch.db")
        );
        // production section omits generation settings, so defaults apply
        assert_eq!(production.generation.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = ConfigManager::from_yaml_str("{}", "local").unwrap();
        assert_eq!(
            config.generation.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.environment.templates_path, PathBuf::from("templates"));
    }
}
