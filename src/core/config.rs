//! Loads the optional settings file (`~/.smartgpt/config.toml`).

use crate::api::{ConfigError, Prompts, Sampling};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_BACKEND: &str = "openai";
const DEFAULT_MODELS: [&str; 2] = ["gpt-3.5-turbo", "gpt-4"];

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    backend: Option<String>,
    base_url: Option<String>,
    models: Option<Vec<String>>,
    #[serde(default)]
    sampling: SamplingSection,
    #[serde(default)]
    prompts: PromptsSection,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SamplingSection {
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PromptsSection {
    critique: Option<String>,
    resolution: Option<String>,
}

/// Runtime settings, with defaults for anything the file leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend: String,
    pub base_url: Option<String>,
    /// Models offered for selection; the first one is the default.
    pub models: Vec<String>,
    pub sampling: Sampling,
    pub prompts: Prompts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            base_url: None,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            sampling: Sampling::default(),
            prompts: Prompts::default(),
        }
    }
}

impl Settings {
    /// Path of the settings file in the user's home directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = env::var("HOME")
            .map_err(|_| ConfigError::Settings("Unable to determine HOME directory".to_string()))?;
        Ok(PathBuf::from(home).join(".smartgpt").join("config.toml"))
    }

    /// Loads settings from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            ConfigError::Settings(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)
            .map_err(|e| ConfigError::Settings(format!("Failed to parse config.toml: {}", e)))?;
        let defaults = Self::default();

        let models = match file.models {
            Some(models) => {
                let models: Vec<String> = models
                    .into_iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect();
                if models.is_empty() {
                    return Err(ConfigError::Settings(
                        "'models' must list at least one model".to_string(),
                    ));
                }
                models
            }
            None => defaults.models,
        };

        let sampling = Sampling {
            max_tokens: file
                .sampling
                .max_tokens
                .unwrap_or(defaults.sampling.max_tokens),
            temperature: file
                .sampling
                .temperature
                .unwrap_or(defaults.sampling.temperature),
        };
        if sampling.max_tokens == 0 {
            return Err(ConfigError::Settings(
                "'sampling.max_tokens' must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&sampling.temperature) {
            return Err(ConfigError::Settings(format!(
                "'sampling.temperature' must be between 0.0 and 2.0 (got {})",
                sampling.temperature
            )));
        }

        let prompts = Prompts {
            critique: file.prompts.critique.unwrap_or(defaults.prompts.critique),
            resolution: file
                .prompts
                .resolution
                .unwrap_or(defaults.prompts.resolution),
        };

        Ok(Self {
            backend: file.backend.unwrap_or(defaults.backend),
            base_url: file.base_url,
            models,
            sampling,
            prompts,
        })
    }

    /// The model used when none is chosen explicitly.
    pub fn default_model(&self) -> &str {
        self.models
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODELS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("config.toml"))).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.backend, "openai");
        assert_eq!(settings.models, vec!["gpt-3.5-turbo", "gpt-4"]);
        assert_eq!(settings.sampling.max_tokens, 2000);
        assert_eq!(settings.sampling.temperature, 0.5);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
backend = "anthropic"
base_url = "http://localhost:8080"
models = ["claude-a", "claude-b"]

[sampling]
temperature = 0.2

[prompts]
resolution = "Pick the best of {{{{ count }}}}."
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.backend, "anthropic");
        assert_eq!(settings.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(settings.default_model(), "claude-a");
        assert_eq!(settings.sampling.max_tokens, 2000);
        assert_eq!(settings.sampling.temperature, 0.2);
        assert_eq!(settings.prompts.resolution, "Pick the best of {{ count }}.");
        assert_eq!(settings.prompts.critique, Prompts::default().critique);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Settings::parse("models = []").is_err());
        assert!(Settings::parse("[sampling]\ntemperature = 3.5").is_err());
        assert!(Settings::parse("[sampling]\nmax_tokens = 0").is_err());
        assert!(Settings::parse("unknown_key = 1").is_err());
        assert!(Settings::parse("models = \"gpt-4\"").is_err());
    }
}
