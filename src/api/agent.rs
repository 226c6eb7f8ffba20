//! Validated inputs for a run: the agent configuration and the option count.

use std::fmt;
use std::str::FromStr;

use super::error::{ConfigError, InputError};

/// Credential and model identifier for the completion service.
///
/// Construction fails when the credential is blank, so an orchestrator can
/// never be built, and no request sent, without one.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentConfig {
    credential: String,
    model: String,
}

impl AgentConfig {
    pub fn new(credential: impl Into<String>, model: impl Into<String>) -> Result<Self, ConfigError> {
        let credential = credential.into();
        let model = model.into();
        if credential.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        Ok(Self {
            credential: credential.trim().to_string(),
            model: model.trim().to_string(),
        })
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("credential", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Number of answer options to generate. Never below [`OptionCount::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OptionCount(u32);

impl OptionCount {
    pub const MIN: u32 = 3;

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for OptionCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u32> for OptionCount {
    type Error = InputError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value < Self::MIN {
            return Err(InputError::CountBelowMinimum {
                requested: value,
                minimum: Self::MIN,
            });
        }
        Ok(Self(value))
    }
}

impl FromStr for OptionCount {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| InputError::InvalidCount(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for OptionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credential_is_rejected() {
        assert_eq!(
            AgentConfig::new("", "gpt-4").unwrap_err(),
            ConfigError::MissingCredential
        );
        assert_eq!(
            AgentConfig::new("   ", "gpt-4").unwrap_err(),
            ConfigError::MissingCredential
        );
    }

    #[test]
    fn blank_model_is_rejected() {
        assert_eq!(
            AgentConfig::new("sk-test", "").unwrap_err(),
            ConfigError::MissingModel
        );
    }

    #[test]
    fn debug_hides_credential() {
        let config = AgentConfig::new("sk-secret", "gpt-4").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4"));
    }

    #[test]
    fn count_minimum_is_three() {
        assert_eq!(OptionCount::try_from(3).unwrap().get(), 3);
        assert_eq!(OptionCount::default().get(), 3);
        for n in [0, 1, 2] {
            assert_eq!(
                OptionCount::try_from(n).unwrap_err(),
                InputError::CountBelowMinimum {
                    requested: n,
                    minimum: 3
                }
            );
        }
    }

    #[test]
    fn count_parses_from_text() {
        assert_eq!("5".parse::<OptionCount>().unwrap().get(), 5);
        assert!(matches!(
            "two".parse::<OptionCount>(),
            Err(InputError::InvalidCount(_))
        ));
        assert!(matches!(
            "-1".parse::<OptionCount>(),
            Err(InputError::InvalidCount(_))
        ));
    }
}
