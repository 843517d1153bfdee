//! Facade configuration.
//!
//! Values come from serde (for hosts that ship a config file) or from the
//! environment via `FacadeConfig::from_env`.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

pub const BASE_URL_ENV: &str = "FACADE_BASE_URL";
pub const BUILD_MODE_ENV: &str = "FACADE_BUILD_MODE";

/// Whether the host is a development build; decides where session loss sends
/// the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            _ => Err(ConfigError::UnknownBuildMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub build_mode: BuildMode,
    /// Cookies expired when the session is found to be lost.
    pub cookie_names: Vec<String>,
    /// Where development builds land after acknowledging session loss.
    pub development_landing: String,
    /// Login entry point; the current location is passed as `service`.
    pub login_path: String,
    pub dialog_title: String,
    pub dialog_content: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            build_mode: BuildMode::default(),
            cookie_names: vec!["ICODE".to_string(), "BD_X_USER".to_string()],
            development_landing: "/welcome".to_string(),
            login_path: "/".to_string(),
            dialog_title: "Session expired".to_string(),
            dialog_content: "The current session has expired. Refresh the page and try again."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Prefix for relative request URLs; empty keeps them relative.
    pub base_url: String,
    /// Content type sent when the caller does not set one.
    pub content_type: String,
    pub session: SessionConfig,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            content_type: "application/json".to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl FacadeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(mode) = lookup(BUILD_MODE_ENV) {
            config.session.build_mode = mode.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_mode_parses_case_insensitively() {
        assert_eq!("Development".parse::<BuildMode>().unwrap(), BuildMode::Development);
        assert_eq!(" prod ".parse::<BuildMode>().unwrap(), BuildMode::Production);
        assert!(matches!(
            "staging".parse::<BuildMode>(),
            Err(ConfigError::UnknownBuildMode(_))
        ));
    }

    #[test]
    fn defaults_match_the_login_scheme() {
        let config = FacadeConfig::default();
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.session.build_mode, BuildMode::Production);
        assert_eq!(config.session.cookie_names, ["ICODE", "BD_X_USER"]);
        assert_eq!(config.session.development_landing, "/welcome");
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = FacadeConfig::from_lookup(|key| match key {
            BASE_URL_ENV => Some("http://localhost:3000".to_string()),
            BUILD_MODE_ENV => Some("development".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.session.build_mode, BuildMode::Development);
    }

    #[test]
    fn lookup_rejects_unknown_mode() {
        let result = FacadeConfig::from_lookup(|key| (key == BUILD_MODE_ENV).then(|| "qa".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: FacadeConfig =
            serde_json::from_str(r#"{"session":{"build_mode":"development"}}"#).unwrap();
        assert_eq!(config.session.build_mode, BuildMode::Development);
        assert_eq!(config.session.login_path, "/");
    }
}
