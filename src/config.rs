use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mediation::MatchMode;
use crate::telemetry::PrivacyLevel;

pub const DEFAULT_TARGET_PACKAGE: &str = "com.gojek.app";
pub const DEFAULT_MATCH_TEXTS: [&str; 2] = ["Pesan", "Order"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target package must not be empty")]
    EmptyTargetPackage,

    #[error("at least one match text is required")]
    NoMatchTexts,

    #[error("match text at position {0} is empty")]
    EmptyMatchText(usize),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("cannot read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Immutable configuration of the mediation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMediationConfig")]
pub struct MediationConfig {
    target_package: String,
    match_texts: Vec<String>,
    match_mode: MatchMode,
}

#[derive(Deserialize)]
struct RawMediationConfig {
    target_package: String,
    match_texts: Vec<String>,
    #[serde(default)]
    match_mode: MatchMode,
}

impl TryFrom<RawMediationConfig> for MediationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawMediationConfig) -> Result<Self, Self::Error> {
        Ok(MediationConfig::new(raw.target_package, raw.match_texts)?.with_match_mode(raw.match_mode))
    }
}

impl MediationConfig {
    /// Validate and build a config. Duplicate texts keep their first position.
    pub fn new<I, S>(target_package: impl Into<String>, match_texts: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target_package = target_package.into();
        if target_package.is_empty() {
            return Err(ConfigError::EmptyTargetPackage);
        }

        let mut texts: Vec<String> = Vec::new();
        for (i, text) in match_texts.into_iter().map(Into::into).enumerate() {
            if text.is_empty() {
                return Err(ConfigError::EmptyMatchText(i));
            }
            if !texts.contains(&text) {
                texts.push(text);
            }
        }
        if texts.is_empty() {
            return Err(ConfigError::NoMatchTexts);
        }

        Ok(Self {
            target_package,
            match_texts: texts,
            match_mode: MatchMode::default(),
        })
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn target_package(&self) -> &str {
        &self.target_package
    }

    pub fn match_texts(&self) -> &[String] {
        &self.match_texts
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }
}

impl Default for MediationConfig {
    fn default() -> Self {
        Self {
            target_package: DEFAULT_TARGET_PACKAGE.to_string(),
            match_texts: DEFAULT_MATCH_TEXTS.iter().map(|s| s.to_string()).collect(),
            match_mode: MatchMode::Exact,
        }
    }
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mediation: MediationConfig,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub journal_enabled: bool,
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mediation: MediationConfig::default(),
            privacy_level: PrivacyLevel::default(),
            journal_enabled: false,
            journal_path: None,
        }
    }
}

impl Config {
    /// Load from `path` when given, otherwise from the environment.
    /// A `.env` file in the working directory is honored in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| unreadable(e.to_string()))
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let target = lookup("AURA_TARGET_PACKAGE").unwrap_or_else(|| DEFAULT_TARGET_PACKAGE.to_string());

        let texts: Vec<String> = match lookup("AURA_MATCH_TEXTS") {
            Some(raw) => raw.split(',').map(|t| t.trim().to_string()).collect(),
            None => DEFAULT_MATCH_TEXTS.iter().map(|s| s.to_string()).collect(),
        };

        let match_mode = match lookup("AURA_MATCH_MODE") {
            Some(raw) => raw.parse::<MatchMode>().map_err(|reason| ConfigError::InvalidValue {
                key: "AURA_MATCH_MODE".to_string(),
                reason,
            })?,
            None => MatchMode::default(),
        };

        let privacy_level = match lookup("AURA_PRIVACY_LEVEL") {
            Some(raw) => raw.parse::<PrivacyLevel>().map_err(|reason| ConfigError::InvalidValue {
                key: "AURA_PRIVACY_LEVEL".to_string(),
                reason,
            })?,
            None => PrivacyLevel::default(),
        };

        let journal_enabled = lookup("AURA_JOURNAL")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            mediation: MediationConfig::new(target, texts)?.with_match_mode(match_mode),
            privacy_level,
            journal_enabled,
            journal_path: lookup("AURA_JOURNAL_PATH").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_rejects_empty_target() {
        assert_eq!(
            MediationConfig::new("", ["Pesan"]).unwrap_err(),
            ConfigError::EmptyTargetPackage
        );
    }

    #[test]
    fn test_rejects_missing_or_empty_texts() {
        assert_eq!(
            MediationConfig::new("com.gojek.app", Vec::<String>::new()).unwrap_err(),
            ConfigError::NoMatchTexts
        );
        assert_eq!(
            MediationConfig::new("com.gojek.app", ["Pesan", ""]).unwrap_err(),
            ConfigError::EmptyMatchText(1)
        );
    }

    #[test]
    fn test_duplicate_texts_keep_first_position() {
        let config = MediationConfig::new("com.gojek.app", ["Order", "Pesan", "Order"]).unwrap();
        assert_eq!(config.match_texts(), &["Order".to_string(), "Pesan".to_string()]);
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let err = serde_json::from_str::<MediationConfig>(
            r#"{"target_package": "", "match_texts": ["Pesan"]}"#,
        );
        assert!(err.is_err());

        let config: MediationConfig = serde_json::from_str(
            r#"{"target_package": "com.gojek.app", "match_texts": ["Pesan"], "match_mode": "contains_ignore_case"}"#,
        )
        .unwrap();
        assert_eq!(config.match_mode(), MatchMode::ContainsIgnoreCase);
    }

    #[test]
    fn test_env_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.mediation.target_package(), "com.gojek.app");
        assert_eq!(config.mediation.match_texts(), &["Pesan".to_string(), "Order".to_string()]);
        assert!(!config.journal_enabled);
        assert_eq!(config.privacy_level, PrivacyLevel::Standard);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("AURA_TARGET_PACKAGE", "com.grab.app"),
            ("AURA_MATCH_TEXTS", "Book, Pesan"),
            ("AURA_MATCH_MODE", "contains"),
            ("AURA_PRIVACY_LEVEL", "high"),
            ("AURA_JOURNAL", "true"),
            ("AURA_JOURNAL_PATH", "/tmp/outcomes.db"),
        ]))
        .unwrap();

        assert_eq!(config.mediation.target_package(), "com.grab.app");
        assert_eq!(config.mediation.match_texts(), &["Book".to_string(), "Pesan".to_string()]);
        assert_eq!(config.mediation.match_mode(), MatchMode::ContainsIgnoreCase);
        assert_eq!(config.privacy_level, PrivacyLevel::High);
        assert!(config.journal_enabled);
        assert_eq!(config.journal_path, Some(PathBuf::from("/tmp/outcomes.db")));
    }

    #[test]
    fn test_env_invalid_mode() {
        let err = Config::from_lookup(lookup_from(&[("AURA_MATCH_MODE", "fuzzy")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "AURA_MATCH_MODE"));
    }
}
