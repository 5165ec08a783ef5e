//! Configuration loading, validation, and management for Folio.
//!
//! Loads configuration from `~/.folio/config.toml` (or an explicit path) with
//! environment variable overrides. Validates all settings at startup.

use folio_core::knowledge::KnowledgeSources;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.folio/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model backend API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("persona", &self.persona)
            .field("agent", &self.agent)
            .field("notifications", &self.notifications)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Label used in logs (e.g., "gemini")
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// OpenAI-compatible endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "gemini".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_model() -> String {
    "gemini-3-flash-preview".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// The person the agent speaks as
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Profile export, already converted to text
    #[serde(default = "default_profile_path")]
    pub profile_path: Option<PathBuf>,

    /// Free-text bio
    #[serde(default = "default_summary_path")]
    pub summary_path: Option<PathBuf>,

    #[serde(default)]
    pub extra_paths: Vec<PathBuf>,

    /// One-line description shown by chat front-ends
    #[serde(default = "default_description")]
    pub description: String,

    /// Example prompts shown by chat front-ends
    #[serde(default = "default_examples")]
    pub examples: Vec<String>,
}

fn default_persona_name() -> String {
    "Nitesh Sharma".into()
}
fn default_profile_path() -> Option<PathBuf> {
    Some(PathBuf::from("me/linkedin.txt"))
}
fn default_summary_path() -> Option<PathBuf> {
    Some(PathBuf::from("me/summary.txt"))
}
fn default_description() -> String {
    "Ask me about my career, background, skills and experience.".into()
}
fn default_examples() -> Vec<String> {
    vec![
        "What kind of work do you do?".into(),
        "What are you writing about at the moment?".into(),
        "How can I get in touch with you?".into(),
    ]
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            profile_path: default_profile_path(),
            summary_path: default_summary_path(),
            extra_paths: Vec::new(),
            description: default_description(),
            examples: default_examples(),
        }
    }
}

impl PersonaConfig {
    /// The knowledge files to load for this persona.
    pub fn knowledge_sources(&self) -> KnowledgeSources {
        KnowledgeSources {
            profile: self.profile_path.clone(),
            summary: self.summary_path.clone(),
            extra: self.extra_paths.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model calls allowed per visitor turn
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

fn default_max_rounds() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushover_user: Option<String>,
}

impl NotificationConfig {
    /// Whether both Pushover credentials are present.
    pub fn pushover_configured(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.pushover_token) && present(&self.pushover_user)
    }
}

impl std::fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("pushover_token", &redact(&self.pushover_token))
            .field("pushover_user", &redact(&self.pushover_user))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// In-memory sessions kept before the oldest is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    7860
}
fn default_max_sessions() -> usize {
    1000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.folio/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment variable overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// - `FOLIO_API_KEY` (highest priority), then `GOOGLE_API_KEY` when no key is configured
    /// - `FOLIO_MODEL`, `FOLIO_BASE_URL`, `FOLIO_PERSONA_NAME`
    /// - `PUSHOVER_TOKEN`, `PUSHOVER_USER`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("FOLIO_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup("GOOGLE_API_KEY");
        }

        if let Some(model) = lookup("FOLIO_MODEL") {
            self.provider.model = model;
        }
        if let Some(url) = lookup("FOLIO_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(name) = lookup("FOLIO_PERSONA_NAME") {
            self.persona.name = name;
        }
        if let Some(token) = lookup("PUSHOVER_TOKEN") {
            self.notifications.pushover_token = Some(token);
        }
        if let Some(user) = lookup("PUSHOVER_USER") {
            self.notifications.pushover_user = Some(user);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".folio")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_rounds must be at least 1".into(),
            ));
        }

        if self.persona.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "persona.name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// The backend API key, or an error if none is configured.
    ///
    /// Every command that talks to the model calls this before starting.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.require_api_key().is_ok()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured: set FOLIO_API_KEY or GOOGLE_API_KEY, or api_key in the config file")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.model, "gemini-3-flash-preview");
        assert_eq!(config.agent.max_rounds, 5);
        assert_eq!(config.gateway.port, 7860);
        assert!(!config.notifications.pushover_configured());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.base_url, config.provider.base_url);
        assert_eq!(parsed.persona.name, config.persona.name);
    }

    #[test]
    fn parse_full_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_key = "sk-test"

[provider]
model = "gemini-2.5-flash"
temperature = 0.2
max_tokens = 512

[persona]
name = "Ada Lovelace"
profile_path = "me/profile.txt"
extra_paths = ["me/website.txt"]

[agent]
max_rounds = 3

[notifications]
pushover_token = "tok"
pushover_user = "usr"

[gateway]
port = 8080
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.provider.max_tokens, Some(512));
        assert_eq!(config.agent.max_rounds, 3);
        assert!(config.notifications.pushover_configured());
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.max_sessions, 1000);

        let sources = config.persona.knowledge_sources();
        assert_eq!(sources.profile, Some(PathBuf::from("me/profile.txt")));
        assert_eq!(sources.summary, Some(PathBuf::from("me/summary.txt")));
        assert_eq!(sources.extra, vec![PathBuf::from("me/website.txt")]);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.provider.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_rounds_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_rounds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn blank_persona_name_rejected() {
        let mut config = AppConfig::default();
        config.persona.name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[agent\nmax_rounds = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider.name, "gemini");
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let config = AppConfig::default();
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));
        assert!(!config.has_api_key());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("GOOGLE_API_KEY", "google-key"),
            ("FOLIO_MODEL", "gemini-2.5-pro"),
            ("FOLIO_PERSONA_NAME", "Grace Hopper"),
            ("PUSHOVER_TOKEN", "tok"),
            ("PUSHOVER_USER", "usr"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("google-key"));
        assert_eq!(config.provider.model, "gemini-2.5-pro");
        assert_eq!(config.persona.name, "Grace Hopper");
        assert!(config.notifications.pushover_configured());
    }

    #[test]
    fn folio_api_key_beats_file_and_google_key() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(env(&[("GOOGLE_API_KEY", "google-key")]));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));

        config.apply_env_overrides(env(&[("FOLIO_API_KEY", "folio-key")]));
        assert_eq!(config.api_key.as_deref(), Some("folio-key"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        config.notifications.pushover_token = Some("pushover-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("pushover-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini-3-flash-preview"));
        assert!(toml_str.contains("7860"));
    }
}
