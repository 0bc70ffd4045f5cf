//! Configuration system for the Agents SDK
//!
//! Provider credentials, the default model and dispatch options. Nothing here
//! is global: a [`SdkConfig`] is built explicitly (or read from the
//! environment or a TOML file) and converted into a
//! [`RunConfig`](crate::RunConfig) for each run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AgentsError, Result};

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the completion API
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Credential; resolved lazily so a missing key fails at run time
    pub api_key: Option<String>,

    /// Alternate endpoint; the client's default when unset
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `OPENAI_API_KEY` (falling back to `API_KEY`) and
    /// `OPENAI_BASE_URL` (falling back to `BASE_URL`).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: first_set(&lookup, &["OPENAI_API_KEY", "API_KEY"]),
            base_url: first_set(&lookup, &["OPENAI_BASE_URL", "BASE_URL"]),
        }
    }

    /// Credentials for a run; fails when no key is configured.
    pub fn resolve(&self) -> Result<Credentials> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AgentsError::ConfigurationError {
                message: "no API key configured; set OPENAI_API_KEY or API_KEY".to_string(),
            })?;
        Ok(Credentials {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone().filter(|url| !url.trim().is_empty()),
        })
    }
}

fn first_set(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
}

/// Resolved credentials
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// How tool-call argument payloads are checked before dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentPolicy {
    /// Malformed or schema-violating arguments become a tool error and the
    /// tool is not invoked
    #[default]
    Strict,
    /// Malformed arguments decode as an empty object; no schema check
    Lenient,
}

/// Global SDK configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Default model to use
    pub model: String,

    /// Completion API connection
    pub provider: ProviderConfig,

    /// Dispatch the tool calls of one response concurrently
    pub parallel_tools: bool,

    /// Argument checking before dispatch
    pub argument_policy: ArgumentPolicy,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider: ProviderConfig::default(),
            parallel_tools: false,
            argument_policy: ArgumentPolicy::default(),
        }
    }
}

impl SdkConfig {
    /// Environment-driven configuration over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = SdkConfig {
            provider: ProviderConfig::from_lookup(&lookup),
            ..SdkConfig::default()
        };

        if let Some(model) = first_set(&lookup, &["OPENAI_MODEL", "MODEL"]) {
            config.model = model;
        }

        if let Some(parallel) = lookup("AGENTS_PARALLEL_TOOLS") {
            config.parallel_tools = parallel.to_lowercase() == "true" || parallel == "1";
        }

        if let Some(policy) = lookup("AGENTS_ARGUMENT_POLICY") {
            match policy.to_lowercase().as_str() {
                "strict" => config.argument_policy = ArgumentPolicy::Strict,
                "lenient" => config.argument_policy = ArgumentPolicy::Lenient,
                other => tracing::warn!(value = other, "ignoring unknown AGENTS_ARGUMENT_POLICY"),
            }
        }

        config
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: SdkConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.provider.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.provider.base_url = Some(base_url.into());
        self
    }

    pub fn parallel_tools(mut self, enabled: bool) -> Self {
        self.config.parallel_tools = enabled;
        self
    }

    pub fn argument_policy(mut self, policy: ArgumentPolicy) -> Self {
        self.config.argument_policy = policy;
        self
    }

    pub fn build(self) -> SdkConfig {
        self.config
    }
}

/// Load configuration from environment variables
pub fn from_env() -> SdkConfig {
    SdkConfig::from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from a TOML file
pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<SdkConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: SdkConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(!config.parallel_tools);
        assert_eq!(config.argument_policy, ArgumentPolicy::Strict);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .model("gpt-4o")
            .api_key("sk-test")
            .base_url("http://localhost:8080/v1")
            .parallel_tools(true)
            .argument_policy(ArgumentPolicy::Lenient)
            .build();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert!(config.parallel_tools);
        assert_eq!(config.argument_policy, ArgumentPolicy::Lenient);
    }

    #[test]
    fn test_provider_env_precedence() {
        let provider = ProviderConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("API_KEY", "sk-generic"),
            ("BASE_URL", "http://proxy"),
        ]));
        assert_eq!(provider.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(provider.base_url.as_deref(), Some("http://proxy"));

        let provider = ProviderConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", ""),
            ("API_KEY", "sk-generic"),
        ]));
        assert_eq!(provider.api_key.as_deref(), Some("sk-generic"));
    }

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let err = ProviderConfig::default().resolve().unwrap_err();
        assert!(matches!(err, AgentsError::ConfigurationError { .. }));

        let err = ProviderConfig::new("   ").resolve().unwrap_err();
        assert!(matches!(err, AgentsError::ConfigurationError { .. }));
    }

    #[test]
    fn test_credentials_redact_key() {
        let creds = ProviderConfig::new("sk-secret")
            .with_base_url("http://localhost")
            .resolve()
            .unwrap();
        assert_eq!(creds.api_key, "sk-secret");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("http://localhost"));

        let rendered = format!("{:?}", ProviderConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn test_sdk_config_from_lookup() {
        let config = SdkConfig::from_lookup(lookup(&[
            ("MODEL", "gpt-4o"),
            ("API_KEY", "sk-test"),
            ("AGENTS_PARALLEL_TOOLS", "1"),
            ("AGENTS_ARGUMENT_POLICY", "Lenient"),
        ]));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert!(config.parallel_tools);
        assert_eq!(config.argument_policy, ArgumentPolicy::Lenient);

        let config = SdkConfig::from_lookup(lookup(&[
            ("OPENAI_MODEL", "gpt-4.1"),
            ("MODEL", "gpt-4o"),
            ("AGENTS_ARGUMENT_POLICY", "sloppy"),
        ]));
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.argument_policy, ArgumentPolicy::Strict);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model = "gpt-4o"
parallel_tools = true
argument_policy = "lenient"

[provider]
api_key = "sk-file"
"#
        )
        .unwrap();

        let config = from_file(file.path()).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert!(config.parallel_tools);
        assert_eq!(config.argument_policy, ArgumentPolicy::Lenient);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-file"));
        assert!(config.provider.base_url.is_none());
    }

    #[test]
    fn test_from_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = [").unwrap();
        assert!(matches!(
            from_file(file.path()),
            Err(AgentsError::ConfigFileError(_))
        ));

        assert!(matches!(
            from_file("/definitely/not/here.toml"),
            Err(AgentsError::IoError(_))
        ));
    }
}
