//! Diagram provider settings for md2doc.
//!
//! Parses the `[diagrams]` table of an `md2doc.toml` settings file with serde
//! and resolves it into an immutable [`ProviderConfig`]. Settings are read
//! through the [`SettingsStore`] trait once per conversion and then passed
//! explicitly to the parser and renderer.
//!
//! CLI settings can be applied after loading via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.api_key`
//! - `diagrams.kroki_url`

mod expand;
mod store;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use store::{FileSettingsStore, MemorySettingsStore, SettingsStore};

/// Default Kroki server used as the unconditional fallback provider.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Diagram rendering provider selected by the user.
///
/// Kroki and mermaid.ink are always part of the fallback chain; the
/// credentialed providers are only tried when an API key or URL is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum DiagramProvider {
    /// Public mermaid.ink renderer.
    #[default]
    #[serde(rename = "mermaid.ink")]
    MermaidInk,
    /// Hosted MermaidChart service (bearer token).
    #[serde(rename = "mermaidchart")]
    MermaidChart,
    /// User-supplied rendering endpoint.
    #[serde(rename = "custom")]
    Custom,
    /// Kroki only (it is tried first regardless of this selection).
    #[serde(rename = "kroki")]
    Kroki,
}

impl DiagramProvider {
    /// Settings value for this provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MermaidInk => "mermaid.ink",
            Self::MermaidChart => "mermaidchart",
            Self::Custom => "custom",
            Self::Kroki => "kroki",
        }
    }

    /// Whether this provider needs an API key or URL to be usable.
    #[must_use]
    pub fn is_credentialed(self) -> bool {
        matches!(self, Self::MermaidChart | Self::Custom)
    }
}

impl fmt::Display for DiagramProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mermaid.ink" => Ok(Self::MermaidInk),
            "mermaidchart" => Ok(Self::MermaidChart),
            "custom" => Ok(Self::Custom),
            "kroki" => Ok(Self::Kroki),
            other => Err(ConfigError::Validation(format!(
                "unknown diagram provider '{other}' (valid: mermaid.ink, mermaidchart, custom, kroki)"
            ))),
        }
    }
}

/// Mermaid color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Neutral,
    Default,
    Dark,
    Forest,
    Base,
}

impl Theme {
    /// Settings value for this theme.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Forest => "forest",
            Self::Base => "base",
        }
    }

    /// Neutral and default themes leave diagram source untouched.
    #[must_use]
    pub fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral | Self::Default)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neutral" => Ok(Self::Neutral),
            "default" => Ok(Self::Default),
            "dark" => Ok(Self::Dark),
            "forest" => Ok(Self::Forest),
            "base" => Ok(Self::Base),
            other => Err(ConfigError::Validation(format!(
                "unknown theme '{other}' (valid: neutral, default, dark, forest, base)"
            ))),
        }
    }
}

/// What happens to diagram source after a successful render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeRetention {
    /// Source stored as the image's alt description.
    #[default]
    Alt,
    /// Truncated source preview in a caption paragraph.
    Caption,
    /// Full source attached as a document comment (falls back to `Alt`).
    Comment,
    /// Source discarded.
    None,
}

impl CodeRetention {
    /// Settings value for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Caption => "caption",
            Self::Comment => "comment",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CodeRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeRetention {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alt" => Ok(Self::Alt),
            "caption" => Ok(Self::Caption),
            "comment" => Ok(Self::Comment),
            "none" => Ok(Self::None),
            other => Err(ConfigError::Validation(format!(
                "unknown code retention mode '{other}' (valid: alt, caption, comment, none)"
            ))),
        }
    }
}

/// Resolved provider configuration (immutable once built).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Selected diagram provider.
    pub provider: DiagramProvider,
    /// Bearer token (`mermaidchart`) or endpoint URL (`custom`).
    pub api_key: String,
    /// Mermaid theme.
    pub theme: Theme,
    /// Code retention mode for rendered diagrams.
    pub code_retention: CodeRetention,
    /// Kroki server URL.
    pub kroki_url: String,
    /// Global HTTP timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: DiagramProvider::default(),
            api_key: String::new(),
            theme: Theme::default(),
            code_retention: CodeRetention::default(),
            kroki_url: DEFAULT_KROKI_URL.to_owned(),
            timeout: None,
        }
    }
}

impl ProviderConfig {
    /// Credential for the selected provider, if it is credentialed and one is set.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        if self.provider.is_credentialed() && !self.api_key.is_empty() {
            Some(&self.api_key)
        } else {
            None
        }
    }

    /// Parse settings from TOML text.
    ///
    /// Expands environment variables and validates the result.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(content)?;
        let config = file.diagrams.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize settings to TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if TOML serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = SettingsFile {
            diagrams: DiagramsConfigRaw {
                provider: Some(self.provider),
                api_key: Some(self.api_key.clone()),
                theme: Some(self.theme),
                code_retention: Some(self.code_retention),
                kroki_url: (self.kroki_url != DEFAULT_KROKI_URL).then(|| self.kroki_url.clone()),
                timeout_secs: self.timeout.map(|t| t.as_secs()),
            },
        };
        Ok(toml::to_string(&file)?)
    }

    /// Apply CLI settings to the configuration.
    pub fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(provider) = settings.provider {
            self.provider = provider;
        }
        if let Some(api_key) = &settings.api_key {
            self.api_key.clone_from(api_key);
        }
        if let Some(theme) = settings.theme {
            self.theme = theme;
        }
        if let Some(code_retention) = settings.code_retention {
            self.code_retention = code_retention;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.kroki_url.clone_from(kroki_url);
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.kroki_url, "diagrams.kroki_url")?;
        require_http_url(&self.kroki_url, "diagrams.kroki_url")?;

        // An empty custom URL only removes the provider from the chain
        if self.provider == DiagramProvider::Custom && !self.api_key.is_empty() {
            require_http_url(&self.api_key, "diagrams.api_key")?;
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }
}

/// CLI settings that override settings file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override diagram provider.
    pub provider: Option<DiagramProvider>,
    /// Override API key or custom URL.
    pub api_key: Option<String>,
    /// Override theme.
    pub theme: Option<Theme>,
    /// Override code retention mode.
    pub code_retention: Option<CodeRetention>,
    /// Override Kroki URL.
    pub kroki_url: Option<String>,
}

impl CliSettings {
    /// Whether no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.api_key.is_none()
            && self.theme.is_none()
            && self.code_retention.is_none()
            && self.kroki_url.is_none()
    }
}

/// Settings file layout.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct SettingsFile {
    diagrams: DiagramsConfigRaw,
}

impl SettingsFile {
    /// Apply overrides to settings file text without expanding it.
    ///
    /// Fields not overridden keep their raw text, including `${VAR}`
    /// references. Returns the new file text and the resolved settings.
    fn update(
        content: Option<&str>,
        overrides: &CliSettings,
    ) -> Result<(String, ProviderConfig), ConfigError> {
        let mut file: Self = match content {
            Some(content) => toml::from_str(content)?,
            None => Self::default(),
        };
        file.diagrams.apply_cli_settings(overrides);

        let config = file.diagrams.clone().resolve()?;
        config.validate()?;
        Ok((toml::to_string(&file)?, config))
    }
}

/// Raw `[diagrams]` table as parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
struct DiagramsConfigRaw {
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<DiagramProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_retention: Option<CodeRetention>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kroki_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl DiagramsConfigRaw {
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(provider) = settings.provider {
            self.provider = Some(provider);
        }
        if let Some(api_key) = &settings.api_key {
            self.api_key = Some(api_key.clone());
        }
        if let Some(theme) = settings.theme {
            self.theme = Some(theme);
        }
        if let Some(code_retention) = settings.code_retention {
            self.code_retention = Some(code_retention);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.kroki_url = Some(kroki_url.clone());
        }
    }

    /// Expand environment variables and fill in defaults.
    fn resolve(self) -> Result<ProviderConfig, ConfigError> {
        let api_key = match self.api_key {
            Some(key) => expand::expand_env(&key, "diagrams.api_key")?,
            None => String::new(),
        };
        let kroki_url = match self.kroki_url {
            Some(url) => expand::expand_env(&url, "diagrams.kroki_url")?,
            None => DEFAULT_KROKI_URL.to_owned(),
        };

        Ok(ProviderConfig {
            provider: self.provider.unwrap_or_default(),
            api_key,
            theme: self.theme.unwrap_or_default(),
            code_retention: self.code_retention.unwrap_or_default(),
            kroki_url,
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.api_key`").
        field: String,
        /// Error message (e.g., "${`MERMAIDCHART_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}
