//! Application configuration
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/oneiro/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! The Gemini API key is deliberately env-first (GEMINI_API_KEY) so it
//! never has to live in a file, but the config file accepts one too.

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key; absent means analysis fails fast without a network call
    pub api_key: Option<String>,

    /// Base URL of the generative-language API
    pub api_base: String,

    /// Model used for the structured dream analysis
    pub text_model: String,

    /// Model used for the best-effort illustration
    pub image_model: String,

    /// Path of the single JSON slot holding the history
    pub history_path: PathBuf,

    /// Directory where exported illustrations are written
    pub illustration_dir: PathBuf,

    /// Demo mode: canned analyzer, no network, no key needed
    pub demo_mode: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            history_path: default_data_dir().join("history.json"),
            illustration_dir: default_data_dir().join("illustrations"),
            demo_mode: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Data directory: ~/.local/share/oneiro (or platform equivalent)
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oneiro")
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Log file rotation strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LogRotation {
    /// Rotate log files hourly
    Hourly,
    /// Rotate log files daily (default)
    #[default]
    Daily,
    /// Never rotate - single log file
    Never,
}

impl LogRotation {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Enable file logging (in addition to the TUI buffer or stdout)
    pub file_enabled: bool,
    /// Directory for log files
    pub file_dir: PathBuf,
    /// Log file rotation strategy
    pub file_rotation: LogRotation,
    /// Prefix for log file names
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false, // Opt-in feature
            file_dir: default_data_dir().join("logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "oneiro".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub history_path: Option<String>,
    pub illustration_dir: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

/// Logging settings as loaded from the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            level: file.level.unwrap_or(defaults.level),
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.map(PathBuf::from).unwrap_or(defaults.file_dir),
            file_rotation: file
                .file_rotation
                .map(|s| LogRotation::parse(&s))
                .unwrap_or(defaults.file_rotation),
            file_prefix: file.file_prefix.unwrap_or(defaults.file_prefix),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/oneiro/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("oneiro").join("config.toml"))
    }

    /// Create the config file with defaults if it doesn't exist.
    /// Called during startup to help users discover configuration options.
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - the config file is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load the file config if it exists.
    ///
    /// A config file that exists but cannot be parsed fails fast with a
    /// clear message instead of silently falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: failed to parse config file {}", path.display());
                    eprintln!("  {e}");
                    eprintln!("  To reset, run: oneiro config --reset");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("Error: cannot read config file {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::merge(file)
    }

    /// Merge a file config with environment overrides and defaults.
    /// Split from from_env so tests can feed a FileConfig directly.
    fn merge(file: FileConfig) -> Self {
        let defaults = Self::default();

        // API key: env > file (never defaulted)
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.api_key);

        let api_base = std::env::var("ONEIRO_API_BASE")
            .ok()
            .or(file.api_base)
            .unwrap_or(defaults.api_base);

        let text_model = file.text_model.unwrap_or(defaults.text_model);
        let image_model = file.image_model.unwrap_or(defaults.image_model);

        // History slot: env > file > default
        let history_path = std::env::var("ONEIRO_HISTORY")
            .ok()
            .map(PathBuf::from)
            .or(file.history_path.map(PathBuf::from))
            .unwrap_or(defaults.history_path);

        let illustration_dir = file
            .illustration_dir
            .map(PathBuf::from)
            .unwrap_or(defaults.illustration_dir);

        // Demo mode: env only (runtime flag)
        let demo_mode = std::env::var("ONEIRO_DEMO")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            api_key,
            api_base,
            text_model,
            image_model,
            history_path,
            illustration_dir,
            demo_mode,
            logging,
        }
    }

    /// Render the config file template. Single source of truth for both
    /// ensure_config_exists and `oneiro config --reset`.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# oneiro configuration
# Values here are overridden by environment variables:
#   GEMINI_API_KEY, ONEIRO_API_BASE, ONEIRO_HISTORY, ONEIRO_DEMO

# api_key = "..."                 # prefer the GEMINI_API_KEY env var
api_base = "{api_base}"
text_model = "{text_model}"
image_model = "{image_model}"
history_path = "{history_path}"
illustration_dir = "{illustration_dir}"

[logging]
level = "{level}"                  # trace, debug, info, warn, error
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_rotation = "{file_rotation}"  # hourly, daily, never
file_prefix = "{file_prefix}"
"#,
            api_base = self.api_base,
            text_model = self.text_model,
            image_model = self.image_model,
            history_path = self.history_path.display(),
            illustration_dir = self.illustration_dir.display(),
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_rotation = self.logging.file_rotation.as_str(),
            file_prefix = self.logging.file_prefix,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_parses_known_values() {
        assert_eq!(LogRotation::parse("hourly"), LogRotation::Hourly);
        assert_eq!(LogRotation::parse("Daily"), LogRotation::Daily);
        assert_eq!(LogRotation::parse("never"), LogRotation::Never);
        // Unknown values fall back to daily
        assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
    }

    #[test]
    fn file_config_fills_missing_sections() {
        let file: FileConfig = toml::from_str(r#"text_model = "gemini-x""#).unwrap();
        assert_eq!(file.text_model.as_deref(), Some("gemini-x"));
        assert!(file.logging.is_none());

        let logging = LoggingConfig::from_file(file.logging);
        assert_eq!(logging.level, "info");
        assert!(!logging.file_enabled);
    }

    #[test]
    fn logging_section_overrides_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            [logging]
            level = "debug"
            file_enabled = true
            file_rotation = "hourly"
            "#,
        )
        .unwrap();

        let logging = LoggingConfig::from_file(file.logging);
        assert_eq!(logging.level, "debug");
        assert!(logging.file_enabled);
        assert_eq!(logging.file_rotation, LogRotation::Hourly);
        // Untouched fields keep their defaults
        assert_eq!(logging.file_prefix, "oneiro");
    }

    #[test]
    fn template_round_trips_through_the_file_layer() {
        let template = Config::default().to_toml();
        let parsed: FileConfig = toml::from_str(&template).expect("template must stay parseable");
        assert!(parsed.api_base.is_some());
        assert!(parsed.logging.is_some());
    }
}
