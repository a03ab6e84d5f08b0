//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::query::{DslOptions, ExecuteOptions, Operator, ParseOptions, Schema};
use crate::query::{FieldType, ValueTyping};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query parser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Reject fields missing from `fields`
    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_phrase_delimiter")]
    pub phrase_delimiter: char,

    #[serde(default)]
    pub value_typing: ValueTyping,

    /// Permissible operators; empty allows all
    #[serde(default)]
    pub operators: Vec<Operator>,

    /// Declared field types
    #[serde(default)]
    pub fields: HashMap<String, FieldType>,
}

fn default_phrase_delimiter() -> char {
    '"'
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: false,
            phrase_delimiter: default_phrase_delimiter(),
            value_typing: ValueTyping::default(),
            operators: Vec::new(),
            fields: HashMap::new(),
        }
    }
}

impl ParserConfig {
    pub fn to_parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .phrase_delimiter(self.phrase_delimiter)
            .value_typing(self.value_typing);

        if self.strict || !self.fields.is_empty() {
            options = options.schema(Schema {
                strict: self.strict,
                fields: self.fields.clone(),
            });
        }
        if !self.operators.is_empty() {
            options = options.operators(&self.operators);
        }
        options
    }
}

/// Execution and compilation configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionConfig {
    /// Fields searched by free-text terms; empty searches all of them
    #[serde(default)]
    pub default_fields: Vec<String>,

    #[serde(default)]
    pub explain: bool,
}

impl ExecutionConfig {
    pub fn to_execute_options(&self) -> ExecuteOptions {
        ExecuteOptions::new()
            .default_fields(self.default_fields.iter().cloned())
            .explain(self.explain)
    }

    pub fn to_dsl_options(&self) -> DslOptions {
        DslOptions::new().default_fields(self.default_fields.iter().cloned())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("searchql").join("config.toml")),
            Some(PathBuf::from("/etc/searchql/config.toml")),
            Some(PathBuf::from("./searchql.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Parser overrides
        if let Some(strict) = var("SEARCHQL_STRICT") {
            match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.parser.strict = true,
                "0" | "false" | "no" => self.parser.strict = false,
                other => tracing::warn!("Ignoring SEARCHQL_STRICT={}", other),
            }
        }
        if let Some(delimiter) = var("SEARCHQL_PHRASE_DELIMITER") {
            let mut chars = delimiter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => self.parser.phrase_delimiter = c,
                _ => tracing::warn!("Ignoring SEARCHQL_PHRASE_DELIMITER={}", delimiter),
            }
        }
        if let Some(typing) = var("SEARCHQL_VALUE_TYPING") {
            match ValueTyping::from_str(&typing) {
                Some(t) => self.parser.value_typing = t,
                None => tracing::warn!("Ignoring SEARCHQL_VALUE_TYPING={}", typing),
            }
        }

        // Execution overrides
        if let Some(fields) = var("SEARCHQL_DEFAULT_FIELDS") {
            self.execution.default_fields = fields
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }

        // Logging overrides
        if let Some(level) = var("SEARCHQL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SEARCHQL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# searchql Configuration
#
# Environment variables override these settings:
# - SEARCHQL_STRICT
# - SEARCHQL_PHRASE_DELIMITER
# - SEARCHQL_VALUE_TYPING
# - SEARCHQL_DEFAULT_FIELDS (comma separated)
# - SEARCHQL_LOG_LEVEL
# - SEARCHQL_LOG_FORMAT

[parser]
# Reject fields that are not declared in [parser.fields]
strict = false

# Character that delimits phrases
phrase_delimiter = '"'

# How undeclared field values are typed: infer (numbers, true/false) or string
value_typing = "infer"

# Permissible operators: eq, gt, gte, lt, lte (empty allows all)
operators = []

[parser.fields]
# Field types: string, number, boolean, date
# created = "date"
# price = "number"

[execution]
# Fields searched by free-text terms (empty searches every string field)
default_fields = []

# Attach a per-clause trail to each match
explain = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
