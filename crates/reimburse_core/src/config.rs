//! Engine configuration
//!
//! Configuration is read from a TOML file and then overridden from the
//! environment:
//!
//! | Variable                    | Field                          |
//! |-----------------------------|--------------------------------|
//! | `REIMBURSE_MODEL_PATH`      | `model.path`                   |
//! | `REIMBURSE_MODEL_HASH`      | `model.expected_hash`          |
//! | `REIMBURSE_ROUNDING`        | `evaluation.rounding`          |
//! | `REIMBURSE_VALIDATE_INPUTS` | `evaluation.validate_inputs`   |
//! | `REIMBURSE_LOG_LEVEL`       | `logging.level`                |
//! | `REIMBURSE_LOG_FORMAT`      | `logging.format`               |
//!
//! Unparseable override values are errors, never silently ignored.

use crate::errors::{Result, ScoringError};
use crate::rounding::RoundingMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

/// Which tree to load
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model document; the embedded tree when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Pinned BLAKE3 hash of the canonical model JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_hash: Option<String>,
}

/// Evaluation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Overrides the rounding convention stored in the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding: Option<RoundingMode>,
    /// Reject non-finite and negative inputs before deriving features
    pub validate_inputs: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            rounding: None,
            validate_inputs: true,
        }
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

impl LogFormat {
    pub const fn name(self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogFormat {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ScoringError::Config(format!(
                "unknown log format `{other}` (expected full, compact or pretty)"
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ScoringError::Config(format!("failed to parse config: {e}")))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ScoringError::Config(format!("failed to serialize config: {e}")))
    }

    /// Apply `REIMBURSE_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `REIMBURSE_*` overrides from an arbitrary variable source
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("REIMBURSE_MODEL_PATH") {
            debug!("Override model.path = {}", val);
            self.model.path = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("REIMBURSE_MODEL_HASH") {
            debug!("Override model.expected_hash = {}", val);
            self.model.expected_hash = Some(val);
        }

        if let Some(val) = lookup("REIMBURSE_ROUNDING") {
            self.evaluation.rounding = Some(val.trim().parse()?);
        }

        if let Some(val) = lookup("REIMBURSE_VALIDATE_INPUTS") {
            self.evaluation.validate_inputs = parse_bool("REIMBURSE_VALIDATE_INPUTS", &val)?;
        }

        if let Some(val) = lookup("REIMBURSE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Some(val) = lookup("REIMBURSE_LOG_FORMAT") {
            self.logging.format = val.trim().parse()?;
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ScoringError::Config(format!(
            "{key} must be a boolean, got `{other}`"
        ))),
    }
}
