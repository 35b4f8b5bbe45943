//! Settings and configuration management.
//!
//! Settings come from several sources, applied with the following precedence:
//! defaults, then a TOML or JSON file, then `HUMANIZED_INPUT_*` environment
//! variables, then command line arguments.

use crate::input::{CurveParams, TimingConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every environment variable read by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "HUMANIZED_INPUT_";

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Complete settings for a synthesizer instance.
///
/// # Example
///
/// ```rust
/// use humanized_input::config::Settings;
///
/// let settings = Settings::default()
///     .with_keyboard_filter("Logitech")
///     .with_randomize(false);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Timing of presses, intervals and jitter.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Substring favoured when picking the keyboard.
    #[serde(default)]
    pub keyboard_filter: String,

    /// Substring favoured when picking the mouse.
    #[serde(default)]
    pub mouse_filter: String,

    /// Curve used for pointer movement; straight lines if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<CurveParams>,
}

impl Settings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a configuration file.
    ///
    /// Supports both TOML and JSON formats, detected by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_format(path).as_str() {
            "toml" => Ok(toml::from_str(&content)?),
            "json" => Ok(serde_json::from_str(&content)?),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves settings to a configuration file.
    ///
    /// The format is determined by the file extension.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let content = match file_format(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads defaults with environment variable overrides applied.
    ///
    /// Recognised variables:
    /// - `HUMANIZED_INPUT_PRESS_DURATION_MS`
    /// - `HUMANIZED_INPUT_RANDOMIZE`
    /// - `HUMANIZED_INPUT_RAND_LOWER` / `HUMANIZED_INPUT_RAND_UPPER`
    /// - `HUMANIZED_INPUT_AUTO_DISABLE_MOUSE_ACCEL`
    /// - `HUMANIZED_INPUT_TYPING_INTERVAL_MS`
    /// - `HUMANIZED_INPUT_KEYBOARD_FILTER` / `HUMANIZED_INPUT_MOUSE_FILTER`
    ///
    /// Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self::default().merge_with_env()
    }

    /// Applies environment variable overrides to these settings.
    pub fn merge_with_env(self) -> Self {
        self.merge_with_vars(|name| env::var(format!("{}{}", ENV_PREFIX, name)).ok())
    }

    /// Applies overrides from a lookup keyed by the name after the prefix.
    pub fn merge_with_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |val: String| val.to_lowercase() == "true" || val == "1";

        if let Some(ms) = lookup("PRESS_DURATION_MS").and_then(|v| v.parse().ok()) {
            self.timing.default_press_duration_ms = ms;
        }

        if let Some(val) = lookup("RANDOMIZE") {
            self.timing.randomize_durations = flag(val);
        }

        if let Some(lower) = lookup("RAND_LOWER").and_then(|v| v.parse().ok()) {
            self.timing.rand_factor_bounds.0 = lower;
        }

        if let Some(upper) = lookup("RAND_UPPER").and_then(|v| v.parse().ok()) {
            self.timing.rand_factor_bounds.1 = upper;
        }

        if let Some(val) = lookup("AUTO_DISABLE_MOUSE_ACCEL") {
            self.timing.auto_disable_mouse_accel = flag(val);
        }

        if let Some(ms) = lookup("TYPING_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.timing.typing_interval_ms = ms;
        }

        if let Some(filter) = lookup("KEYBOARD_FILTER") {
            self.keyboard_filter = filter;
        }

        if let Some(filter) = lookup("MOUSE_FILTER") {
            self.mouse_filter = filter;
        }

        self
    }

    /// Merges settings with CLI arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use humanized_input::config::{CliArgs, Settings};
    ///
    /// let args = CliArgs {
    ///     randomize: Some(false),
    ///     press_duration_ms: Some(20),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = Settings::default().merge_with_args(&args);
    /// assert!(!settings.timing.randomize_durations);
    /// ```
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref filter) = args.keyboard_filter {
            self.keyboard_filter = filter.clone();
        }
        if let Some(ref filter) = args.mouse_filter {
            self.mouse_filter = filter.clone();
        }
        if let Some(randomize) = args.randomize {
            self.timing.randomize_durations = randomize;
        }
        if let Some(ms) = args.press_duration_ms {
            self.timing.default_press_duration_ms = ms;
        }
        if let Some(ms) = args.typing_interval_ms {
            self.timing.typing_interval_ms = ms;
        }
        if let Some(bounds) = args.rand_factor_bounds {
            self.timing.rand_factor_bounds = bounds;
        }
        if let Some(curved) = args.curved {
            self.curve = if curved {
                Some(self.curve.take().unwrap_or_default())
            } else {
                None
            };
        }

        self
    }

    /// Validates all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any setting is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lower, upper) = self.timing.rand_factor_bounds;
        if !lower.is_finite() || !upper.is_finite() {
            return Err(ConfigError::ValidationError(
                "Jitter bounds must be finite numbers".to_string(),
            ));
        }
        if lower < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Lower jitter bound cannot be negative: {}",
                lower
            )));
        }
        if lower > upper {
            return Err(ConfigError::ValidationError(format!(
                "Lower jitter bound {} exceeds upper bound {}",
                lower, upper
            )));
        }

        if let Some(ref curve) = self.curve {
            if curve.step_granularity.is_nan() || curve.step_granularity <= 0.0 {
                return Err(ConfigError::ValidationError(
                    "Curve step granularity must be positive".to_string(),
                ));
            }
            if curve.min_steps > curve.max_steps {
                return Err(ConfigError::ValidationError(format!(
                    "Curve min_steps {} exceeds max_steps {}",
                    curve.min_steps, curve.max_steps
                )));
            }
        }

        Ok(())
    }

    // Builder-style methods for convenient configuration

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_keyboard_filter(mut self, filter: impl Into<String>) -> Self {
        self.keyboard_filter = filter.into();
        self
    }

    pub fn with_mouse_filter(mut self, filter: impl Into<String>) -> Self {
        self.mouse_filter = filter.into();
        self
    }

    /// Enables or disables duration randomization.
    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.timing.randomize_durations = randomize;
        self
    }

    pub fn with_curve(mut self, curve: CurveParams) -> Self {
        self.curve = Some(curve);
        self
    }
}

fn file_format(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Command line overrides.
///
/// All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
    pub keyboard_filter: Option<String>,
    pub mouse_filter: Option<String>,
    /// Randomize durations.
    pub randomize: Option<bool>,
    /// Default press duration in milliseconds.
    pub press_duration_ms: Option<u64>,
    /// Pause between typed characters in milliseconds.
    pub typing_interval_ms: Option<u64>,
    pub rand_factor_bounds: Option<(f64, f64)>,
    /// Move along a curve (`true`) or in a straight line (`false`).
    pub curved: Option<bool>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final settings by applying the full configuration chain.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use humanized_input::config::CliArgs;
    ///
    /// let args = CliArgs {
    ///     config_file: Some("humanized-input.toml".into()),
    ///     randomize: Some(false),
    ///     ..Default::default()
    /// };
    ///
    /// let settings = args.load_settings().unwrap();
    /// ```
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = if let Some(ref config_file) = self.config_file {
            Settings::from_file(config_file)?
        } else {
            Settings::default()
        };

        settings = settings.merge_with_env();
        settings = settings.merge_with_args(self);
        settings.validate()?;

        Ok(settings)
    }
}
