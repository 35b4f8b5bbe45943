//! Configuration module for humanized-input.
//!
//! This module provides configuration management for the synthesizer, including:
//! - Loading settings from files (TOML/JSON)
//! - Environment variable overrides
//! - CLI argument overrides
//! - Validation and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use humanized_input::config::Settings;
//!
//! // Load from a specific file
//! let settings = Settings::from_file("humanized-input.toml").unwrap();
//!
//! // Override with environment variables
//! let settings = settings.merge_with_env();
//! ```

mod settings;

pub use settings::{CliArgs, ConfigError, Settings, ENV_PREFIX};
