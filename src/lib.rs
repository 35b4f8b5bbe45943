//! # Humanized Input
//!
//! Keyboard and mouse input synthesis with human-like timing, written in Rust.
//!
//! The crate sits on top of a low-level driver that injects discrete events
//! into the OS input pipeline. It picks one keyboard and one mouse to speak
//! through, jitters every duration it waits for, moves the pointer along
//! smooth curves and keeps track of which keys are held down.
//!
//! ## Features
//!
//! - **Device Arbitration**: Select keyboard and mouse by hardware id keyword with fallback
//! - **Humanized Timing**: Bounded random jitter on every press duration and interval
//! - **Curved Motion**: Cubic Bézier pointer paths split into relative steps
//! - **Held-State Tracking**: Idempotent hold/release with cancellable auto-release
//! - **Text Entry**: Per-character key presses with automatic shift handling
//! - **Flexible Configuration**: TOML/JSON files, environment variables, CLI arguments
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use humanized_input::prelude::*;
//! use humanized_input::device::{DeviceHandle, DeviceInfo};
//!
//! let devices = StaticEnumerator::new(vec![
//!     DeviceInfo::new(DeviceHandle::new(1, DeviceClass::Keyboard), "HID\\VID_046D&PID_C31C"),
//!     DeviceInfo::new(DeviceHandle::new(11, DeviceClass::Mouse), "HID\\VID_046D&PID_C077"),
//! ]);
//! let sink = RecordingSink::new();
//!
//! let synth = InputSynthesizer::builder(Arc::new(sink.clone()), Arc::new(devices))
//!     .sleeper(Arc::new(RecordingSleeper::new()))
//!     .build();
//!
//! assert_eq!(synth.capture_input_devices("", "").unwrap(), CaptureOutcome::Success);
//! synth.write("Hi").unwrap();
//! synth.move_mouse_to(Point::new(400, 300), Some(&CurveParams::default())).unwrap();
//! ```
//!
//! ## Module Overview
//!
//! - [`input`]: Synthesizer, timing, curves, keys and buttons
//! - [`device`]: Event sink / enumerator boundary and device arbitration
//! - [`global`]: Process-wide synthesizer behind free functions
//! - [`config`]: Configuration loading and management
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   InputSynthesizer                       │
//! │   press · hold · release · write · scroll · move_mouse   │
//! ├──────────────┬──────────────┬──────────────┬─────────────┤
//! │   Jitter     │ MotionPath   │ KeyState     │ Device      │
//! │   (timing)   │ (bezier)     │ Tracker      │ Arbitrator  │
//! └──────┬───────┴──────────────┴──────────────┴──────┬──────┘
//!        │                                            │
//!   ┌────┴────┐                              ┌────────┴───────┐
//!   │ Sleeper │                              │ EventSink /    │
//!   └─────────┘                              │ DeviceEnumerator│
//!                                            └────────────────┘
//! ```
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`HUMANIZED_INPUT_*`)
//! 4. CLI arguments
//!
//! See [`config::Settings`] for all available options.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Event sink, device enumeration and device arbitration.
pub mod device;

/// Humanized keyboard and mouse synthesis.
pub mod input;

/// Process-wide synthesizer exposed as free functions.
pub mod global;

/// Configuration management for loading settings from files, env, and CLI.
pub mod config;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

// Device types
pub use device::{
    CaptureOutcome, CapturedDevices, DeviceArbitrator, DeviceClass, DeviceEnumerator,
    DeviceHandle, DeviceInfo, EventSink, SinkError, Sleeper, ThreadSleeper,
};

// Input types
pub use input::{
    generate_path, CurveParams, Easing, InputError, InputId, InputResult, InputSynthesizer,
    KeyTranslator, MotionPath, MouseButton, NamedKey, Point, ScanCode, ScrollDirection,
    TimingConfig,
};

// Config types
pub use config::{CliArgs, ConfigError, Settings};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use humanized_input::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{CliArgs, Settings};
    pub use crate::device::{
        CaptureOutcome, DeviceClass, EventSink, RecordingSink, RecordingSleeper,
        StaticEnumerator,
    };
    pub use crate::input::{
        CurveParams, InputId, InputSynthesizer, MouseButton, NamedKey, Point, ScrollDirection,
        TimingConfig,
    };
    pub use crate::{FULL_VERSION, NAME, VERSION};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
        assert!(FULL_VERSION.contains(VERSION));
        assert!(FULL_VERSION.contains(NAME));
    }

    #[test]
    fn test_prelude_imports() {
        // Verify prelude types are accessible
        use crate::prelude::*;
        let _ = VERSION;
        let _ = NAME;
        let _ = TimingConfig::default();
    }
}
