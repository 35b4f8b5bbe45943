//! Input synthesis module for humanized-input
//!
//! This module turns high level requests (press a key, type a string, move
//! the pointer somewhere) into discrete driver events with human-like timing.
//!
//! # Submodules
//!
//! - [`timing`] - Jittered durations and the timing configuration
//! - [`bezier`] - Cubic Bézier paths split into relative motion steps
//! - [`keyboard`] - Scan codes, named keys and text translation
//! - [`mouse`] - Mouse buttons and scroll directions
//! - [`state`] - Held/released tracking per key or button
//! - [`synthesizer`] - The public press/hold/release/write/scroll/move operations
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use humanized_input::device::{
//!     DeviceClass, DeviceHandle, DeviceInfo, RecordingSink, RecordingSleeper, StaticEnumerator,
//! };
//! use humanized_input::input::{InputId, InputSynthesizer, MouseButton, TimingConfig};
//!
//! let enumerator = StaticEnumerator::new(vec![
//!     DeviceInfo::new(DeviceHandle::new(1, DeviceClass::Keyboard), "HID\\KBD"),
//!     DeviceInfo::new(DeviceHandle::new(11, DeviceClass::Mouse), "HID\\MOUSE"),
//! ]);
//! let sink = RecordingSink::new();
//! let synth = InputSynthesizer::builder(Arc::new(sink.clone()), Arc::new(enumerator))
//!     .sleeper(Arc::new(RecordingSleeper::new()))
//!     .timing(TimingConfig {
//!         auto_disable_mouse_accel: false,
//!         ..TimingConfig::exact()
//!     })
//!     .build();
//!
//! assert!(synth.capture_input_devices("", "").unwrap().is_success());
//! synth.press(InputId::Button(MouseButton::Left), 2, None, None).unwrap();
//! assert_eq!(sink.events().len(), 4);
//! ```

pub mod bezier;
pub mod keyboard;
pub mod mouse;
pub mod state;
pub mod synthesizer;
pub mod timing;

// Re-export commonly used types for convenience
pub use bezier::{generate_path, BezierCurve, CurveParams, Easing, MotionPath, Point};
pub use keyboard::{KeyStroke, KeyTranslator, NamedKey, ScanCode, UsLayout};
pub use mouse::{MouseButton, ScrollDirection};
pub use state::KeyStateTracker;
pub use synthesizer::{InputSynthesizer, SynthesizerBuilder};
pub use timing::{Jitter, TimingConfig};

use crate::device::{DeviceClass, SinkError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur during input synthesis
#[derive(Debug, Error)]
pub enum InputError {
    /// The event sink failed; the original error is kept intact
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// No device of the required class has been captured yet
    #[error("no {class} captured, call capture_input_devices first")]
    DeviceNotCaptured { class: DeviceClass },

    /// An input name could not be parsed
    #[error("Invalid key: '{key}'")]
    InvalidKey { key: String },

    /// The process-wide synthesizer has not been installed
    #[error("no input synthesizer installed")]
    NotInstalled,
}

/// Identifies one key or mouse button
///
/// Two identifiers are equal only if both the kind and the code match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "lowercase")]
pub enum InputId {
    Key(ScanCode),
    Button(MouseButton),
}

impl InputId {
    /// The device class that emits this input
    pub fn device_class(&self) -> DeviceClass {
        match self {
            InputId::Key(_) => DeviceClass::Keyboard,
            InputId::Button(_) => DeviceClass::Mouse,
        }
    }
}

impl From<ScanCode> for InputId {
    fn from(code: ScanCode) -> Self {
        InputId::Key(code)
    }
}

impl From<NamedKey> for InputId {
    fn from(key: NamedKey) -> Self {
        InputId::Key(key.scan_code())
    }
}

impl From<MouseButton> for InputId {
    fn from(button: MouseButton) -> Self {
        InputId::Button(button)
    }
}

impl std::fmt::Display for InputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputId::Key(code) => write!(f, "key:{}", code),
            InputId::Button(button) => write!(f, "mouse:{}", button),
        }
    }
}

impl FromStr for InputId {
    type Err = InputError;

    /// Accepts `mouse:<button>`, a named key (`enter`, `f5`, `shift`, ...) or
    /// a single character resolved through the US layout.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(button) = s.strip_prefix("mouse:") {
            return button.parse::<MouseButton>().map(InputId::Button);
        }

        if let Some(key) = NamedKey::from_name(s) {
            return Ok(key.into());
        }

        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(stroke) = UsLayout.translate(c) {
                return Ok(InputId::Key(stroke.code));
            }
        }

        Err(InputError::InvalidKey { key: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InputError::InvalidKey {
            key: "INVALID".to_string(),
        };
        assert!(err.to_string().contains("INVALID"));

        let err = InputError::DeviceNotCaptured {
            class: DeviceClass::Mouse,
        };
        assert!(err.to_string().contains("mouse"));
    }

    #[test]
    fn test_sink_error_is_transparent() {
        let err: InputError = SinkError::Rejected("bad packet".to_string()).into();
        assert_eq!(err.to_string(), "event rejected by transport: bad packet");
        assert!(matches!(err, InputError::Sink(SinkError::Rejected(_))));
    }

    #[test]
    fn test_input_id_equality() {
        let a = InputId::Key(ScanCode(0x1E));
        assert_eq!(a, InputId::Key(ScanCode(0x1E)));
        assert_ne!(a, InputId::Key(ScanCode(0x30)));
        assert_ne!(InputId::Button(MouseButton::Left), InputId::Key(ScanCode(0x01)));
    }

    #[test]
    fn test_input_id_parsing() {
        assert_eq!(
            "mouse:right".parse::<InputId>().unwrap(),
            InputId::Button(MouseButton::Right)
        );
        assert_eq!("enter".parse::<InputId>().unwrap(), InputId::from(NamedKey::Enter));
        assert_eq!("a".parse::<InputId>().unwrap(), InputId::Key(ScanCode(0x1E)));
        // Uppercase resolves to the same physical key
        assert_eq!("A".parse::<InputId>().unwrap(), InputId::Key(ScanCode(0x1E)));
        assert!("mouse:thumb".parse::<InputId>().is_err());
        assert!("not-a-key".parse::<InputId>().is_err());
    }

    #[test]
    fn test_device_class() {
        assert_eq!(InputId::Key(ScanCode(0x1E)).device_class(), DeviceClass::Keyboard);
        assert_eq!(InputId::Button(MouseButton::Middle).device_class(), DeviceClass::Mouse);
    }
}
