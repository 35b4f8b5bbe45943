//! Device boundary for humanized-input
//!
//! This module defines the collaborators that sit outside the synthesis core:
//! the event sink that delivers events into the OS input pipeline, the
//! enumerator that lists connected controllers with their hardware ids, and
//! the blocking wait primitive used between events.
//!
//! # Submodules
//!
//! - [`arbitrator`] - Selects one canonical keyboard and mouse handle
//! - [`mock`] - Recording implementations for tests and the trace backend

pub mod arbitrator;
pub mod mock;

pub use arbitrator::{CaptureOutcome, CapturedDevices, DeviceArbitrator};
pub use mock::{RecordingSink, RecordingSleeper, SinkEvent, StaticEnumerator};

use crate::input::bezier::Point;
use crate::input::mouse::ScrollDirection;
use crate::input::InputId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Class of a physical input controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Keyboard,
    Mouse,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Keyboard => write!(f, "keyboard"),
            DeviceClass::Mouse => write!(f, "mouse"),
        }
    }
}

/// Opaque reference to one physical input controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle {
    /// Transport-specific device number
    pub id: u32,
    /// Which kind of controller this handle refers to
    pub class: DeviceClass,
}

impl DeviceHandle {
    pub fn new(id: u32, class: DeviceClass) -> Self {
        Self { id, class }
    }
}

impl std::fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.class, self.id)
    }
}

/// One enumerated device: its handle and hardware identifier string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub handle: DeviceHandle,
    pub hardware_id: String,
}

impl DeviceInfo {
    pub fn new(handle: DeviceHandle, hardware_id: impl Into<String>) -> Self {
        Self {
            handle,
            hardware_id: hardware_id.into(),
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.handle.class
    }
}

/// Error raised by an [`EventSink`] implementation
///
/// The synthesizer never inspects or retries these; they reach the caller
/// through [`InputError::Sink`](crate::input::InputError::Sink) as-is.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The transport (driver, socket, ...) is not available
    #[error("input transport unavailable: {0}")]
    Unavailable(String),

    /// The transport rejected the event
    #[error("event rejected by transport: {0}")]
    Rejected(String),

    /// Any other transport failure
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Delivers discrete input events into the OS input pipeline
///
/// Implementations must deliver events synchronously and in call order.
pub trait EventSink: Send + Sync {
    /// Sends a key or button down event
    fn send_down(&self, device: DeviceHandle, input: InputId) -> SinkResult<()>;

    /// Sends a key or button up event
    fn send_up(&self, device: DeviceHandle, input: InputId) -> SinkResult<()>;

    /// Sends a relative pointer motion
    fn send_relative_move(&self, device: DeviceHandle, dx: i32, dy: i32) -> SinkResult<()>;

    /// Sends an absolute pointer motion
    fn send_absolute_move(&self, device: DeviceHandle, x: i32, y: i32) -> SinkResult<()>;

    /// Sends one wheel notch
    fn send_scroll(&self, device: DeviceHandle, direction: ScrollDirection) -> SinkResult<()>;

    /// Enables or disables OS pointer acceleration for the given mouse
    fn set_mouse_acceleration(&self, device: DeviceHandle, enabled: bool) -> SinkResult<()>;

    /// Real cursor position, when the transport can report it
    fn cursor_position(&self) -> Option<Point> {
        None
    }
}

/// Lists connected devices with their hardware identifiers
pub trait DeviceEnumerator: Send + Sync {
    fn list_devices(&self) -> Vec<DeviceInfo>;
}

/// Blocking wait primitive
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = DeviceHandle::new(3, DeviceClass::Mouse);
        assert_eq!(handle.to_string(), "mouse#3");
    }

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Unavailable("driver not loaded".to_string());
        assert!(err.to_string().contains("driver not loaded"));
    }
}
