//! Device arbitration
//!
//! Several keyboards and mice may be attached at once. The arbitrator picks
//! one handle per class, favouring devices whose hardware id contains a
//! caller-supplied keyword, and keeps that choice until the next capture.

use super::{DeviceClass, DeviceEnumerator, DeviceHandle, DeviceInfo};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureOutcome {
    /// Both a keyboard and a mouse were resolved
    Success,
    /// No keyboard could be resolved
    KeyboardNotFound,
    /// No mouse could be resolved
    MouseNotFound,
    /// Neither class could be resolved
    BothNotFound,
}

impl CaptureOutcome {
    fn from_resolution(keyboard: bool, mouse: bool) -> Self {
        match (keyboard, mouse) {
            (true, true) => CaptureOutcome::Success,
            (false, true) => CaptureOutcome::KeyboardNotFound,
            (true, false) => CaptureOutcome::MouseNotFound,
            (false, false) => CaptureOutcome::BothNotFound,
        }
    }

    /// Whether both device classes were resolved
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureOutcome::Success)
    }
}

impl std::fmt::Display for CaptureOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureOutcome::Success => write!(f, "keyboard and mouse captured"),
            CaptureOutcome::KeyboardNotFound => write!(f, "no keyboard found"),
            CaptureOutcome::MouseNotFound => write!(f, "no mouse found"),
            CaptureOutcome::BothNotFound => write!(f, "no keyboard or mouse found"),
        }
    }
}

/// Handles fixed by the last capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedDevices {
    pub keyboard: Option<DeviceInfo>,
    pub mouse: Option<DeviceInfo>,
}

impl CapturedDevices {
    pub fn handle(&self, class: DeviceClass) -> Option<DeviceHandle> {
        match class {
            DeviceClass::Keyboard => self.keyboard.as_ref().map(|d| d.handle),
            DeviceClass::Mouse => self.mouse.as_ref().map(|d| d.handle),
        }
    }
}

/// Resolves and owns the canonical keyboard and mouse handles
///
/// Reads are safe from any thread. A capture must not run concurrently with
/// synthesis that uses the handles; callers sequence it before emitting input.
pub struct DeviceArbitrator {
    enumerator: Arc<dyn DeviceEnumerator>,
    captured: RwLock<CapturedDevices>,
}

impl DeviceArbitrator {
    pub fn new(enumerator: Arc<dyn DeviceEnumerator>) -> Self {
        Self {
            enumerator,
            captured: RwLock::new(CapturedDevices::default()),
        }
    }

    /// Enumerates devices and fixes one handle per class
    ///
    /// A class that resolves replaces its previous handle; a class that does
    /// not resolve keeps whatever an earlier capture stored.
    pub fn capture(&self, keyboard_filter: &str, mouse_filter: &str) -> CaptureOutcome {
        let devices = self.enumerator.list_devices();
        debug!(count = devices.len(), "enumerated input devices");

        let keyboard = select_device(&devices, DeviceClass::Keyboard, keyboard_filter);
        let mouse = select_device(&devices, DeviceClass::Mouse, mouse_filter);
        let outcome = CaptureOutcome::from_resolution(keyboard.is_some(), mouse.is_some());

        let mut captured = self.captured.write();
        if let Some(keyboard) = keyboard {
            info!(handle = %keyboard.handle, hwid = %keyboard.hardware_id, "captured keyboard");
            captured.keyboard = Some(keyboard);
        }
        if let Some(mouse) = mouse {
            info!(handle = %mouse.handle, hwid = %mouse.hardware_id, "captured mouse");
            captured.mouse = Some(mouse);
        }

        if !outcome.is_success() {
            warn!(%outcome, "device capture incomplete");
        }
        outcome
    }

    /// Handle currently fixed for the class, if any
    pub fn handle(&self, class: DeviceClass) -> Option<DeviceHandle> {
        self.captured.read().handle(class)
    }

    /// Snapshot of the captured devices
    pub fn captured(&self) -> CapturedDevices {
        self.captured.read().clone()
    }

    /// All devices currently reported by the enumerator
    pub fn list_devices(&self) -> Vec<DeviceInfo> {
        self.enumerator.list_devices()
    }
}

/// Picks the first device of `class` whose hwid contains `filter`, falling
/// back to the first device of the class.
fn select_device(devices: &[DeviceInfo], class: DeviceClass, filter: &str) -> Option<DeviceInfo> {
    let mut of_class = devices.iter().filter(|d| d.class() == class);

    if !filter.is_empty() {
        if let Some(found) = of_class.clone().find(|d| d.hardware_id.contains(filter)) {
            return Some(found.clone());
        }
        warn!(%class, filter, "no device matches filter, falling back to first found");
    }

    of_class.next().cloned()
}
