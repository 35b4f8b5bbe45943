//! Recording device implementations
//!
//! These stand in for a real driver. The sink records every event it is
//! given, the enumerator returns a fixed device list and the sleeper logs
//! waits instead of blocking. They back the unit tests and the CLI trace
//! backend.

use super::{
    DeviceEnumerator, DeviceHandle, DeviceInfo, EventSink, SinkError, SinkResult, Sleeper,
};
use crate::input::mouse::ScrollDirection;
use crate::input::InputId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One entry of a recorded timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    Down { device: DeviceHandle, input: InputId },
    Up { device: DeviceHandle, input: InputId },
    RelativeMove { device: DeviceHandle, dx: i32, dy: i32 },
    AbsoluteMove { device: DeviceHandle, x: i32, y: i32 },
    Scroll { device: DeviceHandle, direction: ScrollDirection },
    Acceleration { device: DeviceHandle, enabled: bool },
    Wait { duration: Duration },
}

impl SinkEvent {
    pub fn is_wait(&self) -> bool {
        matches!(self, SinkEvent::Wait { .. })
    }
}

/// A timestamped timeline entry
#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SinkEvent,
}

type Timeline = Arc<Mutex<Vec<RecordedEvent>>>;

fn push(timeline: &Timeline, event: SinkEvent) {
    timeline.lock().push(RecordedEvent {
        at: Utc::now(),
        event,
    });
}

/// Event sink that records instead of delivering
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    timeline: Timeline,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with [`SinkError::Unavailable`]
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Clears an injected failure
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Recorded input events, waits excluded
    pub fn events(&self) -> Vec<SinkEvent> {
        self.timeline
            .lock()
            .iter()
            .map(|r| r.event.clone())
            .filter(|e| !e.is_wait())
            .collect()
    }

    /// Full timeline including waits from an attached sleeper
    pub fn timeline(&self) -> Vec<RecordedEvent> {
        self.timeline.lock().clone()
    }

    pub fn clear(&self) {
        self.timeline.lock().clear();
    }

    fn record(&self, event: SinkEvent) -> SinkResult<()> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(SinkError::Unavailable(message));
        }
        push(&self.timeline, event);
        Ok(())
    }
}

impl EventSink for RecordingSink {
    fn send_down(&self, device: DeviceHandle, input: InputId) -> SinkResult<()> {
        self.record(SinkEvent::Down { device, input })
    }

    fn send_up(&self, device: DeviceHandle, input: InputId) -> SinkResult<()> {
        self.record(SinkEvent::Up { device, input })
    }

    fn send_relative_move(&self, device: DeviceHandle, dx: i32, dy: i32) -> SinkResult<()> {
        self.record(SinkEvent::RelativeMove { device, dx, dy })
    }

    fn send_absolute_move(&self, device: DeviceHandle, x: i32, y: i32) -> SinkResult<()> {
        self.record(SinkEvent::AbsoluteMove { device, x, y })
    }

    fn send_scroll(&self, device: DeviceHandle, direction: ScrollDirection) -> SinkResult<()> {
        self.record(SinkEvent::Scroll { device, direction })
    }

    fn set_mouse_acceleration(&self, device: DeviceHandle, enabled: bool) -> SinkResult<()> {
        self.record(SinkEvent::Acceleration { device, enabled })
    }
}

/// Sleeper that logs waits without blocking
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    timeline: Timeline,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs waits into the sink's timeline so they interleave with events
    pub fn attached_to(sink: &RecordingSink) -> Self {
        Self {
            timeline: Arc::clone(&sink.timeline),
        }
    }

    /// Recorded wait durations in call order
    pub fn waits(&self) -> Vec<Duration> {
        self.timeline
            .lock()
            .iter()
            .filter_map(|r| match r.event {
                SinkEvent::Wait { duration } => Some(duration),
                _ => None,
            })
            .collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        push(&self.timeline, SinkEvent::Wait { duration });
    }
}

/// Enumerator returning a fixed device list
#[derive(Debug, Default, Clone)]
pub struct StaticEnumerator {
    devices: Vec<DeviceInfo>,
}

impl StaticEnumerator {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self { devices }
    }
}

impl DeviceEnumerator for StaticEnumerator {
    fn list_devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }
}
