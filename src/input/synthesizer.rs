//! Humanized input synthesis
//!
//! [`InputSynthesizer`] is the public face of the crate. It owns the device
//! arbitrator, the timing configuration and the held-state tracker, and
//! turns each request into discrete events on the [`EventSink`].
//!
//! All operations block the calling thread for their waits. The only
//! asynchronous piece is the auto-release scheduled by
//! [`hold`](InputSynthesizer::hold) with a duration: it runs on its own timer
//! thread and loses cleanly against a manual [`release`](InputSynthesizer::release)
//! (whichever comes first emits the up event, the other does nothing).

use super::bezier::{generate_path, CurveParams, Point};
use super::keyboard::{KeyTranslator, ScanCode, UsLayout};
use super::mouse::ScrollDirection;
use super::state::KeyStateTracker;
use super::timing::{Jitter, TimingConfig};
use super::{InputError, InputId, InputResult};
use crate::device::{
    CaptureOutcome, CapturedDevices, DeviceArbitrator, DeviceClass, DeviceEnumerator,
    DeviceHandle, EventSink, Sleeper, ThreadSleeper,
};
use parking_lot::{Mutex, RwLock};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Pause between repeated presses when none is given
pub const DEFAULT_PRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Pause between scroll notches when none is given
pub const DEFAULT_SCROLL_INTERVAL: Duration = Duration::from_millis(5);

/// Builder for [`InputSynthesizer`]
pub struct SynthesizerBuilder {
    sink: Arc<dyn EventSink>,
    enumerator: Arc<dyn DeviceEnumerator>,
    sleeper: Arc<dyn Sleeper>,
    translator: Arc<dyn KeyTranslator>,
    timing: TimingConfig,
}

impl SynthesizerBuilder {
    /// Wait primitive, [`ThreadSleeper`] by default
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Character translation for `write`, [`UsLayout`] by default
    pub fn translator(mut self, translator: Arc<dyn KeyTranslator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn build(self) -> InputSynthesizer {
        InputSynthesizer {
            sink: self.sink,
            arbitrator: DeviceArbitrator::new(self.enumerator),
            sleeper: self.sleeper,
            translator: self.translator,
            timing: RwLock::new(self.timing),
            states: KeyStateTracker::new(),
            position: Mutex::new(Point::default()),
        }
    }
}

/// Synthesizes keyboard and mouse input with human-like timing
///
/// The timing configuration follows a single-writer, many-reader contract:
/// setters swap values under a write lock and every operation reads a
/// consistent snapshot when it starts.
///
/// Operations on the same [`InputId`] are serialized per identifier. Device
/// capture must be sequenced by the caller before input is emitted.
pub struct InputSynthesizer {
    sink: Arc<dyn EventSink>,
    arbitrator: DeviceArbitrator,
    sleeper: Arc<dyn Sleeper>,
    translator: Arc<dyn KeyTranslator>,
    timing: RwLock<TimingConfig>,
    states: KeyStateTracker,
    position: Mutex<Point>,
}

impl InputSynthesizer {
    /// Starts building a synthesizer on top of a sink and a device source
    pub fn builder(
        sink: Arc<dyn EventSink>,
        enumerator: Arc<dyn DeviceEnumerator>,
    ) -> SynthesizerBuilder {
        SynthesizerBuilder {
            sink,
            enumerator,
            sleeper: Arc::new(ThreadSleeper),
            translator: Arc::new(UsLayout),
            timing: TimingConfig::default(),
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Snapshot of the timing configuration
    pub fn timing(&self) -> TimingConfig {
        self.timing.read().clone()
    }

    pub fn set_timing(&self, timing: TimingConfig) {
        *self.timing.write() = timing;
    }

    /// Sets the default press duration, rounded to the nearest millisecond
    pub fn set_default_press_duration(&self, duration: Duration) {
        let millis = (duration.as_micros() + 500) / 1000;
        self.timing.write().default_press_duration_ms = millis.min(u64::MAX as u128) as u64;
    }

    pub fn set_randomize_durations(&self, enabled: bool) {
        self.timing.write().randomize_durations = enabled;
    }

    pub fn set_rand_factor_bounds(&self, lower: f64, upper: f64) {
        self.timing.write().rand_factor_bounds = (lower, upper);
    }

    pub fn set_auto_disable_mouse_accel(&self, enabled: bool) {
        self.timing.write().auto_disable_mouse_accel = enabled;
    }

    /// Jitters a duration with the current configuration
    pub fn jitter(&self, nominal: Duration) -> Duration {
        Jitter::from_config(&self.timing.read()).jitter(nominal)
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Determines the keyboard and mouse to send input through
    ///
    /// # Arguments
    ///
    /// * `keyboard_filter` - Keyword favoured in keyboard hardware ids
    /// * `mouse_filter` - Keyword favoured in mouse hardware ids
    ///
    /// A missing device is reported through the outcome, not as an error.
    /// Errors only come from the sink when pointer acceleration is switched
    /// off on the captured mouse.
    pub fn capture_input_devices(
        &self,
        keyboard_filter: &str,
        mouse_filter: &str,
    ) -> InputResult<CaptureOutcome> {
        let outcome = self.arbitrator.capture(keyboard_filter, mouse_filter);

        let mouse_resolved = matches!(
            outcome,
            CaptureOutcome::Success | CaptureOutcome::KeyboardNotFound
        );
        if mouse_resolved && self.timing.read().auto_disable_mouse_accel {
            if let Some(mouse) = self.arbitrator.handle(DeviceClass::Mouse) {
                debug!(%mouse, "disabling pointer acceleration");
                self.sink.set_mouse_acceleration(mouse, false)?;
            }
        }

        Ok(outcome)
    }

    /// Devices fixed by the last capture
    pub fn devices(&self) -> CapturedDevices {
        self.arbitrator.captured()
    }

    /// The arbitrator, for listing what the enumerator currently sees
    pub fn arbitrator(&self) -> &DeviceArbitrator {
        &self.arbitrator
    }

    fn device(&self, class: DeviceClass) -> InputResult<DeviceHandle> {
        self.arbitrator
            .handle(class)
            .ok_or(InputError::DeviceNotCaptured { class })
    }

    // ------------------------------------------------------------------
    // Keys and buttons
    // ------------------------------------------------------------------

    /// Whether the input is currently held through [`hold`](Self::hold)
    pub fn is_held(&self, input: InputId) -> bool {
        self.states.is_held(input)
    }

    /// The held-state tracker
    pub fn states(&self) -> &KeyStateTracker {
        &self.states
    }

    /// Presses and releases an input one or more times
    ///
    /// # Arguments
    ///
    /// * `input` - The key or mouse button to press
    /// * `times` - How many press cycles; zero or negative does nothing
    /// * `duration` - How long each press lasts, the configured default if `None`
    /// * `interval` - Pause between cycles, 50ms if `None`
    ///
    /// Both waits are jittered. There is no wait after the last cycle.
    pub fn press(
        &self,
        input: InputId,
        times: i32,
        duration: Option<Duration>,
        interval: Option<Duration>,
    ) -> InputResult<()> {
        if times <= 0 {
            return Ok(());
        }

        let device = self.device(input.device_class())?;
        let duration = duration.unwrap_or_else(|| self.timing.read().default_press_duration());
        let interval = interval.unwrap_or(DEFAULT_PRESS_INTERVAL);
        debug!(%input, times, ?duration, ?interval, "press");

        let slot = self.states.slot(input);
        let mut state = slot.lock();

        for i in 0..times {
            self.sink.send_down(device, input)?;
            self.sleeper.sleep(self.jitter(duration));
            self.sink.send_up(device, input)?;

            if i + 1 < times {
                self.sleeper.sleep(self.jitter(interval));
            }
        }

        // A press ends any hold on the same input
        state.end_hold();
        Ok(())
    }

    /// Sends a down event and keeps the input held
    ///
    /// # Arguments
    ///
    /// * `input` - The key or mouse button to hold
    /// * `duration` - If set, the input is released automatically after this
    ///   (jittered) time unless [`release`](Self::release) gets there first
    ///
    /// Holding an input that is already held does nothing.
    pub fn hold(&self, input: InputId, duration: Option<Duration>) -> InputResult<()> {
        let device = self.device(input.device_class())?;

        let slot = self.states.slot(input);
        let mut state = slot.lock();
        let Some(generation) = state.begin_hold() else {
            debug!(%input, "already held");
            return Ok(());
        };

        if let Err(err) = self.sink.send_down(device, input) {
            state.end_hold();
            return Err(err.into());
        }
        debug!(%input, ?duration, "hold");

        let Some(duration) = duration else {
            return Ok(());
        };

        let delay = self.jitter(duration);
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let sink = Arc::clone(&self.sink);
        let timer_slot = Arc::clone(&slot);

        let spawned = std::thread::Builder::new()
            .name(format!("auto-release-{}", input))
            .spawn(move || match cancel_rx.recv_timeout(delay) {
                Err(RecvTimeoutError::Timeout) => {
                    let mut state = timer_slot.lock();
                    if state.end_hold_if(generation) {
                        debug!(%input, "auto-release");
                        if let Err(err) = sink.send_up(device, input) {
                            error!(%input, error = %err, "auto-release failed");
                        }
                    }
                }
                _ => debug!(%input, "auto-release cancelled"),
            });

        match spawned {
            Ok(_) => {
                state.arm_auto_release(cancel_tx);
                Ok(())
            }
            Err(err) => {
                warn!(%input, error = %err, "cannot schedule auto-release, releasing inline");
                drop(state);
                self.sleeper.sleep(delay);
                self.release(input)
            }
        }
    }

    /// Sends an up event for a held input
    ///
    /// Nothing happens if the input is not held, so repeated releases are
    /// harmless. Cancels a pending auto-release.
    pub fn release(&self, input: InputId) -> InputResult<()> {
        let device = self.device(input.device_class())?;

        let slot = self.states.slot(input);
        let mut state = slot.lock();
        if !state.end_hold() {
            return Ok(());
        }

        debug!(%input, "release");
        if let Err(err) = self.sink.send_up(device, input) {
            // Still physically down, keep it releasable
            state.begin_hold();
            return Err(err.into());
        }
        Ok(())
    }

    /// Releases every held input
    pub fn release_all(&self) -> InputResult<()> {
        for input in self.states.held_inputs() {
            self.release(input)?;
        }
        Ok(())
    }

    /// Types out text, one press cycle per character
    ///
    /// Uppercase letters and shifted symbols are wrapped in a shift down/up
    /// pair around their own press. While shift is held through
    /// [`hold`](Self::hold), shifted characters are pressed as they are and
    /// unshifted ones briefly lift shift, which is put back down afterwards
    /// and stays held. Characters the translator does not know are skipped.
    pub fn write(&self, text: &str) -> InputResult<()> {
        let keyboard = self.device(DeviceClass::Keyboard)?;
        let shift = InputId::Key(ScanCode::LEFT_SHIFT);
        let shift_slot = self.states.slot(shift);
        let (press_duration, typing_interval) = {
            let timing = self.timing.read();
            (timing.default_press_duration(), timing.typing_interval())
        };
        debug!(chars = text.chars().count(), "write");

        let mut first = true;
        for c in text.chars() {
            let Some(stroke) = self.translator.translate(c) else {
                warn!(character = ?c, "no key for character, skipping");
                continue;
            };

            if !first {
                self.sleeper.sleep(self.jitter(typing_interval));
            }
            first = false;

            let key = InputId::Key(stroke.code);
            let mut shift_state = shift_slot.lock();

            match (stroke.shift, shift_state.is_held()) {
                (true, false) => {
                    self.sink.send_down(keyboard, shift)?;
                    self.sleeper.sleep(self.jitter(press_duration));
                    self.press(key, 1, Some(press_duration), None)?;
                    self.sleeper.sleep(self.jitter(press_duration));
                    self.sink.send_up(keyboard, shift)?;
                }
                (false, true) => {
                    self.sink.send_up(keyboard, shift)?;
                    self.sleeper.sleep(self.jitter(press_duration));

                    // Shift is physically up from here until it goes down again
                    let restored = self
                        .press(key, 1, Some(press_duration), None)
                        .and_then(|()| {
                            self.sleeper.sleep(self.jitter(press_duration));
                            self.sink.send_down(keyboard, shift).map_err(InputError::from)
                        });
                    if let Err(err) = restored {
                        shift_state.end_hold();
                        return Err(err);
                    }
                }
                _ => self.press(key, 1, Some(press_duration), None)?,
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    /// Scrolls the wheel a number of notches
    ///
    /// # Arguments
    ///
    /// * `direction` - Up or down
    /// * `times` - Number of notches; zero or negative does nothing
    /// * `interval` - Pause between notches, 5ms if `None`
    pub fn scroll(
        &self,
        direction: ScrollDirection,
        times: i32,
        interval: Option<Duration>,
    ) -> InputResult<()> {
        if times <= 0 {
            return Ok(());
        }

        let mouse = self.device(DeviceClass::Mouse)?;
        let interval = interval.unwrap_or(DEFAULT_SCROLL_INTERVAL);
        debug!(%direction, times, ?interval, "scroll");

        for i in 0..times {
            self.sink.send_scroll(mouse, direction)?;
            if i + 1 < times {
                self.sleeper.sleep(self.jitter(interval));
            }
        }
        Ok(())
    }

    /// Last known pointer position
    ///
    /// Taken from the sink when it can report the real cursor, otherwise the
    /// position this synthesizer last moved to.
    pub fn position(&self) -> Point {
        self.sink
            .cursor_position()
            .unwrap_or_else(|| *self.position.lock())
    }

    /// Moves the pointer to `to` with relative motion events
    ///
    /// # Arguments
    ///
    /// * `to` - Destination in screen coordinates
    /// * `curve` - Curve shape and sampling; `None` moves in a straight line
    ///
    /// Moving to the current position emits nothing.
    pub fn move_mouse_to(&self, to: Point, curve: Option<&CurveParams>) -> InputResult<()> {
        let from = self.position();
        let path = generate_path(from, to, curve);
        if path.is_empty() {
            return Ok(());
        }

        let mouse = self.device(DeviceClass::Mouse)?;
        debug!(%from, %to, curved = curve.is_some(), "move mouse");

        for (i, step) in path.iter().enumerate() {
            if i > 0 && !path.step_interval().is_zero() {
                self.sleeper.sleep(self.jitter(path.step_interval()));
            }
            self.sink.send_relative_move(mouse, step.x, step.y)?;

            let mut position = self.position.lock();
            *position = *position + step;
        }

        *self.position.lock() = to;
        Ok(())
    }

    /// Places the pointer at `pos` with a single absolute motion event
    pub fn set_mouse_pos(&self, pos: Point) -> InputResult<()> {
        let mouse = self.device(DeviceClass::Mouse)?;
        debug!(%pos, "set mouse position");

        self.sink.send_absolute_move(mouse, pos.x, pos.y)?;
        *self.position.lock() = pos;
        Ok(())
    }
}
