//! Process-wide synthesizer
//!
//! Most callers only ever drive one keyboard and one mouse. This module keeps
//! a single [`InputSynthesizer`] for the whole process and exposes every
//! operation as a free function on it. Install it once at startup; calls made
//! before that fail with [`InputError::NotInstalled`].

use crate::device::CaptureOutcome;
use crate::input::{
    CurveParams, InputError, InputId, InputResult, InputSynthesizer, Point, ScrollDirection,
    TimingConfig,
};
use once_cell::sync::OnceCell;
use std::time::Duration;

static SYNTHESIZER: OnceCell<InputSynthesizer> = OnceCell::new();

/// Installs the process-wide synthesizer
///
/// Returns the synthesizer back if one is already installed.
pub fn install(synthesizer: InputSynthesizer) -> Result<(), InputSynthesizer> {
    SYNTHESIZER.set(synthesizer)
}

/// The installed synthesizer
pub fn synthesizer() -> InputResult<&'static InputSynthesizer> {
    SYNTHESIZER.get().ok_or(InputError::NotInstalled)
}

pub fn is_installed() -> bool {
    SYNTHESIZER.get().is_some()
}

pub fn capture_input_devices(keyboard_filter: &str, mouse_filter: &str) -> InputResult<CaptureOutcome> {
    synthesizer()?.capture_input_devices(keyboard_filter, mouse_filter)
}

pub fn press(
    input: InputId,
    times: i32,
    duration: Option<Duration>,
    interval: Option<Duration>,
) -> InputResult<()> {
    synthesizer()?.press(input, times, duration, interval)
}

pub fn hold(input: InputId, duration: Option<Duration>) -> InputResult<()> {
    synthesizer()?.hold(input, duration)
}

pub fn release(input: InputId) -> InputResult<()> {
    synthesizer()?.release(input)
}

pub fn release_all() -> InputResult<()> {
    synthesizer()?.release_all()
}

pub fn is_held(input: InputId) -> InputResult<bool> {
    Ok(synthesizer()?.is_held(input))
}

pub fn write(text: &str) -> InputResult<()> {
    synthesizer()?.write(text)
}

pub fn scroll(direction: ScrollDirection, times: i32, interval: Option<Duration>) -> InputResult<()> {
    synthesizer()?.scroll(direction, times, interval)
}

pub fn move_mouse_to(to: Point, curve: Option<&CurveParams>) -> InputResult<()> {
    synthesizer()?.move_mouse_to(to, curve)
}

pub fn set_mouse_pos(pos: Point) -> InputResult<()> {
    synthesizer()?.set_mouse_pos(pos)
}

// Configuration

pub fn timing() -> InputResult<TimingConfig> {
    Ok(synthesizer()?.timing())
}

pub fn set_default_press_duration(duration: Duration) -> InputResult<()> {
    synthesizer()?.set_default_press_duration(duration);
    Ok(())
}

pub fn set_randomize_durations(enabled: bool) -> InputResult<()> {
    synthesizer()?.set_randomize_durations(enabled);
    Ok(())
}

pub fn set_rand_factor_bounds(lower: f64, upper: f64) -> InputResult<()> {
    synthesizer()?.set_rand_factor_bounds(lower, upper);
    Ok(())
}

pub fn set_auto_disable_mouse_accel(enabled: bool) -> InputResult<()> {
    synthesizer()?.set_auto_disable_mouse_accel(enabled);
    Ok(())
}
