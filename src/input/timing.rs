//! Human-like timing for input synthesis
//!
//! Every press duration and every pause between events is passed through
//! [`Jitter::jitter`], which scales the nominal value by a random factor drawn
//! from the configured bounds. A 50ms delay with bounds `[0.8, 1.2]` ends up
//! anywhere between 40ms and 60ms.
//!
//! # Example
//!
//! ```rust
//! use humanized_input::input::timing::{Jitter, TimingConfig};
//! use std::time::Duration;
//!
//! let jitter = Jitter::new(TimingConfig::default());
//! let d = jitter.jitter(Duration::from_millis(50));
//! assert!(d >= Duration::from_millis(40) && d <= Duration::from_millis(60));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide timing configuration
///
/// Durations are stored in milliseconds so the struct maps directly onto the
/// configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long `press` keeps an input down when no duration is given
    #[serde(default = "default_press_duration_ms")]
    pub default_press_duration_ms: u64,

    /// Whether durations and intervals are randomized at all
    #[serde(default = "default_randomize_durations")]
    pub randomize_durations: bool,

    /// Lower and upper bound of the multiplicative jitter factor
    #[serde(default = "default_rand_factor_bounds")]
    pub rand_factor_bounds: (f64, f64),

    /// Disable OS pointer acceleration on the mouse at capture time
    #[serde(default = "default_auto_disable_mouse_accel")]
    pub auto_disable_mouse_accel: bool,

    /// Pause between characters in `write`
    #[serde(default = "default_typing_interval_ms")]
    pub typing_interval_ms: u64,
}

fn default_press_duration_ms() -> u64 {
    5
}

fn default_randomize_durations() -> bool {
    true
}

fn default_rand_factor_bounds() -> (f64, f64) {
    (0.8, 1.2)
}

fn default_auto_disable_mouse_accel() -> bool {
    true
}

fn default_typing_interval_ms() -> u64 {
    30
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_press_duration_ms: default_press_duration_ms(),
            randomize_durations: default_randomize_durations(),
            rand_factor_bounds: default_rand_factor_bounds(),
            auto_disable_mouse_accel: default_auto_disable_mouse_accel(),
            typing_interval_ms: default_typing_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn default_press_duration(&self) -> Duration {
        Duration::from_millis(self.default_press_duration_ms)
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms)
    }

    /// Timing without any randomization, handy for reproducible traces
    pub fn exact() -> Self {
        Self {
            randomize_durations: false,
            ..Self::default()
        }
    }

    /// Sets the typing interval from a words-per-minute rate
    pub fn with_typing_wpm(mut self, wpm: f64) -> Self {
        self.typing_interval_ms = wpm_to_interval(wpm).as_millis() as u64;
        self
    }
}

/// Applies bounded random jitter to durations
///
/// Draws come from the thread-local RNG, so concurrent callers never share
/// generator state.
#[derive(Debug, Clone)]
pub struct Jitter {
    enabled: bool,
    lower: f64,
    upper: f64,
}

impl Jitter {
    pub fn new(config: TimingConfig) -> Self {
        Self::from_config(&config)
    }

    /// Builds a jitter from the configuration
    ///
    /// Inverted bounds are swapped and negative ones clamped to zero. Bounds
    /// that are not finite numbers disable randomization.
    pub fn from_config(config: &TimingConfig) -> Self {
        let (a, b) = config.rand_factor_bounds;
        if !a.is_finite() || !b.is_finite() {
            return Self {
                enabled: false,
                lower: 1.0,
                upper: 1.0,
            };
        }

        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        Self {
            enabled: config.randomize_durations,
            lower: lower.max(0.0),
            upper: upper.max(0.0),
        }
    }

    /// Returns `nominal` scaled by a uniform factor in `[lower, upper]`
    ///
    /// The result keeps the resolution of `nominal`: a whole-millisecond input
    /// yields a whole-millisecond output whenever one exists within the
    /// bounds. Zero stays zero.
    pub fn jitter(&self, nominal: Duration) -> Duration {
        if !self.enabled || nominal.is_zero() {
            return nominal;
        }

        let unit = resolution_of(nominal);
        let units = nominal.as_nanos() / unit as u128;
        if let Some(scaled) = self.scale_units(units as f64) {
            let nanos = (scaled as u128 * unit as u128).min(u64::MAX as u128);
            return Duration::from_nanos(nanos as u64);
        }

        // No whole unit fits within the bounds, fall back to nanoseconds
        let nanos = nominal.as_nanos() as f64;
        match self.scale_units(nanos) {
            Some(scaled) => Duration::from_nanos(scaled),
            None => nominal,
        }
    }

    /// Jittered integer amount of `units`, or `None` if no integer lies
    /// inside `[units * lower, units * upper]`.
    fn scale_units(&self, units: f64) -> Option<u64> {
        const EPSILON: f64 = 1e-9;

        let min = (units * self.lower - EPSILON).ceil().max(0.0);
        let max = (units * self.upper + EPSILON).floor();
        if min > max {
            return None;
        }

        let factor = if self.upper > self.lower {
            rand::thread_rng().gen_range(self.lower..=self.upper)
        } else {
            self.lower
        };

        Some((units * factor).round().clamp(min, max) as u64)
    }
}

/// Largest of ms, µs or ns that divides the duration evenly
fn resolution_of(duration: Duration) -> u64 {
    let nanos = duration.subsec_nanos();
    if nanos % 1_000_000 == 0 {
        1_000_000
    } else if nanos % 1_000 == 0 {
        1_000
    } else {
        1
    }
}

/// Converts words per minute to the pause between keystrokes
///
/// # Arguments
///
/// * `wpm` - Target words per minute (5 characters per word)
pub fn wpm_to_interval(wpm: f64) -> Duration {
    if wpm <= 0.0 {
        return Duration::from_millis(200);
    }

    // 5 characters per word, 60 seconds per minute
    let chars_per_second = wpm * 5.0 / 60.0;
    let ms_per_char = 1000.0 / chars_per_second;

    Duration::from_millis(ms_per_char as u64)
}
