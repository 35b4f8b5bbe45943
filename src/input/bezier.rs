//! Bézier curve paths for pointer movement
//!
//! A destination point is turned into a finite sequence of relative motion
//! steps. With [`CurveParams`] the steps follow a cubic Bézier curve whose
//! control points are offset from the straight line; without them the path
//! is a straight line cut into a few sub-steps.
//!
//! Path generation is a pure function of its inputs: the same `from`, `to`
//! and params always produce the same steps, and a [`MotionPath`] can be
//! iterated any number of times.
//!
//! # Example
//!
//! ```rust
//! use humanized_input::input::bezier::{generate_path, CurveParams, Point};
//!
//! let from = Point::new(100, 100);
//! let to = Point::new(500, 300);
//! let path = generate_path(from, to, Some(&CurveParams::default()));
//!
//! let total = path.iter().fold(Point::new(0, 0), |acc, step| acc + step);
//! assert_eq!(total, to - from);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Distance above which a curve-less move is split into sub-steps
pub const LINEAR_STEP_THRESHOLD: f64 = 100.0;

/// An integer screen coordinate or a relative delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        Vec2::from(*self).distance_to(&Vec2::from(*other))
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Sub-pixel point used while evaluating curves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Vec2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation (0.0 = self, 1.0 = other)
    pub fn lerp(&self, other: &Vec2, t: f64) -> Vec2 {
        Vec2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or self if zero length
    pub fn normalized(&self) -> Vec2 {
        let mag = self.magnitude();
        if mag > 0.0 {
            Vec2::new(self.x / mag, self.y / mag)
        } else {
            *self
        }
    }

    /// Perpendicular vector, rotated 90° counter-clockwise
    pub fn perpendicular(&self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Nearest integer point
    pub fn round(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x as f64, p.y as f64)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

/// A cubic Bézier curve defined by four control points
///
/// The curve starts at `p0`, ends at `p3`, and is shaped by the
/// intermediate control points `p1` and `p2`.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl BezierCurve {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Builds the curve from `start` to `end` with control points placed
    /// according to `params`.
    pub fn from_params(start: Vec2, end: Vec2, params: &CurveParams) -> Self {
        let distance = start.distance_to(&end);
        let direction = (end - start).normalized();
        let normal = direction.perpendicular();

        let place = |offset: &ControlOffset| {
            start + direction * (distance * offset.along) + normal * (distance * offset.across)
        };

        Self::new(start, place(&params.control1), place(&params.control2), end)
    }

    /// Evaluates the curve at parameter t
    ///
    /// `t` is clamped to `[0.0, 1.0]`; at 1.0 the result is exactly `p3`.
    pub fn evaluate_at(&self, t: f64) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        // B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃
        Vec2 {
            x: mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x,
            y: mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y,
        }
    }

    /// Approximate arc length from 50 linear samples
    pub fn arc_length(&self) -> f64 {
        let samples = 50;
        let mut length = 0.0;
        let mut prev = self.p0;

        for i in 1..=samples {
            let t = i as f64 / samples as f64;
            let point = self.evaluate_at(t);
            length += prev.distance_to(&point);
            prev = point;
        }

        length
    }
}

/// Progress shaping along the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInOutCubic,
    #[default]
    EaseInOutSine,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress in `[0, 1]`
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInOutSine => -(((PI * t).cos() - 1.0) / 2.0),
        }
    }
}

/// Control point position relative to the straight line from start to end
///
/// Both values are fractions of the start-end distance: `along` runs parallel
/// to the line, `across` perpendicular to it (positive is counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlOffset {
    pub along: f64,
    pub across: f64,
}

impl ControlOffset {
    pub fn new(along: f64, across: f64) -> Self {
        Self { along, across }
    }
}

/// Shape and sampling policy of a curved movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    #[serde(default = "default_control1")]
    pub control1: ControlOffset,

    #[serde(default = "default_control2")]
    pub control2: ControlOffset,

    #[serde(default)]
    pub easing: Easing,

    /// Pixels of straight-line distance per step
    #[serde(default = "default_step_granularity")]
    pub step_granularity: f64,

    #[serde(default = "default_min_steps")]
    pub min_steps: usize,

    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Pause between two motion steps, jittered like every other wait
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

fn default_control1() -> ControlOffset {
    ControlOffset::new(0.3, 0.15)
}

fn default_control2() -> ControlOffset {
    ControlOffset::new(0.7, 0.08)
}

fn default_step_granularity() -> f64 {
    10.0
}

fn default_min_steps() -> usize {
    5
}

fn default_max_steps() -> usize {
    100
}

fn default_step_interval_ms() -> u64 {
    2
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            control1: default_control1(),
            control2: default_control2(),
            easing: Easing::default(),
            step_granularity: default_step_granularity(),
            min_steps: default_min_steps(),
            max_steps: default_max_steps(),
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

impl CurveParams {
    /// Params with human-like random control points
    ///
    /// The randomness is drawn once here; generating a path from the returned
    /// params is still deterministic.
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();

        // Arc above or below the direct line, stronger near the start
        let arc = rng.gen_range(0.1..0.3) * if rng.gen::<bool>() { 1.0 } else { -1.0 };

        Self {
            control1: ControlOffset::new(rng.gen_range(0.2..0.35), arc * rng.gen_range(0.5..1.0)),
            control2: ControlOffset::new(rng.gen_range(0.65..0.8), arc * rng.gen_range(0.3..0.7)),
            ..Self::default()
        }
    }

    pub fn with_steps(mut self, min_steps: usize, max_steps: usize) -> Self {
        self.min_steps = min_steps;
        self.max_steps = max_steps;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    /// Number of steps for a straight-line distance
    pub fn step_count(&self, distance: f64) -> usize {
        let granularity = if self.step_granularity > 0.0 {
            self.step_granularity
        } else {
            default_step_granularity()
        };
        let steps = (distance / granularity).ceil() as usize;
        let max = self.max_steps.max(1);
        steps.clamp(self.min_steps.clamp(1, max), max)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Plan {
    Curve { curve: BezierCurve, easing: Easing },
    Linear,
}

/// A finite, restartable sequence of relative motion steps
///
/// The deltas always sum to exactly `to - from`. Steps that would not move
/// the pointer are skipped, so `from == to` yields no steps at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPath {
    from: Point,
    to: Point,
    steps: usize,
    plan: Plan,
    step_interval: Duration,
}

impl MotionPath {
    pub fn from(&self) -> Point {
        self.from
    }

    pub fn to(&self) -> Point {
        self.to
    }

    /// Pause to apply between steps
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Iterates over the relative steps from the beginning
    pub fn iter(&self) -> MotionSteps<'_> {
        MotionSteps {
            path: self,
            index: 0,
            previous: self.from,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Absolute position after `index` of `steps` sampling points
    fn position_at(&self, index: usize) -> Point {
        if index >= self.steps {
            return self.to;
        }

        let t = index as f64 / self.steps as f64;
        match &self.plan {
            Plan::Curve { curve, easing } => curve.evaluate_at(easing.apply(t)).round(),
            Plan::Linear => Vec2::from(self.from).lerp(&Vec2::from(self.to), t).round(),
        }
    }
}

impl<'a> IntoIterator for &'a MotionPath {
    type Item = Point;
    type IntoIter = MotionSteps<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the deltas of a [`MotionPath`]
#[derive(Debug, Clone)]
pub struct MotionSteps<'a> {
    path: &'a MotionPath,
    index: usize,
    previous: Point,
}

impl Iterator for MotionSteps<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.index < self.path.steps {
            self.index += 1;
            let position = self.path.position_at(self.index);
            let delta = position - self.previous;
            self.previous = position;
            if !delta.is_zero() {
                return Some(delta);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.path.steps - self.index))
    }
}

/// Plans the relative steps that move the pointer from `from` to `to`
///
/// Without params the move is a straight line: a single step, or one step
/// per [`LINEAR_STEP_THRESHOLD`] pixels for longer distances.
pub fn generate_path(from: Point, to: Point, params: Option<&CurveParams>) -> MotionPath {
    let distance = from.distance_to(&to);

    if from == to {
        return MotionPath {
            from,
            to,
            steps: 0,
            plan: Plan::Linear,
            step_interval: Duration::ZERO,
        };
    }

    match params {
        Some(params) => MotionPath {
            from,
            to,
            steps: params.step_count(distance),
            plan: Plan::Curve {
                curve: BezierCurve::from_params(Vec2::from(from), Vec2::from(to), params),
                easing: params.easing,
            },
            step_interval: params.step_interval(),
        },
        None => MotionPath {
            from,
            to,
            steps: ((distance / LINEAR_STEP_THRESHOLD).ceil() as usize).max(1),
            plan: Plan::Linear,
            step_interval: Duration::ZERO,
        },
    }
}
