#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) used to settle the panel offset.
//!
//! Based on the classical damped spring equation with unit mass:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): Restoring force strength. Higher = faster response.
//! - **damping ratio** (ζ): Converted to a damping coefficient
//!   `c = 2ζ√k`.
//!   - ζ < 1: oscillates past target before settling
//!   - ζ = 1: fastest convergence without overshoot
//!   - ζ > 1: slow convergence, no overshoot
//! - **rest thresholds**: displacement and velocity below which the spring
//!   is considered at rest. Both default to one pixel (per second).
//!
//! # Integration
//!
//! Semi-implicit Euler, sub-stepped at 4ms so that a late frame never makes
//! the spring explode.
//!
//! # Invariants
//!
//! 1. A spring at rest stays at rest until `set_target()` or `impulse()`.
//! 2. Coming to rest snaps position to the target and zeroes velocity.
//! 3. [`advance_bounded`](Spring::advance_bounded) never leaves the position
//!    outside the bounds it was given.
//! 4. Stiffness and damping are always positive (clamped on construction).

use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

/// Maximum dt per integration step (4ms). Larger deltas are subdivided.
const MAX_STEP_SECS: f64 = 0.004;

/// Default rest threshold, in pixels and pixels per second.
const DEFAULT_REST_THRESHOLD: f64 = 1.0;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Stiffness presets, matching the platform spring constants.
pub mod stiffness {
    pub const HIGH: f64 = 10_000.0;
    pub const MEDIUM: f64 = 1_500.0;
    pub const LOW: f64 = 200.0;
    pub const VERY_LOW: f64 = 50.0;
}

/// Damping ratio presets, matching the platform spring constants.
pub mod damping_ratio {
    pub const HIGH_BOUNCY: f64 = 0.2;
    pub const MEDIUM_BOUNCY: f64 = 0.5;
    pub const LOW_BOUNCY: f64 = 0.75;
    pub const NO_BOUNCY: f64 = 1.0;
}

/// Spring parameters, fixed per controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping_ratio: f64,
}

impl Default for SpringConfig {
    /// Low stiffness, medium bounce.
    fn default() -> Self {
        Self {
            stiffness: stiffness::LOW,
            damping_ratio: damping_ratio::MEDIUM_BOUNCY,
        }
    }
}

impl SpringConfig {
    /// Damping coefficient for unit mass: `2ζ√k`.
    #[must_use]
    pub fn damping_coefficient(&self) -> f64 {
        2.0 * self.damping_ratio * self.stiffness.sqrt()
    }
}

/// Why [`Spring::advance_bounded`] returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpringStop {
    /// Still moving inside the bounds.
    Running,
    /// Converged on the target.
    AtRest,
    /// Crossed a bound; position was pinned to it. `remaining` is the part
    /// of `dt` that was not integrated.
    HitBound {
        bound: f64,
        velocity: f64,
        remaining: Duration,
    },
}

/// A damped harmonic oscillator producing physically-based motion.
///
/// ```ignore
/// use std::time::Duration;
/// use toggleview_core::animation::Spring;
///
/// let mut spring = Spring::new(0.0, 1000.0).with_damping_ratio(1.0);
/// for _ in 0..120 {
///     spring.advance(Duration::from_millis(16));
/// }
/// assert!(spring.is_at_rest());
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`, with
    /// the default low-stiffness, medium-bounce parameters.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        let config = SpringConfig::default();
        Self {
            position: initial,
            velocity: 0.0,
            target,
            stiffness: config.stiffness,
            damping: config.damping_coefficient(),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_REST_THRESHOLD,
            at_rest: false,
        }
    }

    /// Create a spring from a [`SpringConfig`].
    #[must_use]
    pub fn from_config(initial: f64, target: f64, config: SpringConfig) -> Self {
        Self::new(initial, target)
            .with_stiffness(config.stiffness)
            .with_damping(config.damping_coefficient())
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set the raw damping coefficient (builder pattern). Clamped to 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set damping from a ratio of critical damping (builder pattern).
    #[must_use]
    pub fn with_damping_ratio(mut self, ratio: f64) -> Self {
        self.damping = (ratio * self.critical_damping()).max(0.0);
        self
    }

    /// Set the starting velocity (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Use one threshold for both displacement and velocity (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self.velocity_threshold = threshold.abs();
        self
    }

    /// Current position (unclamped).
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Stiffness parameter.
    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Damping coefficient.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Change the target. Wakes the spring if it was at rest.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Apply an impulse (add to velocity). Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Whether displacement and velocity are both under the thresholds.
    #[must_use]
    pub fn within_rest_thresholds(&self) -> bool {
        (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
    }

    /// Critical damping coefficient for the current stiffness.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    /// Perform a single integration step of `dt` seconds.
    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let spring_force = -self.stiffness * displacement;
        let damping_force = -self.damping * self.velocity;
        let acceleration = spring_force + damping_force;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing if necessary for stability.
    pub fn advance(&mut self, dt: Duration) {
        let _ = self.advance_bounded(dt, f64::NEG_INFINITY, f64::INFINITY);
    }

    /// Advance the spring by `dt`, stopping at the first sub-step that
    /// crosses `lo` or `hi`.
    ///
    /// On a crossing the position is pinned to the bound and the velocity at
    /// that instant is reported; the spring is left at rest so the caller
    /// decides whether to restart it.
    pub fn advance_bounded(&mut self, dt: Duration, lo: f64, hi: f64) -> SpringStop {
        if self.at_rest {
            return SpringStop::AtRest;
        }

        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return SpringStop::Running;
        }

        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;

            let bound = if self.position < lo {
                lo
            } else if self.position > hi {
                hi
            } else {
                continue;
            };
            let velocity = self.velocity;
            self.position = bound;
            self.velocity = 0.0;
            self.at_rest = true;
            return SpringStop::HitBound {
                bound,
                velocity,
                remaining: Duration::from_secs_f64(remaining.max(0.0)),
            };
        }

        if self.within_rest_thresholds() {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
            return SpringStop::AtRest;
        }
        SpringStop::Running
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.advance(MS_16);
        }
    }

    #[test]
    fn spring_reaches_target() {
        let mut spring = Spring::new(0.0, 100.0)
            .with_stiffness(170.0)
            .with_damping(26.0);

        simulate(&mut spring, 200);

        assert_eq!(spring.position(), 100.0);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn default_parameters_are_low_medium_bouncy() {
        let spring = Spring::new(0.0, 1.0);
        assert_eq!(spring.stiffness(), stiffness::LOW);
        let expected = 2.0 * damping_ratio::MEDIUM_BOUNCY * stiffness::LOW.sqrt();
        assert!((spring.damping() - expected).abs() < 1e-12);
    }

    #[test]
    fn medium_bouncy_overshoots() {
        let mut spring = Spring::new(0.0, 1000.0);
        let mut max_pos = 0.0_f64;
        for _ in 0..300 {
            spring.advance(MS_16);
            max_pos = max_pos.max(spring.position());
        }
        assert!(max_pos > 1000.0, "expected overshoot, max was {max_pos}");
    }

    #[test]
    fn critical_damping_no_overshoot() {
        let mut spring = Spring::new(0.0, 1000.0).with_damping_ratio(1.0);
        let mut max_pos = 0.0_f64;
        for _ in 0..300 {
            spring.advance(MS_16);
            max_pos = max_pos.max(spring.position());
        }
        assert!(max_pos <= 1000.5, "critical damping overshot to {max_pos}");
    }

    #[test]
    fn bounded_advance_pins_at_bound() {
        let mut spring = Spring::new(900.0, 1000.0).with_velocity(5_000.0);
        let stop = spring.advance_bounded(Duration::from_millis(100), 0.0, 1000.0);
        match stop {
            SpringStop::HitBound {
                bound,
                velocity,
                remaining,
            } => {
                assert_eq!(bound, 1000.0);
                assert!(velocity > 0.0);
                assert!(remaining > Duration::ZERO && remaining < Duration::from_millis(100));
            }
            other => panic!("expected HitBound, got {other:?}"),
        }
        assert_eq!(spring.position(), 1000.0);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn bounded_advance_running_inside() {
        let mut spring = Spring::new(0.0, 1000.0);
        assert_eq!(
            spring.advance_bounded(MS_16, 0.0, 1000.0),
            SpringStop::Running
        );
        assert!(spring.position() > 0.0 && spring.position() < 1000.0);
    }

    #[test]
    fn spring_impulse_wakes() {
        let mut spring = Spring::new(0.0, 0.0);
        simulate(&mut spring, 10);
        assert!(spring.is_at_rest());

        spring.impulse(50.0);
        assert!(!spring.is_at_rest());
        spring.advance(MS_16);
        assert!(spring.position().abs() > 0.0);
    }

    #[test]
    fn set_target_wakes_spring() {
        let mut spring = Spring::new(0.0, 10.0).with_damping_ratio(1.0);
        simulate(&mut spring, 200);
        assert!(spring.is_at_rest());

        spring.set_target(200.0);
        assert!(!spring.is_at_rest());
    }

    #[test]
    fn set_target_same_value_stays_at_rest() {
        let mut spring = Spring::new(0.0, 10.0).with_damping_ratio(1.0);
        simulate(&mut spring, 200);
        assert!(spring.is_at_rest());

        spring.set_target(10.0);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn zero_dt_noop() {
        let mut spring = Spring::new(0.0, 1.0);
        spring.advance(Duration::ZERO);
        assert_eq!(spring.position(), 0.0);
    }

    #[test]
    fn large_dt_subdivided() {
        let mut spring = Spring::new(0.0, 1000.0);
        spring.advance(Duration::from_secs(10));
        assert_eq!(spring.position(), 1000.0);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn zero_stiffness_clamped() {
        let spring = Spring::new(0.0, 1.0).with_stiffness(0.0);
        assert!(spring.stiffness() >= MIN_STIFFNESS);
    }

    #[test]
    fn from_config_uses_ratio() {
        let config = SpringConfig {
            stiffness: stiffness::MEDIUM,
            damping_ratio: damping_ratio::NO_BOUNCY,
        };
        let spring = Spring::from_config(0.0, 1.0, config);
        assert_eq!(spring.stiffness(), stiffness::MEDIUM);
        assert!((spring.damping() - spring.critical_damping()).abs() < 1e-9);
    }
}
