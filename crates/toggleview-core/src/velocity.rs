#![forbid(unsafe_code)]

//! Windowed velocity estimation for fling detection.
//!
//! [`VelocityEstimator`] keeps the pointer samples of the active drag that
//! fall inside a retention window (default 500ms, measured from the newest
//! sample) and fits a line through the most recent stretch of motion.
//!
//! # Fit
//!
//! Walking back from the newest sample, the fitted run stops at:
//!
//! - a gap between consecutive samples longer than `assume_stopped`
//!   (the pointer paused, so older motion no longer counts);
//! - the first pair moving opposite to the newest non-zero movement.
//!
//! The run is then fit with ordinary least squares. Because the run is
//! monotonic, the slope always has the sign of the most recent movement, so a
//! late reversal is never outvoted by older samples.
//!
//! # Invariants
//!
//! 1. Retained samples are time-ordered; out-of-order samples are dropped.
//! 2. Fewer than two usable samples always estimate 0.
//! 3. The estimate never extrapolates outside the retained window.

use std::collections::VecDeque;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

/// Default retention window for samples.
pub const DEFAULT_RETENTION: Duration = Duration::from_millis(500);

/// Default gap after which the pointer is considered to have stopped.
pub const DEFAULT_ASSUME_STOPPED: Duration = Duration::from_millis(40);

/// Estimator tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct VelocityConfig {
    /// Samples older than this (relative to the newest) are discarded.
    #[cfg_attr(feature = "config-file", serde(with = "crate::config::duration_ms"))]
    pub retention: Duration,
    /// A gap between samples longer than this ends the fitted run.
    #[cfg_attr(feature = "config-file", serde(with = "crate::config::duration_ms"))]
    pub assume_stopped: Duration,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            assume_stopped: DEFAULT_ASSUME_STOPPED,
        }
    }
}

/// A single horizontal position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    pub x: f64,
    pub timestamp_nanos: u64,
}

/// Horizontal velocity estimator over a bounded window of recent samples.
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    samples: VecDeque<VelocitySample>,
    retention_nanos: u64,
    assume_stopped_nanos: u64,
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new(VelocityConfig::default())
    }
}

impl VelocityEstimator {
    /// Create an estimator with the given tuning.
    #[must_use]
    pub fn new(config: VelocityConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(32),
            retention_nanos: duration_nanos(config.retention),
            assume_stopped_nanos: duration_nanos(config.assume_stopped),
        }
    }

    /// Append a sample, discarding samples that fell out of the window.
    pub fn add_sample(&mut self, x: f64, timestamp_nanos: u64) {
        if !x.is_finite() {
            trace!(x, "ignoring non-finite velocity sample");
            return;
        }
        if let Some(last) = self.samples.back()
            && timestamp_nanos < last.timestamp_nanos
        {
            trace!(
                timestamp_nanos,
                last = last.timestamp_nanos,
                "ignoring sample earlier than the newest one"
            );
            return;
        }

        self.samples.push_back(VelocitySample { x, timestamp_nanos });
        self.trim(timestamp_nanos);
    }

    /// Velocity in pixels per `unit`, or 0 without enough recent motion.
    #[must_use]
    pub fn estimate_velocity(&self, unit: Duration) -> f64 {
        let start = self.run_start();
        if self.samples.len() - start < 2 {
            return 0.0;
        }
        let Some(per_nano) = least_squares_slope(self.samples.range(start..)) else {
            return 0.0;
        };
        per_nano * unit.as_nanos() as f64
    }

    /// Like [`estimate_velocity`](Self::estimate_velocity), capped to
    /// `[-max, max]`.
    #[must_use]
    pub fn estimate_velocity_with_max(&self, unit: Duration, max: f64) -> f64 {
        if !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        let velocity = self.estimate_velocity(unit);
        if velocity == 0.0 || velocity.is_nan() {
            return 0.0;
        }
        velocity.clamp(-max, max)
    }

    /// Clear all samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Number of retained samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &VelocitySample> {
        self.samples.iter()
    }

    fn trim(&mut self, newest: u64) {
        while let Some(first) = self.samples.front() {
            if newest - first.timestamp_nanos <= self.retention_nanos {
                break;
            }
            let _ = self.samples.pop_front();
        }
    }

    /// Index of the oldest sample in the most recent monotonic run.
    fn run_start(&self) -> usize {
        let Some(mut start) = self.samples.len().checked_sub(1) else {
            return 0;
        };
        let mut direction = 0.0_f64;
        while start > 0 {
            let newer = self.samples[start];
            let older = self.samples[start - 1];
            if newer.timestamp_nanos - older.timestamp_nanos > self.assume_stopped_nanos {
                break;
            }
            let dx = newer.x - older.x;
            if dx != 0.0 {
                if direction == 0.0 {
                    direction = dx.signum();
                } else if dx.signum() != direction {
                    break;
                }
            }
            start -= 1;
        }
        start
    }
}

/// Least-squares slope of position over time, in pixels per nanosecond.
///
/// Returns `None` when all samples share one timestamp.
fn least_squares_slope<'a>(run: impl Iterator<Item = &'a VelocitySample> + Clone) -> Option<f64> {
    let origin = run.clone().next()?.timestamp_nanos;
    let mut n = 0.0;
    let mut sum_t = 0.0;
    let mut sum_x = 0.0;
    for s in run.clone() {
        n += 1.0;
        sum_t += (s.timestamp_nanos - origin) as f64;
        sum_x += s.x;
    }
    let mean_t = sum_t / n;
    let mean_x = sum_x / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for s in run {
        let dt = (s.timestamp_nanos - origin) as f64 - mean_t;
        cov += dt * (s.x - mean_x);
        var += dt * dt;
    }
    if var == 0.0 {
        return None;
    }
    Some(cov / var)
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
