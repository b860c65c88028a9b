#![forbid(unsafe_code)]

//! Panel offset controller: turns pointer samples into a clamped horizontal
//! offset and settles it on one of two limits with a spring.
//!
//! [`PanelController`] is a single-threaded state machine. The host feeds it
//! pointer events and, while it is [`Mode::Settling`], frame ticks. Every call
//! returns a [`Response`] carrying the offset delta to apply to both panels
//! and any state-change notifications.
//!
//! # State Machine
//!
//! - **Idle**: offset stationary. A pointer down inside either panel (grown
//!   by the touch slop) arms a press but stays Idle.
//! - **Dragging**: entered once the armed press moves at least the touch
//!   slop away from where it started. Moves shift the offset by the clamped
//!   pointer delta.
//! - **Settling**: entered on release or cancel of a drag. A spring carries
//!   the offset toward the limit chosen from the release velocity.
//!
//! A press released before it ever became a drag is reported as
//! [`PanelEvent::Tap`] and never settles.
//!
//! # Invariants
//!
//! 1. `limits.left <= offset <= limits.right` after every call.
//! 2. Whenever the controller returns to Idle from Settling, the offset is
//!    exactly one of the limits.
//! 3. `Tap` and `DragStarted` never both emit for one down/up sequence.
//! 4. An accepted pointer down while Settling stops the spring before the
//!    call returns; a stale animation never competes with a new drag.
//! 5. A spring that reaches a limit still moving outward settles there in
//!    the same tick, so the panel never sits pinned while still Settling.
//!
//! # Failure Modes
//!
//! - Moves, ups and cancels without an accepted down are ignored
//!   (`consumed == false`). So are ticks outside Settling.
//! - Non-finite pointer coordinates are ignored.
//! - With `limits.left == limits.right` every drag is a no-op and the
//!   release settles in the same call.

use std::time::Duration;

use crate::animation::spring::{Spring, SpringStop};
use crate::config::{OffsetLimits, PanelConfig, PanelLayout};
use crate::error::ConfigError;
use crate::event::{PanelEvent, PointerSample, Response};
use crate::geometry::HitRects;
use crate::velocity::VelocityEstimator;

#[cfg(feature = "tracing")]
use crate::logging::{debug, debug_span, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, debug_span, trace};

/// Externally observable phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Idle,
    Dragging,
    Settling,
}

/// Drag, fling and settle controller for a pair of panels.
#[derive(Debug, Clone)]
pub struct PanelController {
    config: PanelConfig,
    limits: OffsetLimits,
    touch_slop: f64,
    offset: f64,
    mode: Mode,
    /// Down sample of a press that has not exceeded the slop yet.
    press: Option<PointerSample>,
    /// Most recent pointer sample of the active gesture.
    last_sample: Option<PointerSample>,
    estimator: VelocityEstimator,
    spring: Option<Spring>,
}

impl PanelController {
    /// Create a controller, validating the configuration first.
    pub fn new(config: PanelConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let limits = config.resolved_limits();
        let offset = limits.clamp(config.resolved_initial_offset());
        Ok(Self {
            limits,
            touch_slop: config.touch_slop_px(),
            offset,
            mode: Mode::Idle,
            press: None,
            last_sample: None,
            estimator: VelocityEstimator::new(config.velocity),
            spring: None,
            config,
        })
    }

    /// Current offset applied to both panels.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the host should keep calling [`tick`](Self::tick).
    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.mode == Mode::Settling
    }

    /// Whether a press is armed but has not become a drag yet.
    #[inline]
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Effective resting offsets.
    #[inline]
    #[must_use]
    pub fn limits(&self) -> OffsetLimits {
        self.limits
    }

    /// Touch slop in device pixels.
    #[inline]
    #[must_use]
    pub fn touch_slop(&self) -> f64 {
        self.touch_slop
    }

    /// Target of the running spring, if settling.
    #[must_use]
    pub fn settle_target(&self) -> Option<f64> {
        self.spring.as_ref().map(Spring::target)
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Handle a pointer down.
    ///
    /// The pointer is accepted when it falls inside either panel rectangle
    /// grown by the touch slop on all sides. Otherwise the event is not
    /// consumed and nothing changes, even while settling.
    pub fn on_pointer_down(&mut self, sample: PointerSample, hits: &HitRects) -> Response {
        if !sample.is_finite() {
            trace!("ignoring non-finite pointer down");
            return Response::ignored();
        }
        if !hits.accepts(sample.x, sample.y, self.touch_slop) {
            trace!(x = sample.x, y = sample.y, "pointer down outside both panels");
            return Response::ignored();
        }

        let mut response = Response::consumed();
        match self.mode {
            Mode::Settling => {
                self.spring = None;
                response.events.push(PanelEvent::SettleInterrupted {
                    offset: self.offset,
                });
                debug!(offset = self.offset, "settle interrupted by pointer down");
                self.enter_dragging(&mut response);
            }
            Mode::Dragging => {
                trace!("pointer down while dragging; restarting velocity tracking");
            }
            Mode::Idle => {
                self.press = Some(sample);
            }
        }

        self.estimator.reset();
        self.estimator.add_sample(sample.x, sample.timestamp_nanos);
        self.last_sample = Some(sample);
        response
    }

    /// Handle a pointer move.
    pub fn on_pointer_move(&mut self, sample: PointerSample) -> Response {
        let Some(last) = self.last_sample else {
            trace!("ignoring pointer move without pointer down");
            return Response::ignored();
        };
        if !sample.is_finite() {
            trace!("ignoring non-finite pointer move");
            return Response::ignored();
        }

        let mut response = Response::consumed();
        if let Some(press) = self.press {
            if press.distance(&sample) < self.touch_slop {
                self.record(sample);
                return response;
            }
            self.enter_dragging(&mut response);
        }

        response.offset_delta = self.apply_delta(sample.x - last.x);
        self.record(sample);
        response
    }

    /// Handle a pointer up.
    ///
    /// A press that never exceeded the touch slop resolves as a tap. A drag
    /// applies the final delta and starts settling.
    pub fn on_pointer_up(&mut self, sample: PointerSample) -> Response {
        let Some(last) = self.last_sample else {
            trace!("ignoring pointer up without pointer down");
            return Response::ignored();
        };

        let mut response = Response::consumed();
        if let Some(press) = self.press {
            if !sample.is_finite() || press.distance(&sample) < self.touch_slop {
                self.press = None;
                self.last_sample = None;
                response.events.push(PanelEvent::Tap {
                    x: press.x,
                    y: press.y,
                });
                debug!(x = press.x, y = press.y, "tap");
                return response;
            }
            // Moved past the slop with no intermediate moves delivered.
            self.enter_dragging(&mut response);
        }

        if sample.is_finite() {
            response.offset_delta = self.apply_delta(sample.x - last.x);
            self.record(sample);
        }
        self.begin_settle(&mut response);
        response
    }

    /// Handle a pointer cancel.
    ///
    /// An armed press is dropped silently. A drag settles exactly as if the
    /// pointer had been released at its last position.
    pub fn on_pointer_cancel(&mut self) -> Response {
        if self.last_sample.is_none() {
            trace!("ignoring pointer cancel without pointer down");
            return Response::ignored();
        }
        let mut response = Response::consumed();
        if self.press.take().is_some() {
            self.last_sample = None;
            debug!("press cancelled before drag");
            return response;
        }
        self.begin_settle(&mut response);
        response
    }

    // -----------------------------------------------------------------------
    // Animation
    // -----------------------------------------------------------------------

    /// Advance the settle animation by `dt`.
    ///
    /// A no-op outside [`Mode::Settling`].
    pub fn tick(&mut self, dt: Duration) -> Response {
        if self.mode != Mode::Settling {
            return Response::ignored();
        }
        let Some(mut spring) = self.spring.take() else {
            self.mode = Mode::Idle;
            return Response::ignored();
        };
        let _span = debug_span!("settle_tick", dt_nanos = dt.as_nanos() as u64).entered();

        let mut response = Response::consumed();
        let mut remaining = dt;
        loop {
            let stop = spring.advance_bounded(remaining, self.limits.left, self.limits.right);
            response.offset_delta += self.apply_position(spring.position());

            match stop {
                SpringStop::Running => {
                    self.spring = Some(spring);
                    break;
                }
                SpringStop::AtRest => {
                    self.settle_at(spring.target(), &mut response);
                    break;
                }
                SpringStop::HitBound {
                    bound,
                    velocity,
                    remaining: rest,
                } => {
                    let Some(target) = self.rearm_target(bound, velocity) else {
                        self.settle_at(bound, &mut response);
                        break;
                    };
                    spring = self.make_spring(target, velocity);
                    response
                        .events
                        .push(PanelEvent::SettleRearmed { target, velocity });
                    debug!(target, velocity, bound, "settle re-armed at limit");
                    if rest.is_zero() {
                        self.spring = Some(spring);
                        break;
                    }
                    remaining = rest;
                }
            }
        }
        response
    }

    /// Advance the settle animation by `dt_nanos` nanoseconds.
    pub fn tick_nanos(&mut self, dt_nanos: u64) -> Response {
        self.tick(Duration::from_nanos(dt_nanos))
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// Apply a new layout.
    ///
    /// Derived limits follow the viewport; explicit limits stay as
    /// configured. The offset is re-clamped, and a running spring is
    /// retargeted to the same side of the new range.
    pub fn set_layout(&mut self, layout: PanelLayout) -> Response {
        let old = self.limits;
        self.config.layout = layout;
        self.limits = self.config.resolved_limits();

        let mut response = Response::ignored();
        response.offset_delta = self.apply_position(self.offset);

        if let Some(spring) = self.spring.take() {
            let target = if spring.target() <= old.left {
                self.limits.left
            } else {
                self.limits.right
            };
            if self.limits.is_collapsed() {
                self.settle_at(target, &mut response);
            } else {
                self.spring = Some(self.make_spring(target, spring.velocity()));
            }
        }
        debug!(
            left = self.limits.left,
            right = self.limits.right,
            offset = self.offset,
            "layout applied"
        );
        response
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn enter_dragging(&mut self, response: &mut Response) {
        self.press = None;
        self.mode = Mode::Dragging;
        response.events.push(PanelEvent::DragStarted {
            offset: self.offset,
        });
        debug!(offset = self.offset, "drag started");
    }

    fn begin_settle(&mut self, response: &mut Response) {
        let raw = match self.config.max_fling_velocity {
            Some(max) => self
                .estimator
                .estimate_velocity_with_max(self.config.velocity_unit, max),
            None => self.estimator.estimate_velocity(self.config.velocity_unit),
        };
        let (target, velocity) = if self.config.fling_gate.is_open() {
            (self.limits.toward(raw), raw)
        } else {
            (self.limits.nearest(self.offset), 0.0)
        };

        self.last_sample = None;
        self.press = None;
        self.mode = Mode::Settling;
        response
            .events
            .push(PanelEvent::SettleStarted { target, velocity });
        debug!(offset = self.offset, target, velocity, "settle started");

        let spring = self.make_spring(target, velocity);
        if self.limits.is_collapsed() || spring.within_rest_thresholds() {
            self.settle_at(target, response);
        } else {
            self.spring = Some(spring);
        }
    }

    fn settle_at(&mut self, limit: f64, response: &mut Response) {
        response.offset_delta += self.apply_position(limit);
        self.spring = None;
        self.mode = Mode::Idle;
        response.events.push(PanelEvent::Settled {
            limit: self.offset,
        });
        debug!(limit = self.offset, "settled");
    }

    /// Target for a new cycle after the spring stopped on `bound` carrying
    /// `velocity`, or `None` when the offset should settle on `bound`.
    ///
    /// Residual velocity still pushing outward is absorbed by the limit, so
    /// only a residual heading back into the range re-arms.
    fn rearm_target(&self, bound: f64, velocity: f64) -> Option<f64> {
        if velocity.abs() < self.config.min_visible_change || self.limits.is_collapsed() {
            return None;
        }
        let target = self.limits.toward(velocity);
        (target != bound).then_some(target)
    }

    fn make_spring(&self, target: f64, velocity: f64) -> Spring {
        Spring::from_config(self.offset, target, self.config.spring)
            .with_velocity(velocity)
            .with_rest_threshold(self.config.min_visible_change)
    }

    fn record(&mut self, sample: PointerSample) {
        self.estimator.add_sample(sample.x, sample.timestamp_nanos);
        self.last_sample = Some(sample);
    }

    /// Shift the offset by `delta`, truncated to land on a limit.
    fn apply_delta(&mut self, delta: f64) -> f64 {
        self.apply_position(self.offset + delta)
    }

    /// Move the offset to `position` (clamped); returns the applied delta.
    fn apply_position(&mut self, position: f64) -> f64 {
        let next = self.limits.clamp(position);
        let applied = next - self.offset;
        self.offset = next;
        applied
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
