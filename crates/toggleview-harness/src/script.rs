#![forbid(unsafe_code)]

//! Scripted pointer gestures.
//!
//! A [`GestureScript`] is a list of pointer actions stamped with absolute
//! times. Builder calls append at a cursor; [`wait`](GestureScript::wait)
//! moves the cursor forward, which is when the replayer ticks the frame
//! clock.
//!
//! ```ignore
//! let script = GestureScript::new()
//!     .down(800.0, 900.0)
//!     .swipe((800.0, 900.0), (200.0, 900.0), Duration::from_millis(120), 8)
//!     .up(200.0, 900.0);
//! ```

use std::time::Duration;

use toggleview_core::{PointerSample, Rect};

/// Hold time between down and up for [`GestureScript::tap`].
pub const TAP_HOLD: Duration = Duration::from_millis(60);

/// One pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Cancel,
}

impl PointerAction {
    /// Short stable name, used in transcripts.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Down { .. } => "down",
            Self::Move { .. } => "move",
            Self::Up { .. } => "up",
            Self::Cancel => "cancel",
        }
    }

    /// Sample delivered to the controller at `timestamp_nanos`.
    #[must_use]
    pub fn sample(&self, timestamp_nanos: u64) -> Option<PointerSample> {
        match *self {
            Self::Down { x, y } | Self::Move { x, y } | Self::Up { x, y } => {
                Some(PointerSample::new(x, y, timestamp_nanos))
            }
            Self::Cancel => None,
        }
    }
}

/// A pointer action at an absolute time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub at_nanos: u64,
    pub action: PointerAction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureScript {
    steps: Vec<ScriptStep>,
    cursor_nanos: u64,
}

impl GestureScript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn down(self, x: f64, y: f64) -> Self {
        self.push(PointerAction::Down { x, y })
    }

    #[must_use]
    pub fn move_to(self, x: f64, y: f64) -> Self {
        self.push(PointerAction::Move { x, y })
    }

    #[must_use]
    pub fn up(self, x: f64, y: f64) -> Self {
        self.push(PointerAction::Up { x, y })
    }

    #[must_use]
    pub fn cancel(self) -> Self {
        self.push(PointerAction::Cancel)
    }

    /// Advance the cursor without input.
    #[must_use]
    pub fn wait(mut self, d: Duration) -> Self {
        self.cursor_nanos = self.cursor_nanos.saturating_add(duration_nanos(d));
        self
    }

    /// Evenly spaced moves from `from` to `to` over `duration`.
    ///
    /// Emits `steps` moves; the first lands one interval after the cursor,
    /// the last exactly at `to`. Does not press or release.
    #[must_use]
    pub fn swipe(mut self, from: (f64, f64), to: (f64, f64), duration: Duration, steps: u32) -> Self {
        let steps = steps.max(1);
        let interval = duration / steps;
        for i in 1..=steps {
            let t = f64::from(i) / f64::from(steps);
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            self = self.wait(interval).move_to(x, y);
        }
        self
    }

    /// Down, hold, up at the same point.
    #[must_use]
    pub fn tap(self, x: f64, y: f64) -> Self {
        self.down(x, y).wait(TAP_HOLD).up(x, y)
    }

    /// Append `count` pseudo-random actions inside `area`.
    ///
    /// Deterministic for a given seed. Includes stray moves and ups with no
    /// press, cancels, jumps, and pauses long enough to let a settle run.
    #[must_use]
    pub fn storm(mut self, seed: u64, count: usize, area: Rect) -> Self {
        let mut rng = Rng::new(seed);
        let (mut x, mut y) = (area.x + area.width / 2.0, area.y + area.height / 2.0);
        for _ in 0..count {
            self = self.wait(Duration::from_millis(rng.next_below(24)));
            match rng.next_below(100) {
                0..=14 => {
                    x = area.x + rng.next_unit() * area.width;
                    y = area.y + rng.next_unit() * area.height;
                    self = self.down(x, y);
                }
                15..=69 => {
                    x += (rng.next_unit() - 0.5) * 120.0;
                    y += (rng.next_unit() - 0.5) * 40.0;
                    self = self.move_to(x, y);
                }
                70..=84 => self = self.up(x, y),
                85..=89 => self = self.cancel(),
                _ => self = self.wait(Duration::from_millis(100 + rng.next_below(400))),
            }
        }
        self
    }

    /// Steps in time order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time of the cursor, i.e. the script's total length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.cursor_nanos)
    }

    fn push(mut self, action: PointerAction) -> Self {
        self.steps.push(ScriptStep {
            at_nanos: self.cursor_nanos,
            action,
        });
        self
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Simple deterministic PRNG (xorshift64) for reproducible storms.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn next_below(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        self.next() % max
    }

    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }
}
