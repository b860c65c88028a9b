#![forbid(unsafe_code)]

//! Pointer input and controller output types.
//!
//! # Invariants
//! 1. Every drag is well-formed: `DragStarted` is always followed by
//!    `SettleStarted` before the controller returns to idle.
//! 2. `Tap` and `DragStarted` never both emit for the same down/up sequence.
//! 3. `Settled` always carries one of the two configured limits.

/// One raw pointer reading delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Monotonic timestamp in nanoseconds.
    pub timestamp_nanos: u64,
}

impl PointerSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(x: f64, y: f64, timestamp_nanos: u64) -> Self {
        Self {
            x,
            y,
            timestamp_nanos,
        }
    }

    /// Euclidean distance to another sample's position.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// State-change notifications produced by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// The press exceeded the touch slop and became a drag.
    DragStarted { offset: f64 },
    /// The pointer was released and the spring started.
    SettleStarted { target: f64, velocity: f64 },
    /// The spring was stopped by a limit while still moving and restarted.
    SettleRearmed { target: f64, velocity: f64 },
    /// A new press caught the panels mid-settle.
    SettleInterrupted { offset: f64 },
    /// The spring came to rest exactly on a limit.
    Settled { limit: f64 },
    /// A press was released without ever becoming a drag.
    Tap { x: f64, y: f64 },
}

impl PanelEvent {
    /// Short stable name, used for logs and transcripts.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DragStarted { .. } => "drag_started",
            Self::SettleStarted { .. } => "settle_started",
            Self::SettleRearmed { .. } => "settle_rearmed",
            Self::SettleInterrupted { .. } => "settle_interrupted",
            Self::Settled { .. } => "settled",
            Self::Tap { .. } => "tap",
        }
    }
}

/// Result of feeding one input or one frame tick to the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Whether the host should treat the pointer event as handled.
    pub consumed: bool,
    /// Horizontal displacement to apply to both panels.
    pub offset_delta: f64,
    /// Notifications, in the order they happened.
    pub events: Vec<PanelEvent>,
}

impl Response {
    /// An input the controller did not act on.
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    /// A consumed input with no offset change.
    #[must_use]
    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    /// Whether any emitted event matches `pred`.
    #[must_use]
    pub fn has(&self, pred: impl Fn(&PanelEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }

    /// The limit reported by a `Settled` event, if one was emitted.
    #[must_use]
    pub fn settled_at(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e {
            PanelEvent::Settled { limit } => Some(*limit),
            _ => None,
        })
    }
}
