#![forbid(unsafe_code)]

//! Deterministic replay of gesture scripts against a controller.
//!
//! The [`Replayer`] owns a [`PanelController`], a fixed-cadence
//! [`FrameClock`] and the simulated [`PanelGeometry`]. Pointer steps are
//! delivered at their scripted times; between them the clock ticks the
//! controller once per frame while it is settling. Every delivered input
//! and every tick is recorded as a [`TranscriptEntry`].
//!
//! # JSONL Schema
//!
//! ```json
//! {"step":0,"elapsed_nanos":0,"input":"down","consumed":true,"mode":"idle","offset":1080.0,"offset_delta":0.0,"events":[]}
//! {"step":9,"elapsed_nanos":136666664,"input":"tick","consumed":true,"mode":"settling","offset":412.5,"offset_delta":-60.1,"events":[]}
//! {"step":40,"elapsed_nanos":650000000,"input":"tick","consumed":true,"mode":"idle","offset":0.0,"offset_delta":-0.4,"events":[{"kind":"settled","limit":0.0}]}
//! ```

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use toggleview_core::{Mode, PanelController, PanelEvent, Response};
use tracing::{debug, info_span};

use crate::error::{HarnessError, Result};
use crate::geometry::PanelGeometry;
use crate::script::{GestureScript, PointerAction};

/// Default frame rate of the simulated display.
pub const DEFAULT_FPS: u32 = 60;

// ============================================================================
// Frame clock
// ============================================================================

/// Fixed-cadence clock standing in for the host's display refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    frame_nanos: u64,
    now_nanos: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            frame_nanos: 1_000_000_000 / u64::from(DEFAULT_FPS),
            now_nanos: 0,
        }
    }
}

impl FrameClock {
    /// Clock ticking `fps` times per second.
    pub fn from_fps(fps: u32) -> Result<Self> {
        if fps == 0 || fps > 1_000 {
            return Err(HarnessError::invalid(format!(
                "fps must be in 1..=1000, got {fps}"
            )));
        }
        Ok(Self {
            frame_nanos: 1_000_000_000 / u64::from(fps),
            now_nanos: 0,
        })
    }

    #[must_use]
    pub fn frame(&self) -> Duration {
        Duration::from_nanos(self.frame_nanos)
    }

    #[must_use]
    pub fn now_nanos(&self) -> u64 {
        self.now_nanos
    }

    /// Advance by one frame and return its length.
    pub fn advance(&mut self) -> Duration {
        self.now_nanos = self.now_nanos.saturating_add(self.frame_nanos);
        self.frame()
    }

    /// Whether a whole frame fits before `t_nanos`.
    #[must_use]
    pub fn frame_fits_before(&self, t_nanos: u64) -> bool {
        self.now_nanos.saturating_add(self.frame_nanos) <= t_nanos
    }

    /// Jump forward to `t_nanos`; never moves backwards.
    pub fn jump_to(&mut self, t_nanos: u64) {
        self.now_nanos = self.now_nanos.max(t_nanos);
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// One recorded input or frame tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub step: usize,
    pub elapsed_nanos: u64,
    /// `down`, `move`, `up`, `cancel` or `tick`.
    pub input: &'static str,
    pub consumed: bool,
    #[serde(serialize_with = "serialize_mode")]
    pub mode: Mode,
    pub offset: f64,
    pub offset_delta: f64,
    #[serde(serialize_with = "serialize_events")]
    pub events: Vec<PanelEvent>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// All events in emission order.
    pub fn events(&self) -> impl Iterator<Item = &PanelEvent> {
        self.entries.iter().flat_map(|e| e.events.iter())
    }

    /// Offset after the last entry.
    #[must_use]
    pub fn final_offset(&self) -> Option<f64> {
        self.entries.last().map(|e| e.offset)
    }

    /// Number of recorded frame ticks.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.entries.iter().filter(|e| e.input == "tick").count()
    }

    /// Write one JSON object per entry.
    pub fn write_jsonl<W: Write>(&self, mut out: W) -> Result<()> {
        for entry in &self.entries {
            serde_json::to_writer(&mut out, entry)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// The transcript as a JSONL string.
    pub fn to_jsonl(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_jsonl(&mut buf)?;
        String::from_utf8(buf).map_err(|e| HarnessError::invalid(e.to_string()))
    }

    fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Idle => "idle",
        Mode::Dragging => "dragging",
        Mode::Settling => "settling",
    }
}

fn serialize_mode<S: Serializer>(mode: &Mode, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(mode_name(*mode))
}

fn serialize_events<S: Serializer>(
    events: &[PanelEvent],
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = s.serialize_seq(Some(events.len()))?;
    for event in events {
        seq.serialize_element(&EventRecord(event))?;
    }
    seq.end()
}

/// `{"kind": ..., <fields>}` view of an event.
struct EventRecord<'a>(&'a PanelEvent);

impl Serialize for EventRecord<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(3))?;
        map.serialize_entry("kind", self.0.name())?;
        match *self.0 {
            PanelEvent::DragStarted { offset } | PanelEvent::SettleInterrupted { offset } => {
                map.serialize_entry("offset", &offset)?;
            }
            PanelEvent::SettleStarted { target, velocity }
            | PanelEvent::SettleRearmed { target, velocity } => {
                map.serialize_entry("target", &target)?;
                map.serialize_entry("velocity", &velocity)?;
            }
            PanelEvent::Settled { limit } => map.serialize_entry("limit", &limit)?,
            PanelEvent::Tap { x, y } => {
                map.serialize_entry("x", &x)?;
                map.serialize_entry("y", &y)?;
            }
        }
        map.end()
    }
}

// ============================================================================
// Replayer
// ============================================================================

/// Drives a controller through scripts on a simulated frame clock.
#[derive(Debug, Clone)]
pub struct Replayer {
    controller: PanelController,
    geometry: PanelGeometry,
    clock: FrameClock,
    transcript: Transcript,
}

impl Replayer {
    #[must_use]
    pub fn new(controller: PanelController, geometry: PanelGeometry, clock: FrameClock) -> Self {
        Self {
            controller,
            geometry,
            clock,
            transcript: Transcript::default(),
        }
    }

    #[must_use]
    pub fn controller(&self) -> &PanelController {
        &self.controller
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// Deliver every step of `script`, offset by the current clock time.
    pub fn run(&mut self, script: &GestureScript) {
        let _span = info_span!("replay", steps = script.len()).entered();
        let base = self.clock.now_nanos();
        for step in script.steps() {
            let at = base.saturating_add(step.at_nanos);
            self.advance_to(at);
            self.deliver(step.action, at);
        }
        self.advance_to(base.saturating_add(script.duration().as_nanos() as u64));
    }

    /// Tick until the controller leaves Settling.
    ///
    /// Returns the number of frames ticked, or [`HarnessError::NotSettled`]
    /// if it is still settling after `max_frames`.
    pub fn run_until_idle(&mut self, max_frames: usize) -> Result<usize> {
        let mut frames = 0;
        while self.controller.is_settling() {
            if frames == max_frames {
                return Err(HarnessError::NotSettled { frames });
            }
            self.tick();
            frames += 1;
        }
        debug!(frames, offset = self.controller.offset(), "idle");
        Ok(frames)
    }

    /// Tick frames up to `t_nanos` while settling, then jump the clock there.
    fn advance_to(&mut self, t_nanos: u64) {
        while self.controller.is_settling() && self.clock.frame_fits_before(t_nanos) {
            self.tick();
        }
        self.clock.jump_to(t_nanos);
    }

    fn tick(&mut self) {
        let dt = self.clock.advance();
        let response = self.controller.tick(dt);
        self.record("tick", response);
    }

    fn deliver(&mut self, action: PointerAction, at_nanos: u64) {
        let response = match action {
            PointerAction::Down { .. } => {
                let hits = self.geometry.hit_rects(self.controller.offset());
                match action.sample(at_nanos) {
                    Some(sample) => self.controller.on_pointer_down(sample, &hits),
                    None => Response::ignored(),
                }
            }
            PointerAction::Move { .. } => match action.sample(at_nanos) {
                Some(sample) => self.controller.on_pointer_move(sample),
                None => Response::ignored(),
            },
            PointerAction::Up { .. } => match action.sample(at_nanos) {
                Some(sample) => self.controller.on_pointer_up(sample),
                None => Response::ignored(),
            },
            PointerAction::Cancel => self.controller.on_pointer_cancel(),
        };
        self.record(action.name(), response);
    }

    fn record(&mut self, input: &'static str, response: Response) {
        let step = self.transcript.entries.len();
        self.transcript.push(TranscriptEntry {
            step,
            elapsed_nanos: self.clock.now_nanos(),
            input,
            consumed: response.consumed,
            mode: self.controller.mode(),
            offset: self.controller.offset(),
            offset_delta: response.offset_delta,
            events: response.events,
        });
    }
}
