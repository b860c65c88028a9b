#![forbid(unsafe_code)]

//! Built-in named scenarios.
//!
//! | Scenario | Start | Gesture | Rests on |
//! |----------|-------|---------|----------|
//! | `fling-left` | right limit | fast swipe left | left limit |
//! | `fling-right` | left limit | fast swipe right | right limit |
//! | `tap` | left limit | press and release in place | unchanged |
//! | `slow-release` | right limit | slow drag, pause, release | right limit |
//! | `interrupt` | right limit | push left, catch mid-settle, fling right | right limit |
//! | `storm` | midpoint | seeded pointer noise, then cancel | either limit |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use toggleview_core::{OffsetLimits, PanelConfig, PanelController};
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::geometry::{DEFAULT_HEIGHT, PanelGeometry};
use crate::replay::{FrameClock, Replayer, Transcript};
use crate::script::GestureScript;

/// Default cap on frames spent settling after the script ends.
pub const DEFAULT_MAX_FRAMES: usize = 2_000;

/// Number of actions in the `storm` scenario.
pub const STORM_ACTIONS: usize = 400;

const FLING: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    FlingLeft,
    FlingRight,
    Tap,
    SlowRelease,
    Interrupt,
    Storm,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Self::FlingLeft,
        Self::FlingRight,
        Self::Tap,
        Self::SlowRelease,
        Self::Interrupt,
        Self::Storm,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlingLeft => "fling-left",
            Self::FlingRight => "fling-right",
            Self::Tap => "tap",
            Self::SlowRelease => "slow-release",
            Self::Interrupt => "interrupt",
            Self::Storm => "storm",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FlingLeft => "fast swipe left from the right limit",
            Self::FlingRight => "fast swipe right from the left limit",
            Self::Tap => "press and release inside the touch slop",
            Self::SlowRelease => "slow drag left, pause, then release",
            Self::Interrupt => "push left, catch the settle, fling right",
            Self::Storm => "seeded pointer noise followed by a cancel",
        }
    }

    /// Offset the controller starts at.
    #[must_use]
    pub fn start_offset(self, limits: OffsetLimits) -> f64 {
        match self {
            Self::FlingRight | Self::Tap => limits.left,
            Self::FlingLeft | Self::SlowRelease | Self::Interrupt => limits.right,
            Self::Storm => limits.left + (limits.right - limits.left) / 2.0,
        }
    }

    /// Gesture script for this scenario.
    #[must_use]
    pub fn script(self, geometry: &PanelGeometry, seed: u64) -> GestureScript {
        let (right_x, y) = geometry.point(0.8, 0.5);
        let (left_x, _) = geometry.point(0.2, 0.5);
        let (mid_x, _) = geometry.point(0.5, 0.5);
        match self {
            Self::FlingLeft => fling(GestureScript::new(), right_x, left_x, y),
            Self::FlingRight => fling(GestureScript::new(), left_x, right_x, y),
            Self::Tap => GestureScript::new().tap(mid_x, y),
            Self::SlowRelease => {
                let (from, _) = geometry.point(0.7, 0.5);
                let (to, _) = geometry.point(0.45, 0.5);
                GestureScript::new()
                    .down(from, y)
                    .swipe((from, y), (to, y), Duration::from_millis(600), 30)
                    .wait(Duration::from_millis(200))
                    .up(to, y)
            }
            Self::Interrupt => {
                // A gentle release keeps the first settle running long
                // enough for the second press to catch it.
                let (push_to, _) = geometry.point(0.6, 0.5);
                let (catch_to, _) = geometry.point(0.7, 0.5);
                let first = GestureScript::new()
                    .down(right_x, y)
                    .swipe((right_x, y), (push_to, y), Duration::from_millis(600), 30)
                    .up(push_to, y)
                    .wait(Duration::from_millis(32));
                fling(first, mid_x, catch_to, y)
            }
            Self::Storm => GestureScript::new()
                .storm(seed, STORM_ACTIONS, geometry.screen())
                .cancel(),
        }
    }
}

fn fling(script: GestureScript, from: f64, to: f64, y: f64) -> GestureScript {
    script
        .down(from, y)
        .swipe((from, y), (to, y), FLING, 8)
        .up(to, y)
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| HarnessError::UnknownScenario {
                name: s.to_string(),
            })
    }
}

/// Replay `scenario` from its start offset and settle.
pub fn run_scenario(
    scenario: Scenario,
    config: PanelConfig,
    clock: FrameClock,
    seed: u64,
    max_frames: usize,
) -> Result<Transcript> {
    let start = scenario.start_offset(config.resolved_limits());
    let geometry = PanelGeometry::from_layout(&config.layout, DEFAULT_HEIGHT);
    let controller = PanelController::new(config.with_initial_offset(start))?;

    let script = scenario.script(&geometry, seed);
    let mut replayer = Replayer::new(controller, geometry, clock);
    replayer.run(&script);
    let frames = replayer.run_until_idle(max_frames)?;
    info!(
        scenario = scenario.name(),
        steps = script.len(),
        settle_frames = frames,
        offset = replayer.controller().offset(),
        "scenario complete"
    );
    Ok(replayer.into_transcript())
}
