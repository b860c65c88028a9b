#![forbid(unsafe_code)]

//! Deterministic replay harness for `toggleview-core`.
//!
//! Plays the host: scripted pointer gestures go in at fixed timestamps, a
//! simulated display clock ticks the controller while it settles, and every
//! input and frame is recorded to a transcript that serializes to JSONL.
//! Identical scripts and configs always produce identical transcripts.
//!
//! # Example
//!
//! ```ignore
//! use toggleview_core::PanelConfig;
//! use toggleview_harness::{FrameClock, Scenario, run_scenario};
//!
//! let transcript = run_scenario(
//!     Scenario::FlingLeft,
//!     PanelConfig::default(),
//!     FrameClock::default(),
//!     1,
//!     2_000,
//! )?;
//! println!("{}", transcript.to_jsonl()?);
//! ```

pub mod cli;
pub mod error;
pub mod geometry;
pub mod replay;
pub mod scenario;
pub mod script;

pub use cli::{Cli, Commands, RunArgs, run, run_from_env};
pub use error::{HarnessError, Result};
pub use geometry::PanelGeometry;
pub use replay::{FrameClock, Replayer, Transcript, TranscriptEntry};
pub use scenario::{Scenario, run_scenario};
pub use script::{GestureScript, PointerAction, ScriptStep};
