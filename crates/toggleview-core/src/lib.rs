#![forbid(unsafe_code)]

//! Core: drag tracking, fling estimation and spring settling for a two-panel
//! toggle view.
//!
//! # Role in toggleview
//! `toggleview-core` is the interaction layer. The host UI toolkit owns the
//! panels, measures them and renders them; this crate owns the horizontal
//! offset applied to both panels and decides where it goes.
//!
//! # Primary responsibilities
//! - **PanelController**: Idle / Dragging / Settling state machine fed by raw
//!   pointer samples and a host-driven frame clock.
//! - **VelocityEstimator**: windowed least-squares fit of recent samples.
//! - **Spring**: damped harmonic oscillator used for the settle animation.
//! - **PanelConfig**: validated configuration, loadable from TOML or JSON.
//!
//! # How it fits in the system
//! The host forwards pointer events together with the current on-screen
//! rectangles of both panels, applies the returned `offset_delta` to the
//! panels, and calls [`PanelController::tick`] every frame while the
//! controller is settling. `toggleview-harness` drives the same API from
//! scripted gestures for deterministic replay.

pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod velocity;

pub use config::{FlingGate, OffsetLimits, PanelConfig, PanelLayout, SpringConfig};
pub use controller::{Mode, PanelController};
pub use error::ConfigError;
pub use event::{PanelEvent, PointerSample, Response};
pub use geometry::{Density, HitRects, Rect};
pub use velocity::VelocityEstimator;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace};
