#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! The spring is stepped by the host's frame clock through
//! [`PanelController::tick`](crate::PanelController::tick).

pub mod spring;

pub use spring::{Spring, SpringConfig, SpringStop};
