#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros used by the crate. Without it, the crate-root macros of the same
//! name expand to nothing, so call sites never need their own `cfg` guards.
//!
//! Callers import the macros the same way in both configurations:
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::{debug, trace};
//! #[cfg(not(feature = "tracing"))]
//! use crate::{debug, trace};
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace};

/// No-op `debug!` used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// No-op `trace!` used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// No-op span used when the `tracing` feature is disabled.
///
/// Returns a guard-like value so `let _span = debug_span!(..).entered();`
/// compiles in both configurations.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug_span {
    ($($arg:tt)*) => {
        $crate::logging::NoopSpan
    };
}

/// Stand-in for `tracing::Span` when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `tracing::Span::entered`.
    #[inline]
    #[must_use]
    pub fn entered(self) -> Self {
        self
    }
}
