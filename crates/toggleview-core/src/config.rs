#![forbid(unsafe_code)]

//! Panel configuration.
//!
//! Captures every tunable of the controller as a single [`PanelConfig`] that
//! can be built in code or loaded from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! # toggleview.toml
//! touch_slop_dp = 20.0
//! density = 2.75
//!
//! [layout]
//! viewport_width = 1080.0
//! left_panel_width = 320.0
//!
//! [spring]
//! stiffness = 200.0
//! damping_ratio = 0.5
//!
//! [fling_gate]
//! mode = "friction"
//! friction = 1.0
//! max_friction = 4.0
//! ```
//!
//! ```rust,ignore
//! let config = PanelConfig::from_toml_file("toggleview.toml")?;
//! let config = PanelConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Low stiffness, medium bounce, 20dp slop, 1px minimum visible change,
//! 500ms velocity window, velocities measured per 10000ms, fling always
//! allowed. Limits default to `[0, viewport_width]`.

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Density;

pub use crate::animation::spring::SpringConfig;
pub use crate::velocity::VelocityConfig;

/// Default touch slop in density-independent pixels.
pub const DEFAULT_TOUCH_SLOP_DP: f64 = 20.0;

/// Default minimum visible change in pixels.
pub const DEFAULT_MIN_VISIBLE_CHANGE: f64 = 1.0;

/// Default unit for fling velocities.
pub const DEFAULT_VELOCITY_UNIT: Duration = Duration::from_millis(10_000);

/// Default viewport width used when none is configured.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1080.0;

// ---------------------------------------------------------------------------
// Layout and limits
// ---------------------------------------------------------------------------

/// Panel widths reported by the host's layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct PanelLayout {
    /// Visible window width in pixels.
    pub viewport_width: f64,
    /// Left panel width in pixels.
    pub left_panel_width: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            left_panel_width: 0.0,
        }
    }
}

impl PanelLayout {
    #[must_use]
    pub const fn new(viewport_width: f64, left_panel_width: f64) -> Self {
        Self {
            viewport_width,
            left_panel_width,
        }
    }
}

/// The two permissible resting offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
pub struct OffsetLimits {
    pub left: f64,
    pub right: f64,
}

impl OffsetLimits {
    #[must_use]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Canonical limits for a layout: `[0, viewport_width]`.
    #[must_use]
    pub fn for_layout(layout: &PanelLayout) -> Self {
        Self::new(0.0, layout.viewport_width.max(0.0))
    }

    /// Clamp an offset into the range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, offset: f64) -> f64 {
        offset.max(self.left).min(self.right)
    }

    /// Whether both limits coincide.
    #[inline]
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.left >= self.right
    }

    /// Limit reached by moving in the direction of `velocity`.
    ///
    /// Negative velocity heads left; zero or positive heads right.
    #[inline]
    #[must_use]
    pub fn toward(&self, velocity: f64) -> f64 {
        if velocity < 0.0 { self.left } else { self.right }
    }

    /// Limit closest to `offset`; ties go right.
    #[inline]
    #[must_use]
    pub fn nearest(&self, offset: f64) -> f64 {
        if offset - self.left < self.right - offset {
            self.left
        } else {
            self.right
        }
    }
}

// ---------------------------------------------------------------------------
// Fling gate
// ---------------------------------------------------------------------------

/// Whether release velocity is allowed to carry into the settle spring.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "config-file",
    serde(tag = "mode", rename_all = "snake_case")
)]
pub enum FlingGate {
    /// Every release flings.
    #[default]
    Always,
    /// Fling only while `friction < max_friction`.
    Friction { friction: f64, max_friction: f64 },
}

impl FlingGate {
    /// Whether a release may fling.
    #[must_use]
    pub fn is_open(&self) -> bool {
        match *self {
            Self::Always => true,
            Self::Friction {
                friction,
                max_friction,
            } => friction < max_friction,
        }
    }
}

// ---------------------------------------------------------------------------
// PanelConfig
// ---------------------------------------------------------------------------

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct PanelConfig {
    pub layout: PanelLayout,
    /// Explicit resting offsets; derived from the layout when absent.
    pub limits: Option<OffsetLimits>,
    /// Offset at construction; the left limit when absent.
    pub initial_offset: Option<f64>,
    /// Touch slop in density-independent pixels.
    pub touch_slop_dp: f64,
    /// Device pixels per density-independent pixel.
    pub density: f64,
    pub spring: SpringConfig,
    /// Displacement (px) and velocity (px per unit) below which the
    /// spring is at rest.
    pub min_visible_change: f64,
    pub velocity: VelocityConfig,
    /// Time unit for fling velocities fed into the spring.
    #[cfg_attr(feature = "config-file", serde(with = "duration_ms"))]
    pub velocity_unit: Duration,
    /// Optional cap on the release velocity magnitude.
    pub max_fling_velocity: Option<f64>,
    pub fling_gate: FlingGate,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            layout: PanelLayout::default(),
            limits: None,
            initial_offset: None,
            touch_slop_dp: DEFAULT_TOUCH_SLOP_DP,
            density: 1.0,
            spring: SpringConfig::default(),
            min_visible_change: DEFAULT_MIN_VISIBLE_CHANGE,
            velocity: VelocityConfig::default(),
            velocity_unit: DEFAULT_VELOCITY_UNIT,
            max_fling_velocity: None,
            fling_gate: FlingGate::Always,
        }
    }
}

impl PanelConfig {
    /// Canonical configuration for a viewport and left panel width.
    #[must_use]
    pub fn for_viewport(viewport_width: f64, left_panel_width: f64) -> Self {
        Self {
            layout: PanelLayout::new(viewport_width, left_panel_width),
            ..Self::default()
        }
    }

    /// Set explicit limits (builder pattern).
    #[must_use]
    pub fn with_limits(mut self, left: f64, right: f64) -> Self {
        self.limits = Some(OffsetLimits::new(left, right));
        self
    }

    /// Set the starting offset (builder pattern).
    #[must_use]
    pub fn with_initial_offset(mut self, offset: f64) -> Self {
        self.initial_offset = Some(offset);
        self
    }

    /// Set the fling gate (builder pattern).
    #[must_use]
    pub fn with_fling_gate(mut self, gate: FlingGate) -> Self {
        self.fling_gate = gate;
        self
    }

    /// Set the spring parameters (builder pattern).
    #[must_use]
    pub fn with_spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }

    /// Effective limits.
    #[must_use]
    pub fn resolved_limits(&self) -> OffsetLimits {
        self.limits
            .unwrap_or_else(|| OffsetLimits::for_layout(&self.layout))
    }

    /// Effective starting offset.
    #[must_use]
    pub fn resolved_initial_offset(&self) -> f64 {
        self.initial_offset
            .unwrap_or_else(|| self.resolved_limits().left)
    }

    /// Touch slop converted to device pixels.
    #[must_use]
    pub fn touch_slop_px(&self) -> f64 {
        Density::new(self.density).dp_to_px(self.touch_slop_dp)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut finite = |name: &str, value: f64| {
            if !value.is_finite() {
                errors.push(format!("{name} must be finite, got {value}"));
                false
            } else {
                true
            }
        };
        let widths_ok = finite("layout.viewport_width", self.layout.viewport_width)
            & finite("layout.left_panel_width", self.layout.left_panel_width);
        let slop_ok = finite("touch_slop_dp", self.touch_slop_dp) & finite("density", self.density);
        let spring_ok = finite("spring.stiffness", self.spring.stiffness)
            & finite("spring.damping_ratio", self.spring.damping_ratio);
        let mvc_ok = finite("min_visible_change", self.min_visible_change);

        if widths_ok {
            if self.layout.viewport_width < 0.0 {
                errors.push(format!(
                    "layout.viewport_width must be >= 0, got {}",
                    self.layout.viewport_width
                ));
            }
            if self.layout.left_panel_width < 0.0 {
                errors.push(format!(
                    "layout.left_panel_width must be >= 0, got {}",
                    self.layout.left_panel_width
                ));
            }
        }

        if let Some(limits) = self.limits {
            if !limits.left.is_finite() || !limits.right.is_finite() {
                errors.push(format!(
                    "limits must be finite, got [{}, {}]",
                    limits.left, limits.right
                ));
            } else {
                if limits.left < 0.0 || limits.right < 0.0 {
                    errors.push(format!(
                        "limits must be >= 0, got [{}, {}]",
                        limits.left, limits.right
                    ));
                }
                if limits.left > limits.right {
                    errors.push(format!(
                        "limits.left must be <= limits.right, got [{}, {}]",
                        limits.left, limits.right
                    ));
                }
            }
        }

        if let Some(initial) = self.initial_offset {
            let limits = self.resolved_limits();
            if !initial.is_finite() || initial < limits.left || initial > limits.right {
                errors.push(format!(
                    "initial_offset must lie in [{}, {}], got {initial}",
                    limits.left, limits.right
                ));
            }
        }

        if slop_ok {
            if self.touch_slop_dp < 0.0 {
                errors.push(format!(
                    "touch_slop_dp must be >= 0, got {}",
                    self.touch_slop_dp
                ));
            }
            if self.density <= 0.0 {
                errors.push(format!("density must be > 0, got {}", self.density));
            }
        }

        if spring_ok {
            if self.spring.stiffness <= 0.0 {
                errors.push(format!(
                    "spring.stiffness must be > 0, got {}",
                    self.spring.stiffness
                ));
            }
            if self.spring.damping_ratio <= 0.0 {
                errors.push(format!(
                    "spring.damping_ratio must be > 0, got {}",
                    self.spring.damping_ratio
                ));
            }
        }

        if mvc_ok && self.min_visible_change <= 0.0 {
            errors.push(format!(
                "min_visible_change must be > 0, got {}",
                self.min_visible_change
            ));
        }

        if self.velocity.retention.is_zero() {
            errors.push("velocity.retention must be > 0".into());
        }
        if self.velocity_unit.is_zero() {
            errors.push("velocity_unit must be > 0".into());
        }

        if let Some(max) = self.max_fling_velocity
            && !(max.is_finite() && max > 0.0)
        {
            errors.push(format!("max_fling_velocity must be > 0, got {max}"));
        }

        if let FlingGate::Friction {
            friction,
            max_friction,
        } = self.fling_gate
        {
            if friction.is_nan() || friction < 0.0 {
                errors.push(format!("fling_gate.friction must be >= 0, got {friction}"));
            }
            if max_friction.is_nan() || max_friction < 0.0 {
                errors.push(format!(
                    "fling_gate.max_friction must be >= 0, got {max_friction}"
                ));
            }
        }

        errors
    }

    /// Return `self` if valid, or every violated rule.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config-file")]
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for Duration
// ---------------------------------------------------------------------------

/// Serialize a [`Duration`] as whole milliseconds.
#[cfg(feature = "config-file")]
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PanelConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.resolved_limits(), OffsetLimits::new(0.0, 1080.0));
        assert_eq!(config.resolved_initial_offset(), 0.0);
        assert_eq!(config.touch_slop_px(), 20.0);
    }

    #[test]
    fn slop_scales_with_density() {
        let config = PanelConfig {
            density: 3.0,
            ..PanelConfig::default()
        };
        assert_eq!(config.touch_slop_px(), 60.0);
    }

    #[test]
    fn explicit_limits_override_layout() {
        let config = PanelConfig::for_viewport(1000.0, 300.0).with_limits(100.0, 400.0);
        assert_eq!(config.resolved_limits(), OffsetLimits::new(100.0, 400.0));
        assert_eq!(config.resolved_initial_offset(), 100.0);
    }

    #[test]
    fn negative_limits_rejected() {
        let config = PanelConfig::default().with_limits(-10.0, 100.0);
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("limits must be >= 0")));
    }

    #[test]
    fn inverted_limits_rejected() {
        let config = PanelConfig::default().with_limits(500.0, 100.0);
        assert!(
            config
                .validate()
                .iter()
                .any(|e| e.contains("limits.left must be <= limits.right"))
        );
    }

    #[test]
    fn non_positive_stiffness_rejected() {
        let config = PanelConfig::default().with_spring(SpringConfig {
            stiffness: 0.0,
            damping_ratio: 0.5,
        });
        let err = config.validated().unwrap_err();
        assert!(err.to_string().contains("spring.stiffness must be > 0"));
    }

    #[test]
    fn undamped_spring_rejected() {
        for damping_ratio in [0.0, -0.1] {
            let config = PanelConfig::default().with_spring(SpringConfig {
                stiffness: 200.0,
                damping_ratio,
            });
            let err = config.validated().unwrap_err();
            assert!(
                err.to_string().contains("spring.damping_ratio must be > 0"),
                "{err}"
            );
        }
    }

    #[test]
    fn all_violations_reported() {
        let config = PanelConfig {
            min_visible_change: 0.0,
            density: -1.0,
            velocity_unit: Duration::ZERO,
            ..PanelConfig::default()
        };
        assert_eq!(config.validate().len(), 3, "{:?}", config.validate());
    }

    #[test]
    fn non_finite_values_rejected() {
        let config = PanelConfig {
            touch_slop_dp: f64::NAN,
            ..PanelConfig::default()
        };
        assert!(
            config
                .validate()
                .iter()
                .any(|e| e.contains("touch_slop_dp must be finite"))
        );
    }

    #[test]
    fn initial_offset_out_of_range_rejected() {
        let config = PanelConfig::for_viewport(1000.0, 300.0).with_initial_offset(1500.0);
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn equal_limits_allowed() {
        let config = PanelConfig::default().with_limits(0.0, 0.0);
        assert!(config.validate().is_empty());
        assert!(config.resolved_limits().is_collapsed());
    }

    #[test]
    fn limits_helpers() {
        let limits = OffsetLimits::new(0.0, 1000.0);
        assert_eq!(limits.clamp(-5.0), 0.0);
        assert_eq!(limits.clamp(1005.0), 1000.0);
        assert_eq!(limits.clamp(400.0), 400.0);
        assert_eq!(limits.toward(-0.1), 0.0);
        assert_eq!(limits.toward(0.0), 1000.0);
        assert_eq!(limits.nearest(499.0), 0.0);
        assert_eq!(limits.nearest(500.0), 1000.0);
    }

    #[test]
    fn fling_gate() {
        assert!(FlingGate::Always.is_open());
        assert!(
            FlingGate::Friction {
                friction: 1.0,
                max_friction: f64::INFINITY
            }
            .is_open()
        );
        assert!(
            !FlingGate::Friction {
                friction: 2.0,
                max_friction: 2.0
            }
            .is_open()
        );
    }

    #[cfg(feature = "config-file")]
    mod loading {
        use super::*;

        #[test]
        fn toml_partial_uses_defaults() {
            let config = PanelConfig::from_toml_str(
                r#"
                density = 2.0

                [layout]
                viewport_width = 720.0

                [spring]
                stiffness = 1500.0
                "#,
            )
            .unwrap();
            assert_eq!(config.layout.viewport_width, 720.0);
            assert_eq!(config.spring.stiffness, 1500.0);
            assert_eq!(config.spring.damping_ratio, 0.5);
            assert_eq!(config.touch_slop_px(), 40.0);
            assert_eq!(config.velocity_unit, DEFAULT_VELOCITY_UNIT);
        }

        #[test]
        fn toml_fling_gate_and_durations() {
            let config = PanelConfig::from_toml_str(
                r#"
                velocity_unit = 1000

                [velocity]
                retention = 250

                [fling_gate]
                mode = "friction"
                friction = 1.0
                max_friction = 3.0
                "#,
            )
            .unwrap();
            assert_eq!(config.velocity_unit, Duration::from_secs(1));
            assert_eq!(config.velocity.retention, Duration::from_millis(250));
            assert_eq!(config.velocity.assume_stopped, Duration::from_millis(40));
            assert_eq!(
                config.fling_gate,
                FlingGate::Friction {
                    friction: 1.0,
                    max_friction: 3.0
                }
            );
        }

        #[test]
        fn toml_invalid_values_fail_validation() {
            let err = PanelConfig::from_toml_str("min_visible_change = -1.0").unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
        }

        #[test]
        fn toml_zero_damping_fails_validation() {
            let err = PanelConfig::from_toml_str("[spring]\nstiffness = 200.0\ndamping_ratio = 0.0\n")
                .unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
        }

        #[test]
        fn toml_syntax_error() {
            let err = PanelConfig::from_toml_str("density = ").unwrap_err();
            assert!(matches!(err, ConfigError::Toml(_)));
        }

        #[test]
        fn json_round_trip() {
            let config = PanelConfig::for_viewport(1000.0, 300.0)
                .with_limits(0.0, 1000.0)
                .with_initial_offset(1000.0);
            let json = serde_json::to_string(&config).unwrap();
            let back = PanelConfig::from_json_str(&json).unwrap();
            assert_eq!(back, config);
        }

        #[test]
        fn json_syntax_error() {
            let err = PanelConfig::from_json_str("{").unwrap_err();
            assert!(matches!(err, ConfigError::Json(_)));
        }

        #[test]
        fn toml_file_missing() {
            let err = PanelConfig::from_toml_file("/nonexistent/toggleview.toml").unwrap_err();
            assert!(matches!(err, ConfigError::Io(_)));
        }

        #[test]
        fn toml_file_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("toggleview.toml");
            let config = PanelConfig::for_viewport(800.0, 200.0);
            std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
            assert_eq!(PanelConfig::from_toml_file(&path).unwrap(), config);
        }
    }
}
