#![forbid(unsafe_code)]

//! Error types.
//!
//! The controller itself never fails at runtime; the only fallible surface is
//! building or loading a [`PanelConfig`](crate::PanelConfig).

/// Errors that can occur when loading or validating a panel configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Every violated rule, one message each.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "invalid panel config: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
