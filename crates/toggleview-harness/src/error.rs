#![forbid(unsafe_code)]

use thiserror::Error;
use toggleview_core::ConfigError;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("unknown scenario: {name} (try `list`)")]
    UnknownScenario { name: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("controller still settling after {frames} frames")]
    NotSettled { frames: usize },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownScenario { .. } | Self::InvalidArgument { .. } => 2,
            Self::NotSettled { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
