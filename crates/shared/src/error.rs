use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Transport,
    Status,
    Decode,
}

/// Failure of the one-shot country list fetch. All variants surface to the
/// user the same way: as a message in place of the result grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to reach country data source: {0}")]
    Transport(String),
    #[error("Something went wrong! (HTTP {status})")]
    Status { status: u16 },
    #[error("invalid country list payload: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::Status { .. } => FetchErrorKind::Status,
            Self::Decode(_) => FetchErrorKind::Decode,
        }
    }
}
