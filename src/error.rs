use std::path::PathBuf;

use thiserror::Error;

/// Failures produced by the core parsers, stores and the routine state machine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no numeric value found in duration: {0:?}")]
    MalformedDuration(String),

    #[error("could not parse time from string: {0:?}")]
    UnparseableDate(String),

    #[error("store {path:?} is unavailable: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command {command} is not allowed while {state}")]
    InvalidTransition {
        state: &'static str,
        command: &'static str,
    },
}

impl CoreError {
    pub(crate) fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
