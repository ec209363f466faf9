//! Error types for persistence and rendering

use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a load failure, shown to the user when the
/// primary store cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    Parse,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => f.write_str("I/O failure"),
            Self::Parse => f.write_str("parse failure"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize newsletter: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Classify the failure. Serialization problems count as parse failures.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Io { .. } => FailureKind::Io,
            Self::Parse { .. } | Self::Serialize(_) => FailureKind::Parse,
        }
    }
}

#[derive(Error, Debug)]
#[error("failed to render newsletter: {0}")]
pub struct RenderError(#[from] pub std::fmt::Error);
