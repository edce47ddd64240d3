//! Error types for drcov log parsing.
//!
//! Every failure surfaces as a [`DrcovError`]. Format errors carry the stage
//! that rejected the input together with the offending line and its 0-based
//! position, so a caller can point at the exact place the log went wrong.

use std::fmt;
use thiserror::Error;

use crate::io::error::IoError;

/// Section of the log that was being decoded when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Header,
    ModuleTable,
    BlockTable,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Header => write!(f, "header"),
            Stage::ModuleTable => write!(f, "module table"),
            Stage::BlockTable => write!(f, "basic block table"),
        }
    }
}

/// Coarse classification of a [`DrcovError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The parser was given both or neither of a path and a buffer.
    Construction,
    /// The log content is malformed or uses an unsupported version.
    Format,
    /// A name-based query could not be answered.
    Lookup,
    /// The log was queried before it was parsed.
    Usage,
    /// The input could not be read.
    Io,
}

/// Main error type for drcov operations.
#[derive(Debug, Error)]
pub enum DrcovError {
    #[error("Provide either a file path or a data buffer, not both or neither")]
    Construction,

    /// A line did not have the expected shape
    #[error("Malformed {stage} at line {line}: {message} ({content:?})")]
    Malformed {
        stage: Stage,
        line: usize,
        content: String,
        message: String,
    },

    /// Input ended before a section was complete
    #[error("Unexpected end of input in {stage} at line {line}")]
    UnexpectedEof { stage: Stage, line: usize },

    #[error("Unsupported drcov log version {version} (only version 2 is supported)")]
    UnsupportedVersion { version: u32 },

    #[error("Unsupported module table version {version} at line {line}")]
    UnsupportedTableVersion { version: u32, line: usize },

    /// Binary block table shorter than its declared record count
    #[error("Truncated basic block table: {count} records need {expected} bytes, found {found}")]
    TruncatedBlocks {
        count: usize,
        expected: usize,
        found: usize,
    },

    #[error("No coverage for module '{0}' in log")]
    ModuleNotFound(String),

    #[error("Coverage data has not been parsed yet")]
    NotParsed,

    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl DrcovError {
    /// Build a [`DrcovError::Malformed`] for a specific line.
    pub fn malformed(
        stage: Stage,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DrcovError::Malformed {
            stage,
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DrcovError::Construction => ErrorKind::Construction,
            DrcovError::Malformed { .. }
            | DrcovError::UnexpectedEof { .. }
            | DrcovError::UnsupportedVersion { .. }
            | DrcovError::UnsupportedTableVersion { .. }
            | DrcovError::TruncatedBlocks { .. } => ErrorKind::Format,
            DrcovError::ModuleNotFound(_) => ErrorKind::Lookup,
            DrcovError::NotParsed => ErrorKind::Usage,
            DrcovError::Io(_) => ErrorKind::Io,
        }
    }

    /// The section being decoded when the error was raised, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DrcovError::Malformed { stage, .. } | DrcovError::UnexpectedEof { stage, .. } => {
                Some(*stage)
            }
            DrcovError::UnsupportedVersion { .. } => Some(Stage::Header),
            DrcovError::UnsupportedTableVersion { .. } => Some(Stage::ModuleTable),
            DrcovError::TruncatedBlocks { .. } => Some(Stage::BlockTable),
            _ => None,
        }
    }

    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

/// Result type alias for drcov operations
pub type Result<T> = std::result::Result<T, DrcovError>;
