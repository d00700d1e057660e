//! # Error Taxonomy
//!
//! Typed errors crossing layer boundaries. Filesystem and path errors never leave the
//! tool registry: they are rendered into `ToolCallResult::Failure` text there.

use std::fmt;

/// Rejection of a path argument by the path guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    AbsoluteNotAllowed,
    Escape,
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathViolation::AbsoluteNotAllowed => write!(f, "Absolute paths are not allowed"),
            PathViolation::Escape => write!(f, "Path traversal detected - access denied"),
        }
    }
}

impl std::error::Error for PathViolation {}

/// Whether a path was expected to be a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

/// Failure of a single file operation.
#[derive(Debug)]
pub enum FsError {
    Path(PathViolation),
    NotFound(String),
    AlreadyExists(String),
    WrongType { path: String, expected: EntryKind },
    InvalidPattern { pattern: String, message: String },
    Io { action: &'static str, source: std::io::Error },
}

impl FsError {
    pub fn io(action: &'static str) -> impl FnOnce(std::io::Error) -> FsError {
        move |source| FsError::Io { action, source }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::Path(violation) => write!(f, "{violation}"),
            FsError::NotFound(path) => write!(f, "'{path}' does not exist"),
            FsError::AlreadyExists(path) => write!(f, "'{path}' already exists"),
            FsError::WrongType { path, expected } => {
                write!(f, "'{path}' is not a {}", expected.as_str())
            }
            FsError::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{pattern}': {message}")
            }
            FsError::Io { action, source } => write!(f, "{action} failed: {source}"),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Path(violation) => Some(violation),
            FsError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PathViolation> for FsError {
    fn from(violation: PathViolation) -> Self {
        FsError::Path(violation)
    }
}

/// Error talking to a language model provider.
#[derive(Debug)]
pub struct LlmError {
    pub message: String,
    pub provider: String,
}

impl LlmError {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for LlmError {}

/// Turn-level failure surfaced to the user. Tool failures are never turn errors.
#[derive(Debug)]
pub enum TurnError {
    Catalog(anyhow::Error),
    Model(LlmError),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::Catalog(err) => write!(f, "Failed to fetch tool catalog: {err:#}"),
            TurnError::Model(err) => write!(f, "Error communicating with AI: {err}"),
        }
    }
}

impl std::error::Error for TurnError {}

impl From<LlmError> for TurnError {
    fn from(err: LlmError) -> Self {
        TurnError::Model(err)
    }
}
