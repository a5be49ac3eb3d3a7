//! Error types for the namespace client, tree operations and the browser backend.

use crate::entry::DirEntry;
use crate::path::PathName;
use serde::Serialize;
use thiserror::Error;

/// Classification of a namespace error, independent of the path it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    NotDirectory,
    IsDirectory,
    BrokenLink,
    Exists,
    NotEmpty,
    LinkLoop,
    Permission,
    FollowLink,
    Storage,
    Io,
}

/// Errors returned by a namespace client and passed through tree operations.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("{path}: invalid argument: {reason}")]
    InvalidArgument { path: PathName, reason: String },

    #[error("{0}: item does not exist")]
    NotFound(PathName),

    #[error("{0}: not a directory")]
    NotDirectory(PathName),

    #[error("{0}: is a directory")]
    IsDirectory(PathName),

    #[error("{0}: link cannot be resolved")]
    BrokenLink(PathName),

    #[error("{0}: item already exists")]
    Exists(PathName),

    #[error("{0}: directory not empty")]
    NotEmpty(PathName),

    #[error("{0}: too many links")]
    LinkLoop(PathName),

    #[error("{0}: permission denied")]
    Permission(PathName),

    /// A directory server reached a link it will not evaluate.
    ///
    /// `entries` holds what was matched before the link was met; callers that
    /// only need a partial listing may use it.
    #[error("action incomplete: must follow link {}", link.name)]
    FollowLink {
        link: Box<DirEntry>,
        entries: Vec<DirEntry>,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NamespaceError {
    pub fn invalid(path: &PathName, reason: impl Into<String>) -> Self {
        NamespaceError::InvalidArgument {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NamespaceError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            NamespaceError::NotFound(_) => ErrorKind::NotFound,
            NamespaceError::NotDirectory(_) => ErrorKind::NotDirectory,
            NamespaceError::IsDirectory(_) => ErrorKind::IsDirectory,
            NamespaceError::BrokenLink(_) => ErrorKind::BrokenLink,
            NamespaceError::Exists(_) => ErrorKind::Exists,
            NamespaceError::NotEmpty(_) => ErrorKind::NotEmpty,
            NamespaceError::LinkLoop(_) => ErrorKind::LinkLoop,
            NamespaceError::Permission(_) => ErrorKind::Permission,
            NamespaceError::FollowLink { .. } => ErrorKind::FollowLink,
            NamespaceError::Storage(_) => ErrorKind::Storage,
            NamespaceError::Io(_) => ErrorKind::Io,
        }
    }

    /// HTTP status a browser front end should answer with for this error.
    /// The first matching class wins: permission, then missing items.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Permission => 403,
            ErrorKind::NotFound | ErrorKind::BrokenLink => 404,
            _ => 500,
        }
    }
}

/// Service-level errors: configuration, request validation, and wrapped
/// namespace failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid key")]
    InvalidKey,

    #[error("Invalid XSRF token")]
    InvalidToken,

    #[error("No configuration")]
    NoConfiguration,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("cannot listen on non-loopback address {0:?}")]
    NonLoopback(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Namespace(e) => e.http_status(),
            ApiError::InvalidKey | ApiError::InvalidToken => 403,
            ApiError::NoConfiguration => 503,
            ApiError::BadRequest(_) => 400,
            ApiError::ConfigError(_) | ApiError::NonLoopback(_) | ApiError::Io(_) => 500,
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
