//! Unified error type for all store operations.

use thiserror::Error;

/// Things that can go wrong when using a store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required field was missing or blank.
    #[error("validation error: {0}")]
    Validation(String),
    /// A uniqueness rule was violated. Carries the offending field name.
    #[error("record with {0} already exists")]
    Conflict(String),
    /// No record matched the given key.
    #[error("not found: {0}")]
    NotFound(String),
    /// The owner has no collection at all.
    #[error("no collection for owner {0}")]
    NoCollection(String),
    /// The owner's collection exists but holds no element with that id.
    #[error("owner {owner} has no element with id {id}")]
    NoElement {
        /// Owner of the collection that was searched.
        owner: String,
        /// Identifier that was not found.
        id: String,
    },
    /// File system problem (read, write, create, rename).
    #[error("i/o error: {0}")]
    Io(String),
    /// Failed to serialize a table to bytes.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Failed to deserialize bytes back into a table.
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

/// Coarse classification of an [`Error`], for callers that map failures
/// onto their own responses (HTTP status codes and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or blank input.
    Validation,
    /// Uniqueness violation.
    Conflict,
    /// Nothing matched.
    NotFound,
    /// Reading, writing or decoding the backing file failed.
    Persistence,
}

impl Error {
    /// Which of the four failure classes this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::NotFound(_) | Error::NoCollection(_) | Error::NoElement { .. } => {
                ErrorKind::NotFound
            }
            Error::Io(_) | Error::Serialize(_) | Error::Deserialize(_) => ErrorKind::Persistence,
        }
    }

    /// `true` for any of the not-found variants.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn missing(what: &str) -> Self {
        Error::Validation(format!("missing {what}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.to_string())
        } else if err.is_syntax() || err.is_eof() || err.is_data() {
            Error::Deserialize(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
