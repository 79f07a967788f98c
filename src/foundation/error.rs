use std::path::PathBuf;

use crate::foundation::timecode::Timecode;

/// Convenience result type used across mltedit.
pub type EditResult<T> = Result<T, EditError>;

/// Top-level error taxonomy used by document, timeline and persistence APIs.
#[derive(thiserror::Error, Debug)]
pub enum EditError {
    /// Invalid caller-provided input or unsupported document shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// An entry's trim `in` lies after its `out`.
    #[error("invalid range error: in {in_point} exceeds out {out_point}")]
    InvalidRange {
        /// Effective in point.
        in_point: Timecode,
        /// Effective out point.
        out_point: Timecode,
    },

    /// The sentinel node that anchors new tractors is missing.
    #[error("missing sentinel error: no node with id '{0}'")]
    MissingSentinel(String),

    /// A producer/track reference points at an id that is not in the document.
    #[error("unresolved reference error: '{0}'")]
    UnresolvedReference(String),

    /// Inserting a node would make an id appear twice.
    #[error("duplicate id error: '{0}'")]
    DuplicateId(String),

    /// Malformed XML input or a failure while writing XML.
    #[error("xml error: {0}")]
    Xml(String),

    /// Writing or reading a project file failed.
    #[error("persistence error: '{}': {source}", .path.display())]
    Persistence {
        /// File the operation targeted.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditError {
    /// Build a [`EditError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EditError::UnresolvedReference`] value.
    pub fn unresolved(id: impl Into<String>) -> Self {
        Self::UnresolvedReference(id.into())
    }

    /// Build a [`EditError::Xml`] value.
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    /// Build a [`EditError::Persistence`] value.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
