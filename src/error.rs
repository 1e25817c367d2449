//! Error types for rs-textpath.
//!
//! This module defines the error types returned by selector discovery
//! and rule replay operations.

use crate::identity::Identity;

/// Error type for selector discovery and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested occurrence of the target text does not exist in the
    /// reference document.
    #[error("can't find occurrence {occurrence} of {target:?} in the document; either the text is not present or fewer matches exist")]
    StringNotFound {
        /// The substring or pattern that was searched for.
        target: String,
        /// The 1-based occurrence that was requested.
        occurrence: usize,
    },

    /// An identity references a tree position absent from the index.
    ///
    /// This means the identity did not originate from this index, or the
    /// underlying tree changed after indexing.
    #[error("identity {identity} does not originate from this index")]
    UnindexedIdentity {
        /// The identity whose prefix lookup failed.
        identity: Identity,
    },

    /// A requested ancestor climb exceeds the identity's depth.
    #[error("can't climb {climb} levels from an identity of depth {depth}")]
    ClimbOutOfRange {
        /// Depth of the identity being climbed.
        depth: usize,
        /// Number of levels requested.
        climb: usize,
    },

    /// No element on the page matches the rule's parent selector.
    #[error("no element matches the parent selector; the page structure differs from the reference document the rule was built from")]
    NoParentMatch,

    /// The search pattern supplied for a regex field is invalid.
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Rule serialization or deserialization failed.
    #[error("rule serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Reading a local HTML file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for selector discovery and extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
