//! Error types for the highlighter.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`HighlightError`]. Only contract violations, unsupported operations,
//! collaborator failures and internal-logic failures are errors: "no hits" and
//! "no snippets" are represented as empty results.
//!
//! # Examples
//!
//! ```
//! use sarissa_highlight::error::{HighlightError, Result};
//!
//! fn check_range(start: u32, end: u32) -> Result<()> {
//!     if end < start {
//!         return Err(HighlightError::invalid_argument("end before start"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_range(3, 1).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for highlighting operations.
#[derive(Error, Debug)]
pub enum HighlightError {
    /// A caller broke a contract: an offset range past the end of the source,
    /// a segment whose end precedes its start, a malformed pattern.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported by this implementation. Signals a
    /// configuration mismatch rather than a data problem.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// I/O errors raised while loading field values or hits.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A failure raised by an external collaborator (postings, field loading),
    /// wrapped with the original cause preserved.
    #[error("Collaborator error: {context}")]
    Collaborator {
        /// What the highlighter was doing when the collaborator failed.
        context: String,
        /// The original failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A broken internal invariant. Indicates a bug, not bad input.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with [`HighlightError`].
pub type Result<T> = std::result::Result<T, HighlightError>;

impl HighlightError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HighlightError::InvalidArgument(msg.into())
    }

    /// Create a new unsupported operation error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        HighlightError::Unsupported(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        HighlightError::Internal(msg.into())
    }

    /// Wrap a collaborator failure, keeping it as the error source.
    pub fn collaborator<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        HighlightError::Collaborator {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
