//! Index sync error types.

use thiserror::Error;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while building folder trees and syncing indexes.
///
/// Each variant is scoped to the folder or key it concerns so that a run
/// can report per-node failures without aborting sibling subtrees.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("listing failed for prefix \"{prefix}\": {cause}")]
    ListingFailed { prefix: String, cause: String },

    #[error("render failed for prefix \"{prefix}\": {cause}")]
    RenderFailed { prefix: String, cause: String },

    #[error("write failed for key \"{key}\": {cause}")]
    WriteFailed { key: String, cause: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}
