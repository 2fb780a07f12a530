use thiserror::Error;

/// Result type alias using `TreeError`
pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Errors raised by tree traversal.
///
/// Mutations never fail: inserting a key that is already present and removing
/// a key that is absent are both no-ops.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A level-order cursor was advanced after `has_next()` returned false.
    #[error("level-order cursor advanced past its last node")]
    ExhaustedIterator,
}
