//! Error types for board operations and wire decoding.

/// Errors raised when constructing or updating a [`Board`](crate::Board).
///
/// None of these are ever sent to a peer; callers log them and drop the
/// offending input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Rank outside the supported 2..=4 range
    #[error("Invalid rank: {0} (expected 2, 3 or 4)")]
    InvalidRank(i64),

    /// Side length outside `2..=MAX_SIDE_LENGTH`
    #[error("Invalid side length: {0} (expected 2 to {max})", max = crate::board::MAX_SIDE_LENGTH)]
    InvalidSideLength(usize),

    /// Cell index beyond the end of the board
    #[error("Cell index {index} out of range for {cells} cells")]
    IndexOutOfRange { index: usize, cells: usize },

    /// Snapshot whose piece list does not match its declared shape
    #[error("Snapshot has {found} pieces, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },
}

/// Errors raised while decoding a text frame into a protocol message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame was JSON but not an array
    #[error("Frame is not a JSON array")]
    NotAnArray,

    /// The array had no message name
    #[error("Frame is an empty array")]
    Empty,

    /// The message name is not part of the protocol
    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    /// Wrong arity or argument type for a known message
    #[error("Bad arguments for '{message}': {reason}")]
    BadArguments { message: &'static str, reason: String },
}
