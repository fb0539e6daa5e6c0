//! Layout engine error types.

/// Specific error conditions rejected at the layout call boundary.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum LayoutErrorKind {
    /// Layout bounds are empty or not finite
    #[display("Invalid layout bounds: {}", _0)]
    InvalidBounds(String),
    /// An item carries a negative weight
    #[display("Item '{}' has negative weight {}", text, weight)]
    NegativeWeight {
        /// Item text
        text: String,
        /// Offending weight
        weight: f64,
    },
    /// An item carries a NaN or infinite weight
    #[display("Item '{}' has a non-finite weight", _0)]
    NonFiniteWeight(String),
    /// The size range is empty, inverted or not positive
    #[display("Invalid size range: min {} max {}", min, max)]
    InvalidSizeRange {
        /// Requested minimum size
        min: f64,
        /// Requested maximum size
        max: f64,
    },
    /// Items are not sorted by descending weight
    #[display("Items are not sorted by descending weight at index {}", _0)]
    UnsortedItems(usize),
}

/// Error type for layout operations.
///
/// # Examples
///
/// ```
/// use marquee_error::{LayoutError, LayoutErrorKind};
///
/// let err = LayoutError::new(LayoutErrorKind::UnsortedItems(3));
/// assert!(format!("{}", err).contains("index 3"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Layout Error: {} at line {} in {}", kind, line, file)]
pub struct LayoutError {
    /// The specific error condition
    pub kind: LayoutErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl LayoutError {
    /// Create a new LayoutError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LayoutErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
