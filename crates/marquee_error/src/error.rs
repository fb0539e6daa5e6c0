//! Top-level error wrapper types.

use crate::{ConfigError, EngineError, LayoutError, StepError};

/// Every error condition raised across the Marquee crates.
///
/// # Examples
///
/// ```
/// use marquee_error::{MarqueeError, StepError};
///
/// let err: MarqueeError = StepError::new("pause", "stage missing").into();
/// assert!(format!("{}", err).contains("Step Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MarqueeErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Layout engine error
    #[from(LayoutError)]
    Layout(LayoutError),
    /// Scheduler and registry error
    #[from(EngineError)]
    Engine(EngineError),
    /// Step activation error
    #[from(StepError)]
    Step(StepError),
}

/// Marquee error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Marquee Error: {}", _0)]
pub struct MarqueeError(Box<MarqueeErrorKind>);

impl MarqueeError {
    /// Create a new error from a kind.
    pub fn new(kind: MarqueeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MarqueeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to MarqueeErrorKind
impl<T> From<T> for MarqueeError
where
    T: Into<MarqueeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Marquee operations.
pub type MarqueeResult<T> = std::result::Result<T, MarqueeError>;
