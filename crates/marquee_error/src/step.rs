//! Per-activation step failures.

/// A failure raised by a step while executing one activation.
///
/// The scheduler logs these and treats them as an implicit completion, so
/// a failing step only loses its slide for the current cycle.
///
/// # Examples
///
/// ```
/// use marquee_error::StepError;
///
/// let err = StepError::new("update_cloud", "no stage registered");
/// assert_eq!(err.step, "update_cloud");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Step Error in '{}': {} at line {} in {}", step, message, line, file)]
pub struct StepError {
    /// Name of the failing step
    pub step: String,
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl StepError {
    /// Create a new StepError at the current location.
    #[track_caller]
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            step: step.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
