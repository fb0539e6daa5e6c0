//! Step engine error types.

/// Specific error conditions for scheduler setup and context lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum EngineErrorKind {
    /// No factory registered for a data provider kind a step requires
    #[display("No data provider factory registered for kind '{}'", _0)]
    MissingFactory(String),
    /// A data provider factory failed to build its provider
    #[display("Failed to construct data provider '{}': {}", kind, message)]
    ProviderConstruction {
        /// Provider kind
        kind: String,
        /// Error message
        message: String,
    },
    /// No factory registered for a configured step type
    #[display("No step factory registered for step '{}'", _0)]
    UnknownStep(String),
    /// A step factory rejected its configuration
    #[display("Failed to construct step '{}': {}", step, message)]
    StepConstruction {
        /// Step type
        step: String,
        /// Error message
        message: String,
    },
    /// The configured step sequence is empty
    #[display("Step sequence cannot be empty")]
    EmptySequence,
    /// A step requires a provider that was never initialized
    #[display("Data provider '{}' required by step '{}' was not initialized", kind, step)]
    ProviderNotInitialized {
        /// Step name
        step: String,
        /// Provider kind
        kind: String,
    },
    /// A provider lookup asked for a different concrete type
    #[display("Data provider '{}' is not of the requested type", _0)]
    ProviderTypeMismatch(String),
    /// No provider of the requested type is registered
    #[display("No data provider of type '{}' registered", _0)]
    ProviderNotFound(String),
    /// The scheduler was run before `initialize`
    #[display("Scheduler has not been initialized")]
    NotInitialized,
    /// The scheduler faulted during setup and cannot run
    #[display("Scheduler is faulted: {}", _0)]
    Faulted(String),
}

/// Error type for step engine operations.
///
/// # Examples
///
/// ```
/// use marquee_error::{EngineError, EngineErrorKind};
///
/// let err = EngineError::new(EngineErrorKind::MissingFactory("tag_cloud".to_string()));
/// assert!(format!("{}", err).contains("tag_cloud"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Engine Error: {} at line {} in {}", kind, line, file)]
pub struct EngineError {
    /// The specific error condition
    pub kind: EngineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl EngineError {
    /// Create a new EngineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error aborts scheduler startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            EngineErrorKind::MissingFactory(_)
                | EngineErrorKind::ProviderConstruction { .. }
                | EngineErrorKind::UnknownStep(_)
                | EngineErrorKind::StepConstruction { .. }
                | EngineErrorKind::EmptySequence
                | EngineErrorKind::Faulted(_)
        )
    }
}
