//! Steps and the registry of their factories.

use crate::{Completion, DataKind, EngineResult, ExecutionContext, StepDefinition, StepResult};
use marquee_error::{EngineError, EngineErrorKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One unit of presentation work in the cyclic sequence.
///
/// A step either finishes inside [`Step::execute`] and calls
/// [`Completion::proceed`] before returning, or returns right away after
/// handing the completion to a task that signals once its animation ends.
/// The scheduler does not start the next step until it sees the signal.
pub trait Step: Send + Sync {
    /// Step name used in logs and scheduler states.
    fn name(&self) -> &str;

    /// Data provider kinds this step reads.
    fn required_data_kinds(&self) -> Vec<DataKind> {
        Vec::new()
    }

    /// How long this step would like to stay on screen.
    ///
    /// Advisory pacing only; never enforced as a timeout.
    fn preferred_duration(&self, context: &ExecutionContext) -> Duration;

    /// Whether to pass over this step for the current cycle.
    fn should_skip(&self, _context: &ExecutionContext) -> bool {
        false
    }

    /// Run one activation.
    ///
    /// # Errors
    ///
    /// An error is logged by the scheduler and counts as the completion
    /// signal for this activation. A panic is caught and handled the same way.
    fn execute(&self, context: &mut ExecutionContext, completion: Completion) -> StepResult<()>;
}

/// Builds a step from its definition in the step sequence.
pub trait StepFactory: Send + Sync {
    /// Step type this factory builds.
    fn step_type(&self) -> &str;

    /// Build the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step configuration is invalid.
    fn create(&self, definition: &StepDefinition) -> EngineResult<Box<dyn Step>>;
}

/// Registry of step factories keyed by step type.
pub struct StepRegistry {
    factories: HashMap<String, Arc<dyn StepFactory>>,
}

impl StepRegistry {
    /// Create a new empty step registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a step factory.
    ///
    /// If a factory with the same step type already exists, it will be replaced and a warning logged.
    #[tracing::instrument(skip(self, factory), fields(step_type = factory.step_type()))]
    pub fn register(&mut self, factory: Arc<dyn StepFactory>) {
        let step_type = factory.step_type().to_string();

        if self.factories.contains_key(&step_type) {
            tracing::warn!(step_type = %step_type, "Step factory already registered, overwriting previous registration");
        } else {
            tracing::debug!("Registering step factory");
        }

        self.factories.insert(step_type, factory);
    }

    /// Get a factory by step type.
    pub fn get(&self, step_type: &str) -> Option<Arc<dyn StepFactory>> {
        self.factories.get(step_type).cloned()
    }

    /// Build the step sequence described by `definitions`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `definitions` is empty
    /// - A step type has no registered factory
    /// - A factory rejects its configuration
    #[tracing::instrument(skip(self, definitions), fields(count = definitions.len()))]
    pub fn build_sequence(&self, definitions: &[StepDefinition]) -> EngineResult<Vec<Box<dyn Step>>> {
        if definitions.is_empty() {
            return Err(EngineError::new(EngineErrorKind::EmptySequence));
        }

        definitions
            .iter()
            .map(|definition| {
                let factory = self.get(definition.step()).ok_or_else(|| {
                    EngineError::new(EngineErrorKind::UnknownStep(definition.step().clone()))
                })?;
                tracing::debug!(step = %definition.step(), "Building step");
                factory.create(definition)
            })
            .collect()
    }

    /// Registered step types, sorted.
    pub fn step_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Get number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}
