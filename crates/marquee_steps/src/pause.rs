//! A step that holds the current slide for a while.

use marquee_engine::{
    Completion, EngineResult, ExecutionContext, Step, StepDefinition, StepFactory, StepResult,
};
use marquee_error::StepError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Step type of [`PauseStep`].
pub const PAUSE: &str = "pause";

/// Pause step configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseConfig {
    /// How long to wait before signaling
    #[serde(default = "default_millis")]
    pub millis: u64,
}

fn default_millis() -> u64 {
    5000
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            millis: default_millis(),
        }
    }
}

/// Signals completion after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct PauseStep {
    delay: Duration,
}

impl PauseStep {
    /// Create a pause of `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Step for PauseStep {
    fn name(&self) -> &str {
        PAUSE
    }

    fn preferred_duration(&self, _context: &ExecutionContext) -> Duration {
        self.delay
    }

    fn execute(&self, _context: &mut ExecutionContext, completion: Completion) -> StepResult<()> {
        if self.delay.is_zero() {
            completion.proceed();
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StepError::new(PAUSE, format!("No async runtime: {}", e)))?;
        let delay = self.delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            completion.proceed();
        });
        Ok(())
    }
}

/// Builds [`PauseStep`] from its definition.
#[derive(Debug, Default)]
pub struct PauseStepFactory;

impl StepFactory for PauseStepFactory {
    fn step_type(&self) -> &str {
        PAUSE
    }

    fn create(&self, definition: &StepDefinition) -> EngineResult<Box<dyn Step>> {
        let config: PauseConfig = definition.config_as()?;
        Ok(Box::new(PauseStep::new(Duration::from_millis(config.millis))))
    }
}
