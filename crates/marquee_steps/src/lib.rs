//! Concrete steps and data providers for Marquee.
//!
//! This crate provides the tag-cloud scenario:
//!
//! - [`TagCloudDataProvider`] counts the words of incoming feed items
//! - [`UpdateCloudStep`] lays the most counted words out and animates the
//!   change through a [`CloudStage`]
//! - [`PauseStep`] holds the wall for a fixed time
//!
//! [`default_step_registry`] and [`default_provider_registry`] register
//! all of them.
//!
//! # Example
//!
//! ```
//! use marquee_engine::{EngineSettings, StepScheduler};
//! use marquee_steps::{LoggingStage, StageHandle, default_provider_registry, default_step_registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = EngineSettings::from_toml_str(
//!     r#"
//!     [[steps]]
//!     step = "update_cloud"
//!
//!     [[steps]]
//!     step = "pause"
//!     [steps.config]
//!     millis = 1000
//!     "#,
//! )?;
//!
//! let steps = default_step_registry().build_sequence(settings.steps())?;
//! let mut scheduler = StepScheduler::new(steps);
//! scheduler.initialize(&default_provider_registry(), settings.data_providers())?;
//! scheduler
//!     .context_mut()
//!     .insert_state(StageHandle::new(LoggingStage::new(800.0, 600.0)));
//! assert_eq!(scheduler.step_names(), vec!["update_cloud", "pause"]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cloud;
mod pause;
mod stage;
mod tag_cloud;

pub use cloud::{CloudState, UPDATE_CLOUD, UpdateCloudConfig, UpdateCloudStep, UpdateCloudStepFactory, compose_batch};
pub use pause::{PAUSE, PauseConfig, PauseStep, PauseStepFactory};
pub use stage::{CloudStage, LoggingStage, StageHandle};
pub use tag_cloud::{TAG_CLOUD, TagCloudConfig, TagCloudDataProvider, TagCloudProviderFactory};

use marquee_engine::{DataProviderRegistry, StepRegistry};
use std::sync::Arc;

/// Step registry with every step of this crate.
#[tracing::instrument]
pub fn default_step_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(Arc::new(UpdateCloudStepFactory));
    registry.register(Arc::new(PauseStepFactory));
    registry
}

/// Provider registry with every data provider of this crate.
#[tracing::instrument]
pub fn default_provider_registry() -> DataProviderRegistry {
    let mut registry = DataProviderRegistry::new();
    registry.register(Arc::new(TagCloudProviderFactory));
    registry
}
