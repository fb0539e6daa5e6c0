//! Step engine for Marquee.
//!
//! This crate drives the presentation loop: a cyclic sequence of steps run
//! one at a time against a shared [`ExecutionContext`], with data providers
//! created once at startup from an explicit registry.
//!
//! # Features
//!
//! - **Explicit registries**: [`StepRegistry`] and [`DataProviderRegistry`] are filled by direct registration
//! - **Typed context**: providers and scenario state are looked up by type, never by cast strings
//! - **Single-shot completion**: each activation hands the step one [`Completion`] that accepts one signal
//! - **Exclusive activation**: the next step starts only after the current one signaled
//! - **Live feeds**: a [`FeedDispatcher`] pushes new items into providers from any thread
//!
//! # Example
//!
//! ```
//! use marquee_engine::{
//!     Completion, DataProviderRegistry, ExecutionContext, Step, StepResult, StepScheduler,
//! };
//! use std::time::Duration;
//!
//! struct Title;
//!
//! impl Step for Title {
//!     fn name(&self) -> &str {
//!         "title"
//!     }
//!
//!     fn preferred_duration(&self, _context: &ExecutionContext) -> Duration {
//!         Duration::from_secs(3)
//!     }
//!
//!     fn execute(&self, _context: &mut ExecutionContext, completion: Completion) -> StepResult<()> {
//!         completion.proceed();
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scheduler = StepScheduler::new(vec![Box::new(Title)]);
//! scheduler.initialize(&DataProviderRegistry::new(), &[])?;
//! scheduler.run_cycles(2).await?;
//! assert_eq!(scheduler.stats().cycles, 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod context;
mod feed;
mod kind;
mod provider;
mod scheduler;
mod settings;
mod step;

pub use completion::Completion;
pub use context::ExecutionContext;
pub use feed::{FeedDispatcher, FeedItem};
pub use kind::DataKind;
pub use provider::{DataProvider, DataProviderFactory, DataProviderRegistry, ProviderHandle};
pub use scheduler::{SchedulerState, SchedulerStats, StatsHandle, StepScheduler};
pub use settings::{DataProviderSetting, EngineSettings, SchedulerSettings, StepDefinition};
pub use step::{Step, StepFactory, StepRegistry};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, marquee_error::EngineError>;

/// Result type for a single step activation.
pub type StepResult<T> = Result<T, marquee_error::StepError>;
