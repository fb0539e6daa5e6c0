//! Marquee: a presentation wall that cycles through steps and animates a
//! tag cloud of what the audience is talking about.
//!
//! This crate re-exports the building blocks:
//!
//! - [`marquee_layout`]: weighted spiral layout and placement diffs
//! - [`marquee_engine`]: the cyclic step scheduler and its registries
//! - [`marquee_steps`]: the tag-cloud provider and the cloud and pause steps
//! - [`marquee_error`]: error types shared by all of them
//!
//! plus the glue the `marquee` binary uses: logging setup, wall assembly
//! from settings, and parsing of command-line input.
//!
//! # Example
//!
//! ```
//! use marquee::{LoggingStage, StageHandle, build_wall, EngineSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = EngineSettings::from_toml_str(
//!     r#"
//!     [[steps]]
//!     step = "pause"
//!     [steps.config]
//!     millis = 10
//!     "#,
//! )?;
//! let wall = build_wall(&settings, StageHandle::new(LoggingStage::new(1280.0, 720.0)))?;
//! assert_eq!(wall.step_names(), vec!["pause"]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod input;
mod logging;
mod wall;

pub use input::{feed_items, parse_weighted_item};
pub use logging::{LoggingConfig, init_logging};
pub use wall::{build_wall, lay_out};

pub use marquee_engine::*;
pub use marquee_error::*;
pub use marquee_layout::*;
pub use marquee_steps::*;
