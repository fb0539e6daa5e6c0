//! Error types for the Marquee presentation wall.
//!
//! This crate provides the error types shared by the layout engine, the
//! step scheduler and the concrete steps.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use marquee_error::{ConfigError, MarqueeResult};
//!
//! fn load_settings() -> MarqueeResult<String> {
//!     Err(ConfigError::new("missing [engine] table"))?
//! }
//!
//! let err = load_settings().unwrap_err();
//! assert!(format!("{}", err).contains("missing [engine] table"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod layout;
mod step;

pub use config::ConfigError;
pub use engine::{EngineError, EngineErrorKind};
pub use error::{MarqueeError, MarqueeErrorKind, MarqueeResult};
pub use layout::{LayoutError, LayoutErrorKind};
pub use step::StepError;
