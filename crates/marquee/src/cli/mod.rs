//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the marquee binary.

mod commands;
mod layout;
mod run;

pub use commands::{Cli, Commands};
pub use layout::run_layout;
pub use run::run_wall;
