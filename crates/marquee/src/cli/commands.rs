//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use marquee::{WeightedItem, parse_weighted_item};
use std::path::PathBuf;

/// Marquee - presentation wall with an animated tag cloud
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(about = "Presentation wall with an animated tag cloud", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lay out weighted words and print the placement as JSON
    Layout(LayoutArgs),

    /// Run the wall with a logging stage
    Run(RunArgs),
}

/// Canvas and size range shared by the commands
#[derive(Args, Debug, Clone)]
pub struct CanvasArgs {
    /// Canvas width
    #[arg(long, default_value = "1280")]
    pub width: f64,

    /// Canvas height
    #[arg(long, default_value = "720")]
    pub height: f64,
}

/// Arguments of `marquee layout`
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Words as text:weight pairs
    #[arg(required = true, value_parser = parse_weighted_item)]
    pub items: Vec<WeightedItem>,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Size of the heaviest word
    #[arg(long, default_value = "48")]
    pub max_size: f64,

    /// Size of the lightest word
    #[arg(long, default_value = "12")]
    pub min_size: f64,
}

/// Arguments of `marquee run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Settings file layered over the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Text file whose lines are fed to the wall
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Delay between two fed lines; 0 replays the whole file as history
    #[arg(long, default_value = "0")]
    pub feed_interval_millis: u64,

    /// Stop after this many cycles instead of running until interrupted
    #[arg(long)]
    pub cycles: Option<u64>,

    #[command(flatten)]
    pub canvas: CanvasArgs,
}
