//! Marquee CLI binary.
//!
//! This binary provides command-line access to the wall:
//! - Lay out weighted words and print the placement as JSON
//! - Run the step sequence with a headless, logging stage

use clap::Parser;
use marquee::{LoggingConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_layout, run_wall};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    init_logging(&LoggingConfig::new(cli.verbose).with_json_logs(cli.json_logs))?;

    // Execute the requested command
    match cli.command {
        Commands::Layout(args) => {
            run_layout(args)?;
        }

        Commands::Run(args) => {
            run_wall(args).await?;
        }
    }

    Ok(())
}
