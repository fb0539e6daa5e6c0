//! Wall execution command handler.

use super::commands::RunArgs;
use marquee::{EngineSettings, LoggingStage, StageHandle, build_wall, feed_items};
use std::time::Duration;
use tracing::info;

/// Run the configured step sequence until interrupted or out of cycles.
pub async fn run_wall(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = EngineSettings::load(args.config.as_deref())?;
    let stage = LoggingStage::new(args.canvas.width, args.canvas.height);
    let mut wall = build_wall(&settings, StageHandle::new(stage))?;

    if let Some(path) = &args.feed {
        let items = feed_items(&std::fs::read_to_string(path)?);
        info!(path = %path.display(), items = items.len(), "Loaded feed");
        let feed = wall.feed();

        if args.feed_interval_millis == 0 {
            feed.replay_history(&items);
        } else {
            let interval = Duration::from_millis(args.feed_interval_millis);
            tokio::spawn(async move {
                for item in items {
                    feed.publish(&item);
                    tokio::time::sleep(interval).await;
                }
            });
        }
    }

    match args.cycles {
        Some(cycles) => wall.run_cycles(cycles).await?,
        None => {
            tokio::select! {
                result = wall.run() => result?,
                _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping the wall"),
            }
        }
    }

    info!(stats = ?wall.stats(), "Wall stopped");
    Ok(())
}
