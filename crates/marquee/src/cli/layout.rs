//! Layout command handler.

use super::commands::LayoutArgs;
use marquee::lay_out;

/// Lay out the given words and print the placement.
pub fn run_layout(args: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let placement = lay_out(
        args.items,
        args.canvas.width,
        args.canvas.height,
        args.max_size,
        args.min_size,
    )?;

    for dropped in placement.dropped() {
        tracing::warn!(text = dropped.text(), "Word did not fit on the canvas");
    }

    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}
