//! Weighted tag-cloud layout for Marquee.
//!
//! This crate packs a ranked set of weighted items into a bounded region
//! without overlap and computes the difference between two layouts so a
//! caller can animate removals, moves and additions.
//!
//! # Features
//!
//! - **Case-insensitive identity**: items are keyed by [`ItemKey`]
//! - **Weight-derived sizing**: square-root interpolation between a minimum and maximum size
//! - **Spiral packing**: deterministic outward search from the center of the bounds
//! - **Reserved regions**: logos and other blocked areas stay empty
//! - **Incremental diffs**: [`diff`] splits two placements into removed, added and retained items
//!
//! # Example
//!
//! ```
//! use kurbo::Rect;
//! use marquee_layout::{WeightedItem, diff, layout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
//! let items = vec![WeightedItem::new("apple", 10.0), WeightedItem::new("date", 3.0)];
//!
//! let first = layout(&items, bounds, &[], 48.0, 12.0)?;
//! let second = layout(&items[..1], bounds, &[], 48.0, 12.0)?;
//!
//! let changes = diff(&first, &second);
//! assert_eq!(changes.removed().len(), 1);
//! assert_eq!(changes.retained().len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod engine;
mod item;
mod measure;
mod placement;

pub use diff::{PlacementDiff, RetainedItem, diff};
pub use engine::{CloudLayout, SpiralConfig, layout, size_for_weight};
pub use item::{ItemKey, WeightedItem, sort_by_weight};
pub use measure::{MonospaceMeasure, TextMeasure};
pub use placement::{PlacedItem, Placement};

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, marquee_error::LayoutError>;
