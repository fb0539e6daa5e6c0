//! Spiral packing of weighted items.
//!
//! Items are processed largest first. Each item gets a size from its
//! weight, is measured into a box, and then walks an Archimedean spiral
//! outward from the center of the bounds until the box fits without
//! touching a placed box, a reserved rectangle, or the outside of the
//! bounds. Items that never fit are dropped.

use crate::{LayoutResult, MonospaceMeasure, PlacedItem, Placement, TextMeasure, WeightedItem};
use kurbo::{Point, Rect, Size};
use marquee_error::{LayoutError, LayoutErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Parameters of the candidate search.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct SpiralConfig {
    /// Angle advanced between two candidates, in radians
    #[serde(default = "default_angle_step")]
    angle_step: f64,

    /// Distance between two turns of the spiral
    #[serde(default = "default_turn_spacing")]
    turn_spacing: f64,

    /// Upper bound on candidates tried per item
    #[serde(default = "default_max_attempts")]
    max_attempts: usize,

    /// Gap kept between two placed boxes
    #[serde(default = "default_padding")]
    padding: f64,
}

fn default_angle_step() -> f64 {
    0.1
}

fn default_turn_spacing() -> f64 {
    4.0
}

fn default_max_attempts() -> usize {
    20_000
}

fn default_padding() -> f64 {
    1.0
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            angle_step: default_angle_step(),
            turn_spacing: default_turn_spacing(),
            max_attempts: default_max_attempts(),
            padding: default_padding(),
        }
    }
}

/// Size scalar for a weight within a batch.
///
/// Square-root interpolation between `min_size` (at `min_weight`) and
/// `max_size` (at `max_weight`). A batch where every weight is equal maps
/// everything to `max_size`.
///
/// # Examples
///
/// ```
/// use marquee_layout::size_for_weight;
///
/// assert_eq!(size_for_weight(10.0, 3.0, 10.0, 12.0, 48.0), 48.0);
/// assert_eq!(size_for_weight(3.0, 3.0, 10.0, 12.0, 48.0), 12.0);
/// assert_eq!(size_for_weight(5.0, 5.0, 5.0, 12.0, 48.0), 48.0);
/// ```
pub fn size_for_weight(
    weight: f64,
    min_weight: f64,
    max_weight: f64,
    min_size: f64,
    max_size: f64,
) -> f64 {
    if max_weight <= min_weight {
        return max_size;
    }
    let ratio = ((weight - min_weight) / (max_weight - min_weight)).clamp(0.0, 1.0);
    min_size + (max_size - min_size) * ratio.sqrt()
}

/// Stateless tag-cloud layout engine.
///
/// Holds only the search parameters and the text measurer; the same
/// engine can lay out any number of batches, and identical inputs always
/// produce identical placements.
#[derive(Clone)]
pub struct CloudLayout {
    spiral: SpiralConfig,
    measure: Arc<dyn TextMeasure>,
}

impl std::fmt::Debug for CloudLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudLayout")
            .field("spiral", &self.spiral)
            .finish_non_exhaustive()
    }
}

impl Default for CloudLayout {
    fn default() -> Self {
        Self::new(SpiralConfig::default())
    }
}

impl CloudLayout {
    /// Create an engine with a monospace text estimate.
    pub fn new(spiral: SpiralConfig) -> Self {
        Self {
            spiral,
            measure: Arc::new(MonospaceMeasure::default()),
        }
    }

    /// Replace the text measurer.
    pub fn with_measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    /// The search parameters.
    pub fn spiral(&self) -> &SpiralConfig {
        &self.spiral
    }

    /// Lay out `items` inside `bounds`, keeping `reserved` empty.
    ///
    /// `items` must be sorted by descending weight (see
    /// [`sort_by_weight`](crate::sort_by_weight)) and already truncated to
    /// the number of items the caller wants displayed. Later duplicates of
    /// an identity are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `bounds` is empty or not finite
    /// - `min_size` is not positive or exceeds `max_size`
    /// - any weight is negative or not finite
    /// - the items are not sorted by descending weight
    #[tracing::instrument(skip(self, items, reserved), fields(items = items.len(), reserved = reserved.len()))]
    pub fn layout(
        &self,
        items: &[WeightedItem],
        bounds: Rect,
        reserved: &[Rect],
        max_size: f64,
        min_size: f64,
    ) -> LayoutResult<Placement> {
        validate(items, bounds, max_size, min_size)?;

        let mut placement = Placement::new();
        let (Some(first), Some(last)) = (items.first(), items.last()) else {
            return Ok(placement);
        };
        let max_weight = first.weight();
        let min_weight = last.weight();

        let mut seen = HashSet::new();
        let mut occupied: Vec<Rect> = Vec::with_capacity(items.len());

        for item in items {
            if !seen.insert(item.key()) {
                tracing::debug!(text = item.text(), "Skipping duplicate item");
                continue;
            }

            let size = size_for_weight(item.weight(), min_weight, max_weight, min_size, max_size);
            let extent = self.measure.measure(item.text(), size);

            match self.find_slot(extent, bounds, reserved, &occupied) {
                Some(rect) => {
                    tracing::debug!(text = item.text(), size, x = rect.x0, y = rect.y0, "Placed item");
                    occupied.push(rect);
                    placement.insert(PlacedItem::new(item.clone(), rect, size));
                }
                None => {
                    tracing::debug!(text = item.text(), size, "No free slot, dropping item");
                    placement.drop_item(item.clone());
                }
            }
        }

        Ok(placement)
    }

    fn find_slot(
        &self,
        extent: Size,
        bounds: Rect,
        reserved: &[Rect],
        occupied: &[Rect],
    ) -> Option<Rect> {
        if extent.width > bounds.width() || extent.height > bounds.height() {
            return None;
        }

        let center = bounds.center();
        // Past this radius no candidate box can still touch the bounds.
        let max_radius = 0.5 * (bounds.width().hypot(bounds.height()) + extent.width.hypot(extent.height));
        let growth = self.spiral.turn_spacing / TAU;

        for attempt in 0..self.spiral.max_attempts {
            let theta = attempt as f64 * self.spiral.angle_step;
            let radius = growth * theta;
            if radius > max_radius {
                break;
            }
            let origin = Point::new(
                center.x + radius * theta.cos() - extent.width / 2.0,
                center.y + radius * theta.sin() - extent.height / 2.0,
            );
            let candidate = Rect::from_origin_size(origin, extent);

            if fits(candidate, bounds, reserved, occupied, self.spiral.padding) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Lay out items with the default engine.
///
/// Shorthand for `CloudLayout::default().layout(..)`.
///
/// # Errors
///
/// See [`CloudLayout::layout`].
pub fn layout(
    items: &[WeightedItem],
    bounds: Rect,
    reserved: &[Rect],
    max_size: f64,
    min_size: f64,
) -> LayoutResult<Placement> {
    CloudLayout::default().layout(items, bounds, reserved, max_size, min_size)
}

fn validate(items: &[WeightedItem], bounds: Rect, max_size: f64, min_size: f64) -> LayoutResult<()> {
    if !(min_size.is_finite() && max_size.is_finite()) || min_size <= 0.0 || min_size > max_size {
        return Err(LayoutError::new(LayoutErrorKind::InvalidSizeRange {
            min: min_size,
            max: max_size,
        }));
    }

    let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
        .iter()
        .all(|v| v.is_finite());
    if !finite || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Err(LayoutError::new(LayoutErrorKind::InvalidBounds(format!(
            "({}, {}) to ({}, {})",
            bounds.x0, bounds.y0, bounds.x1, bounds.y1
        ))));
    }

    for (idx, item) in items.iter().enumerate() {
        if !item.weight().is_finite() {
            return Err(LayoutError::new(LayoutErrorKind::NonFiniteWeight(
                item.text().to_string(),
            )));
        }
        if item.weight() < 0.0 {
            return Err(LayoutError::new(LayoutErrorKind::NegativeWeight {
                text: item.text().to_string(),
                weight: item.weight(),
            }));
        }
        if idx > 0 && items[idx - 1].weight() < item.weight() {
            return Err(LayoutError::new(LayoutErrorKind::UnsortedItems(idx)));
        }
    }
    Ok(())
}

fn fits(candidate: Rect, bounds: Rect, reserved: &[Rect], occupied: &[Rect], padding: f64) -> bool {
    if !contains(bounds, candidate) {
        return false;
    }
    if reserved.iter().any(|r| overlaps(candidate, *r)) {
        return false;
    }
    let padded = candidate.inflate(padding, padding);
    !occupied.iter().any(|r| overlaps(padded, *r))
}

fn contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Open-interval intersection: boxes that only share an edge do not overlap.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}
