//! Incremental difference between two placements.

use crate::{ItemKey, PlacedItem, Placement, WeightedItem};
use kurbo::Rect;
use serde::Serialize;

/// An item present in both placements, with its old and new boxes.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct RetainedItem {
    /// The item as it appears in the new placement
    item: WeightedItem,
    /// Box in the previous placement
    from: Rect,
    /// Box in the current placement
    to: Rect,
    /// Size in the previous placement
    from_size: f64,
    /// Size in the current placement
    to_size: f64,
}

impl RetainedItem {
    /// The case-insensitive identity.
    pub fn key(&self) -> ItemKey {
        self.item.key()
    }

    /// Whether the box or size changed between the two placements.
    pub fn has_changed(&self) -> bool {
        self.from != self.to || self.from_size != self.to_size
    }
}

/// Removed, added and retained items between two placements.
///
/// The three sets are disjoint by identity. `removed` follows the order of
/// the previous placement; `added` and `retained` follow the current one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, derive_getters::Getters)]
pub struct PlacementDiff {
    /// In the previous placement only
    removed: Vec<PlacedItem>,
    /// In the current placement only
    added: Vec<PlacedItem>,
    /// In both placements
    retained: Vec<RetainedItem>,
}

impl PlacementDiff {
    /// Whether the two placements hold exactly the same boxes.
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
            && self.added.is_empty()
            && self.retained.iter().all(|r| !r.has_changed())
    }
}

/// Compute the difference between a previous and a current placement.
///
/// Membership is decided by case-insensitive identity only; boxes are
/// carried along so the caller can animate retained items.
///
/// # Examples
///
/// ```
/// use kurbo::Rect;
/// use marquee_layout::{ItemKey, WeightedItem, diff, layout};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
/// let old = layout(
///     &[WeightedItem::new("apple", 5.0), WeightedItem::new("banana", 4.0)],
///     bounds, &[], 40.0, 10.0,
/// )?;
/// let new = layout(
///     &[WeightedItem::new("Banana", 5.0), WeightedItem::new("cherry", 4.0)],
///     bounds, &[], 40.0, 10.0,
/// )?;
///
/// let changes = diff(&old, &new);
/// assert_eq!(changes.removed()[0].key(), ItemKey::new("apple"));
/// assert_eq!(changes.added()[0].key(), ItemKey::new("cherry"));
/// assert_eq!(changes.retained()[0].key(), ItemKey::new("banana"));
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip_all, fields(previous = previous.len(), current = current.len()))]
pub fn diff(previous: &Placement, current: &Placement) -> PlacementDiff {
    let removed: Vec<PlacedItem> = previous
        .iter()
        .filter(|placed| !current.contains(&placed.key()))
        .cloned()
        .collect();

    let mut added = Vec::new();
    let mut retained = Vec::new();
    for placed in current {
        match previous.get(&placed.key()) {
            Some(old) => retained.push(RetainedItem {
                item: placed.item().clone(),
                from: *old.rect(),
                to: *placed.rect(),
                from_size: *old.size(),
                to_size: *placed.size(),
            }),
            None => added.push(placed.clone()),
        }
    }

    tracing::debug!(
        removed = removed.len(),
        added = added.len(),
        retained = retained.len(),
        "Computed placement diff"
    );

    PlacementDiff {
        removed,
        added,
        retained,
    }
}
