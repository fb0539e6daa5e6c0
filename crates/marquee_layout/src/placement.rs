//! Layout output: items mapped to non-overlapping boxes.

use crate::{ItemKey, WeightedItem};
use kurbo::Rect;
use serde::Serialize;
use std::collections::HashMap;

/// One item assigned to a box.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct PlacedItem {
    /// The placed item
    item: WeightedItem,
    /// Assigned box in canvas coordinates
    rect: Rect,
    /// Size scalar derived from the item weight (font size for text)
    size: f64,
}

impl PlacedItem {
    pub(crate) fn new(item: WeightedItem, rect: Rect, size: f64) -> Self {
        Self { item, rect, size }
    }

    /// The case-insensitive identity of the placed item.
    pub fn key(&self) -> ItemKey {
        self.item.key()
    }
}

/// Mapping from item identity to its assigned box.
///
/// Entries keep placement order, which is the order items were handed to
/// the engine. Items the engine could not fit are listed in
/// [`Placement::dropped`] and never appear as entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    entries: Vec<PlacedItem>,
    dropped: Vec<WeightedItem>,
    #[serde(skip)]
    index: HashMap<ItemKey, usize>,
}

impl Placement {
    /// Create an empty placement.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, placed: PlacedItem) {
        self.index.insert(placed.key(), self.entries.len());
        self.entries.push(placed);
    }

    pub(crate) fn drop_item(&mut self, item: WeightedItem) {
        self.dropped.push(item);
    }

    /// Look up an item by identity.
    pub fn get(&self, key: &ItemKey) -> Option<&PlacedItem> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Whether an item with this identity was placed.
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.index.contains_key(key)
    }

    /// Placed items in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedItem> {
        self.entries.iter()
    }

    /// Identities of the placed items in placement order.
    pub fn keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.entries.iter().map(PlacedItem::key)
    }

    /// Items that did not fit after the bounded candidate search.
    pub fn dropped(&self) -> &[WeightedItem] {
        &self.dropped
    }

    /// Number of placed items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Placement {
    type Item = &'a PlacedItem;
    type IntoIter = std::slice::Iter<'a, PlacedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
