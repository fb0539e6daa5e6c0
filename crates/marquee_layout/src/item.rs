//! Weighted items and their normalized identity.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Case-insensitive identity of a [`WeightedItem`].
///
/// Holds the lower-cased text and is the only key used by placements
/// and diffs.
///
/// # Examples
///
/// ```
/// use marquee_layout::ItemKey;
///
/// assert_eq!(ItemKey::new("Rust"), ItemKey::new("rUST"));
/// assert_eq!(ItemKey::new("Rust").as_str(), "rust");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    /// Normalize text into a key.
    pub fn new(text: &str) -> Self {
        Self(text.to_lowercase())
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A piece of text with a non-negative weight.
///
/// Equality and hashing go through [`ItemKey`], so `"Rust"` and `"rust"`
/// are the same item regardless of weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedItem {
    text: String,
    weight: f64,
}

impl WeightedItem {
    /// Create an item. Weights are validated when the item reaches the layout engine.
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }

    /// The display text, with its original casing.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The item weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The case-insensitive identity.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.text)
    }

    /// Copy of this item with a pinned weight.
    ///
    /// Used to force-include entries at a fixed rank, for example at the
    /// minimum weight of the current batch.
    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            text: self.text.clone(),
            weight,
        }
    }
}

impl PartialEq for WeightedItem {
    fn eq(&self, other: &Self) -> bool {
        self.text.to_lowercase() == other.text.to_lowercase()
    }
}

impl Eq for WeightedItem {}

impl Hash for WeightedItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Sort items by descending weight.
///
/// The sort is stable, so items with equal weight keep their input order.
///
/// # Examples
///
/// ```
/// use marquee_layout::{WeightedItem, sort_by_weight};
///
/// let mut items = vec![
///     WeightedItem::new("date", 3.0),
///     WeightedItem::new("banana", 7.0),
///     WeightedItem::new("apple", 10.0),
///     WeightedItem::new("cherry", 7.0),
/// ];
/// sort_by_weight(&mut items);
///
/// let texts: Vec<&str> = items.iter().map(|i| i.text()).collect();
/// assert_eq!(texts, ["apple", "banana", "cherry", "date"]);
/// ```
pub fn sort_by_weight(items: &mut [WeightedItem]) {
    items.sort_by(|a, b| b.weight.total_cmp(&a.weight));
}
