//! Data provider kinds.

use serde::{Deserialize, Serialize};

/// Tag naming a data provider kind, e.g. `"tag_cloud"`.
///
/// Steps declare the kinds they need; the registry maps each kind to the
/// factory that builds it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct DataKind(String);

impl DataKind {
    /// Create a kind from its tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DataKind {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
