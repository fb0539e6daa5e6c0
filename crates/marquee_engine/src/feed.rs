//! Live feed items and their fan-out to providers.

use crate::{DataKind, DataProvider};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One piece of incoming content, e.g. a social-media post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct FeedItem {
    /// Feed-assigned identifier
    id: String,
    /// Author handle
    author: String,
    /// Body text
    text: String,
}

impl FeedItem {
    /// Create a feed item.
    pub fn new(id: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            text: text.into(),
        }
    }
}

/// Hands feed items to every initialized provider.
///
/// Cheap to clone and safe to use from any thread while the scheduler is
/// running; providers synchronize their own state.
#[derive(Clone)]
pub struct FeedDispatcher {
    providers: Arc<Vec<(DataKind, Arc<dyn DataProvider>)>>,
}

impl FeedDispatcher {
    pub(crate) fn new(providers: Vec<(DataKind, Arc<dyn DataProvider>)>) -> Self {
        Self {
            providers: Arc::new(providers),
        }
    }

    /// Deliver a newly arrived item.
    #[tracing::instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn publish(&self, item: &FeedItem) {
        tracing::debug!(providers = self.providers.len(), "Dispatching new feed item");
        for (_, provider) in self.providers.iter() {
            provider.process_new_item(item);
        }
    }

    /// Replay historical items, oldest first.
    #[tracing::instrument(skip(self, items), fields(count = items.len()))]
    pub fn replay_history(&self, items: &[FeedItem]) {
        for item in items {
            for (_, provider) in self.providers.iter() {
                provider.process_history_item(item);
            }
        }
    }

    /// Kinds that receive feed items.
    pub fn kinds(&self) -> Vec<DataKind> {
        self.providers.iter().map(|(kind, _)| kind.clone()).collect()
    }
}

impl std::fmt::Debug for FeedDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedDispatcher")
            .field("kinds", &self.kinds())
            .finish()
    }
}
