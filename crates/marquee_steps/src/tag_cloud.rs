//! Word counts for the tag cloud.

use marquee_engine::{
    DataKind, DataProvider, DataProviderFactory, DataProviderSetting, EngineResult, FeedItem,
    ProviderHandle,
};
use marquee_error::{EngineError, EngineErrorKind};
use marquee_layout::WeightedItem;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, instrument};

/// Kind tag of the tag-cloud provider.
pub const TAG_CLOUD: &str = "tag_cloud";

/// Common words that never make it into the cloud.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "all", "also", "amp", "and", "any", "are", "because", "been",
    "before", "being", "but", "can", "could", "did", "does", "doing", "don", "down", "during",
    "each", "few", "for", "from", "further", "had", "has", "have", "having", "her", "here",
    "hers", "him", "his", "how", "http", "https", "into", "its", "just", "let", "more", "most",
    "much", "not", "now", "off", "once", "only", "other", "our", "ours", "out", "over", "own",
    "same", "she", "should", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "too", "under", "until", "very", "via",
    "was", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours",
];

/// Tag-cloud provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCloudConfig {
    /// Number of words returned by [`TagCloudDataProvider::words`]
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Words always shown in the cloud, e.g. the event hashtag
    #[serde(default)]
    pub additional_words: Vec<String>,

    /// Extra words to ignore on top of the built-in stop list
    #[serde(default)]
    pub stop_words: Vec<String>,
}

fn default_max_words() -> usize {
    40
}

impl Default for TagCloudConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            additional_words: vec![],
            stop_words: vec![],
        }
    }
}

/// Counts how many feed items mention each word.
///
/// Feed threads update the counts while steps read them; both sides go
/// through the provider's own locks.
pub struct TagCloudDataProvider {
    max_words: usize,
    counts: RwLock<BTreeMap<String, u64>>,
    additional: RwLock<Vec<String>>,
    stop_words: HashSet<String>,
    url_regex: Regex,
    mention_regex: Regex,
    trailing_punctuation_regex: Regex,
    quote_regex: Regex,
}

impl TagCloudDataProvider {
    /// Create an empty provider.
    ///
    /// # Errors
    ///
    /// Returns an error if a text pattern fails to compile.
    pub fn new(config: TagCloudConfig) -> EngineResult<Self> {
        let stop_words = STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(config.stop_words.iter().map(|w| w.to_lowercase()))
            .collect();

        Ok(Self {
            max_words: config.max_words,
            counts: RwLock::new(BTreeMap::new()),
            additional: RwLock::new(config.additional_words),
            stop_words,
            url_regex: compile(r"(?i)\b(?:https?://|www\.)\S+")?,
            mention_regex: compile(r"@\w+")?,
            trailing_punctuation_regex: compile(r"[.,!?:´`']+(?:\s+|$)")?,
            quote_regex: compile(r#"['“”‘’"()]"#)?,
        })
    }

    /// Count the distinct words of one text.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn count_text(&self, text: &str) {
        let words = self.extract_words(text);
        debug!(words = words.len(), "Counting words");
        if words.is_empty() {
            return;
        }
        let mut counts = self.counts.write();
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    fn extract_words(&self, text: &str) -> BTreeSet<String> {
        let text = self.url_regex.replace_all(text, " ");
        let text = self.mention_regex.replace_all(&text, " ");
        let text = self.trailing_punctuation_regex.replace_all(&text, " ");
        let text = self.quote_regex.replace_all(&text, " ");

        text.split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| word.chars().count() > 2)
            .map(str::to_lowercase)
            .filter(|word| !self.stop_words.contains(word))
            .collect()
    }

    /// Most frequent words, highest count first.
    ///
    /// Equal counts are ordered alphabetically. At most `max_words` words
    /// are returned, weighted by their count.
    pub fn words(&self) -> Vec<WeightedItem> {
        let counts = self.counts.read();
        let mut entries: Vec<(&String, &u64)> = counts.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1));
        entries
            .into_iter()
            .take(self.max_words)
            .map(|(word, count)| WeightedItem::new(word.clone(), *count as f64))
            .collect()
    }

    /// How many items mentioned `word`.
    pub fn count(&self, word: &str) -> u64 {
        self.counts
            .read()
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct words counted so far.
    pub fn distinct_words(&self) -> usize {
        self.counts.read().len()
    }

    /// Words always shown in the cloud.
    pub fn additional_words(&self) -> Vec<String> {
        self.additional.read().clone()
    }

    /// Replace the words always shown in the cloud.
    pub fn set_additional_words(&self, words: Vec<String>) {
        debug!(count = words.len(), "Replacing additional cloud words");
        *self.additional.write() = words;
    }
}

fn compile(pattern: &str) -> EngineResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        EngineError::new(EngineErrorKind::ProviderConstruction {
            kind: TAG_CLOUD.to_string(),
            message: format!("Invalid regex pattern '{}': {}", pattern, e),
        })
    })
}

impl DataProvider for TagCloudDataProvider {
    fn name(&self) -> &str {
        TAG_CLOUD
    }

    fn process_new_item(&self, item: &FeedItem) {
        self.count_text(item.text());
    }

    fn process_history_item(&self, item: &FeedItem) {
        self.count_text(item.text());
    }
}

impl std::fmt::Debug for TagCloudDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagCloudDataProvider")
            .field("max_words", &self.max_words)
            .field("distinct_words", &self.distinct_words())
            .finish_non_exhaustive()
    }
}

/// Builds [`TagCloudDataProvider`] from its `tag_cloud` settings.
#[derive(Debug, Default)]
pub struct TagCloudProviderFactory;

impl DataProviderFactory for TagCloudProviderFactory {
    fn kind(&self) -> DataKind {
        DataKind::new(TAG_CLOUD)
    }

    fn create(&self, setting: &DataProviderSetting) -> EngineResult<ProviderHandle> {
        let config: TagCloudConfig = setting.config_as()?;
        Ok(ProviderHandle::new(TagCloudDataProvider::new(config)?))
    }
}
