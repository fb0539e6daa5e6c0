//! Parsing of command-line and file input.

use marquee_engine::FeedItem;
use marquee_error::ConfigError;
use marquee_layout::WeightedItem;

/// Parse a `text:weight` pair.
///
/// The weight follows the last colon, so the text itself may contain
/// colons.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the input if the colon, the text or a
/// numeric weight is missing.
///
/// # Examples
///
/// ```
/// use marquee::parse_weighted_item;
///
/// let item = parse_weighted_item("rust:12").unwrap();
/// assert_eq!(item.text(), "rust");
/// assert_eq!(item.weight(), 12.0);
///
/// let err = parse_weighted_item("rust").unwrap_err();
/// assert!(err.message.contains("'rust'"));
/// ```
pub fn parse_weighted_item(pair: &str) -> Result<WeightedItem, ConfigError> {
    let (text, weight) = pair
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::new(format!("Expected text:weight, got '{}'", pair)))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ConfigError::new(format!("Missing text in '{}'", pair)));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|e| ConfigError::new(format!("Invalid weight in '{}': {}", pair, e)))?;
    Ok(WeightedItem::new(text, weight))
}

/// One feed item per non-blank line, numbered from 1.
pub fn feed_items(content: &str) -> Vec<FeedItem> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| FeedItem::new((idx + 1).to_string(), "feed", line.trim()))
        .collect()
}
