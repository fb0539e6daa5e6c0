//! Text measurement used to turn a size scalar into a box.

use kurbo::Size;

/// Measures the box a piece of text occupies at a given size.
///
/// The renderer owns real font metrics; the layout engine only needs a
/// consistent estimate, and it must be deterministic.
pub trait TextMeasure: Send + Sync {
    /// Box occupied by `text` rendered at `size`.
    fn measure(&self, text: &str, size: f64) -> Size;
}

/// Fixed-advance estimate: every character is `advance * size` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    /// Horizontal advance per character as a fraction of the size
    pub advance: f64,
    /// Line height as a fraction of the size
    pub line_height: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, size: f64) -> Size {
        let chars = text.chars().count().max(1) as f64;
        Size::new(chars * self.advance * size, self.line_height * size)
    }
}
