//! Rendering seam for the tag cloud.

use async_trait::async_trait;
use kurbo::Rect;
use marquee_layout::{PlacedItem, RetainedItem};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Surface the cloud is drawn on.
///
/// The update step drives three phases through this trait: every removed
/// item fades out, then every retained item moves, then every added item
/// fades in. Calls within a phase run concurrently; each call resolves
/// when its animation has finished.
#[async_trait]
pub trait CloudStage: Send + Sync {
    /// Area available to the cloud.
    fn bounds(&self) -> Rect;

    /// Rectangles the cloud must leave empty, such as logos.
    fn reserved(&self) -> Vec<Rect> {
        Vec::new()
    }

    /// Fade a removed item out and take it off the stage.
    async fn fade_out(&self, item: &PlacedItem, duration: Duration);

    /// Move and resize an item that stays on the stage.
    async fn move_item(&self, item: &RetainedItem, duration: Duration);

    /// Put a new item on the stage and fade it in.
    async fn fade_in(&self, item: &PlacedItem, duration: Duration);
}

/// Shared stage stored in the execution context for the cloud steps.
#[derive(Clone)]
pub struct StageHandle(Arc<dyn CloudStage>);

impl StageHandle {
    /// Wrap a stage.
    pub fn new<S: CloudStage + 'static>(stage: S) -> Self {
        Self(Arc::new(stage))
    }

    /// Wrap an already shared stage.
    pub fn from_arc(stage: Arc<dyn CloudStage>) -> Self {
        Self(stage)
    }

    /// The stage.
    pub fn stage(&self) -> &Arc<dyn CloudStage> {
        &self.0
    }
}

impl std::fmt::Debug for StageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StageHandle").field(&self.0.bounds()).finish()
    }
}

/// Headless stage that logs every animation and waits out its duration.
#[derive(Debug, Clone)]
pub struct LoggingStage {
    bounds: Rect,
    reserved: Vec<Rect>,
}

impl LoggingStage {
    /// Create a stage of the given size with its origin at zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            reserved: Vec::new(),
        }
    }

    /// Keep `rect` free of cloud items.
    pub fn with_reserved(mut self, rect: Rect) -> Self {
        self.reserved.push(rect);
        self
    }
}

#[async_trait]
impl CloudStage for LoggingStage {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn reserved(&self) -> Vec<Rect> {
        self.reserved.clone()
    }

    async fn fade_out(&self, item: &PlacedItem, duration: Duration) {
        info!(text = item.item().text(), "Fading out");
        tokio::time::sleep(duration).await;
    }

    async fn move_item(&self, item: &RetainedItem, duration: Duration) {
        info!(
            text = item.item().text(),
            x = item.to().x0,
            y = item.to().y0,
            size = *item.to_size(),
            "Moving"
        );
        tokio::time::sleep(duration).await;
    }

    async fn fade_in(&self, item: &PlacedItem, duration: Duration) {
        info!(
            text = item.item().text(),
            x = item.rect().x0,
            y = item.rect().y0,
            size = *item.size(),
            "Fading in"
        );
        tokio::time::sleep(duration).await;
    }
}
