//! The step that refreshes the tag cloud.

use crate::{CloudStage, StageHandle, TAG_CLOUD, TagCloudDataProvider};
use derive_getters::Getters;
use futures::future::join_all;
use marquee_engine::{
    Completion, DataKind, EngineResult, ExecutionContext, Step, StepDefinition, StepFactory,
    StepResult,
};
use marquee_error::{EngineError, EngineErrorKind, StepError};
use marquee_layout::{
    CloudLayout, Placement, PlacementDiff, SpiralConfig, WeightedItem, diff, sort_by_weight,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Step type of [`UpdateCloudStep`].
pub const UPDATE_CLOUD: &str = "update_cloud";

/// Update-cloud step configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCloudConfig {
    /// Most counted words shown at once
    #[serde(default = "default_display_count")]
    pub display_count: usize,

    /// Size of the heaviest word
    #[serde(default = "default_max_size")]
    pub max_size: f64,

    /// Size of the lightest word
    #[serde(default = "default_min_size")]
    pub min_size: f64,

    /// Length of each animation phase
    #[serde(default = "default_transition_millis")]
    pub transition_millis: u64,

    /// How long the cloud would like to stay on screen
    #[serde(default = "default_preferred_millis")]
    pub preferred_millis: u64,

    /// Candidate search parameters
    #[serde(default)]
    pub spiral: SpiralConfig,
}

fn default_display_count() -> usize {
    25
}

fn default_max_size() -> f64 {
    48.0
}

fn default_min_size() -> f64 {
    12.0
}

fn default_transition_millis() -> u64 {
    1500
}

fn default_preferred_millis() -> u64 {
    5000
}

impl Default for UpdateCloudConfig {
    fn default() -> Self {
        Self {
            display_count: default_display_count(),
            max_size: default_max_size(),
            min_size: default_min_size(),
            transition_millis: default_transition_millis(),
            preferred_millis: default_preferred_millis(),
            spiral: SpiralConfig::default(),
        }
    }
}

/// The placement currently on the stage.
#[derive(Debug, Clone, Default, Getters)]
pub struct CloudState {
    placement: Placement,
}

impl CloudState {
    /// Record a placement as shown.
    pub fn new(placement: Placement) -> Self {
        Self { placement }
    }
}

/// Build the batch to lay out from the counted words.
///
/// Keeps the first `display_count` words, appends each additional word
/// not already present with the lowest weight of the kept words, and
/// sorts by descending weight. Appended words sort after kept words of
/// equal weight.
pub fn compose_batch(
    words: &[WeightedItem],
    additional: &[String],
    display_count: usize,
) -> Vec<WeightedItem> {
    let mut batch: Vec<WeightedItem> = words.iter().take(display_count).cloned().collect();
    let pinned = batch
        .iter()
        .map(WeightedItem::weight)
        .reduce(f64::min)
        .unwrap_or(1.0);

    for text in additional {
        let item = WeightedItem::new(text.clone(), pinned);
        if !batch.contains(&item) {
            batch.push(item);
        }
    }

    sort_by_weight(&mut batch);
    batch
}

/// Lays out the most counted words and animates the change on the stage.
///
/// Needs a [`StageHandle`] in the context state. The placement shown is
/// kept as [`CloudState`] so the next activation only animates what
/// changed. Completion is signaled once the fade-in phase has finished.
#[derive(Debug)]
pub struct UpdateCloudStep {
    config: UpdateCloudConfig,
    layout: CloudLayout,
}

impl UpdateCloudStep {
    /// Create the step.
    pub fn new(config: UpdateCloudConfig) -> Self {
        let layout = CloudLayout::new(config.spiral);
        Self { config, layout }
    }

    /// Replace the layout engine, e.g. to use a different text measure.
    pub fn with_layout(mut self, layout: CloudLayout) -> Self {
        self.layout = layout;
        self
    }

    /// The step configuration.
    pub fn config(&self) -> &UpdateCloudConfig {
        &self.config
    }
}

impl Step for UpdateCloudStep {
    fn name(&self) -> &str {
        UPDATE_CLOUD
    }

    fn required_data_kinds(&self) -> Vec<DataKind> {
        vec![DataKind::new(TAG_CLOUD)]
    }

    fn preferred_duration(&self, _context: &ExecutionContext) -> Duration {
        Duration::from_millis(self.config.preferred_millis)
    }

    #[tracing::instrument(skip_all, fields(step = UPDATE_CLOUD))]
    fn execute(&self, context: &mut ExecutionContext, completion: Completion) -> StepResult<()> {
        let provider = context
            .provider_as::<TagCloudDataProvider>(&DataKind::new(TAG_CLOUD))
            .map_err(|e| StepError::new(UPDATE_CLOUD, e.kind.to_string()))?;

        let words = provider.words();
        if words.is_empty() {
            info!("No words counted yet, keeping the current cloud");
            completion.proceed();
            return Ok(());
        }

        let stage = context
            .state::<StageHandle>()
            .map(|handle| handle.stage().clone())
            .ok_or_else(|| StepError::new(UPDATE_CLOUD, "No cloud stage in the context"))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| StepError::new(UPDATE_CLOUD, format!("No async runtime: {}", e)))?;

        let batch = compose_batch(
            &words,
            &provider.additional_words(),
            self.config.display_count,
        );
        let placement = self
            .layout
            .layout(
                &batch,
                stage.bounds(),
                &stage.reserved(),
                self.config.max_size,
                self.config.min_size,
            )
            .map_err(|e| StepError::new(UPDATE_CLOUD, e.to_string()))?;
        for dropped in placement.dropped() {
            warn!(text = dropped.text(), "Word did not fit into the cloud");
        }

        let empty = Placement::new();
        let previous = context
            .state::<CloudState>()
            .map(CloudState::placement)
            .unwrap_or(&empty);
        let changes = diff(previous, &placement);
        info!(
            removed = changes.removed().len(),
            retained = changes.retained().len(),
            added = changes.added().len(),
            "Updating cloud"
        );

        context.insert_state(CloudState::new(placement));

        let duration = Duration::from_millis(self.config.transition_millis);
        runtime.spawn(animate(stage, changes, duration, completion));
        Ok(())
    }
}

async fn animate(
    stage: Arc<dyn CloudStage>,
    changes: PlacementDiff,
    duration: Duration,
    completion: Completion,
) {
    join_all(
        changes
            .removed()
            .iter()
            .map(|item| stage.fade_out(item, duration)),
    )
    .await;
    join_all(
        changes
            .retained()
            .iter()
            .map(|item| stage.move_item(item, duration)),
    )
    .await;
    join_all(
        changes
            .added()
            .iter()
            .map(|item| stage.fade_in(item, duration)),
    )
    .await;

    debug!("Cloud animation finished");
    completion.proceed();
}

/// Builds [`UpdateCloudStep`] from its definition.
#[derive(Debug, Default)]
pub struct UpdateCloudStepFactory;

impl StepFactory for UpdateCloudStepFactory {
    fn step_type(&self) -> &str {
        UPDATE_CLOUD
    }

    fn create(&self, definition: &StepDefinition) -> EngineResult<Box<dyn Step>> {
        let config: UpdateCloudConfig = definition.config_as()?;
        if !(config.min_size > 0.0 && config.min_size <= config.max_size) {
            return Err(EngineError::new(EngineErrorKind::StepConstruction {
                step: UPDATE_CLOUD.to_string(),
                message: format!(
                    "Size range {} to {} is invalid",
                    config.min_size, config.max_size
                ),
            }));
        }
        Ok(Box::new(UpdateCloudStep::new(config)))
    }
}
