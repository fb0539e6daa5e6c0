//! Assembly of a runnable wall from settings.

use kurbo::Rect;
use marquee_engine::{EngineSettings, StepScheduler};
use marquee_error::MarqueeResult;
use marquee_layout::{CloudLayout, LayoutResult, Placement, SpiralConfig, WeightedItem, sort_by_weight};
use marquee_steps::{StageHandle, default_provider_registry, default_step_registry};
use tracing::{info, instrument};

/// Build an initialized scheduler for the configured step sequence.
///
/// Steps and providers come from the default registries; the stage is
/// stored in the context for the cloud steps.
///
/// # Errors
///
/// Returns an error if the sequence is empty, names an unknown step,
/// carries invalid step or provider configuration, or needs a provider
/// that cannot be built.
#[instrument(skip_all, fields(steps = settings.steps().len()))]
pub fn build_wall(settings: &EngineSettings, stage: StageHandle) -> MarqueeResult<StepScheduler> {
    let steps = default_step_registry().build_sequence(settings.steps())?;
    let mut scheduler = StepScheduler::new(steps).with_settings(settings.engine().clone());
    scheduler.initialize(&default_provider_registry(), settings.data_providers())?;
    scheduler.context_mut().insert_state(stage);

    info!(steps = ?scheduler.step_names(), "Wall assembled");
    Ok(scheduler)
}

/// Sort `items` by weight and lay them out on a `width` by `height` canvas.
///
/// # Errors
///
/// Returns an error if the canvas, size range or a weight is invalid.
pub fn lay_out(
    mut items: Vec<WeightedItem>,
    width: f64,
    height: f64,
    max_size: f64,
    min_size: f64,
) -> LayoutResult<Placement> {
    sort_by_weight(&mut items);
    CloudLayout::new(SpiralConfig::default()).layout(
        &items,
        Rect::new(0.0, 0.0, width, height),
        &[],
        max_size,
        min_size,
    )
}
