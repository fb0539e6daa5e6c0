//! Cyclic step scheduler.
//!
//! The scheduler walks the step sequence forever, one activation at a
//! time:
//!
//! ```text
//! Idle -> Preparing(step) -> Active(step) -> Idle -> Preparing(next) ...
//! ```
//!
//! It suspends once per activation, between invoking [`Step::execute`] and
//! receiving the step's [`Completion`] signal. Positions that end without an
//! activation (a skipped step or one missing its providers) yield to the
//! runtime before returning, so a sequence that activates nothing still lets
//! other tasks run.

use crate::{
    Completion, DataKind, DataProviderRegistry, DataProviderSetting, EngineResult,
    ExecutionContext, FeedDispatcher, SchedulerSettings, Step,
};
use marquee_error::{EngineError, EngineErrorKind};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Observable scheduler state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// Between activations
    Idle,
    /// Checking the providers of the next step
    Preparing {
        /// Step name
        step: String,
        /// Position in the sequence
        index: usize,
    },
    /// A step is running and the scheduler waits for its signal
    Active {
        /// Step name
        step: String,
        /// Position in the sequence
        index: usize,
        /// Activation sequence number, starting at 1
        activation: u64,
    },
    /// Setup failed; the scheduler will not run
    Faulted {
        /// Why setup failed
        reason: String,
    },
}

/// Snapshot of scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Steps invoked
    pub activations: u64,
    /// Activations that ended with a signal from the step
    pub completions: u64,
    /// Extra signals ignored after an activation was already complete
    pub duplicate_signals: u64,
    /// Activations whose step returned an error or panicked
    pub failed_steps: u64,
    /// Activations whose step dropped its completion without signaling
    pub abandoned_steps: u64,
    /// Steps passed over through [`Step::should_skip`]
    pub skipped_steps: u64,
    /// Full passes over the sequence
    pub cycles: u64,
}

#[derive(Default)]
struct Counters {
    activations: AtomicU64,
    completions: AtomicU64,
    duplicate_signals: Arc<AtomicU64>,
    failed_steps: AtomicU64,
    abandoned_steps: AtomicU64,
    skipped_steps: AtomicU64,
    cycles: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            activations: self.activations.load(Ordering::Relaxed),
            completions: self.completions.load(Ordering::Relaxed),
            duplicate_signals: self.duplicate_signals.load(Ordering::Relaxed),
            failed_steps: self.failed_steps.load(Ordering::Relaxed),
            abandoned_steps: self.abandoned_steps.load(Ordering::Relaxed),
            skipped_steps: self.skipped_steps.load(Ordering::Relaxed),
            cycles: self.cycles.load(Ordering::Relaxed),
        }
    }
}

/// Read-only view of the counters that outlives a borrow of the scheduler.
#[derive(Clone)]
pub struct StatsHandle {
    counters: Arc<Counters>,
}

impl StatsHandle {
    /// Current counter values.
    pub fn snapshot(&self) -> SchedulerStats {
        self.counters.snapshot()
    }
}

impl std::fmt::Debug for StatsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StatsHandle").field(&self.snapshot()).finish()
    }
}

/// Drives the cyclic step sequence against one [`ExecutionContext`].
///
/// At most one step is active at any instant: the next step's
/// [`Step::execute`] is only invoked after the current activation has been
/// completed, either by the step's signal or implicitly by a step error.
pub struct StepScheduler {
    steps: Vec<Box<dyn Step>>,
    context: ExecutionContext,
    settings: SchedulerSettings,
    index: usize,
    activation: u64,
    initialized: bool,
    state: watch::Sender<SchedulerState>,
    counters: Arc<Counters>,
}

impl StepScheduler {
    /// Create a scheduler for a step sequence.
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            steps,
            context: ExecutionContext::new(),
            settings: SchedulerSettings::default(),
            index: 0,
            activation: 0,
            initialized: false,
            state,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Replace the scheduler switches.
    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Create one provider per distinct kind the steps require.
    ///
    /// Kinds are resolved in step order, then in the order each step
    /// declares them. A kind without a matching entry in `settings` is built
    /// from an empty configuration. Kinds that already exist are not built
    /// again.
    ///
    /// # Errors
    ///
    /// Returns an error and moves to [`SchedulerState::Faulted`] if:
    /// - The step sequence is empty
    /// - A required kind has no registered factory
    /// - A factory fails to construct its provider
    #[instrument(skip_all, fields(steps = self.steps.len(), factories = registry.len()))]
    pub fn initialize(
        &mut self,
        registry: &DataProviderRegistry,
        settings: &[DataProviderSetting],
    ) -> EngineResult<()> {
        if let SchedulerState::Faulted { reason } = &*self.state.borrow() {
            return Err(EngineError::new(EngineErrorKind::Faulted(reason.clone())));
        }

        match self.resolve_providers(registry, settings) {
            Ok(count) => {
                self.initialized = true;
                info!(providers = count, "Scheduler initialized");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Scheduler setup failed");
                self.state.send_replace(SchedulerState::Faulted {
                    reason: e.kind.to_string(),
                });
                Err(e)
            }
        }
    }

    fn resolve_providers(
        &mut self,
        registry: &DataProviderRegistry,
        settings: &[DataProviderSetting],
    ) -> EngineResult<usize> {
        if self.steps.is_empty() {
            return Err(EngineError::new(EngineErrorKind::EmptySequence));
        }

        let mut seen = HashSet::new();
        let required: Vec<DataKind> = self
            .steps
            .iter()
            .flat_map(|step| step.required_data_kinds())
            .filter(|kind| seen.insert(kind.clone()))
            .collect();

        let mut created = 0;
        for kind in required {
            if self.context.has_provider(&kind) {
                continue;
            }
            let factory = registry.get(&kind).ok_or_else(|| {
                EngineError::new(EngineErrorKind::MissingFactory(kind.to_string()))
            })?;
            let setting = settings
                .iter()
                .find(|s| s.kind() == kind.as_str())
                .cloned()
                .unwrap_or_else(|| DataProviderSetting::new(kind.as_str()));

            let handle = factory.create(&setting).map_err(|e| {
                if matches!(e.kind, EngineErrorKind::ProviderConstruction { .. }) {
                    e
                } else {
                    EngineError::new(EngineErrorKind::ProviderConstruction {
                        kind: kind.to_string(),
                        message: e.kind.to_string(),
                    })
                }
            })?;

            debug!(kind = %kind, provider = handle.provider().name(), "Created data provider");
            self.context.register_provider(kind, handle);
            created += 1;
        }
        Ok(created)
    }

    /// Run the presentation loop forever.
    ///
    /// # Errors
    ///
    /// Returns only if the scheduler was never initialized or is faulted.
    pub async fn run(&mut self) -> EngineResult<()> {
        loop {
            self.step_once().await?;
        }
    }

    /// Run until `cycles` more full passes over the sequence have finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler was never initialized or is faulted.
    pub async fn run_cycles(&mut self, cycles: u64) -> EngineResult<()> {
        let target = self.counters.cycles.load(Ordering::Relaxed) + cycles;
        while self.counters.cycles.load(Ordering::Relaxed) < target {
            self.step_once().await?;
        }
        Ok(())
    }

    /// Activate the step at the current position and wait for it to complete.
    ///
    /// A step that asks to be skipped is passed over without activation.
    /// The position advances, wrapping after the last step, once the
    /// activation is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler was never initialized or is faulted.
    pub async fn step_once(&mut self) -> EngineResult<()> {
        self.ensure_runnable()?;

        let index = self.index;
        let step = &self.steps[index];
        let name = step.name().to_string();

        if step.should_skip(&self.context) {
            debug!(step = %name, index, "Skipping step");
            self.counters.skipped_steps.fetch_add(1, Ordering::Relaxed);
            self.advance();
            tokio::task::yield_now().await;
            return Ok(());
        }

        self.state.send_replace(SchedulerState::Preparing {
            step: name.clone(),
            index,
        });
        let missing = step
            .required_data_kinds()
            .into_iter()
            .find(|kind| !self.context.has_provider(kind));
        if let Some(kind) = missing {
            let e = EngineError::new(EngineErrorKind::ProviderNotInitialized {
                step: name.clone(),
                kind: kind.to_string(),
            });
            error!(error = %e, "Skipping step with uninitialized provider");
            self.counters.failed_steps.fetch_add(1, Ordering::Relaxed);
            self.state.send_replace(SchedulerState::Idle);
            self.advance();
            tokio::task::yield_now().await;
            return Ok(());
        }

        self.activation += 1;
        let activation = self.activation;
        let preferred = step.preferred_duration(&self.context);
        self.state.send_replace(SchedulerState::Active {
            step: name.clone(),
            index,
            activation,
        });
        self.counters.activations.fetch_add(1, Ordering::Relaxed);
        info!(
            step = %name,
            index,
            activation,
            preferred_ms = preferred.as_millis() as u64,
            "Activating step"
        );

        let started = Instant::now();
        let (completion, signal) =
            Completion::channel(name.as_str(), activation, self.counters.duplicate_signals.clone());

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.steps[index].execute(&mut self.context, completion.clone())
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(step = %name, activation, error = %e, "Step failed, treating as completed");
                self.counters.failed_steps.fetch_add(1, Ordering::Relaxed);
                completion.complete_implicitly();
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(step = %name, activation, reason = %reason, "Step panicked, treating as completed");
                self.counters.failed_steps.fetch_add(1, Ordering::Relaxed);
                completion.complete_implicitly();
            }
        }
        drop(completion);

        match signal.await {
            Ok(()) => {
                self.counters.completions.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                warn!(step = %name, activation, "Step dropped its completion without signaling");
                self.counters.abandoned_steps.fetch_add(1, Ordering::Relaxed);
            }
        }

        if *self.settings.honor_preferred_duration() {
            let elapsed = started.elapsed();
            if elapsed < preferred {
                tokio::time::sleep(preferred - elapsed).await;
            }
        }

        debug!(step = %name, activation, elapsed_ms = started.elapsed().as_millis() as u64, "Step complete");
        self.state.send_replace(SchedulerState::Idle);
        self.advance();
        Ok(())
    }

    fn ensure_runnable(&self) -> EngineResult<()> {
        if let SchedulerState::Faulted { reason } = &*self.state.borrow() {
            return Err(EngineError::new(EngineErrorKind::Faulted(reason.clone())));
        }
        if !self.initialized {
            return Err(EngineError::new(EngineErrorKind::NotInitialized));
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.steps.len();
        if self.index == 0 {
            let cycles = self.counters.cycles.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(cycles, "Completed cycle");
        }
    }

    /// Sum of the preferred durations of all steps.
    pub fn cycle_budget(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| step.preferred_duration(&self.context))
            .sum()
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Current counter values.
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    /// Counter view that can be read while the scheduler runs elsewhere.
    pub fn stats_handle(&self) -> StatsHandle {
        StatsHandle {
            counters: self.counters.clone(),
        }
    }

    /// Dispatcher feeding every initialized provider.
    pub fn feed(&self) -> FeedDispatcher {
        FeedDispatcher::new(
            self.context
                .providers()
                .map(|(kind, provider)| (kind.clone(), provider.clone()))
                .collect(),
        )
    }

    /// Position of the next step to activate.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Names of the steps in sequence order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.name().to_string()).collect()
    }

    /// The shared context.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// The shared context, for seeding scenario state before running.
    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl std::fmt::Debug for StepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScheduler")
            .field("steps", &self.step_names())
            .field("index", &self.index)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
