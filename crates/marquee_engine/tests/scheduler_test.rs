//! Tests for the cyclic step scheduler.

use marquee_engine::{
    Completion, DataKind, DataProvider, DataProviderRegistry, ExecutionContext, FeedItem,
    ProviderHandle, SchedulerSettings, SchedulerState, Step, StepResult, StepScheduler,
};
use marquee_error::{EngineErrorKind, StepError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a mock step finishes its activation.
#[derive(Clone)]
enum Finish {
    /// Signal before returning
    Sync,
    /// Signal from a spawned task after a delay
    After(Duration),
    /// Signal twice before returning
    Twice,
    /// Return an error without signaling
    Fail,
    /// Drop the completion without signaling
    Abandon,
    /// Panic inside execute without signaling
    Panic,
    /// Keep the completion for the test to signal
    Hold(Arc<Mutex<Vec<Completion>>>),
}

/// Shared trace of what the mock steps did.
#[derive(Default)]
struct Trace {
    events: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl Trace {
    fn enter(&self, name: &str) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("start:{}", name));
    }

    fn leave(&self, name: &str) {
        self.events.lock().unwrap().push(format!("end:{}", name));
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn starts(&self, name: &str) -> usize {
        let needle = format!("start:{}", name);
        self.events().iter().filter(|e| **e == needle).count()
    }
}

struct MockStep {
    name: String,
    finish: Finish,
    trace: Arc<Trace>,
    kinds: Vec<DataKind>,
    skip: bool,
    preferred: Duration,
}

impl MockStep {
    fn new(name: &str, finish: Finish, trace: &Arc<Trace>) -> Self {
        Self {
            name: name.to_string(),
            finish,
            trace: trace.clone(),
            kinds: Vec::new(),
            skip: false,
            preferred: Duration::from_secs(1),
        }
    }

    fn requiring(mut self, kinds: &[&str]) -> Self {
        self.kinds = kinds.iter().map(|k| DataKind::new(*k)).collect();
        self
    }

    fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    fn preferring(mut self, preferred: Duration) -> Self {
        self.preferred = preferred;
        self
    }
}

impl Step for MockStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_data_kinds(&self) -> Vec<DataKind> {
        self.kinds.clone()
    }

    fn preferred_duration(&self, _context: &ExecutionContext) -> Duration {
        self.preferred
    }

    fn should_skip(&self, _context: &ExecutionContext) -> bool {
        self.skip
    }

    fn execute(&self, _context: &mut ExecutionContext, completion: Completion) -> StepResult<()> {
        self.trace.enter(&self.name);
        match &self.finish {
            Finish::Sync => {
                self.trace.leave(&self.name);
                completion.proceed();
            }
            Finish::After(delay) => {
                let trace = self.trace.clone();
                let name = self.name.clone();
                let delay = *delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    trace.leave(&name);
                    completion.proceed();
                });
            }
            Finish::Twice => {
                self.trace.leave(&self.name);
                assert!(completion.proceed());
                assert!(!completion.proceed());
            }
            Finish::Fail => {
                self.trace.leave(&self.name);
                return Err(StepError::new(&self.name, "mock failure"));
            }
            Finish::Abandon => {
                self.trace.leave(&self.name);
                drop(completion);
            }
            Finish::Panic => {
                self.trace.leave(&self.name);
                let empty = Vec::<u32>::new();
                std::hint::black_box(empty[0]);
            }
            Finish::Hold(held) => {
                held.lock().unwrap().push(completion);
            }
        }
        Ok(())
    }
}

struct CountingProvider {
    name: String,
    items: AtomicUsize,
}

impl DataProvider for CountingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_new_item(&self, _item: &FeedItem) {
        self.items.fetch_add(1, Ordering::SeqCst);
    }

    fn process_history_item(&self, _item: &FeedItem) {
        self.items.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_registry(kinds: &[&str], created: &Arc<Mutex<Vec<String>>>) -> DataProviderRegistry {
    let mut registry = DataProviderRegistry::new();
    for kind in kinds {
        let created = created.clone();
        let kind_name = kind.to_string();
        registry.register_fn(*kind, move |_setting| {
            created.lock().unwrap().push(kind_name.clone());
            Ok(ProviderHandle::new(CountingProvider {
                name: kind_name.clone(),
                items: AtomicUsize::new(0),
            }))
        });
    }
    registry
}

fn boxed(steps: Vec<MockStep>) -> Vec<Box<dyn Step>> {
    steps
        .into_iter()
        .map(|step| Box::new(step) as Box<dyn Step>)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_steps_run_in_order_one_at_a_time() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("one", Finish::After(Duration::from_millis(300)), &trace),
        MockStep::new("two", Finish::Sync, &trace),
        MockStep::new("three", Finish::After(Duration::from_millis(50)), &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    scheduler.run_cycles(2).await.unwrap();

    assert_eq!(trace.max_active.load(Ordering::SeqCst), 1);
    let expected: Vec<String> = ["one", "two", "three", "one", "two", "three"]
        .iter()
        .flat_map(|n| [format!("start:{}", n), format!("end:{}", n)])
        .collect();
    assert_eq!(trace.events(), expected);

    let stats = scheduler.stats();
    assert_eq!(stats.activations, 6);
    assert_eq!(stats.completions, 6);
    assert_eq!(stats.cycles, 2);
    assert_eq!(scheduler.current_index(), 0);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_step_blocks_the_cycle() {
    let trace = Arc::new(Trace::default());
    let held = Arc::new(Mutex::new(Vec::new()));
    let steps = boxed(vec![
        MockStep::new("one", Finish::Sync, &trace),
        MockStep::new("two", Finish::Hold(held.clone()), &trace),
        MockStep::new("three", Finish::Sync, &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();
    let mut states = scheduler.subscribe();

    let runner = tokio::spawn(async move { scheduler.run().await });

    states
        .wait_for(|s| matches!(s, SchedulerState::Active { step, .. } if step == "two"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert_eq!(trace.starts("one"), 1);
    assert_eq!(trace.starts("two"), 1);
    assert_eq!(trace.starts("three"), 0);
    assert!(matches!(
        &*states.borrow(),
        SchedulerState::Active { step, activation: 2, .. } if step == "two"
    ));

    let first = held.lock().unwrap().remove(0);
    assert!(first.proceed());

    states
        .wait_for(|s| matches!(s, SchedulerState::Active { activation: 5, .. }))
        .await
        .unwrap();
    assert_eq!(trace.starts("three"), 1);
    assert_eq!(trace.starts("one"), 2);
    assert_eq!(trace.starts("two"), 2);

    runner.abort();
}

#[tokio::test(start_paused = true)]
async fn test_late_duplicate_signal_does_not_advance() {
    let trace = Arc::new(Trace::default());
    let held = Arc::new(Mutex::new(Vec::new()));
    let steps = boxed(vec![
        MockStep::new("one", Finish::Hold(held.clone()), &trace),
        MockStep::new("two", Finish::Hold(held.clone()), &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();
    let stats = scheduler.stats_handle();
    let mut states = scheduler.subscribe();

    let runner = tokio::spawn(async move { scheduler.run().await });

    states
        .wait_for(|s| matches!(s, SchedulerState::Active { activation: 1, .. }))
        .await
        .unwrap();
    let first = held.lock().unwrap()[0].clone();
    assert!(first.proceed());

    states
        .wait_for(|s| matches!(s, SchedulerState::Active { activation: 2, .. }))
        .await
        .unwrap();

    assert!(!first.proceed());
    assert!(!first.proceed());
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(matches!(
        &*states.borrow(),
        SchedulerState::Active { step, activation: 2, .. } if step == "two"
    ));
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.duplicate_signals, 2);
    assert_eq!(snapshot.completions, 1);
    assert_eq!(trace.starts("one"), 1);

    runner.abort();
}

#[tokio::test]
async fn test_double_signal_within_activation_is_ignored() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("chatty", Finish::Twice, &trace),
        MockStep::new("quiet", Finish::Sync, &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    scheduler.run_cycles(1).await.unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.activations, 2);
    assert_eq!(stats.completions, 2);
    assert_eq!(stats.duplicate_signals, 1);
    assert_eq!(trace.starts("quiet"), 1);
}

#[tokio::test]
async fn test_failing_step_counts_as_completed() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("broken", Finish::Fail, &trace),
        MockStep::new("fine", Finish::Sync, &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    scheduler.run_cycles(3).await.unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.failed_steps, 3);
    assert_eq!(stats.activations, 6);
    assert_eq!(trace.starts("fine"), 3);
}

#[tokio::test]
async fn test_panicking_step_counts_as_completed() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("fine", Finish::Sync, &trace),
        MockStep::new("crashing", Finish::Panic, &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    let handle = tokio::spawn(async move {
        scheduler.run_cycles(2).await.map(|_| scheduler.stats())
    });
    let stats = handle.await.unwrap().unwrap();

    assert_eq!(stats.activations, 4);
    assert_eq!(stats.failed_steps, 2);
    assert_eq!(stats.cycles, 2);
    assert_eq!(trace.starts("crashing"), 2);
    assert_eq!(trace.starts("fine"), 2);
}

#[tokio::test]
async fn test_abandoned_completion_does_not_deadlock() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("forgetful", Finish::Abandon, &trace),
        MockStep::new("fine", Finish::Sync, &trace),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    scheduler.run_cycles(1).await.unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.abandoned_steps, 1);
    assert_eq!(stats.completions, 1);
}

#[tokio::test]
async fn test_skipped_step_is_never_executed() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("shown", Finish::Sync, &trace),
        MockStep::new("hidden", Finish::Sync, &trace).skipped(),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    scheduler.run_cycles(2).await.unwrap();

    assert_eq!(trace.starts("hidden"), 0);
    let stats = scheduler.stats();
    assert_eq!(stats.skipped_steps, 2);
    assert_eq!(stats.activations, 2);
}

#[tokio::test]
async fn test_all_skipped_sequence_keeps_yielding() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("hidden", Finish::Sync, &trace).skipped(),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    let outcome = tokio::time::timeout(Duration::from_millis(200), scheduler.run()).await;

    assert!(outcome.is_err());
    let stats = scheduler.stats();
    assert!(stats.skipped_steps > 0);
    assert_eq!(stats.activations, 0);
    assert_eq!(trace.starts("hidden"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_preferred_duration_paces_when_enabled() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("slide", Finish::Sync, &trace).preferring(Duration::from_secs(5)),
        MockStep::new("slow", Finish::After(Duration::from_secs(8)), &trace)
            .preferring(Duration::from_secs(2)),
    ]);
    let mut scheduler =
        StepScheduler::new(steps).with_settings(SchedulerSettings::new(true));
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();
    assert_eq!(scheduler.cycle_budget(), Duration::from_secs(7));

    let started = tokio::time::Instant::now();
    scheduler.run_cycles(1).await.unwrap();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(13), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(14), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_preferred_duration_is_advisory_by_default() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("slide", Finish::Sync, &trace).preferring(Duration::from_secs(5)),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&DataProviderRegistry::new(), &[]).unwrap();

    let started = tokio::time::Instant::now();
    scheduler.run_cycles(1).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_providers_created_once_in_declared_order() {
    let trace = Arc::new(Trace::default());
    let created = Arc::new(Mutex::new(Vec::new()));
    let registry = counting_registry(&["words", "schedule", "images"], &created);
    let steps = boxed(vec![
        MockStep::new("cloud", Finish::Sync, &trace).requiring(&["words"]),
        MockStep::new("agenda", Finish::Sync, &trace).requiring(&["schedule", "words"]),
        MockStep::new("again", Finish::Sync, &trace).requiring(&["words"]),
    ]);
    let mut scheduler = StepScheduler::new(steps);

    scheduler.initialize(&registry, &[]).unwrap();
    scheduler.initialize(&registry, &[]).unwrap();
    scheduler.run_cycles(2).await.unwrap();

    assert_eq!(*created.lock().unwrap(), vec!["words", "schedule"]);
    assert!(!scheduler.context().has_provider(&DataKind::new("images")));
}

#[tokio::test]
async fn test_missing_factory_faults_scheduler() {
    let trace = Arc::new(Trace::default());
    let steps = boxed(vec![
        MockStep::new("cloud", Finish::Sync, &trace).requiring(&["words"]),
    ]);
    let mut scheduler = StepScheduler::new(steps);

    let err = scheduler
        .initialize(&DataProviderRegistry::new(), &[])
        .unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::MissingFactory("words".to_string()));
    assert!(err.is_fatal());
    assert!(matches!(scheduler.state(), SchedulerState::Faulted { .. }));

    let err = scheduler.run().await.unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::Faulted(_)));
    assert_eq!(trace.starts("cloud"), 0);
}

#[tokio::test]
async fn test_provider_construction_failure_faults_scheduler() {
    let trace = Arc::new(Trace::default());
    let mut registry = DataProviderRegistry::new();
    registry.register_fn("words", |setting| {
        setting
            .config_as::<std::collections::HashMap<String, u32>>()
            .map(|_| ProviderHandle::new(CountingProvider {
                name: "words".to_string(),
                items: AtomicUsize::new(0),
            }))
    });
    let mut config = toml::Table::new();
    config.insert("max_words".to_string(), toml::Value::String("many".to_string()));
    let settings = [marquee_engine::DataProviderSetting::with_config("words", config)];

    let steps = boxed(vec![
        MockStep::new("cloud", Finish::Sync, &trace).requiring(&["words"]),
    ]);
    let mut scheduler = StepScheduler::new(steps);

    let err = scheduler.initialize(&registry, &settings).unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::ProviderConstruction { .. }));
    assert!(matches!(scheduler.state(), SchedulerState::Faulted { .. }));
}

#[tokio::test]
async fn test_empty_sequence_is_rejected() {
    let mut scheduler = StepScheduler::new(Vec::new());
    let err = scheduler
        .initialize(&DataProviderRegistry::new(), &[])
        .unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::EmptySequence);
}

#[tokio::test]
async fn test_run_requires_initialize() {
    let trace = Arc::new(Trace::default());
    let mut scheduler = StepScheduler::new(boxed(vec![MockStep::new("one", Finish::Sync, &trace)]));
    let err = scheduler.step_once().await.unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::NotInitialized);
}

#[tokio::test]
async fn test_feed_reaches_providers_from_other_threads() {
    let trace = Arc::new(Trace::default());
    let created = Arc::new(Mutex::new(Vec::new()));
    let registry = counting_registry(&["words"], &created);
    let steps = boxed(vec![
        MockStep::new("cloud", Finish::Sync, &trace).requiring(&["words"]),
    ]);
    let mut scheduler = StepScheduler::new(steps);
    scheduler.initialize(&registry, &[]).unwrap();

    let feed = scheduler.feed();
    let writer = std::thread::spawn(move || {
        for idx in 0..10 {
            feed.publish(&FeedItem::new(idx.to_string(), "someone", "hello wall"));
        }
        feed.replay_history(&[FeedItem::new("old", "someone", "earlier")]);
    });
    scheduler.run_cycles(5).await.unwrap();
    writer.join().unwrap();

    let provider = scheduler
        .context()
        .provider_as::<CountingProvider>(&DataKind::new("words"))
        .unwrap();
    assert_eq!(provider.items.load(Ordering::SeqCst), 11);
}
