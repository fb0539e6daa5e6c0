//! Tests for registries, typed context lookups and engine settings.

use marquee_engine::{
    Completion, DataKind, DataProvider, DataProviderRegistry, DataProviderSetting,
    EngineSettings, ExecutionContext, Step, StepDefinition, StepFactory, StepRegistry,
    ProviderHandle, StepResult, StepScheduler,
};
use marquee_error::EngineErrorKind;
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
struct Schedule;

impl DataProvider for Schedule {
    fn name(&self) -> &str {
        "schedule"
    }
}

#[derive(Debug)]
struct Words;

impl DataProvider for Words {
    fn name(&self) -> &str {
        "words"
    }
}

struct Reader {
    kinds: Vec<DataKind>,
}

impl Step for Reader {
    fn name(&self) -> &str {
        "reader"
    }

    fn required_data_kinds(&self) -> Vec<DataKind> {
        self.kinds.clone()
    }

    fn preferred_duration(&self, _context: &ExecutionContext) -> Duration {
        Duration::from_secs(1)
    }

    fn execute(&self, context: &mut ExecutionContext, completion: Completion) -> StepResult<()> {
        let seen = context.state::<u32>().copied().unwrap_or(0);
        context.insert_state(seen + 1);
        completion.proceed();
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ReaderConfig {
    kinds: Vec<String>,
}

struct ReaderFactory;

impl StepFactory for ReaderFactory {
    fn step_type(&self) -> &str {
        "reader"
    }

    fn create(&self, definition: &StepDefinition) -> marquee_engine::EngineResult<Box<dyn Step>> {
        let config: ReaderConfig = definition.config_as()?;
        Ok(Box::new(Reader {
            kinds: config.kinds.into_iter().map(DataKind::new).collect(),
        }))
    }
}

fn provider_registry() -> DataProviderRegistry {
    let mut registry = DataProviderRegistry::new();
    registry.register_fn("schedule", |_| Ok(ProviderHandle::new(Schedule)));
    registry.register_fn("words", |_| Ok(ProviderHandle::new(Words)));
    registry
}

fn initialized(kinds: &[&str]) -> StepScheduler {
    let reader = Reader {
        kinds: kinds.iter().map(|k| DataKind::new(*k)).collect(),
    };
    let mut scheduler = StepScheduler::new(vec![Box::new(reader)]);
    scheduler.initialize(&provider_registry(), &[]).unwrap();
    scheduler
}

#[tokio::test]
async fn test_typed_provider_lookup() {
    let scheduler = initialized(&["words", "schedule"]);
    let context = scheduler.context();

    assert!(context.provider::<Words>().is_ok());
    assert!(context.provider::<Schedule>().is_ok());
    assert!(context.provider_as::<Words>(&DataKind::new("words")).is_ok());

    let err = context
        .provider_as::<Words>(&DataKind::new("schedule"))
        .unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::ProviderTypeMismatch("schedule".to_string()));

    let err = context
        .provider_as::<Words>(&DataKind::new("images"))
        .unwrap_err();
    assert_eq!(err.kind, EngineErrorKind::ProviderNotFound("images".to_string()));

    let names: Vec<&str> = context.providers().map(|(_, p)| p.name()).collect();
    assert_eq!(names, vec!["words", "schedule"]);
}

#[tokio::test]
async fn test_missing_provider_type_is_reported() {
    let scheduler = initialized(&["words"]);
    let err = scheduler.context().provider::<Schedule>().unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::ProviderNotFound(_)));
}

#[tokio::test]
async fn test_scenario_state_persists_across_activations() {
    let mut scheduler = initialized(&[]);
    scheduler.run_cycles(3).await.unwrap();
    assert_eq!(scheduler.context().state::<u32>(), Some(&3));

    *scheduler.context_mut().state_mut::<u32>().unwrap() = 10;
    assert_eq!(scheduler.context_mut().insert_state(11u32), Some(10));
    assert_eq!(scheduler.context_mut().remove_state::<u32>(), Some(11));
    assert!(scheduler.context().state::<u32>().is_none());
    assert!(scheduler.context().state::<String>().is_none());
}

#[test]
fn test_data_kind_identity_is_exact() {
    assert_eq!(DataKind::new("words"), DataKind::from("words"));
    assert_ne!(DataKind::new("words"), DataKind::new("Words"));
    assert_eq!(DataKind::new("words").to_string(), "words");
}

#[test]
fn test_provider_registry_overwrites() {
    let mut registry = provider_registry();
    assert_eq!(registry.len(), 2);
    registry.register_fn("words", |_| Ok(ProviderHandle::new(Words)));
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.kinds(),
        vec![DataKind::new("schedule"), DataKind::new("words")]
    );
    assert!(registry.get(&DataKind::new("images")).is_none());
    assert!(DataProviderRegistry::default().is_empty());
}

#[test]
fn test_step_registry_builds_sequence_in_order() {
    let mut registry = StepRegistry::new();
    registry.register(Arc::new(ReaderFactory));
    assert_eq!(registry.step_types(), vec!["reader"]);

    let settings = EngineSettings::from_toml_str(
        r#"
        [[steps]]
        step = "reader"
        [steps.config]
        kinds = ["words"]

        [[steps]]
        step = "reader"
        [steps.config]
        kinds = ["schedule", "words"]
        "#,
    )
    .unwrap();

    let steps = registry.build_sequence(settings.steps()).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].required_data_kinds(), vec![DataKind::new("schedule"), DataKind::new("words")]);
}

#[test]
fn test_step_registry_rejects_bad_sequences() {
    let mut registry = StepRegistry::new();
    registry.register(Arc::new(ReaderFactory));

    let err = registry.build_sequence(&[]).err().unwrap();
    assert_eq!(err.kind, EngineErrorKind::EmptySequence);

    let err = registry
        .build_sequence(&[StepDefinition::new("slideshow")])
        .err()
        .unwrap();
    assert_eq!(err.kind, EngineErrorKind::UnknownStep("slideshow".to_string()));

    let err = registry
        .build_sequence(&[StepDefinition::new("reader")])
        .err()
        .unwrap();
    assert!(matches!(err.kind, EngineErrorKind::StepConstruction { .. }));
}

#[test]
fn test_settings_from_toml() {
    let settings = EngineSettings::from_toml_str(
        r#"
        [engine]
        honor_preferred_duration = true

        [[steps]]
        step = "pause"
        [steps.config]
        millis = 250

        [[data_providers]]
        kind = "tag_cloud"
        [data_providers.config]
        max_words = 12
        "#,
    )
    .unwrap();

    assert!(*settings.engine().honor_preferred_duration());
    assert_eq!(settings.steps().len(), 1);

    #[derive(Deserialize)]
    struct Pause {
        millis: u64,
    }
    let pause: Pause = settings.steps()[0].config_as().unwrap();
    assert_eq!(pause.millis, 250);

    #[derive(Deserialize)]
    struct Cloud {
        max_words: usize,
    }
    let cloud: Cloud = settings
        .provider_setting("tag_cloud")
        .unwrap()
        .config_as()
        .unwrap();
    assert_eq!(cloud.max_words, 12);
    assert!(settings.provider_setting("images").is_none());
}

#[test]
fn test_settings_default_to_empty() {
    let settings = EngineSettings::from_toml_str("").unwrap();
    assert!(!*settings.engine().honor_preferred_duration());
    assert!(settings.steps().is_empty());
    assert!(settings.data_providers().is_empty());
    assert!(EngineSettings::from_toml_str("steps = 3").is_err());
}

#[test]
fn test_invalid_provider_config_is_construction_error() {
    let mut config = toml::Table::new();
    config.insert("max_words".to_string(), toml::Value::String("lots".to_string()));
    let setting = DataProviderSetting::with_config("tag_cloud", config);

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Cloud {
        max_words: usize,
    }
    let err = setting.config_as::<Cloud>().unwrap_err();
    assert!(matches!(err.kind, EngineErrorKind::ProviderConstruction { .. }));
}

#[test]
fn test_load_layers_explicit_file_over_bundled_defaults() {
    let bundled = EngineSettings::load(None).unwrap();
    assert!(!bundled.steps().is_empty());

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[engine]\nhonor_preferred_duration = false").unwrap();

    let layered = EngineSettings::load(Some(file.path())).unwrap();
    assert!(!*layered.engine().honor_preferred_duration());
    assert_eq!(layered.steps().len(), bundled.steps().len());
}

#[test]
fn test_load_requires_explicit_file() {
    let missing = std::path::Path::new("/nonexistent/marquee-settings.toml");
    assert!(EngineSettings::load(Some(missing)).is_err());
}
