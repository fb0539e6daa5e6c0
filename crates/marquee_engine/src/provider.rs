//! Data providers and the registry of their factories.

use crate::{DataKind, DataProviderSetting, EngineResult, FeedItem};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A long-lived source of domain data read by steps.
///
/// One instance per kind exists for the lifetime of the scheduler. A feed
/// may call the `process_*` hooks from another thread at any time, so
/// implementations keep their state behind their own synchronization.
pub trait DataProvider: Send + Sync + 'static {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// Refresh on a newly arrived feed item. Ignored by default.
    fn process_new_item(&self, _item: &FeedItem) {}

    /// Refresh on a replayed history item. Ignored by default.
    fn process_history_item(&self, _item: &FeedItem) {}
}

/// Type-erased provider that can be recovered as its concrete type.
#[derive(Clone)]
pub struct ProviderHandle {
    provider: Arc<dyn DataProvider>,
    any: Arc<dyn Any + Send + Sync>,
}

impl ProviderHandle {
    /// Wrap a provider.
    pub fn new<P: DataProvider>(provider: P) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    /// Wrap an already shared provider.
    pub fn from_arc<P: DataProvider>(provider: Arc<P>) -> Self {
        Self {
            provider: provider.clone(),
            any: provider,
        }
    }

    /// The provider as a trait object.
    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    /// The provider as its concrete type, if it is a `P`.
    pub fn downcast<P: DataProvider>(&self) -> Option<Arc<P>> {
        self.any.clone().downcast::<P>().ok()
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.provider.name())
            .finish()
    }
}

/// Builds the provider for one kind from its settings.
pub trait DataProviderFactory: Send + Sync {
    /// Kind this factory builds.
    fn kind(&self) -> DataKind;

    /// Build the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the provider cannot
    /// be constructed. The scheduler treats this as fatal.
    fn create(&self, setting: &DataProviderSetting) -> EngineResult<ProviderHandle>;
}

struct FnFactory<F> {
    kind: DataKind,
    build: F,
}

impl<F> DataProviderFactory for FnFactory<F>
where
    F: Fn(&DataProviderSetting) -> EngineResult<ProviderHandle> + Send + Sync,
{
    fn kind(&self) -> DataKind {
        self.kind.clone()
    }

    fn create(&self, setting: &DataProviderSetting) -> EngineResult<ProviderHandle> {
        (self.build)(setting)
    }
}

/// Registry of data provider factories keyed by kind.
///
/// Filled at process startup by direct registration calls.
pub struct DataProviderRegistry {
    factories: HashMap<DataKind, Arc<dyn DataProviderFactory>>,
}

impl DataProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory.
    ///
    /// If a factory for the same kind already exists, it will be replaced and a warning logged.
    #[tracing::instrument(skip(self, factory), fields(kind = %factory.kind()))]
    pub fn register(&mut self, factory: Arc<dyn DataProviderFactory>) {
        let kind = factory.kind();

        if self.factories.contains_key(&kind) {
            tracing::warn!(kind = %kind, "Data provider factory already registered, overwriting previous registration");
        } else {
            tracing::debug!("Registering data provider factory");
        }

        self.factories.insert(kind, factory);
    }

    /// Register a closure as the factory for `kind`.
    pub fn register_fn<F>(&mut self, kind: impl Into<DataKind>, build: F)
    where
        F: Fn(&DataProviderSetting) -> EngineResult<ProviderHandle> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnFactory {
            kind: kind.into(),
            build,
        }));
    }

    /// Get the factory for a kind.
    pub fn get(&self, kind: &DataKind) -> Option<Arc<dyn DataProviderFactory>> {
        self.factories.get(kind).cloned()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<DataKind> {
        let mut kinds: Vec<DataKind> = self.factories.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Get number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for DataProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
