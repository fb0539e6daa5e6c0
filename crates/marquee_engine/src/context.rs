//! Shared state handed to every step.

use crate::{DataKind, DataProvider, EngineResult, ProviderHandle};
use marquee_error::{EngineError, EngineErrorKind};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Process-lifetime bag of providers and scenario state.
///
/// Owned by the [`StepScheduler`](crate::StepScheduler): providers are
/// registered once at initialization, after which steps read providers
/// and read or write scenario state keyed by its Rust type. Only one step
/// is active at a time, so the last write wins.
pub struct ExecutionContext {
    providers: HashMap<DataKind, ProviderHandle>,
    order: Vec<DataKind>,
    states: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ExecutionContext {
    pub(crate) fn new() -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
            states: HashMap::new(),
        }
    }

    pub(crate) fn register_provider(&mut self, kind: DataKind, handle: ProviderHandle) {
        if self.providers.insert(kind.clone(), handle).is_none() {
            self.order.push(kind);
        }
    }

    /// Whether a provider of this kind was initialized.
    pub fn has_provider(&self, kind: &DataKind) -> bool {
        self.providers.contains_key(kind)
    }

    /// Provider of a kind as a trait object.
    pub fn provider_by_kind(&self, kind: &DataKind) -> Option<&Arc<dyn DataProvider>> {
        self.providers.get(kind).map(ProviderHandle::provider)
    }

    /// Provider of a kind as its concrete type.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider of this kind was initialized or if
    /// it is not a `P`.
    pub fn provider_as<P: DataProvider>(&self, kind: &DataKind) -> EngineResult<Arc<P>> {
        let handle = self.providers.get(kind).ok_or_else(|| {
            EngineError::new(EngineErrorKind::ProviderNotFound(kind.to_string()))
        })?;
        handle.downcast::<P>().ok_or_else(|| {
            EngineError::new(EngineErrorKind::ProviderTypeMismatch(kind.to_string()))
        })
    }

    /// The first initialized provider of concrete type `P`.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider of type `P` was initialized.
    pub fn provider<P: DataProvider>(&self) -> EngineResult<Arc<P>> {
        self.order
            .iter()
            .filter_map(|kind| self.providers.get(kind))
            .find_map(ProviderHandle::downcast::<P>)
            .ok_or_else(|| {
                EngineError::new(EngineErrorKind::ProviderNotFound(
                    std::any::type_name::<P>().to_string(),
                ))
            })
    }

    /// Initialized providers in initialization order.
    pub fn providers(&self) -> impl Iterator<Item = (&DataKind, &Arc<dyn DataProvider>)> {
        self.order
            .iter()
            .filter_map(|kind| self.providers.get_key_value(kind))
            .map(|(kind, handle)| (kind, handle.provider()))
    }

    /// Store scenario state, returning the previous value of that type.
    pub fn insert_state<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.states
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Scenario state of type `T`.
    pub fn state<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Mutable scenario state of type `T`.
    pub fn state_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.states
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Remove scenario state of type `T`.
    pub fn remove_state<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.states
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("providers", &self.order)
            .field("states", &self.states.len())
            .finish()
    }
}
