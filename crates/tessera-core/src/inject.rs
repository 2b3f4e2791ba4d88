//! Collaborator injection for field initializers.
//!
//! The host registers collaborators on a [`ServiceProvider`] once. Each
//! top-level load or create opens a fresh [`InjectionScope`]; values produced
//! by scoped factories live only as long as that scope.

use crate::error::{Error, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type Shared = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Application-wide registry of collaborators.
///
/// Collaborators are looked up by type. Register trait objects wrapped in an
/// `Arc`, e.g. `provider.add_singleton::<Arc<dyn MediaResolver>>(...)`.
#[derive(Default)]
pub struct ServiceProvider {
    singletons: DashMap<TypeId, Shared>,
    scoped: DashMap<TypeId, Factory>,
}

impl ServiceProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value shared by every scope.
    pub fn add_singleton<T: Clone + Any + Send + Sync>(&self, value: T) {
        self.singletons.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Register a factory invoked at most once per scope.
    pub fn add_scoped<T, F>(&self, factory: F)
    where
        T: Clone + Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.scoped.insert(
            TypeId::of::<T>(),
            Arc::new(move || -> Box<dyn Any + Send + Sync> { Box::new(factory()) }),
        );
    }

    /// Builder form of [`add_singleton`](Self::add_singleton).
    pub fn with_singleton<T: Clone + Any + Send + Sync>(self, value: T) -> Self {
        self.add_singleton(value);
        self
    }

    /// Builder form of [`add_scoped`](Self::add_scoped).
    pub fn with_scoped<T, F>(self, factory: F) -> Self
    where
        T: Clone + Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.add_scoped(factory);
        self
    }

    /// Check whether a collaborator of type `T` can be resolved.
    pub fn contains<T: Any>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.singletons.contains_key(&id) || self.scoped.contains_key(&id)
    }

    /// Open a new resolution scope.
    pub fn create_scope(self: &Arc<Self>) -> InjectionScope {
        InjectionScope {
            provider: Arc::clone(self),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn singleton<T: Clone + Any + Send + Sync>(&self) -> Option<T> {
        self.singletons
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    fn factory<T: Any>(&self) -> Option<Factory> {
        self.scoped
            .get(&TypeId::of::<T>())
            .map(|factory| Arc::clone(factory.value()))
    }
}

/// Per-call collaborator scope handed to field initializers.
pub struct InjectionScope {
    provider: Arc<ServiceProvider>,
    cache: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl InjectionScope {
    /// Resolve a collaborator, failing if none is registered.
    pub fn resolve<T: Clone + Any + Send + Sync>(&self) -> Result<T> {
        self.try_resolve::<T>()
            .ok_or(Error::UnresolvedCollaborator {
                collaborator: std::any::type_name::<T>(),
            })
    }

    /// Resolve a collaborator if one is registered.
    pub fn try_resolve<T: Clone + Any + Send + Sync>(&self) -> Option<T> {
        let id = TypeId::of::<T>();
        if let Some(value) = self
            .cache
            .lock()
            .get(&id)
            .and_then(|value| value.downcast_ref::<T>())
        {
            return Some(value.clone());
        }

        if let Some(value) = self.provider.singleton::<T>() {
            return Some(value);
        }

        let factory = self.provider.factory::<T>()?;
        let value = factory().downcast::<T>().ok()?;
        let resolved = (*value).clone();
        self.cache.lock().insert(id, value);
        Some(resolved)
    }

    /// Place a value in this scope only, shadowing the provider.
    pub fn set<T: Clone + Any + Send + Sync>(&self, value: T) {
        self.cache.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Number of values created within this scope.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check whether the scope has created any values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for InjectionScope {
    fn drop(&mut self) {
        let scoped = self.cache.get_mut().len();
        if scoped > 0 {
            tracing::trace!(scoped, "disposing injection scope");
        }
    }
}
