use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

///
/// ServiceCollection
///
/// Type-keyed service map handed to `ServiceRegistrar` hooks. One instance
/// per type; a later insert replaces the earlier one.
///

#[derive(Default)]
pub struct ServiceCollection {
    services: HashMap<TypeId, (&'static str, Arc<dyn Any + Send + Sync>)>,
}

impl ServiceCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, returning the instance it replaced (if any).
    pub fn insert<T: Any + Send + Sync>(&mut self, service: T) -> Option<Arc<T>> {
        self.services
            .insert(TypeId::of::<T>(), (type_name::<T>(), Arc::new(service)))
            .and_then(|(_, prev)| prev.downcast::<T>().ok())
    }

    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|(_, service)| Arc::clone(service).downcast::<T>().ok())
    }

    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Registered service type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.values().map(|(name, _)| *name).collect();
        names.sort_unstable();

        names
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}
