//! Interface type to factory registry.
//!
//! Generated clients submit a [`Registration`] at link time; the first call
//! to [`Registry::global`] collects them. Callers can also keep their own
//! [`Registry`] and attach it to a [`Ferrule`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::Ferrule;

type Factory = Arc<dyn Fn(Ferrule) -> Box<dyn Any + Send> + Send + Sync>;

struct Entry {
    name: &'static str,
    factory: Factory,
}

/// Link-time registration emitted by `#[ferrule]`.
///
/// `factory` returns a `Box<Box<dyn Interface>>` erased to `Any`.
#[derive(Debug)]
pub struct Registration {
    /// `TypeId` of `dyn Interface`.
    pub interface: fn() -> TypeId,
    /// Interface type name.
    pub name: &'static str,
    /// Builds the implementation.
    pub factory: fn(Ferrule) -> Box<dyn Any + Send>,
}

inventory::collect!(Registration);

/// `TypeId` of `I`, usable as a function pointer in a [`Registration`].
#[must_use]
pub fn type_id_of<I: ?Sized + 'static>() -> TypeId {
    TypeId::of::<I>()
}

/// Thread-safe mapping from interface type to factory.
///
/// Registering an interface twice keeps the last factory.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("interfaces", &self.names())
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, seeded once from link-time registrations.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let registry = Self::new();
            for registration in inventory::iter::<Registration> {
                let factory = registration.factory;
                registry.insert(
                    (registration.interface)(),
                    registration.name,
                    Arc::new(factory),
                );
            }
            tracing::debug!(interfaces = registry.len(), "global registry seeded");
            registry
        })
    }

    /// Register a factory for `I`, replacing any previous one.
    pub fn register<I, F>(&self, factory: F)
    where
        I: ?Sized + Send + 'static,
        F: Fn(Ferrule) -> Box<I> + Send + Sync + 'static,
    {
        self.insert(
            TypeId::of::<I>(),
            std::any::type_name::<I>(),
            Arc::new(move |ferrule| Box::new(factory(ferrule)) as Box<dyn Any + Send>),
        );
    }

    fn insert(&self, key: TypeId, name: &'static str, factory: Factory) {
        let previous = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Entry { name, factory });
        if previous.is_some() {
            tracing::debug!(interface = name, "registration replaced");
        }
    }

    /// Build an implementation of `I`, `None` when nothing is registered.
    #[must_use]
    pub fn create<I: ?Sized + 'static>(&self, ferrule: &Ferrule) -> Option<Box<I>> {
        let factory = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<I>())
            .map(|entry| Arc::clone(&entry.factory))?;

        factory(ferrule.clone())
            .downcast::<Box<I>>()
            .ok()
            .map(|boxed| *boxed)
    }

    /// Whether a factory for `I` exists.
    #[must_use]
    pub fn contains<I: ?Sized + 'static>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<I>())
    }

    /// Number of registered interfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered interface names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| entry.name)
            .collect();
        names.sort_unstable();
        names
    }
}
