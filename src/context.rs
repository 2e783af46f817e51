//! An `EventContext` is everything a link needs to resolve: the store to search and the registry that says which
//! keys to search it for.
//!
//! Contexts are passed explicitly to every constructor that needs one. For call sites where threading a context
//! through is impractical, a process-wide default can be installed with [`set_default_context()`] and picked up by
//! [`ParticleLink::with_default_context`](crate::link::ParticleLink::with_default_context). The default is read once,
//! when the link is constructed; replacing it later does not affect existing links.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::event::EventStore;
use crate::registry::{global_registry, EventCollectionRegistry};

/// The process-wide default context.
static DEFAULT_CONTEXT: LazyLock<RwLock<Option<EventContext>>> = LazyLock::new(RwLock::default);

/// A store handle plus the registry used to search it. Cloning is two reference count increments.
#[derive(Clone)]
pub struct EventContext {
    store: Arc<dyn EventStore>,
    registry: Arc<EventCollectionRegistry>,
}

impl EventContext {
    /// A context over `store` using the global registry.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_registry(store, global_registry())
    }

    #[must_use]
    pub fn with_registry(
        store: Arc<dyn EventStore>,
        registry: Arc<EventCollectionRegistry>,
    ) -> Self {
        Self { store, registry }
    }

    #[must_use]
    pub fn store(&self) -> &dyn EventStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &EventCollectionRegistry {
        &self.registry
    }

    /// Two contexts are the same if they share both the store and the registry.
    #[must_use]
    pub fn same_as(&self, other: &EventContext) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && Arc::ptr_eq(&self.registry, &other.registry)
    }
}

impl Debug for EventContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventContext")
            .field("store_generation", &self.store.generation())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Installs `context` as the process-wide default, replacing any previous default.
pub fn set_default_context(context: EventContext) {
    *DEFAULT_CONTEXT.write().unwrap_or_else(PoisonError::into_inner) = Some(context);
}

/// Removes the process-wide default. Links constructed afterwards with the default context never resolve.
pub fn clear_default_context() {
    *DEFAULT_CONTEXT.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// A copy of the process-wide default context, if one is installed.
#[must_use]
pub fn default_context() -> Option<EventContext> {
    DEFAULT_CONTEXT.read().unwrap_or_else(PoisonError::into_inner).clone()
}
