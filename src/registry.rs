/*!

The `EventCollectionRegistry` knows, for each [`CollectionKind`], which store keys the collection of that kind may be
recorded under, and remembers which of them last worked.

The candidate keys are fixed when the registry is built and never change afterwards. The "last successful key" hint
is the only mutable state. It is a single `AtomicUsize` per kind, read and written with `Relaxed` ordering by every
thread resolving a link of that kind. The hint is advisory: a stale or wrong hint only makes the next lookup scan
more keys before it finds the collection, it never changes which collection is found first for a given store, so no
stronger synchronization is needed.

A process normally has a single registry, built from configuration at startup with [`init_global_registry()`] (or
from the built-in keys on first use of [`global_registry()`]), and frozen from then on.

*/

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use truthlink_barcode::CollectionKind;

use crate::config::RegistryConfig;
use crate::error::TruthLinkError;
use crate::event::{EventStore, McEventCollection};
use crate::log::trace;
use crate::HashMap;

/// The process-wide registry, created exactly once on first read or by `init_global_registry()`.
static GLOBAL_REGISTRY: OnceLock<Arc<EventCollectionRegistry>> = OnceLock::new();

#[derive(Debug)]
pub struct EventCollectionRegistry {
    /// Candidate keys per defined kind, in the order they are tried.
    keys: [Box<[String]>; CollectionKind::COUNT],
    /// Index into `keys` of the key that last resolved, per defined kind.
    hints: [AtomicUsize; CollectionKind::COUNT],
    /// Reverse lookup from a key to the kind it is configured for.
    kinds_by_key: HashMap<String, CollectionKind>,
}

impl Default for EventCollectionRegistry {
    /// A registry over the built-in keys.
    fn default() -> Self {
        Self::build(&RegistryConfig::default())
    }
}

impl EventCollectionRegistry {
    /// Builds a registry from a validated copy of `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, TruthLinkError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &RegistryConfig) -> Self {
        let keys: [Box<[String]>; CollectionKind::COUNT] = std::array::from_fn(|slot| {
            config
                .keys_for(CollectionKind::ALL[slot])
                .to_vec()
                .into_boxed_slice()
        });
        let mut kinds_by_key = HashMap::default();
        for kind in CollectionKind::ALL {
            for key in config.keys_for(kind) {
                kinds_by_key.entry(key.clone()).or_insert(kind);
            }
        }
        Self {
            keys,
            hints: std::array::from_fn(|_| AtomicUsize::new(0)),
            kinds_by_key,
        }
    }

    /// The ordered candidate keys for `kind`. Empty for `Undefined`.
    #[must_use]
    pub fn candidate_keys(&self, kind: CollectionKind) -> &[String] {
        match kind.slot() {
            Some(slot) => &self.keys[slot],
            None => &[],
        }
    }

    /// The index of the candidate key that resolved most recently for `kind`.
    #[must_use]
    pub fn hint(&self, kind: CollectionKind) -> usize {
        kind.slot()
            .map_or(0, |slot| self.hints[slot].load(Ordering::Relaxed))
    }

    /// Overwrites the hint for `kind`. Out of range values are harmless; lookups then start at the first key.
    pub fn set_hint(&self, kind: CollectionKind, index: usize) {
        if let Some(slot) = kind.slot() {
            self.hints[slot].store(index, Ordering::Relaxed);
        }
    }

    /// The kind a collection key is configured for, or `Undefined` for keys the registry does not know.
    #[must_use]
    pub fn kind_for_key(&self, key: &str) -> CollectionKind {
        self.kinds_by_key
            .get(key)
            .copied()
            .unwrap_or(CollectionKind::Undefined)
    }

    /// The candidate key the hint for `kind` currently points at.
    #[must_use]
    pub fn last_collection_name(&self, kind: CollectionKind) -> Option<&str> {
        self.candidate_keys(kind)
            .get(self.hint(kind))
            .map(String::as_str)
    }

    /// Looks up the collection for `kind` in `store`. Tries the hinted key first, then the remaining candidates in
    /// order, wrapping around. The first key that resolves becomes the new hint. Performs at most one store lookup
    /// per candidate key.
    pub fn find_collection(
        &self,
        kind: CollectionKind,
        store: &dyn EventStore,
    ) -> Option<Arc<McEventCollection>> {
        let slot = kind.slot()?;
        let keys = &self.keys[slot];
        if keys.is_empty() {
            return None;
        }

        let hint = self.hints[slot].load(Ordering::Relaxed);
        let start = if hint < keys.len() { hint } else { 0 };
        for offset in 0..keys.len() {
            let index = (start + offset) % keys.len();
            if let Some(collection) = store.find_collection(&keys[index]) {
                if index != hint {
                    trace!(
                        "{} collection found under {:?}; moving hint from {} to {}",
                        kind,
                        keys[index],
                        hint,
                        index
                    );
                    self.hints[slot].store(index, Ordering::Relaxed);
                }
                return Some(collection);
            }
        }
        None
    }
}

/// Installs the process-wide registry. Fails if it has already been installed, or already been read (which installs
/// the built-in configuration).
pub fn init_global_registry(config: &RegistryConfig) -> Result<(), TruthLinkError> {
    let registry = Arc::new(EventCollectionRegistry::from_config(config)?);
    GLOBAL_REGISTRY.set(registry).map_err(|_| {
        TruthLinkError::RegistryError(
            "the global collection registry was initialized before `init_global_registry()` was called"
                .to_string(),
        )
    })
}

/// The process-wide registry. Built from the built-in keys if `init_global_registry()` has not been called.
#[must_use]
pub fn global_registry() -> Arc<EventCollectionRegistry> {
    Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(EventCollectionRegistry::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GenEvent, MemoryEventStore};
    use std::sync::Barrier;
    use std::thread;

    fn collection() -> McEventCollection {
        [GenEvent::new(1)].into_iter().collect()
    }

    #[test]
    fn candidate_keys_follow_config() {
        let registry = EventCollectionRegistry::default();
        assert_eq!(registry.candidate_keys(CollectionKind::Main).len(), 5);
        assert_eq!(
            registry.candidate_keys(CollectionKind::SecondPileup),
            ["TruthEvent_HighPtPU".to_string()]
        );
        assert!(registry.candidate_keys(CollectionKind::Undefined).is_empty());
    }

    #[test]
    fn maps_keys_to_kinds() {
        let registry = EventCollectionRegistry::default();
        assert_eq!(registry.kind_for_key("G4Truth"), CollectionKind::Main);
        assert_eq!(registry.kind_for_key("TruthEvent_PU"), CollectionKind::FirstPileup);
        assert_eq!(registry.kind_for_key("TruthEvent_Cavern"), CollectionKind::ThirdPileup);
        assert_eq!(registry.kind_for_key("NoSuchKey"), CollectionKind::Undefined);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RegistryConfig {
            main: vec![],
            ..RegistryConfig::default()
        };
        assert!(EventCollectionRegistry::from_config(&config).is_err());
    }

    #[test]
    fn hint_starts_at_hinted_key() {
        let registry = EventCollectionRegistry::default();
        let store = MemoryEventStore::new();
        store.record("TruthEvent", collection());
        store.record("GEN_EVENT", collection());

        registry.set_hint(CollectionKind::Main, 3);
        assert!(registry.find_collection(CollectionKind::Main, &store).is_some());
        // Both keys exist; the hinted one wins and the hint is left alone.
        assert_eq!(registry.hint(CollectionKind::Main), 3);
        assert_eq!(registry.last_collection_name(CollectionKind::Main), Some("GEN_EVENT"));
    }

    #[test]
    fn wraps_around_and_corrects_hint() {
        let registry = EventCollectionRegistry::default();
        let store = MemoryEventStore::new();
        store.record("G4Truth", collection());

        registry.set_hint(CollectionKind::Main, 2);
        assert!(registry.find_collection(CollectionKind::Main, &store).is_some());
        assert_eq!(registry.hint(CollectionKind::Main), 1);
        assert_eq!(registry.last_collection_name(CollectionKind::Main), Some("G4Truth"));
    }

    #[test]
    fn out_of_range_hint_is_harmless() {
        let registry = EventCollectionRegistry::default();
        let store = MemoryEventStore::new();
        store.record("Bkg_TruthEvent", collection());

        registry.set_hint(CollectionKind::Main, 99);
        assert!(registry.find_collection(CollectionKind::Main, &store).is_some());
        assert_eq!(registry.hint(CollectionKind::Main), 4);
    }

    #[test]
    fn missing_collection_leaves_hint() {
        let registry = EventCollectionRegistry::default();
        let store = MemoryEventStore::new();
        store.record("TruthEvent", collection());

        registry.set_hint(CollectionKind::FirstPileup, 0);
        assert!(registry
            .find_collection(CollectionKind::FirstPileup, &store)
            .is_none());
        assert!(registry
            .find_collection(CollectionKind::Undefined, &store)
            .is_none());
        assert_eq!(registry.hint(CollectionKind::FirstPileup), 0);
    }

    // Many threads start from a wrong hint at once. Every lookup must succeed and the hint must end up on the only
    // key that exists, whatever the interleaving of the racing stores.
    #[test]
    fn concurrent_lookups_converge() {
        const NUM_THREADS: usize = 32;
        let registry = Arc::new(EventCollectionRegistry::default());
        let store = Arc::new(MemoryEventStore::new());
        store.record("GEN_AOD", collection());
        registry.set_hint(CollectionKind::Main, 0);
        let barrier = Arc::new(Barrier::new(NUM_THREADS));

        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry
                        .find_collection(CollectionKind::Main, store.as_ref())
                        .is_some()
                })
            })
            .collect();

        assert!(handles.into_iter().all(|h| h.join().unwrap()));
        assert_eq!(registry.hint(CollectionKind::Main), 2);
    }

    #[test]
    fn global_registry_is_frozen_after_first_read() {
        let registry = global_registry();
        assert!(Arc::ptr_eq(&registry, &global_registry()));
        let result = init_global_registry(&RegistryConfig::default());
        assert!(matches!(result, Err(TruthLinkError::RegistryError(_))));
    }
}
