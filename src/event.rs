/*!

The event data a [`ParticleLink`](crate::link::ParticleLink) resolves against, and the store that holds it.

A store maps string keys (e.g. `"TruthEvent"`) to [`McEventCollection`]s. A collection is an ordered sequence of
[`GenEvent`]s, and each event owns the [`GenParticle`]s generated in it, indexed by barcode.

The store is the only seam links see: anything implementing [`EventStore`] can back them. [`MemoryEventStore`] is the
in-process implementation, suitable both for tests and for frameworks that keep the current event in memory.

*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use truthlink_barcode::Barcode;

use crate::HashMap;

/// A generated particle. `event_number` is the number of the event the particle was added to, `None` until it is
/// added to one.
#[derive(Clone, Debug, PartialEq)]
pub struct GenParticle {
    pub barcode: Barcode,
    pub pdg_id: i32,
    pub status: i32,
    /// `(px, py, pz, e)`
    pub momentum: [f64; 4],
    pub event_number: Option<u32>,
}

impl GenParticle {
    #[must_use]
    pub fn new(barcode: Barcode, pdg_id: i32, status: i32, momentum: [f64; 4]) -> Self {
        Self {
            barcode,
            pdg_id,
            status,
            momentum,
            event_number: None,
        }
    }
}

/// A single generated event. Particles are shared out as `Arc`s so that resolved links can hold on to them without
/// borrowing the store.
#[derive(Clone, Debug, Default)]
pub struct GenEvent {
    event_number: u32,
    particles: Vec<Arc<GenParticle>>,
    /// Maps a barcode to its index in `particles`.
    by_barcode: HashMap<Barcode, usize>,
}

impl GenEvent {
    #[must_use]
    pub fn new(event_number: u32) -> Self {
        Self {
            event_number,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn event_number(&self) -> u32 {
        self.event_number
    }

    /// Adds a particle to the event, stamping it with this event's number, and returns the shared particle. A
    /// particle with the same barcode as an earlier one replaces it in barcode lookups.
    pub fn add_particle(&mut self, mut particle: GenParticle) -> Arc<GenParticle> {
        particle.event_number = Some(self.event_number);
        let particle = Arc::new(particle);
        self.by_barcode.insert(particle.barcode, self.particles.len());
        self.particles.push(Arc::clone(&particle));
        particle
    }

    #[must_use]
    pub fn particle(&self, barcode: Barcode) -> Option<Arc<GenParticle>> {
        self.by_barcode
            .get(&barcode)
            .map(|&index| Arc::clone(&self.particles[index]))
    }

    pub fn particles(&self) -> impl Iterator<Item = &Arc<GenParticle>> {
        self.particles.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// An ordered sequence of events, e.g. the signal event followed by the events overlaid on it.
#[derive(Clone, Debug, Default)]
pub struct McEventCollection {
    events: Vec<GenEvent>,
}

impl McEventCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GenEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&GenEvent> {
        self.events.get(position)
    }

    #[must_use]
    pub fn first(&self) -> Option<&GenEvent> {
        self.events.first()
    }

    /// Finds the first event numbered `event_number`. Event number zero always means the first event.
    #[must_use]
    pub fn find_event_number(&self, event_number: u32) -> Option<&GenEvent> {
        self.position_of_event_number(event_number)
            .map(|position| &self.events[position])
    }

    /// The position of the event [`McEventCollection::find_event_number`] would return.
    #[must_use]
    pub fn position_of_event_number(&self, event_number: u32) -> Option<usize> {
        if event_number == 0 {
            return (!self.events.is_empty()).then_some(0);
        }
        self.events
            .iter()
            .position(|event| event.event_number == event_number)
    }

    pub fn iter(&self) -> std::slice::Iter<GenEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<GenEvent> for McEventCollection {
    fn from_iter<I: IntoIterator<Item = GenEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Retrieves event collections by key. Lookups are synchronous and bounded.
pub trait EventStore: Send + Sync {
    fn find_collection(&self, key: &str) -> Option<Arc<McEventCollection>>;

    /// Changes whenever the contents of the store change. Links drop what they have memoized when it does.
    fn generation(&self) -> u64 {
        0
    }
}

/// An in-memory [`EventStore`]. Recording or removing a collection moves the store to a new generation.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    collections: RwLock<HashMap<String, Arc<McEventCollection>>>,
    generation: AtomicU64,
}

impl MemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `collection` under `key`, replacing any collection already there.
    pub fn record(&self, key: &str, collection: McEventCollection) -> Arc<McEventCollection> {
        let collection = Arc::new(collection);
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Arc::clone(&collection));
        self.generation.fetch_add(1, Ordering::AcqRel);
        collection
    }

    pub fn remove(&self, key: &str) -> Option<Arc<McEventCollection>> {
        let removed = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    /// Empties the store, e.g. between events.
    pub fn clear(&self) {
        self.collections.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl EventStore for MemoryEventStore {
    fn find_collection(&self, key: &str) -> Option<Arc<McEventCollection>> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
