//! Compact, lazily resolved links to truth particles
//!
//! Reconstructed data products need to say which generated ("truth") particle produced them. A pointer does not
//! survive writing the event out, and storing the full path to the particle in every object is wasteful. Truthlink
//! stores a [`ParticleLink`] instead: the particle's barcode, a locator naming its event, and the kind of event
//! collection the event lives in, 9 bytes in all once persisted. The link is turned back into the particle on demand,
//! by looking the collection up in an event store.
//!
//! The pieces, leaves first:
//! * [`truthlink_barcode`] holds the packed value types: [`CollectionKind`], [`EventLocator`] and
//!   [`ExtendedBarCode`].
//! * [`registry`] maps each collection kind to the store keys its collection may be recorded under, and remembers
//!   which key worked last.
//! * [`event`] defines the event data and the [`EventStore`] trait links resolve against, with an in-memory
//!   implementation.
//! * [`context`] bundles a store and a registry into the [`EventContext`] a link carries, and holds the optional
//!   process-wide default context.
//! * [`link`] implements [`ParticleLink`] and its resolution.
//! * [`persistent`] converts links to and from their persistent form.
//!
//! Links are created once, cheaply, and may then be resolved any number of times, from any thread. Resolution never
//! fails with an error: a link that cannot be resolved yields `None`.
//!
//! ```rust
//! use std::sync::Arc;
//! use truthlink::prelude::*;
//!
//! let store = Arc::new(MemoryEventStore::new());
//! let mut event = GenEvent::new(7);
//! event.add_particle(GenParticle::new(42, 22, 1, [0.0, 0.0, 10.0, 10.0]));
//! store.record("TruthEvent", [event].into_iter().collect());
//!
//! let context = EventContext::new(store);
//! let link = ParticleLink::new(42, EventLocator::Position(0), CollectionKind::Main, &context);
//! assert_eq!(link.cptr().map(|particle| particle.pdg_id), Some(22));
//! // Resolving the position rewrote it as the event number.
//! assert_eq!(link.event_index(), (Some(7), None));
//! ```
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod link;
pub mod log;
pub mod persistent;
pub mod registry;

pub use rustc_hash::FxHashMap as HashMap;
pub use truthlink_barcode;

pub use config::RegistryConfig;
pub use context::{clear_default_context, default_context, set_default_context, EventContext};
pub use error::TruthLinkError;
pub use event::{EventStore, GenEvent, GenParticle, McEventCollection, MemoryEventStore};
pub use link::{ExtendedBarCodeExt, ParticleLink};
pub use persistent::{decode_links, encode_links, ParticleLinkP};
pub use registry::{global_registry, init_global_registry, EventCollectionRegistry};
pub use truthlink_barcode::{Barcode, CollectionKind, EventLocator, ExtendedBarCode, UNDEFINED};

pub mod prelude {
    pub use crate::context::EventContext;
    pub use crate::event::{EventStore, GenEvent, GenParticle, McEventCollection, MemoryEventStore};
    pub use crate::link::{ExtendedBarCodeExt, ParticleLink};
    pub use crate::log::{debug, error, info, trace, warn};
    pub use crate::registry::EventCollectionRegistry;
    pub use truthlink_barcode::{CollectionKind, EventLocator, ExtendedBarCode};
}
