/*!

A [`ParticleLink`] refers to a truth particle without holding a pointer to it. It stores an [`ExtendedBarCode`]
(barcode, event locator, collection kind), which survives persistence, plus an [`EventContext`] and a memoized
reference, which do not.

# Resolution

[`ParticleLink::cptr`] turns the link back into a particle:

1. A null link (barcode `0`) resolves to `None` without touching the store.
2. A particle memoized for the store's current generation is returned as is.
3. The registry looks the collection up under each candidate key of the link's kind, starting at its hint.
4. The event is located in the collection: directly for a position (an undefined locator means the first event),
   by scanning for the event number otherwise (event number `0` means the first event). When a position resolves,
   the link's locator is promoted to the event number found there, so that later comparisons see the same
   representation as links created with that event number.
5. The particle is looked up by barcode in that event.
6. The result is memoized.

Every step that finds nothing ends resolution with `None`. Nothing here returns an error: whether an unresolved link
matters is for the caller to decide.

The locator promotion and the registry hint are the only side effects. Both are idempotent and lock-free, so the same
link may be resolved from several threads at once.

*/

use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use truthlink_barcode::{Barcode, CollectionKind, EventLocator, ExtendedBarCode, UNDEFINED};

use crate::context::{default_context, EventContext};
use crate::event::{GenEvent, GenParticle, McEventCollection};
use crate::log::{debug, trace};
use crate::registry::global_registry;

/// A particle resolved at a given store generation.
#[derive(Clone)]
struct Memo {
    generation: u64,
    particle: Arc<GenParticle>,
}

pub struct ParticleLink {
    barcode: ExtendedBarCode,
    context: Option<EventContext>,
    memo: Mutex<Option<Memo>>,
}

impl ParticleLink {
    // region Constructors
    #[must_use]
    pub fn new(
        barcode: Barcode,
        locator: EventLocator,
        kind: CollectionKind,
        context: &EventContext,
    ) -> Self {
        Self::from_extended_barcode(ExtendedBarCode::new(barcode, locator, kind), context)
    }

    /// Like [`ParticleLink::new`], naming the collection by one of its store keys. Names the registry does not know
    /// give a link of kind `Undefined`, which never resolves.
    #[must_use]
    pub fn with_collection_name(
        barcode: Barcode,
        locator: EventLocator,
        collection_name: &str,
        context: &EventContext,
    ) -> Self {
        let kind = context.registry().kind_for_key(collection_name);
        Self::new(barcode, locator, kind, context)
    }

    /// Links to a particle already in hand. The particle is memoized right away and, if `locator` is a position, the
    /// locator is promoted to the particle's event number immediately rather than on first resolution.
    ///
    /// Promotion follows the same rule as resolution: if the collection is in the store, the event at the position
    /// must carry the particle's event number and that number must find it again. If the collection is not in the
    /// store, any event number but `0` is taken as is.
    #[must_use]
    pub fn from_particle(
        particle: Arc<GenParticle>,
        locator: EventLocator,
        kind: CollectionKind,
        context: &EventContext,
    ) -> Self {
        let link = Self::new(particle.barcode, locator, kind, context);
        if link.barcode.is_null() {
            return link;
        }
        if let Some(event_number) = particle.event_number {
            link.promote_eagerly(event_number, context);
        }
        *link.memo_guard() = Some(Memo {
            generation: context.store().generation(),
            particle,
        });
        link
    }

    #[must_use]
    pub fn from_extended_barcode(barcode: ExtendedBarCode, context: &EventContext) -> Self {
        Self {
            barcode,
            context: Some(context.clone()),
            memo: Mutex::new(None),
        }
    }

    /// Like [`ParticleLink::new`], using the process-wide default context. Without a default context the link
    /// never resolves.
    #[must_use]
    pub fn with_default_context(
        barcode: Barcode,
        locator: EventLocator,
        kind: CollectionKind,
    ) -> Self {
        Self {
            barcode: ExtendedBarCode::new(barcode, locator, kind),
            context: default_context(),
            memo: Mutex::new(None),
        }
    }

    /// Like [`ParticleLink::with_collection_name`], using the process-wide default context. Without a default
    /// context the name is looked up in the global registry and the link never resolves.
    #[must_use]
    pub fn with_default_context_and_name(
        barcode: Barcode,
        locator: EventLocator,
        collection_name: &str,
    ) -> Self {
        let context = default_context();
        let kind = match &context {
            Some(context) => context.registry().kind_for_key(collection_name),
            None => global_registry().kind_for_key(collection_name),
        };
        Self {
            barcode: ExtendedBarCode::new(barcode, locator, kind),
            context,
            memo: Mutex::new(None),
        }
    }
    // endregion Constructors

    fn promote_eagerly(&self, event_number: u32, context: &EventContext) {
        let (position, from_position) = match self.barcode.locator() {
            EventLocator::Position(position) => (position as usize, position),
            EventLocator::Undefined => (0, UNDEFINED),
            EventLocator::EventNumber(_) => return,
        };
        let kind = self.collection_kind();
        match context.registry().find_collection(kind, context.store()) {
            Some(collection) => {
                if collection.get(position).map(GenEvent::event_number) == Some(event_number) {
                    promote_if_unambiguous(&self.barcode, &collection, position, from_position);
                }
            }
            None => {
                if event_number != 0 {
                    self.barcode.make_index(event_number, from_position);
                }
            }
        }
    }

    // region Accessors
    #[must_use]
    pub fn barcode(&self) -> Barcode {
        self.barcode.barcode()
    }

    /// See [`ExtendedBarCode::event_index`].
    #[must_use]
    pub fn event_index(&self) -> (Option<u32>, Option<u32>) {
        self.barcode.event_index()
    }

    #[must_use]
    pub fn collection_kind(&self) -> CollectionKind {
        self.barcode.collection_kind()
    }

    #[must_use]
    pub fn collection_char(&self) -> char {
        self.barcode.collection_char()
    }

    #[must_use]
    pub fn extended_barcode(&self) -> &ExtendedBarCode {
        &self.barcode
    }

    #[must_use]
    pub fn context(&self) -> Option<&EventContext> {
        self.context.as_ref()
    }

    /// Points the link at another store, dropping whatever was memoized for the old one.
    pub fn set_context(&mut self, context: EventContext) {
        self.context = Some(context);
        *self.memo.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }
    // endregion Accessors

    /// Resolves the link to its particle. See the [module documentation](self) for the steps.
    pub fn cptr(&self) -> Option<Arc<GenParticle>> {
        if self.barcode.is_null() {
            return None;
        }
        let context = self.context.as_ref()?;
        let generation = context.store().generation();

        if let Some(memo) = self.memo_guard().as_ref() {
            if memo.generation == generation {
                return Some(Arc::clone(&memo.particle));
            }
        }

        let particle = locate_event(&self.barcode, context)
            .and_then(|(collection, position)| collection.get(position)?.particle(self.barcode()));
        match &particle {
            Some(particle) => {
                *self.memo_guard() = Some(Memo {
                    generation,
                    particle: Arc::clone(particle),
                });
            }
            None => debug!("unresolved particle link ({})", self.barcode),
        }
        particle
    }

    /// `true` if the link resolves to a particle.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cptr().is_some()
    }

    /// The number of the event the link points into. A position locator is resolved (and promoted) through the
    /// store; an event-number locator is returned as stored unless it is `0`, which is resolved to the first event's
    /// number when possible. Null links never consult the store.
    #[must_use]
    pub fn event_number(&self) -> Option<u32> {
        match (self.barcode.is_null(), self.context.as_ref()) {
            (false, Some(context)) => self.barcode.resolve_event_number(context),
            _ => match self.barcode.locator() {
                EventLocator::EventNumber(number) => Some(number),
                _ => None,
            },
        }
    }

    /// The position in its collection of the event the link points into.
    #[must_use]
    pub fn position_in_collection(&self) -> Option<usize> {
        if self.barcode.is_null() {
            return None;
        }
        let context = self.context.as_ref()?;
        locate_event(&self.barcode, context).map(|(_, position)| position)
    }

    /// Packs the barcode and the event index into one `u32`: the low 16 bits of the event index in the upper half,
    /// the low 16 bits of the barcode in the lower half. The event index is the resolved event number if there is
    /// one, otherwise the stored locator value. Stable within a process; meant as a grouping key, not an identifier.
    #[must_use]
    pub fn compress(&self) -> u32 {
        let index = self
            .event_number()
            .or_else(|| self.barcode.locator().value())
            .unwrap_or(0);
        ((index & 0xFFFF) << 16) | (self.barcode() & 0xFFFF)
    }

    fn memo_guard(&self) -> std::sync::MutexGuard<'_, Option<Memo>> {
        // A panic while holding the lock can only leave a stale or empty memo behind, both of which are valid.
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Finds the collection for `barcode`'s kind and the position of its event within it, promoting a position locator
/// to the event number found there.
fn locate_event(
    barcode: &ExtendedBarCode,
    context: &EventContext,
) -> Option<(Arc<McEventCollection>, usize)> {
    let kind = barcode.collection_kind();
    let collection = context.registry().find_collection(kind, context.store())?;

    let (position, from_position) = match barcode.locator() {
        EventLocator::EventNumber(number) => {
            let position = collection.position_of_event_number(number)?;
            return Some((collection, position));
        }
        EventLocator::Position(position) => (position as usize, position),
        EventLocator::Undefined => (0, UNDEFINED),
    };

    collection.get(position)?;
    promote_if_unambiguous(barcode, &collection, position, from_position);
    Some((collection, position))
}

/// Promotes `barcode`'s locator from `from_position` to the number of the event at `position`, unless that number
/// would address a different event: an event numbered 0 past the front of the collection, or a number shared with an
/// earlier event. Returns `true` if the locator changed.
fn promote_if_unambiguous(
    barcode: &ExtendedBarCode,
    collection: &McEventCollection,
    position: usize,
    from_position: u32,
) -> bool {
    let Some(event_number) = collection.get(position).map(GenEvent::event_number) else {
        return false;
    };
    let promoted = collection.position_of_event_number(event_number) == Some(position)
        && barcode.make_index(event_number, from_position);
    if promoted {
        trace!(
            "promoted position {} to event number {} in {} collection",
            position,
            event_number,
            barcode.collection_kind()
        );
    }
    promoted
}

/// Store-aware operations on [`ExtendedBarCode`].
pub trait ExtendedBarCodeExt {
    /// The number of the event addressed, resolved through `context` where the locator alone does not say (a
    /// position, an undefined locator, or event number `0`). Resolving a position promotes it.
    fn resolve_event_number(&self, context: &EventContext) -> Option<u32>;

    /// Compares the events two barcodes address rather than their representation: both sides are normalized to event
    /// numbers through `context` first. A side that cannot be resolved is compared by its stored locator value, with
    /// an undefined locator sorting last.
    fn compare_index(lhs: &Self, rhs: &Self, context: &EventContext) -> Ordering;
}

impl ExtendedBarCodeExt for ExtendedBarCode {
    fn resolve_event_number(&self, context: &EventContext) -> Option<u32> {
        let locator = self.locator();
        if let EventLocator::EventNumber(number) = locator {
            if number != 0 {
                return Some(number);
            }
        }
        match locate_event(self, context) {
            Some((collection, position)) => collection.get(position).map(GenEvent::event_number),
            None => match locator {
                EventLocator::EventNumber(number) => Some(number),
                _ => None,
            },
        }
    }

    fn compare_index(lhs: &Self, rhs: &Self, context: &EventContext) -> Ordering {
        let normalized = |barcode: &ExtendedBarCode| {
            barcode
                .resolve_event_number(context)
                .or_else(|| barcode.locator().value())
                .unwrap_or(UNDEFINED)
        };
        normalized(lhs).cmp(&normalized(rhs))
    }
}

impl Default for ParticleLink {
    /// A null link with no context.
    fn default() -> Self {
        Self {
            barcode: ExtendedBarCode::default(),
            context: None,
            memo: Mutex::new(None),
        }
    }
}

impl Clone for ParticleLink {
    fn clone(&self) -> Self {
        Self {
            barcode: self.barcode.clone(),
            context: self.context.clone(),
            memo: Mutex::new(self.memo_guard().clone()),
        }
    }
}

// Comparisons see only the persistent part, with the same representation caveat as `ExtendedBarCode`.
impl PartialEq for ParticleLink {
    fn eq(&self, other: &Self) -> bool {
        self.barcode == other.barcode
    }
}

impl Eq for ParticleLink {}

impl PartialOrd for ParticleLink {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParticleLink {
    fn cmp(&self, other: &Self) -> Ordering {
        self.barcode.cmp(&other.barcode)
    }
}

impl Display for ParticleLink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.barcode, f)
    }
}

impl Debug for ParticleLink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleLink")
            .field("barcode", &self.barcode)
            .field("has_context", &self.context.is_some())
            .field("memoized", &self.memo_guard().is_some())
            .finish()
    }
}
