//! Defines the `ExtendedBarCode` type, the persistent part of a link to a truth particle.
//!
//! # Layout
//!
//! | **Field**           | **Bits** | **Meaning**                                                        |
//! |:------------------- | --------:|:------------------------------------------------------------------ |
//! | **barcode**         |       32 | Particle barcode within its event; `0` is the null link            |
//! | **locator word**    |       32 | Packed [`EventLocator`]; see the [`crate::locator`] module          |
//! | **collection kind** |        8 | [`CollectionKind`] code `0..=3`, printed as `'a'..='d'`            |
//!
//! # Promotion
//!
//! A barcode created with a position locator can be promoted, once, to the event number of the event found at that
//! position. This happens while a link is being resolved, and the same link may be resolved from several threads at
//! once. The locator word is therefore an `AtomicU32` and promotion is a single compare-and-swap from the position
//! word to the event-number word. Every caller for a given instance passes the same arguments, so any interleaving
//! of calls leaves the same final word behind. The word is never demoted.
//!
//! # Comparison
//!
//! Equality and ordering compare the raw representation. A barcode addressing an event by position and another
//! addressing the same event by number compare unequal until the first one has been promoted. Callers that need to
//! compare the events themselves must resolve both sides first.
use crate::{
    collection::CollectionKind, locator::EventLocator, Barcode, NULL_BARCODE, UNDEFINED, VALUE_MASK,
};
use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    sync::atomic::{self, AtomicU32},
};

pub struct ExtendedBarCode {
    barcode: Barcode,
    locator: AtomicU32,
    kind: CollectionKind,
}

impl ExtendedBarCode {
    // region Constructors
    #[must_use]
    pub fn new(barcode: Barcode, locator: EventLocator, kind: CollectionKind) -> Self {
        Self {
            barcode,
            locator: AtomicU32::new(locator.encode()),
            kind,
        }
    }

    /// Reassembles an `ExtendedBarCode` from its persisted fields.
    #[must_use]
    pub fn from_raw(barcode: Barcode, locator_word: u32, kind_code: u8) -> Self {
        Self {
            barcode,
            locator: AtomicU32::new(locator_word),
            kind: CollectionKind::decode(kind_code),
        }
    }
    // endregion Constructors

    // region Accessors

    /// Returns the particle barcode. Zero means this is a null link.
    #[inline(always)]
    #[must_use]
    pub fn barcode(&self) -> Barcode {
        self.barcode
    }

    #[inline(always)]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.barcode == NULL_BARCODE
    }

    /// Returns a snapshot of the current locator.
    #[inline(always)]
    #[must_use]
    pub fn locator(&self) -> EventLocator {
        EventLocator::decode(self.locator_word())
    }

    /// Returns a snapshot of the packed locator word.
    #[inline(always)]
    #[must_use]
    pub fn locator_word(&self) -> u32 {
        self.locator.load(atomic::Ordering::Acquire)
    }

    /// Returns `(event_number, position)`. Exactly one of the two is `Some`, according to how the event is currently
    /// addressed. An undefined locator reports the position [`UNDEFINED`].
    #[must_use]
    pub fn event_index(&self) -> (Option<u32>, Option<u32>) {
        match self.locator() {
            EventLocator::EventNumber(number) => (Some(number), None),
            EventLocator::Position(position) => (None, Some(position)),
            EventLocator::Undefined => (None, Some(UNDEFINED)),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn collection_kind(&self) -> CollectionKind {
        self.kind
    }

    #[inline(always)]
    #[must_use]
    pub fn collection_char(&self) -> char {
        self.kind.as_char()
    }

    /// Inverse of [`ExtendedBarCode::collection_char`].
    #[inline(always)]
    #[must_use]
    pub fn from_char(c: char) -> CollectionKind {
        CollectionKind::from_char(c)
    }
    // endregion Accessors

    // region Setters
    pub fn set_barcode(&mut self, barcode: Barcode) {
        self.barcode = barcode;
    }

    pub fn set_locator(&mut self, locator: EventLocator) {
        *self.locator.get_mut() = locator.encode();
    }

    pub fn set_collection_kind(&mut self, kind: CollectionKind) {
        self.kind = kind;
    }
    // endregion Setters

    /// Promotes `Position(from_position)` to `EventNumber(target_index)`. Pass [`UNDEFINED`] as `from_position` to
    /// promote an undefined locator.
    ///
    /// Does nothing if the locator is anything other than `Position(from_position)`, including when it has already
    /// been promoted, or if `target_index` does not fit into 31 bits. Returns `true` only for the call that actually
    /// changed the locator.
    ///
    /// Safe to call concurrently on the same instance, provided every caller passes the same arguments.
    pub fn make_index(&self, target_index: u32, from_position: u32) -> bool {
        // `Position(VALUE_MASK)` packs to `UNDEFINED`, so it must not be taken for an undefined locator.
        if target_index > VALUE_MASK || (from_position >= VALUE_MASK && from_position != UNDEFINED) {
            return false;
        }
        let current = EventLocator::Position(from_position).encode();
        let promoted = EventLocator::EventNumber(target_index).encode();
        self.locator
            .compare_exchange(
                current,
                promoted,
                atomic::Ordering::AcqRel,
                atomic::Ordering::Acquire,
            )
            .is_ok()
    }

    /// The fields compared by `==` and `<`, in order. The locator word sorts event numbers before positions.
    #[inline(always)]
    fn comparison_key(&self) -> (Barcode, u32, CollectionKind) {
        (self.barcode, self.locator_word(), self.kind)
    }
}

impl Default for ExtendedBarCode {
    fn default() -> Self {
        Self::new(
            NULL_BARCODE,
            EventLocator::default(),
            CollectionKind::default(),
        )
    }
}

impl Clone for ExtendedBarCode {
    fn clone(&self) -> Self {
        Self {
            barcode: self.barcode,
            locator: AtomicU32::new(self.locator_word()),
            kind: self.kind,
        }
    }
}

impl PartialEq for ExtendedBarCode {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for ExtendedBarCode {}

impl PartialOrd for ExtendedBarCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExtendedBarCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparison_key().cmp(&other.comparison_key())
    }
}

impl Display for ExtendedBarCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.locator() {
            EventLocator::EventNumber(number) => write!(f, "Event index {}", number)?,
            EventLocator::Position(position) => {
                write!(f, "Event index {} (position in collection)", position)?;
            }
            EventLocator::Undefined => write!(f, "Event index undefined (position in collection)")?,
        }
        write!(
            f,
            ", Barcode {}, McEventCollection {}",
            self.barcode,
            self.collection_char()
        )
    }
}

impl Debug for ExtendedBarCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedBarCode")
            .field("barcode", &self.barcode)
            .field("locator", &self.locator())
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn fields_round_trip() {
        let ebc = ExtendedBarCode::new(
            42,
            EventLocator::Position(3),
            CollectionKind::SecondPileup,
        );
        assert_eq!(ebc.barcode(), 42);
        assert_eq!(ebc.locator(), EventLocator::Position(3));
        assert_eq!(ebc.locator_word(), 0x8000_0003);
        assert_eq!(ebc.collection_kind(), CollectionKind::SecondPileup);
        assert_eq!(ebc.collection_char(), 'c');
        assert_eq!(ExtendedBarCode::from_char('c'), CollectionKind::SecondPileup);

        let raw = ExtendedBarCode::from_raw(42, 0x8000_0003, 2);
        assert_eq!(raw, ebc);
    }

    #[test]
    fn default_is_null() {
        let ebc = ExtendedBarCode::default();
        assert!(ebc.is_null());
        assert_eq!(ebc.event_index(), (Some(0), None));
        assert_eq!(ebc.collection_kind(), CollectionKind::Main);
    }

    #[test]
    fn event_index_has_exactly_one_side() {
        let locators = [
            EventLocator::EventNumber(0),
            EventLocator::EventNumber(12),
            EventLocator::Position(0),
            EventLocator::Position(5),
            EventLocator::Undefined,
        ];
        for locator in locators {
            let ebc = ExtendedBarCode::new(1, locator, CollectionKind::Main);
            let (index, position) = ebc.event_index();
            assert!(index.is_some() ^ position.is_some(), "{locator:?}");
            assert_eq!(index.is_some(), locator.is_event_number());
        }

        let undefined = ExtendedBarCode::new(1, EventLocator::Undefined, CollectionKind::Main);
        assert_eq!(undefined.event_index(), (None, Some(UNDEFINED)));
    }

    #[test]
    fn make_index_promotes_matching_position() {
        let ebc = ExtendedBarCode::new(42, EventLocator::Position(0), CollectionKind::Main);
        assert!(ebc.make_index(7, 0));
        assert_eq!(ebc.locator(), EventLocator::EventNumber(7));
        assert_eq!(ebc.event_index(), (Some(7), None));

        // Repeating the call is a no-op.
        assert!(!ebc.make_index(7, 0));
        assert_eq!(ebc.locator(), EventLocator::EventNumber(7));
    }

    #[test]
    fn make_index_ignores_other_positions() {
        let ebc = ExtendedBarCode::new(42, EventLocator::Position(1), CollectionKind::Main);
        assert!(!ebc.make_index(7, 0));
        assert_eq!(ebc.locator(), EventLocator::Position(1));

        let numbered = ExtendedBarCode::new(42, EventLocator::EventNumber(9), CollectionKind::Main);
        assert!(!numbered.make_index(7, 9));
        assert_eq!(numbered.locator(), EventLocator::EventNumber(9));
    }

    #[test]
    fn make_index_promotes_undefined() {
        let ebc = ExtendedBarCode::new(42, EventLocator::Undefined, CollectionKind::Main);
        assert!(!ebc.make_index(7, 0));
        assert!(ebc.make_index(7, UNDEFINED));
        assert_eq!(ebc.locator(), EventLocator::EventNumber(7));
    }

    #[test]
    fn make_index_rejects_unrepresentable_arguments() {
        let ebc = ExtendedBarCode::new(42, EventLocator::Undefined, CollectionKind::Main);
        assert!(!ebc.make_index(0x8000_0000, UNDEFINED));
        assert!(!ebc.make_index(7, 0x8000_0001));
        assert_eq!(ebc.locator(), EventLocator::Undefined);
    }

    #[test]
    fn make_index_largest_position_is_not_undefined() {
        let ebc = ExtendedBarCode::new(42, EventLocator::Undefined, CollectionKind::Main);
        assert!(!ebc.make_index(7, VALUE_MASK));
        assert_eq!(ebc.locator(), EventLocator::Undefined);
        assert_eq!(ebc.locator_word(), UNDEFINED);
    }

    // Every thread promotes the same instance with the same arguments. Exactly one of them wins the
    // compare-and-swap and the final state does not depend on the interleaving.
    #[test]
    fn make_index_concurrent() {
        const NUM_THREADS: usize = 64;
        let ebc = Arc::new(ExtendedBarCode::new(
            42,
            EventLocator::Position(2),
            CollectionKind::FirstPileup,
        ));
        let barrier = Arc::new(Barrier::new(NUM_THREADS));

        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                let ebc_clone = Arc::clone(&ebc);
                let barrier_clone = Arc::clone(&barrier);

                thread::spawn(move || {
                    barrier_clone.wait();
                    // Several calls per thread; all but the first effective one are no-ops.
                    (0..4).filter(|_| ebc_clone.make_index(12, 2)).count()
                })
            })
            .collect();

        let wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(wins, 1);
        assert_eq!(ebc.locator(), EventLocator::EventNumber(12));
        assert_eq!(ebc.barcode(), 42);
        assert_eq!(ebc.collection_kind(), CollectionKind::FirstPileup);
    }

    #[test]
    fn comparison_is_representation_sensitive() {
        let by_position = ExtendedBarCode::new(42, EventLocator::Position(2), CollectionKind::Main);
        let by_number = ExtendedBarCode::new(42, EventLocator::EventNumber(12), CollectionKind::Main);
        assert_ne!(by_position, by_number);
        // Event numbers sort before positions for the same barcode.
        assert!(by_number < by_position);

        by_position.make_index(12, 2);
        assert_eq!(by_position, by_number);
    }

    #[test]
    fn ordering_uses_barcode_first() {
        let a = ExtendedBarCode::new(1, EventLocator::Position(9), CollectionKind::ThirdPileup);
        let b = ExtendedBarCode::new(2, EventLocator::EventNumber(0), CollectionKind::Main);
        assert_eq!(a.cmp(&b), Ordering::Less);

        let main = ExtendedBarCode::new(1, EventLocator::EventNumber(3), CollectionKind::Main);
        let pileup = ExtendedBarCode::new(1, EventLocator::EventNumber(3), CollectionKind::FirstPileup);
        assert!(main < pileup);
    }

    #[test]
    fn clone_takes_a_snapshot() {
        let original = ExtendedBarCode::new(5, EventLocator::Position(0), CollectionKind::Main);
        let copy = original.clone();
        original.make_index(3, 0);
        assert_eq!(copy.locator(), EventLocator::Position(0));
        assert_eq!(original.locator(), EventLocator::EventNumber(3));
    }

    #[test]
    fn test_display() {
        let numbered = ExtendedBarCode::new(42, EventLocator::EventNumber(7), CollectionKind::Main);
        assert_eq!(
            numbered.to_string(),
            "Event index 7, Barcode 42, McEventCollection a"
        );
        let positioned =
            ExtendedBarCode::new(42, EventLocator::Position(2), CollectionKind::FirstPileup);
        assert_eq!(
            positioned.to_string(),
            "Event index 2 (position in collection), Barcode 42, McEventCollection b"
        );
    }
}
