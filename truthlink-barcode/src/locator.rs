/*!

Defines [`EventLocator`], which says which event of a collection holds a particle.

# Encoding Scheme

An event can be addressed in two mutually exclusive ways: by its position in the collection, or by the event number
the event carries. The two are packed into one 32-bit word:

| **Bits**    |                                31 |                   30…0 |
|:----------- | ---------------------------------:| ----------------------:|
| **Meaning** | 1 = position, 0 = event number    | position / event number |

The all-ones word is reserved as [`UNDEFINED`]. Because its discriminator bit is set, an undefined locator behaves
like a position that addresses the first event of the collection. It follows that the largest position that can be
stored is `2^31 - 2`, while event numbers may use the full 31 bits.

An event number of zero is also special: it addresses the first event of the collection rather than the event
numbered zero.

The packed word, not the enum, is what gets stored atomically inside an [`ExtendedBarCode`](crate::ExtendedBarCode)
and what gets persisted.

*/

use std::fmt::{Display, Formatter};

use crate::{errors::LocatorError, POSITION_FLAG, UNDEFINED, VALUE_MASK};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventLocator {
    /// The event whose event number equals the value. Zero addresses the first event.
    EventNumber(u32),
    /// The event at the given index of the collection.
    Position(u32),
    /// No locator. Resolves like a position addressing the first event.
    Undefined,
}

impl Default for EventLocator {
    fn default() -> Self {
        EventLocator::EventNumber(0)
    }
}

impl EventLocator {
    /// Packs the locator into its 32-bit word. Values that do not fit into 31 bits pack to [`UNDEFINED`], so this
    /// never fails. Use [`EventLocator::validated`] to reject such values up front.
    #[inline(always)]
    #[must_use]
    pub fn encode(self) -> u32 {
        match self {
            EventLocator::EventNumber(number) if number <= VALUE_MASK => number,
            EventLocator::Position(position) if position <= VALUE_MASK => POSITION_FLAG | position,
            _ => UNDEFINED,
        }
    }

    /// Unpacks a 32-bit locator word. Every word decodes to exactly one locator.
    #[inline(always)]
    #[must_use]
    pub fn decode(word: u32) -> Self {
        if word == UNDEFINED {
            EventLocator::Undefined
        } else if word & POSITION_FLAG != 0 {
            EventLocator::Position(word & VALUE_MASK)
        } else {
            EventLocator::EventNumber(word)
        }
    }

    /// Returns `self` if it survives a round trip through [`EventLocator::encode`] unchanged.
    pub fn validated(self) -> Result<Self, LocatorError> {
        match self {
            EventLocator::Position(position) if position >= VALUE_MASK => {
                Err(LocatorError::from_position(position))
            }
            EventLocator::EventNumber(number) if number > VALUE_MASK => {
                Err(LocatorError::from_event_number(number))
            }
            _ => Ok(self),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn is_position(&self) -> bool {
        matches!(self, EventLocator::Position(_))
    }

    #[inline(always)]
    #[must_use]
    pub fn is_event_number(&self) -> bool {
        matches!(self, EventLocator::EventNumber(_))
    }

    #[inline(always)]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, EventLocator::Undefined)
    }

    /// The stored position or event number, `None` when undefined.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        match self {
            EventLocator::EventNumber(value) | EventLocator::Position(value) => Some(*value),
            EventLocator::Undefined => None,
        }
    }
}

impl Display for EventLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventLocator::EventNumber(number) => write!(f, "event number {}", number),
            EventLocator::Position(position) => write!(f, "position {}", position),
            EventLocator::Undefined => write!(f, "undefined"),
        }
    }
}
