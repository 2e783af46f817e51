//! # Extended Barcode Library
//!
//! Reconstructed data products refer back to the truth particle that produced them. A live reference does not
//! survive serialization, so the reference is stored as a small value instead: the particle's barcode, a locator
//! naming the event that contains it, and the kind of event collection the event lives in. This library provides
//! those value types and their packed 32-bit encodings.
//!
//! - [`crate::collection`] defines [`CollectionKind`], the closed set of event collections a particle can live in,
//!   with its one-character encoding.
//! - [`crate::locator`] defines [`EventLocator`], which addresses an event either by its position in the collection
//!   or by its event number, and the packed word the locator is persisted as.
//! - [`crate::extended_barcode`] defines [`ExtendedBarCode`], which combines the three and supports the one-way,
//!   lock-free promotion of a position locator to an event-number locator.
//!
//! Resolving an `ExtendedBarCode` back into a particle needs an event store and is not the business of this crate.

// Positive instances of the following lints have been audited.
#![allow(clippy::inline_always)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]

pub mod collection;
pub mod errors;
pub mod extended_barcode;
pub mod locator;

pub use collection::CollectionKind;
pub use errors::LocatorError;
pub use extended_barcode::ExtendedBarCode;
pub use locator::EventLocator;

/// The numeric type of a particle barcode. By convention, zero is reserved for the null link.
pub type Barcode = u32;

/// The reserved barcode of a null link.
pub const NULL_BARCODE: Barcode = 0;

/// The packed locator word reserved for "no locator". Interpreted as a position, it addresses the first event.
pub const UNDEFINED: u32 = u32::MAX;

/// Bit 31 of the locator word: set for a position, clear for an event number.
pub const POSITION_FLAG: u32 = 1 << 31;

/// Bits 0..30 of the locator word hold the locator value.
pub const VALUE_MASK: u32 = POSITION_FLAG - 1; // 2^31-1
