//! The persistent form of a [`ParticleLink`].
//!
//! Only the extended barcode is written out: the packed locator word, the barcode and the collection kind code,
//! exactly as they are held in memory. A link is persisted with its current representation, so a position that was
//! promoted before writing is read back as an event number. Context and memoized particle are transient and are
//! supplied again when reading.
//!
//! The byte encoding is `bincode` with fixed-width little-endian integers, 9 bytes per link.

use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit};
use serde::{Deserialize, Serialize};
use truthlink_barcode::ExtendedBarCode;

use crate::context::EventContext;
use crate::error::TruthLinkError;
use crate::link::ParticleLink;

/// Size in bytes of one encoded [`ParticleLinkP`].
pub const ENCODED_LEN: usize = 9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleLinkP {
    /// The packed locator word.
    pub mc_evt_index: u32,
    pub barcode: u32,
    /// The collection kind code.
    pub mc_evt_coll: u8,
}

fn bincode_config() -> Configuration<LittleEndian, Fixint, NoLimit> {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

impl ParticleLinkP {
    #[must_use]
    pub fn from_link(link: &ParticleLink) -> Self {
        let barcode = link.extended_barcode();
        Self {
            mc_evt_index: barcode.locator_word(),
            barcode: barcode.barcode(),
            mc_evt_coll: barcode.collection_kind().encode(),
        }
    }

    /// Restores the link, resolving against `context`. Kind codes this version does not know give a link of kind
    /// `Undefined`.
    #[must_use]
    pub fn to_link(&self, context: &EventContext) -> ParticleLink {
        ParticleLink::from_extended_barcode(self.to_extended_barcode(), context)
    }

    #[must_use]
    pub fn to_extended_barcode(&self) -> ExtendedBarCode {
        ExtendedBarCode::from_raw(self.barcode, self.mc_evt_index, self.mc_evt_coll)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TruthLinkError> {
        Ok(bincode::serde::encode_to_vec(self, bincode_config())?)
    }

    /// Decodes a single link from the front of `bytes`. Bytes past the first [`ENCODED_LEN`] are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TruthLinkError> {
        let (link, _) = bincode::serde::decode_from_slice(bytes, bincode_config())?;
        Ok(link)
    }
}

impl From<&ParticleLink> for ParticleLinkP {
    fn from(link: &ParticleLink) -> Self {
        Self::from_link(link)
    }
}

/// Encodes a sequence of links: a `u64` count followed by the links, all fixed width.
pub fn encode_links(links: &[ParticleLink]) -> Result<Vec<u8>, TruthLinkError> {
    let persistent: Vec<ParticleLinkP> = links.iter().map(ParticleLinkP::from_link).collect();
    Ok(bincode::serde::encode_to_vec(&persistent, bincode_config())?)
}

/// Decodes links written by [`encode_links`], attaching each to `context`. Trailing bytes are an error.
pub fn decode_links(bytes: &[u8], context: &EventContext) -> Result<Vec<ParticleLink>, TruthLinkError> {
    let (persistent, read): (Vec<ParticleLinkP>, usize) =
        bincode::serde::decode_from_slice(bytes, bincode_config())?;
    if read != bytes.len() {
        return Err(TruthLinkError::DecodeError(bincode::error::DecodeError::Other(
            "trailing bytes after encoded particle links",
        )));
    }
    Ok(persistent.iter().map(|link| link.to_link(context)).collect())
}
