/*!

An enum for the kinds of event collection a truth particle can live in. The main collection holds the hard-scatter
event(s); the three pileup collections hold the events overlaid on top of it. Each kind has a one-character encoding,
`'a'` through `'d'`, used wherever a link is printed or persisted as text.

*/

use std::fmt::Display;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(u8)]
pub enum CollectionKind {
    #[default]
    Main = 0,
    FirstPileup = 1,
    SecondPileup = 2,
    ThirdPileup = 3,
    // Anything that does not map to one of the kinds above: unknown codes, characters, or collection names.
    Undefined = 4,
}

impl CollectionKind {
    /// The defined kinds in code order.
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Main,
        CollectionKind::FirstPileup,
        CollectionKind::SecondPileup,
        CollectionKind::ThirdPileup,
    ];

    /// The number of defined kinds.
    pub const COUNT: usize = 4;

    /// Character used for `Undefined`. Never produced by a defined kind.
    pub const UNDEFINED_CHAR: char = '?';

    /// Decode a numeric code to a `CollectionKind`. Codes past the defined kinds decode to `Undefined`.
    #[inline(always)]
    #[must_use]
    pub fn decode(code: u8) -> Self {
        match code {
            0 => CollectionKind::Main,
            1 => CollectionKind::FirstPileup,
            2 => CollectionKind::SecondPileup,
            3 => CollectionKind::ThirdPileup,
            _ => CollectionKind::Undefined,
        }
    }

    /// Encode a `CollectionKind` as a `u8`
    #[inline(always)]
    #[must_use]
    pub fn encode(self) -> u8 {
        self as u8
    }

    /// Returns `true` for every kind except `Undefined`.
    #[inline(always)]
    #[must_use]
    pub fn is_defined(self) -> bool {
        self != CollectionKind::Undefined
    }

    /// The index of this kind into per-kind tables, `None` for `Undefined`.
    #[inline(always)]
    #[must_use]
    pub fn slot(self) -> Option<usize> {
        self.is_defined().then_some(self as usize)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            CollectionKind::Main => 'a',
            CollectionKind::FirstPileup => 'b',
            CollectionKind::SecondPileup => 'c',
            CollectionKind::ThirdPileup => 'd',
            CollectionKind::Undefined => Self::UNDEFINED_CHAR,
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Self {
        match c {
            'a' => CollectionKind::Main,
            'b' => CollectionKind::FirstPileup,
            'c' => CollectionKind::SecondPileup,
            'd' => CollectionKind::ThirdPileup,
            _ => CollectionKind::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Main => "Main",
            CollectionKind::FirstPileup => "FirstPileup",
            CollectionKind::SecondPileup => "SecondPileup",
            CollectionKind::ThirdPileup => "ThirdPileup",
            CollectionKind::Undefined => "Undefined",
        }
    }
}

impl From<u8> for CollectionKind {
    fn from(code: u8) -> Self {
        CollectionKind::decode(code)
    }
}

impl Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_round_trip() {
        for kind in CollectionKind::ALL {
            assert_eq!(CollectionKind::from_char(kind.as_char()), kind);
        }
        assert_eq!(CollectionKind::Main.as_char(), 'a');
        assert_eq!(CollectionKind::ThirdPileup.as_char(), 'd');
    }

    #[test]
    fn test_unknown_char() {
        assert_eq!(CollectionKind::from_char('e'), CollectionKind::Undefined);
        assert_eq!(CollectionKind::from_char('A'), CollectionKind::Undefined);
        assert_eq!(
            CollectionKind::from_char(CollectionKind::Undefined.as_char()),
            CollectionKind::Undefined
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(CollectionKind::decode(0), CollectionKind::Main);
        assert_eq!(CollectionKind::decode(2), CollectionKind::SecondPileup);
        assert_eq!(CollectionKind::decode(4), CollectionKind::Undefined);
        assert_eq!(CollectionKind::decode(255), CollectionKind::Undefined);
    }

    #[test]
    fn test_encode() {
        assert_eq!(CollectionKind::Main.encode(), 0u8);
        assert_eq!(CollectionKind::FirstPileup.encode(), 1u8);
        assert_eq!(CollectionKind::ThirdPileup.encode(), 3u8);
        assert_eq!(CollectionKind::Undefined.encode(), 4u8);
    }

    #[test]
    fn test_slot() {
        assert_eq!(CollectionKind::SecondPileup.slot(), Some(2));
        assert_eq!(CollectionKind::Undefined.slot(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CollectionKind::FirstPileup.to_string(), "FirstPileup");
        assert_eq!(CollectionKind::Undefined.to_string(), "Undefined");
    }
}
