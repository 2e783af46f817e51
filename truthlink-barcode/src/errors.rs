//!
//! We only have one error case, namely when a locator value cannot be represented in the 31 bits of the packed
//! locator word. Instances of `LocatorError` are constructed with the `LocatorError::from_*()` constructors in
//! `EventLocator::validated()`.
//!

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use crate::VALUE_MASK;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LocatorError {
    parameter_name: &'static str,
    value: u64,
    min: u64,
    max: u64,
}

impl Display for LocatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value {} provided for {} is outside valid range of {}..={}",
            self.value, self.parameter_name, self.min, self.max
        )
    }
}

impl Error for LocatorError {}

impl LocatorError {
    #[must_use]
    pub fn new(parameter_name: &'static str, value: u64, min: u64, max: u64) -> Self {
        Self {
            parameter_name,
            value,
            min,
            max,
        }
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    // Convenience constructors. These should be kept in sync with the encoding in `locator.rs`.

    /// The all-ones position is the `UNDEFINED` word, so the largest real position is one less than the mask.
    #[must_use]
    pub fn from_position(value: u32) -> Self {
        Self {
            parameter_name: "Position",
            value: value as u64,
            min: 0,
            max: (VALUE_MASK - 1) as u64,
        }
    }

    #[must_use]
    pub fn from_event_number(value: u32) -> Self {
        Self {
            parameter_name: "EventNumber",
            value: value as u64,
            min: 0,
            max: VALUE_MASK as u64,
        }
    }
}

// Tested in `locator.rs`.
