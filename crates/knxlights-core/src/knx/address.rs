use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A three-level KNX group address (main/middle/sub, 5/3/8 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupAddressValue(u16);

impl GroupAddressValue {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Combines the three fields into a packed address.
    ///
    /// Returns `None` if a field does not fit its bit width.
    pub fn from_parts(main: u16, middle: u16, sub: u16) -> Option<Self> {
        if main > 0x1F || middle > 0x07 || sub > 0xFF {
            return None;
        }
        Some(Self((main << 11) | (middle << 8) | sub))
    }

    /// Returns the raw 16-bit value.
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub const fn main(&self) -> u16 {
        (self.0 >> 11) & 0x1F
    }

    pub const fn middle(&self) -> u16 {
        (self.0 >> 8) & 0x07
    }

    pub const fn sub(&self) -> u16 {
        self.0 & 0xFF
    }

    /// The address `offset` positions further, if still inside the 16-bit space.
    pub fn offset(&self, offset: u16) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl From<u16> for GroupAddressValue {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for GroupAddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid three-level group address '{0}'")]
pub struct InvalidGroupAddress(pub String);

impl FromStr for GroupAddressValue {
    type Err = InvalidGroupAddress;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidGroupAddress(value.to_string());
        let mut parts = value.trim().split('/');
        let mut next = || -> Result<u16, InvalidGroupAddress> {
            parts
                .next()
                .and_then(|part| part.parse::<u16>().ok())
                .ok_or_else(invalid)
        };
        let (main, middle, sub) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Self::from_parts(main, middle, sub).ok_or_else(invalid)
    }
}

impl Serialize for GroupAddressValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
