use std::{array::TryFromSliceError, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// The size of an [`Address`] in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// An opaque, fixed-width identity.
///
/// Owners and subjects are both addresses. Two addresses are the same
/// identity exactly when their bytes are equal.
///
/// The textual form is `0x` followed by 40 lowercase hex digits. Parsing
/// is lenient about the prefix and about letter case.
///
/// # Examples
///
/// ```rust
/// use dax_registry::Address;
///
/// let address: Address = "0x00000000000000000000000000000000000000AB".parse().unwrap();
/// assert_eq!(address.to_string(), "0x00000000000000000000000000000000000000ab");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The raw address bytes.
    pub fn bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

/// Errors that can occur when parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddressError {
    /// The hex body does not have exactly 40 digits.
    #[error("Address must have {expected} hex digits, got {actual}")]
    Length {
        /// Required number of hex digits.
        expected: usize,
        /// Number of hex digits found.
        actual: usize,
    },

    /// The hex body contains a character that is not a hex digit.
    #[error("Address is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let body = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);

        if body.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressError::Length {
                expected: ADDRESS_LENGTH * 2,
                actual: body.len(),
            });
        }

        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(body, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&format_args!("{self}")).finish()
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(value: [u8; ADDRESS_LENGTH]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into()?))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
