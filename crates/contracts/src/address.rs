//! I2cAddress - 7-bit bus address
//!
//! The range check lives in the constructor, so a held `I2cAddress` is always
//! inside `1..=127`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 7-bit I2C device address.
///
/// # Examples
/// ```
/// use contracts::I2cAddress;
///
/// let addr = I2cAddress::new(0x10).unwrap();
/// assert_eq!(addr.get(), 16);
/// assert_eq!(addr.to_string(), "0x10");
/// assert!(I2cAddress::new(0).is_none());
/// assert!(I2cAddress::new(128).is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// Lowest accepted address
    pub const MIN: u8 = 1;
    /// Highest accepted address
    pub const MAX: u8 = 127;
    /// Factory address of the VEML6075
    pub const VEML6075: I2cAddress = I2cAddress(0x10);

    /// Create an address, `None` outside `1..=127`.
    #[inline]
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Create an address from any integer, `None` outside `1..=127`.
    pub fn from_i64(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    /// Raw address value
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for I2cAddress {
    fn default() -> Self {
        Self::VEML6075
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl fmt::Debug for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I2cAddress({:#04x})", self.0)
    }
}

impl From<I2cAddress> for u8 {
    fn from(addr: I2cAddress) -> Self {
        addr.0
    }
}

impl Serialize for I2cAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for I2cAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("i2c address {raw} out of range 1..=127"))
        })
    }
}
