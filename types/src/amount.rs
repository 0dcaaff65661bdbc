//! Currency amounts in the smallest unit.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point errors.
//! One ether is 10^18 wei.

use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Number of wei in one ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

const ETHER_DECIMALS: usize = 18;

/// A non-negative currency amount in wei.
///
/// Text formats (JSON, TOML) carry it as a decimal wei string, since most
/// real balances exceed what a JSON number holds exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(wei: u128) -> Self {
        Self(wei)
    }

    pub fn ether(whole: u128) -> Self {
        Self(whole * WEI_PER_ETHER)
    }

    /// Thousandths of an ether, e.g. `milliether(3_500)` is 3.5 ether.
    pub fn milliether(milli: u128) -> Self {
        Self(milli * (WEI_PER_ETHER / 1_000))
    }

    pub fn wei(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.0.to_string())
        } else {
            serializer.serialize_u128(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let raw = String::deserialize(deserializer)?;
            raw.parse().map_err(serde::de::Error::custom)
        } else {
            u128::deserialize(deserializer).map(Self)
        }
    }
}

/// Parses `"1500"` / `"1500wei"` as wei and `"1.5ether"` / `"1.5e"` as ether.
impl FromStr for Amount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAmount(s.to_string());
        let trimmed = s.trim();

        let ether_part = trimmed
            .strip_suffix("ether")
            .or_else(|| trimmed.strip_suffix('e'));
        if let Some(decimal) = ether_part {
            let (whole, frac) = decimal.split_once('.').unwrap_or((decimal, ""));
            if whole.is_empty() || frac.len() > ETHER_DECIMALS {
                return Err(invalid());
            }
            let whole: u128 = whole.parse().map_err(|_| invalid())?;
            let frac_wei: u128 = if frac.is_empty() {
                0
            } else {
                let padded = format!("{frac:0<width$}", width = ETHER_DECIMALS);
                padded.parse().map_err(|_| invalid())?
            };
            return whole
                .checked_mul(WEI_PER_ETHER)
                .and_then(|w| w.checked_add(frac_wei))
                .map(Self)
                .ok_or_else(invalid);
        }

        let wei = trimmed.strip_suffix("wei").unwrap_or(trimmed);
        wei.parse().map(Self).map_err(|_| invalid())
    }
}
