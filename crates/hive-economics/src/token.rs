// crates/hive-economics/src/token.rs
//
// HONEY token amount type.
//
// HONEY has 18 decimals. All ledger accounting is done in integer base units
// (u128); the `Honey` wrapper parses human amounts such as "2.5" out of
// config and scenario files and renders amounts in CLI tables.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use hive_core::error::HiveError;

/// Number of decimal places of HONEY.
pub const HONEY_DECIMALS: u32 = 18;

/// Base units in one whole HONEY (10^18).
pub const UNITS_PER_HONEY: u128 = 1_000_000_000_000_000_000;

/// An amount of HONEY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Honey {
    /// Amount in base units (1 HONEY = 10^18 units).
    pub units: u128,
}

impl Honey {
    /// Create an amount from base units.
    pub fn from_units(units: u128) -> Self {
        Self { units }
    }

    /// Parse a decimal HONEY amount, e.g. `"12"`, `"0.25"` or `"3.5 HONEY"`.
    ///
    /// Parsing is exact; more than 18 fractional digits is an error.
    ///
    /// # Example
    /// ```
    /// use hive_economics::token::{Honey, UNITS_PER_HONEY};
    /// let amount = Honey::parse("1.5").unwrap();
    /// assert_eq!(amount.units, UNITS_PER_HONEY + UNITS_PER_HONEY / 2);
    /// ```
    pub fn parse(input: &str) -> Result<Self, HiveError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_suffix("HONEY").unwrap_or(trimmed).trim();
        let invalid = || HiveError::Config(format!("invalid HONEY amount '{}'", input));

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !digits(whole) || !digits(frac) {
            return Err(invalid());
        }
        if frac.len() > HONEY_DECIMALS as usize {
            return Err(invalid());
        }

        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_units: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = HONEY_DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };

        let units = whole_units
            .checked_mul(UNITS_PER_HONEY)
            .and_then(|w| w.checked_add(frac_units))
            .ok_or(HiveError::ArithmeticOverflow)?;
        Ok(Self { units })
    }
}

impl fmt::Display for Honey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.units / UNITS_PER_HONEY;
        let frac = self.units % UNITS_PER_HONEY;
        if frac == 0 {
            write!(f, "{} HONEY", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} HONEY", whole, trimmed)
        }
    }
}

/// Serde helper for amount fields in config and scenario files.
///
/// TOML integers are taken as base units. Strings are parsed as decimal
/// HONEY (`"2.5"` is 2.5 × 10^18 units), which also covers values beyond
/// TOML's i64 integer range.
pub fn deserialize_units<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    struct UnitsVisitor;

    impl<'de> Visitor<'de> for UnitsVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer amount of base units or a decimal HONEY string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(u128::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            Honey::parse(v).map(|h| h.units).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(UnitsVisitor)
}
