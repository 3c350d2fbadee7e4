// crates/hive-economics/src/math.rs
//
// 256-bit intermediates for the reward masks.
//
// A mask increment is `amount * MASK_SCALE / total_staked` and an entitlement
// is `mask_delta * staked / MASK_SCALE`. With u128 amounts and a 10^13 scale
// both products outgrow u128, and a dust stake can push the mask itself past
// u128. Masks are therefore held as U256; only the final entitlement is
// narrowed back to u128.
//
// The narrowing cannot fail for a well-formed ledger: a staker's stake is
// constant between two syncs and never exceeds the total it was divided by,
// so the entitlement is bounded by the rewards injected in that window.

use hive_core::error::HiveError;

uint::construct_uint! {
    /// Unsigned 256-bit integer.
    pub struct U256(4);
}

/// `a * b / c` with a 256-bit product.
///
/// # Errors
/// `ArithmeticOverflow` if the product exceeds 256 bits or `c` is zero.
pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, HiveError> {
    a.checked_mul(b)
        .and_then(|product| product.checked_div(c))
        .ok_or(HiveError::ArithmeticOverflow)
}

/// Narrow a 256-bit value to u128.
pub fn narrow(value: U256) -> Result<u128, HiveError> {
    if value.bits() > 128 {
        return Err(HiveError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}

/// Serde adapter writing a `U256` as a decimal string.
pub mod decimal {
    use super::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = String::deserialize(deserializer)?;
        U256::from_dec_str(&text)
            .map_err(|e| de::Error::custom(format!("invalid 256-bit decimal '{}': {:?}", text, e)))
    }
}
