// crates/hive-economics/src/accumulator.rs
//
// Scaled reward accumulator ("round mask").
//
// Each reward stream keeps one global mask: the cumulative reward per unit of
// stake since inception, multiplied by MASK_SCALE. Injecting R rewards while
// S is staked adds R * MASK_SCALE / S to the mask. A staker who last synced at
// mask m0 and holds s is entitled to (mask - m0) * s / MASK_SCALE. Nothing
// iterates over stakers; a staker's share is settled lazily on their next
// sync.
//
// Masks are 256-bit (see `math`); amounts and entitlements stay u128.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::{self, U256};
use hive_core::error::HiveError;

/// Fixed-point factor applied to every mask increment.
///
/// This is 10 × 10^12 = 10^13, not 10^12. The value is kept as deployed so
/// masks and entitlements stay numerically identical to existing ledgers.
pub const MASK_SCALE: u128 = 10 * 1_000_000_000_000;

/// Starting value of every global mask. Distinguishes an initialized stream
/// with no rewards yet from an uninitialized one.
pub const INITIAL_MASK: u128 = 1;

/// The reward streams sharing the ledger's stake basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStream {
    /// Injected HONEY, compounded into stake basis.
    Honey,
    /// Injected LP tokens, claimable via liquidity removal.
    Lp,
    /// HONEY minted along the emission schedule.
    Mint,
}

impl fmt::Display for RewardStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardStream::Honey => write!(f, "honey"),
            RewardStream::Lp => write!(f, "lp"),
            RewardStream::Mint => write!(f, "mint"),
        }
    }
}

/// A staker's view of a global mask as of their last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskSnapshot {
    /// Never synced; entitled to nothing.
    #[default]
    Unsynced,
    /// Synced when the global mask had this value.
    SyncedAt(#[serde(with = "math::decimal")] U256),
}

impl MaskSnapshot {
    /// Raw mask value, reporting `Unsynced` as 0.
    pub fn value(&self) -> U256 {
        match self {
            MaskSnapshot::Unsynced => U256::zero(),
            MaskSnapshot::SyncedAt(mask) => *mask,
        }
    }
}

/// What happened to an injected reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Injection {
    /// Spread over the current stake; the mask grew by `mask_delta`.
    Distributed {
        #[serde(with = "math::decimal")]
        mask_delta: U256,
    },
    /// Nothing was staked, so nobody can absorb the reward.
    Discarded,
}

/// One reward stream's global accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccumulator {
    stream: RewardStream,
    #[serde(with = "math::decimal")]
    mask: U256,
}

impl RewardAccumulator {
    /// A fresh accumulator at `INITIAL_MASK`.
    pub fn new(stream: RewardStream) -> Self {
        Self {
            stream,
            mask: U256::from(INITIAL_MASK),
        }
    }

    /// Which stream this accumulator belongs to.
    pub fn stream(&self) -> RewardStream {
        self.stream
    }

    /// Current global mask.
    pub fn mask(&self) -> U256 {
        self.mask
    }

    /// Snapshot of the current mask, for storing on a staker record.
    pub fn snapshot(&self) -> MaskSnapshot {
        MaskSnapshot::SyncedAt(self.mask)
    }

    /// Spread `amount` over `total_staked`.
    ///
    /// With nothing staked the amount is discarded and the mask is left
    /// untouched. The remainder of the floor division is lost.
    pub fn inject(&mut self, amount: u128, total_staked: u128) -> Result<Injection, HiveError> {
        if total_staked == 0 {
            return Ok(Injection::Discarded);
        }
        let mask_delta = math::mul_div(
            U256::from(amount),
            U256::from(MASK_SCALE),
            U256::from(total_staked),
        )?;
        self.mask = self
            .mask
            .checked_add(mask_delta)
            .ok_or(HiveError::ArithmeticOverflow)?;
        Ok(Injection::Distributed { mask_delta })
    }

    /// Reward owed to a staker holding `staked` since `snapshot`.
    pub fn entitlement(&self, snapshot: MaskSnapshot, staked: u128) -> Result<u128, HiveError> {
        match snapshot {
            MaskSnapshot::Unsynced => Ok(0),
            MaskSnapshot::SyncedAt(synced) => {
                let delta = self.mask.saturating_sub(synced);
                let owed = math::mul_div(delta, U256::from(staked), U256::from(MASK_SCALE))?;
                math::narrow(owed)
            }
        }
    }

    /// Settle a staker against this stream: returns their entitlement and
    /// advances `snapshot` to the current mask.
    ///
    /// Must run before the staker's stake changes.
    pub fn sync(&self, snapshot: &mut MaskSnapshot, staked: u128) -> Result<u128, HiveError> {
        let owed = self.entitlement(*snapshot, staked)?;
        *snapshot = self.snapshot();
        Ok(owed)
    }
}
