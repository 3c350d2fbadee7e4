// crates/hive-economics/src/lib.rs
//
// hive-economics: the Hive staking ledger.
//
// Depositors stake HONEY and earn three reward streams proportionally to
// their stake over time:
//   - honey: injected HONEY, compounded into the stake basis,
//   - lp: injected LP tokens, redeemed through an AMM router on claim,
//   - mint: HONEY minted along a three-phase emission schedule.
//
// All amounts are u128 base units (1 HONEY = 10^18 units).

pub mod accumulator;
pub mod config;
pub mod emission;
pub mod events;
pub mod math;
pub mod sandbox;
pub mod staking;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::{
    Injection, MaskSnapshot, RewardAccumulator, RewardStream, INITIAL_MASK, MASK_SCALE,
};
pub use config::LedgerConfig;
pub use emission::EmissionSchedule;
pub use events::LedgerEvent;
pub use math::U256;
pub use sandbox::{LpRedemption, SandboxHost};
pub use staking::{ClaimOutcome, LedgerTotals, StakerRecord, StakingLedger, UpdaterCap};
pub use token::{Honey, HONEY_DECIMALS, UNITS_PER_HONEY};
