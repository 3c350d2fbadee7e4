// crates/hive-economics/src/events.rs
//
// Events emitted by ledger operations for external consumers (indexers,
// the CLI's event log). Every successful mutating operation produces exactly
// one event, returned in the ledger's journal in execution order.

use serde::{Deserialize, Serialize};

use crate::accumulator::{Injection, RewardStream};
use crate::emission::EmissionSchedule;
use hive_core::identity::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A staker deposited (or forced a sync with a zero amount).
    Stake {
        staker: Address,
        amount: u128,
        block: u64,
    },
    /// A staker withdrew HONEY from their balance.
    Unstake {
        staker: Address,
        amount: u128,
        block: u64,
    },
    /// LP and minting rewards were paid out.
    ClaimRewards {
        staker: Address,
        /// HONEY from liquidity removal plus minted HONEY.
        principal_amount: u128,
        /// Paired asset from liquidity removal.
        paired_amount: u128,
        block: u64,
    },
    /// A funder injected rewards into a stream.
    RewardInjected {
        stream: RewardStream,
        funder: Address,
        amount: u128,
        injection: Injection,
        block: u64,
    },
    /// The updater replaced the emission schedule.
    ScheduleUpdated { schedule: EmissionSchedule },
}

impl LedgerEvent {
    /// Short name used in log lines and tables.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::Stake { .. } => "Stake",
            LedgerEvent::Unstake { .. } => "Unstake",
            LedgerEvent::ClaimRewards { .. } => "ClaimRewards",
            LedgerEvent::RewardInjected { .. } => "RewardInjected",
            LedgerEvent::ScheduleUpdated { .. } => "ScheduleUpdated",
        }
    }
}
