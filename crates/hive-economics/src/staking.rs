// crates/hive-economics/src/staking.rs
//
// The staking ledger: global totals, one record per staker, three reward
// accumulators, and the lifecycle operations that tie them together.
//
// Ordering rule for every staker operation:
//   1. advance the minting accumulator along the emission schedule,
//   2. settle the caller's LP and minting entitlements into pending counters,
//   3. only then change stake or pay out.
// Honey rewards are never paid separately; they compound into the stake
// basis whenever the staker stakes or unstakes.
//
// Operations stage their changes on copies of the global state and the
// caller's record and commit only when every collaborator call succeeded.
// On failure the host is rolled back to its checkpoint as well.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::accumulator::{Injection, MaskSnapshot, RewardAccumulator, RewardStream};
use crate::config::LedgerConfig;
use crate::emission::EmissionSchedule;
use crate::events::LedgerEvent;
use crate::math::U256;
use hive_core::error::HiveError;
use hive_core::identity::{Address, Asset};
use hive_core::traits::{Host, LiquidityProceeds, RemoveLiquidity};

/// Per-staker accounting record.
///
/// Created on first stake and never removed; a zero balance is a valid
/// terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerRecord {
    /// Stake basis, including honey rewards compounded so far.
    pub staked_amount: u128,
    /// Honey accumulator at the last compounding.
    pub honey_mask: MaskSnapshot,
    /// LP accumulator at the last sync.
    pub lp_mask: MaskSnapshot,
    /// Minting accumulator at the last sync.
    pub honey_mint_mask: MaskSnapshot,
    /// LP tokens settled but not yet claimed.
    pub pending_lp: u128,
    /// Minted HONEY settled but not yet claimed.
    pub pending_mint: u128,
    /// HONEY withdrawn through unstake.
    pub claimed_honey: u128,
    /// LP tokens redeemed through claims.
    pub claimed_lp: u128,
    /// Minted HONEY paid out through claims.
    pub claimed_mint: u128,
}

/// Global scalar state of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of all stakers' `staked_amount`.
    pub total_staked: u128,
    /// Block up to which the minting accumulator has been advanced.
    /// `None` until the first stake.
    pub last_mint_sync_point: Option<u64>,
    /// HONEY paid out by claims (liquidity proceeds plus minted rewards).
    pub claimed_principal: u128,
    /// Paired asset paid out by claims.
    pub claimed_paired: u128,
}

/// Result of a successful `claim_lp_tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClaimOutcome {
    /// HONEY received: liquidity-removal proceeds plus minted rewards.
    pub principal_amount: u128,
    /// Paired asset received from liquidity removal.
    pub paired_amount: u128,
}

/// Capability to replace the emission schedule of one specific ledger.
///
/// Handed out once by [`StakingLedger::new`]. Not `Clone`: one per ledger.
#[derive(Debug)]
pub struct UpdaterCap {
    ledger_id: Uuid,
}

impl UpdaterCap {
    /// The ledger this capability controls.
    pub fn ledger_id(&self) -> Uuid {
        self.ledger_id
    }
}

#[derive(Debug, Clone)]
struct GlobalState {
    totals: LedgerTotals,
    honey: RewardAccumulator,
    lp: RewardAccumulator,
    mint: RewardAccumulator,
}

impl GlobalState {
    fn new() -> Self {
        Self {
            totals: LedgerTotals::default(),
            honey: RewardAccumulator::new(RewardStream::Honey),
            lp: RewardAccumulator::new(RewardStream::Lp),
            mint: RewardAccumulator::new(RewardStream::Mint),
        }
    }

    /// Inject everything the schedule emitted since the last advance.
    fn advance_mint(&mut self, schedule: &EmissionSchedule, now: u64) -> Result<(), HiveError> {
        let Some(last) = self.totals.last_mint_sync_point else {
            return Ok(());
        };
        let emitted = schedule.accrued(last, now)?;
        let injection = self.mint.inject(emitted, self.totals.total_staked)?;
        if emitted > 0 && injection == Injection::Discarded {
            tracing::warn!(
                "Discarded {} minting reward over blocks ({}, {}]: nothing staked",
                emitted,
                last,
                now
            );
        }
        self.totals.last_mint_sync_point = Some(now);
        Ok(())
    }

    /// Settle the LP and minting streams for one staker.
    fn sync_rewards(
        &mut self,
        record: &mut StakerRecord,
        schedule: &EmissionSchedule,
        now: u64,
    ) -> Result<(), HiveError> {
        self.advance_mint(schedule, now)?;

        let lp = self.lp.sync(&mut record.lp_mask, record.staked_amount)?;
        record.pending_lp = checked_add(record.pending_lp, lp)?;

        let minted = self.mint.sync(&mut record.honey_mint_mask, record.staked_amount)?;
        record.pending_mint = checked_add(record.pending_mint, minted)?;

        tracing::debug!(
            "Synced staker at block {}: +{} lp, +{} mint",
            now,
            lp,
            minted
        );
        Ok(())
    }

    /// Roll the staker's honey entitlement into their stake basis.
    fn compound_honey(&mut self, record: &mut StakerRecord) -> Result<u128, HiveError> {
        let earned = self.honey.sync(&mut record.honey_mask, record.staked_amount)?;
        record.staked_amount = checked_add(record.staked_amount, earned)?;
        self.totals.total_staked = checked_add(self.totals.total_staked, earned)?;
        Ok(earned)
    }
}

/// Staking ledger for a single staked asset with honey, LP and minting
/// reward streams.
#[derive(Debug)]
pub struct StakingLedger {
    id: Uuid,
    config: LedgerConfig,
    global: GlobalState,
    stakers: HashMap<Address, StakerRecord>,
    events: Vec<LedgerEvent>,
}

impl StakingLedger {
    /// Create an empty ledger and the capability that administers it.
    ///
    /// # Errors
    /// Returns `HiveError::InvalidSchedule` if the configured schedule is
    /// malformed.
    pub fn new(config: LedgerConfig) -> Result<(Self, UpdaterCap), HiveError> {
        config.validate()?;
        let id = Uuid::now_v7();
        let ledger = Self {
            id,
            config,
            global: GlobalState::new(),
            stakers: HashMap::new(),
            events: Vec::new(),
        };
        Ok((ledger, UpdaterCap { ledger_id: id }))
    }

    // -----------------------------------------------------------------------
    // Lifecycle operations
    // -----------------------------------------------------------------------

    /// Deposit `amount` HONEY for `staker`. Zero is allowed and only forces a
    /// sync, compounding any honey rewards into the stake basis.
    ///
    /// Returns the staker's new stake basis.
    ///
    /// # Errors
    /// `TransferFailed` if the deposit cannot be pulled in; arithmetic and
    /// schedule errors from the sync.
    pub fn stake<H: Host>(
        &mut self,
        host: &mut H,
        staker: &Address,
        amount: u128,
    ) -> Result<u128, HiveError> {
        let now = host.block_number();
        let staker = *staker;
        self.transact(host, Some(&staker), true, |config, global, record, host| {
            if global.totals.last_mint_sync_point.is_none() {
                global.totals.last_mint_sync_point = Some(now);
            }
            global.sync_rewards(record, &config.schedule, now)?;

            if amount > 0 {
                host.transfer_in(Asset::Honey, &staker, amount)?;
            }

            let compounded = global.compound_honey(record)?;
            record.staked_amount = checked_add(record.staked_amount, amount)?;
            global.totals.total_staked = checked_add(global.totals.total_staked, amount)?;

            tracing::info!(
                "Stake: {} deposited {} (compounded {}) at block {}, basis now {}",
                staker.short(),
                amount,
                compounded,
                now,
                record.staked_amount
            );
            let event = LedgerEvent::Stake {
                staker,
                amount,
                block: now,
            };
            Ok((record.staked_amount, event))
        })
    }

    /// Withdraw `amount` HONEY from `staker`'s balance (basis plus unpaid
    /// honey rewards).
    ///
    /// Returns the staker's remaining stake basis.
    ///
    /// # Errors
    /// `InvalidAmount` for zero, `InsufficientBalance` if the balance is
    /// short, `TransferFailed` if the payout fails.
    pub fn unstake<H: Host>(
        &mut self,
        host: &mut H,
        staker: &Address,
        amount: u128,
    ) -> Result<u128, HiveError> {
        let now = host.block_number();
        let staker = *staker;
        self.transact(host, Some(&staker), false, |config, global, record, host| {
            if amount == 0 {
                return Err(HiveError::InvalidAmount);
            }
            global.sync_rewards(record, &config.schedule, now)?;

            let honey = global.honey.entitlement(record.honey_mask, record.staked_amount)?;
            let balance = checked_add(record.staked_amount, honey)?;
            if balance < amount {
                return Err(HiveError::InsufficientBalance {
                    requested: amount,
                    available: balance,
                });
            }

            global.compound_honey(record)?;
            record.staked_amount = checked_sub(record.staked_amount, amount)?;
            global.totals.total_staked = checked_sub(global.totals.total_staked, amount)?;
            record.claimed_honey = checked_add(record.claimed_honey, amount)?;

            host.transfer_out(Asset::Honey, &staker, amount)?;

            tracing::info!(
                "Unstake: {} withdrew {} at block {}, basis now {}",
                staker.short(),
                amount,
                now,
                record.staked_amount
            );
            let event = LedgerEvent::Unstake {
                staker,
                amount,
                block: now,
            };
            Ok((record.staked_amount, event))
        })
    }

    /// Redeem `amount` of the staker's pending LP tokens through the router
    /// and pay out all minted rewards, both to `recipient`.
    ///
    /// `amount == 0` skips liquidity removal and only pays minted rewards.
    ///
    /// # Errors
    /// `InsufficientBalance` if `amount` exceeds pending LP;
    /// `LiquidityRemovalFailed`, `DeadlineExceeded`, `MintFailed` or
    /// `TransferFailed` from the collaborators.
    pub fn claim_lp_tokens<H: Host>(
        &mut self,
        host: &mut H,
        staker: &Address,
        amount: u128,
        recipient: &Address,
    ) -> Result<ClaimOutcome, HiveError> {
        let now = host.block_number();
        let staker = *staker;
        let recipient = *recipient;
        self.transact(host, Some(&staker), false, |config, global, record, host| {
            global.sync_rewards(record, &config.schedule, now)?;

            let mut proceeds = LiquidityProceeds::default();
            if amount > 0 {
                if record.pending_lp < amount {
                    return Err(HiveError::InsufficientBalance {
                        requested: amount,
                        available: record.pending_lp,
                    });
                }
                record.pending_lp -= amount;
                record.claimed_lp = checked_add(record.claimed_lp, amount)?;

                let deadline = now
                    .checked_add(config.liquidity_deadline_blocks)
                    .ok_or(HiveError::ArithmeticOverflow)?;
                proceeds = host.remove_liquidity(RemoveLiquidity {
                    lp_amount: amount,
                    min_principal: config.min_principal_out,
                    min_paired: config.min_paired_out,
                    to: recipient,
                    deadline,
                })?;
            }

            let minted = std::mem::take(&mut record.pending_mint);
            if minted > 0 {
                host.mint(minted)?;
                host.transfer_out(Asset::Honey, &recipient, minted)?;
                record.claimed_mint = checked_add(record.claimed_mint, minted)?;
            }

            let outcome = ClaimOutcome {
                principal_amount: checked_add(proceeds.principal_out, minted)?,
                paired_amount: proceeds.paired_out,
            };
            global.totals.claimed_principal =
                checked_add(global.totals.claimed_principal, outcome.principal_amount)?;
            global.totals.claimed_paired =
                checked_add(global.totals.claimed_paired, outcome.paired_amount)?;

            tracing::info!(
                "ClaimRewards: {} redeemed {} lp and {} minted at block {}, paid {} + {} to {}",
                staker.short(),
                amount,
                minted,
                now,
                outcome.principal_amount,
                outcome.paired_amount,
                recipient.short()
            );
            let event = LedgerEvent::ClaimRewards {
                staker,
                principal_amount: outcome.principal_amount,
                paired_amount: outcome.paired_amount,
                block: now,
            };
            Ok((outcome, event))
        })
    }

    // -----------------------------------------------------------------------
    // Reward injection
    // -----------------------------------------------------------------------

    /// Pull `amount` HONEY from `funder` and spread it over all stake.
    ///
    /// # Errors
    /// `NoStakers` if nothing is staked (checked before any transfer).
    pub fn reward_honey<H: Host>(
        &mut self,
        host: &mut H,
        funder: &Address,
        amount: u128,
    ) -> Result<Injection, HiveError> {
        let now = host.block_number();
        let funder = *funder;
        self.transact(host, None, false, |_, global, _, host| {
            if global.totals.total_staked == 0 {
                return Err(HiveError::NoStakers);
            }
            host.transfer_in(Asset::Honey, &funder, amount)?;
            let injection = global.honey.inject(amount, global.totals.total_staked)?;

            tracing::debug!(
                "Honey reward of {} from {} over {} staked",
                amount,
                funder.short(),
                global.totals.total_staked
            );
            let event = LedgerEvent::RewardInjected {
                stream: RewardStream::Honey,
                funder,
                amount,
                injection,
                block: now,
            };
            Ok((injection, event))
        })
    }

    /// Pull `amount` LP tokens from `funder` and spread them over all stake.
    ///
    /// Unlike `reward_honey`, an empty ledger does not fail: the tokens are
    /// taken and the reward is discarded.
    pub fn reward_lp<H: Host>(
        &mut self,
        host: &mut H,
        funder: &Address,
        amount: u128,
    ) -> Result<Injection, HiveError> {
        let now = host.block_number();
        let funder = *funder;
        self.transact(host, None, false, |_, global, _, host| {
            host.transfer_in(Asset::Lp, &funder, amount)?;
            let injection = global.lp.inject(amount, global.totals.total_staked)?;

            if injection == Injection::Discarded {
                tracing::warn!(
                    "LP reward of {} from {} discarded: nothing staked",
                    amount,
                    funder.short()
                );
            } else {
                tracing::debug!(
                    "LP reward of {} from {} over {} staked",
                    amount,
                    funder.short(),
                    global.totals.total_staked
                );
            }
            let event = LedgerEvent::RewardInjected {
                stream: RewardStream::Lp,
                funder,
                amount,
                injection,
                block: now,
            };
            Ok((injection, event))
        })
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Replace the emission schedule. Already-settled minting rewards are not
    /// recomputed.
    ///
    /// # Errors
    /// `Unauthorized` if `cap` belongs to another ledger, `InvalidSchedule`
    /// if the schedule is malformed.
    pub fn set_emission_schedule(
        &mut self,
        cap: &UpdaterCap,
        schedule: EmissionSchedule,
    ) -> Result<(), HiveError> {
        if cap.ledger_id != self.id {
            tracing::warn!("Rejected schedule update from a foreign updater capability");
            return Err(HiveError::Unauthorized);
        }
        schedule.validate()?;
        self.config.schedule = schedule;
        tracing::info!(
            "Emission schedule updated: phase1 ends {} at rate {}, phase2 starts {} at rate {}",
            schedule.phase1_end,
            schedule.phase1_rate,
            schedule.phase2_start,
            schedule.phase2_rate
        );
        self.events.push(LedgerEvent::ScheduleUpdated { schedule });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Identifier of this ledger instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn emission_schedule(&self) -> &EmissionSchedule {
        &self.config.schedule
    }

    pub fn totals(&self) -> &LedgerTotals {
        &self.global.totals
    }

    pub fn total_staked(&self) -> u128 {
        self.global.totals.total_staked
    }

    pub fn honey_round_mask(&self) -> U256 {
        self.global.honey.mask()
    }

    pub fn lp_round_mask(&self) -> U256 {
        self.global.lp.mask()
    }

    pub fn honey_mint_round_mask(&self) -> U256 {
        self.global.mint.mask()
    }

    /// Last block the minting accumulator was advanced to; 0 before the
    /// first stake.
    pub fn last_mint_sync_point(&self) -> u64 {
        self.global.totals.last_mint_sync_point.unwrap_or(0)
    }

    pub fn claimed_principal(&self) -> u128 {
        self.global.totals.claimed_principal
    }

    pub fn claimed_paired(&self) -> u128 {
        self.global.totals.claimed_paired
    }

    /// Record of a staker, if they ever staked.
    pub fn staker(&self, staker: &Address) -> Option<&StakerRecord> {
        self.stakers.get(staker)
    }

    /// All staker records, in no particular order.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, &StakerRecord)> {
        self.stakers.iter()
    }

    pub fn staker_count(&self) -> usize {
        self.stakers.len()
    }

    /// Stake basis plus honey rewards not yet compounded. This is what
    /// `unstake` can withdraw.
    pub fn balance_of(&self, staker: &Address) -> Result<u128, HiveError> {
        let Some(record) = self.stakers.get(staker) else {
            return Ok(0);
        };
        let honey = self
            .global
            .honey
            .entitlement(record.honey_mask, record.staked_amount)?;
        checked_add(record.staked_amount, honey)
    }

    /// LP tokens claimable right now.
    pub fn pending_lp_of(&self, staker: &Address) -> Result<u128, HiveError> {
        let Some(record) = self.stakers.get(staker) else {
            return Ok(0);
        };
        let unsynced = self.global.lp.entitlement(record.lp_mask, record.staked_amount)?;
        checked_add(record.pending_lp, unsynced)
    }

    /// Minted HONEY a claim at block `now` would pay out, including emission
    /// since the last advance of the minting accumulator.
    pub fn pending_mint_of(&self, staker: &Address, now: u64) -> Result<u128, HiveError> {
        let Some(record) = self.stakers.get(staker) else {
            return Ok(0);
        };
        let mut mint = self.global.mint.clone();
        if let Some(last) = self.global.totals.last_mint_sync_point {
            if now > last {
                let emitted = self.config.schedule.accrued(last, now)?;
                mint.inject(emitted, self.global.totals.total_staked)?;
            }
        }
        let unsynced = mint.entitlement(record.honey_mint_mask, record.staked_amount)?;
        checked_add(record.pending_mint, unsynced)
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take all events out of the journal.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Run `op` against staged copies of the global state and `account`'s
    /// record; commit on success, roll back the host on failure.
    ///
    /// A record for an account that never staked is only persisted when
    /// `creates_record` is set.
    fn transact<H, T, F>(
        &mut self,
        host: &mut H,
        account: Option<&Address>,
        creates_record: bool,
        op: F,
    ) -> Result<T, HiveError>
    where
        H: Host,
        F: FnOnce(
            &LedgerConfig,
            &mut GlobalState,
            &mut StakerRecord,
            &mut H,
        ) -> Result<(T, LedgerEvent), HiveError>,
    {
        let checkpoint = host.checkpoint();
        let mut global = self.global.clone();
        let existing = account.and_then(|a| self.stakers.get(a));
        let persist_record = existing.is_some() || creates_record;
        let mut record = existing.cloned().unwrap_or_default();

        match op(&self.config, &mut global, &mut record, host) {
            Ok((value, event)) => {
                self.global = global;
                if let Some(account) = account {
                    if persist_record {
                        self.stakers.insert(*account, record);
                    }
                }
                self.events.push(event);
                Ok(value)
            }
            Err(e) => {
                host.rollback(checkpoint);
                tracing::warn!("Ledger operation aborted: {}", e);
                Err(e)
            }
        }
    }
}

fn checked_add(a: u128, b: u128) -> Result<u128, HiveError> {
    a.checked_add(b).ok_or(HiveError::ArithmeticOverflow)
}

fn checked_sub(a: u128, b: u128) -> Result<u128, HiveError> {
    a.checked_sub(b).ok_or(HiveError::ArithmeticOverflow)
}
