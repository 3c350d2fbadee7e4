// crates/hive-cli/src/scenario.rs
//
// Scenario files for `hive simulate`.
//
// A scenario is a TOML document with an optional `[ledger]` table (same
// shape as a ledger config file), an optional `[redemption]` table for the
// sandbox LP rate, a list of funded `[[accounts]]` and an ordered list of
// `[[steps]]`. Accounts are referred to by name; addresses are derived with
// `Address::from_label`.
//
//   [[accounts]]
//   name = "alice"
//   honey = "1000"
//
//   [[steps]]
//   op = "stake"
//   account = "alice"
//   amount = "250"
//
// A failing step is recorded and the replay moves on to the next one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use hive_core::error::HiveError;
use hive_core::identity::{Address, Asset};
use hive_core::traits::BlockClock;
use hive_economics::token::deserialize_units;
use hive_economics::{
    EmissionSchedule, Injection, LedgerConfig, LedgerEvent, LpRedemption, RewardStream,
    SandboxHost, StakingLedger, UpdaterCap,
};

use crate::output::honey;

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub redemption: RedemptionSpec,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Sandbox LP redemption rate.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RedemptionSpec {
    #[serde(default = "default_principal_per_lp")]
    pub principal_per_lp: u128,
    #[serde(default = "default_paired_per_lp")]
    pub paired_per_lp: u128,
}

fn default_principal_per_lp() -> u128 {
    LpRedemption::default().principal_per_lp
}

fn default_paired_per_lp() -> u128 {
    LpRedemption::default().paired_per_lp
}

impl Default for RedemptionSpec {
    fn default() -> Self {
        Self {
            principal_per_lp: default_principal_per_lp(),
            paired_per_lp: default_paired_per_lp(),
        }
    }
}

impl From<RedemptionSpec> for LpRedemption {
    fn from(spec: RedemptionSpec) -> Self {
        LpRedemption {
            principal_per_lp: spec.principal_per_lp,
            paired_per_lp: spec.paired_per_lp,
        }
    }
}

/// An account funded before the first step.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSpec {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_units")]
    pub honey: u128,
    #[serde(default, deserialize_with = "deserialize_units")]
    pub lp: u128,
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Move the block counter forward.
    Advance { blocks: u64 },
    /// Jump to an absolute block.
    SetBlock { block: u64 },
    Stake {
        account: String,
        #[serde(deserialize_with = "deserialize_units")]
        amount: u128,
    },
    Unstake {
        account: String,
        #[serde(deserialize_with = "deserialize_units")]
        amount: u128,
    },
    /// Claim LP and minting rewards. `recipient` defaults to the account.
    Claim {
        account: String,
        #[serde(deserialize_with = "deserialize_units")]
        amount: u128,
        recipient: Option<String>,
    },
    RewardHoney {
        funder: String,
        #[serde(deserialize_with = "deserialize_units")]
        amount: u128,
    },
    RewardLp {
        funder: String,
        #[serde(deserialize_with = "deserialize_units")]
        amount: u128,
    },
    SetSchedule { schedule: EmissionSchedule },
}

impl Step {
    /// Operation name as written in the scenario file.
    pub fn op(&self) -> &'static str {
        match self {
            Step::Advance { .. } => "advance",
            Step::SetBlock { .. } => "set_block",
            Step::Stake { .. } => "stake",
            Step::Unstake { .. } => "unstake",
            Step::Claim { .. } => "claim",
            Step::RewardHoney { .. } => "reward_honey",
            Step::RewardLp { .. } => "reward_lp",
            Step::SetSchedule { .. } => "set_schedule",
        }
    }

    fn account_names(&self) -> Vec<&str> {
        match self {
            Step::Stake { account, .. } | Step::Unstake { account, .. } => {
                vec![account.as_str()]
            }
            Step::Claim {
                account, recipient, ..
            } => {
                let mut names = vec![account.as_str()];
                if let Some(recipient) = recipient {
                    names.push(recipient.as_str());
                }
                names
            }
            Step::RewardHoney { funder, .. } | Step::RewardLp { funder, .. } => {
                vec![funder.as_str()]
            }
            Step::Advance { .. } | Step::SetBlock { .. } | Step::SetSchedule { .. } => Vec::new(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn load(path: &str) -> Result<Self, HiveError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| HiveError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml(&contents)
    }

    /// Parse a scenario from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, HiveError> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.ledger.validate()?;
        Ok(scenario)
    }

    /// Run every step against a fresh ledger and sandbox host.
    ///
    /// # Errors
    /// Ledger construction and the final balance views can fail; step
    /// failures are collected in the report instead.
    pub fn replay(&self) -> Result<SimulationReport, HiveError> {
        let (mut ledger, cap) = StakingLedger::new(self.ledger.clone())?;
        let mut host = SandboxHost::with_redemption(self.redemption.into());

        let mut names: Vec<String> = Vec::new();
        for account in &self.accounts {
            let address = Address::from_label(&account.name);
            host.fund(&address, Asset::Honey, account.honey);
            host.fund(&address, Asset::Lp, account.lp);
            remember(&mut names, &account.name);
        }
        for step in &self.steps {
            for name in step.account_names() {
                remember(&mut names, name);
            }
        }
        let directory: HashMap<Address, String> = names
            .iter()
            .map(|name| (Address::from_label(name), name.clone()))
            .collect();

        let mut events = Vec::new();
        let mut failures = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            let number = index + 1;
            match apply(&mut ledger, &cap, &mut host, step) {
                Ok(()) => {
                    let block = host.block_number();
                    for event in ledger.drain_events() {
                        events.push(EventRow::new(number, block, &event, &directory));
                    }
                }
                Err(e) => {
                    tracing::warn!("Step {} ({}) failed: {}", number, step.op(), e);
                    failures.push(StepFailure {
                        step: number,
                        op: step.op().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let final_block = host.block_number();
        let mut accounts = Vec::with_capacity(names.len());
        for name in &names {
            let address = Address::from_label(name);
            accounts.push(AccountReport {
                name: name.clone(),
                address: address.short(),
                staked: ledger.staker(&address).map(|r| r.staked_amount).unwrap_or(0),
                balance: ledger.balance_of(&address)?,
                pending_lp: ledger.pending_lp_of(&address)?,
                pending_mint: ledger.pending_mint_of(&address, final_block)?,
                wallet_honey: host.balance(&address, Asset::Honey),
                wallet_lp: host.balance(&address, Asset::Lp),
                wallet_paired: host.balance(&address, Asset::Paired),
            });
        }

        tracing::info!(
            "Replayed {} steps: {} events, {} failures",
            self.steps.len(),
            events.len(),
            failures.len()
        );

        Ok(SimulationReport {
            final_block,
            total_staked: ledger.total_staked(),
            honey_round_mask: ledger.honey_round_mask().to_string(),
            lp_round_mask: ledger.lp_round_mask().to_string(),
            honey_mint_round_mask: ledger.honey_mint_round_mask().to_string(),
            claimed_principal: ledger.claimed_principal(),
            claimed_paired: ledger.claimed_paired(),
            total_minted: host.total_minted(),
            accounts,
            events,
            failures,
        })
    }
}

fn remember(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|known| known == name) {
        names.push(name.to_string());
    }
}

fn apply(
    ledger: &mut StakingLedger,
    cap: &UpdaterCap,
    host: &mut SandboxHost,
    step: &Step,
) -> Result<(), HiveError> {
    match step {
        Step::Advance { blocks } => host.advance_blocks(*blocks),
        Step::SetBlock { block } => host.set_block(*block),
        Step::Stake { account, amount } => {
            ledger.stake(host, &Address::from_label(account), *amount)?;
        }
        Step::Unstake { account, amount } => {
            ledger.unstake(host, &Address::from_label(account), *amount)?;
        }
        Step::Claim {
            account,
            amount,
            recipient,
        } => {
            let recipient = recipient.as_deref().unwrap_or(account);
            ledger.claim_lp_tokens(
                host,
                &Address::from_label(account),
                *amount,
                &Address::from_label(recipient),
            )?;
        }
        Step::RewardHoney { funder, amount } => {
            ledger.reward_honey(host, &Address::from_label(funder), *amount)?;
        }
        Step::RewardLp { funder, amount } => {
            ledger.reward_lp(host, &Address::from_label(funder), *amount)?;
        }
        Step::SetSchedule { schedule } => ledger.set_emission_schedule(cap, *schedule)?,
    }
    Ok(())
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub final_block: u64,
    pub total_staked: u128,
    /// Masks are 256-bit and reported as decimal strings.
    pub honey_round_mask: String,
    pub lp_round_mask: String,
    pub honey_mint_round_mask: String,
    pub claimed_principal: u128,
    pub claimed_paired: u128,
    pub total_minted: u128,
    pub accounts: Vec<AccountReport>,
    pub events: Vec<EventRow>,
    pub failures: Vec<StepFailure>,
}

/// Final position of one named account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub name: String,
    pub address: String,
    pub staked: u128,
    pub balance: u128,
    pub pending_lp: u128,
    pub pending_mint: u128,
    pub wallet_honey: u128,
    pub wallet_lp: u128,
    pub wallet_paired: u128,
}

/// A ledger event, flattened for display.
#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub step: usize,
    pub block: u64,
    pub event: String,
    pub account: String,
    pub detail: String,
}

impl EventRow {
    fn new(
        step: usize,
        block: u64,
        event: &LedgerEvent,
        directory: &HashMap<Address, String>,
    ) -> Self {
        let name = |address: &Address| {
            directory
                .get(address)
                .cloned()
                .unwrap_or_else(|| address.short())
        };
        let (account, detail) = match event {
            LedgerEvent::Stake { staker, amount, .. }
            | LedgerEvent::Unstake { staker, amount, .. } => (name(staker), honey(*amount)),
            LedgerEvent::ClaimRewards {
                staker,
                principal_amount,
                paired_amount,
                ..
            } => (
                name(staker),
                format!(
                    "{} + {} {}",
                    honey(*principal_amount),
                    paired_amount,
                    Asset::Paired
                ),
            ),
            LedgerEvent::RewardInjected {
                stream,
                funder,
                amount,
                injection,
                ..
            } => {
                let amount = match stream {
                    RewardStream::Lp => format!("{} {}", amount, Asset::Lp),
                    RewardStream::Honey | RewardStream::Mint => honey(*amount),
                };
                let outcome = match injection {
                    Injection::Distributed { mask_delta } => format!("mask +{}", mask_delta),
                    Injection::Discarded => String::from("discarded"),
                };
                (name(funder), format!("{} {}: {}", stream, amount, outcome))
            }
            LedgerEvent::ScheduleUpdated { schedule } => (
                String::from("-"),
                format!(
                    "phase1 to {} at {}, phase2 from {} at {}",
                    schedule.phase1_end,
                    honey(schedule.phase1_rate),
                    schedule.phase2_start,
                    honey(schedule.phase2_rate)
                ),
            ),
        };
        Self {
            step,
            block,
            event: event.kind().to_string(),
            account,
            detail,
        }
    }
}

/// A step that returned an error.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub op: String,
    pub error: String,
}
