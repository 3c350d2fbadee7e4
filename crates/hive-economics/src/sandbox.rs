// crates/hive-economics/src/sandbox.rs
//
// In-memory host for the staking ledger.
//
// Holds per-account balances of HONEY, LP and the paired asset, the ledger's
// custody, a settable block number and a fixed LP redemption rate. Used by the
// CLI scenario runner and by tests. Faults can be armed to make the next
// transfer, mint or liquidity removal fail, which exercises the ledger's
// all-or-nothing behaviour.

use std::collections::HashMap;

use hive_core::error::HiveError;
use hive_core::identity::{Address, Asset};
use hive_core::traits::{
    AssetTransfer, BlockClock, LiquidityProceeds, LiquidityRouter, Minter, RemoveLiquidity,
    Transactional,
};

/// Underlying assets returned per LP token burned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpRedemption {
    pub principal_per_lp: u128,
    pub paired_per_lp: u128,
}

impl Default for LpRedemption {
    fn default() -> Self {
        Self {
            principal_per_lp: 2,
            paired_per_lp: 1,
        }
    }
}

/// Everything a rollback restores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    accounts: HashMap<(Address, Asset), u128>,
    custody: HashMap<Asset, u128>,
    total_minted: u128,
}

#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    transfer: bool,
    mint: bool,
    liquidity_removal: bool,
}

/// In-memory implementation of [`hive_core::Host`].
#[derive(Debug, Clone, Default)]
pub struct SandboxHost {
    block: u64,
    balances: Balances,
    redemption: LpRedemption,
    faults: Faults,
}

impl SandboxHost {
    /// Empty host at block 0 with the default redemption rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with a custom LP redemption rate.
    pub fn with_redemption(redemption: LpRedemption) -> Self {
        Self {
            redemption,
            ..Self::default()
        }
    }

    /// Credit an account out of thin air (test and scenario setup).
    pub fn fund(&mut self, account: &Address, asset: Asset, amount: u128) {
        let balance = self.balances.accounts.entry((*account, asset)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Balance of `asset` held by `account`.
    pub fn balance(&self, account: &Address, asset: Asset) -> u128 {
        self.balances
            .accounts
            .get(&(*account, asset))
            .copied()
            .unwrap_or(0)
    }

    /// Amount of `asset` held in ledger custody.
    pub fn custody(&self, asset: Asset) -> u128 {
        self.balances.custody.get(&asset).copied().unwrap_or(0)
    }

    /// Total HONEY minted through this host.
    pub fn total_minted(&self) -> u128 {
        self.balances.total_minted
    }

    /// Jump to an absolute block.
    pub fn set_block(&mut self, block: u64) {
        self.block = block;
    }

    /// Move the block counter forward.
    pub fn advance_blocks(&mut self, blocks: u64) {
        self.block = self.block.saturating_add(blocks);
    }

    /// Make the next transfer (in or out) fail.
    pub fn fail_next_transfer(&mut self) {
        self.faults.transfer = true;
    }

    /// Make the next mint fail.
    pub fn fail_next_mint(&mut self) {
        self.faults.mint = true;
    }

    /// Make the next liquidity removal fail.
    pub fn fail_next_liquidity_removal(&mut self) {
        self.faults.liquidity_removal = true;
    }

    fn debit_account(
        &mut self,
        account: &Address,
        asset: Asset,
        amount: u128,
    ) -> Result<(), HiveError> {
        let available = self.balance(account, asset);
        if available < amount {
            return Err(HiveError::TransferFailed(format!(
                "{} holds {} {} but {} was requested",
                account.short(),
                available,
                asset,
                amount
            )));
        }
        self.balances
            .accounts
            .insert((*account, asset), available - amount);
        Ok(())
    }

    fn debit_custody(&mut self, asset: Asset, amount: u128) -> Result<(), HiveError> {
        let available = self.custody(asset);
        if available < amount {
            return Err(HiveError::TransferFailed(format!(
                "custody holds {} {} but {} was requested",
                available, asset, amount
            )));
        }
        self.balances.custody.insert(asset, available - amount);
        Ok(())
    }

    fn credit_custody(&mut self, asset: Asset, amount: u128) -> Result<(), HiveError> {
        let held = self.balances.custody.entry(asset).or_insert(0);
        *held = held.checked_add(amount).ok_or(HiveError::ArithmeticOverflow)?;
        Ok(())
    }

    fn credit_account(
        &mut self,
        account: &Address,
        asset: Asset,
        amount: u128,
    ) -> Result<(), HiveError> {
        let held = self.balances.accounts.entry((*account, asset)).or_insert(0);
        *held = held.checked_add(amount).ok_or(HiveError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl BlockClock for SandboxHost {
    fn block_number(&self) -> u64 {
        self.block
    }
}

impl AssetTransfer for SandboxHost {
    fn transfer_in(&mut self, asset: Asset, from: &Address, amount: u128) -> Result<(), HiveError> {
        if std::mem::take(&mut self.faults.transfer) {
            return Err(HiveError::TransferFailed("injected fault".to_string()));
        }
        self.debit_account(from, asset, amount)?;
        self.credit_custody(asset, amount)
    }

    fn transfer_out(&mut self, asset: Asset, to: &Address, amount: u128) -> Result<(), HiveError> {
        if std::mem::take(&mut self.faults.transfer) {
            return Err(HiveError::TransferFailed("injected fault".to_string()));
        }
        self.debit_custody(asset, amount)?;
        self.credit_account(to, asset, amount)
    }
}

impl Minter for SandboxHost {
    fn mint(&mut self, amount: u128) -> Result<(), HiveError> {
        if std::mem::take(&mut self.faults.mint) {
            return Err(HiveError::MintFailed("injected fault".to_string()));
        }
        self.credit_custody(Asset::Honey, amount)?;
        self.balances.total_minted = self
            .balances
            .total_minted
            .checked_add(amount)
            .ok_or(HiveError::ArithmeticOverflow)?;
        Ok(())
    }
}

impl LiquidityRouter for SandboxHost {
    fn remove_liquidity(
        &mut self,
        request: RemoveLiquidity,
    ) -> Result<LiquidityProceeds, HiveError> {
        if std::mem::take(&mut self.faults.liquidity_removal) {
            return Err(HiveError::LiquidityRemovalFailed("injected fault".to_string()));
        }
        if self.block > request.deadline {
            return Err(HiveError::DeadlineExceeded {
                deadline: request.deadline,
                now: self.block,
            });
        }

        let proceeds = LiquidityProceeds {
            principal_out: request
                .lp_amount
                .checked_mul(self.redemption.principal_per_lp)
                .ok_or(HiveError::ArithmeticOverflow)?,
            paired_out: request
                .lp_amount
                .checked_mul(self.redemption.paired_per_lp)
                .ok_or(HiveError::ArithmeticOverflow)?,
        };
        if proceeds.principal_out < request.min_principal
            || proceeds.paired_out < request.min_paired
        {
            return Err(HiveError::LiquidityRemovalFailed(format!(
                "insufficient output: got ({}, {}), minimum ({}, {})",
                proceeds.principal_out,
                proceeds.paired_out,
                request.min_principal,
                request.min_paired
            )));
        }

        self.debit_custody(Asset::Lp, request.lp_amount)
            .map_err(|e| HiveError::LiquidityRemovalFailed(e.to_string()))?;
        self.credit_account(&request.to, Asset::Honey, proceeds.principal_out)?;
        self.credit_account(&request.to, Asset::Paired, proceeds.paired_out)?;
        Ok(proceeds)
    }
}

impl Transactional for SandboxHost {
    type Checkpoint = Balances;

    fn checkpoint(&self) -> Balances {
        self.balances.clone()
    }

    fn rollback(&mut self, checkpoint: Balances) {
        self.balances = checkpoint;
    }
}
