// crates/hive-core/src/traits.rs
//
// Collaborators the staking ledger depends on but does not implement.
// A production host binds these to a token contract, a mint authority and an
// AMM router; hive-economics ships an in-memory SandboxHost.

use serde::{Deserialize, Serialize};

use crate::error::HiveError;
use crate::identity::{Address, Asset};

/// Read-only monotonic counter (block height).
pub trait BlockClock {
    /// Current block number.
    fn block_number(&self) -> u64;
}

/// Moves value between accounts and the ledger's custody.
///
/// Implementations fail with `HiveError::TransferFailed`.
pub trait AssetTransfer {
    /// Pull `amount` of `asset` from `from` into ledger custody.
    fn transfer_in(&mut self, asset: Asset, from: &Address, amount: u128) -> Result<(), HiveError>;

    /// Push `amount` of `asset` out of ledger custody to `to`.
    fn transfer_out(&mut self, asset: Asset, to: &Address, amount: u128) -> Result<(), HiveError>;
}

/// Mint authority for the staked asset. Minted tokens are credited to the
/// ledger's custody.
pub trait Minter {
    /// Implementations fail with `HiveError::MintFailed`.
    fn mint(&mut self, amount: u128) -> Result<(), HiveError>;
}

/// Arguments for an AMM liquidity removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    /// LP tokens to burn, taken from ledger custody.
    pub lp_amount: u128,
    /// Minimum HONEY out; the removal fails below this.
    pub min_principal: u128,
    /// Minimum paired asset out; the removal fails below this.
    pub min_paired: u128,
    /// Receiver of both proceeds.
    pub to: Address,
    /// Last block at which the removal may execute.
    pub deadline: u64,
}

/// Proceeds of a liquidity removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiquidityProceeds {
    /// HONEY returned.
    pub principal_out: u128,
    /// Paired asset returned.
    pub paired_out: u128,
}

/// External AMM router that redeems LP tokens for the underlying pair.
pub trait LiquidityRouter {
    /// Implementations fail with `HiveError::LiquidityRemovalFailed` or
    /// `HiveError::DeadlineExceeded`.
    fn remove_liquidity(
        &mut self,
        request: RemoveLiquidity,
    ) -> Result<LiquidityProceeds, HiveError>;
}

/// All-or-nothing support for the host's own side effects.
///
/// The ledger takes a checkpoint before each operation and rolls back to it
/// when any step fails, so collaborator calls that already succeeded are
/// undone together with the ledger's staged state.
pub trait Transactional {
    type Checkpoint;

    /// Capture the current host state.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Restore a previously captured state.
    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}

/// Everything a ledger operation needs from its environment.
pub trait Host: BlockClock + AssetTransfer + Minter + LiquidityRouter + Transactional {}

impl<T> Host for T where T: BlockClock + AssetTransfer + Minter + LiquidityRouter + Transactional {}
