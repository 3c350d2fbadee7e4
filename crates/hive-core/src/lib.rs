// crates/hive-core/src/lib.rs
//
// hive-core: Core types, error taxonomy, and collaborator traits for the
// Hive staking ledger.
//
// This is the leaf crate of the workspace. It knows nothing about reward
// accounting; it only defines who the ledger talks to (token transfers,
// minting, liquidity removal, the block counter) and how failures surface.

pub mod error;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use hive_core::Address;`

pub use error::HiveError;
pub use identity::{Address, Asset};
pub use traits::{
    AssetTransfer, BlockClock, Host, LiquidityProceeds, LiquidityRouter, Minter,
    RemoveLiquidity, Transactional,
};
