use thiserror::Error;

/// Error taxonomy for the Hive staking ledger.
///
/// Every variant aborts the whole enclosing operation. Nothing is partially
/// applied and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HiveError {
    /// Zero amount where a positive amount is required.
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Withdrawal or claim exceeds the caller's entitlement.
    #[error("Insufficient balance: requested {requested} but only {available} available")]
    InsufficientBalance { requested: u128, available: u128 },

    /// Honey reward injected while nothing is staked.
    #[error("No stakers: cannot distribute rewards with zero total stake")]
    NoStakers,

    /// Malformed emission schedule.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Block range queried backwards.
    #[error("Invalid range: from block {from} is after to block {to}")]
    InvalidRange { from: u64, to: u64 },

    /// Caller does not hold the updater capability for this ledger.
    #[error("Unauthorized: updater capability does not belong to this ledger")]
    Unauthorized,

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Asset transfer collaborator failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Mint collaborator failed.
    #[error("Mint failed: {0}")]
    MintFailed(String),

    /// Liquidity router failed to remove liquidity.
    #[error("Liquidity removal failed: {0}")]
    LiquidityRemovalFailed(String),

    /// Liquidity removal was attempted after its deadline.
    #[error("Deadline exceeded: deadline block {deadline}, current block {now}")]
    DeadlineExceeded { deadline: u64, now: u64 },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for HiveError {
    fn from(e: serde_json::Error) -> Self {
        HiveError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for HiveError {
    fn from(e: toml::de::Error) -> Self {
        HiveError::Config(e.to_string())
    }
}
