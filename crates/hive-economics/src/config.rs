// crates/hive-economics/src/config.rs
//
// Ledger configuration: the emission schedule plus the liquidity-removal
// guards used when paying out LP rewards.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use crate::emission::EmissionSchedule;
use crate::token::deserialize_units;
use hive_core::error::HiveError;

/// Runtime configuration for a `StakingLedger`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Emission schedule of the minting stream.
    #[serde(default)]
    pub schedule: EmissionSchedule,

    /// Minimum HONEY the router must return when LP is redeemed.
    /// The deployed value of 1 leaves slippage effectively unguarded.
    #[serde(default = "default_min_out", deserialize_with = "deserialize_units")]
    pub min_principal_out: u128,

    /// Minimum paired asset the router must return when LP is redeemed.
    #[serde(default = "default_min_out", deserialize_with = "deserialize_units")]
    pub min_paired_out: u128,

    /// Blocks after the claim block during which the removal may execute.
    #[serde(default = "default_liquidity_deadline_blocks")]
    pub liquidity_deadline_blocks: u64,
}

fn default_min_out() -> u128 {
    1
}

fn default_liquidity_deadline_blocks() -> u64 {
    20
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            schedule: EmissionSchedule::default(),
            min_principal_out: default_min_out(),
            min_paired_out: default_min_out(),
            liquidity_deadline_blocks: default_liquidity_deadline_blocks(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// # Errors
    /// Returns `HiveError::Config` if the file cannot be read or parsed, and
    /// `HiveError::InvalidSchedule` if the schedule is malformed.
    pub fn load(path: &str) -> Result<Self, HiveError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| HiveError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, HiveError> {
        let config: LedgerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), HiveError> {
        self.schedule.validate()
    }
}
