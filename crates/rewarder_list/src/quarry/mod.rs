//! Quarry-specific domain types, known-rewarder config, and reconciliation.

pub mod known;
pub mod reconcile;
pub mod types;

pub use known::{ConfigError, KnownRewarders, RedeemerInfo, RedemptionMethod, RewarderInfo};
pub use reconcile::{reconcile, Reconciled, ReconcileError};
pub use types::{
    short_address, QuarryMeta, RewarderMeta, RewarderMetaWithInfo, TokenMeta, UNKNOWN_DECIMALS,
};
