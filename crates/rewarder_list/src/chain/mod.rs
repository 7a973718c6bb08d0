//! On-chain access: account layouts, program scans, PDA derivation.

pub mod accounts;
pub mod fetch;
pub mod replica;

pub use accounts::{DecodeError, MintAccount, QuarryAccount, RewarderAccount};
pub use fetch::{FetchError, Fetcher, Network, ProgramState, QUARRY_MINE_PROGRAM_ID};
pub use replica::{find_replica_mint, find_replica_mint_str, MERGE_MINE_PROGRAM_ID};
