//! rewarder_list — batch pipeline for Quarry rewarder and token metadata.
//!
//! Fetches rewarder and quarry accounts from the Quarry mine program,
//! cross-references them against hosted token lists, and derives the JSON
//! artifacts of the rewarder-list data repository: per-network rewarder
//! directories, a token list, and a TVL summary. Read-only; one linear
//! fetch → resolve → reconcile → build → write run per network.

pub mod build;
pub mod chain;
pub mod output;
pub mod quarry;
pub mod tokens;

pub use build::{build_token_list, build_tvl, BuildError, TokenListInputs, TvlSummary};
pub use chain::{FetchError, Fetcher, Network, ProgramState};
pub use output::{to_sorted_pretty, NetworkWriter, WriteError};
pub use quarry::{
    reconcile, KnownRewarders, QuarryMeta, Reconciled, ReconcileError, RewarderInfo, RewarderMeta,
    TokenMeta,
};
pub use tokens::{fetch_token_lists, TokenInfo, TokenListDoc, TokenListError, TokenResolver, TOKEN_LIST_URLS};
