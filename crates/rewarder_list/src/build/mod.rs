//! Derived artifact builders: the token list and the TVL summary.

pub mod token_list;
pub mod tvl;

pub use token_list::{
    build_token_list, dedupe_token_list, make_iou_token_info, make_replica_token_info, BuildError,
    TokenListInputs, IOU_TAG, REPLICA_TAG,
};
pub use tvl::{build_tvl, TvlSummary};
