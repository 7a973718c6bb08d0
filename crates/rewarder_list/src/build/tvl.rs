//! TVL summary: quarries grouped by staked mint.

use crate::quarry::types::RewarderMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contents of `tvl.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlSummary {
    /// Staked mint → quarry addresses, both sorted.
    pub quarries_by_staked_mint: BTreeMap<String, Vec<String>>,
}

/// Group every quarry by its staked mint.
pub fn build_tvl(rewarders: &BTreeMap<String, RewarderMeta>) -> TvlSummary {
    let mut quarries_by_staked_mint: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for meta in rewarders.values() {
        for quarry in &meta.quarries {
            quarries_by_staked_mint
                .entry(quarry.staked_token.mint.clone())
                .or_default()
                .push(quarry.quarry.clone());
        }
    }
    for quarries in quarries_by_staked_mint.values_mut() {
        quarries.sort();
        quarries.dedup();
    }
    TvlSummary {
        quarries_by_staked_mint,
    }
}
