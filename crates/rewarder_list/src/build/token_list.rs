//! Assembles the per-network Quarry token list.
//!
//! Every mint the rewarder data references must end up in the list: entries
//! come from the hosted lists where possible, otherwise they are synthesized —
//! replica tokens from their underlying token, IOU reward tokens from their
//! redemption target, and bare placeholders from on-chain mint decimals.

use crate::chain::{find_replica_mint_str, Network};
use crate::quarry::known::RewarderInfo;
use crate::quarry::types::{short_address, RewarderMeta, UNKNOWN_DECIMALS};
use crate::tokens::{TokenInfo, TokenListDoc, TokenResolver};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

/// Provenance tag for synthesized merge-mine replica tokens.
pub const REPLICA_TAG: &str = "quarry-merge-mine-replica";
/// Provenance tag for synthesized IOU reward tokens.
pub const IOU_TAG: &str = "quarry-iou";

const LIST_LOGO_URI: &str =
    "https://raw.githubusercontent.com/QuarryProtocol/rewarder-list/master/icon.png";

#[derive(Error, Debug)]
pub enum BuildError {
    /// A replica mint's underlying token resolved nowhere, not even as an
    /// on-chain placeholder. Internal-consistency assumption; aborts the run.
    #[error("replica mint {replica}: no metadata for underlying {underlying}")]
    MissingUnderlying { replica: String, underlying: String },
}

/// Everything the list builder consumes; all already fetched and joined.
pub struct TokenListInputs<'a> {
    pub network: Network,
    pub lists: &'a [TokenListDoc],
    pub resolver: &'a TokenResolver,
    pub rewarders: &'a BTreeMap<String, RewarderMeta>,
    pub rewarders_by_mint: &'a BTreeMap<String, Vec<String>>,
    pub known: &'a [RewarderInfo],
    /// On-chain decimals for mints absent from the hosted lists.
    pub chain_decimals: &'a HashMap<String, u8>,
}

/// Synthesize a replica-token entry from its primary token.
pub fn make_replica_token_info(replica_mint: &str, primary: &TokenInfo) -> TokenInfo {
    let mut extensions = primary.extensions.clone().unwrap_or_default();
    extensions.underlying_tokens = Some(vec![primary.address.clone()]);
    extensions.source = Some(REPLICA_TAG.to_string());
    let mut tags = primary.tags.clone();
    tags.push(REPLICA_TAG.to_string());
    TokenInfo {
        chain_id: primary.chain_id,
        address: replica_mint.to_string(),
        symbol: format!("qr{}", primary.symbol),
        name: format!("{} (Replica)", primary.name),
        decimals: primary.decimals,
        logo_uri: primary.logo_uri.clone(),
        tags,
        extensions: Some(extensions),
    }
}

/// Synthesize an IOU reward-token entry from the token it redeems for.
pub fn make_iou_token_info(iou_mint: &str, underlying: &TokenInfo) -> TokenInfo {
    let mut extensions = underlying.extensions.clone().unwrap_or_default();
    extensions.underlying_tokens = Some(vec![underlying.address.clone()]);
    extensions.source = Some(IOU_TAG.to_string());
    let mut tags = underlying.tags.clone();
    tags.push(IOU_TAG.to_string());
    TokenInfo {
        chain_id: underlying.chain_id,
        address: iou_mint.to_string(),
        symbol: format!("iou{}", underlying.symbol),
        name: format!("{} (IOU)", underlying.name),
        decimals: underlying.decimals,
        logo_uri: underlying.logo_uri.clone(),
        tags,
        extensions: Some(extensions),
    }
}

/// Placeholder entry for a mint known only from the chain.
fn make_fallback_token_info(mint: &str, chain_id: u32, decimals: Option<u8>) -> TokenInfo {
    let decimals = match decimals {
        Some(d) => i16::from(d),
        None => {
            warn!(mint, "mint unresolvable on-chain, recording unknown decimals");
            UNKNOWN_DECIMALS
        }
    };
    let symbol: String = mint.chars().take(5).collect();
    TokenInfo {
        chain_id,
        address: mint.to_string(),
        symbol,
        name: format!("Token {}", short_address(mint)),
        decimals,
        logo_uri: None,
        tags: vec![],
        extensions: None,
    }
}

/// Keep the first occurrence per address, then sort ascending by address.
/// Idempotent: applying it to its own output changes nothing.
pub fn dedupe_token_list(tokens: Vec<TokenInfo>) -> Vec<TokenInfo> {
    let mut seen = HashSet::new();
    let mut out: Vec<TokenInfo> = tokens
        .into_iter()
        .filter(|tok| seen.insert(tok.address.clone()))
        .collect();
    out.sort_by(|a, b| a.address.cmp(&b.address));
    out
}

/// Build the deduplicated, sorted token list for one network.
pub fn build_token_list(inputs: &TokenListInputs<'_>) -> Result<TokenListDoc, BuildError> {
    let chain_id = inputs.network.chain_id();

    // Every mint the rewarder data references, order-preserving dedupe:
    // redeemer underlyings, rewards tokens, staked mints.
    let mut all_mints: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |mint: &str, all_mints: &mut Vec<String>| {
        if seen.insert(mint.to_string()) {
            all_mints.push(mint.to_string());
        }
    };
    for info in inputs.known {
        if let Some(redeemer) = &info.redeemer {
            push(&redeemer.underlying_token, &mut all_mints);
        }
    }
    for meta in inputs.rewarders.values() {
        push(&meta.rewards_token.mint, &mut all_mints);
    }
    for mint in inputs.rewarders_by_mint.keys() {
        push(mint, &mut all_mints);
    }

    let mut resolved: Vec<TokenInfo> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for mint in &all_mints {
        match inputs.resolver.get(mint) {
            Some(info) => resolved.push(info.clone()),
            None => missing.push(mint.clone()),
        }
    }

    // Underlying tokens referenced by resolved entries.
    let underlying: Vec<TokenInfo> = resolved
        .iter()
        .filter_map(|tok| tok.extensions.as_ref())
        .filter_map(|ext| ext.underlying_tokens.as_ref())
        .flatten()
        .filter_map(|addr| inputs.resolver.get(addr).cloned())
        .collect();

    // Replica mint → underlying mint, restricted to mints we actually track.
    let mut replica_mappings: BTreeMap<String, String> = BTreeMap::new();
    for mint in &all_mints {
        let Some(replica) = find_replica_mint_str(mint) else {
            continue;
        };
        if replica != *mint && seen.contains(&replica) {
            replica_mappings
                .entry(replica)
                .or_insert_with(|| mint.clone());
        }
    }

    let mut list_replicas: Vec<TokenInfo> = Vec::new();
    let mut pending_replicas: Vec<(String, String)> = Vec::new();
    let mut placeholder_mints: Vec<String> = Vec::new();
    for mint in &missing {
        match replica_mappings.get(mint) {
            Some(primary_mint) => match inputs.resolver.get(primary_mint) {
                Some(primary) => list_replicas.push(make_replica_token_info(mint, primary)),
                None => pending_replicas.push((mint.clone(), primary_mint.clone())),
            },
            None => placeholder_mints.push(mint.clone()),
        }
    }

    // Mints known only from the chain become placeholder entries.
    let placeholders: Vec<TokenInfo> = placeholder_mints
        .iter()
        .map(|mint| {
            make_fallback_token_info(mint, chain_id, inputs.chain_decimals.get(mint).copied())
        })
        .collect();

    // Replicas whose underlying exists only as a placeholder.
    let mut placeholder_replicas: Vec<TokenInfo> = Vec::new();
    for (replica, primary_mint) in &pending_replicas {
        let primary = placeholders
            .iter()
            .find(|tok| tok.address == *primary_mint)
            .ok_or_else(|| BuildError::MissingUnderlying {
                replica: replica.clone(),
                underlying: primary_mint.clone(),
            })?;
        placeholder_replicas.push(make_replica_token_info(replica, primary));
    }

    // IOU reward tokens of known rewarders with a redeemer.
    let mut ious: Vec<TokenInfo> = Vec::new();
    for info in inputs.known {
        let Some(redeemer) = &info.redeemer else {
            continue;
        };
        let Some(meta) = inputs.rewarders.get(&info.address) else {
            warn!(rewarder = %info.address, "known rewarder not found on-chain");
            continue;
        };
        let iou_mint = &meta.rewards_token.mint;
        if inputs.resolver.contains(iou_mint) {
            continue;
        }
        match inputs.resolver.get(&redeemer.underlying_token) {
            Some(underlying) => ious.push(make_iou_token_info(iou_mint, underlying)),
            None => warn!(
                rewarder = %info.address,
                underlying = %redeemer.underlying_token,
                "redeemer underlying token not in any list, skipping IOU entry"
            ),
        }
    }

    // IOU entries go ahead of the bare placeholders so dedupe keeps the
    // richer synthesized entry for the same mint.
    let mut tokens = Vec::new();
    tokens.extend(resolved);
    tokens.extend(underlying);
    tokens.extend(list_replicas);
    tokens.extend(ious);
    tokens.extend(placeholders);
    tokens.extend(placeholder_replicas);
    let tokens = dedupe_token_list(tokens);

    let mut tags = serde_json::Map::new();
    for list in inputs.lists {
        tags.extend(list.tags.clone());
    }

    Ok(TokenListDoc {
        name: format!("Quarry Token List ({})", inputs.network),
        logo_uri: Some(LIST_LOGO_URI.to_string()),
        tags,
        timestamp: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        tokens,
    })
}
