//! Joins on-chain rewarder and quarry accounts with token metadata and
//! classifies each quarry as primary or replica.
//!
//! A quarry is a replica when some other quarry's staked mint, passed through
//! the merge-mine replica derivation, equals this quarry's staked mint. All
//! orderings are pinned to address/index sort so output is stable across runs
//! regardless of RPC result order.

use crate::chain::accounts::{QuarryAccount, RewarderAccount};
use crate::chain::{find_replica_mint_str, ProgramState};
use crate::quarry::types::{short_address, QuarryMeta, RewarderMeta, TokenMeta, UNKNOWN_DECIMALS};
use crate::tokens::TokenResolver;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A quarry claims a rewarder the program scan did not return. This is a
    /// data-integrity bug, not a recoverable condition.
    #[error("quarry {quarry} references unknown rewarder {rewarder}")]
    UnknownRewarder { quarry: String, rewarder: String },
}

/// Output of the reconciliation join.
#[derive(Clone, Debug, Default)]
pub struct Reconciled {
    /// Rewarder address → meta, sorted by address.
    pub rewarders: BTreeMap<String, RewarderMeta>,
    /// Staked mint → rewarder addresses mining it, both sorted.
    pub rewarders_by_mint: BTreeMap<String, Vec<String>>,
}

/// Kebab-case slug from a token symbol or other display string.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Join `state` against resolved token metadata.
///
/// `chain_decimals` holds on-chain mint decimals for mints absent from the
/// token lists; a mint found in neither gets the [`UNKNOWN_DECIMALS`] sentinel
/// and a warning.
pub fn reconcile(
    state: &ProgramState,
    resolver: &TokenResolver,
    chain_decimals: &HashMap<String, u8>,
) -> Result<Reconciled, ReconcileError> {
    let rewarder_accounts: BTreeMap<String, &RewarderAccount> = state
        .rewarders
        .iter()
        .map(|(address, account)| (address.to_string(), account))
        .collect();

    // Quarries in address order; every downstream tie-break inherits it.
    let mut quarries: Vec<(String, &QuarryAccount)> = state
        .quarries
        .iter()
        .map(|(address, account)| (address.to_string(), account))
        .collect();
    quarries.sort_by(|a, b| a.0.cmp(&b.0));

    for (quarry_addr, quarry) in &quarries {
        let rewarder = quarry.rewarder.to_string();
        if !rewarder_accounts.contains_key(&rewarder) {
            return Err(ReconcileError::UnknownRewarder {
                quarry: quarry_addr.clone(),
                rewarder,
            });
        }
    }

    // Staked mint → (quarry, rewarder) pairs, address order preserved.
    let mut by_staked_mint: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for (quarry_addr, quarry) in &quarries {
        by_staked_mint
            .entry(quarry.token_mint.to_string())
            .or_default()
            .push((quarry_addr.clone(), quarry.rewarder.to_string()));
    }

    // Replica mint → primary mint. Mints iterate in sorted order, so when
    // several primaries could claim a replica the smallest mint wins.
    let staked_mints: BTreeSet<&String> = by_staked_mint.keys().collect();
    let mut replica_to_primary: BTreeMap<String, String> = BTreeMap::new();
    for mint in by_staked_mint.keys() {
        let Some(replica) = find_replica_mint_str(mint) else {
            continue;
        };
        if replica != *mint && staked_mints.contains(&replica) {
            replica_to_primary
                .entry(replica)
                .or_insert_with(|| mint.clone());
        }
    }

    let token_meta = |mint: &str| -> TokenMeta {
        let decimals = resolver
            .get(mint)
            .map(|info| info.decimals)
            .or_else(|| chain_decimals.get(mint).map(|d| i16::from(*d)))
            .unwrap_or_else(|| {
                warn!(mint, "no metadata for mint, recording unknown decimals");
                UNKNOWN_DECIMALS
            });
        TokenMeta {
            mint: mint.to_string(),
            decimals,
        }
    };

    let slug_for = |mint: &str| -> String {
        resolver
            .get(mint)
            .map(|info| slugify(&info.symbol))
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| slugify(&short_address(mint)))
    };

    // Rewards tokens of every rewarder mining a mint in the group formed by
    // the primary mint and its replica.
    let reward_tokens_for = |primary_mint: &str| -> Vec<TokenMeta> {
        let mut group = vec![primary_mint.to_string()];
        if let Some(replica) = find_replica_mint_str(primary_mint) {
            if staked_mints.contains(&replica) {
                group.push(replica);
            }
        }
        let mut reward_mints = BTreeSet::new();
        for mint in &group {
            if let Some(entries) = by_staked_mint.get(mint) {
                for (_, rewarder_addr) in entries {
                    if let Some(account) = rewarder_accounts.get(rewarder_addr) {
                        reward_mints.insert(account.rewards_token_mint.to_string());
                    }
                }
            }
        }
        reward_mints.iter().map(|mint| token_meta(mint)).collect()
    };

    // Per-rewarder assembly.
    let mut quarries_by_rewarder: BTreeMap<String, Vec<QuarryMeta>> = BTreeMap::new();
    for (quarry_addr, quarry) in &quarries {
        let staked_mint = quarry.token_mint.to_string();
        let staked_token = token_meta(&staked_mint);
        let primary_mint = replica_to_primary
            .get(&staked_mint)
            .cloned()
            .unwrap_or_else(|| staked_mint.clone());
        let is_replica = primary_mint != staked_mint;
        let primary_token = if is_replica {
            token_meta(&primary_mint)
        } else {
            staked_token.clone()
        };
        quarries_by_rewarder
            .entry(quarry.rewarder.to_string())
            .or_default()
            .push(QuarryMeta {
                quarry: quarry_addr.clone(),
                index: quarry.index,
                slug: slug_for(&staked_mint),
                staked_token,
                is_replica,
                primary_token,
                reward_tokens: reward_tokens_for(&primary_mint),
            });
    }

    let mut rewarders = BTreeMap::new();
    for (address, account) in &rewarder_accounts {
        let mut metas = quarries_by_rewarder.remove(address).unwrap_or_default();
        metas.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.quarry.cmp(&b.quarry)));
        rewarders.insert(
            address.clone(),
            RewarderMeta {
                authority: account.authority.to_string(),
                rewards_token: token_meta(&account.rewards_token_mint.to_string()),
                mint_wrapper: account.mint_wrapper.to_string(),
                quarries: metas,
            },
        );
    }

    let mut rewarders_by_mint = BTreeMap::new();
    for (mint, entries) in &by_staked_mint {
        let addrs: BTreeSet<String> = entries.iter().map(|(_, r)| r.clone()).collect();
        rewarders_by_mint.insert(mint.clone(), addrs.into_iter().collect::<Vec<_>>());
    }

    Ok(Reconciled {
        rewarders,
        rewarders_by_mint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::find_replica_mint;
    use solana_sdk::pubkey::Pubkey;

    fn rewarder(rewards_mint: Pubkey) -> RewarderAccount {
        RewarderAccount {
            authority: Pubkey::new_unique(),
            num_quarries: 1,
            annual_rewards_rate: 0,
            mint_wrapper: Pubkey::new_unique(),
            rewards_token_mint: rewards_mint,
            is_paused: false,
        }
    }

    fn quarry(rewarder: Pubkey, mint: Pubkey, index: u16) -> QuarryAccount {
        QuarryAccount {
            rewarder,
            token_mint: mint,
            index,
            token_mint_decimals: 0,
            annual_rewards_rate: 0,
            rewards_share: 0,
            total_tokens_deposited: 0,
            num_miners: 0,
        }
    }

    #[test]
    fn replica_quarry_classified() {
        let mint_a = Pubkey::new_unique();
        let replica_a = find_replica_mint(&mint_a);
        let reward_1 = Pubkey::new_unique();
        let reward_2 = Pubkey::new_unique();
        let r1 = Pubkey::new_unique();
        let r2 = Pubkey::new_unique();
        let state = ProgramState {
            rewarders: vec![(r1, rewarder(reward_1)), (r2, rewarder(reward_2))],
            quarries: vec![
                (Pubkey::new_unique(), quarry(r1, mint_a, 0)),
                (Pubkey::new_unique(), quarry(r2, replica_a, 0)),
            ],
        };
        let chain_decimals =
            HashMap::from([(mint_a.to_string(), 6u8), (replica_a.to_string(), 6u8)]);
        let out = reconcile(&state, &TokenResolver::default(), &chain_decimals).unwrap();

        let r2_meta = &out.rewarders[&r2.to_string()];
        let q = &r2_meta.quarries[0];
        assert!(q.is_replica);
        assert_eq!(q.staked_token.mint, replica_a.to_string());
        assert_eq!(q.primary_token.mint, mint_a.to_string());
        assert_eq!(q.primary_token.decimals, 6);

        let r1_meta = &out.rewarders[&r1.to_string()];
        let q = &r1_meta.quarries[0];
        assert!(!q.is_replica);
        assert_eq!(q.primary_token, q.staked_token);

        // both quarries see both rewarders' rewards tokens through the group
        let mut expected: Vec<String> = vec![reward_1.to_string(), reward_2.to_string()];
        expected.sort();
        for meta in [r1_meta, r2_meta] {
            let got: Vec<String> = meta.quarries[0]
                .reward_tokens
                .iter()
                .map(|t| t.mint.clone())
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn rewarders_grouped_by_mint() {
        let mint_a = Pubkey::new_unique();
        let replica_a = find_replica_mint(&mint_a);
        let mint_b = Pubkey::new_unique();
        let r1 = Pubkey::new_unique();
        let r2 = Pubkey::new_unique();
        let state = ProgramState {
            rewarders: vec![
                (r1, rewarder(Pubkey::new_unique())),
                (r2, rewarder(Pubkey::new_unique())),
            ],
            quarries: vec![
                (Pubkey::new_unique(), quarry(r1, mint_a, 0)),
                (Pubkey::new_unique(), quarry(r1, mint_b, 1)),
                (Pubkey::new_unique(), quarry(r2, replica_a, 0)),
            ],
        };
        let out = reconcile(&state, &TokenResolver::default(), &HashMap::new()).unwrap();
        assert_eq!(out.rewarders_by_mint[&mint_a.to_string()], vec![r1.to_string()]);
        assert_eq!(out.rewarders_by_mint[&mint_b.to_string()], vec![r1.to_string()]);
        assert_eq!(
            out.rewarders_by_mint[&replica_a.to_string()],
            vec![r2.to_string()]
        );
    }

    #[test]
    fn unknown_rewarder_is_fatal() {
        let state = ProgramState {
            rewarders: vec![],
            quarries: vec![(
                Pubkey::new_unique(),
                quarry(Pubkey::new_unique(), Pubkey::new_unique(), 0),
            )],
        };
        let err = reconcile(&state, &TokenResolver::default(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownRewarder { .. }));
    }

    #[test]
    fn unresolvable_mint_gets_sentinel() {
        let r1 = Pubkey::new_unique();
        let state = ProgramState {
            rewarders: vec![(r1, rewarder(Pubkey::new_unique()))],
            quarries: vec![(Pubkey::new_unique(), quarry(r1, Pubkey::new_unique(), 0))],
        };
        let out = reconcile(&state, &TokenResolver::default(), &HashMap::new()).unwrap();
        let meta = &out.rewarders[&r1.to_string()];
        assert_eq!(meta.quarries[0].staked_token.decimals, UNKNOWN_DECIMALS);
        assert_eq!(meta.rewards_token.decimals, UNKNOWN_DECIMALS);
    }

    #[test]
    fn slugify_forms() {
        assert_eq!(slugify("SBR"), "sbr");
        assert_eq!(slugify("UST-USDC LP"), "ust-usdc-lp");
        assert_eq!(slugify("Sabe...LpD1"), "sabe-lpd1");
        assert_eq!(slugify("--"), "");
    }
}
