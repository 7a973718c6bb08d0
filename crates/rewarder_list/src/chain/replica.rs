//! Replica-mint derivation for the Quarry merge-mine program.
//!
//! A primary mint's merge pool is the PDA of `["MergePool", primary_mint]`;
//! the pool's replica mint is the PDA of `["ReplicaMint", pool]`. Both live
//! under the merge-mine program, so the mapping is a pure function of the
//! primary mint.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Quarry merge-mine program.
pub const MERGE_MINE_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("QMMD16kjauP5knBwxNUJRZ1Z5o3deBuFrqVjBVmmqto");

/// Derive the merge pool address for a primary mint.
pub fn find_merge_pool(primary_mint: &Pubkey) -> Pubkey {
    let (pool, _bump) = Pubkey::find_program_address(
        &[b"MergePool", primary_mint.as_ref()],
        &MERGE_MINE_PROGRAM_ID,
    );
    pool
}

/// Derive the replica mint for a primary mint.
pub fn find_replica_mint(primary_mint: &Pubkey) -> Pubkey {
    let pool = find_merge_pool(primary_mint);
    let (replica, _bump) =
        Pubkey::find_program_address(&[b"ReplicaMint", pool.as_ref()], &MERGE_MINE_PROGRAM_ID);
    replica
}

/// String form of [`find_replica_mint`]; `None` when the input is not a valid address.
pub fn find_replica_mint_str(primary_mint: &str) -> Option<String> {
    let mint = Pubkey::from_str(primary_mint).ok()?;
    Some(find_replica_mint(&mint).to_string())
}
