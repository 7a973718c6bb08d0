//! Integration tests over token-list fixtures and synthetic chain state.

use rewarder_list::build::{
    build_token_list, build_tvl, dedupe_token_list, TokenListInputs, IOU_TAG, REPLICA_TAG,
};
use rewarder_list::chain::{
    find_replica_mint, Network, ProgramState, QuarryAccount, RewarderAccount,
};
use rewarder_list::output::NetworkWriter;
use rewarder_list::quarry::known::{RedeemerInfo, RedemptionMethod, RewarderInfo};
use rewarder_list::quarry::reconcile;
use rewarder_list::tokens::{TokenListDoc, TokenResolver};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

const SBR_MINT: &str = "Saber2gLauYim4Mvftnrasomsv6NvAuncvMEZwcLpD1";
const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
const LP_MINT: &str = "2poo1w1DL6yd2WNTCnNTzDqkC6MBXq7axo77P16yrBuf";

fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata");
    let full = root.join(path);
    let s =
        std::fs::read_to_string(&full).unwrap_or_else(|e| panic!("read {}: {}", full.display(), e));
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
}

fn rewarder(rewards_mint: Pubkey) -> RewarderAccount {
    RewarderAccount {
        authority: Pubkey::new_unique(),
        num_quarries: 0,
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

struct Scenario {
    state: ProgramState,
    r1: Pubkey,
    r2: Pubkey,
    iou_mint: Pubkey,
    replica_a: Pubkey,
    known: Vec<RewarderInfo>,
    chain_decimals: HashMap<String, u8>,
}

/// R1 mines SBR, SOL, and the USDT-USDC LP; R2 mines the replica of SBR and
/// pays rewards in an IOU token redeemable for SBR.
fn scenario() -> Scenario {
    let mint_a = Pubkey::from_str(SBR_MINT).unwrap();
    let mint_b = Pubkey::from_str(SOL_MINT).unwrap();
    let mint_lp = Pubkey::from_str(LP_MINT).unwrap();
    let replica_a = find_replica_mint(&mint_a);
    let iou_mint = Pubkey::new_unique();
    let r1 = Pubkey::new_unique();
    let r2 = Pubkey::new_unique();
    let state = ProgramState {
        rewarders: vec![(r1, rewarder(mint_a)), (r2, rewarder(iou_mint))],
        quarries: vec![
            (Pubkey::new_unique(), quarry(r1, mint_a, 0)),
            (Pubkey::new_unique(), quarry(r1, mint_b, 1)),
            (Pubkey::new_unique(), quarry(r1, mint_lp, 2)),
            (Pubkey::new_unique(), quarry(r2, replica_a, 0)),
        ],
    };
    let known = vec![RewarderInfo {
        id: "sunny".to_string(),
        name: "Sunny Aggregator".to_string(),
        address: r2.to_string(),
        networks: vec![Network::MainnetBeta],
        color: "#DC723F".to_string(),
        description: "Yield aggregator.".to_string(),
        website: "https://sunny.ag".to_string(),
        allow_quarry_mine: false,
        hidden: false,
        redeemer: Some(RedeemerInfo {
            underlying_token: SBR_MINT.to_string(),
            method: RedemptionMethod::Saber,
        }),
    }];
    let chain_decimals = HashMap::from([(iou_mint.to_string(), 6u8)]);
    Scenario {
        state,
        r1,
        r2,
        iou_mint,
        replica_a,
        known,
        chain_decimals,
    }
}

#[test]
fn fixture_token_list_parses() {
    let doc: TokenListDoc = load_fixture("token-list.json");
    assert_eq!(doc.name, "Fixture Token List");
    assert_eq!(doc.tokens.len(), 6);
    let lp = doc.tokens.iter().find(|t| t.address == LP_MINT).unwrap();
    let ext = lp.extensions.as_ref().unwrap();
    assert_eq!(ext.underlying_tokens.as_ref().unwrap().len(), 2);
}

#[test]
fn resolver_filters_fixture_by_chain() {
    let doc: TokenListDoc = load_fixture("token-list.json");
    let mainnet = TokenResolver::build(std::slice::from_ref(&doc), 101);
    assert_eq!(mainnet.get(SBR_MINT).unwrap().name, "Saber Protocol Token");
    let devnet = TokenResolver::build(std::slice::from_ref(&doc), 103);
    assert_eq!(
        devnet.get(SBR_MINT).unwrap().name,
        "Saber Protocol Token (Devnet)"
    );
    assert!(devnet.get(SOL_MINT).is_none());
}

#[test]
fn end_to_end_replica_grouping() {
    let sc = scenario();
    let doc: TokenListDoc = load_fixture("token-list.json");
    let resolver = TokenResolver::build(std::slice::from_ref(&doc), 101);
    let reconciled = reconcile(&sc.state, &resolver, &sc.chain_decimals).unwrap();

    assert_eq!(
        reconciled.rewarders_by_mint[SBR_MINT],
        vec![sc.r1.to_string()]
    );
    assert_eq!(
        reconciled.rewarders_by_mint[SOL_MINT],
        vec![sc.r1.to_string()]
    );
    assert_eq!(
        reconciled.rewarders_by_mint[&sc.replica_a.to_string()],
        vec![sc.r2.to_string()]
    );

    let r1_meta = &reconciled.rewarders[&sc.r1.to_string()];
    assert_eq!(r1_meta.quarries.len(), 3);
    assert_eq!(r1_meta.rewards_token.mint, SBR_MINT);
    assert_eq!(r1_meta.rewards_token.decimals, 6);
    let sbr_quarry = &r1_meta.quarries[0];
    assert!(!sbr_quarry.is_replica);
    assert_eq!(sbr_quarry.slug, "sbr");
    assert_eq!(sbr_quarry.primary_token, sbr_quarry.staked_token);

    let r2_meta = &reconciled.rewarders[&sc.r2.to_string()];
    let replica_quarry = &r2_meta.quarries[0];
    assert!(replica_quarry.is_replica);
    assert_eq!(replica_quarry.staked_token.mint, sc.replica_a.to_string());
    assert_eq!(replica_quarry.primary_token.mint, SBR_MINT);
    assert_eq!(replica_quarry.primary_token.decimals, 6);
    // IOU rewards token decimals come from the chain fallback
    assert_eq!(r2_meta.rewards_token.decimals, 6);

    // both quarries in the SBR group see both rewarders' rewards tokens
    let mut expected = vec![SBR_MINT.to_string(), sc.iou_mint.to_string()];
    expected.sort();
    for q in [sbr_quarry, replica_quarry] {
        let got: Vec<String> = q.reward_tokens.iter().map(|t| t.mint.clone()).collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn end_to_end_token_list() {
    let sc = scenario();
    let doc: TokenListDoc = load_fixture("token-list.json");
    let lists = vec![doc];
    let resolver = TokenResolver::build(&lists, 101);
    let reconciled = reconcile(&sc.state, &resolver, &sc.chain_decimals).unwrap();
    let list = build_token_list(&TokenListInputs {
        network: Network::MainnetBeta,
        lists: &lists,
        resolver: &resolver,
        rewarders: &reconciled.rewarders,
        rewarders_by_mint: &reconciled.rewarders_by_mint,
        known: &sc.known,
        chain_decimals: &sc.chain_decimals,
    })
    .unwrap();

    assert_eq!(list.name, "Quarry Token List (mainnet-beta)");
    assert!(list.tags.contains_key("saber-stableswap-lp"));

    // strictly ascending by address
    for pair in list.tokens.windows(2) {
        assert!(pair[0].address < pair[1].address);
    }
    // dedupe is idempotent on its own output
    assert_eq!(dedupe_token_list(list.tokens.clone()), list.tokens);

    let addresses: Vec<&str> = list.tokens.iter().map(|t| t.address.as_str()).collect();
    for mint in [SBR_MINT, SOL_MINT, LP_MINT] {
        assert!(addresses.contains(&mint), "missing {mint}");
    }
    // underlying tokens of the LP entry are pulled in
    assert!(addresses.contains(&"Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"));
    assert!(addresses.contains(&"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));

    let replica = list
        .tokens
        .iter()
        .find(|t| t.address == sc.replica_a.to_string())
        .expect("replica entry");
    assert_eq!(replica.symbol, "qrSBR");
    assert!(replica.tags.contains(&REPLICA_TAG.to_string()));
    let ext = replica.extensions.as_ref().unwrap();
    assert_eq!(
        ext.underlying_tokens,
        Some(vec![SBR_MINT.to_string()])
    );
    assert_eq!(ext.source.as_deref(), Some(REPLICA_TAG));

    let iou = list
        .tokens
        .iter()
        .find(|t| t.address == sc.iou_mint.to_string())
        .expect("iou entry");
    assert_eq!(iou.symbol, "iouSBR");
    assert_eq!(iou.decimals, 6);
    assert!(iou.tags.contains(&IOU_TAG.to_string()));
    let ext = iou.extensions.as_ref().unwrap();
    assert_eq!(ext.underlying_tokens, Some(vec![SBR_MINT.to_string()]));
    assert_eq!(ext.source.as_deref(), Some(IOU_TAG));
}

#[test]
fn end_to_end_write_layout() {
    let sc = scenario();
    let doc: TokenListDoc = load_fixture("token-list.json");
    let lists = vec![doc];
    let resolver = TokenResolver::build(&lists, 101);
    let reconciled = reconcile(&sc.state, &resolver, &sc.chain_decimals).unwrap();
    let list = build_token_list(&TokenListInputs {
        network: Network::MainnetBeta,
        lists: &lists,
        resolver: &resolver,
        rewarders: &reconciled.rewarders,
        rewarders_by_mint: &reconciled.rewarders_by_mint,
        known: &sc.known,
        chain_decimals: &sc.chain_decimals,
    })
    .unwrap();
    let tvl = build_tvl(&reconciled.rewarders);

    let tmp = tempfile::tempdir().unwrap();
    let writer = NetworkWriter::new(tmp.path(), Network::MainnetBeta);
    writer.write_rewarders(&reconciled, &sc.known).unwrap();
    writer.write_token_list(&list).unwrap();
    writer.write_tvl(&tvl).unwrap();

    let base = tmp.path().join("mainnet-beta");
    for rel in [
        "all-rewarders.json",
        "rewarder-list.json",
        "rewarders-by-mint.json",
        "token-list.json",
        "tvl.json",
    ] {
        assert!(base.join(rel).is_file(), "missing {rel}");
    }
    // per-rewarder directories, with info.json only for the known rewarder
    let r1_dir = base.join("rewarders").join(sc.r1.to_string());
    let r2_dir = base.join("rewarders").join(sc.r2.to_string());
    assert!(r1_dir.join("meta.json").is_file());
    assert!(r1_dir.join("full.json").is_file());
    assert!(r1_dir.join("quarries/0.json").is_file());
    assert!(r1_dir.join("quarries/2.json").is_file());
    assert!(!r1_dir.join("info.json").exists());
    assert!(r2_dir.join("info.json").is_file());

    // full.json of a known rewarder embeds the info block
    let full: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(r2_dir.join("full.json")).unwrap()).unwrap();
    assert_eq!(full["info"]["id"], "sunny");
    assert_eq!(full["rewardsToken"]["mint"], sc.iou_mint.to_string());

    // tvl groups the replica quarry under its own staked mint
    let tvl_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(base.join("tvl.json")).unwrap()).unwrap();
    assert!(tvl_json["quarriesByStakedMint"][sc.replica_a.to_string()].is_array());
}
