//! Solana RPC access for the Quarry mine program.
//!
//! One `getProgramAccounts` scan per account kind, filtered server-side by
//! Anchor discriminator, plus chunked `getMultipleAccounts` lookups for mint
//! decimals. No retries and no cache: any RPC failure aborts the run.

use crate::chain::accounts::{DecodeError, MintAccount, QuarryAccount, RewarderAccount};
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Quarry mine program.
pub const QUARRY_MINE_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("QMNeHCGYnLVDn1icRAfQZpjPLBNkfGbSKRB83G5d8KB");

const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Env var overriding the mainnet RPC endpoint.
pub const RPC_URL_ENV: &str = "QUARRY_RPC_URL";

const RPC_TIMEOUT: Duration = Duration::from_secs(30);
const MINT_CHUNK: usize = 100;

/// Target Solana cluster.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    Devnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::MainnetBeta, Network::Devnet];

    /// Token-list chain id for this cluster.
    pub fn chain_id(self) -> u32 {
        match self {
            Network::MainnetBeta => 101,
            Network::Devnet => 103,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
        }
    }

    /// RPC endpoint; mainnet honors the `QUARRY_RPC_URL` override.
    pub fn rpc_url(self) -> String {
        match self {
            Network::MainnetBeta => {
                std::env::var(RPC_URL_ENV).unwrap_or_else(|_| MAINNET_RPC_URL.to_string())
            }
            Network::Devnet => DEVNET_RPC_URL.to_string(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("rpc: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),
    #[error("decode {kind} account {address}: {source}")]
    Decode {
        kind: &'static str,
        address: Pubkey,
        source: DecodeError,
    },
}

/// All rewarder and quarry accounts of the mine program, in fetch order.
#[derive(Clone, Debug, Default)]
pub struct ProgramState {
    pub rewarders: Vec<(Pubkey, RewarderAccount)>,
    pub quarries: Vec<(Pubkey, QuarryAccount)>,
}

impl ProgramState {
    /// Distinct staked-token mints across all quarries.
    pub fn staked_mints(&self) -> BTreeSet<Pubkey> {
        self.quarries.iter().map(|(_, q)| q.token_mint).collect()
    }

    /// Distinct rewards-token mints across all rewarders.
    pub fn rewards_mints(&self) -> BTreeSet<Pubkey> {
        self.rewarders
            .iter()
            .map(|(_, r)| r.rewards_token_mint)
            .collect()
    }
}

/// Read-only RPC fetcher for one network.
pub struct Fetcher {
    rpc: RpcClient,
    network: Network,
}

impl Fetcher {
    pub fn new(network: Network) -> Self {
        Self {
            rpc: RpcClient::new_with_timeout(network.rpc_url(), RPC_TIMEOUT),
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn program_accounts(
        &self,
        account_name: &'static str,
    ) -> Result<Vec<(Pubkey, Account)>, FetchError> {
        let filters = vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
            0,
            crate::chain::accounts::discriminator(account_name).to_vec(),
        ))];
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: None,
                commitment: None,
                min_context_slot: None,
            },
            with_context: Some(false),
            sort_results: None,
        };
        let accounts = self
            .rpc
            .get_program_accounts_with_config(&QUARRY_MINE_PROGRAM_ID, config)
            .await?;
        Ok(accounts)
    }

    /// All `Rewarder` accounts of the mine program.
    pub async fn fetch_rewarders(&self) -> Result<Vec<(Pubkey, RewarderAccount)>, FetchError> {
        let raw = self.program_accounts(RewarderAccount::ACCOUNT_NAME).await?;
        let mut rewarders = Vec::with_capacity(raw.len());
        for (address, account) in raw {
            let rewarder =
                RewarderAccount::decode(&account.data).map_err(|source| FetchError::Decode {
                    kind: RewarderAccount::ACCOUNT_NAME,
                    address,
                    source,
                })?;
            rewarders.push((address, rewarder));
        }
        info!(network = %self.network, count = rewarders.len(), "fetched rewarders");
        Ok(rewarders)
    }

    /// All `Quarry` accounts of the mine program.
    pub async fn fetch_quarries(&self) -> Result<Vec<(Pubkey, QuarryAccount)>, FetchError> {
        let raw = self.program_accounts(QuarryAccount::ACCOUNT_NAME).await?;
        let mut quarries = Vec::with_capacity(raw.len());
        for (address, account) in raw {
            let quarry =
                QuarryAccount::decode(&account.data).map_err(|source| FetchError::Decode {
                    kind: QuarryAccount::ACCOUNT_NAME,
                    address,
                    source,
                })?;
            quarries.push((address, quarry));
        }
        info!(network = %self.network, count = quarries.len(), "fetched quarries");
        Ok(quarries)
    }

    /// Rewarder and quarry scans issued concurrently.
    pub async fn fetch_program_state(&self) -> Result<ProgramState, FetchError> {
        let (rewarders, quarries) =
            futures::future::try_join(self.fetch_rewarders(), self.fetch_quarries()).await?;
        Ok(ProgramState {
            rewarders,
            quarries,
        })
    }

    /// On-chain decimals for every referenced mint absent from `resolver`:
    /// staked and rewards mints plus `extra_mints` (redeemer underlying
    /// tokens from the known-rewarder config).
    pub async fn fetch_missing_mint_decimals(
        &self,
        state: &ProgramState,
        resolver: &crate::tokens::TokenResolver,
        extra_mints: &[String],
    ) -> Result<HashMap<String, u8>, FetchError> {
        let mut missing: BTreeSet<Pubkey> = BTreeSet::new();
        for mint in state.staked_mints().into_iter().chain(state.rewards_mints()) {
            if !resolver.contains(&mint.to_string()) {
                missing.insert(mint);
            }
        }
        for mint in extra_mints {
            if resolver.contains(mint) {
                continue;
            }
            match Pubkey::from_str(mint) {
                Ok(key) => {
                    missing.insert(key);
                }
                Err(_) => warn!(mint, "invalid mint address in config"),
            }
        }
        let mints: Vec<Pubkey> = missing.into_iter().collect();
        self.fetch_mint_decimals(&mints).await
    }

    /// On-chain decimals for `mints`, fetched in chunks of 100.
    ///
    /// A missing or undecodable mint account leaves no entry in the map; the
    /// caller treats that as the unknown-decimals case.
    pub async fn fetch_mint_decimals(
        &self,
        mints: &[Pubkey],
    ) -> Result<HashMap<String, u8>, FetchError> {
        let mut decimals = HashMap::with_capacity(mints.len());
        for chunk in mints.chunks(MINT_CHUNK) {
            let accounts = self.rpc.get_multiple_accounts(chunk).await?;
            for (mint, account) in chunk.iter().zip(accounts) {
                match account {
                    Some(account) => match MintAccount::decode(&account.data) {
                        Ok(parsed) => {
                            decimals.insert(mint.to_string(), parsed.decimals);
                        }
                        Err(err) => warn!(%mint, %err, "undecodable mint account"),
                    },
                    None => warn!(%mint, "mint account not found"),
                }
            }
        }
        Ok(decimals)
    }
}
