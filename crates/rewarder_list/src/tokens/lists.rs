//! Hosted token-list documents and their HTTP fetch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Token lists consulted on every run, in priority order: for an address
/// present in several lists, the earliest list wins.
pub const TOKEN_LIST_URLS: &[&str] = &[
    "https://raw.githubusercontent.com/solana-labs/token-list/main/src/tokens/solana.tokenlist.json",
    "https://raw.githubusercontent.com/saber-hq/saber-lp-token-list/master/lists/saber-lp.token-list.json",
    "https://cdn.jsdelivr.net/gh/CLBExchange/certified-token-list/101/certified.token-list.json",
];

#[derive(Error, Debug)]
pub enum TokenListError {
    #[error("http client: {0}")]
    Client(reqwest::Error),
    #[error("fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// Extra fields a token-list entry may carry. Unknown keys (website, twitter,
/// coingecko ids, ...) pass through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExtensions {
    /// Addresses this token wraps or is redeemable for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying_tokens: Option<Vec<String>>,
    /// Provenance tag for entries synthesized by this pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// One token-list entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub chain_id: u32,
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: i16,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<TokenExtensions>,
}

/// A hosted token-list document: `{ name, tags?, tokens: [...] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListDoc {
    pub name: String,
    #[serde(rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub tags: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub tokens: Vec<TokenInfo>,
}

/// Fetch every configured token list concurrently. A single failure fails the
/// whole batch; results come back in `urls` order.
pub async fn fetch_token_lists(urls: &[&str]) -> Result<Vec<TokenListDoc>, TokenListError> {
    let client = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(TokenListError::Client)?;
    let client = &client;
    let fetches = urls.iter().map(|url| {
        let url = (*url).to_string();
        async move {
            let doc: TokenListDoc = client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| TokenListError::Http {
                    url: url.clone(),
                    source,
                })?
                .json()
                .await
                .map_err(|source| TokenListError::Http {
                    url: url.clone(),
                    source,
                })?;
            info!(%url, tokens = doc.tokens.len(), "fetched token list");
            Ok(doc)
        }
    });
    futures::future::try_join_all(fetches).await
}
