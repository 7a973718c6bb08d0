//! Derived record types for rewarders and quarries.

use serde::{Deserialize, Serialize};

/// Decimals sentinel for a mint whose metadata could not be resolved from any
/// token list or from the chain.
pub const UNKNOWN_DECIMALS: i16 = -1;

/// A token referenced by the pipeline; identity is the mint address string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    pub mint: String,
    pub decimals: i16,
}

/// One quarry, joined with its staked-token metadata and replica classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarryMeta {
    pub quarry: String,
    pub index: u16,
    pub slug: String,
    pub staked_token: TokenMeta,
    pub is_replica: bool,
    /// The staked token of the primary quarry when `is_replica`, else the
    /// quarry's own staked token.
    pub primary_token: TokenMeta,
    /// Rewards tokens of every rewarder mining this quarry's primary mint or
    /// its replica, sorted by mint.
    pub reward_tokens: Vec<TokenMeta>,
}

/// One rewarder with its quarries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewarderMeta {
    pub authority: String,
    pub rewards_token: TokenMeta,
    pub mint_wrapper: String,
    pub quarries: Vec<QuarryMeta>,
}

/// [`RewarderMeta`] plus the known-rewarder info, when configured.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewarderMetaWithInfo<'a> {
    #[serde(flatten)]
    pub meta: &'a RewarderMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<&'a crate::quarry::known::RewarderInfo>,
}

/// Shortened display form of an address: first and last four characters.
/// Addresses are base58 in practice, but config-supplied strings may not be,
/// so truncation stays on char boundaries.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_forms() {
        assert_eq!(short_address("abcd"), "abcd");
        assert_eq!(
            short_address("Saber2gLauYim4Mvftnrasomsv6NvAuncvMEZwcLpD1"),
            "Sabe...LpD1"
        );
    }

    #[test]
    fn short_address_handles_multibyte_input() {
        // config files can carry arbitrary strings in address fields
        assert_eq!(short_address("токен-адрес"), "токе...дрес");
        assert_eq!(short_address("токен"), "токен");
    }

    #[test]
    fn token_meta_serializes_plain() {
        let meta = TokenMeta {
            mint: "mintA".to_string(),
            decimals: UNKNOWN_DECIMALS,
        };
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["mint"], "mintA");
        assert_eq!(v["decimals"], -1);
    }
}
