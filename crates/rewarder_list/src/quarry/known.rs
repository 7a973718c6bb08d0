//! Known-rewarder configuration, bundled as `Rewarders.toml`.
//!
//! Rewarders listed here show up as verified, with a display name, color, and
//! description. Load order: env `REWARDERS_CONFIG_PATH`, then
//! `./Rewarders.toml`, then `./config/Rewarders.toml`; a missing file yields
//! an empty table.

use crate::chain::Network;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Env var pointing at an alternate `Rewarders.toml`.
pub const CONFIG_PATH_ENV: &str = "REWARDERS_CONFIG_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// How an IOU rewards token is redeemed for its underlying token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedemptionMethod {
    QuarryRedeemer,
    Saber,
    Sunny,
    Marinade,
}

/// Redemption info for a rewarder paying out in an IOU token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemerInfo {
    /// Mint of the underlying reward token.
    pub underlying_token: String,
    pub method: RedemptionMethod,
}

/// A curated rewarder entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewarderInfo {
    /// URL slug (kebab-case) identifying this rewarder.
    pub id: String,
    pub name: String,
    pub address: String,
    /// Networks this rewarder is deployed on.
    pub networks: Vec<Network>,
    /// Display color; should look good on dark backgrounds.
    pub color: String,
    pub description: String,
    pub website: String,
    /// Allows pools of this rewarder to be mined via Quarry.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_quarry_mine: bool,
    /// Hidden from the main farming page.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemer: Option<RedeemerInfo>,
}

/// The full known-rewarder table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownRewarders {
    #[serde(default)]
    pub rewarders: Vec<RewarderInfo>,
}

impl KnownRewarders {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from the standard locations; empty table when nothing is found.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let p = Path::new(&path);
            if p.exists() {
                return Self::load_from_path(p).unwrap_or_default();
            }
        }
        for candidate in [Path::new("./Rewarders.toml"), Path::new("./config/Rewarders.toml")] {
            if candidate.exists() {
                return Self::load_from_path(candidate).unwrap_or_default();
            }
        }
        Self::default()
    }

    /// Entries deployed on `network`.
    pub fn for_network(&self, network: Network) -> Vec<RewarderInfo> {
        self.rewarders
            .iter()
            .filter(|info| info.networks.contains(&network))
            .cloned()
            .collect()
    }

    pub fn get(&self, address: &str) -> Option<&RewarderInfo> {
        self.rewarders.iter().find(|info| info.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[rewarders]]
id = "saber"
name = "Saber"
address = "rXhAofQCT7NN9TUqigyEAUzV1uLL4boeD8CRkNBSkYk"
networks = ["mainnet-beta"]
color = "#6966FB"
description = "Cross-chain liquidity exchange."
website = "https://saber.so"

[rewarders.redeemer]
underlyingToken = "Saber2gLauYim4Mvftnrasomsv6NvAuncvMEZwcLpD1"
method = "saber"

[[rewarders]]
id = "devnet-test"
name = "Devnet Test"
address = "TESTxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx"
networks = ["devnet"]
color = "#FFFFFF"
description = "Test rewarder."
website = "https://example.com"
hidden = true
"#;

    #[test]
    fn parses_sample_table() {
        let known: KnownRewarders = toml::from_str(SAMPLE).unwrap();
        assert_eq!(known.rewarders.len(), 2);
        let saber = known.get("rXhAofQCT7NN9TUqigyEAUzV1uLL4boeD8CRkNBSkYk").unwrap();
        assert_eq!(saber.id, "saber");
        assert_eq!(
            saber.redeemer.as_ref().unwrap().method,
            RedemptionMethod::Saber
        );
        assert!(!saber.hidden);
        assert!(known.rewarders[1].hidden);
    }

    #[test]
    fn network_filter() {
        let known: KnownRewarders = toml::from_str(SAMPLE).unwrap();
        let mainnet = known.for_network(Network::MainnetBeta);
        assert_eq!(mainnet.len(), 1);
        assert_eq!(mainnet[0].id, "saber");
        let devnet = known.for_network(Network::Devnet);
        assert_eq!(devnet.len(), 1);
        assert_eq!(devnet[0].id, "devnet-test");
    }

    #[test]
    fn default_flags_not_serialized() {
        let known: KnownRewarders = toml::from_str(SAMPLE).unwrap();
        let v = serde_json::to_value(&known.rewarders[0]).unwrap();
        assert!(v.get("allowQuarryMine").is_none());
        assert!(v.get("hidden").is_none());
        assert_eq!(v["redeemer"]["underlyingToken"], "Saber2gLauYim4Mvftnrasomsv6NvAuncvMEZwcLpD1");
    }
}
