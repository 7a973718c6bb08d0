//! Per-network artifact layout on disk.
//!
//! All writes are whole-file overwrites under `data/<network>/`; parent
//! directories are created as needed. Callers only write after every fetch
//! and join has succeeded, so a failed run leaves no partial output.

use crate::build::TvlSummary;
use crate::chain::Network;
use crate::output::json::{to_sorted_pretty, WriteError};
use crate::quarry::known::RewarderInfo;
use crate::quarry::reconcile::Reconciled;
use crate::quarry::types::RewarderMetaWithInfo;
use crate::tokens::TokenListDoc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one network's artifacts beneath a data root.
pub struct NetworkWriter {
    dir: PathBuf,
}

impl NetworkWriter {
    pub fn new(data_dir: impl AsRef<Path>, network: Network) -> Self {
        Self {
            dir: data_dir.as_ref().join(network.name()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `value` as deterministic JSON at `rel` under the network dir.
    pub fn write_json<T: serde::Serialize>(
        &self,
        rel: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf, WriteError> {
        let path = self.dir.join(rel.as_ref());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, to_sorted_pretty(value)?)?;
        Ok(path)
    }

    /// The rewarder artifacts: top-level maps plus per-rewarder directories.
    pub fn write_rewarders(
        &self,
        reconciled: &Reconciled,
        known: &[RewarderInfo],
    ) -> Result<(), WriteError> {
        self.write_json("all-rewarders.json", &reconciled.rewarders)?;
        self.write_json("rewarders-by-mint.json", &reconciled.rewarders_by_mint)?;
        self.write_json("rewarder-list.json", &known)?;

        for (address, meta) in &reconciled.rewarders {
            let base = Path::new("rewarders").join(address);
            self.write_json(base.join("meta.json"), meta)?;
            let info = known.iter().find(|info| info.address == *address);
            if let Some(info) = info {
                self.write_json(base.join("info.json"), info)?;
            }
            self.write_json(
                base.join("full.json"),
                &RewarderMetaWithInfo { meta, info },
            )?;
            for quarry in &meta.quarries {
                self.write_json(
                    base.join("quarries").join(format!("{}.json", quarry.index)),
                    quarry,
                )?;
            }
        }
        info!(dir = %self.dir.display(), rewarders = reconciled.rewarders.len(), "wrote rewarder artifacts");
        Ok(())
    }

    pub fn write_token_list(&self, list: &TokenListDoc) -> Result<(), WriteError> {
        self.write_json("token-list.json", list)?;
        info!(dir = %self.dir.display(), tokens = list.tokens.len(), "wrote token list");
        Ok(())
    }

    pub fn write_tvl(&self, tvl: &TvlSummary) -> Result<(), WriteError> {
        self.write_json("tvl.json", tvl)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarry::types::{QuarryMeta, RewarderMeta, TokenMeta};
    use std::collections::BTreeMap;

    fn sample_reconciled() -> Reconciled {
        let staked = TokenMeta {
            mint: "mintA".to_string(),
            decimals: 6,
        };
        let meta = RewarderMeta {
            authority: "auth".to_string(),
            rewards_token: TokenMeta {
                mint: "reward".to_string(),
                decimals: 6,
            },
            mint_wrapper: "wrapper".to_string(),
            quarries: vec![QuarryMeta {
                quarry: "quarry1".to_string(),
                index: 0,
                slug: "sbr".to_string(),
                staked_token: staked.clone(),
                is_replica: false,
                primary_token: staked,
                reward_tokens: vec![],
            }],
        };
        let mut rewarders = BTreeMap::new();
        rewarders.insert("rewarder1".to_string(), meta);
        let mut rewarders_by_mint = BTreeMap::new();
        rewarders_by_mint.insert("mintA".to_string(), vec!["rewarder1".to_string()]);
        Reconciled {
            rewarders,
            rewarders_by_mint,
        }
    }

    #[test]
    fn writes_full_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = NetworkWriter::new(tmp.path(), Network::MainnetBeta);
        writer.write_rewarders(&sample_reconciled(), &[]).unwrap();
        writer.write_tvl(&TvlSummary::default()).unwrap();

        let base = tmp.path().join("mainnet-beta");
        for rel in [
            "all-rewarders.json",
            "rewarders-by-mint.json",
            "rewarder-list.json",
            "tvl.json",
            "rewarders/rewarder1/meta.json",
            "rewarders/rewarder1/full.json",
            "rewarders/rewarder1/quarries/0.json",
        ] {
            assert!(base.join(rel).is_file(), "missing {rel}");
        }
        // no info.json for an unknown rewarder
        assert!(!base.join("rewarders/rewarder1/info.json").exists());
    }

    #[test]
    fn rewrites_are_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = NetworkWriter::new(tmp.path(), Network::Devnet);
        let reconciled = sample_reconciled();
        writer.write_rewarders(&reconciled, &[]).unwrap();
        let path = tmp.path().join("devnet/all-rewarders.json");
        let first = std::fs::read_to_string(&path).unwrap();
        writer.write_rewarders(&reconciled, &[]).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("{\n  \""));
        assert!(first.ends_with('\n'));
    }
}
