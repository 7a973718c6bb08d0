//! First-seen-wins merge of token lists into an address lookup.

use crate::tokens::lists::{TokenInfo, TokenListDoc};
use std::collections::HashMap;

/// Address → token metadata for one chain id.
///
/// For an address present in several lists the entry from the earliest list
/// wins. A missing address is an expected outcome, not an error; callers fall
/// back to on-chain mint decimals.
#[derive(Clone, Debug, Default)]
pub struct TokenResolver {
    by_address: HashMap<String, TokenInfo>,
}

impl TokenResolver {
    pub fn build(lists: &[TokenListDoc], chain_id: u32) -> Self {
        let mut by_address = HashMap::new();
        for token in lists.iter().flat_map(|list| list.tokens.iter()) {
            if token.chain_id != chain_id {
                continue;
            }
            by_address
                .entry(token.address.clone())
                .or_insert_with(|| token.clone());
        }
        Self { by_address }
    }

    pub fn get(&self, address: &str) -> Option<&TokenInfo> {
        self.by_address.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
