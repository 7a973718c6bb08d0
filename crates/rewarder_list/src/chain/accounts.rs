//! Account layouts for the Quarry mine program and SPL mints.
//!
//! Anchor accounts carry an 8-byte discriminator (`sha256("account:<Name>")[..8]`)
//! followed by the packed struct fields; decoding walks the buffer with a
//! bounds-checked cursor instead of pulling in the full Anchor stack.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("account data too short: need {needed} bytes at offset {offset}, have {len}")]
    TooShort {
        needed: usize,
        offset: usize,
        len: usize,
    },
    #[error("discriminator mismatch, expected account:{0}")]
    Discriminator(&'static str),
}

/// 8-byte Anchor account discriminator for `name`.
pub fn discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"account:");
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Cursor positioned after the Anchor discriminator, which must match `name`.
    fn new_anchor(data: &'a [u8], name: &'static str) -> Result<Self, DecodeError> {
        if data.len() < 8 {
            return Err(DecodeError::TooShort {
                needed: 8,
                offset: 0,
                len: data.len(),
            });
        }
        if data[..8] != discriminator(name) {
            return Err(DecodeError::Discriminator(name));
        }
        Ok(Self { data, pos: 8 })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::TooShort {
            needed: n,
            offset: self.pos,
            len: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(DecodeError::TooShort {
                needed: n,
                offset: self.pos,
                len: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_pubkey(&mut self) -> Result<Pubkey, DecodeError> {
        let bytes: [u8; 32] = self.take(32)?.try_into().map_err(|_| DecodeError::TooShort {
            needed: 32,
            offset: self.pos,
            len: self.data.len(),
        })?;
        Ok(Pubkey::from(bytes))
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let b: [u8; 8] = self.take(8)?.try_into().map_err(|_| DecodeError::TooShort {
            needed: 8,
            offset: self.pos,
            len: self.data.len(),
        })?;
        Ok(u64::from_le_bytes(b))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.read_u64()? as i64)
    }

    fn read_u128(&mut self) -> Result<u128, DecodeError> {
        let b: [u8; 16] = self.take(16)?.try_into().map_err(|_| DecodeError::TooShort {
            needed: 16,
            offset: self.pos,
            len: self.data.len(),
        })?;
        Ok(u128::from_le_bytes(b))
    }
}

/// `quarry_mine::Rewarder`: controls reward distribution across its quarries.
#[derive(Clone, Debug)]
pub struct RewarderAccount {
    pub authority: Pubkey,
    pub num_quarries: u16,
    pub annual_rewards_rate: u64,
    pub mint_wrapper: Pubkey,
    pub rewards_token_mint: Pubkey,
    pub is_paused: bool,
}

impl RewarderAccount {
    pub const ACCOUNT_NAME: &'static str = "Rewarder";

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = Cursor::new_anchor(data, Self::ACCOUNT_NAME)?;
        let _base = cur.read_pubkey()?;
        let _bump = cur.read_u8()?;
        let authority = cur.read_pubkey()?;
        let _pending_authority = cur.read_pubkey()?;
        let num_quarries = cur.read_u16()?;
        let annual_rewards_rate = cur.read_u64()?;
        let _total_rewards_shares = cur.read_u64()?;
        let mint_wrapper = cur.read_pubkey()?;
        let rewards_token_mint = cur.read_pubkey()?;
        let _claim_fee_token_account = cur.read_pubkey()?;
        let _max_claim_fee_millibps = cur.read_u64()?;
        let _pause_authority = cur.read_pubkey()?;
        let is_paused = cur.read_u8()? != 0;
        Ok(Self {
            authority,
            num_quarries,
            annual_rewards_rate,
            mint_wrapper,
            rewards_token_mint,
            is_paused,
        })
    }
}

/// `quarry_mine::Quarry`: a staking pool for one token mint under one rewarder.
#[derive(Clone, Debug)]
pub struct QuarryAccount {
    pub rewarder: Pubkey,
    pub token_mint: Pubkey,
    pub index: u16,
    pub token_mint_decimals: u8,
    pub annual_rewards_rate: u64,
    pub rewards_share: u64,
    pub total_tokens_deposited: u64,
    pub num_miners: u64,
}

impl QuarryAccount {
    pub const ACCOUNT_NAME: &'static str = "Quarry";

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = Cursor::new_anchor(data, Self::ACCOUNT_NAME)?;
        let rewarder = cur.read_pubkey()?;
        let token_mint = cur.read_pubkey()?;
        let _bump = cur.read_u8()?;
        let index = cur.read_u16()?;
        let token_mint_decimals = cur.read_u8()?;
        let _famine_ts = cur.read_i64()?;
        let _last_update_ts = cur.read_i64()?;
        let _rewards_per_token_stored = cur.read_u128()?;
        let annual_rewards_rate = cur.read_u64()?;
        let rewards_share = cur.read_u64()?;
        let total_tokens_deposited = cur.read_u64()?;
        let num_miners = cur.read_u64()?;
        Ok(Self {
            rewarder,
            token_mint,
            index,
            token_mint_decimals,
            annual_rewards_rate,
            rewards_share,
            total_tokens_deposited,
            num_miners,
        })
    }
}

const SPL_MINT_LEN: usize = 82;
const SPL_MINT_DECIMALS_OFFSET: usize = 44;
const SPL_MINT_INITIALIZED_OFFSET: usize = 45;

/// SPL Token mint, reduced to the fields the pipeline needs.
#[derive(Clone, Copy, Debug)]
pub struct MintAccount {
    pub decimals: u8,
    pub is_initialized: bool,
}

impl MintAccount {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < SPL_MINT_LEN {
            return Err(DecodeError::TooShort {
                needed: SPL_MINT_LEN,
                offset: 0,
                len: data.len(),
            });
        }
        Ok(Self {
            decimals: data[SPL_MINT_DECIMALS_OFFSET],
            is_initialized: data[SPL_MINT_INITIALIZED_OFFSET] == 1,
        })
    }
}
