//! Position State
//!
//! One position per (market, owner). The side is stored only as an encrypted
//! handle; the stake and the payout locked at bet time are public.

use anchor_lang::prelude::*;
use anchor_lang::Discriminator;

use crate::handle::Handle;

/// A bettor's position in a market
///
/// Seeds: ["position", market, owner]
///
/// Byte layout (fixed offsets, read directly from simulated account state):
///
/// ```text
///   0..8     discriminator
///   8..40    market
///  40..72    owner
///  72..80    amount
///  80..88    locked_payout
///  88..104   encrypted_side_handle   u128 LE
/// 104..120   is_winner_handle        u128 LE
/// 120        claimed
/// 121        bump
/// ```
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Position {
    /// The market this position belongs to
    pub market: Pubkey,

    /// Owner of the position
    pub owner: Pubkey,

    /// Stake in lamports
    pub amount: u64,

    /// Payout owed if this position wins; fixed when the bet executed
    pub locked_payout: u64,

    /// Encrypted side: 1 = YES, 0 = NO
    pub encrypted_side_handle: u128,

    /// Encrypted `side == outcome`; zero until the winner check ran
    pub is_winner_handle: u128,

    /// Whether winnings were paid out
    pub claimed: bool,

    /// PDA bump seed
    pub bump: u8,
}

impl Position {
    pub const SEED: &'static [u8] = b"position";

    pub const MARKET_OFFSET: usize = 8;
    pub const OWNER_OFFSET: usize = Self::MARKET_OFFSET + 32;
    pub const AMOUNT_OFFSET: usize = Self::OWNER_OFFSET + 32;
    pub const LOCKED_PAYOUT_OFFSET: usize = Self::AMOUNT_OFFSET + 8;
    pub const ENCRYPTED_SIDE_HANDLE_OFFSET: usize = Self::LOCKED_PAYOUT_OFFSET + 8;
    pub const IS_WINNER_HANDLE_OFFSET: usize = Self::ENCRYPTED_SIDE_HANDLE_OFFSET + 16;
    pub const CLAIMED_OFFSET: usize = Self::IS_WINNER_HANDLE_OFFSET + 16;

    pub fn from_account_data(data: &[u8]) -> Result<Self> {
        Self::try_deserialize(&mut &data[..])
    }

    /// Read the is-winner handle straight from raw account bytes
    ///
    /// Returns `None` if the data is too short or is not a position.
    pub fn read_is_winner_handle(data: &[u8]) -> Option<Handle> {
        if data.len() < Self::CLAIMED_OFFSET || data[..8] != Self::DISCRIMINATOR {
            return None;
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&data[Self::IS_WINNER_HANDLE_OFFSET..Self::CLAIMED_OFFSET]);
        Some(Handle::from_account_bytes(bytes))
    }

    pub fn is_winner_handle(&self) -> Handle {
        Handle(self.is_winner_handle)
    }

    /// Whether the winner check already stored a handle
    pub fn is_checked(&self) -> bool {
        !self.is_winner_handle().is_unset()
    }
}
