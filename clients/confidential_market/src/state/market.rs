//! Prediction Market State
//!
//! Each market is a single YES/NO question with two public pools. The sides
//! of individual bets are private; only the pool totals are visible.

use anchor_lang::prelude::*;

use crate::amm::ParimutuelPool;
use crate::error::SettlementError;

/// Prediction market account, as laid out by the program
///
/// Seeds: ["market", market_id.to_le_bytes()]
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Market {
    /// Authority allowed to close and resolve the market
    pub authority: Pubkey,

    /// Unique market identifier
    pub market_id: u64,

    /// The prediction question
    /// Example: "Will SOL hit $500 by March 2026?"
    pub question: String,

    /// Unix timestamp after which the market may be resolved
    pub resolution_time: i64,

    /// Lifecycle status
    pub status: MarketStatus,

    /// Lamports staked on YES
    pub total_yes_amount: u64,

    /// Lamports staked on NO
    pub total_no_amount: u64,

    /// Number of bets placed
    pub participant_count: u32,

    /// PDA bump seed
    pub bump: u8,
}

impl Market {
    pub const SEED: &'static [u8] = b"market";

    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    pub fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }

    pub fn total_pool(&self) -> u64 {
        self.total_yes_amount.saturating_add(self.total_no_amount)
    }

    /// Side that won, once resolved
    pub fn winning_side(&self) -> Option<Side> {
        self.status.winning_side()
    }

    /// Pools in display units, for odds and payout previews
    pub fn pool(&self) -> ParimutuelPool {
        ParimutuelPool::from_lamports(self.total_yes_amount, self.total_no_amount)
    }

    pub fn from_account_data(data: &[u8]) -> Result<Self> {
        Self::try_deserialize(&mut &data[..])
    }
}

/// Market lifecycle status
///
/// Transitions are one-directional: Open → Closed → ResolvedYes | ResolvedNo.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MarketStatus {
    /// Accepting bets
    #[default]
    Open,
    /// No more bets, awaiting resolution
    Closed,
    /// YES won
    ResolvedYes,
    /// NO won
    ResolvedNo,
}

impl MarketStatus {
    pub fn is_resolved(&self) -> bool {
        matches!(self, MarketStatus::ResolvedYes | MarketStatus::ResolvedNo)
    }

    pub fn winning_side(&self) -> Option<Side> {
        match self {
            MarketStatus::ResolvedYes => Some(Side::Yes),
            MarketStatus::ResolvedNo => Some(Side::No),
            MarketStatus::Open | MarketStatus::Closed => None,
        }
    }
}

/// Side of a bet
///
/// Encoded as a single bit: 0 = NO, 1 = YES.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    No,
    Yes,
}

impl Side {
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Side::No),
            1 => Some(Side::Yes),
            _ => None,
        }
    }

    pub fn bit(&self) -> u8 {
        match self {
            Side::No => 0,
            Side::Yes => 1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::No => Side::Yes,
            Side::Yes => Side::No,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = SettlementError;

    fn try_from(bit: u8) -> std::result::Result<Self, Self::Error> {
        Side::from_bit(bit).ok_or(SettlementError::InvalidSide(bit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(status: MarketStatus) -> Market {
        Market {
            authority: Pubkey::new_unique(),
            market_id: 7,
            question: "Will SOL hit $500 by March 2026?".to_string(),
            resolution_time: 1_767_225_600,
            status,
            total_yes_amount: 3_000,
            total_no_amount: 1_000,
            participant_count: 4,
            bump: 254,
        }
    }

    #[test]
    fn test_account_roundtrip_with_padding() {
        let original = market(MarketStatus::Closed);
        let mut data = Vec::new();
        original.try_serialize(&mut data).unwrap();
        // Accounts are allocated larger than their contents
        data.resize(data.len() + 64, 0);

        let decoded = Market::from_account_data(&data).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.total_pool(), 4_000);
    }

    #[test]
    fn test_rejects_foreign_discriminator() {
        let mut data = Vec::new();
        market(MarketStatus::Open).try_serialize(&mut data).unwrap();
        data[0] ^= 0xff;
        assert!(Market::from_account_data(&data).is_err());
    }

    #[test]
    fn test_status_helpers() {
        assert!(market(MarketStatus::Open).is_open());
        assert!(!market(MarketStatus::Closed).is_resolved());
        assert_eq!(market(MarketStatus::ResolvedYes).winning_side(), Some(Side::Yes));
        assert_eq!(market(MarketStatus::ResolvedNo).winning_side(), Some(Side::No));
        assert_eq!(market(MarketStatus::Closed).winning_side(), None);
    }

    #[test]
    fn test_side_bits() {
        assert_eq!(Side::from_bit(0), Some(Side::No));
        assert_eq!(Side::from_bit(1), Some(Side::Yes));
        assert_eq!(Side::from_bit(2), None);
        assert_eq!(Side::Yes.bit(), 1);
        assert_eq!(Side::No.opposite(), Side::Yes);
        assert!(matches!(Side::try_from(7), Err(SettlementError::InvalidSide(7))));
    }
}
