//! Bet Placement
//!
//! The side travels twice: encrypted for the position, and as a plain tag so
//! the program can update the public pool totals and lock the payout.

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::system_program;

use crate::state::{position_address, vault_address, Side};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct PlaceBetArgs {
    /// Oracle ciphertext of the side bit
    pub encrypted_side: Vec<u8>,
    /// Stake in lamports
    pub amount: u64,
    /// 0 = NO, 1 = YES
    pub side_for_pool: u8,
}

impl Discriminator for PlaceBetArgs {
    const DISCRIMINATOR: [u8; 8] = [222, 62, 67, 220, 63, 166, 126, 33];
}

impl InstructionData for PlaceBetArgs {}

impl PlaceBetArgs {
    pub fn new(encrypted_side: Vec<u8>, amount: u64, side: Side) -> Self {
        Self {
            encrypted_side,
            amount,
            side_for_pool: side.bit(),
        }
    }
}

pub struct PlaceBetAccounts {
    pub bettor: Pubkey,
    pub market: Pubkey,
    pub position: Pubkey,
    pub vault: Pubkey,
    pub system_program: Pubkey,
    pub inco_lightning_program: Pubkey,
}

impl PlaceBetAccounts {
    pub fn new(program_id: &Pubkey, oracle_program_id: Pubkey, bettor: Pubkey, market: Pubkey) -> Self {
        let (position, _) = position_address(program_id, &market, &bettor);
        let (vault, _) = vault_address(program_id, &market);
        Self {
            bettor,
            market,
            position,
            vault,
            system_program: system_program::ID,
            inco_lightning_program: oracle_program_id,
        }
    }
}

impl ToAccountMetas for PlaceBetAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.bettor, true),
            AccountMeta::new(self.market, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.inco_lightning_program, false),
        ]
    }
}

pub fn place_bet(program_id: Pubkey, accounts: &PlaceBetAccounts, args: &PlaceBetArgs) -> Instruction {
    super::build(program_id, accounts, args)
}
