//! Winnings Claim
//!
//! The program verifies the oracle's attestation by introspecting the
//! signature-verification instructions that precede this one, then hashes the
//! `handle` and `plaintext` bytes exactly as submitted.

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::{system_program, sysvar};

use crate::state::{position_address, vault_address};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ClaimWinningsArgs {
    /// ASCII hex digits of the is-winner handle
    pub handle: Vec<u8>,
    /// 16-byte little-endian plaintext
    pub plaintext: Vec<u8>,
}

impl Discriminator for ClaimWinningsArgs {
    const DISCRIMINATOR: [u8; 8] = [161, 215, 24, 59, 14, 236, 242, 221];
}

impl InstructionData for ClaimWinningsArgs {}

pub struct ClaimWinningsAccounts {
    pub winner: Pubkey,
    pub market: Pubkey,
    pub position: Pubkey,
    pub vault: Pubkey,
    pub instructions: Pubkey,
    pub system_program: Pubkey,
    pub inco_lightning_program: Pubkey,
}

impl ClaimWinningsAccounts {
    pub fn new(program_id: &Pubkey, oracle_program_id: Pubkey, winner: Pubkey, market: Pubkey) -> Self {
        let (position, _) = position_address(program_id, &market, &winner);
        let (vault, _) = vault_address(program_id, &market);
        Self {
            winner,
            market,
            position,
            vault,
            instructions: sysvar::instructions::ID,
            system_program: system_program::ID,
            inco_lightning_program: oracle_program_id,
        }
    }
}

impl ToAccountMetas for ClaimWinningsAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.winner, true),
            AccountMeta::new(self.market, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(self.instructions, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.inco_lightning_program, false),
        ]
    }
}

pub fn claim_winnings(program_id: Pubkey, accounts: &ClaimWinningsAccounts, args: &ClaimWinningsArgs) -> Instruction {
    super::build(program_id, accounts, args)
}
