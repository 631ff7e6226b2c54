//! Market Creation

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::system_program;

use crate::state::{market_address, vault_address};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CreateMarketArgs {
    pub market_id: u64,
    pub question: String,
    pub resolution_time: i64,
}

impl Discriminator for CreateMarketArgs {
    const DISCRIMINATOR: [u8; 8] = [103, 226, 97, 235, 200, 188, 251, 254];
}

impl InstructionData for CreateMarketArgs {}

pub struct CreateMarketAccounts {
    pub authority: Pubkey,
    pub market: Pubkey,
    pub vault: Pubkey,
    pub system_program: Pubkey,
}

impl CreateMarketAccounts {
    pub fn new(program_id: &Pubkey, authority: Pubkey, market_id: u64) -> Self {
        let (market, _) = market_address(program_id, market_id);
        let (vault, _) = vault_address(program_id, &market);
        Self {
            authority,
            market,
            vault,
            system_program: system_program::ID,
        }
    }
}

impl ToAccountMetas for CreateMarketAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.authority, true),
            AccountMeta::new(self.market, false),
            AccountMeta::new(self.vault, false),
            AccountMeta::new_readonly(self.system_program, false),
        ]
    }
}

pub fn create_market(program_id: Pubkey, accounts: &CreateMarketAccounts, args: &CreateMarketArgs) -> Instruction {
    super::build(program_id, accounts, args)
}
