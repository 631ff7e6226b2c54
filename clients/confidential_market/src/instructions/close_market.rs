//! Market Closing

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct CloseMarketArgs {}

impl Discriminator for CloseMarketArgs {
    const DISCRIMINATOR: [u8; 8] = [88, 154, 248, 186, 48, 14, 123, 244];
}

impl InstructionData for CloseMarketArgs {}

/// Authority and market; shared by close and resolve
pub struct MarketAuthorityAccounts {
    pub authority: Pubkey,
    pub market: Pubkey,
}

impl ToAccountMetas for MarketAuthorityAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.authority, true),
            AccountMeta::new(self.market, false),
        ]
    }
}

pub fn close_market(program_id: Pubkey, accounts: &MarketAuthorityAccounts) -> Instruction {
    super::build(program_id, accounts, &CloseMarketArgs::default())
}
