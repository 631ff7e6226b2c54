//! Market Resolution

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::Instruction;

use super::MarketAuthorityAccounts;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ResolveMarketArgs {
    /// true = YES wins, false = NO wins
    pub outcome: bool,
}

impl Discriminator for ResolveMarketArgs {
    const DISCRIMINATOR: [u8; 8] = [155, 23, 80, 173, 46, 74, 23, 239];
}

impl InstructionData for ResolveMarketArgs {}

pub fn resolve_market(program_id: Pubkey, accounts: &MarketAuthorityAccounts, outcome: bool) -> Instruction {
    super::build(program_id, accounts, &ResolveMarketArgs { outcome })
}
