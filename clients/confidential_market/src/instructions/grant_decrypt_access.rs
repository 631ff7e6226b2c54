//! Decrypt Access Grant
//!
//! Re-grants the owner's allowance for an is-winner handle that is already
//! stored on the position.

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::system_program;

use super::AllowanceGrant;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct GrantDecryptAccessArgs {}

impl Discriminator for GrantDecryptAccessArgs {
    const DISCRIMINATOR: [u8; 8] = [182, 222, 90, 37, 106, 145, 77, 174];
}

impl InstructionData for GrantDecryptAccessArgs {}

pub struct GrantDecryptAccessAccounts {
    pub owner: Pubkey,
    pub position: Pubkey,
    pub system_program: Pubkey,
    pub inco_lightning_program: Pubkey,
    pub grant: AllowanceGrant,
}

impl GrantDecryptAccessAccounts {
    pub fn new(oracle_program_id: Pubkey, owner: Pubkey, position: Pubkey, grant: AllowanceGrant) -> Self {
        Self {
            owner,
            position,
            system_program: system_program::ID,
            inco_lightning_program: oracle_program_id,
            grant,
        }
    }
}

impl ToAccountMetas for GrantDecryptAccessAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new(self.owner, true),
            AccountMeta::new_readonly(self.position, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.inco_lightning_program, false),
        ];
        metas.extend(self.grant.to_account_metas());
        metas
    }
}

pub fn grant_decrypt_access(program_id: Pubkey, accounts: &GrantDecryptAccessAccounts) -> Instruction {
    super::build(program_id, accounts, &GrantDecryptAccessArgs::default())
}
