//! Winner Check
//!
//! Compares the encrypted side with the resolved outcome on-chain and stores
//! the encrypted result on the position. When the caller appends the
//! allowance account and the owner as remaining accounts, the oracle also
//! grants the owner read access to the new handle.

use anchor_lang::prelude::*;
use anchor_lang::{Discriminator, InstructionData};
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::system_program;

use crate::handle::Handle;
use crate::state::allowance_address;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct CheckWinnerArgs {}

impl Discriminator for CheckWinnerArgs {
    const DISCRIMINATOR: [u8; 8] = [246, 195, 208, 54, 162, 217, 84, 64];
}

impl InstructionData for CheckWinnerArgs {}

/// Allowance grant appended after the fixed accounts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowanceGrant {
    pub allowance: Pubkey,
    pub allowed: Pubkey,
}

impl AllowanceGrant {
    /// Grant `allowed` read access to `handle`
    pub fn for_handle(oracle_program_id: &Pubkey, handle: Handle, allowed: Pubkey) -> Self {
        let (allowance, _) = allowance_address(oracle_program_id, handle, &allowed);
        Self { allowance, allowed }
    }

    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.allowance, false),
            AccountMeta::new_readonly(self.allowed, false),
        ]
    }
}

pub struct CheckWinnerAccounts {
    pub checker: Pubkey,
    pub market: Pubkey,
    pub position: Pubkey,
    pub system_program: Pubkey,
    pub inco_lightning_program: Pubkey,
    pub grant: Option<AllowanceGrant>,
}

impl CheckWinnerAccounts {
    pub fn new(oracle_program_id: Pubkey, checker: Pubkey, market: Pubkey, position: Pubkey) -> Self {
        Self {
            checker,
            market,
            position,
            system_program: system_program::ID,
            inco_lightning_program: oracle_program_id,
            grant: None,
        }
    }

    pub fn with_grant(mut self, grant: AllowanceGrant) -> Self {
        self.grant = Some(grant);
        self
    }
}

impl ToAccountMetas for CheckWinnerAccounts {
    fn to_account_metas(&self, _is_signer: Option<bool>) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new(self.checker, true),
            AccountMeta::new_readonly(self.market, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new_readonly(self.system_program, false),
            AccountMeta::new_readonly(self.inco_lightning_program, false),
        ];
        if let Some(grant) = &self.grant {
            metas.extend(grant.to_account_metas());
        }
        metas
    }
}

pub fn check_winner(program_id: Pubkey, accounts: &CheckWinnerAccounts) -> Instruction {
    super::build(program_id, accounts, &CheckWinnerArgs::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_form_has_no_remaining_accounts() {
        let accounts = CheckWinnerAccounts::new(
            crate::inco_lightning_program_id(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let ix = check_winner(crate::ID, &accounts);
        assert_eq!(ix.accounts.len(), 5);
        assert_eq!(ix.data, CheckWinnerArgs::DISCRIMINATOR.to_vec());
    }

    #[test]
    fn test_commit_form_appends_allowance() {
        let oracle = crate::inco_lightning_program_id();
        let owner = Pubkey::new_unique();
        let grant = AllowanceGrant::for_handle(&oracle, Handle(77), owner);
        let accounts = CheckWinnerAccounts::new(oracle, owner, Pubkey::new_unique(), Pubkey::new_unique())
            .with_grant(grant);

        let ix = check_winner(crate::ID, &accounts);
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(ix.accounts[5].pubkey, grant.allowance);
        assert!(ix.accounts[5].is_writable);
        assert_eq!(ix.accounts[6].pubkey, owner);
        assert!(!ix.accounts[6].is_writable);
        assert!(!ix.accounts[6].is_signer);
    }
}
