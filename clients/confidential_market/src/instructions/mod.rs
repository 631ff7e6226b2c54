//! Instruction builders for the confidential market program
//!
//! Each instruction represents an action users can take:
//! - `create_market` - Open a new market (authority)
//! - `place_bet` - Stake lamports on an encrypted side
//! - `close_market` - Stop accepting bets (authority)
//! - `resolve_market` - Record the outcome (authority)
//! - `check_winner` - Compare the encrypted side with the outcome
//! - `grant_decrypt_access` - Re-grant the owner's allowance on the result
//! - `claim_winnings` - Prove an attested win and collect the locked payout
//!
//! Instruction data is the 8-byte Anchor discriminator followed by the
//! borsh-encoded arguments. Account order is fixed by the program.

pub mod check_winner;
pub mod claim_winnings;
pub mod close_market;
pub mod create_market;
pub mod grant_decrypt_access;
pub mod place_bet;
pub mod resolve_market;

pub use check_winner::*;
pub use claim_winnings::*;
pub use close_market::*;
pub use create_market::*;
pub use grant_decrypt_access::*;
pub use place_bet::*;
pub use resolve_market::*;

use anchor_lang::prelude::*;
use anchor_lang::InstructionData;
use anchor_lang::solana_program::instruction::Instruction;

/// Assemble an instruction from its accounts and arguments
pub fn build<A: ToAccountMetas, D: InstructionData>(program_id: Pubkey, accounts: &A, args: &D) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: args.data(),
    }
}
