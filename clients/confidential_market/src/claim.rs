//! Claim Transaction Builder
//!
//! ```text
//!   ix 0..n-1   signature verification instructions from the oracle
//!   ix n        claim_winnings(handle_bytes, plaintext_bytes)
//! ```
//!
//! The program finds the attestation by introspecting the instructions that
//! precede it and hashes the submitted bytes, so both the order and the byte
//! encodings are fixed. All of them come from a single [`DecryptionResult`].

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;

use crate::decryption::DecryptionResult;
use crate::instructions::{claim_winnings, ClaimWinningsAccounts, ClaimWinningsArgs};

pub struct ClaimBuilder {
    program_id: Pubkey,
    oracle_program_id: Pubkey,
}

impl ClaimBuilder {
    pub fn new(program_id: Pubkey, oracle_program_id: Pubkey) -> Self {
        Self {
            program_id,
            oracle_program_id,
        }
    }

    pub fn claim_args(result: &DecryptionResult) -> ClaimWinningsArgs {
        ClaimWinningsArgs {
            handle: result.handle.to_claim_bytes(),
            plaintext: result.plaintext.to_claim_bytes().to_vec(),
        }
    }

    /// Attestation instructions followed by the claim, in submission order
    pub fn claim_instructions(&self, result: &DecryptionResult, market: Pubkey, winner: Pubkey) -> Vec<Instruction> {
        let accounts = ClaimWinningsAccounts::new(&self.program_id, self.oracle_program_id, winner, market);
        let mut instructions = result.signature_instructions.clone();
        instructions.push(claim_winnings(self.program_id, &accounts, &Self::claim_args(result)));
        instructions
    }

    /// Unsigned claim transaction paid for by `winner`
    pub fn build_claim(&self, result: &DecryptionResult, market: Pubkey, winner: Pubkey) -> Transaction {
        Transaction::new_with_payer(&self.claim_instructions(result, market, winner), Some(&winner))
    }
}

// ===== TESTS =====
