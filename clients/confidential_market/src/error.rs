//! Error taxonomy
//!
//! - **Input validation** (missing wallet, invalid stake) fails before any
//!   network call.
//! - **Encoding** failures abort with no partial state change.
//! - **Protocol** errors (simulation, stale handle, decryption unavailable,
//!   stale attestation, not winner) are recoverable and user-actionable.
//! - **Ledger** errors pass through verbatim; "already claimed" is kept
//!   distinct because it is success-adjacent.

use std::time::Duration;

use anchor_lang::prelude::*;
use solana_sdk::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::wallet::WalletError;

/// Errors raised by the confidential market program, mirrored so ledger
/// rejections can be named. Codes start at 6000 in declaration order.
#[error_code]
pub enum MarketProgramError {
    #[msg("Market is not open for betting")]
    MarketNotOpen,
    #[msg("Market is still open")]
    MarketStillOpen,
    #[msg("Market is not resolved yet")]
    MarketNotResolved,
    #[msg("Market is already resolved")]
    MarketAlreadyResolved,
    #[msg("Bet amount must be greater than zero")]
    InvalidBetAmount,
    #[msg("Not the position owner")]
    NotOwner,
    #[msg("Position already claimed")]
    AlreadyClaimed,
    #[msg("Position not checked yet - call check_winner first")]
    NotChecked,
    #[msg("Not a winner - cannot claim")]
    NotWinner,
    #[msg("Unauthorized - not the market authority")]
    Unauthorized,
    #[msg("No funds in vault")]
    NoFunds,
    #[msg("Invalid side - must be 0 (NO) or 1 (YES)")]
    InvalidSide,
    #[msg("Resolution time not reached yet")]
    ResolutionTimeNotReached,
    #[msg("Question too long - max 256 characters")]
    QuestionTooLong,
}

impl MarketProgramError {
    const ALL: [MarketProgramError; 14] = [
        MarketProgramError::MarketNotOpen,
        MarketProgramError::MarketStillOpen,
        MarketProgramError::MarketNotResolved,
        MarketProgramError::MarketAlreadyResolved,
        MarketProgramError::InvalidBetAmount,
        MarketProgramError::NotOwner,
        MarketProgramError::AlreadyClaimed,
        MarketProgramError::NotChecked,
        MarketProgramError::NotWinner,
        MarketProgramError::Unauthorized,
        MarketProgramError::NoFunds,
        MarketProgramError::InvalidSide,
        MarketProgramError::ResolutionTimeNotReached,
        MarketProgramError::QuestionTooLong,
    ];

    pub fn code(self) -> u32 {
        u32::from(self)
    }

    /// Map a `Custom(code)` instruction error back to a program error
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("no wallet connected")]
    MissingWallet,
    #[error("stake must be greater than zero")]
    InvalidStake,
    #[error("invalid side {0}: must be 0 (NO) or 1 (YES)")]
    InvalidSide(u8),
    #[error("market {0} is not open for betting")]
    MarketNotOpen(Pubkey),
    #[error("market {0} is not resolved yet")]
    MarketNotResolved(Pubkey),
    #[error("account {0} not found")]
    AccountNotFound(Pubkey),
    #[error("invalid account data for {address}: {reason}")]
    InvalidAccountData { address: Pubkey, reason: String },
    #[error("failed to encode position side: {0}")]
    EncodingFailed(String),
    #[error("check_winner simulation failed: {error}")]
    SimulationFailed { error: String, logs: Vec<String> },
    #[error("is-winner handle for position {0} is not available yet")]
    NotYetAvailable(Pubkey),
    #[error("decryption unavailable after {attempts} attempts: {last_error}")]
    DecryptionUnavailable { attempts: usize, last_error: String },
    #[error("oracle attestation is stale or already consumed")]
    StaleAttestation,
    #[error("position is not a winner")]
    NotWinner,
    #[error("position already claimed")]
    AlreadyClaimed,
    #[error("position has not been checked yet")]
    NotChecked,
    #[error("no decryption cached for position {0}")]
    NoCachedDecryption(Pubkey),
    #[error("settlement already in flight for position {0}")]
    SettlementInFlight(Pubkey),
    #[error("program rejected the transaction: {0}")]
    Program(MarketProgramError),
    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: &'static str, limit: Duration },
    #[error(transparent)]
    Ledger(LedgerError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl SettlementError {
    /// Failures that can be retried as-is later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SettlementError::NotYetAvailable(_)
                | SettlementError::DecryptionUnavailable { .. }
                | SettlementError::StaleAttestation
                | SettlementError::SettlementInFlight(_)
                | SettlementError::Timeout { .. }
        ) || matches!(self, SettlementError::Ledger(LedgerError::Transport(_)))
    }

    /// The position is already settled; nothing to report urgently
    pub fn is_success_adjacent(&self) -> bool {
        matches!(self, SettlementError::AlreadyClaimed)
    }

    /// Classify a ledger failure
    ///
    /// `attestation_instructions` is the number of leading signature
    /// verification instructions in the transaction. A failure inside one of
    /// them, or an unknown custom error raised by the instruction right after
    /// them, means the attestation was rejected.
    pub fn from_ledger(error: LedgerError, attestation_instructions: usize) -> Self {
        let (index, instruction_error) = match &error {
            LedgerError::Rejected {
                error: TransactionError::InstructionError(index, instruction_error),
                ..
            } => (*index as usize, instruction_error.clone()),
            _ => return SettlementError::Ledger(error),
        };

        if attestation_instructions > 0 && index < attestation_instructions {
            return SettlementError::StaleAttestation;
        }

        match instruction_error {
            InstructionError::Custom(code) => match MarketProgramError::from_code(code) {
                Some(MarketProgramError::NotWinner) => SettlementError::NotWinner,
                Some(MarketProgramError::AlreadyClaimed) => SettlementError::AlreadyClaimed,
                Some(MarketProgramError::NotChecked) => SettlementError::NotChecked,
                Some(program_error) => SettlementError::Program(program_error),
                None if attestation_instructions > 0 && index == attestation_instructions => {
                    SettlementError::StaleAttestation
                }
                None => SettlementError::Ledger(error),
            },
            _ => SettlementError::Ledger(error),
        }
    }
}

impl From<LedgerError> for SettlementError {
    fn from(error: LedgerError) -> Self {
        SettlementError::from_ledger(error, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(index: u8, error: InstructionError) -> LedgerError {
        LedgerError::Rejected {
            error: TransactionError::InstructionError(index, error),
            logs: vec![],
        }
    }

    #[test]
    fn test_codes_follow_declaration_order() {
        assert_eq!(MarketProgramError::MarketNotOpen.code(), 6000);
        assert_eq!(MarketProgramError::AlreadyClaimed.code(), 6006);
        assert_eq!(MarketProgramError::NotWinner.code(), 6008);
        assert_eq!(MarketProgramError::QuestionTooLong.code(), 6013);
        assert!(matches!(MarketProgramError::from_code(6008), Some(MarketProgramError::NotWinner)));
        assert!(MarketProgramError::from_code(6014).is_none());
        assert!(MarketProgramError::from_code(0).is_none());
    }

    #[test]
    fn test_claim_rejections() {
        let not_winner = SettlementError::from_ledger(rejected(2, InstructionError::Custom(6008)), 2);
        assert!(matches!(not_winner, SettlementError::NotWinner));

        let claimed = SettlementError::from_ledger(rejected(2, InstructionError::Custom(6006)), 2);
        assert!(claimed.is_success_adjacent());
        assert!(!claimed.is_retryable());
    }

    #[test]
    fn test_signature_failures_are_stale_attestations() {
        let in_precompile = SettlementError::from_ledger(rejected(0, InstructionError::InvalidInstructionData), 2);
        assert!(matches!(in_precompile, SettlementError::StaleAttestation));

        let in_verifier = SettlementError::from_ledger(rejected(2, InstructionError::Custom(1)), 2);
        assert!(matches!(in_verifier, SettlementError::StaleAttestation));
        assert!(in_verifier.is_retryable());
    }

    #[test]
    fn test_other_failures_pass_through() {
        let funds = SettlementError::from(LedgerError::Rejected {
            error: TransactionError::InsufficientFundsForFee,
            logs: vec![],
        });
        assert!(matches!(
            funds,
            SettlementError::Ledger(LedgerError::Rejected { error: TransactionError::InsufficientFundsForFee, .. })
        ));

        let unknown = SettlementError::from(rejected(0, InstructionError::Custom(1)));
        assert!(matches!(unknown, SettlementError::Ledger(_)));

        let closed = SettlementError::from(rejected(0, InstructionError::Custom(6000)));
        assert!(matches!(closed, SettlementError::Program(MarketProgramError::MarketNotOpen)));
    }
}
