//! Confidential compute oracle
//!
//! ```text
//! ┌──────────────┐  encrypt(side)          ┌──────────────┐
//! │  Settlement  │ ──────────────────────▶ │    Oracle    │
//! │    Client    │  decrypt([handle], sig)  │  (off-chain) │
//! │              │ ◀────────────────────── │              │
//! └──────────────┘  plaintexts + ed25519   └──────────────┘
//!                   verification ixs
//! ```
//!
//! Decryption is gated by on-chain allowances: the oracle only answers for a
//! handle once the requesting wallet holds an allowance for it. Attestations
//! are single-use and must be submitted together with the claim.

use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use thiserror::Error;

use crate::wallet::Wallet;

#[derive(Debug, Error)]
pub enum OracleError {
    /// The handle exists but the oracle has not indexed its allowance yet
    #[error("decryption not ready: {0}")]
    NotReady(String),
    #[error("wallet is not allowed to decrypt: {0}")]
    Unauthorized(String),
    #[error("oracle transport error: {0}")]
    Transport(String),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// Attested plaintexts, one per requested handle in request order
#[derive(Clone, Debug, PartialEq)]
pub struct AttestedDecryption {
    pub plaintexts: Vec<String>,
    pub handles: Vec<String>,
    /// Signature verification instructions that must precede the consuming
    /// program instruction in the same transaction
    pub signature_instructions: Vec<Instruction>,
}

#[async_trait]
pub trait ConfidentialOracle: Send + Sync {
    /// Encrypt a plaintext value, returning hex ciphertext
    async fn encrypt(&self, value: u128) -> Result<String, OracleError>;

    /// Request attested decryption of decimal `handles` on behalf of `wallet`
    async fn decrypt(&self, handles: &[String], wallet: &dyn Wallet) -> Result<AttestedDecryption, OracleError>;
}
