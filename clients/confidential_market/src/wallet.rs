//! Signing capability
//!
//! The settlement client never holds key material directly. Anything that
//! can sign transactions and attest to its identity for the oracle plugs in
//! here; a local [`Keypair`] is the default.

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer, SignerError};
use solana_sdk::transaction::Transaction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("signing rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Signer(#[from] SignerError),
}

pub trait Wallet: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Sign `transaction` as its fee payer against `recent_blockhash`
    fn sign_transaction(&self, transaction: &mut Transaction, recent_blockhash: Hash) -> Result<(), WalletError>;

    /// Sign an arbitrary message, used to authenticate oracle requests
    fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}

impl Wallet for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    fn sign_transaction(&self, transaction: &mut Transaction, recent_blockhash: Hash) -> Result<(), WalletError> {
        transaction.try_sign(&[self], recent_blockhash)?;
        Ok(())
    }

    fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        Ok(Signer::try_sign_message(self, message)?)
    }
}
