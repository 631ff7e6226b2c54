//! # Confidential Market Client: Sealed Bets, Locked Payouts
//!
//! Client-side settlement for a parimutuel YES/NO prediction market on Solana
//! where the side of every bet stays encrypted until its owner settles.
//!
//! ## Overview
//!
//! A bettor never reveals 1. which side they took, 2. whether they won, unless
//! they claim. What *is* public is the stake and the payout locked at bet time.
//!
//! ## How it works
//! - Inco Lightning encrypts the side before it ever reaches the ledger.
//! - The program compares the encrypted side with the resolved outcome and
//!   stores an encrypted "is winner" handle on the position.
//! - The owner decrypts that handle through the attested oracle and submits
//!   the oracle's signature instructions together with the claim.
//!
//! ```text
//!   place_bet ──▶ [encoder] ──▶ ledger
//!
//!   settle:  [discovery] ──▶ [decryption] ──▶ [claim]
//!             simulate         oracle          sig-verify ixs
//!             + commit         + backoff       + claim_winnings
//! ```
#![allow(unexpected_cfgs)]

use anchor_lang::prelude::*;

pub mod amm;
pub mod claim;
pub mod config;
pub mod decryption;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod handle;
pub mod instructions;
pub mod ledger;
pub mod oracle;
pub mod settlement;
pub mod state;
pub mod wallet;

pub use amm::*;
pub use config::SettlementConfig;
pub use error::{MarketProgramError, SettlementError};
pub use handle::{Handle, Plaintext};
pub use settlement::SettlementClient;
pub use state::{Market, MarketStatus, Position, Side};

// Deployed confidential market program
declare_id!("5apEYrFFuxT7yExEFz56kfmuYvc1YxcActFCMWnYpQea");

/// Inco Lightning program, which owns every allowance account.
///
/// The oracle crate may be built against a different `solana-program`, so the
/// id is carried across as raw bytes.
pub fn inco_lightning_program_id() -> Pubkey {
    Pubkey::new_from_array(inco_lightning::ID.to_bytes())
}
