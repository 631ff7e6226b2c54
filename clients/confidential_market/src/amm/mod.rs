//! # Parimutuel Pricing Module
//!
//! Pool-based odds and payouts for YES/NO markets. Every bet lands in the
//! pool of its side; winners split the whole pot in proportion to their stake.
//!
//! ```text
//!            odds(side)   = total / side_pool
//!            payout       = stake / new_side_pool * new_total
//!
//!   ┌────────────────────────────────────────┐
//!   │   YES pool      │       NO pool        │
//!   │   ██████████    │   ████               │
//!   │◀──────────── total pool ──────────────▶│
//!   │                                         │
//!   │  the payout is locked when the bet     │
//!   │  executes; later bets never move it    │
//!   └────────────────────────────────────────┘
//! ```

pub mod parimutuel;

pub use parimutuel::*;
