//! Account layouts and addresses owned by the confidential market program

pub mod market;
pub mod pda;
pub mod position;

pub use market::*;
pub use pda::*;
pub use position::*;
