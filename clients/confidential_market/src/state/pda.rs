//! Program-derived addresses

use anchor_lang::prelude::*;

use crate::handle::Handle;
use crate::state::{Market, Position};

pub const VAULT_SEED: &[u8] = b"vault";

/// Seeds: ["market", market_id.to_le_bytes()]
pub fn market_address(program_id: &Pubkey, market_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[Market::SEED, &market_id.to_le_bytes()], program_id)
}

/// Seeds: ["position", market, owner]
pub fn position_address(program_id: &Pubkey, market: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[Position::SEED, market.as_ref(), owner.as_ref()],
        program_id,
    )
}

/// Lamport vault holding a market's stakes. Seeds: ["vault", market]
pub fn vault_address(program_id: &Pubkey, market: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, market.as_ref()], program_id)
}

/// Oracle allowance granting `allowed` read access to `handle`
///
/// Seeds (under the oracle program): [handle as 16 LE bytes, allowed]
pub fn allowance_address(oracle_program_id: &Pubkey, handle: Handle, allowed: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[&handle.to_account_bytes(), allowed.as_ref()],
        oracle_program_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_deterministic() {
        let program = crate::ID;
        let (market, _) = market_address(&program, 42);
        assert_eq!(market, market_address(&program, 42).0);
        assert_ne!(market, market_address(&program, 43).0);

        let owner = Pubkey::new_unique();
        let (position, bump) = position_address(&program, &market, &owner);
        let expected = Pubkey::create_program_address(
            &[b"position", market.as_ref(), owner.as_ref(), &[bump]],
            &program,
        )
        .unwrap();
        assert_eq!(position, expected);
    }

    #[test]
    fn test_allowance_uses_little_endian_handle_seed() {
        let oracle = crate::inco_lightning_program_id();
        let owner = Pubkey::new_unique();
        let handle = Handle(12345);

        let (allowance, bump) = allowance_address(&oracle, handle, &owner);
        let mut seed = [0u8; 16];
        seed[0] = 0x39;
        seed[1] = 0x30;
        let expected = Pubkey::create_program_address(&[&seed, owner.as_ref(), &[bump]], &oracle).unwrap();
        assert_eq!(allowance, expected);
        assert_ne!(allowance, allowance_address(&oracle, Handle(12346), &owner).0);
    }
}
