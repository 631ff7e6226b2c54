//! Ciphertext handles and decrypted plaintexts
//!
//! A handle is an opaque 128-bit reference to a value held by the decryption
//! oracle. It travels in three different encodings and they must never be
//! mixed up:
//!
//! ```text
//!   account state / allowance seed   16 bytes, little-endian      to_account_bytes
//!   oracle decrypt request           base-10 string               Display / FromStr
//!   claim_winnings instruction       ASCII codes of the hex text  to_claim_bytes
//!
//!   12345  →  [0x39,0x30,0,..,0]  |  "12345"  |  "3039" → [0x33,0x30,0x33,0x39]
//! ```
//!
//! Every call site converts through [`Handle`]; there is no other encoder.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleParseError {
    #[error("empty handle")]
    Empty,
    #[error("invalid decimal handle: {0}")]
    InvalidDecimal(String),
    #[error("invalid plaintext: {0}")]
    InvalidPlaintext(String),
}

/// Opaque reference to an oracle-held value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u128);

impl Handle {
    /// Sentinel stored on a position before its winner check ran
    pub const UNSET: Handle = Handle(0);

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// Little-endian binary form used inside account data and allowance seeds
    pub fn to_account_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    pub fn from_account_bytes(bytes: [u8; 16]) -> Self {
        Handle(u128::from_le_bytes(bytes))
    }

    /// Canonical base-10 form sent to the oracle
    pub fn to_decimal_string(self) -> String {
        self.0.to_string()
    }

    /// Hex digits (lowercase, unpadded) as ASCII bytes, for the claim instruction
    ///
    /// The on-chain verifier hashes exactly these bytes against the oracle's
    /// attestation.
    pub fn to_claim_bytes(self) -> Vec<u8> {
        format!("{:x}", self.0).into_bytes()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Handle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HandleParseError::Empty);
        }
        s.parse::<u128>()
            .map(Handle)
            .map_err(|_| HandleParseError::InvalidDecimal(s.to_string()))
    }
}

impl From<u128> for Handle {
    fn from(value: u128) -> Self {
        Handle(value)
    }
}

/// Decrypted value attested by the oracle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plaintext(pub u128);

impl Plaintext {
    /// Parse the oracle's textual plaintext
    ///
    /// Accepts decimal (`"1"`), `0x`-prefixed hex (`"0x01"`) and booleans
    /// (`"true"`/`"false"`). The empty string is zero.
    pub fn parse(raw: &str) -> Result<Self, HandleParseError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("false") {
            return Ok(Plaintext(0));
        }
        if raw.eq_ignore_ascii_case("true") {
            return Ok(Plaintext(1));
        }
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some("") => Ok(0),
            Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
            None => raw.parse::<u128>(),
        };
        parsed
            .map(Plaintext)
            .map_err(|_| HandleParseError::InvalidPlaintext(raw.to_string()))
    }

    /// Any non-zero value is "true"
    pub fn as_bool(&self) -> bool {
        self.0 != 0
    }

    /// 16-byte little-endian u128 (low 8 bytes, then high 8 bytes), for the
    /// claim instruction
    pub fn to_claim_bytes(self) -> [u8; 16] {
        let low = self.0 as u64;
        let high = (self.0 >> 64) as u64;
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&low.to_le_bytes());
        bytes[8..].copy_from_slice(&high.to_le_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_bytes_are_ascii_hex() {
        let handle: Handle = "12345".parse().unwrap();
        assert_eq!(format!("{:x}", handle.0), "3039");
        assert_eq!(handle.to_claim_bytes(), vec![0x33, 0x30, 0x33, 0x39]);
    }

    #[test]
    fn test_claim_bytes_are_not_zero_padded() {
        assert_eq!(Handle(0x0f).to_claim_bytes(), b"f".to_vec());
        assert_eq!(Handle(0xabc).to_claim_bytes(), b"abc".to_vec());
        assert_eq!(Handle(u128::MAX).to_claim_bytes().len(), 32);
    }

    #[test]
    fn test_account_bytes_are_little_endian() {
        let handle = Handle(12345);
        let bytes = handle.to_account_bytes();
        assert_eq!(bytes[0], 0x39);
        assert_eq!(bytes[1], 0x30);
        assert!(bytes[2..].iter().all(|b| *b == 0));
        assert_eq!(Handle::from_account_bytes(bytes), handle);
    }

    #[test]
    fn test_account_and_claim_encodings_differ() {
        let handle = Handle(12345);
        assert_ne!(handle.to_account_bytes().to_vec(), handle.to_claim_bytes());
    }

    #[test]
    fn test_decimal_string_roundtrip() {
        let handle = Handle(340_282_366_920_938_463_463_374_607_431_768_211_455);
        let text = handle.to_decimal_string();
        assert_eq!(text, "340282366920938463463374607431768211455");
        assert_eq!(text.parse::<Handle>().unwrap(), handle);
        assert_eq!(handle.to_string(), text);
    }

    #[test]
    fn test_rejects_hex_as_decimal() {
        assert_eq!("".parse::<Handle>(), Err(HandleParseError::Empty));
        assert!("0x3039".parse::<Handle>().is_err());
        assert!("-1".parse::<Handle>().is_err());
    }

    #[test]
    fn test_plaintext_claim_bytes() {
        assert_eq!(
            Plaintext(1).to_claim_bytes(),
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        let wide = Plaintext((2u128 << 64) | 3);
        let bytes = wide.to_claim_bytes();
        assert_eq!(bytes[0], 3);
        assert_eq!(bytes[8], 2);
        assert_eq!(bytes, wide.0.to_le_bytes());
    }

    #[test]
    fn test_zero_plaintext_encodings() {
        for raw in ["0", "00", "0x0", "0x", "false", "", "  0  "] {
            assert!(!Plaintext::parse(raw).unwrap().as_bool(), "{raw:?}");
        }
    }

    #[test]
    fn test_winner_plaintext_encodings() {
        for raw in ["1", "0x1", "true", "TRUE", "42"] {
            assert!(Plaintext::parse(raw).unwrap().as_bool(), "{raw:?}");
        }
        assert!(Plaintext::parse("yes").is_err());
    }
}
