//! # Design codes
//!
//! Designs are shared as 12 base-30 digits in three dash-separated groups
//! (`XXXX-XXXX-XXXX`). Vowels and easily confused letters are left out of the
//! alphabet.

use crate::{DesignError, Result};

const ALPHABET: &[u8; 30] = b"0123456789BCDFGHJKLMNPQRSTVWXY";
const DIGITS: usize = 12;
const GROUP_LEN: usize = 4;

/// 30^12, the first id that no longer fits in a code
pub const MAX_DESIGN_ID: u64 = 531_441_000_000_000_000;

/// Parses `XXXX-XXXX-XXXX` (dashes optional) into a numeric design id
pub fn to_id(code: &str) -> Result<u64> {
    let invalid = || DesignError::InvalidDesignCode(code.to_string());

    let groups: Vec<&str> = code.split('-').collect();
    if groups.len() != 1 && (groups.len() != DIGITS / GROUP_LEN || groups.iter().any(|g| g.len() != GROUP_LEN)) {
        return Err(invalid());
    }

    let digits: Vec<u8> = groups.concat().into_bytes();
    if digits.len() != DIGITS {
        return Err(invalid());
    }

    digits.iter().try_fold(0u64, |id, &c| {
        let value = ALPHABET.iter().position(|&a| a == c).ok_or_else(invalid)?;
        Ok::<u64, DesignError>(id * 30 + value as u64)
    })
}

/// Formats a numeric design id as `XXXX-XXXX-XXXX`
pub fn to_code(id: u64) -> Result<String> {
    if id >= MAX_DESIGN_ID {
        return Err(DesignError::InvalidDesignCode(id.to_string()));
    }

    let mut digits = [b'0'; DIGITS];
    let mut rest = id;
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(rest % 30) as usize];
        rest /= 30;
    }

    let groups: Vec<&str> = digits
        .chunks(GROUP_LEN)
        .map(|g| std::str::from_utf8(g).unwrap_or_default())
        .collect();
    Ok(groups.join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(to_code(0).unwrap(), "0000-0000-0000");
        assert_eq!(to_id("0000-0000-0000").unwrap(), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(to_id("0000-0000-000B").unwrap(), 10);
        assert_eq!(to_id("0000-0000-0010").unwrap(), 30);
        assert_eq!(to_code(31).unwrap(), "0000-0000-0011");
        assert_eq!(to_code(MAX_DESIGN_ID - 1).unwrap(), "YYYY-YYYY-YYYY");
    }

    #[test]
    fn test_dashes_optional() {
        assert_eq!(to_id("MQ3PBV7R4KL2").unwrap(), to_id("MQ3P-BV7R-4KL2").unwrap());
    }

    #[test]
    fn test_rejects_bad_codes() {
        for code in ["", "0000-0000-000", "0000-0000-000A", "00-000000-0000", "0000-0000-0000-0000", "mq3p-bv7r-4kl2"] {
            assert!(matches!(to_id(code), Err(DesignError::InvalidDesignCode(_))), "{}", code);
        }
        assert!(to_code(MAX_DESIGN_ID).is_err());
    }
}
