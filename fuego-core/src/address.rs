use crate::error::{WalletError, WalletResult};

pub const MIN_ADDRESS_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 44;

/// The base58 alphabet without `0`, `O`, `I` and `l`.
fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// Syntactic check for a Solana address: 32 to 44 base58 characters.
///
/// This does not decode the string or check that it is a point on the curve.
pub fn is_valid_address(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&len) && candidate.chars().all(is_base58_char)
}

pub fn validate_address(candidate: &str) -> WalletResult<()> {
    if is_valid_address(candidate) {
        Ok(())
    } else {
        Err(WalletError::validation(format!(
            "Invalid Solana address format: '{}'",
            candidate
        )))
    }
}

/// `7xKXtg2C...sgAsU` style shortening for terminal output.
pub fn shorten(address: &str, keep: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= keep * 2 {
        return address.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{}...{}", head, tail)
}
