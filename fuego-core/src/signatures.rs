use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{SigningKey, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// A transaction signature as reported by whichever executor submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl Signature {
    pub fn explorer_url(&self) -> String {
        format!("https://solscan.io/tx/{}", self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub VerifyingKey);

impl PublicKey {
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0.as_bytes()).into_string()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for PublicKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::validation(format!("invalid base58 key '{}': {}", s, e)))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|v: Vec<u8>| {
            WalletError::validation(format!(
                "expected {}-byte public key, got {}",
                PUBLIC_KEY_LENGTH,
                v.len()
            ))
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map(PublicKey)
            .map_err(|e| WalletError::validation(format!("not an ed25519 public key: {}", e)))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An ed25519 keypair in the Solana layout: 32 seed bytes followed by the
/// 32 public key bytes.
pub struct Keypair(SigningKey);

impl Keypair {
    pub fn generate() -> Self {
        Keypair(SigningKey::generate(&mut OsRng))
    }

    pub fn from_bytes(bytes: &[u8]) -> WalletResult<Self> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            WalletError::validation(format!(
                "expected {}-byte secret key, got {}",
                KEYPAIR_LENGTH,
                bytes.len()
            ))
        })?;
        SigningKey::from_keypair_bytes(bytes)
            .map(Keypair)
            .map_err(|e| WalletError::validation(format!("inconsistent keypair bytes: {}", e)))
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.0.to_keypair_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key().to_base58())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::is_valid_address;

    #[test]
    fn test_keypair_bytes_round_trip() {
        let keypair = Keypair::generate();
        let bytes = keypair.to_bytes();
        assert_eq!(bytes.len(), 64);

        let restored = Keypair::from_bytes(bytes.as_slice()).unwrap();
        assert_eq!(restored.public_key(), keypair.public_key());
    }

    #[test]
    fn test_public_key_is_a_valid_address() {
        let keypair = Keypair::generate();
        let encoded = keypair.public_key().to_base58();
        assert!(is_valid_address(&encoded));
        assert_eq!(encoded.parse::<PublicKey>().unwrap(), keypair.public_key());
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(Keypair::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_mismatched_public_half() {
        let mut bytes = *Keypair::generate().to_bytes();
        let other = Keypair::generate().to_bytes();
        bytes[32..].copy_from_slice(&other[32..]);
        assert!(Keypair::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_public_key_serde_uses_base58() {
        let key = Keypair::generate().public_key();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_base58()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_debug_hides_secret() {
        let keypair = Keypair::generate();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains(&keypair.public_key().to_base58()));
        assert!(!debug.contains(&format!("{:?}", &keypair.to_bytes()[..32])));
    }
}
