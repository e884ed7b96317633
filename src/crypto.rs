//! Cryptographic primitives for bc-wallet: key pairs, identifiers, digests
//! and ECDSA signatures over secp256k1.

use crate::error::LedgerError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, SECRET_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A thread-safe, lazily initialized Secp256k1 context shared by every
/// signing and verification call.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// The single curve every address in the process is generated on.
pub const CURVE_NAME: &str = "secp256k1";

/// Width of the X‖Y public key serialization that identifiers are derived from.
pub const PUBLIC_KEY_XY_SIZE: usize = UNCOMPRESSED_PUBLIC_KEY_SIZE - 1;

/// Width of a compact `r‖s` signature.
pub const SIGNATURE_SIZE: usize = COMPACT_SIGNATURE_SIZE;

/// Draws allowed before key generation gives up on finding a valid scalar.
const MAX_KEYGEN_ATTEMPTS: usize = 16;

pub type Sha256Hash = [u8; 32];

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> Sha256Hash {
    Sha256::digest(data).into()
}

/// Content-addressed wallet identifier: lowercase hex of a SHA-256 digest.
///
/// Any string can be wrapped so that callers can ask about identifiers that
/// were never minted; only [`derive_identifier`] produces real ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn from_digest(digest: &Sha256Hash) -> Self {
        Identifier(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Serializes a public key as big-endian X followed by big-endian Y, each
/// zero-padded to 32 bytes.
pub fn serialize_public_key(public_key: &PublicKey) -> [u8; PUBLIC_KEY_XY_SIZE] {
    let uncompressed = public_key.serialize_uncompressed();
    let mut xy = [0u8; PUBLIC_KEY_XY_SIZE];
    // Drop the SEC1 0x04 tag.
    xy.copy_from_slice(&uncompressed[1..]);
    xy
}

/// Derives the identifier of a public key: `hex(SHA-256(X‖Y))`.
pub fn derive_identifier(public_key: &PublicKey) -> Identifier {
    Identifier::from_digest(&sha256(&serialize_public_key(public_key)))
}

/// Parses a public key from X‖Y bytes or a SEC1 (compressed or uncompressed)
/// encoding. Returns `None` if the bytes do not describe a point on the curve.
pub fn parse_public_key(bytes: &[u8]) -> Option<PublicKey> {
    if bytes.len() == PUBLIC_KEY_XY_SIZE {
        let mut sec1 = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(bytes);
        return PublicKey::from_slice(&sec1).ok();
    }
    PublicKey::from_slice(bytes).ok()
}

/// Signing key material. Not `Clone`; a key pair lives inside exactly one
/// registry entry.
#[derive(Debug)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Result<Self, LedgerError> {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a KeyPair from the given source of randomness. A failing
    /// source aborts this call with `RandomnessUnavailable`.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, LedgerError> {
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let mut candidate = [0u8; SECRET_KEY_SIZE];
            rng.try_fill_bytes(&mut candidate)
                .map_err(|e| LedgerError::RandomnessUnavailable(e.to_string()))?;
            // Zero or >= curve order: draw again.
            if let Ok(secret_key) = SecretKey::from_slice(&candidate) {
                return Ok(Self::from_secret_key(secret_key));
            }
        }
        Err(LedgerError::RandomnessUnavailable(format!(
            "no valid secret key after {} draws",
            MAX_KEYGEN_ATTEMPTS
        )))
    }

    /// Creates a KeyPair from an existing SecretKey.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(LedgerError::InvalidKey(format!(
                "Secret key must be {} bytes, got {}",
                SECRET_KEY_SIZE,
                bytes.len()
            )));
        }
        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| LedgerError::InvalidKey(format!("Invalid secret key bytes: {}", e)))?;
        Ok(Self::from_secret_key(secret_key))
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// X‖Y serialization of the public key.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_XY_SIZE] {
        serialize_public_key(&self.public_key)
    }

    pub fn identifier(&self) -> Identifier {
        derive_identifier(&self.public_key)
    }

    /// Signs a message (which is first hashed using SHA-256) and returns the
    /// compact signature bytes. Nonces are RFC 6979 deterministic.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE], LedgerError> {
        let digest = sha256(message);
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| LedgerError::SigningFailure(format!("Failed to create message: {}", e)))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_compact())
    }
}

/// Checks a compact signature over `message` against `public_key`.
/// Malformed signatures and mismatches are both reported as `false`.
pub fn verify_signature(public_key: &PublicKey, message: &[u8], signature_bytes: &[u8]) -> bool {
    if signature_bytes.len() != SIGNATURE_SIZE {
        return false;
    }
    let signature = match Signature::from_compact(signature_bytes) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let digest = sha256(message);
    let message = match Message::from_digest_slice(&digest) {
        Ok(message) => message,
        Err(_) => return false,
    };

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, public_key)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An RNG whose OS source has gone away.
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source exhausted"))
        }
    }

    /// An RNG that only ever yields zero, which is never a valid scalar.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate().unwrap();
        assert_eq!(keypair.public_key_bytes().len(), PUBLIC_KEY_XY_SIZE);
        assert_eq!(keypair.secret_key.secret_bytes().len(), SECRET_KEY_SIZE);
    }

    #[test]
    fn test_public_key_serialization_is_x_then_y() {
        let keypair = KeyPair::generate().unwrap();
        let uncompressed = keypair.public_key().serialize_uncompressed();
        let xy = keypair.public_key_bytes();
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(&xy[..32], &uncompressed[1..33]);
        assert_eq!(&xy[32..], &uncompressed[33..]);
    }

    #[test]
    fn test_identifier_derivation() {
        let keypair = KeyPair::generate().unwrap();
        let id = keypair.identifier();
        assert_eq!(id.as_str().len(), 64);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

        let expected = hex::encode(Sha256::digest(keypair.public_key_bytes()));
        assert_eq!(id.as_str(), expected);
        assert_eq!(derive_identifier(&keypair.public_key()), id);
    }

    #[test]
    fn test_known_secret_gives_known_identifier() {
        let mut secret = [0u8; SECRET_KEY_SIZE];
        secret[31] = 1;
        let keypair = KeyPair::from_secret_bytes(&secret).unwrap();

        // 1·G on secp256k1.
        let gx = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
        let gy = "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
        assert_eq!(hex::encode(&keypair.public_key_bytes()[..32]), gx);
        assert_eq!(hex::encode(&keypair.public_key_bytes()[32..]), gy);

        let xy = hex::decode(format!("{}{}", gx, gy)).unwrap();
        assert_eq!(keypair.identifier().as_str(), hex::encode(Sha256::digest(&xy)));
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"Hello, bc-wallet!";

        let signature = keypair.sign(message).unwrap();
        assert_eq!(signature.len(), SIGNATURE_SIZE);
        assert!(verify_signature(&keypair.public_key(), message, &signature));
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let keypair = KeyPair::generate().unwrap();
        let first = keypair.sign(b"same message").unwrap();
        let second = keypair.sign(b"same message").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_signature() {
        let keypair1 = KeyPair::generate().unwrap();
        let keypair2 = KeyPair::generate().unwrap();

        let message = b"Test message";
        let signature = keypair1.sign(message).unwrap();
        assert!(!verify_signature(&keypair2.public_key(), message, &signature));
    }

    #[test]
    fn test_tampered_message() {
        let keypair = KeyPair::generate().unwrap();
        let signature = keypair.sign(b"Original message").unwrap();
        assert!(!verify_signature(
            &keypair.public_key(),
            b"Tampered message",
            &signature
        ));
    }

    #[test]
    fn test_malformed_signature_is_false() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"Test";
        let signature = keypair.sign(message).unwrap();

        assert!(!verify_signature(&keypair.public_key(), message, &signature[1..]));
        assert!(!verify_signature(&keypair.public_key(), message, &[]));
        assert!(!verify_signature(&keypair.public_key(), message, &[0xFF; SIGNATURE_SIZE]));
    }

    #[test]
    fn test_parse_public_key_encodings() {
        let keypair = KeyPair::generate().unwrap();
        let expected = keypair.public_key();

        assert_eq!(parse_public_key(&keypair.public_key_bytes()), Some(expected));
        assert_eq!(parse_public_key(&expected.serialize()), Some(expected));
        assert_eq!(
            parse_public_key(&expected.serialize_uncompressed()),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_public_key_rejects_points_off_curve() {
        assert!(parse_public_key(&[0u8; PUBLIC_KEY_XY_SIZE]).is_none());
        assert!(parse_public_key(&[7u8; 10]).is_none());

        // An identifier is a digest, not a point.
        let keypair = KeyPair::generate().unwrap();
        let digest = hex::decode(keypair.identifier().as_str()).unwrap();
        assert!(parse_public_key(&digest).is_none());
    }

    #[test]
    fn test_failing_rng_aborts_generation() {
        let result = KeyPair::generate_with(&mut FailingRng);
        assert!(matches!(result, Err(LedgerError::RandomnessUnavailable(_))));
    }

    #[test]
    fn test_degenerate_rng_gives_up() {
        let result = KeyPair::generate_with(&mut ZeroRng);
        match result {
            Err(LedgerError::RandomnessUnavailable(msg)) => assert!(msg.contains("draws")),
            other => panic!("Expected RandomnessUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_from_secret_bytes_invalid_length() {
        let short_bytes = [0u8; SECRET_KEY_SIZE - 1];
        let result = KeyPair::from_secret_bytes(&short_bytes);
        assert!(matches!(result, Err(LedgerError::InvalidKey(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Secret key must be"));
    }

    #[test]
    fn test_from_secret_bytes_out_of_range() {
        let zero = [0u8; SECRET_KEY_SIZE];
        let result = KeyPair::from_secret_bytes(&zero);
        assert!(matches!(result, Err(LedgerError::InvalidKey(_))));
    }
}
