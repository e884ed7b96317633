/// Signature verification for transactions, kept apart from the type definitions
use crate::crypto::{derive_identifier, parse_public_key, verify_signature};
use crate::transaction::types::Transaction;
use secp256k1::PublicKey;

impl Transaction {
    /// Rebuilds the canonical payload and checks the signature against the
    /// sender's public key.
    ///
    /// Returns `false` when the key does not belong to `sender_id`, when the
    /// signature is malformed, or when it does not match the payload. Never
    /// panics on attacker-controlled input.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        if derive_identifier(public_key) != self.sender_id {
            return false;
        }
        verify_signature(public_key, &self.signable_message(), &self.signature)
    }

    /// Like [`Transaction::verify`], for a key given as X‖Y or SEC1 bytes.
    /// Bytes that are not a point on the curve verify as `false`.
    pub fn verify_with_key_bytes(&self, public_key_bytes: &[u8]) -> bool {
        match parse_public_key(public_key_bytes) {
            Some(public_key) => self.verify(&public_key),
            None => false,
        }
    }
}
