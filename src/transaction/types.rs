/// Transaction types for bc-wallet
use crate::amount::Amount;
use crate::crypto::{Identifier, KeyPair, Sha256Hash};
use crate::error::LedgerError;
use sha2::{Digest, Sha256};

/// Domain tag prefixed to every transfer payload.
pub const TRANSFER_DOMAIN: &[u8] = b"bc-wallet:transfer:v1";

/// Builds the byte sequence a transfer signature covers.
///
/// Identifiers are length-prefixed so that no two distinct
/// `(sender, receiver)` pairs can encode to the same bytes; the amount is
/// encoded as its exact minor-unit count.
pub fn canonical_payload(
    sender_id: &Identifier,
    receiver_id: &Identifier,
    amount: Amount,
    nonce: u64,
) -> Vec<u8> {
    let sender = sender_id.as_str().as_bytes();
    let receiver = receiver_id.as_str().as_bytes();

    let mut message = Vec::with_capacity(TRANSFER_DOMAIN.len() + sender.len() + receiver.len() + 32);
    message.extend_from_slice(TRANSFER_DOMAIN);
    message.extend_from_slice(&(sender.len() as u64).to_le_bytes());
    message.extend_from_slice(sender);
    message.extend_from_slice(&(receiver.len() as u64).to_le_bytes());
    message.extend_from_slice(receiver);
    message.extend_from_slice(&amount.to_le_bytes());
    message.extend_from_slice(&nonce.to_le_bytes());
    message
}

/// A signed value transfer between two registry addresses.
///
/// Carries no public key; verifiers resolve the sender's key themselves.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender_id: Identifier,
    pub receiver_id: Identifier,
    pub amount: Amount,
    /// Sender's sequence number at signing time
    pub nonce: u64,
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Builds the canonical payload for the transfer and signs it with the
    /// sender's key. Only the registry signs transfers.
    pub(crate) fn signed(
        sender_id: Identifier,
        receiver_id: Identifier,
        amount: Amount,
        nonce: u64,
        key_pair: &KeyPair,
    ) -> Result<Self, LedgerError> {
        let message = canonical_payload(&sender_id, &receiver_id, amount, nonce);
        let signature = key_pair.sign(&message)?;

        Ok(Transaction {
            sender_id,
            receiver_id,
            amount,
            nonce,
            signature: signature.to_vec(),
        })
    }

    pub fn signable_message(&self) -> Vec<u8> {
        canonical_payload(&self.sender_id, &self.receiver_id, self.amount, self.nonce)
    }

    /// Calculate the hash of this transaction (payload and signature)
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.signable_message());
        hasher.update(&self.signature);
        hasher.finalize().into()
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(&self.signature)
    }
}
