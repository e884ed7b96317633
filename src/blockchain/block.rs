use crate::crypto::Sha256Hash;
use crate::error::LedgerError;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// A sealed batch of transactions linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: Sha256Hash,
    pub hash: Sha256Hash,
}

impl Block {
    /// Builds a block stamped with the current time and computes its hash.
    pub fn new(
        index: u64,
        previous_hash: Sha256Hash,
        transactions: Vec<Transaction>,
    ) -> Result<Self, LedgerError> {
        Self::stamped_at(index, Utc::now(), previous_hash, transactions)
    }

    /// Builds a block stamped with `time`. Times before the Unix epoch are
    /// rejected rather than clamped.
    pub fn stamped_at(
        index: u64,
        time: DateTime<Utc>,
        previous_hash: Sha256Hash,
        transactions: Vec<Transaction>,
    ) -> Result<Self, LedgerError> {
        let timestamp =
            u64::try_from(time.timestamp_millis()).map_err(|_| LedgerError::InvalidBlock {
                index,
                reason: format!("timestamp {} is before the Unix epoch", time),
            })?;
        Ok(Self::with_timestamp(
            index,
            timestamp,
            previous_hash,
            transactions,
        ))
    }

    pub fn with_timestamp(
        index: u64,
        timestamp: u64,
        previous_hash: Sha256Hash,
        transactions: Vec<Transaction>,
    ) -> Self {
        let hash = Self::calculate_hash(index, timestamp, &previous_hash, &transactions);
        Block {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash,
        }
    }

    /// Hash over every field except `hash` itself.
    pub fn compute_hash(&self) -> Sha256Hash {
        Self::calculate_hash(
            self.index,
            self.timestamp,
            &self.previous_hash,
            &self.transactions,
        )
    }

    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash)
    }

    fn calculate_hash(
        index: u64,
        timestamp: u64,
        previous_hash: &Sha256Hash,
        transactions: &[Transaction],
    ) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(index.to_le_bytes());
        hasher.update(timestamp.to_le_bytes());
        hasher.update(previous_hash);
        hasher.update((transactions.len() as u64).to_le_bytes());
        for tx in transactions {
            hasher.update(tx.hash());
        }
        hasher.finalize().into()
    }
}
