//! Pool of verified transactions waiting to be sealed into a block.

use crate::crypto::Sha256Hash;
use crate::transaction::Transaction;
use crate::wallet::KeyDirectory;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default cap on pending transactions.
pub const DEFAULT_MAX_PENDING: usize = 10_000;

#[derive(Debug, Default)]
struct PoolState {
    pending: Vec<Transaction>,
    hashes: HashSet<Sha256Hash>,
}

/// Ordered pending transactions. Only [`TransactionPool::admit`] adds to it,
/// and only after the signature checks out.
#[derive(Debug)]
pub struct TransactionPool {
    state: Mutex<PoolState>,
    max_pending: usize,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_PENDING)
    }

    pub fn with_capacity(max_pending: usize) -> Self {
        TransactionPool {
            state: Mutex::new(PoolState::default()),
            max_pending,
        }
    }

    /// Verifies `tx` against the sender's key from `directory` and appends it.
    ///
    /// Returns `false`, leaving the pool as it was, when the sender is
    /// unknown, the nonce was never issued by the sender's registry, the
    /// signature does not verify, the same transaction is already pending, or
    /// the pool is full.
    pub fn admit(&self, tx: Transaction, directory: &dyn KeyDirectory) -> bool {
        let public_key = match directory.public_key(&tx.sender_id) {
            Some(public_key) => public_key,
            None => {
                warn!(sender = %tx.sender_id, "admission rejected: unknown sender");
                return false;
            }
        };
        let issued = directory
            .next_nonce(&tx.sender_id)
            .is_some_and(|next| tx.nonce < next);
        if !issued {
            warn!(sender = %tx.sender_id, nonce = tx.nonce, "admission rejected: nonce not issued");
            return false;
        }
        if !tx.verify(&public_key) {
            warn!(sender = %tx.sender_id, nonce = tx.nonce, "admission rejected: invalid signature");
            return false;
        }

        let hash = tx.hash();
        let mut state = self.state.lock();
        if state.hashes.contains(&hash) {
            warn!(tx = %hex::encode(hash), "admission rejected: already pending");
            return false;
        }
        if state.pending.len() >= self.max_pending {
            warn!(capacity = self.max_pending, "admission rejected: pool full");
            return false;
        }

        state.hashes.insert(hash);
        state.pending.push(tx);
        debug!(tx = %hex::encode(hash), pending = state.pending.len(), "transaction admitted");
        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().pending.is_empty()
    }

    pub fn contains(&self, hash: &Sha256Hash) -> bool {
        self.state.lock().hashes.contains(hash)
    }

    /// Snapshot of the pending transactions in admission order.
    pub fn pending(&self) -> Vec<Transaction> {
        self.state.lock().pending.clone()
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }
}
