use crate::blockchain::block::Block;
use crate::blockchain::validation::validate_chain;
use crate::config::LedgerConfig;
use crate::crypto::{sha256, Sha256Hash};
use crate::error::LedgerError;
use crate::mempool::TransactionPool;
use crate::transaction::Transaction;
use crate::wallet::KeyDirectory;
use parking_lot::RwLock;
use std::sync::Arc;

/// The pending pool plus the sealed block sequence.
///
/// Sealing is not implemented: nothing in this crate appends to `chain`.
/// Whatever eventually does must keep [`Blockchain::validate`] passing.
pub struct Blockchain {
    directory: Arc<dyn KeyDirectory>,
    pool: TransactionPool,
    chain: RwLock<Vec<Block>>,
    genesis_previous_hash: Sha256Hash,
}

impl Blockchain {
    /// Creates an empty ledger whose admissions resolve sender keys through
    /// `directory`.
    pub fn new(directory: Arc<dyn KeyDirectory>, config: &LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Blockchain {
            directory,
            pool: TransactionPool::with_capacity(config.pool.max_pending),
            chain: RwLock::new(Vec::new()),
            genesis_previous_hash: config.genesis_previous_hash()?,
        })
    }

    /// The ledger's digest function.
    pub fn hash_function(data: &[u8]) -> Sha256Hash {
        sha256(data)
    }

    pub fn hash_hex(data: &[u8]) -> String {
        hex::encode(Self::hash_function(data))
    }

    /// Verifies `tx` against the sender's registered key and appends it to
    /// the pending pool. See [`TransactionPool::admit`].
    pub fn admit(&self, tx: Transaction) -> bool {
        self.pool.admit(tx, self.directory.as_ref())
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.pending()
    }

    /// Snapshot of the sealed blocks.
    pub fn chain(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    pub fn height(&self) -> usize {
        self.chain.read().len()
    }

    /// `previous_hash` the first block must carry.
    pub fn genesis_previous_hash(&self) -> Sha256Hash {
        self.genesis_previous_hash
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_chain(
            &self.chain.read(),
            &self.genesis_previous_hash,
            self.directory.as_ref(),
        )
    }
}
