use crate::blockchain::block::Block;
use crate::crypto::Sha256Hash;
use crate::error::LedgerError;
use crate::wallet::KeyDirectory;
use std::collections::HashMap;

fn invalid(block: &Block, reason: String) -> LedgerError {
    LedgerError::InvalidBlock {
        index: block.index,
        reason,
    }
}

/// Checks the hash-chain invariants of `blocks`:
/// - block `i` has index `i`;
/// - the first block links to `genesis_previous_hash`, every later one to its
///   predecessor's hash;
/// - every stored hash matches the block contents;
/// - every transaction carries a nonce its sender's registry has issued,
///   verifies against its sender's key and appears once.
pub fn validate_chain(
    blocks: &[Block],
    genesis_previous_hash: &Sha256Hash,
    directory: &dyn KeyDirectory,
) -> Result<(), LedgerError> {
    let mut expected_previous = *genesis_previous_hash;
    let mut seen_transactions: HashMap<Sha256Hash, u64> = HashMap::new();

    for (position, block) in blocks.iter().enumerate() {
        let position = position as u64;
        if block.index != position {
            return Err(invalid(
                block,
                format!("expected index {}, got {}", position, block.index),
            ));
        }

        if block.previous_hash != expected_previous {
            return Err(invalid(
                block,
                format!(
                    "previous hash mismatch: expected {}, got {}",
                    hex::encode(expected_previous),
                    hex::encode(block.previous_hash)
                ),
            ));
        }

        if !block.has_valid_hash() {
            return Err(invalid(
                block,
                format!(
                    "stored hash {} does not match contents ({})",
                    block.hash_str(),
                    hex::encode(block.compute_hash())
                ),
            ));
        }

        for tx in &block.transactions {
            let issued = directory
                .next_nonce(&tx.sender_id)
                .is_some_and(|next| tx.nonce < next);
            if !issued {
                return Err(invalid(
                    block,
                    format!(
                        "transaction {} carries unissued nonce {}",
                        tx.hash_str(),
                        tx.nonce
                    ),
                ));
            }

            let verified = directory
                .public_key(&tx.sender_id)
                .map(|public_key| tx.verify(&public_key))
                .unwrap_or(false);
            if !verified {
                return Err(invalid(
                    block,
                    format!("transaction {} does not verify", tx.hash_str()),
                ));
            }

            if let Some(first_index) = seen_transactions.insert(tx.hash(), block.index) {
                return Err(invalid(
                    block,
                    format!(
                        "transaction {} already included in block {}",
                        tx.hash_str(),
                        first_index
                    ),
                ));
            }
        }

        expected_previous = block.hash;
    }

    Ok(())
}
