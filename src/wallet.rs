//! Address registry: owns key material and balances, and is the only place
//! balances change.

use crate::amount::Amount;
use crate::crypto::{Identifier, KeyPair};
use crate::error::{LedgerError, Result, Role};
use crate::transaction::Transaction;
use parking_lot::RwLock;
use rand::RngCore;
use secp256k1::PublicKey;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Resolves the public key and issued sequence numbers behind an identifier.
/// Admission and chain validation go through this instead of touching the
/// registry directly.
pub trait KeyDirectory: Send + Sync {
    fn public_key(&self, id: &Identifier) -> Option<PublicKey>;

    /// Nonce the next transfer from `id` will carry. Every nonce below it
    /// has been issued by a transfer.
    fn next_nonce(&self, id: &Identifier) -> Option<u64>;
}

/// One registry entry.
#[derive(Debug)]
pub(crate) struct Address {
    key_pair: KeyPair,
    id: Identifier,
    balance: Amount,
    nonce: u64,
}

impl Address {
    fn new(key_pair: KeyPair) -> Self {
        let id = key_pair.identifier();
        Address {
            key_pair,
            id,
            balance: Amount::ZERO,
            nonce: 0,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Sequence number the next outgoing transfer will carry.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn public_key(&self) -> PublicKey {
        self.key_pair.public_key()
    }
}

/// Keyed container of addresses guarded by a single lock. A transfer holds
/// the write lock for its whole critical section.
#[derive(Debug, Default)]
pub struct Wallet {
    addresses: RwLock<HashMap<Identifier, Address>>,
}

fn not_found(role: Role, id: &Identifier) -> LedgerError {
    LedgerError::AddressNotFound {
        role,
        id: id.clone(),
    }
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a key pair, derives its identifier and registers a new
    /// zero-balance address under it.
    pub fn mint(&self) -> Result<Identifier> {
        let key_pair = KeyPair::generate()?;
        Ok(self.import_key_pair(key_pair))
    }

    /// [`Wallet::mint`] with an explicit randomness source. Nothing is
    /// registered if the source fails.
    pub fn mint_with<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<Identifier> {
        let key_pair = KeyPair::generate_with(rng)?;
        Ok(self.import_key_pair(key_pair))
    }

    /// Registers an existing key pair. Importing the same key twice keeps the
    /// original entry and its balance. Not public: a registered key has no
    /// copy outside the registry.
    pub(crate) fn import_key_pair(&self, key_pair: KeyPair) -> Identifier {
        let address = Address::new(key_pair);
        let id = address.id.clone();
        self.addresses.write().entry(id.clone()).or_insert(address);
        debug!(address = %id, "minted address");
        id
    }

    /// Administrative funding; not part of the transfer flow.
    pub fn set_balance(&self, id: &Identifier, amount: Amount) -> Result<()> {
        let mut addresses = self.addresses.write();
        let address = addresses
            .get_mut(id)
            .ok_or_else(|| not_found(Role::Account, id))?;
        address.balance = amount;
        debug!(address = %id, balance = %amount, "balance set");
        Ok(())
    }

    pub fn balance(&self, id: &Identifier) -> Result<Amount> {
        self.addresses
            .read()
            .get(id)
            .map(Address::balance)
            .ok_or_else(|| not_found(Role::Account, id))
    }

    pub fn nonce(&self, id: &Identifier) -> Result<u64> {
        self.addresses
            .read()
            .get(id)
            .map(Address::nonce)
            .ok_or_else(|| not_found(Role::Account, id))
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.addresses.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.addresses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.read().is_empty()
    }

    /// All registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<Identifier> {
        let mut ids: Vec<Identifier> = self.addresses.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Sum of every balance in minor units, taken under one read lock.
    pub fn total_balance(&self) -> u128 {
        self.addresses
            .read()
            .values()
            .map(|address| u128::from(address.balance.minor()))
            .sum()
    }

    /// Moves `amount` from `sender_id` to `receiver_id` and returns the signed
    /// transaction.
    ///
    /// Checks, in order: sender exists, receiver exists, sender can cover the
    /// amount, receiver can hold it. Balances change only after the signature
    /// has been produced; on any error the registry is untouched. The returned
    /// transaction is not submitted anywhere.
    pub fn transfer(
        &self,
        sender_id: &Identifier,
        receiver_id: &Identifier,
        amount: Amount,
    ) -> Result<Transaction> {
        let mut addresses = self.addresses.write();

        let (tx, sender_after, receiver_after) = {
            let sender = addresses
                .get(sender_id)
                .ok_or_else(|| not_found(Role::Sender, sender_id))?;
            let receiver = addresses
                .get(receiver_id)
                .ok_or_else(|| not_found(Role::Receiver, receiver_id))?;

            let sender_after = sender.balance.checked_sub(amount).ok_or_else(|| {
                warn!(
                    address = %sender_id,
                    requested = %amount,
                    available = %sender.balance,
                    "transfer rejected: insufficient balance"
                );
                LedgerError::InsufficientBalance {
                    address: sender_id.clone(),
                    requested: amount,
                    available: sender.balance,
                }
            })?;

            // A self-transfer nets out; only distinct receivers are credited.
            let receiver_after = if sender_id == receiver_id {
                None
            } else {
                let credited = receiver.balance.checked_add(amount).ok_or_else(|| {
                    LedgerError::BalanceOverflow {
                        address: receiver_id.clone(),
                    }
                })?;
                Some(credited)
            };

            let tx = Transaction::signed(
                sender_id.clone(),
                receiver_id.clone(),
                amount,
                sender.nonce,
                &sender.key_pair,
            )?;
            (tx, sender_after, receiver_after)
        };

        if let Some(sender) = addresses.get_mut(sender_id) {
            if receiver_after.is_some() {
                sender.balance = sender_after;
            }
            sender.nonce += 1;
        }
        if let (Some(balance), Some(receiver)) = (receiver_after, addresses.get_mut(receiver_id)) {
            receiver.balance = balance;
        }

        info!(
            sender = %sender_id,
            receiver = %receiver_id,
            amount = %amount,
            nonce = tx.nonce,
            "transfer signed"
        );
        Ok(tx)
    }
}

impl KeyDirectory for Wallet {
    fn public_key(&self, id: &Identifier) -> Option<PublicKey> {
        self.addresses.read().get(id).map(Address::public_key)
    }

    fn next_nonce(&self, id: &Identifier) -> Option<u64> {
        self.addresses.read().get(id).map(Address::nonce)
    }
}
