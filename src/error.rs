//! Error types for bc-wallet

use crate::amount::Amount;
use crate::crypto::Identifier;
use std::fmt;
use thiserror::Error;

/// Which side of an operation an identifier was looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
    /// Lookups outside a transfer (balance queries, administrative funding).
    Account,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "sender"),
            Role::Receiver => write!(f, "receiver"),
            Role::Account => write!(f, "account"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{role} address {id} does not exist")]
    AddressNotFound { role: Role, id: Identifier },

    #[error("Insufficient balance in address {address}: requested {requested}, available {available}")]
    InsufficientBalance {
        address: Identifier,
        requested: Amount,
        available: Amount,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Balance of address {address} would overflow")]
    BalanceOverflow { address: Identifier },

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Failed to sign transaction: {0}")]
    SigningFailure(String),

    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Invalid block {index}: {reason}")]
    InvalidBlock { index: u64, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// True for lookup misses, regardless of which side missed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::AddressNotFound { .. })
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
