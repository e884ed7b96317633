//! bc-wallet - content-addressed wallets, signed transfers and a verified
//! transaction pool over a hash-linked ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Cryptography
//! - [`crypto`] - Key pairs, identifiers, SHA-256 and ECDSA (secp256k1)
//!
//! ## State Management
//! - [`amount`] - Fixed-point currency amounts
//! - [`wallet`] - Address registry, balances and transfers
//!
//! ## Core Ledger
//! - [`transaction`] - Transaction types, signing and verification
//! - [`mempool`] - Pool of verified, unsealed transactions
//! - [`blockchain`] - Blocks, chain validation and the ledger
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use bc_wallet::{Amount, Blockchain, LedgerConfig, Wallet};
//! use std::sync::Arc;
//!
//! let wallet = Arc::new(Wallet::new());
//! let alice = wallet.mint()?;
//! let bob = wallet.mint()?;
//! wallet.set_balance(&alice, Amount::from_units(100))?;
//!
//! let ledger = Blockchain::new(wallet.clone(), &LedgerConfig::default())?;
//! let tx = wallet.transfer(&alice, &bob, "50".parse()?)?;
//! assert!(ledger.admit(tx));
//! assert_eq!(wallet.balance(&bob)?, Amount::from_units(50));
//! # Ok::<(), bc_wallet::LedgerError>(())
//! ```

#![forbid(unsafe_code)]

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// State Management
// ============================================================================
pub mod amount;
pub mod wallet;

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use amount::Amount;
pub use blockchain::{validate_chain, Block, Blockchain};
pub use config::LedgerConfig;
pub use crypto::{derive_identifier, Identifier, KeyPair, Sha256Hash};
pub use error::{LedgerError, Result, Role};
pub use mempool::TransactionPool;
pub use transaction::Transaction;
pub use wallet::{KeyDirectory, Wallet};
