// Blocks, the chain-invariant checker and the ledger that owns the pending
// pool. Split the same way the transaction module is.

pub mod block;
pub mod chain;
pub mod validation;

pub use block::*;
pub use chain::*;
pub use validation::*;
