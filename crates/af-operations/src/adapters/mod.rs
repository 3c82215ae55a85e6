//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! - `memory_ledger` - versioned in-memory ledger with read-set validation
//! - `identity` - static caller identity, tracking id generators, fixed clock

pub mod identity;
pub mod memory_ledger;

pub use identity::*;
pub use memory_ledger::*;
