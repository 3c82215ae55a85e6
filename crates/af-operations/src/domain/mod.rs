//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for operation validation.
//! NO I/O, NO async.
//!
//! - `validation` - structural, temporal and donor-checksum gate
//! - `transition` - per-stage flow-conservation inequalities
//! - `ledger` / `predicate` - how entities map onto ledger documents and queries

pub mod entities;
pub mod ledger;
pub mod predicate;
pub mod transition;
pub mod validation;
pub mod value_objects;

pub use entities::*;
pub use ledger::*;
pub use predicate::*;
pub use transition::*;
pub use validation::*;
pub use value_objects::*;
