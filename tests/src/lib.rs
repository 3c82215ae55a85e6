//! # aidflow Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Seeded ledgers, services, request builders
//! ├── integration/
//! │   ├── flows.rs       # Donation → approval → settlement end to end
//! │   └── concurrency.rs # Conflicting commits, parallel submitters
//! └── properties.rs      # Flow conservation under random sequences
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p af-tests
//! cargo test -p af-tests integration::concurrency
//! ```

pub mod fixtures;
pub mod integration;
pub mod properties;
