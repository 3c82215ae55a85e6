//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `OperationApi`
//! - **Driven Ports (Outbound)**: `LedgerReader`, `LedgerWriter`,
//!   `IdentityProvider`, `TrackingIdGenerator`, `TimeSource`
//! - No concrete ledger implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
