//! # aidflow CLI
//!
//! Drives the operations service against a JSON ledger snapshot.
//!
//! | Command | Exit code |
//! |---------|-----------|
//! | `submit`, accepted | 0 |
//! | `submit`, rejected | 2 |
//! | any fault or I/O error | 1 |

pub mod cli;
pub mod commands;
pub mod store;
