//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// aidflow: validate and record aid fund transfers
#[derive(Parser, Debug)]
#[command(name = "aidflow", version)]
#[command(about = "Validate and record aid fund transfers against a ledger snapshot")]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "AF_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a request and record it if every check passes
    Submit(SubmitArgs),
    /// Print donated, approved and settled totals for a scope
    Totals(TotalsArgs),
}

/// Arguments of `aidflow submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Ledger snapshot (JSON); rewritten when the operation is accepted
    #[arg(short, long, env = "AF_LEDGER")]
    pub ledger: PathBuf,

    /// Operation request (JSON)
    #[arg(short, long)]
    pub request: PathBuf,

    /// Organization credential of the caller
    #[arg(short, long, env = "AF_CALLER_ORG", default_value = "Org1MSP")]
    pub caller: String,
}

/// Arguments of `aidflow totals`.
#[derive(Args, Debug)]
pub struct TotalsArgs {
    /// Ledger snapshot (JSON)
    #[arg(short, long, env = "AF_LEDGER")]
    pub ledger: PathBuf,

    /// Plan identifier
    #[arg(short, long)]
    pub plan: String,

    /// Beneficiary identifier
    #[arg(short, long)]
    pub beneficiary: String,
}
