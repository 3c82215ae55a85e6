//! Ledger snapshot files.

use af_operations::adapters::{InMemoryLedger, LedgerSnapshot};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Loads a JSON snapshot into a fresh in-memory ledger.
pub fn load_ledger(path: &Path) -> Result<InMemoryLedger> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading ledger snapshot {}", path.display()))?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing ledger snapshot {}", path.display()))?;
    let ledger = InMemoryLedger::from_snapshot(snapshot)
        .with_context(|| format!("loading ledger snapshot {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = ledger.len(), "Ledger loaded");
    Ok(ledger)
}

/// Writes the ledger back as pretty JSON, replacing `path` atomically.
pub fn save_ledger(ledger: &InMemoryLedger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&ledger.snapshot())?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = ledger.len(), "Ledger saved");
    Ok(())
}
