//! Export the solver policy table to SQLite.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE positions (
//!     bits    INTEGER PRIMARY KEY,  -- board encoding, solver to move
//!     reply_x INTEGER NOT NULL,
//!     reply_y INTEGER NOT NULL,
//!     rule    TEXT NOT NULL
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{ensure, Context};
use rusqlite::{params, Connection};
use tracing::info;

use crate::audit::PolicyEntry;

/// Create the table and insert every entry in one transaction.
pub fn write_policy(
    conn: &Connection,
    policy: &BTreeMap<u32, PolicyEntry>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "CREATE TABLE positions (
            bits INTEGER PRIMARY KEY,
            reply_x INTEGER NOT NULL,
            reply_y INTEGER NOT NULL,
            rule TEXT NOT NULL
        )",
        [],
    )?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO positions (bits, reply_x, reply_y, rule) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (&bits, entry) in policy {
            stmt.execute(params![bits, entry.reply.x, entry.reply.y, entry.rule])?;
        }
    }
    tx.commit()?;

    Ok(policy.len())
}

/// Look up the recorded reply for a position.
pub fn lookup(conn: &Connection, bits: u32) -> rusqlite::Result<Option<(i32, i32, String)>> {
    let mut stmt = conn.prepare("SELECT reply_x, reply_y, rule FROM positions WHERE bits = ?1")?;
    let mut rows = stmt.query(params![bits])?;
    match rows.next()? {
        Some(row) => Ok(Some((row.get(0)?, row.get(1)?, row.get(2)?))),
        None => Ok(None),
    }
}

/// Write the policy to a fresh database at `path` and spot-check a few rows.
pub fn export(path: &Path, policy: &BTreeMap<u32, PolicyEntry>) -> anyhow::Result<usize> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove existing {}", path.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to create database {}", path.display()))?;
    let count = write_policy(&conn, policy).context("failed to write policy table")?;

    let step = (policy.len() / 5).max(1);
    for (&bits, entry) in policy.iter().step_by(step).take(5) {
        let row = lookup(&conn, bits)?;
        ensure!(
            row == Some((entry.reply.x, entry.reply.y, entry.rule.to_string())),
            "verification failed for position {bits:#x}"
        );
    }

    info!(count, path = %path.display(), "policy exported");
    Ok(count)
}
