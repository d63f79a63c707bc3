//! Materialized per-entry statistics.
//!
//! One `_statistics_` row per entry: first/last/largest plaintext size,
//! first/last date and user, and a labels snapshot. The row is an upsert
//! target recomputed after every mutating operation; cleanup rebuilds the
//! whole table.

use rusqlite::{params, Connection};

use crate::crypto::storage_id;
use crate::error::Result;
use crate::models::FileStats;
use crate::store;

/// Recompute the aggregate row for one entry from its version history and
/// upsert it. Returns `None` when the entry has no versions.
pub fn recompute(conn: &Connection, name: &str) -> Result<Option<FileStats>> {
    let table = storage_id(name);
    if !store::table_exists(conn, &table)? {
        return Ok(None);
    }
    let versions = store::version_count(conn, &table)?;
    if versions == 0 {
        return Ok(None);
    }

    let first = conn.query_row(
        &format!("SELECT size, date, user FROM \"{table}\" ORDER BY version ASC LIMIT 1"),
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    let last: (i64, String, String) = conn.query_row(
        &format!("SELECT size, date, user FROM \"{table}\" ORDER BY version DESC LIMIT 1"),
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    let biggest: i64 = conn.query_row(
        &format!("SELECT MAX(size) FROM \"{table}\""),
        [],
        |row| row.get(0),
    )?;
    let labels = store::entry_labels(conn, name)?.unwrap_or_default();

    let stats = FileStats {
        file_name: name.to_string(),
        first_size: first.0,
        last_size: last.0,
        biggest_size: biggest,
        first_date: first.1,
        last_date: last.1,
        first_user: first.2,
        last_user: last.2,
        labels,
        versions,
    };
    upsert(conn, &stats)?;
    Ok(Some(stats))
}

fn upsert(conn: &Connection, stats: &FileStats) -> Result<()> {
    conn.execute(
        "INSERT INTO _statistics_ (file, size0, size, sizeB, date0, date, user0, user, labels)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(file) DO UPDATE SET size0 = ?2, size = ?3, sizeB = ?4,
             date0 = ?5, date = ?6, user0 = ?7, user = ?8, labels = ?9",
        params![
            stats.file_name,
            stats.first_size,
            stats.last_size,
            stats.biggest_size,
            stats.first_date,
            stats.last_date,
            stats.first_user,
            stats.last_user,
            stats.labels,
        ],
    )?;
    Ok(())
}

pub fn set_labels(conn: &Connection, name: &str, labels: &str) -> Result<()> {
    conn.execute(
        "UPDATE _statistics_ SET labels = ?1 WHERE file = ?2",
        params![labels, name],
    )?;
    Ok(())
}

pub fn remove(conn: &Connection, name: &str) -> Result<()> {
    conn.execute("DELETE FROM _statistics_ WHERE file = ?1", params![name])?;
    Ok(())
}

pub fn rename(conn: &Connection, name: &str, new_name: &str) -> Result<()> {
    conn.execute(
        "UPDATE _statistics_ SET file = ?1 WHERE file = ?2",
        params![new_name, name],
    )?;
    Ok(())
}

/// Truncate and rebuild the whole table from the entries. Returns how many
/// rows were materialized.
pub fn rebuild(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM _statistics_", [])?;
    let names = store::entry_names(conn)?;
    let mut rebuilt = 0;
    for name in names {
        if recompute(conn, &name)?.is_some() {
            rebuilt += 1;
        }
    }
    Ok(rebuilt)
}
