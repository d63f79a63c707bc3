//! The relational container.
//!
//! One SQLite file per vault, with four singleton tables plus one version
//! table per entry. Table and column names are part of the on-disk
//! contract:
//!
//! - `_info_(pwd BLOB, salt BLOB, date TEXT, user TEXT, version TEXT)`,
//!   exactly one row;
//! - `_files_(file TEXT UNIQUE, pwd BLOB, labels TEXT)`, one row per entry;
//! - `_statistics_(file TEXT UNIQUE, size0, size, sizeB, date0, date,
//!   user0, user, labels)`;
//! - `_logs_(date TEXT, msg TEXT)`;
//! - `t<hex-md4-of-name>(version INTEGER PRIMARY KEY ASC, raw BLOB,
//!   hash TEXT, size INTEGER, date TEXT, user TEXT)` per entry.
//!
//! Schema creation is idempotent at open time. Every mutation runs inside
//! one transaction obtained from [`Store::tx`]; read-only operations work
//! directly on the shared connection. Version-table identifiers are hex
//! digests by construction, so interpolating them into SQL is safe.

use std::path::Path;

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::{error, info};

use crate::error::Result;
use crate::models::Verbosity;

/// Payload rows keep the abbreviated-month form for binary compatibility.
pub const PAYLOAD_DATE_FORMAT: &str = "%Y-%b-%d %H:%M:%S";
/// Logs and the info row use the numeric form.
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn payload_timestamp() -> String {
    Local::now().format(PAYLOAD_DATE_FORMAT).to_string()
}

pub fn log_timestamp() -> String {
    Local::now().format(LOG_DATE_FORMAT).to_string()
}

/// Effective OS user recorded on payload and info rows.
pub fn effective_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[derive(Debug)]
pub struct Store {
    conn: Connection,
    verbosity: Verbosity,
}

impl Store {
    /// Open or create the container file and bootstrap the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            verbosity: Verbosity::default(),
        };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _info_ (pwd BLOB, salt BLOB, date TEXT, user TEXT, version TEXT);
             CREATE TABLE IF NOT EXISTS _files_ (file TEXT UNIQUE, pwd BLOB, labels TEXT);
             CREATE TABLE IF NOT EXISTS _statistics_ (file TEXT UNIQUE, size0 INTEGER, size INTEGER,
                 sizeB INTEGER, date0 TEXT, date TEXT, user0 TEXT, user TEXT, labels TEXT);
             CREATE TABLE IF NOT EXISTS _logs_ (date TEXT, msg TEXT);",
        )?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// One atomic commit per mutation. Dropping the transaction without
    /// committing rolls everything back.
    pub fn tx(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// The singleton `_info_` row: (pwd, salt, date, user, version).
    #[allow(clippy::type_complexity)]
    pub fn info_row(&self) -> Result<Option<(Vec<u8>, Vec<u8>, String, String, String)>> {
        self.conn
            .query_row(
                "SELECT pwd, salt, date, user, version FROM _info_",
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn init_info(&self, auth_check: &[u8], salt: &[u8], engine_version: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO _info_ (pwd, salt, date, user, version) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                auth_check,
                salt,
                log_timestamp(),
                effective_user(),
                engine_version
            ],
        )?;
        Ok(())
    }

    /// Journal an informational record and mirror it per verbosity.
    /// Journal write failures are swallowed: logging never masks the
    /// operation outcome.
    pub fn journal(&self, msg: &str) {
        self.mirror(msg);
        let _ = append_log(&self.conn, msg);
    }

    /// Journal an error record. The on-disk journal receives it always;
    /// mirroring is suppressed only by [`Verbosity::Silent`].
    pub fn journal_error(&self, msg: &str) {
        if self.verbosity != Verbosity::Silent {
            error!("{msg}");
        }
        let _ = append_log(&self.conn, &format!("error: {msg}"));
    }

    /// Mirror-only half of [`Store::journal`], for records already written
    /// inside a transaction via [`append_log`].
    pub fn mirror(&self, msg: &str) {
        if self.verbosity == Verbosity::All {
            info!("{msg}");
        }
    }
}

pub fn append_log(conn: &Connection, msg: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO _logs_ (date, msg) VALUES (?1, ?2)",
        params![log_timestamp(), msg],
    )?;
    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn create_version_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (version INTEGER PRIMARY KEY ASC, raw BLOB, \
             hash TEXT, size INTEGER, date TEXT, user TEXT)"
        ),
        [],
    )?;
    Ok(())
}

pub fn next_version(conn: &Connection, table: &str) -> Result<i64> {
    let max: i64 = conn.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM \"{table}\""),
        [],
        |row| row.get(0),
    )?;
    Ok(max + 1)
}

pub fn insert_version(
    conn: &Connection,
    table: &str,
    version: i64,
    raw: &[u8],
    hash: &str,
    size: i64,
) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO \"{table}\" (version, raw, hash, size, date, user) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ),
        params![version, raw, hash, size, payload_timestamp(), effective_user()],
    )?;
    Ok(())
}

/// Plaintext hash of the most recent version, if the table exists and has
/// any rows. Used for deduplication on add.
pub fn latest_hash(conn: &Connection, table: &str) -> Result<Option<String>> {
    if !table_exists(conn, table)? {
        return Ok(None);
    }
    conn.query_row(
        &format!("SELECT hash FROM \"{table}\" ORDER BY version DESC LIMIT 1"),
        [],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

/// Fetch `(raw, hash, size)` of one version. `version <= 0` selects the
/// most recent one.
pub fn fetch_version(
    conn: &Connection,
    table: &str,
    version: i64,
) -> Result<Option<(Vec<u8>, String, i64)>> {
    if !table_exists(conn, table)? {
        return Ok(None);
    }
    let map = |row: &rusqlite::Row| Ok((row.get(0)?, row.get(1)?, row.get(2)?));
    let result = if version > 0 {
        conn.query_row(
            &format!("SELECT raw, hash, size FROM \"{table}\" WHERE version = ?1"),
            params![version],
            map,
        )
    } else {
        conn.query_row(
            &format!("SELECT raw, hash, size FROM \"{table}\" ORDER BY version DESC LIMIT 1"),
            [],
            map,
        )
    };
    result.optional().map_err(Into::into)
}

pub fn version_count(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
        row.get(0)
    })
    .map_err(Into::into)
}

/// Re-number versions so they stay dense, 1..=N, after a deletion.
/// Ascending order keeps the target slot free at every step.
pub fn reindex_versions(conn: &Connection, table: &str) -> Result<()> {
    let mut stmt = conn.prepare(&format!("SELECT version FROM \"{table}\" ORDER BY version ASC"))?;
    let versions: Vec<i64> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for (index, version) in versions.iter().enumerate() {
        let want = index as i64 + 1;
        if *version != want {
            conn.execute(
                &format!("UPDATE \"{table}\" SET version = ?1 WHERE version = ?2"),
                params![want, version],
            )?;
        }
    }
    Ok(())
}

/// Entry lookup: `None` when the entry does not exist, otherwise the
/// nullable password column (`None` = password mode none).
#[allow(clippy::type_complexity)]
pub fn entry_password(conn: &Connection, name: &str) -> Result<Option<Option<Vec<u8>>>> {
    conn.query_row(
        "SELECT pwd FROM _files_ WHERE file = ?1",
        params![name],
        |row| row.get::<_, Option<Vec<u8>>>(0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn entry_labels(conn: &Connection, name: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT labels FROM _files_ WHERE file = ?1",
        params![name],
        |row| Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default()),
    )
    .optional()
    .map_err(Into::into)
}

pub fn entry_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT file FROM _files_ WHERE file NOT NULL ORDER BY file ASC")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    Ok(names)
}

pub fn insert_entry(conn: &Connection, name: &str, pwd: Option<&[u8]>, labels: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO _files_ (file, pwd, labels) VALUES (?1, ?2, ?3)",
        params![name, pwd, labels],
    )?;
    Ok(())
}

pub fn set_entry_labels(conn: &Connection, name: &str, labels: &str) -> Result<()> {
    conn.execute(
        "UPDATE _files_ SET labels = ?1 WHERE file = ?2",
        params![labels, name],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("store.prv")).unwrap();
        (dir, store)
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.prv");
        let first = Store::open(&path).unwrap();
        drop(first);
        let again = Store::open(&path).unwrap();
        assert!(again.info_row().unwrap().is_none());
    }

    #[test]
    fn version_numbers_are_dense_after_reindex() {
        let (_dir, store) = open_store();
        let conn = store.conn();
        create_version_table(conn, "tdeadbeef").unwrap();
        for n in 1..=4 {
            let v = next_version(conn, "tdeadbeef").unwrap();
            assert_eq!(v, n);
            insert_version(conn, "tdeadbeef", v, b"raw", &format!("h{n}"), 3).unwrap();
        }
        conn.execute("DELETE FROM \"tdeadbeef\" WHERE version = 2", [])
            .unwrap();
        reindex_versions(conn, "tdeadbeef").unwrap();
        let mut stmt = conn
            .prepare("SELECT version, hash FROM \"tdeadbeef\" ORDER BY version ASC")
            .unwrap();
        let rows: Vec<(i64, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (1, "h1".to_string()),
                (2, "h3".to_string()),
                (3, "h4".to_string())
            ]
        );
        assert_eq!(next_version(conn, "tdeadbeef").unwrap(), 4);
    }

    #[test]
    fn entry_password_distinguishes_missing_and_null() {
        let (_dir, store) = open_store();
        let conn = store.conn();
        assert!(entry_password(conn, "a").unwrap().is_none());
        insert_entry(conn, "a", None, "").unwrap();
        insert_entry(conn, "b", Some(&[1, 2, 3]), "x").unwrap();
        assert_eq!(entry_password(conn, "a").unwrap(), Some(None));
        assert_eq!(
            entry_password(conn, "b").unwrap(),
            Some(Some(vec![1, 2, 3]))
        );
    }
}
