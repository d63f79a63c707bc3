//! The public vault engine.
//!
//! One handle per container file, single-threaded and synchronous: every
//! mutating operation either commits fully before returning or rolls back
//! and leaves the container byte-for-byte unchanged. Version numbers are
//! strictly monotonic in call order and journal records are appended in
//! call order.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::params;
use zeroize::Zeroizing;

use crate::codec;
use crate::crypto::{self, storage_id, ENC_KEY_LEN};
use crate::error::{Error, Result};
use crate::exec::TempExecutor;
use crate::models::{canonical_labels, Compression, FileStats, Password, VaultInfo, Verbosity};
use crate::query;
use crate::stats;
use crate::store::{self, Store};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Reject empty names and names carrying file-system metacharacters.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| FORBIDDEN_NAME_CHARS.contains(&c)) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug)]
pub struct Vault {
    path: PathBuf,
    store: Store,
    auth_check: Vec<u8>,
    enc_salt: Vec<u8>,
    enc_key: Option<Zeroizing<[u8; ENC_KEY_LEN]>>,
}

impl Vault {
    /// Open an existing vault, or create a new one when `path` does not
    /// hold a container yet.
    ///
    /// An empty password means the vault has no vault-wide password; the
    /// authentication check and encryption salt are then persisted empty.
    /// Opening an existing vault fails with [`Error::WrongPassword`] when
    /// the supplied password does not reproduce the stored check.
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Store::open(&path)?;
        let user = store::effective_user();

        match store.info_row()? {
            Some((stored_check, salt, ..)) => {
                let supplied = if password.is_empty() {
                    Vec::new()
                } else {
                    crypto::auth_check(password)
                };
                if supplied != stored_check {
                    store.journal_error("open: wrong vault password");
                    return Err(Error::WrongPassword);
                }
                let enc_key =
                    (!password.is_empty()).then(|| crypto::derive_enc_key(password, &salt));
                let vault = Self {
                    path,
                    store,
                    auth_check: stored_check,
                    enc_salt: salt,
                    enc_key,
                };
                vault.store.journal(&format!("opened vault by user {user}"));
                Ok(vault)
            }
            None => {
                let (check, salt) = if password.is_empty() {
                    (Vec::new(), Vec::new())
                } else {
                    (
                        crypto::auth_check(password),
                        crypto::generate_salt().to_vec(),
                    )
                };
                store.init_info(&check, &salt, ENGINE_VERSION)?;
                let enc_key =
                    (!password.is_empty()).then(|| crypto::derive_enc_key(password, &salt));
                let vault = Self {
                    path,
                    store,
                    auth_check: check,
                    enc_salt: salt,
                    enc_key,
                };
                vault.store.journal(&format!("created vault by user {user}"));
                Ok(vault)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verbosity of the diagnostic mirror; the on-disk journal is not
    /// affected.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.store.set_verbosity(verbosity);
    }

    // ── Password plumbing ───────────────────────────────────────────────

    /// `_files_.pwd` encoding: NULL for none, empty blob for the vault
    /// default, the 16-byte auth check for a per-file password.
    fn stored_pwd(&self, password: &Password) -> Option<Vec<u8>> {
        match password {
            Password::None => None,
            Password::Default => Some(Vec::new()),
            Password::Literal(s) => Some(crypto::auth_check(s)),
        }
    }

    /// Encryption key effective for a payload stored under `password`.
    fn effective_key(&self, password: &Password) -> Option<Zeroizing<[u8; ENC_KEY_LEN]>> {
        match password {
            Password::None => None,
            Password::Default => self.enc_key.clone(),
            Password::Literal(s) => Some(crypto::derive_enc_key(s, &self.enc_salt)),
        }
    }

    /// Does `supplied` match an existing entry's stored password mode?
    /// A literal equal to the vault password is accepted for default-mode
    /// entries.
    fn password_matches(&self, stored: &Option<Vec<u8>>, supplied: &Password) -> bool {
        match (stored, supplied) {
            (None, Password::None) => true,
            (Some(blob), Password::Default) if blob.is_empty() => true,
            (Some(blob), Password::Literal(s)) if blob.is_empty() => {
                crypto::auth_check(s) == self.auth_check
            }
            (Some(blob), Password::Literal(s)) => crypto::auth_check(s) == *blob,
            _ => false,
        }
    }

    /// Resolve the decryption key for an export, gating on the entry's
    /// stored password mode.
    fn export_key(
        &self,
        name: &str,
        stored: &Option<Vec<u8>>,
        supplied: &Password,
    ) -> Result<Option<Zeroizing<[u8; ENC_KEY_LEN]>>> {
        match stored {
            // Never encrypted; the argument is irrelevant.
            None => Ok(None),
            Some(blob) if blob.is_empty() => match supplied {
                Password::None | Password::Default => Ok(self.enc_key.clone()),
                Password::Literal(s) => {
                    if crypto::auth_check(s) == self.auth_check {
                        Ok(self.enc_key.clone())
                    } else {
                        Err(Error::WrongPerFilePassword(name.to_string()))
                    }
                }
            },
            Some(auth) => match supplied {
                Password::Literal(s) if crypto::auth_check(s) == *auth => {
                    Ok(Some(crypto::derive_enc_key(s, &self.enc_salt)))
                }
                _ => Err(Error::WrongPerFilePassword(name.to_string())),
            },
        }
    }

    fn journaled<T>(&self, what: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.store.journal_error(&format!("{what}: {err}"));
        }
        result
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Store a new version of the file at `src` under its file name.
    ///
    /// The entry is created on first use, fixing its password mode for
    /// life. A non-empty `labels` argument replaces the entry labels.
    /// Adding content whose MD4 equals the latest version's hash fails
    /// with [`Error::Identical`]; `versionable = false` forbids adding to
    /// an existing entry.
    pub fn add_file(
        &mut self,
        src: impl AsRef<Path>,
        password: &Password,
        labels: &str,
        algo: Compression,
        versionable: bool,
    ) -> Result<()> {
        let src = src.as_ref();
        let result = self.add_file_inner(src, password, labels, algo, versionable);
        self.journaled(&format!("add {}", src.display()), result)
    }

    fn add_file_inner(
        &mut self,
        src: &Path,
        password: &Password,
        labels: &str,
        algo: Compression,
        versionable: bool,
    ) -> Result<()> {
        let name = src
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::BadArgument(format!("source path {} has no file name", src.display()))
            })?
            .to_string();
        validate_name(&name)?;
        if !src.is_file() {
            return Err(Error::NotFound(format!("source file {}", src.display())));
        }
        let password = password.normalized();
        let plain = fs::read(src)?;
        let table = storage_id(&name);

        let existing = store::entry_password(self.store.conn(), &name)?;
        if let Some(stored) = &existing {
            if !self.password_matches(stored, &password) {
                return Err(Error::WrongPerFilePassword(name));
            }
            if !versionable {
                return Err(Error::NotVersionable(name));
            }
        }

        let hash = crypto::md4_hex(&plain);
        if let Some(latest) = store::latest_hash(self.store.conn(), &table)? {
            if latest == hash {
                return Err(Error::Identical(name));
            }
        }

        let key = self.effective_key(&password);
        let raw = codec::seal(&plain, algo, key.as_deref())?;
        let size = plain.len() as i64;
        let labels_canon = canonical_labels(labels);
        let stored_pwd = self.stored_pwd(&password);

        let tx = self.store.tx()?;
        store::create_version_table(&tx, &table)?;
        let version = store::next_version(&tx, &table)?;
        store::insert_version(&tx, &table, version, &raw, &hash, size)?;
        match &existing {
            None => store::insert_entry(&tx, &name, stored_pwd.as_deref(), &labels_canon)?,
            Some(_) if !labels_canon.is_empty() => {
                store::set_entry_labels(&tx, &name, &labels_canon)?
            }
            Some(_) => {}
        }
        stats::recompute(&tx, &name)?;
        let msg = format!("added file \"{name}\" version {version} ({size} bytes)");
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        self.store.mirror(&msg);
        Ok(())
    }

    /// Add every file matching `pattern`. Per-file failures are journaled
    /// and skipped; the return value counts successful adds.
    pub fn add_many_files(
        &mut self,
        pattern: &str,
        password: &Password,
        labels: &str,
        algo: Compression,
        versionable: bool,
    ) -> Result<usize> {
        let result = self.add_many_files_inner(pattern, password, labels, algo, versionable);
        self.journaled(&format!("add many {pattern}"), result)
    }

    fn add_many_files_inner(
        &mut self,
        pattern: &str,
        password: &Password,
        labels: &str,
        algo: Compression,
        versionable: bool,
    ) -> Result<usize> {
        let paths = glob::glob(pattern)
            .map_err(|e| Error::BadArgument(format!("bad glob pattern \"{pattern}\": {e}")))?;
        let mut matched = 0usize;
        let mut added = 0usize;
        for entry in paths {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    self.store.journal_error(&format!("add many: {e}"));
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            matched += 1;
            // add_file journals its own failures; the batch continues.
            if self
                .add_file(&path, password, labels, algo, versionable)
                .is_ok()
            {
                added += 1;
            }
        }
        if matched == 0 {
            return Err(Error::NotFound(format!("no files match \"{pattern}\"")));
        }
        self.store
            .journal(&format!("added {added} of {matched} files matching \"{pattern}\""));
        Ok(added)
    }

    /// Copy one version of an entry into a new entry whose history starts
    /// at version 1. Payload bytes are copied as stored, without
    /// re-encryption; password mode and labels carry over.
    pub fn copy_into_new(&mut self, name: &str, version: i64, new_name: &str) -> Result<()> {
        let result = self.copy_into_new_inner(name, version, new_name);
        self.journaled(&format!("copy \"{name}\" into \"{new_name}\""), result)
    }

    fn copy_into_new_inner(&mut self, name: &str, version: i64, new_name: &str) -> Result<()> {
        validate_name(new_name)?;
        if store::entry_password(self.store.conn(), new_name)?.is_some() {
            return Err(Error::Exists(new_name.to_string()));
        }
        let entry_pwd = store::entry_password(self.store.conn(), name)?
            .ok_or_else(|| Error::NotFound(format!("file \"{name}\"")))?;
        let labels = store::entry_labels(self.store.conn(), name)?.unwrap_or_default();
        let (raw, hash, size) =
            store::fetch_version(self.store.conn(), &storage_id(name), version)?
                .ok_or_else(|| Error::NotFound(format!("file \"{name}\" version {version}")))?;

        let new_table = storage_id(new_name);
        let tx = self.store.tx()?;
        store::create_version_table(&tx, &new_table)?;
        store::insert_version(&tx, &new_table, 1, &raw, &hash, size)?;
        store::insert_entry(&tx, new_name, entry_pwd.as_deref(), &labels)?;
        stats::recompute(&tx, new_name)?;
        let msg = format!("copied \"{name}\" version {version} into \"{new_name}\"");
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        self.store.mirror(&msg);
        Ok(())
    }

    /// Rename an entry, atomically rewriting the storage identifier and
    /// the entry and statistics rows.
    pub fn ren_file(&mut self, name: &str, new_name: &str) -> Result<()> {
        let result = self.ren_file_inner(name, new_name);
        self.journaled(&format!("rename \"{name}\" into \"{new_name}\""), result)
    }

    fn ren_file_inner(&mut self, name: &str, new_name: &str) -> Result<()> {
        validate_name(new_name)?;
        if store::entry_password(self.store.conn(), new_name)?.is_some() {
            return Err(Error::Exists(new_name.to_string()));
        }
        if store::entry_password(self.store.conn(), name)?.is_none() {
            return Err(Error::NotFound(format!("file \"{name}\"")));
        }
        let table = storage_id(name);
        let new_table = storage_id(new_name);

        let tx = self.store.tx()?;
        tx.execute(
            &format!("ALTER TABLE \"{table}\" RENAME TO \"{new_table}\""),
            [],
        )?;
        tx.execute(
            "UPDATE _files_ SET file = ?1 WHERE file = ?2",
            params![new_name, name],
        )?;
        stats::rename(&tx, name, new_name)?;
        let msg = format!("renamed \"{name}\" into \"{new_name}\"");
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        self.store.mirror(&msg);
        Ok(())
    }

    /// Delete one version (`version > 0`, re-numbering the remainder so
    /// versions stay dense from 1) or the whole entry (`version = 0`).
    /// Removing the last remaining version removes the entry.
    pub fn del_file(&mut self, name: &str, version: i64) -> Result<()> {
        let result = self.del_file_inner(name, version);
        self.journaled(&format!("delete \"{name}\""), result)
    }

    fn del_file_inner(&mut self, name: &str, version: i64) -> Result<()> {
        if store::entry_password(self.store.conn(), name)?.is_none() {
            return Err(Error::NotFound(format!("file \"{name}\"")));
        }
        let table = storage_id(name);

        let tx = self.store.tx()?;
        let msg;
        if version > 0 {
            let affected = tx.execute(
                &format!("DELETE FROM \"{table}\" WHERE version = ?1"),
                params![version],
            )?;
            if affected == 0 {
                return Err(Error::NotFound(format!(
                    "file \"{name}\" version {version}"
                )));
            }
            if store::version_count(&tx, &table)? == 0 {
                tx.execute(&format!("DROP TABLE \"{table}\""), [])?;
                tx.execute("DELETE FROM _files_ WHERE file = ?1", params![name])?;
                stats::remove(&tx, name)?;
                msg = format!("deleted file \"{name}\" (last version removed)");
            } else {
                store::reindex_versions(&tx, &table)?;
                stats::recompute(&tx, name)?;
                msg = format!("deleted version {version} of file \"{name}\"");
            }
        } else {
            tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
            tx.execute("DELETE FROM _files_ WHERE file = ?1", params![name])?;
            stats::remove(&tx, name)?;
            msg = format!("deleted file \"{name}\"");
        }
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        self.store.mirror(&msg);
        Ok(())
    }

    /// Replace an entry's labels with the canonical form of `labels`.
    pub fn set_labels(&mut self, name: &str, labels: &str) -> Result<String> {
        let result = self.set_labels_inner(name, labels);
        self.journaled(&format!("set labels on \"{name}\""), result)
    }

    fn set_labels_inner(&mut self, name: &str, labels: &str) -> Result<String> {
        if store::entry_password(self.store.conn(), name)?.is_none() {
            return Err(Error::NotFound(format!("file \"{name}\"")));
        }
        let canon = canonical_labels(labels);
        let tx = self.store.tx()?;
        store::set_entry_labels(&tx, name, &canon)?;
        stats::set_labels(&tx, name, &canon)?;
        let msg = format!("set labels \"{canon}\" on file \"{name}\"");
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        self.store.mirror(&msg);
        Ok(canon)
    }

    /// Truncate the journal, rebuild the statistics table from the entries
    /// and compact the container file.
    pub fn cleanup(&mut self) -> Result<()> {
        let result = self.cleanup_inner();
        self.journaled("cleanup", result)
    }

    fn cleanup_inner(&mut self) -> Result<()> {
        let tx = self.store.tx()?;
        tx.execute("DELETE FROM _logs_", [])?;
        let rebuilt = stats::rebuild(&tx)?;
        let msg = format!("cleanup: statistics rebuilt for {rebuilt} files, logs reset");
        store::append_log(&tx, &msg)?;
        tx.commit()?;
        // Free-page reclamation cannot run inside a transaction.
        self.store.conn().execute_batch("VACUUM")?;
        self.store.mirror(&msg);
        Ok(())
    }

    // ── Exports ─────────────────────────────────────────────────────────

    /// Decrypt and decompress one version of an entry.
    ///
    /// With `execute = false` the plaintext is written to `dest/<name>`
    /// (`dest` must exist) and the plaintext MD4 hex is returned so
    /// callers can detect later edits. With `execute = true` the
    /// plaintext goes to a fresh temp directory, the host viewer runs on
    /// it, and the file is wiped and removed afterwards.
    pub fn export_file(
        &self,
        name: &str,
        password: &Password,
        version: i64,
        dest: Option<&Path>,
        execute: bool,
    ) -> Result<String> {
        let result = self.export_file_inner(name, password, version, dest, execute);
        self.journaled(&format!("export \"{name}\""), result)
    }

    fn export_file_inner(
        &self,
        name: &str,
        password: &Password,
        version: i64,
        dest: Option<&Path>,
        execute: bool,
    ) -> Result<String> {
        let stored = store::entry_password(self.store.conn(), name)?
            .ok_or_else(|| Error::NotFound(format!("file \"{name}\"")))?;
        let key = self.export_key(name, &stored, &password.normalized())?;
        let (raw, hash, _size) =
            store::fetch_version(self.store.conn(), &storage_id(name), version)?
                .ok_or_else(|| Error::NotFound(format!("file \"{name}\" version {version}")))?;
        let plain = codec::unseal(&raw, key.as_deref())?;

        if execute {
            let exec = TempExecutor::materialize(name, &plain)?;
            self.store.journal(&format!(
                "materialized \"{name}\" ({} bytes) for execution",
                exec.size()
            ));
            let bytes = exec.size();
            exec.execute_and_wipe()?;
            self.store.journal(&format!(
                "removed temporary copy of \"{name}\" ({bytes} bytes wiped)"
            ));
        } else {
            let dest = dest.ok_or_else(|| {
                Error::BadArgument("an export path is required when execute is disabled".into())
            })?;
            if !dest.is_dir() {
                return Err(Error::NotFound(format!(
                    "export path {}",
                    dest.display()
                )));
            }
            fs::write(dest.join(name), &plain)?;
            self.store
                .journal(&format!("exported \"{name}\" to {}", dest.display()));
        }
        Ok(hash)
    }

    /// Export the latest version of every entry whose password matches.
    /// Mismatches are journaled and skipped; the return value counts the
    /// files written.
    pub fn export_all(&self, dest: &Path, password: &Password) -> Result<usize> {
        let result = self.export_all_inner(dest, password);
        self.journaled(&format!("export all to {}", dest.display()), result)
    }

    fn export_all_inner(&self, dest: &Path, password: &Password) -> Result<usize> {
        if !dest.is_dir() {
            return Err(Error::NotFound(format!("export path {}", dest.display())));
        }
        let password = password.normalized();
        let mut exported = 0usize;
        for name in store::entry_names(self.store.conn())? {
            let Some(stored) = store::entry_password(self.store.conn(), &name)? else {
                continue;
            };
            let key = match self.export_key(&name, &stored, &password) {
                Ok(key) => key,
                Err(_) => {
                    self.store.journal_error(&format!(
                        "export all: password for \"{name}\" does not match, skipped"
                    ));
                    continue;
                }
            };
            let fetched = store::fetch_version(self.store.conn(), &storage_id(&name), 0)?;
            let Some((raw, _hash, _size)) = fetched else {
                continue;
            };
            match codec::unseal(&raw, key.as_deref())
                .and_then(|plain| fs::write(dest.join(&name), plain).map_err(Into::into))
            {
                Ok(()) => exported += 1,
                Err(err) => {
                    self.store
                        .journal_error(&format!("export all: \"{name}\": {err}"));
                }
            }
        }
        self.store.journal(&format!(
            "exported {exported} files to {}",
            dest.display()
        ));
        Ok(exported)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// List entry names. Without sort or filter the listing is the entry
    /// names ascending; otherwise the whitelisted sort/filter grammar of
    /// [`crate::query`] runs against the statistics table.
    pub fn get_file_list(&self, sort: Option<&str>, filter: Option<&str>) -> Result<Vec<String>> {
        let result = self.get_file_list_inner(sort, filter);
        self.journaled("list files", result)
    }

    fn get_file_list_inner(
        &self,
        sort: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<String>> {
        if sort.is_none() && filter.is_none() {
            return store::entry_names(self.store.conn());
        }
        let order = match sort {
            Some(s) => query::order_clause(s)?,
            None => "file ASC".to_string(),
        };
        let where_clause = match filter {
            Some(f) => format!(" WHERE {}", query::filter_clause(f)?),
            None => String::new(),
        };
        let sql = format!("SELECT file FROM _statistics_{where_clause} ORDER BY {order}");
        // A filter expression that passed the whitelist can still be bad
        // SQL; surface that as an invalid query, not a storage fault.
        let mut stmt = self
            .store
            .conn()
            .prepare(&sql)
            .map_err(|e| Error::InvalidQuery(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::InvalidQuery(e.to_string()))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Recompute and return the statistics row for one entry. This is the
    /// one read operation that refreshes the cache row as a side effect.
    pub fn file_statistics(&self, name: &str) -> Result<FileStats> {
        let result = self.file_statistics_inner(name);
        self.journaled(&format!("statistics for \"{name}\""), result)
    }

    fn file_statistics_inner(&self, name: &str) -> Result<FileStats> {
        if store::entry_password(self.store.conn(), name)?.is_none() {
            return Err(Error::NotFound(format!("file \"{name}\"")));
        }
        stats::recompute(self.store.conn(), name)?
            .ok_or_else(|| Error::NotFound(format!("file \"{name}\"")))
    }

    /// Container-level summary.
    pub fn info(&self) -> Result<VaultInfo> {
        let result = self.info_inner();
        self.journaled("info", result)
    }

    fn info_inner(&self) -> Result<VaultInfo> {
        let (_, _, date_created, user_created, engine_version) = self
            .store
            .info_row()?
            .ok_or_else(|| Error::NotFound("vault info row".into()))?;
        let number_of_files: i64 =
            self.store
                .conn()
                .query_row("SELECT COUNT(*) FROM _files_", [], |row| row.get(0))?;
        let mut stmt = self
            .store
            .conn()
            .prepare("SELECT labels FROM _files_ WHERE labels NOT NULL")?;
        let labels: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(VaultInfo {
            number_of_files,
            date_created,
            user_created,
            all_labels: canonical_labels(&labels.join(";")),
            engine_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation_rejects_metacharacters() {
        for bad in ["", "a/b", "a\\b", "a:b", "a*b", "a?b", "a\"b", "a<b", "a>b", "a|b"] {
            assert!(validate_name(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(validate_name("report (final).tar.gz").is_ok());
    }

    #[test]
    fn passwordless_vault_has_no_key_material() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::open(dir.path().join("plain.prv"), "").unwrap();
        assert!(vault.auth_check.is_empty());
        assert!(vault.enc_salt.is_empty());
        assert!(vault.enc_key.is_none());
    }

    #[test]
    fn protected_vault_derives_key_material() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::open(dir.path().join("locked.prv"), "pw1").unwrap();
        assert_eq!(vault.auth_check, crypto::auth_check("pw1"));
        assert_eq!(vault.enc_salt.len(), crypto::ENC_SALT_LEN);
        assert!(vault.enc_key.is_some());
    }
}
