//! End-to-end scenarios against a real container file.

use std::fs;
use std::path::{Path, PathBuf};

use briefcase_core::{crypto, Compression, Error, Password, Vault};
use tempfile::tempdir;

fn write_src(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn create_add_list_statistics() {
    let dir = tempdir().unwrap();
    let src = write_src(dir.path(), "a.bin", &[0x00, 0x01, 0x02]);
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();

    vault
        .add_file(&src, &Password::Default, "x;y", Compression::Zlib, true)
        .unwrap();

    assert_eq!(vault.get_file_list(None, None).unwrap(), vec!["a.bin"]);
    let stats = vault.file_statistics("a.bin").unwrap();
    assert_eq!(stats.versions, 1);
    assert_eq!(stats.labels, "x;y");
    assert_eq!(stats.first_size, 3);
    assert_eq!(stats.last_size, 3);
}

#[test]
fn identical_content_is_rejected() {
    let dir = tempdir().unwrap();
    let src = write_src(dir.path(), "a.bin", &[0x00, 0x01, 0x02]);
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();

    let err = vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap_err();
    assert!(matches!(err, Error::Identical(_)));
    assert_eq!(vault.file_statistics("a.bin").unwrap().versions, 1);
}

#[test]
fn versions_accumulate_and_export_by_number() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let src = write_src(dir.path(), "a.bin", &[0x00, 0x01, 0x02]);
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();

    fs::write(&src, [0x00, 0x01, 0x03]).unwrap();
    vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();
    assert_eq!(vault.file_statistics("a.bin").unwrap().versions, 2);

    let hash1 = vault
        .export_file("a.bin", &Password::Default, 1, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("a.bin")).unwrap(), [0x00, 0x01, 0x02]);
    assert_eq!(hash1, crypto::md4_hex(&[0x00, 0x01, 0x02]));

    let hash2 = vault
        .export_file("a.bin", &Password::Default, 2, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("a.bin")).unwrap(), [0x00, 0x01, 0x03]);
    assert_eq!(hash2, crypto::md4_hex(&[0x00, 0x01, 0x03]));
}

#[test]
fn rename_moves_the_whole_history() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let src = write_src(dir.path(), "a.bin", b"payload");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();

    vault.ren_file("a.bin", "b.bin").unwrap();

    vault
        .export_file("b.bin", &Password::Default, 0, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("b.bin")).unwrap(), b"payload");

    let err = vault
        .export_file("a.bin", &Password::Default, 0, Some(&out), false)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn reopen_gates_on_the_vault_password() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("data.prv");
    let src = write_src(dir.path(), "a.bin", b"payload");
    {
        let mut vault = Vault::open(&db, "pw1").unwrap();
        vault
            .add_file(&src, &Password::Default, "", Compression::Zlib, true)
            .unwrap();
    }

    let err = Vault::open(&db, "pw2").unwrap_err();
    assert!(matches!(err, Error::WrongPassword));

    let vault = Vault::open(&db, "pw1").unwrap();
    assert_eq!(vault.info().unwrap().number_of_files, 1);
}

#[test]
fn copy_survives_deleting_the_source() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let src = write_src(dir.path(), "b.bin", b"copied payload");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&src, &Password::Default, "keep", Compression::Zlib, true)
        .unwrap();

    vault.copy_into_new("b.bin", 0, "c.bin").unwrap();
    vault.del_file("b.bin", 0).unwrap();

    vault
        .export_file("c.bin", &Password::Default, 0, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("c.bin")).unwrap(), b"copied payload");
    assert_eq!(vault.file_statistics("c.bin").unwrap().labels, "keep");

    let err = vault
        .export_file("b.bin", &Password::Default, 0, Some(&out), false)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(vault.get_file_list(None, None).unwrap(), vec!["c.bin"]);
}

#[test]
fn deleting_a_version_keeps_numbers_dense() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let src = write_src(dir.path(), "a.bin", b"v1");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    for content in [&b"v1"[..], b"v2", b"v3"] {
        fs::write(&src, content).unwrap();
        vault
            .add_file(&src, &Password::Default, "", Compression::Zlib, true)
            .unwrap();
    }

    vault.del_file("a.bin", 2).unwrap();
    assert_eq!(vault.file_statistics("a.bin").unwrap().versions, 2);

    vault
        .export_file("a.bin", &Password::Default, 1, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("a.bin")).unwrap(), b"v1");
    vault
        .export_file("a.bin", &Password::Default, 2, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("a.bin")).unwrap(), b"v3");

    // Deleting the remaining versions removes the entry itself.
    vault.del_file("a.bin", 2).unwrap();
    vault.del_file("a.bin", 1).unwrap();
    assert!(vault.get_file_list(None, None).unwrap().is_empty());
}

#[test]
fn illegal_names_are_rejected_everywhere() {
    let dir = tempdir().unwrap();
    let src = write_src(dir.path(), "a.bin", b"payload");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();

    for bad in ["b:c", "b*c", "b?c", "b\"c", "b<c", "b>c", "b|c", ""] {
        assert!(matches!(
            vault.ren_file("a.bin", bad).unwrap_err(),
            Error::InvalidName(_)
        ));
        assert!(matches!(
            vault.copy_into_new("a.bin", 0, bad).unwrap_err(),
            Error::InvalidName(_)
        ));
    }
}

#[test]
fn per_file_passwords_gate_exports() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let src = write_src(dir.path(), "secret.bin", b"per-file payload");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    let pwd = Password::Literal("file-pw".into());
    vault
        .add_file(&src, &pwd, "", Compression::Zlib, true)
        .unwrap();

    let err = vault
        .export_file(
            "secret.bin",
            &Password::Literal("wrong".into()),
            0,
            Some(&out),
            false,
        )
        .unwrap_err();
    assert!(matches!(err, Error::WrongPerFilePassword(_)));

    // The vault default is not the per-file password either.
    let err = vault
        .export_file("secret.bin", &Password::Default, 0, Some(&out), false)
        .unwrap_err();
    assert!(matches!(err, Error::WrongPerFilePassword(_)));

    vault
        .export_file("secret.bin", &pwd, 0, Some(&out), false)
        .unwrap();
    assert_eq!(fs::read(out.join("secret.bin")).unwrap(), b"per-file payload");

    // Re-adding with a different per-file password is refused.
    fs::write(&src, b"changed").unwrap();
    let err = vault
        .add_file(
            &src,
            &Password::Literal("other".into()),
            "",
            Compression::Zlib,
            true,
        )
        .unwrap_err();
    assert!(matches!(err, Error::WrongPerFilePassword(_)));
}

#[test]
fn auth_checks_match_across_vaults_for_the_same_password() {
    // The fixed derivation salt makes the stored check portable by design.
    assert_eq!(crypto::auth_check("pw1"), crypto::auth_check("pw1"));
    assert_ne!(crypto::auth_check("pw1"), crypto::auth_check("pw2"));
}

#[test]
fn export_all_skips_mismatched_passwords() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    let plain_src = write_src(dir.path(), "open.bin", b"open payload");
    let locked_src = write_src(dir.path(), "locked.bin", b"locked payload");
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&plain_src, &Password::Default, "", Compression::Zlib, true)
        .unwrap();
    vault
        .add_file(
            &locked_src,
            &Password::Literal("file-pw".into()),
            "",
            Compression::Bz2,
            true,
        )
        .unwrap();

    let exported = vault.export_all(&out, &Password::Default).unwrap();
    assert_eq!(exported, 1);
    assert!(out.join("open.bin").exists());
    assert!(!out.join("locked.bin").exists());

    let exported = vault
        .export_all(&out, &Password::Literal("file-pw".into()))
        .unwrap();
    assert_eq!(exported, 1);
    assert_eq!(fs::read(out.join("locked.bin")).unwrap(), b"locked payload");
}

#[test]
fn not_versionable_refuses_existing_entries() {
    let dir = tempdir().unwrap();
    let src = write_src(dir.path(), "a.bin", b"v1");
    let mut vault = Vault::open(dir.path().join("data.prv"), "").unwrap();
    vault
        .add_file(&src, &Password::None, "", Compression::Zlib, false)
        .unwrap();

    fs::write(&src, b"v2").unwrap();
    let err = vault
        .add_file(&src, &Password::None, "", Compression::Zlib, false)
        .unwrap_err();
    assert!(matches!(err, Error::NotVersionable(_)));
}

#[test]
fn add_many_files_continues_past_failures() {
    let dir = tempdir().unwrap();
    let batch = dir.path().join("batch");
    fs::create_dir(&batch).unwrap();
    fs::write(batch.join("one.txt"), b"one").unwrap();
    fs::write(batch.join("two.txt"), b"two").unwrap();
    fs::write(batch.join("two-copy.txt"), b"two").unwrap();
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    // Seed an identical payload so one batch item dedups away.
    vault
        .add_file(
            batch.join("one.txt"),
            &Password::Default,
            "",
            Compression::Zlib,
            true,
        )
        .unwrap();

    let pattern = batch.join("*.txt");
    let added = vault
        .add_many_files(
            pattern.to_str().unwrap(),
            &Password::Default,
            "batch",
            Compression::Zlib,
            true,
        )
        .unwrap();
    // one.txt is identical with its stored version; the other two land.
    assert_eq!(added, 2);
    assert_eq!(vault.get_file_list(None, None).unwrap().len(), 3);
}

#[test]
fn sorted_and_filtered_listings() {
    let dir = tempdir().unwrap();
    let small = write_src(dir.path(), "small.bin", b"s");
    let large = write_src(dir.path(), "large.bin", &vec![0xAB; 512]);
    let mut vault = Vault::open(dir.path().join("data.prv"), "pw1").unwrap();
    vault
        .add_file(&small, &Password::Default, "tiny", Compression::Zlib, true)
        .unwrap();
    vault
        .add_file(&large, &Password::Default, "big", Compression::Zlib, true)
        .unwrap();

    assert_eq!(
        vault.get_file_list(Some("size desc"), None).unwrap(),
        vec!["large.bin", "small.bin"]
    );
    assert_eq!(
        vault
            .get_file_list(None, Some("labels like '%tiny%'"))
            .unwrap(),
        vec!["small.bin"]
    );
    assert!(matches!(
        vault.get_file_list(Some("versions asc"), None).unwrap_err(),
        Error::InvalidQuery(_)
    ));
    assert!(matches!(
        vault.get_file_list(None, Some("nope = 1")).unwrap_err(),
        Error::InvalidQuery(_)
    ));
}

#[test]
fn cleanup_resets_logs_and_rebuilds_statistics() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("data.prv");
    let src_a = write_src(dir.path(), "a.bin", b"alpha");
    let src_b = write_src(dir.path(), "b.bin", b"beta");
    {
        let mut vault = Vault::open(&db, "pw1").unwrap();
        vault
            .add_file(&src_a, &Password::Default, "x", Compression::Zlib, true)
            .unwrap();
        vault
            .add_file(&src_b, &Password::Default, "y", Compression::Zlib, true)
            .unwrap();
        vault.cleanup().unwrap();
    }

    let conn = rusqlite::Connection::open(&db).unwrap();
    let logs: i64 = conn
        .query_row("SELECT COUNT(*) FROM _logs_", [], |r| r.get(0))
        .unwrap();
    assert_eq!(logs, 1);
    let stats: i64 = conn
        .query_row("SELECT COUNT(*) FROM _statistics_", [], |r| r.get(0))
        .unwrap();
    let files: i64 = conn
        .query_row("SELECT COUNT(*) FROM _files_", [], |r| r.get(0))
        .unwrap();
    assert_eq!(stats, files);
    assert_eq!(files, 2);
}

#[test]
fn passwordless_vault_stores_compressed_plaintext() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("plain.prv");
    let src = write_src(dir.path(), "a.bin", b"cleartext payload cleartext payload");
    {
        let mut vault = Vault::open(&db, "").unwrap();
        vault
            .add_file(&src, &Password::Default, "", Compression::Zlib, true)
            .unwrap();
    }

    // Without an effective password the stored bytes are the compressed
    // stream verbatim: zlib windows start with 0x78.
    let conn = rusqlite::Connection::open(&db).unwrap();
    let table = crypto::storage_id("a.bin");
    let raw: Vec<u8> = conn
        .query_row(&format!("SELECT raw FROM \"{table}\""), [], |r| r.get(0))
        .unwrap();
    assert_eq!(raw[0], 0x78);
}
