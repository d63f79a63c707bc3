//! Execute-from-temp machinery.
//!
//! Writes exported plaintext into a fresh private temp directory, launches
//! the host's default viewer and, once the viewer returns, overwrites the
//! plaintext in place with random bytes of the original length, truncates
//! and unlinks it, then removes the directory. The wipe runs on every
//! path, viewer failure included; remnants are tolerated only when the
//! file system refuses the unlink.
//!
//! The viewer call is marshalled onto a dedicated worker thread so the
//! wipe phase genuinely follows viewer close, not viewer spawn.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use rand::RngCore;
use tempfile::TempDir;

use crate::error::{Error, Result};

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Materialized,
    Executing,
    Wiping,
    Removed,
}

pub struct TempExecutor {
    dir: TempDir,
    path: PathBuf,
    size: usize,
    phase: Phase,
}

impl TempExecutor {
    /// Write `plain` under `name` inside a fresh unique temp directory.
    pub fn materialize(name: &str, plain: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("briefcase-").tempdir()?;
        let path = dir.path().join(name);
        fs::write(&path, plain)?;
        Ok(Self {
            dir,
            path,
            size: plain.len(),
            phase: Phase::Materialized,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Launch the viewer, await its termination, then wipe and remove.
    /// Consumes the executor; the temp directory is gone afterwards.
    pub fn execute_and_wipe(mut self) -> Result<()> {
        self.phase = Phase::Executing;
        let path = self.path.clone();
        let worker = thread::spawn(move || launch_viewer(&path));
        let launched = worker.join().unwrap_or_else(|_| {
            Err(Error::Io(std::io::Error::other("viewer worker panicked")))
        });

        self.phase = Phase::Wiping;
        let wiped = wipe(&self.path, self.size);
        self.phase = Phase::Removed;
        drop(self.dir);

        launched.and(wiped)
    }
}

fn launch_viewer(path: &Path) -> Result<()> {
    #[cfg(target_os = "windows")]
    let status = Command::new("cmd")
        .args(["/C", "start", "/WAIT", ""])
        .arg(path)
        .status()?;
    #[cfg(target_os = "macos")]
    let status = Command::new("open").arg("-W").arg(path).status()?;
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let status = Command::new("xdg-open").arg(path).status()?;

    if !status.success() {
        return Err(Error::Io(std::io::Error::other(format!(
            "viewer exited with {status}"
        ))));
    }
    Ok(())
}

/// Overwrite with `size` random bytes, truncate, unlink.
fn wipe(path: &Path, size: usize) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let mut noise = vec![0u8; size];
    rand::rngs::OsRng.fill_bytes(&mut noise);
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.write_all(&noise)?;
    file.sync_all()?;
    file.set_len(0)?;
    drop(file);
    fs::remove_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_writes_plaintext_under_external_name() {
        let exec = TempExecutor::materialize("sample.bin", b"secret-bytes").unwrap();
        assert_eq!(exec.phase(), Phase::Materialized);
        assert_eq!(exec.size(), 12);
        assert!(exec.path().ends_with("sample.bin"));
        assert_eq!(fs::read(exec.path()).unwrap(), b"secret-bytes");
    }

    #[test]
    fn wipe_removes_the_file() {
        let exec = TempExecutor::materialize("sample.bin", b"secret-bytes").unwrap();
        let path = exec.path().to_path_buf();
        wipe(&path, exec.size()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn wipe_tolerates_already_removed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.bin");
        wipe(&path, 64).unwrap();
    }
}
