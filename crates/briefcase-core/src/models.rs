use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Password argument accepted by the add and export operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Password {
    /// No password: the payload is stored compressed but never encrypted.
    None,
    /// Use the vault-wide password. A no-op when the vault has none.
    Default,
    /// A dedicated per-file password.
    Literal(String),
}

impl Password {
    /// An empty literal means "no password".
    pub(crate) fn normalized(&self) -> Password {
        match self {
            Password::Literal(s) if s.is_empty() => Password::None,
            other => other.clone(),
        }
    }
}

/// Compression algorithm applied to a payload before optional encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// zlib deflate at the highest setting.
    #[default]
    Zlib,
    /// bzip2 at a medium setting.
    Bz2,
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zlib" => Ok(Compression::Zlib),
            "bz2" | "bzip2" => Ok(Compression::Bz2),
            other => Err(Error::BadArgument(format!(
                "unknown compression algorithm \"{other}\""
            ))),
        }
    }
}

/// How much of the journal is mirrored to the host diagnostic sink.
/// The on-disk `_logs_` table always receives every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Silent,
    Errors,
    #[default]
    All,
}

/// Materialized per-entry aggregates, refreshed on every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct FileStats {
    pub file_name: String,
    pub first_size: i64,
    pub last_size: i64,
    pub biggest_size: i64,
    pub first_date: String,
    pub last_date: String,
    pub first_user: String,
    pub last_user: String,
    pub labels: String,
    pub versions: i64,
}

/// Container-level summary returned by [`crate::Vault::info`].
#[derive(Debug, Clone, Serialize)]
pub struct VaultInfo {
    pub number_of_files: i64,
    pub date_created: String,
    pub user_created: String,
    pub all_labels: String,
    pub engine_version: String,
}

/// Canonical label form: tokens split on `;`, trimmed, sorted,
/// de-duplicated and re-joined with `;`.
pub fn canonical_labels(input: &str) -> String {
    let mut tokens: Vec<&str> = input
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.dedup();
    tokens.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trimmed_sorted_and_deduplicated() {
        assert_eq!(canonical_labels("x;y"), "x;y");
        assert_eq!(canonical_labels(" y ; x ;; x "), "x;y");
        assert_eq!(canonical_labels(""), "");
        assert_eq!(canonical_labels(" ; ; "), "");
    }

    #[test]
    fn empty_literal_password_normalizes_to_none() {
        assert_eq!(Password::Literal(String::new()).normalized(), Password::None);
        let lit = Password::Literal("pw".into());
        assert_eq!(lit.normalized(), lit);
    }

    #[test]
    fn compression_parses_known_names_only() {
        assert_eq!("zlib".parse::<Compression>().unwrap(), Compression::Zlib);
        assert_eq!("BZ2".parse::<Compression>().unwrap(), Compression::Bz2);
        assert!("lzma".parse::<Compression>().is_err());
    }
}
