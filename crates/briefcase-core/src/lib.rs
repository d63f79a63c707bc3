//! Single-file encrypted, versioned document vault.
//!
//! A briefcase is one self-describing SQLite container holding many named
//! binary payloads. Every store of a payload keeps the prior content as an
//! earlier version, forming a linear history per name. Payloads are
//! compressed (zlib or bzip2) and optionally encrypted with a
//! password-derived key before they touch disk.
//!
//! The [`Vault`] type is the public engine: open/create, add, copy, rename,
//! delete, export (to a path or through a wiped temporary directory),
//! labels, listing, statistics and cleanup. Shells and CLIs are expected to
//! consume only that surface.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod exec;
pub mod models;
pub mod query;
pub mod stats;
pub mod store;
pub mod vault;

pub use error::{Error, Result};
pub use models::{Compression, FileStats, Password, VaultInfo, Verbosity};
pub use vault::Vault;
