//! Key derivation and name digests.
//!
//! Two PBKDF2 derivations with different purposes and constants:
//!
//! 1. the authentication check, stored in the container and compared on
//!    open. Its salt is the fixed string `briefcase`, so the same password
//!    yields the same check bytes in every vault. The value is never used
//!    for encryption.
//! 2. the encryption key, derived from the password and the vault's random
//!    32-byte salt generated once at creation.
//!
//! MD4 provides the plaintext content hash and the internal storage
//! identifier for entry names. The identifier is a namespace-hiding device,
//! not a security boundary: the external name is also stored in plaintext.

use md4::{Digest, Md4};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

const AUTH_SALT: &[u8] = b"briefcase";
const AUTH_CHECK_LEN: usize = 16;
const AUTH_ITERATIONS: u32 = 5_000;

pub const ENC_KEY_LEN: usize = 32;
const ENC_ITERATIONS: u32 = 1_000;
pub const ENC_SALT_LEN: usize = 32;

/// Authentication check bytes for a password.
pub fn auth_check(password: &str) -> Vec<u8> {
    let mut out = vec![0u8; AUTH_CHECK_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), AUTH_SALT, AUTH_ITERATIONS, &mut out);
    out
}

/// Symmetric encryption key for a password and the vault's stored salt.
pub fn derive_enc_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; ENC_KEY_LEN]> {
    let mut out = Zeroizing::new([0u8; ENC_KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ENC_ITERATIONS, &mut out[..]);
    out
}

/// Fresh random encryption salt, generated once per vault.
pub fn generate_salt() -> [u8; ENC_SALT_LEN] {
    let mut salt = [0u8; ENC_SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// MD4 digest of arbitrary bytes, hex encoded.
pub fn md4_hex(data: &[u8]) -> String {
    hex::encode(Md4::digest(data))
}

/// Internal storage identifier for an entry name: `t` followed by the hex
/// MD4 of the name. Deterministic and stable for the life of the entry.
pub fn storage_id(name: &str) -> String {
    format!("t{}", md4_hex(name.as_bytes()))
}
