//! Payload transform pipeline: compress, then optionally encrypt.
//!
//! The stored byte layout is `encrypt(compress(plain) || pad)` where pad is
//! 1 to 16 ASCII `X` bytes bringing the compressed stream to the next
//! 16-byte block boundary. On read the inverse runs: decrypt, then a
//! pad-tolerant decompress. Both decoders stop at their end-of-stream
//! marker, so the padding is never seen by the caller.
//!
//! Without an effective password the encryption step is skipped entirely
//! and the stored bytes are the compressed bytes verbatim.

use std::io::{Read, Write};

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::crypto::ENC_KEY_LEN;
use crate::error::{Error, Result};
use crate::models::Compression;

const BLOCK: usize = 16;
const PAD_BYTE: u8 = b'X';
const BZ2_LEVEL: u32 = 6;

pub fn compress(data: &[u8], algo: Compression) -> Result<Vec<u8>> {
    match algo {
        Compression::Zlib => {
            let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
            enc.write_all(data)?;
            Ok(enc.finish()?)
        }
        Compression::Bz2 => {
            let mut enc = BzEncoder::new(Vec::new(), bzip2::Compression::new(BZ2_LEVEL));
            enc.write_all(data)?;
            Ok(enc.finish()?)
        }
    }
}

/// Decompress by auto-detection: zlib first, bzip2 second.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if ZlibDecoder::new(data).read_to_end(&mut out).is_ok() {
        return Ok(out);
    }
    out.clear();
    BzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

fn pad(buf: &mut Vec<u8>) {
    // Always at least one pad byte, 16 when already on a boundary.
    let n = BLOCK - buf.len() % BLOCK;
    buf.extend(std::iter::repeat(PAD_BYTE).take(n));
}

/// AES-256-ECB over the padded input.
pub fn encrypt(key: &[u8; ENC_KEY_LEN], data: &[u8]) -> Vec<u8> {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut buf = data.to_vec();
    pad(&mut buf);
    for block in buf.chunks_exact_mut(BLOCK) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    buf
}

pub fn decrypt(key: &[u8; ENC_KEY_LEN], data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % BLOCK != 0 {
        return Err(Error::BadArgument(format!(
            "ciphertext length {} is not a positive block multiple",
            data.len()
        )));
    }
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut buf = data.to_vec();
    for block in buf.chunks_exact_mut(BLOCK) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
    Ok(buf)
}

/// Full write-side pipeline: compress and, with a key, pad and encrypt.
pub fn seal(plain: &[u8], algo: Compression, key: Option<&[u8; ENC_KEY_LEN]>) -> Result<Vec<u8>> {
    let compressed = compress(plain, algo)?;
    Ok(match key {
        Some(k) => encrypt(k, &compressed),
        None => compressed,
    })
}

/// Inverse of [`seal`].
pub fn unseal(raw: &[u8], key: Option<&[u8; ENC_KEY_LEN]>) -> Result<Vec<u8>> {
    match key {
        Some(k) => decompress(&decrypt(k, raw)?),
        None => decompress(raw),
    }
}
