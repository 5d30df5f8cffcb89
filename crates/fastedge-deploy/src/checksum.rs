//! Content checksums for deciding whether a binary must be re-uploaded.
//!
//! The API records the hex MD5 of every uploaded binary, so the local file
//! is hashed the same way.

use md5::{Digest, Md5};
use std::io;
use std::path::Path;

/// Hex-encoded MD5 of `bytes`.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Whether `bytes` differ from the binary with `known_checksum`.
///
/// Comparison is exact: no case or whitespace normalisation.
pub fn bytes_changed(bytes: &[u8], known_checksum: &str) -> bool {
    let local = checksum(bytes);
    log::debug!("local checksum {} vs recorded {}", local, known_checksum);
    local != known_checksum
}

/// Hex-encoded MD5 of the file at `path`.
pub async fn file_checksum(path: &Path) -> io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(checksum(&bytes))
}

/// Whether the file at `path` differs from the binary with `known_checksum`.
pub async fn has_binary_changed(path: &Path, known_checksum: &str) -> io::Result<bool> {
    let bytes = tokio::fs::read(path).await?;
    Ok(bytes_changed(&bytes, known_checksum))
}
