//! SHA-256 checksums for runtime archives and produced artifacts.

use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 of a file.
///
/// Reads in 8KB chunks so large runtime archives are never held in memory.
///
/// # Returns
///
/// * `Ok(String)` - Lowercase hex-encoded hash (64 characters)
/// * `Err` - If the file cannot be read
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Checks `path` against an expected hex digest (case-insensitive).
///
/// # Errors
///
/// [`Error::HashMismatch`] when the digests differ.
pub async fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_sha256(path).await?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(Error::HashMismatch {
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        let digest = calculate_sha256(&path).await.unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        verify_sha256(&path, &digest.to_uppercase()).await.unwrap();
    }

    #[tokio::test]
    async fn mismatch_is_skippable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jdk.zip");
        std::fs::write(&path, b"not the pinned archive").unwrap();

        let err = verify_sha256(&path, "00").await.unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));
        assert!(err.is_skippable());
    }
}
