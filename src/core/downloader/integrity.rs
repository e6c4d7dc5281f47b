// ─── Integrity ───
// Digest computation and comparison against manifest-declared hashes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::core::error::{IoContext, LauncherError, LauncherResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `bytes`.
    pub fn digest(self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        }
    }

    /// Fails with `HashMismatch` unless `bytes` hash to `expected`.
    pub fn verify(self, expected: &str, bytes: &[u8]) -> LauncherResult<()> {
        let actual = self.digest(bytes);
        if actual.eq_ignore_ascii_case(expected.trim()) {
            Ok(())
        } else {
            Err(LauncherError::HashMismatch {
                expected: expected.to_string(),
                actual,
            })
        }
    }

    /// Whether the file at `path` exists and already carries `expected`.
    pub async fn file_matches(self, path: &Path, expected: &str) -> LauncherResult<bool> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(self.verify(expected, &bytes).is_ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).at_path(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_known_input() {
        assert_eq!(
            HashAlgorithm::Sha1.digest(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn verify_accepts_own_digest() {
        for bytes in [&b""[..], b"hello", b"\x00\x01\x02"] {
            let hash = HashAlgorithm::Sha1.digest(bytes);
            assert!(HashAlgorithm::Sha1.verify(&hash, bytes).is_ok());
        }
    }

    #[test]
    fn verify_rejects_other_bytes() {
        let hash = HashAlgorithm::Sha1.digest(b"first");
        let err = HashAlgorithm::Sha1.verify(&hash, b"second").unwrap_err();
        match err {
            LauncherError::HashMismatch { expected, actual } => {
                assert_eq!(expected, hash);
                assert_eq!(actual, HashAlgorithm::Sha1.digest(b"second"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_ignores_hex_case() {
        let hash = HashAlgorithm::Sha1.digest(b"abc").to_uppercase();
        assert!(HashAlgorithm::Sha1.verify(&hash, b"abc").is_ok());
    }

    #[tokio::test]
    async fn file_matches_is_false_for_missing_file() {
        let path = std::env::temp_dir().join("mcmirror-integrity-definitely-missing.bin");
        let matches = HashAlgorithm::Sha1
            .file_matches(&path, "00")
            .await
            .unwrap();
        assert!(!matches);
    }
}
