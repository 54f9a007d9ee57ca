//! Project-manifest hashing.
//!
//! The raw bytes of the project manifest feed a content hash used as a
//! cache-key component, so transform-cache entries invalidate whenever
//! the dependency set changes. A missing manifest is not an error; the
//! one feature that needs the hash degrades instead.

use std::fs;
use std::path::Path;

use tracing::debug;

/// Fixed relative path of the project manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Read the project manifest under `root` and return the hex hash of
/// its raw bytes, or `None` when the file cannot be read.
pub fn manifest_hash(root: &Path) -> Option<String> {
    let path = root.join(MANIFEST_FILE);
    match fs::read(&path) {
        Ok(bytes) => Some(blake3::hash(&bytes).to_hex().to_string()),
        Err(err) => {
            debug!(path = %path.display(), %err, "project manifest unavailable, cache keying disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn absent_manifest_yields_none() {
        let dir = TempDir::new().unwrap();
        assert!(manifest_hash(dir.path()).is_none());
    }

    #[test]
    fn hash_tracks_content() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), br#"{"name":"a"}"#).unwrap();
        let first = manifest_hash(dir.path()).unwrap();

        fs::write(dir.path().join(MANIFEST_FILE), br#"{"name":"b"}"#).unwrap();
        let second = manifest_hash(dir.path()).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn hash_is_stable_for_identical_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), br#"{"name":"a"}"#).unwrap();
        assert_eq!(manifest_hash(dir.path()), manifest_hash(dir.path()));
    }
}
