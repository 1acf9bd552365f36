// File system operations for storing separated artifacts
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
    #[error("Invalid artifact filename: {0}")]
    InvalidFilename(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Get the app data directory for Sonosift
pub fn get_app_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    let app_dir = data_dir.join("sonosift");
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Get the default directory for one separation run
pub fn get_run_dir(run_id: &Uuid) -> StorageResult<PathBuf> {
    let run_dir = get_app_data_dir()?.join("runs").join(run_id.to_string());
    fs::create_dir_all(&run_dir)?;
    Ok(run_dir)
}

/// Store `data` as `dir/filename` and return where it went plus its SHA256 hash
/// `filename` must be a plain file name; directory components are rejected
pub fn store_artifact(dir: &Path, filename: &str, data: &[u8]) -> StorageResult<StoredArtifact> {
    let is_plain = Path::new(filename)
        .file_name()
        .map(|name| name == filename)
        .unwrap_or(false);
    if !is_plain {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }

    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    let mut file = fs::File::create(&file_path)?;
    file.write_all(data)?;

    log::debug!("Stored {} ({} bytes)", file_path.display(), data.len());

    Ok(StoredArtifact {
        filename: filename.to_string(),
        path: file_path,
        sha256: calculate_sha256(data),
        size_bytes: data.len() as u64,
    })
}

/// Store any serializable value as pretty JSON
pub fn store_json<T: Serialize>(
    dir: &Path,
    filename: &str,
    value: &T,
) -> StorageResult<StoredArtifact> {
    let json = serde_json::to_vec_pretty(value)?;
    store_artifact(dir, filename, &json)
}

/// Read a file from disk
pub fn read_file(path: &Path) -> StorageResult<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_calculate_sha256() {
        let data = b"hello world";
        let hash = calculate_sha256(data);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_store_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("runs").join("abc");

        let stored = store_artifact(&dir, "extracted_speech.wav", b"hello world").unwrap();
        assert_eq!(stored.path, dir.join("extracted_speech.wav"));
        assert_eq!(stored.size_bytes, 11);
        assert_eq!(stored.sha256, calculate_sha256(b"hello world"));
        assert_eq!(read_file(&stored.path).unwrap(), b"hello world");
    }

    #[test]
    fn test_rejects_nested_filenames() {
        let temp_dir = TempDir::new().unwrap();
        for bad in ["../escape.wav", "a/b.wav", ""] {
            assert!(matches!(
                store_artifact(temp_dir.path(), bad, b"x"),
                Err(StorageError::InvalidFilename(_))
            ));
        }
    }

    #[test]
    fn test_store_json() {
        let temp_dir = TempDir::new().unwrap();
        let value = serde_json::json!({ "ok": true });
        let stored = store_json(temp_dir.path(), "report.json", &value).unwrap();

        let bytes = read_file(&stored.path).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["ok"], true);
    }
}
