use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// Reads and parses a JSON file, returning `None` when it does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> WalletResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WalletError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| WalletError::json(path, e))
}

pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> WalletResult<T> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Pretty-prints `value` to `path`, creating parent directories.
///
/// The file is written next to its destination and renamed into place, so a
/// crash leaves either the old or the new contents.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> WalletResult<()> {
    write_json_with_mode(path, value, None)
}

/// Same as [`write_json`] but the file is readable by its owner only.
pub fn write_json_owner_only<T: Serialize + ?Sized>(path: &Path, value: &T) -> WalletResult<()> {
    write_json_with_mode(path, value, Some(0o600))
}

fn write_json_with_mode<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    mode: Option<u32>,
) -> WalletResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| WalletError::io(parent, e))?;
        }
    }

    let mut contents = serde_json::to_vec_pretty(value).map_err(|e| WalletError::json(path, e))?;
    contents.push(b'\n');

    let tmp_path = temp_path_for(path);
    // A stale temp file would keep its old permissions.
    remove_if_exists(&tmp_path)?;
    write_file(&tmp_path, &contents, mode).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        WalletError::io(path, e)
    })?;

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

fn write_file(path: &Path, contents: &[u8], mode: Option<u32>) -> WalletResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if let Some(mode) = mode {
            options.mode(mode);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).map_err(|e| WalletError::io(path, e))?;
    file.write_all(contents)
        .and_then(|_| file.sync_all())
        .map_err(|e| WalletError::io(path, e))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Deletes `path`, treating an already missing file as success.
pub fn remove_if_exists(path: &Path) -> WalletResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WalletError::io(path, e)),
    }
}

/// The on-disk state of one file, captured so a multi-file write can be undone.
pub struct FileSnapshot {
    path: PathBuf,
    contents: Option<Zeroizing<Vec<u8>>>,
    mode: Option<u32>,
}

impl FileSnapshot {
    pub fn capture(path: &Path) -> WalletResult<Self> {
        Self::capture_with_mode(path, None)
    }

    /// Captures a file that must be restored with owner-only permissions.
    pub fn capture_owner_only(path: &Path) -> WalletResult<Self> {
        Self::capture_with_mode(path, Some(0o600))
    }

    fn capture_with_mode(path: &Path, mode: Option<u32>) -> WalletResult<Self> {
        let contents = match fs::read(path) {
            Ok(bytes) => Some(Zeroizing::new(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(WalletError::io(path, e)),
        };
        Ok(FileSnapshot {
            path: path.to_path_buf(),
            contents,
            mode,
        })
    }

    /// Puts the captured bytes back, or deletes the file if it did not exist.
    pub fn restore(&self) -> WalletResult<()> {
        match &self.contents {
            Some(bytes) => write_file(&self.path, bytes, self.mode),
            None => remove_if_exists(&self.path),
        }
    }
}

/// A value persisted as a single pretty-printed JSON file.
pub trait Saveable
where
    Self: Sized + Serialize + DeserializeOwned,
{
    fn load_from_file(path: &Path) -> WalletResult<Option<Self>> {
        read_json(path)
    }

    fn save_to_file(&self, path: &Path) -> WalletResult<()> {
        write_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        let value: Option<Value> = read_json(&path).unwrap();
        assert!(value.is_none());
        let map: serde_json::Map<String, Value> = read_json_or_default(&path).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("file.json");
        write_json(&path, &json!({ "a": 1 })).unwrap();

        let back: Value = read_json(&path).unwrap().unwrap();
        assert_eq!(back, json!({ "a": 1 }));
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_malformed_file_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{ not json").unwrap();
        let result: WalletResult<Option<Value>> = read_json(&path);
        assert!(matches!(result, Err(WalletError::Json { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.json");
        write_json_owner_only(&path, &json!({ "secretKey": [1, 2, 3] })).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_snapshot_restores_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        write_json(&path, &json!({ "rpcUrl": "https://old" })).unwrap();
        let before = fs::read(&path).unwrap();

        let snapshot = FileSnapshot::capture(&path).unwrap();
        write_json(&path, &json!({ "rpcUrl": "https://new" })).unwrap();
        snapshot.restore().unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_snapshot_of_missing_file_restores_by_deleting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.json");

        let snapshot = FileSnapshot::capture_owner_only(&path).unwrap();
        write_json_owner_only(&path, &json!({ "secretKey": [] })).unwrap();
        snapshot.restore().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_remove_if_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.json");
        write_json(&path, &json!({})).unwrap();
        remove_if_exists(&path).unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
    }
}
