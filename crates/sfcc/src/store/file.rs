//! File-backed store.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use fs2::FileExt;
use serde_json::Value;
use tracing::{debug, instrument, trace};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use super::{SecretStore, StoreChange};
use crate::Result;
use crate::error::StoreError;

const STORE_FILE_NAME: &str = "session.json";

/// Contents of the store file: one JSON object keyed by store key.
type Entries = BTreeMap<String, Value>;

/// A [`SecretStore`] persisted as a single JSON object file.
///
/// Writes go to a temporary sibling which is synced and renamed over the
/// target, so readers always see either the old or the new file. Mutations
/// hold an advisory lock on a sibling `.lock` file for the duration of the
/// read-modify-write.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Create a store at an explicit file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store in the per-user configuration directory.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "sfcc-ci").ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(dirs.config_dir().join(STORE_FILE_NAME)))
    }

    /// Get the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Entries> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "store file absent");
                return Ok(Entries::new());
            }
            Err(err) => return Err(self.io_err(err).into()),
        };

        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&raw).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    fn write(&self, entries: &Entries) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.tmp_path();
        let mut out = create_private(&tmp).map_err(|e| self.io_err(e))?;
        out.write_all(json.as_bytes()).map_err(|e| self.io_err(e))?;
        out.sync_all().map_err(|e| self.io_err(e))?;

        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_err(e))?;

        lock_file.lock_exclusive().map_err(|e| self.io_err(e))?;
        Ok(lock_file)
    }

    /// Read, mutate and write the file under the lock.
    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let lock_file = self.lock()?;

        let mut entries = self.read()?;
        mutate(&mut entries);
        self.write(&entries)?;

        FileExt::unlock(&lock_file).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// Create or truncate `path`, readable only by the owner (Unix only).
///
/// The mode is applied at creation and again on the open handle, so a stale
/// file with wider permissions is narrowed before anything is written.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let file = options.open(path)?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.read()?;
        Ok(entries.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&self, key: &str, value: Value) -> Result<()> {
        debug!("Persisting store key");
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn delete(&self, key: &str) -> Result<()> {
        debug!("Removing store key");
        self.update(|entries| {
            entries.remove(key);
        })
    }

    #[instrument(skip_all, fields(path = %self.path.display(), changes = changes.len()))]
    fn apply(&self, changes: Vec<StoreChange<'_>>) -> Result<()> {
        debug!("Persisting store batch");
        self.update(|entries| {
            for change in changes {
                match change {
                    StoreChange::Set(key, value) => {
                        entries.insert(key.to_string(), value);
                    }
                    StoreChange::Delete(key) => {
                        entries.remove(key);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileSecretStore) {
        let dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(dir.path().join("nested").join("session.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("SFCC_CLIENT_ID").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_a_new_instance() {
        let (_dir, store) = temp_store();
        store.set("SFCC_CLIENT_ID", json!("cid")).unwrap();
        store.set("SFCC_CLIENT_RENEW_TOKEN", json!(true)).unwrap();

        let reopened = FileSecretStore::new(store.path());
        assert_eq!(reopened.get("SFCC_CLIENT_ID").unwrap(), Some(json!("cid")));
        assert_eq!(
            reopened.get("SFCC_CLIENT_RENEW_TOKEN").unwrap(),
            Some(json!(true))
        );
    }

    #[test]
    fn delete_removes_only_that_key() {
        let (_dir, store) = temp_store();
        store
            .apply(vec![
                StoreChange::Set("SFCC_CLIENT_ID", json!("cid")),
                StoreChange::Set("SFCC_CLIENT_TOKEN", json!("t1")),
            ])
            .unwrap();

        store.delete("SFCC_CLIENT_TOKEN").unwrap();
        assert_eq!(store.get("SFCC_CLIENT_TOKEN").unwrap(), None);
        assert_eq!(store.get("SFCC_CLIENT_ID").unwrap(), Some(json!("cid")));
    }

    #[test]
    fn no_temporary_file_left_behind() {
        let (_dir, store) = temp_store();
        store.set("SFCC_CLIENT_ID", json!("cid")).unwrap();
        assert!(store.path().exists());
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let err = store.get("SFCC_CLIENT_ID").unwrap_err();
        assert!(err.to_string().contains("corrupt session file"));
    }

    #[test]
    fn keys_are_stored_at_the_top_level() {
        let (_dir, store) = temp_store();
        store
            .apply(vec![
                StoreChange::Set("SFCC_CLIENT_ID", json!("cid")),
                StoreChange::Set("SFCC_CLIENT_RENEW_TOKEN", json!(false)),
            ])
            .unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            json!({ "SFCC_CLIENT_ID": "cid", "SFCC_CLIENT_RENEW_TOKEN": false })
        );
    }

    #[test]
    fn reads_a_flat_object_written_elsewhere() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"SFCC_CLIENT_ID":"cid","SFCC_CLIENT_TOKEN":"t1"}"#,
        )
        .unwrap();

        assert_eq!(store.get("SFCC_CLIENT_TOKEN").unwrap(), Some(json!("t1")));
    }

    #[test]
    fn non_object_file_is_corrupt() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "[1, 2]").unwrap();

        assert!(store.get("SFCC_CLIENT_ID").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn temporary_file_is_private_before_it_is_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json.tmp");

        // A leftover from an interrupted write with wider permissions.
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let file = create_private(&path).unwrap();
        let mode = file.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(file.metadata().unwrap().len(), 0);

        let fresh = dir.path().join("fresh.tmp");
        let file = create_private(&fresh).unwrap();
        assert_eq!(file.metadata().unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        let (_dir, store) = temp_store();
        store.set("SFCC_CLIENT_TOKEN", json!("t1")).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
