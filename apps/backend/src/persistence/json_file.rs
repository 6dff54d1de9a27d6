//! Two-document JSON snapshot store with atomic writes and a directory lock.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{LedgerSnapshot, PersistenceError, SnapshotStore};

const LOCK_FILE: &str = ".parlor.lock";

/// Account map and check map stored as pretty-printed JSON documents.
///
/// The directory lock is held for the lifetime of the store and released
/// when it is dropped.
#[derive(Debug)]
pub struct JsonFileStore {
    accounts_path: PathBuf,
    checks_path: PathBuf,
    _lock: File,
}

impl JsonFileStore {
    pub fn open(
        dir: impl AsRef<Path>,
        accounts_file: &str,
        checks_file: &str,
    ) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| io_err(dir, source))?;

        let lock_path = dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|source| io_err(&lock_path, source))?;

        // fs4 try_lock_exclusive() returns io::Result<bool>
        match lock.try_lock_exclusive() {
            Ok(true) => debug!(lock_path = %lock_path.display(), "data directory lock acquired"),
            Ok(false) => return Err(PersistenceError::Locked(dir.to_path_buf())),
            Err(source) => return Err(io_err(&lock_path, source)),
        }

        Ok(Self {
            accounts_path: dir.join(accounts_file),
            checks_path: dir.join(checks_file),
            _lock: lock,
        })
    }

    pub fn accounts_path(&self) -> &Path {
        &self.accounts_path
    }

    pub fn checks_path(&self) -> &Path {
        &self.checks_path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<LedgerSnapshot, PersistenceError> {
        let snapshot = LedgerSnapshot {
            accounts: read_document(&self.accounts_path)?,
            checks: read_document(&self.checks_path)?,
        };
        info!(
            accounts = snapshot.accounts.len(),
            checks = snapshot.checks.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Both documents are written and synced to temp files before either
    /// replaces its predecessor, so a failed write leaves the pair as it was.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), PersistenceError> {
        let accounts_tmp = write_temp(&self.accounts_path, &snapshot.accounts)?;
        let checks_tmp = match write_temp(&self.checks_path, &snapshot.checks) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&accounts_tmp);
                return Err(e);
            }
        };

        if let Err(e) = replace(&accounts_tmp, &self.accounts_path) {
            let _ = fs::remove_file(&accounts_tmp);
            let _ = fs::remove_file(&checks_tmp);
            return Err(e);
        }
        replace(&checks_tmp, &self.checks_path)
    }
}

fn io_err(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Missing or blank documents start fresh. Unparsable ones are moved aside
/// so the next save does not overwrite the evidence.
fn read_document<K, V>(path: &Path) -> Result<BTreeMap<K, V>, PersistenceError>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => return Err(io_err(path, source)),
    };
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    match serde_json::from_str(&raw) {
        Ok(map) => Ok(map),
        Err(e) => {
            let aside = quarantine_path(path);
            warn!(
                path = %path.display(),
                moved_to = %aside.display(),
                error = %e,
                "unparsable snapshot document, starting empty"
            );
            fs::rename(path, &aside).map_err(|source| io_err(path, source))?;
            Ok(BTreeMap::new())
        }
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let stamp = OffsetDateTime::now_utc().unix_timestamp();
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".corrupt-{stamp}"));
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Serialise `value` next to `path` and fsync it; returns the temp path.
fn write_temp<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, PersistenceError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(|source| io_err(&tmp, source))?;
    file.write_all(&bytes).map_err(|source| io_err(&tmp, source))?;
    file.sync_all().map_err(|source| io_err(&tmp, source))?;
    Ok(tmp)
}

fn replace(tmp: &Path, path: &Path) -> Result<(), PersistenceError> {
    fs::rename(tmp, path).map_err(|source| io_err(path, source))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::{Account, AccountId, Check, CheckCode};

    fn open(dir: &Path) -> JsonFileStore {
        JsonFileStore::open(dir, "users_data.json", "checks_data.json").unwrap()
    }

    #[test]
    fn missing_documents_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = open(dir.path()).load().unwrap();
        assert!(snapshot.accounts.is_empty());
        assert!(snapshot.checks.is_empty());
    }

    #[test]
    fn saved_snapshot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = LedgerSnapshot::default();
        snapshot.accounts.insert(
            AccountId::from("7"),
            Account::open("seven", datetime!(2026-02-02 10:00 UTC)),
        );
        {
            let store = open(dir.path());
            store.save(&snapshot).unwrap();
        }
        assert_eq!(open(dir.path()).load().unwrap(), snapshot);
    }

    #[test]
    fn failed_checks_write_keeps_the_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        let now = datetime!(2026-02-02 10:00 UTC);

        let mut before = LedgerSnapshot::default();
        before.accounts.insert(AccountId::from("1"), Account::open("one", now));
        store.save(&before).unwrap();

        let mut after = before.clone();
        after.accounts.get_mut(&AccountId::from("1")).unwrap().balance = 80;
        after.checks.insert(
            CheckCode::normalise("ABCD2345"),
            Check::new(AccountId::from("1"), 20, now),
        );

        // A directory squatting on the temp path makes the checks write fail.
        let blocker = temp_path(store.checks_path());
        fs::create_dir(&blocker).unwrap();
        assert!(store.save(&after).is_err());
        assert_eq!(store.load().unwrap(), before);
        assert!(!temp_path(store.accounts_path()).exists());

        fs::remove_dir(&blocker).unwrap();
        store.save(&after).unwrap();
        assert_eq!(store.load().unwrap(), after);
    }

    #[test]
    fn second_open_of_the_same_directory_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let _held = open(dir.path());
        let err = JsonFileStore::open(dir.path(), "a.json", "b.json").unwrap_err();
        assert!(matches!(err, PersistenceError::Locked(_)));
    }

    #[test]
    fn corrupt_document_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users_data.json"), "{ not json").unwrap();
        let store = open(dir.path());
        assert!(store.load().unwrap().accounts.is_empty());
        assert!(!store.accounts_path().exists());
        let quarantined = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|e| e.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(quarantined);
    }
}
