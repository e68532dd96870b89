//! The JSON document behind the device store.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use civic_store::StoreError;
use fd_lock::RwLock;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

/// Default file name inside a data directory.
pub const STORE_FILE_NAME: &str = "device_store.json";

/// A keyed-record store persisted as a single JSON object.
///
/// Every mutation runs read-modify-write while holding an exclusive advisory
/// lock on `<file>.lock`, so separate handles and separate processes on the
/// same file serialize. The new document lands through a uniquely named temp
/// file and a rename: readers see either the old or the new document.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<RwLock<File>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// The file itself is created lazily on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Backend(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let lock_path = lock_path(&path);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                StoreError::Backend(format!("failed to open {}: {e}", lock_path.display()))
            })?;
        Ok(Self {
            path,
            lock: Mutex::new(RwLock::new(lock_file)),
        })
    }

    /// Open `<dir>/device_store.json`.
    pub fn in_dir(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one record.
    pub fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let file_lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _shared = file_lock.read().map_err(|e| self.lock_error(e))?;
        Ok(self.read_document()?.remove(key))
    }

    /// Replace one record, leaving every other record untouched.
    pub fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.insert(key.to_string(), value);
            Ok(())
        })
    }

    /// Delete one record. Deleting an absent record is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.remove(key);
            Ok(())
        })
    }

    /// Apply `f` to the freshly read document and persist the result.
    ///
    /// Nothing is written when `f` fails.
    pub fn update<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<R, StoreError>,
    {
        let mut file_lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _exclusive = file_lock.write().map_err(|e| self.lock_error(e))?;
        let mut doc = self.read_document()?;
        let result = f(&mut doc)?;
        self.write_document(&doc)?;
        Ok(result)
    }

    fn lock_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Backend(format!("failed to lock {}: {e}", self.path.display()))
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StoreError::Backend(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corruption(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(StoreError::Corruption(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_document(&self, doc: &Map<String, Value>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err =
            |e: std::io::Error| StoreError::Backend(format!("failed to write {}: {e}", self.path.display()));
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| {
            StoreError::Backend(format!("failed to replace {}: {}", self.path.display(), e.error))
        })?;
        tracing::trace!(path = %self.path.display(), records = doc.len(), "device store written");
        Ok(())
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileStore::in_dir(dir.path()).expect("open store");
        (dir, store)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let (dir, store) = temp_store();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!(2)).unwrap();

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["device_store.json", "device_store.json.lock"]);
    }

    #[test]
    fn separate_handles_on_one_file_do_not_tear_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);

        let writers: Vec<_> = (0..2)
            .map(|w| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = FileStore::open(path).unwrap();
                    for i in 0..50 {
                        store.set(&format!("w{w}-{i}"), json!(i)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        for w in 0..2 {
            for i in 0..50 {
                assert_eq!(store.get(&format!("w{w}-{i}")).unwrap(), Some(json!(i)));
            }
        }
    }

    #[test]
    fn set_keeps_other_records() {
        let (_dir, store) = temp_store();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!("two")).unwrap();
        store.set("a", json!(3)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!(3)));
        assert_eq!(store.get("b").unwrap(), Some(json!("two")));
    }

    #[test]
    fn records_survive_reopen() {
        let (dir, store) = temp_store();
        store.set("k", json!({"x": true})).unwrap();
        drop(store);

        let reopened = FileStore::in_dir(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(json!({"x": true})));
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let (_dir, store) = temp_store();
        store.remove("ghost").unwrap();
        assert_eq!(store.get("ghost").unwrap(), None);
    }

    #[test]
    fn garbage_file_is_corruption() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::Corruption(_))));

        fs::write(store.path(), "[1, 2]").unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::Corruption(_))));
    }

    #[test]
    fn failed_update_writes_nothing() {
        let (_dir, store) = temp_store();
        store.set("k", json!(1)).unwrap();
        let result: Result<(), _> = store.update(|doc| {
            doc.insert("k".into(), json!(2));
            Err(StoreError::Backend("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));
    }
}
