//! Key-value persistence: one JSON file per key inside the data dir.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("stored value is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the value stored under `key`. A missing key is `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Replace the value stored under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(value)?;

        // write-then-rename: readers never observe a partial file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Move the file behind `key` aside to `<key>.json.bak`, replacing any
    /// older backup. Returns the backup path.
    pub fn back_up(&self, key: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(key);
        let backup = path.with_extension("json.bak");
        fs::rename(&path, &backup)?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let value: Option<Vec<String>> = store.get("nothing-here").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested"));

        store.set("words", &vec!["a", "b"]).unwrap();
        let value: Option<Vec<String>> = store.get("words").unwrap();

        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        store.set("n", &1).unwrap();
        store.set("n", &2).unwrap();

        assert_eq!(store.get::<i32>("n").unwrap(), Some(2));
    }

    #[test]
    fn test_get_corrupt_value() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "[1, 2").unwrap();
        let store = Store::new(dir.path());

        let result = store.get::<Vec<i32>>("bad");
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[test]
    fn test_back_up_moves_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "[1, 2").unwrap();
        let store = Store::new(dir.path());

        let backup = store.back_up("bad").unwrap();

        assert_eq!(backup, dir.path().join("bad.json.bak"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[1, 2");
        assert_eq!(store.get::<Vec<i32>>("bad").unwrap(), None);
    }

    #[test]
    fn test_back_up_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        assert!(matches!(store.back_up("nothing"), Err(StoreError::Io(_))));
    }
}
