use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::config::PersistedSettings;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable home of the desired temperature.
pub trait TargetStore {
    fn load(&self) -> Result<Option<i32>, StoreError>;
    fn save(&self, desired_temp_c: i32) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FileTargetStore {
    path: PathBuf,
}

impl FileTargetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("settings.json"))
    }


    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TargetStore for FileTargetStore {
    fn load(&self) -> Result<Option<i32>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        let mut settings: PersistedSettings =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        settings.sanitize();
        Ok(Some(settings.desired_temp_c))
    }

    fn save(&self, desired_temp_c: i32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
            }
        }

        let payload = serde_json::to_vec_pretty(&PersistedSettings { desired_temp_c })
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, payload).map_err(|err| self.io_error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("heatbot-store-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_loads_as_none() {
        let store = FileTargetStore::in_dir(scratch_dir("missing"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn saved_value_is_restored() {
        let dir = scratch_dir("roundtrip");
        let store = FileTargetStore::in_dir(&dir);

        store.save(27).unwrap();
        assert_eq!(store.load().unwrap(), Some(27));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn out_of_range_file_value_is_clamped_on_load() {
        let dir = scratch_dir("clamp");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("settings.json"), br#"{"desiredTemp": 90}"#).unwrap();

        let store = FileTargetStore::in_dir(&dir);
        assert_eq!(store.load().unwrap(), Some(36));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_file_reports_parse_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("settings.json"), b"not json").unwrap();

        let store = FileTargetStore::in_dir(&dir);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let dir = scratch_dir("blocked");
        fs::create_dir_all(&dir).unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let store = FileTargetStore::new(blocker.join("settings.json"));
        assert!(matches!(store.save(20), Err(StoreError::Io { .. })));

        let _ = fs::remove_dir_all(dir);
    }
}
