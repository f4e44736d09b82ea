//! Best-score persistence
//!
//! The only persisted game data is a single best-score integer, stored as a
//! small JSON record. Browsers keep it in LocalStorage; native builds keep it
//! in a file that is replaced atomically (tmp file, then rename).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default record location for native builds
pub const DEFAULT_BEST_SCORE_PATH: &str = "skyhop_best.json";
/// LocalStorage key (used only in wasm32)
pub const STORAGE_KEY: &str = "skyhop_best_score";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed best-score record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// On-disk / LocalStorage record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestScoreRecord {
    pub best: u32,
}

/// Where the best score lives between sessions
pub trait ScoreStore {
    /// Stored best score; a missing record is 0
    fn load_best(&self) -> Result<u32, StorageError>;
    fn save_best(&mut self, best: u32) -> Result<(), StorageError>;
}

/// Load the best score, falling back to 0 (and logging) on any failure
pub fn load_best_or_zero(store: &dyn ScoreStore) -> u32 {
    match store.load_best() {
        Ok(best) => {
            log::info!("Loaded best score {}", best);
            best
        }
        Err(e) => {
            log::warn!("Could not load best score, starting from 0: {}", e);
            0
        }
    }
}

/// Save the best score, logging failures; the game carries on regardless
pub fn save_best_logged(store: &mut dyn ScoreStore, best: u32) {
    match store.save_best(best) {
        Ok(()) => log::info!("Best score saved ({})", best),
        Err(e) => log::warn!("Could not save best score {}: {}", best, e),
    }
}

/// In-process store for tests and storage-less environments
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub record: Option<BestScoreRecord>,
    pub saves: u32,
}

impl ScoreStore for MemoryStore {
    fn load_best(&self) -> Result<u32, StorageError> {
        Ok(self.record.map(|r| r.best).unwrap_or(0))
    }

    fn save_best(&mut self, best: u32) -> Result<(), StorageError> {
        self.record = Some(BestScoreRecord { best });
        self.saves += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{FileStore, write_json_atomic};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use serde::Serialize;

    use super::{BestScoreRecord, ScoreStore, StorageError};

    /// JSON file store
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ScoreStore for FileStore {
        fn load_best(&self) -> Result<u32, StorageError> {
            let text = match fs::read_to_string(&self.path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
                Err(e) => return Err(e.into()),
            };
            let record: BestScoreRecord = serde_json::from_str(&text)?;
            Ok(record.best)
        }

        fn save_best(&mut self, best: u32) -> Result<(), StorageError> {
            write_json_atomic(&self.path, &BestScoreRecord { best })
        }
    }

    /// Serialize `value` and replace `path` via a sibling tmp file
    pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path_for(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("skyhop");
        path.with_file_name(format!("{file_name}.tmp"))
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{BestScoreRecord, STORAGE_KEY, ScoreStore, StorageError};

    /// Browser LocalStorage store
    #[derive(Debug, Clone)]
    pub struct LocalStorageStore {
        key: String,
    }

    impl Default for LocalStorageStore {
        fn default() -> Self {
            Self {
                key: STORAGE_KEY.to_string(),
            }
        }
    }

    fn local_storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StorageError::Unavailable("LocalStorage is not accessible".to_string()))
    }

    impl ScoreStore for LocalStorageStore {
        fn load_best(&self) -> Result<u32, StorageError> {
            let storage = local_storage()?;
            match storage.get_item(&self.key) {
                Ok(Some(json)) => {
                    let record: BestScoreRecord = serde_json::from_str(&json)?;
                    Ok(record.best)
                }
                Ok(None) => Ok(0),
                Err(_) => Err(StorageError::Unavailable(format!("cannot read {}", self.key))),
            }
        }

        fn save_best(&mut self, best: u32) -> Result<(), StorageError> {
            let storage = local_storage()?;
            let json = serde_json::to_string(&BestScoreRecord { best })?;
            storage
                .set_item(&self.key, &json)
                .map_err(|_| StorageError::Unavailable(format!("cannot write {}", self.key)))
        }
    }
}
