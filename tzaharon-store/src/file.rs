//! Single JSON file store.
//!
//! # Storage layout
//!
//! ```text
//! <data dir>/tzaharon/
//!   <key>.json       (mode 0600)
//! ```
//!
//! Writes go to a `.json.tmp` sibling and are renamed over the target, so a
//! crash mid-write leaves the previous record intact. Saves through one
//! store (and its clones) are serialized, since they share the tmp path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tzaharon_core::AppState;

use crate::error::{io_err, join_err, StoreError};
use crate::{decode, encode, StateStore};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// `<data_root>/tzaharon/<key>.json`. Pure, no I/O.
    pub fn path_for_key(data_root: &Path, key: &str) -> PathBuf {
        data_root.join("tzaharon").join(format!("{key}.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<Option<AppState>, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_blocking(&path))
            .await
            .map_err(join_err)?
    }

    async fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let encoded = encode(state)?;
        let path = self.path.clone();
        let tmp = self.tmp_path();
        let _guard = self.write_lock.lock().await;
        tokio::task::spawn_blocking(move || save_blocking(&path, &tmp, &encoded))
            .await
            .map_err(join_err)?
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

fn load_blocking(path: &Path) -> Result<Option<AppState>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    decode(&contents)
}

fn save_blocking(path: &Path, tmp: &Path, encoded: &str) -> Result<(), StoreError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid state file path")));
    };
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    std::fs::write(tmp, encoded).map_err(|e| io_err(tmp, e))?;
    set_file_permissions(tmp)?;
    std::fs::rename(tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}
