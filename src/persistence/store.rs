//! Persistence collaborator and its backends

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Persistence collaborator: opaque bytes by path
pub trait SaveStore {
    fn save_state(&mut self, path: &str, blob: &[u8]) -> Result<()>;
    /// `Ok(None)` when nothing was saved under `path`
    fn load_state(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Files under a root directory
///
/// Writes go to `<path>.tmp` first; the previous save is kept as
/// `<path>.bak` before the new one is moved into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl SaveStore for FileStore {
    fn save_state(&mut self, path: &str, blob: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = target.with_extension("tmp");
        fs::write(&tmp, blob)?;
        if target.exists() {
            fs::rename(&target, target.with_extension("bak"))?;
        }
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn load_state(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.resolve(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and throwaway runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn save_state(&mut self, path: &str, blob: &[u8]) -> Result<()> {
        self.slots.insert(path.to_string(), blob.to_vec());
        Ok(())
    }

    fn load_state(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(path).cloned())
    }
}
