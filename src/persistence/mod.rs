//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope holding one opaque blob per scene
//! - Storage behind a [`SaveStore`] (file with backup rotation, or memory)

pub mod store;

pub use store::{FileStore, MemoryStore, SaveStore};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Envelope format version
pub const SAVE_VERSION: u32 = 1;

/// Everything written to a save slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Scene name -> that scene's own state
    pub scenes: BTreeMap<String, Value>,
}

impl Default for SaveEnvelope {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            scenes: BTreeMap::new(),
        }
    }
}

impl SaveEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse and check the version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Self = serde_json::from_slice(bytes)?;
        if envelope.version != SAVE_VERSION {
            return Err(Error::SaveVersion {
                found: envelope.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(envelope)
    }

    /// Write to `path` in `store`
    pub fn save(&self, store: &mut dyn SaveStore, path: &str) -> Result<()> {
        store.save_state(path, &self.to_bytes()?)?;
        log::info!("Saved {} scene states to {path}", self.scenes.len());
        Ok(())
    }

    /// Read from `path`; `None` when nothing was saved yet
    pub fn load(store: &dyn SaveStore, path: &str) -> Result<Option<Self>> {
        match store.load_state(path)? {
            Some(bytes) => Self::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_through_store() {
        let mut store = MemoryStore::new();
        assert_eq!(SaveEnvelope::load(&store, "slot").unwrap(), None);

        let mut envelope = SaveEnvelope::new();
        envelope.scenes.insert("level".to_string(), json!({ "health": 3 }));
        envelope.save(&mut store, "slot").unwrap();

        let loaded = SaveEnvelope::load(&store, "slot").unwrap().unwrap();
        assert_eq!(loaded, envelope);
    }

    #[test]
    fn test_rejects_other_versions() {
        let bytes = br#"{ "version": 99, "scenes": {} }"#;
        match SaveEnvelope::from_bytes(bytes) {
            Err(Error::SaveVersion { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, SAVE_VERSION);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_corrupt_data() {
        assert!(matches!(SaveEnvelope::from_bytes(b"{ oops"), Err(Error::Json(_))));
    }
}
