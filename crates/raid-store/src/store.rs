//! Flat key→record RON files
//!
//! Every file holds one map from a string (or id) key to a record. A
//! missing file reads as an empty map; writes go to a sibling temp file
//! first and are renamed into place.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::hash::Hash;
use std::path::Path;

/// Read a RON document, or `T::default()` when the file does not exist
pub fn read_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    ron::from_str(&content).map_err(|source| Error::Ron {
        file: path.display().to_string(),
        source,
    })
}

/// Pretty-print `value` to `path`
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| Error::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("ron.tmp");
    fs::write(&staging, content)?;
    fs::rename(&staging, path)?;
    Ok(())
}

/// Read a keyed record file
pub fn read_records<K, V>(path: &Path) -> Result<IndexMap<K, V>>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
{
    read_or_default(path)
}

/// Write a keyed record file
pub fn write_records<K, V>(path: &Path, records: &IndexMap<K, V>) -> Result<()>
where
    K: Serialize + Eq + Hash,
    V: Serialize,
{
    write(path, records)
}
