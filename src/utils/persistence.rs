use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

/// Writes `value` as pretty JSON, staging to a `.tmp` sibling before renaming
/// over the destination.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Reads and deserializes a JSON document from disk.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
