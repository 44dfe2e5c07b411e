//! Format-agnostic configuration loading

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and deserializes
/// transparently.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => {
                let content = read(path)?;
                toml::from_str(&content).map_err(|e| Error::ConfigParse {
                    path: path.to_path_buf(),
                    format: "TOML".into(),
                    message: e.to_string(),
                })
            }
            "json" => {
                let content = read(path)?;
                serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                    path: path.to_path_buf(),
                    format: "JSON".into(),
                    message: e.to_string(),
                })
            }
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
