//! Record of a completed library build, written next to the artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::BuildError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    pub solver: String,
    pub compiler: PathBuf,
    pub family: String,
    pub compile_flags: Vec<String>,
    pub link_libs: Vec<String>,
    pub static_lib: PathBuf,
    pub shared_lib: PathBuf,
    pub exported_symbol: String,
}

impl BuildManifest {
    pub fn write(&self, path: &Path) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::Manifest(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| BuildError::Manifest(e.to_string()))
    }
}
