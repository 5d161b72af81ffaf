//! Where area files are read from and written to.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the import directory.
pub const IMPORT_DIR_VAR: &str = "SHINY_IMPORT_DIR";
/// Environment variable overriding the export directory.
pub const EXPORT_DIR_VAR: &str = "SHINY_EXPORT_DIR";

/// Directories used by the area port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Directory scanned for `.txt` area files. Only read from.
    pub import_dir: PathBuf,
    /// Directory exported area files are written to. Created on demand.
    pub export_dir: PathBuf,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            import_dir: PathBuf::from("areas"),
            export_dir: PathBuf::from("areas"),
        }
    }
}

impl PortConfig {
    /// Load from `SHINY_IMPORT_DIR` / `SHINY_EXPORT_DIR`, falling back to the
    /// defaults for unset variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            import_dir: lookup(IMPORT_DIR_VAR)
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.import_dir, PathBuf::from),
            export_dir: lookup(EXPORT_DIR_VAR)
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.export_dir, PathBuf::from),
        }
    }

    /// Set the import directory.
    pub fn with_import_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.import_dir = dir.into();
        self
    }

    /// Set the export directory.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Path of the import file for an area.
    pub fn import_path(&self, area: &str) -> PathBuf {
        area_file(&self.import_dir, area)
    }

    /// Path of the export file for an area.
    pub fn export_path(&self, area: &str) -> PathBuf {
        area_file(&self.export_dir, area)
    }
}

fn area_file(dir: &Path, area: &str) -> PathBuf {
    dir.join(format!("{area}.txt"))
}
