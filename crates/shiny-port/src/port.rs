//! Import and export of single areas.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shiny_core::{Area, CoreError, World};
use tracing::{error, info};

use crate::builder::GraphBuilder;
use crate::config::PortConfig;
use crate::error::{ExportError, ImportError, ImportResult, error_chain};
use crate::guard::ImportGuard;
use crate::payload::AreaPayload;
use crate::serializer::serialize_area;

/// What a successful import created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Name the area was registered under.
    pub name: String,
    /// Display title of the area.
    pub title: String,
    /// Format version from the file header, if present.
    pub version: Option<String>,
    /// Number of scripts.
    pub scripts: usize,
    /// Number of items.
    pub items: usize,
    /// Number of npcs.
    pub npcs: usize,
    /// Number of rooms.
    pub rooms: usize,
    /// Number of exits.
    pub exits: usize,
}

impl ImportSummary {
    fn of(area: &Area, version: Option<String>) -> Self {
        Self {
            name: area.name().to_string(),
            title: area.title().to_string(),
            version,
            scripts: area.script_count(),
            items: area.item_count(),
            npcs: area.npc_count(),
            rooms: area.room_count(),
            exits: area.exit_count(),
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has been successfully imported.", self.title)
    }
}

/// Result of exporting one area. Failures are reported, never raised.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The area was written to this path.
    Exported(PathBuf),
    /// Nothing usable was written.
    Failed(ExportError),
}

impl ExportOutcome {
    /// Whether the export succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exported(_))
    }
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exported(path) => write!(
                f,
                "Export complete! Your area can be found at:\n{}",
                path.display()
            ),
            Self::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// Moves areas between a [`World`] and area files on disk.
pub struct AreaPort<'w> {
    world: &'w mut World,
    config: PortConfig,
}

impl<'w> AreaPort<'w> {
    /// A port over `world` using the directories in `config`.
    pub fn new(world: &'w mut World, config: PortConfig) -> Self {
        Self { world, config }
    }

    /// The directories in use.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// The world areas are imported into.
    pub fn world(&self) -> &World {
        self.world
    }

    /// Import `<import_dir>/<name>.txt` as the area `name`.
    ///
    /// The file is fully decoded before anything is created. If building the
    /// graph fails, every row created so far is deleted and the area never
    /// becomes visible.
    pub fn import_area(&mut self, name: &str) -> ImportResult<ImportSummary> {
        if self.world.get_area(name).is_some() {
            return Err(ImportError::AlreadyExists(name.to_string()));
        }

        let path = self.config.import_path(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ImportError::NotFound(name.to_string()));
            }
            Err(source) => {
                let err = ImportError::Unreadable { path, source };
                error!(area = name, error = %error_chain(&err), "cannot read area file");
                return Err(err);
            }
        };
        info!(area = name, path = %path.display(), "importing area");

        let payload = match AreaPayload::decode(&text) {
            Ok(payload) => payload,
            Err(source) => {
                let err = ImportError::Format(source);
                error!(area = name, error = %error_chain(&err), "cannot decode area file");
                return Err(err);
            }
        };
        let version = payload.version.clone();

        let mut guard = ImportGuard::new();
        let (registry, store) = self.world.parts_mut();
        if let Err(source) = GraphBuilder::new(registry, store).build(name, payload, &mut guard) {
            let err = ImportError::Aborted {
                area: name.to_string(),
                source,
            };
            error!(area = name, error = %error_chain(&err), "import failed, rolling back");
            guard.rollback(self.world.store_mut());
            return Err(err);
        }

        let summary = guard
            .area()
            .map(|area| ImportSummary::of(area, version))
            .ok_or_else(|| ImportError::Aborted {
                area: name.to_string(),
                source: CoreError::AreaNotFound(name.to_string()),
            })?;
        guard
            .commit(self.world)
            .map_err(|source| ImportError::Aborted {
                area: name.to_string(),
                source,
            })?;
        info!(area = name, rooms = summary.rooms, "import complete");
        Ok(summary)
    }

    /// Write the registered area `name` to `<export_dir>/<name>.txt`.
    pub fn export_area(&self, name: &str) -> ExportOutcome {
        let Some(area) = self.world.get_area(name) else {
            return ExportOutcome::Failed(ExportError::AreaNotFound(name.to_string()));
        };
        export_to(area, &self.config.export_dir)
    }
}

/// Write `area` to `<dir>/<name>.txt`, creating `dir` if needed and
/// overwriting any previous export.
pub fn export_to(area: &Area, dir: &Path) -> ExportOutcome {
    let result = write_area(area, dir);
    match result {
        Ok(path) => {
            info!(area = area.name(), path = %path.display(), "area exported");
            ExportOutcome::Exported(path)
        }
        Err(err) => {
            error!(area = area.name(), error = %error_chain(&err), "export failed");
            ExportOutcome::Failed(err)
        }
    }
}

fn write_area(area: &Area, dir: &Path) -> Result<PathBuf, ExportError> {
    let text = serialize_area(area)?;
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.txt", area.name()));
    fs::write(&path, text).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
