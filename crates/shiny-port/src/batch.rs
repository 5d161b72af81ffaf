//! Import and export over a batch of area names.
//!
//! One area failing never stops the batch; every outcome ends up as a line
//! of the returned [`BatchReport`].

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::port::{AreaPort, ExportOutcome};

/// Which areas a batch applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every eligible area.
    All,
    /// Exactly these names, in order.
    Names(Vec<String>),
}

impl Selection {
    /// Build a selection from command arguments. A lone `all` selects
    /// everything.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = args.into_iter().map(Into::into).collect();
        match names.as_slice() {
            [only] if only.eq_ignore_ascii_case("all") => Self::All,
            _ => Self::Names(names),
        }
    }
}

/// Direction of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Area files into the world.
    Import,
    /// Registered areas out to files.
    Export,
}

/// How one entry of a batch went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The area was imported or exported.
    Done,
    /// Left alone because an area with that name is already loaded.
    Skipped,
    /// The attempt failed; see the message.
    Failed,
}

/// One line of a batch report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// Import or export.
    pub kind: BatchKind,
    /// Area name.
    pub name: String,
    /// Outcome.
    pub status: EntryStatus,
    /// Message shown to the user.
    pub message: String,
}

impl fmt::Display for BatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BatchKind::Import => write!(f, "Importing {}.txt... {}", self.name, self.message),
            BatchKind::Export => write!(f, "Exporting {}... {}", self.name, self.message),
        }
    }
}

/// Aggregated result of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchReport {
    /// There was nothing to work on.
    NothingFound(String),
    /// One entry per selected area, in order.
    Completed(Vec<BatchEntry>),
}

impl BatchReport {
    /// All entries; empty for [`BatchReport::NothingFound`].
    pub fn entries(&self) -> &[BatchEntry] {
        match self {
            Self::NothingFound(_) => &[],
            Self::Completed(entries) => entries,
        }
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries().iter().filter(|e| e.status == status).count()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingFound(msg) => write!(f, "{msg}"),
            Self::Completed(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{entry}")?;
                }
                Ok(())
            }
        }
    }
}

impl AreaPort<'_> {
    /// Import every selected area file.
    ///
    /// Areas that are already loaded are skipped without being touched.
    pub fn import_list(&mut self, selection: &Selection) -> BatchReport {
        let names = match selection {
            Selection::All => {
                let names = importable_names(&self.config().import_dir);
                if names.is_empty() {
                    return BatchReport::NothingFound(
                        "I couldn't find any pre-packaged areas.".into(),
                    );
                }
                names
            }
            Selection::Names(names) if names.is_empty() => {
                return BatchReport::NothingFound("No pre-packaged areas were found.".into());
            }
            Selection::Names(names) => names.clone(),
        };

        let entries = names
            .into_iter()
            .map(|name| {
                let (status, message) = if self.world().get_area(&name).is_some() {
                    (
                        EntryStatus::Skipped,
                        format!("Aborted: area {name} already exists."),
                    )
                } else {
                    match self.import_area(&name) {
                        Ok(summary) => (EntryStatus::Done, summary.to_string()),
                        Err(e) => (EntryStatus::Failed, format!("Failed: {e}")),
                    }
                };
                debug!(area = %name, ?status, "batch import entry");
                BatchEntry {
                    kind: BatchKind::Import,
                    name,
                    status,
                    message,
                }
            })
            .collect();
        BatchReport::Completed(entries)
    }

    /// Export every selected area. [`Selection::All`] means every registered
    /// area.
    pub fn export_list(&self, selection: &Selection) -> BatchReport {
        let names: Vec<String> = match selection {
            Selection::All => self.world().registry().names().map(String::from).collect(),
            Selection::Names(names) => names.clone(),
        };
        if names.is_empty() {
            return BatchReport::NothingFound("There are no areas to export.".into());
        }

        let entries = names
            .into_iter()
            .map(|name| {
                let outcome = self.export_area(&name);
                let status = match outcome {
                    ExportOutcome::Exported(_) => EntryStatus::Done,
                    ExportOutcome::Failed(_) => EntryStatus::Failed,
                };
                BatchEntry {
                    kind: BatchKind::Export,
                    name,
                    status,
                    message: outcome.to_string(),
                }
            })
            .collect();
        BatchReport::Completed(entries)
    }
}

/// Names of the `.txt` area files in `dir`, without extension, sorted.
///
/// A missing or unreadable directory yields no names.
pub fn importable_names(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "cannot read import directory");
            }
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

/// Banner listing of the area files available for import.
pub fn list_importable(dir: &Path) -> String {
    let names = importable_names(dir);
    if names.is_empty() {
        return "There are no area files in your import directory.".into();
    }
    let mut out = format!("{:-^50}\n", " Available For Import ");
    for name in &names {
        out.push_str(name);
        out.push('\n');
    }
    out.push_str(&"-".repeat(50));
    out
}
