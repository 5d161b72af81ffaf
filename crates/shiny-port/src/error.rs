//! Error types for area import and export.
//!
//! Messages are written for the builder who asked for the import or export.
//! Low-level detail stays in the `source` chain and goes to the log.

use std::io;
use std::path::PathBuf;

use shiny_core::CoreError;
use thiserror::Error;

/// Result type for section framing.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for imports.
pub type ImportResult<T> = Result<T, ImportError>;

/// A required tagged section is missing or unreadable.
#[derive(Debug, Error)]
pub enum FormatError {
    /// No `[tag]`…`[End tag]` pair was found.
    #[error("Corrupted file: missing or malformed {0} tag.")]
    MissingTag(String),

    /// The section body is not the expected JSON structure.
    #[error("Corrupted file: malformed {tag} section.")]
    Malformed {
        /// The tag whose body failed to parse.
        tag: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload could not be serialized.
    #[error("cannot encode {tag} section")]
    Encode {
        /// The tag being written.
        tag: String,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The tag name cannot be matched.
    #[error("invalid tag name {tag:?}: {reason}")]
    InvalidTag {
        /// The offending tag name.
        tag: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Any failure while importing one area.
#[derive(Debug, Error)]
pub enum ImportError {
    /// There is no file for the requested area.
    #[error("Error: {0}.txt does not exist.")]
    NotFound(String),

    /// The area file exists but could not be read.
    #[error("Error: opening the area file failed. Check the logfile for details.")]
    Unreadable {
        /// Path of the area file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A section of the file is missing or malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// An area with this name is already loaded.
    #[error("Aborted: area {0} already exists.")]
    AlreadyExists(String),

    /// Rebuilding the area failed and everything created so far was removed.
    #[error("There was a horrible error on import! Aborting! Check logfile for details.")]
    Aborted {
        /// The area being imported.
        area: String,
        /// What went wrong while building.
        #[source]
        source: CoreError,
    },
}

/// Any failure while exporting one area.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested area is not loaded.
    #[error("Area {0} does not exist.")]
    AreaNotFound(String),

    /// The export directory could not be created.
    #[error("Export failed; something went wrong accessing the export directory for areas.")]
    CreateDir {
        /// The export directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The area file could not be written.
    #[error("Error writing your area to file. Check the logfile for details.")]
    Write {
        /// Path of the area file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The area could not be serialized.
    #[error("Export failed; the area could not be serialized.")]
    Encode(#[from] FormatError),
}

/// Render an error and its whole source chain on one line, for the log.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
