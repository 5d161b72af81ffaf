//! Plain-text export and import of ShinyMUD areas.
//!
//! An area and everything it owns is written as nine tagged JSON sections
//! (ShinyAreaFormat) and can be rebuilt from such a file, under the same or
//! a new name, into a running [`shiny_core::World`]. Imports are
//! all-or-nothing: a failure at any point deletes every row created so far.
//!
//! ```no_run
//! use shiny_core::World;
//! use shiny_port::{AreaPort, PortConfig, Selection};
//!
//! let mut world = World::in_memory();
//! let mut port = AreaPort::new(&mut world, PortConfig::from_env());
//! println!("{}", port.import_list(&Selection::All));
//! ```

pub mod batch;
pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod guard;
pub mod payload;
pub mod port;
pub mod serializer;

pub use batch::{
    BatchEntry, BatchKind, BatchReport, EntryStatus, Selection, importable_names,
    list_importable,
};
pub use builder::GraphBuilder;
pub use codec::{FORMAT_VERSION, Section};
pub use config::PortConfig;
pub use error::{ExportError, FormatError, FormatResult, ImportError, ImportResult, error_chain};
pub use guard::ImportGuard;
pub use payload::AreaPayload;
pub use port::{AreaPort, ExportOutcome, ImportSummary, export_to};
pub use serializer::serialize_area;
