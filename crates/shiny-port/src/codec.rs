//! Tagged-section framing for ShinyAreaFormat files.
//!
//! A section is a JSON payload between `[Tag]` and `[End Tag]` markers.
//! Matching is case-insensitive, spans lines, and tolerates blank lines and
//! runs of whitespace inside multi-word tags.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FormatError, FormatResult};

/// Version written into the header of every exported file.
pub const FORMAT_VERSION: &str = "1.0";

static VERSION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\[ShinyMUD\s+Version\s+"(?P<version>[^"]*)"\]"#)
        .expect("version header regex must compile")
});

/// The nine sections of an area file, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Area fields.
    Area,
    /// Scripts.
    Scripts,
    /// Item prototypes.
    Items,
    /// Item facets, keyed by item id and type name.
    ItemTypes,
    /// Npc prototypes.
    Npcs,
    /// Npc events, keyed by npc id and referencing a script id.
    NpcEvents,
    /// Rooms.
    Rooms,
    /// Exits, keyed by source room id.
    RoomExits,
    /// Spawn points, grouped by room id.
    RoomSpawns,
}

impl Section {
    /// Every section in the order it is written and rebuilt.
    pub const ALL: [Section; 9] = [
        Self::Area,
        Self::Scripts,
        Self::Items,
        Self::ItemTypes,
        Self::Npcs,
        Self::NpcEvents,
        Self::Rooms,
        Self::RoomExits,
        Self::RoomSpawns,
    ];

    /// Tag name as written between the brackets.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Scripts => "Scripts",
            Self::Items => "Items",
            Self::ItemTypes => "Item Types",
            Self::Npcs => "Npcs",
            Self::NpcEvents => "Npc Events",
            Self::Rooms => "Rooms",
            Self::RoomExits => "Room Exits",
            Self::RoomSpawns => "Room Spawns",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Wrap a payload as a tagged section.
pub fn encode<T: Serialize + ?Sized>(tag: &str, payload: &T) -> FormatResult<String> {
    let body = serde_json::to_string(payload).map_err(|source| FormatError::Encode {
        tag: tag.to_string(),
        source,
    })?;
    Ok(format!("\n[{tag}]\n{body}\n[End {tag}]\n"))
}

/// Build the matcher for one tag. Words of multi-word tags may be separated
/// by any whitespace.
fn section_pattern(tag: &str) -> FormatResult<Regex> {
    let words: Vec<String> = tag.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(FormatError::InvalidTag {
            tag: tag.to_string(),
            reason: "tag name is empty".to_string(),
        });
    }
    let name = words.join(r"\s+");
    let pattern = format!(r"(?is)\[\s*{name}\s*\]\r?\n?(?P<body>.*?)\r?\n?\[\s*End\s+{name}\s*\]");
    Regex::new(&pattern).map_err(|e| FormatError::InvalidTag {
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

/// Return the raw body of the first `[tag]`…`[End tag]` pair in `text`.
pub fn extract<'t>(tag: &str, text: &'t str) -> FormatResult<&'t str> {
    section_pattern(tag)?
        .captures(text)
        .and_then(|caps| caps.name("body"))
        .map(|body| body.as_str())
        .ok_or_else(|| FormatError::MissingTag(tag.to_string()))
}

/// Extract a tagged section and deserialize its payload.
pub fn decode<T: DeserializeOwned>(tag: &str, text: &str) -> FormatResult<T> {
    let body = extract(tag, text)?;
    serde_json::from_str(body.trim()).map_err(|source| FormatError::Malformed {
        tag: tag.to_string(),
        source,
    })
}

/// The header line recording the format version a file was written with.
pub fn version_header(version: &str) -> String {
    format!("[ShinyMUD Version \"{version}\"]\n")
}

/// Read the format version from a file's header, if it has one.
pub fn parse_version(text: &str) -> Option<String> {
    VERSION_HEADER
        .captures(text)
        .and_then(|caps| caps.name("version"))
        .map(|v| v.as_str().to_string())
}
