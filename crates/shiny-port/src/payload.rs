//! The decoded contents of an area file.
//!
//! Owned entities are written in their own sections with an explicit owner
//! id (`item`, `prototype`, `room`) instead of being nested in their owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shiny_core::{
    AreaMeta, Direction, EntityId, Fields, Item, ItemType, Npc, NpcEvent, Room, Script, SpawnPoint,
};
use tracing::debug;

use crate::codec::{self, FORMAT_VERSION, Section};
use crate::error::FormatResult;

/// One entry of the `Item Types` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTypeRecord {
    /// Id of the owning item.
    pub item: EntityId,
    /// The facet itself.
    #[serde(flatten)]
    pub facet: ItemType,
}

/// One entry of the `Npc Events` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcEventRecord {
    /// Id of the owning npc.
    pub prototype: EntityId,
    /// The event, naming its script by id.
    #[serde(flatten)]
    pub event: NpcEvent,
}

/// One entry of the `Room Exits` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRecord {
    /// Id of the room the exit leaves from.
    pub room: EntityId,
    /// Direction of the exit.
    pub direction: Direction,
    /// Destination room id.
    pub to_id: EntityId,
    /// Name of the area owning the destination room.
    pub to_area: String,
    /// Placeholder for the resolved destination. Always written as `null`.
    #[serde(default)]
    pub to_room: Option<EntityId>,
    /// Door state and other exit fields.
    #[serde(flatten)]
    pub fields: Fields,
}

/// Spawn points grouped by the id of the room they belong to.
pub type RoomSpawns = BTreeMap<EntityId, Vec<SpawnPoint>>;

/// Every section of one area file.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaPayload {
    /// Format version from the file header, if present.
    pub version: Option<String>,
    /// Area fields.
    pub area: AreaMeta,
    /// Scripts.
    pub scripts: Vec<Script>,
    /// Item prototypes.
    pub items: Vec<Item>,
    /// Item facets.
    pub item_types: Vec<ItemTypeRecord>,
    /// Npc prototypes.
    pub npcs: Vec<Npc>,
    /// Npc events.
    pub npc_events: Vec<NpcEventRecord>,
    /// Rooms.
    pub rooms: Vec<Room>,
    /// Exits.
    pub room_exits: Vec<ExitRecord>,
    /// Spawn points.
    pub room_spawns: RoomSpawns,
}

impl AreaPayload {
    /// Decode all nine sections. Fails on the first missing or malformed one,
    /// before anything has been created.
    pub fn decode(text: &str) -> FormatResult<Self> {
        let version = codec::parse_version(text);
        debug!(version = version.as_deref().unwrap_or("none"), "decoding area file");
        Ok(Self {
            version,
            area: codec::decode(Section::Area.tag(), text)?,
            scripts: codec::decode(Section::Scripts.tag(), text)?,
            items: codec::decode(Section::Items.tag(), text)?,
            item_types: codec::decode(Section::ItemTypes.tag(), text)?,
            npcs: codec::decode(Section::Npcs.tag(), text)?,
            npc_events: codec::decode(Section::NpcEvents.tag(), text)?,
            rooms: codec::decode(Section::Rooms.tag(), text)?,
            room_exits: codec::decode(Section::RoomExits.tag(), text)?,
            room_spawns: codec::decode(Section::RoomSpawns.tag(), text)?,
        })
    }

    /// Write the current version header followed by the nine sections in
    /// order. [`AreaPayload::version`] is not written back.
    pub fn encode(&self) -> FormatResult<String> {
        let mut out = codec::version_header(FORMAT_VERSION);
        for section in Section::ALL {
            let tag = section.tag();
            let text = match section {
                Section::Area => codec::encode(tag, &self.area)?,
                Section::Scripts => codec::encode(tag, &self.scripts)?,
                Section::Items => codec::encode(tag, &self.items)?,
                Section::ItemTypes => codec::encode(tag, &self.item_types)?,
                Section::Npcs => codec::encode(tag, &self.npcs)?,
                Section::NpcEvents => codec::encode(tag, &self.npc_events)?,
                Section::Rooms => codec::encode(tag, &self.rooms)?,
                Section::RoomExits => codec::encode(tag, &self.room_exits)?,
                Section::RoomSpawns => codec::encode(tag, &self.room_spawns)?,
            };
            out.push_str(&text);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    const MINIMAL: &str = r#"[ShinyMUD Version "0.5"]
[Area]
{"name": "haven", "title": "Haven"}
[End Area]
[Scripts]
[{"id": "1", "name": "welcome", "body": "say hi"}]
[End Scripts]
[Items]
[]
[End Items]
[Item Types]
[]
[End Item Types]
[Npcs]
[{"id": 1, "name": "guard"}]
[End Npcs]
[Npc Events]
[{"prototype": "1", "script": "1", "event_trigger": "pc_enter", "probability": 100}]
[End Npc Events]
[Rooms]
[{"id": 1, "name": "Gate"}]
[End Rooms]
[Room Exits]
[]
[End Room Exits]
[Room Spawns]
{"1": [{"id": 1, "spawn_type": "npc", "spawn_object_id": 1}]}
[End Room Spawns]
"#;

    #[test]
    fn decode_reads_every_section() {
        let payload = AreaPayload::decode(MINIMAL).unwrap();
        assert_eq!(payload.version.as_deref(), Some("0.5"));
        assert_eq!(payload.area.name, "haven");
        assert_eq!(payload.scripts[0].id, EntityId(1));
        assert_eq!(payload.npc_events[0].prototype, EntityId(1));
        assert_eq!(payload.npc_events[0].event.script, EntityId(1));
        assert_eq!(
            payload.npc_events[0].event.fields["probability"],
            serde_json::json!(100)
        );
        assert_eq!(payload.room_spawns[&EntityId(1)].len(), 1);
    }

    #[test]
    fn decode_fails_on_first_missing_section() {
        let text = MINIMAL.replace("[Npcs]", "[Mobs]");
        let err = AreaPayload::decode(&text).unwrap_err();
        assert!(matches!(err, FormatError::MissingTag(ref t) if t == "Npcs"));
    }

    #[test]
    fn exit_record_writes_null_placeholder() {
        let record = ExitRecord {
            room: EntityId(1),
            direction: Direction::North,
            to_id: EntityId(2),
            to_area: "haven".into(),
            to_room: None,
            fields: Fields::new(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["to_room"].is_null());
        assert_eq!(value["to_id"], 2);
        assert_eq!(value["direction"], "north");
    }

    #[test]
    fn encode_then_decode_keeps_payload() {
        let mut payload = AreaPayload::decode(MINIMAL).unwrap();
        let text = payload.encode().unwrap();
        assert!(text.starts_with(&codec::version_header(FORMAT_VERSION)));

        payload.version = Some(FORMAT_VERSION.to_string());
        assert_eq!(AreaPayload::decode(&text).unwrap(), payload);
    }
}
