//! Export path: flatten a live area into an [`AreaPayload`].

use shiny_core::Area;

use crate::error::FormatResult;
use crate::payload::{AreaPayload, ExitRecord, ItemTypeRecord, NpcEventRecord, RoomSpawns};

/// Walk an area's owned collections in creation order and collect them into
/// per-section payloads.
///
/// Storage ids are not carried over, and relationships become external ids:
/// the owning item / npc / room id, the script id of each event, and the
/// `(to_area, to_id)` pair of each exit. Scripts come from `area` only.
pub fn snapshot(area: &Area) -> AreaPayload {
    let mut item_types = Vec::new();
    for item in area.items() {
        item_types.extend(item.item_types().iter().map(|facet| ItemTypeRecord {
            item: item.id,
            facet: facet.clone(),
        }));
    }

    let mut npc_events = Vec::new();
    for npc in area.npcs() {
        npc_events.extend(npc.events().iter().map(|event| NpcEventRecord {
            prototype: npc.id,
            event: event.clone(),
        }));
    }

    let mut room_exits = Vec::new();
    let mut room_spawns = RoomSpawns::new();
    for room in area.rooms() {
        room_exits.extend(room.exits().iter().map(|exit| ExitRecord {
            room: room.id,
            direction: exit.direction,
            to_id: exit.to.room,
            to_area: exit.to.area.clone(),
            to_room: None,
            fields: exit.fields.clone(),
        }));
        room_spawns.insert(room.id, room.spawns().to_vec());
    }

    AreaPayload {
        version: None,
        area: area.meta().clone(),
        scripts: area.scripts().to_vec(),
        items: area.items().to_vec(),
        item_types,
        npcs: area.npcs().to_vec(),
        npc_events,
        rooms: area.rooms().to_vec(),
        room_exits,
        room_spawns,
    }
}

/// Render an area as a complete ShinyAreaFormat file.
pub fn serialize_area(area: &Area) -> FormatResult<String> {
    snapshot(area).encode()
}
