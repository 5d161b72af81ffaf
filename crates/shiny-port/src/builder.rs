//! Import path: rebuild a live area graph from a decoded payload.

use shiny_core::{AreaMeta, CoreError, CoreResult, EntityKind, Exit, Registry, RoomRef, Store};
use tracing::{debug, info};

use crate::guard::ImportGuard;
use crate::payload::{AreaPayload, ExitRecord};

/// Recreates an area from an [`AreaPayload`] in dependency order:
/// area shell, scripts, items, item facets, npcs, npc events, rooms with
/// their spawns, then exits. The area is reset once everything is attached.
///
/// Cross-area exit destinations are resolved against `registry`, which only
/// holds areas that finished importing.
pub struct GraphBuilder<'a> {
    registry: &'a Registry,
    store: &'a mut dyn Store,
}

impl<'a> GraphBuilder<'a> {
    /// Build on top of the given registry and store.
    pub fn new(registry: &'a Registry, store: &'a mut dyn Store) -> Self {
        Self { registry, store }
    }

    /// Rebuild `payload` as the area `name`.
    ///
    /// Everything created is tracked by `guard`. On error the caller is
    /// expected to roll the guard back.
    pub fn build(
        self,
        name: &str,
        payload: AreaPayload,
        guard: &mut ImportGuard,
    ) -> CoreResult<()> {
        let Self { registry, store } = self;
        let AreaPayload {
            area: meta,
            scripts,
            items,
            item_types,
            npcs,
            npc_events,
            rooms,
            room_exits,
            mut room_spawns,
            ..
        } = payload;

        let source_name = meta.name.clone();
        let meta = AreaMeta {
            name: name.to_string(),
            ..meta
        };
        let area = guard.begin(meta, store)?;
        debug!(area = name, from = %source_name, "created area shell");

        for script in scripts {
            area.new_script(store, script)?;
        }
        debug!(area = name, count = area.script_count(), "finished scripts");

        for item in items {
            area.new_item(store, item)?;
        }
        for record in item_types {
            area.add_item_type(store, record.item, record.facet)?;
        }
        debug!(
            area = name,
            items = area.item_count(),
            item_types = area.item_type_count(),
            "finished items"
        );

        for npc in npcs {
            area.new_npc(store, npc)?;
        }
        for record in npc_events {
            area.add_npc_event(store, record.prototype, record.event)?;
        }
        debug!(
            area = name,
            npcs = area.npc_count(),
            events = area.npc_event_count(),
            "finished npcs"
        );

        for room in rooms {
            let id = room.id;
            area.new_room(store, room)?;
            if let Some(spawns) = room_spawns.remove(&id) {
                area.load_spawns(store, id, spawns)?;
            }
        }
        if let Some(&orphan) = room_spawns.keys().next() {
            return Err(CoreError::InvalidReference {
                area: name.to_string(),
                kind: EntityKind::Room,
                id: orphan,
            });
        }
        debug!(
            area = name,
            rooms = area.room_count(),
            spawns = area.spawn_count(),
            "finished rooms"
        );

        for record in room_exits {
            let to = destination(registry, name, &source_name, &record)?;
            let mut exit = Exit::new(record.direction, to);
            exit.fields = record.fields;
            area.add_exit(store, record.room, exit)?;
        }
        debug!(area = name, count = area.exit_count(), "finished exits");

        let placed = area.reset();
        info!(area = name, placed, "area built");
        Ok(())
    }
}

/// Work out where an exit leads.
///
/// Exits into the area as it was named in the file, or with no area at all,
/// stay inside the area being built. Anything else must name a room in an
/// area that is already registered.
fn destination(
    registry: &Registry,
    name: &str,
    source_name: &str,
    record: &ExitRecord,
) -> CoreResult<RoomRef> {
    let to_area = record.to_area.as_str();
    if to_area.is_empty() || to_area == name || to_area == source_name {
        return Ok(RoomRef::new(name, record.to_id));
    }
    let Some(other) = registry.get(to_area) else {
        return Err(CoreError::AreaNotFound(to_area.to_string()));
    };
    if other.room(record.to_id).is_none() {
        return Err(CoreError::InvalidReference {
            area: to_area.to_string(),
            kind: EntityKind::Room,
            id: record.to_id,
        });
    }
    Ok(RoomRef::new(to_area, record.to_id))
}

#[cfg(test)]
mod tests {
    use shiny_core::{Direction, EntityId, Fields, MemoryStore, Room, World};

    use super::*;

    const HAVEN: &str = r#"
[Area]
{"name": "haven", "title": "Haven"}
[End Area]
[Scripts]
[{"id": 1, "name": "welcome", "body": "say Welcome!"}]
[End Scripts]
[Items]
[{"id": 1, "name": "sword"}]
[End Items]
[Item Types]
[{"item": 1, "item_type": "equippable", "equip_slot": "main hand"}]
[End Item Types]
[Npcs]
[{"id": 1, "name": "guard"}]
[End Npcs]
[Npc Events]
[{"prototype": 1, "script": 1, "event_trigger": "pc_enter"}]
[End Npc Events]
[Rooms]
[{"id": 1, "name": "Gate"}, {"id": 2, "name": "Square"}]
[End Rooms]
[Room Exits]
[{"room": 1, "direction": "north", "to_id": 2, "to_area": "haven", "to_room": null}]
[End Room Exits]
[Room Spawns]
{"2": [{"id": 1, "spawn_type": "npc", "spawn_object_id": 1, "quantity": 2}]}
[End Room Spawns]
"#;

    fn payload() -> AreaPayload {
        AreaPayload::decode(HAVEN).unwrap()
    }

    fn exit_to(area: &str, room: u32) -> ExitRecord {
        ExitRecord {
            room: EntityId(1),
            direction: Direction::East,
            to_id: EntityId(room),
            to_area: area.into(),
            to_room: None,
            fields: Fields::new(),
        }
    }

    #[test]
    fn builds_complete_graph_and_resets() {
        let mut store = MemoryStore::new();
        let registry = Registry::default();
        let mut guard = ImportGuard::new();
        GraphBuilder::new(&registry, &mut store)
            .build("haven", payload(), &mut guard)
            .unwrap();

        let area = guard.area().unwrap();
        assert_eq!(area.item_type_count(), 1);
        assert_eq!(area.npc_event_count(), 1);
        assert_eq!(area.exit_count(), 1);
        assert_eq!(area.spawn_count(), 1);
        assert_eq!(area.reset_count(), 1);
        assert_eq!(area.room(EntityId(2)).unwrap().contents().len(), 2);
        assert_eq!(store.total_rows(), 10);
    }

    #[test]
    fn rename_rebinds_internal_exits() {
        let mut store = MemoryStore::new();
        let registry = Registry::default();
        let mut guard = ImportGuard::new();
        GraphBuilder::new(&registry, &mut store)
            .build("haven2", payload(), &mut guard)
            .unwrap();

        let area = guard.area().unwrap();
        assert_eq!(area.name(), "haven2");
        assert_eq!(area.title(), "Haven");
        let gate = area.room(EntityId(1)).unwrap();
        assert_eq!(
            gate.exit(Direction::North).unwrap().to,
            RoomRef::new("haven2", 2)
        );
    }

    #[test]
    fn bad_script_reference_fails_build() {
        let mut payload = payload();
        payload.npc_events[0].event.script = EntityId(9);
        let mut store = MemoryStore::new();
        let registry = Registry::default();
        let mut guard = ImportGuard::new();
        let err = GraphBuilder::new(&registry, &mut store)
            .build("haven", payload, &mut guard)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference {
                kind: EntityKind::Script,
                ..
            }
        ));

        assert!(store.total_rows() > 0);
        guard.rollback(&mut store);
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn spawns_for_unknown_room_fail_build() {
        let mut payload = payload();
        let spawns = payload.room_spawns.remove(&EntityId(2)).unwrap();
        payload.room_spawns.insert(EntityId(7), spawns);
        let mut store = MemoryStore::new();
        let registry = Registry::default();
        let mut guard = ImportGuard::new();
        let err = GraphBuilder::new(&registry, &mut store)
            .build("haven", payload, &mut guard)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidReference {
                kind: EntityKind::Room,
                id: EntityId(7),
                ..
            }
        ));
    }

    #[test]
    fn cross_area_destinations_resolve_against_registry() {
        let mut world = World::in_memory();
        let mut dunmoor =
            shiny_core::Area::create(AreaMeta::new("dunmoor"), world.store_mut()).unwrap();
        dunmoor
            .new_room(world.store_mut(), Room::new(5, "Bridge"))
            .unwrap();
        world.register_area(dunmoor).unwrap();

        let registry = world.registry();
        assert_eq!(
            destination(registry, "haven", "haven", &exit_to("dunmoor", 5)).unwrap(),
            RoomRef::new("dunmoor", 5)
        );
        assert!(matches!(
            destination(registry, "haven", "haven", &exit_to("dunmoor", 6)),
            Err(CoreError::InvalidReference { .. })
        ));
        assert!(matches!(
            destination(registry, "haven", "haven", &exit_to("nowhere", 1)),
            Err(CoreError::AreaNotFound(_))
        ));
        assert_eq!(
            destination(registry, "haven2", "haven", &exit_to("", 3)).unwrap(),
            RoomRef::new("haven2", 3)
        );
    }
}
