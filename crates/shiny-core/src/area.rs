use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::entity::{
    AreaMeta, DbId, EntityId, EntityKind, Exit, Item, ItemType, Npc, NpcEvent, Occupant, Room,
    Script, SpawnKind, SpawnPoint,
};
use crate::error::{CoreError, CoreResult};
use crate::store::{Row, Store};

/// Largest number of instances a single spawn point may place per reset.
pub const MAX_SPAWN_QUANTITY: u32 = 1_000;

/// Entities of one kind in creation order, indexed by area-scoped id.
#[derive(Debug, Clone)]
struct Catalog<T> {
    entries: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Catalog<T> {
    fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).and_then(|&i| self.entries.get(i))
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.index.get(&id).and_then(|&i| self.entries.get_mut(i))
    }

    fn push(&mut self, id: EntityId, value: T) -> &T {
        let i = self.entries.len();
        self.index.insert(id, i);
        self.entries.push(value);
        &self.entries[i]
    }

    fn as_slice(&self) -> &[T] {
        &self.entries
    }
}

fn unresolved(area: &str, kind: EntityKind, id: EntityId) -> CoreError {
    CoreError::InvalidReference {
        area: area.to_string(),
        kind,
        id,
    }
}

/// Serialize an entity into a storage row tagged with its owning area.
fn encode_row<T: Serialize>(kind: EntityKind, area: &str, value: &T) -> CoreResult<Row> {
    let value = serde_json::to_value(value).map_err(|source| CoreError::Encode { kind, source })?;
    let mut row = match value {
        Value::Object(map) => map,
        other => {
            let mut map = Row::new();
            map.insert("value".into(), other);
            map
        }
    };
    row.insert("area".into(), Value::String(area.to_string()));
    Ok(row)
}

/// A named collection of scripts, items, npcs, and rooms.
///
/// Every constructor persists one row through the given [`Store`] before the
/// entity becomes visible in the area, so everything the store holds for an
/// area is reachable from it and [`Area::destroy`] can remove it all.
#[derive(Debug, Clone)]
pub struct Area {
    meta: AreaMeta,
    dbid: DbId,
    scripts: Catalog<Script>,
    items: Catalog<Item>,
    npcs: Catalog<Npc>,
    rooms: Catalog<Room>,
    resets: u32,
}

impl Area {
    /// Create an empty area shell and persist its row.
    pub fn create(meta: AreaMeta, store: &mut dyn Store) -> CoreResult<Self> {
        let name = meta.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("area name must not be empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(CoreError::Validation(format!(
                "area name \"{name}\" must not contain path separators"
            )));
        }

        let row = encode_row(EntityKind::Area, &meta.name, &meta)?;
        let dbid = store.insert(EntityKind::Area, row)?;
        debug!(area = %meta.name, %dbid, "created area shell");
        Ok(Self {
            meta,
            dbid,
            scripts: Catalog::default(),
            items: Catalog::default(),
            npcs: Catalog::default(),
            rooms: Catalog::default(),
            resets: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The area's unique name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Display title, falling back to the name when empty.
    pub fn title(&self) -> &str {
        if self.meta.title.is_empty() {
            &self.meta.name
        } else {
            &self.meta.title
        }
    }

    /// All top-level area fields.
    pub fn meta(&self) -> &AreaMeta {
        &self.meta
    }

    /// Storage row id of the area itself.
    pub fn dbid(&self) -> DbId {
        self.dbid
    }

    /// Number of resets performed since the area was built.
    pub fn reset_count(&self) -> u32 {
        self.resets
    }

    /// Scripts in creation order.
    pub fn scripts(&self) -> &[Script] {
        self.scripts.as_slice()
    }

    /// Items in creation order.
    pub fn items(&self) -> &[Item] {
        self.items.as_slice()
    }

    /// Npcs in creation order.
    pub fn npcs(&self) -> &[Npc] {
        self.npcs.as_slice()
    }

    /// Rooms in creation order.
    pub fn rooms(&self) -> &[Room] {
        self.rooms.as_slice()
    }

    /// Look up a script by id.
    pub fn script(&self, id: EntityId) -> Option<&Script> {
        self.scripts.get(id)
    }

    /// Look up an item by id.
    pub fn item(&self, id: EntityId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Look up an npc by id.
    pub fn npc(&self, id: EntityId) -> Option<&Npc> {
        self.npcs.get(id)
    }

    /// Look up a room by id.
    pub fn room(&self, id: EntityId) -> Option<&Room> {
        self.rooms.get(id)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    fn duplicate(&self, kind: EntityKind, id: EntityId) -> CoreError {
        CoreError::DuplicateId {
            area: self.meta.name.clone(),
            kind,
            id,
        }
    }

    fn missing(&self, kind: EntityKind, id: EntityId) -> CoreError {
        unresolved(&self.meta.name, kind, id)
    }

    /// Add a script to the area.
    pub fn new_script(
        &mut self,
        store: &mut dyn Store,
        mut script: Script,
    ) -> CoreResult<&Script> {
        if self.scripts.contains(script.id) {
            return Err(self.duplicate(EntityKind::Script, script.id));
        }
        let row = encode_row(EntityKind::Script, &self.meta.name, &script)?;
        script.dbid = Some(store.insert(EntityKind::Script, row)?);
        Ok(self.scripts.push(script.id, script))
    }

    /// Add an item prototype to the area. Facets are attached separately
    /// with [`Area::add_item_type`].
    pub fn new_item(&mut self, store: &mut dyn Store, mut item: Item) -> CoreResult<&Item> {
        if self.items.contains(item.id) {
            return Err(self.duplicate(EntityKind::Item, item.id));
        }
        item.item_types.clear();
        let row = encode_row(EntityKind::Item, &self.meta.name, &item)?;
        item.dbid = Some(store.insert(EntityKind::Item, row)?);
        Ok(self.items.push(item.id, item))
    }

    /// Attach a typed facet to an existing item. An item carries at most one
    /// facet per type name.
    pub fn add_item_type(
        &mut self,
        store: &mut dyn Store,
        item_id: EntityId,
        mut facet: ItemType,
    ) -> CoreResult<()> {
        let area = &self.meta.name;
        let Some(item) = self.items.get_mut(item_id) else {
            return Err(unresolved(area, EntityKind::Item, item_id));
        };
        if item.item_type(&facet.item_type).is_some() {
            return Err(CoreError::Validation(format!(
                "item {item_id} in area \"{area}\" already has a {} facet",
                facet.item_type
            )));
        }

        let mut row = encode_row(EntityKind::ItemType, area, &facet)?;
        row.insert("item".into(), json!(item_id));
        facet.dbid = Some(store.insert(EntityKind::ItemType, row)?);
        item.item_types.push(facet);
        Ok(())
    }

    /// Add an npc prototype to the area. Events are bound separately with
    /// [`Area::add_npc_event`].
    pub fn new_npc(&mut self, store: &mut dyn Store, mut npc: Npc) -> CoreResult<&Npc> {
        if self.npcs.contains(npc.id) {
            return Err(self.duplicate(EntityKind::Npc, npc.id));
        }
        npc.events.clear();
        let row = encode_row(EntityKind::Npc, &self.meta.name, &npc)?;
        npc.dbid = Some(store.insert(EntityKind::Npc, row)?);
        Ok(self.npcs.push(npc.id, npc))
    }

    /// Bind an event to an npc. The event's script must already exist.
    pub fn add_npc_event(
        &mut self,
        store: &mut dyn Store,
        npc_id: EntityId,
        mut event: NpcEvent,
    ) -> CoreResult<()> {
        if !self.scripts.contains(event.script) {
            return Err(self.missing(EntityKind::Script, event.script));
        }
        let area = &self.meta.name;
        let Some(npc) = self.npcs.get_mut(npc_id) else {
            return Err(unresolved(area, EntityKind::Npc, npc_id));
        };

        let mut row = encode_row(EntityKind::NpcEvent, area, &event)?;
        row.insert("prototype".into(), json!(npc_id));
        event.dbid = Some(store.insert(EntityKind::NpcEvent, row)?);
        npc.events.push(event);
        Ok(())
    }

    /// Add a room shell to the area. Exits are attached separately with
    /// [`Area::add_exit`] once every room they may point at exists.
    pub fn new_room(&mut self, store: &mut dyn Store, mut room: Room) -> CoreResult<&Room> {
        if self.rooms.contains(room.id) {
            return Err(self.duplicate(EntityKind::Room, room.id));
        }
        room.exits.clear();
        room.spawns.clear();
        room.contents.clear();
        let row = encode_row(EntityKind::Room, &self.meta.name, &room)?;
        room.dbid = Some(store.insert(EntityKind::Room, row)?);
        Ok(self.rooms.push(room.id, room))
    }

    /// Attach spawn points to an existing room. A quantity above
    /// [`MAX_SPAWN_QUANTITY`] is rejected.
    pub fn load_spawns(
        &mut self,
        store: &mut dyn Store,
        room_id: EntityId,
        spawns: Vec<SpawnPoint>,
    ) -> CoreResult<()> {
        let area = &self.meta.name;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Err(unresolved(area, EntityKind::Room, room_id));
        };

        for mut spawn in spawns {
            if room.spawns.iter().any(|s| s.id == spawn.id) {
                return Err(CoreError::DuplicateId {
                    area: area.clone(),
                    kind: EntityKind::Spawn,
                    id: spawn.id,
                });
            }
            if spawn.quantity > MAX_SPAWN_QUANTITY {
                return Err(CoreError::Validation(format!(
                    "spawn {} in room {room_id} has quantity {}, limit is {MAX_SPAWN_QUANTITY}",
                    spawn.id, spawn.quantity
                )));
            }
            let mut row = encode_row(EntityKind::Spawn, area, &spawn)?;
            row.insert("room".into(), json!(room_id));
            spawn.dbid = Some(store.insert(EntityKind::Spawn, row)?);
            room.spawns.push(spawn);
        }
        Ok(())
    }

    /// Attach an exit to an existing room.
    ///
    /// A destination inside this area must already exist. Destinations in
    /// other areas are the caller's to resolve against the world registry.
    pub fn add_exit(
        &mut self,
        store: &mut dyn Store,
        room_id: EntityId,
        mut exit: Exit,
    ) -> CoreResult<()> {
        if exit.to.area == self.meta.name && !self.rooms.contains(exit.to.room) {
            return Err(self.missing(EntityKind::Room, exit.to.room));
        }
        let area = &self.meta.name;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Err(unresolved(area, EntityKind::Room, room_id));
        };
        if room.exit(exit.direction).is_some() {
            return Err(CoreError::Validation(format!(
                "room {room_id} in area \"{area}\" already has an exit {}",
                exit.direction
            )));
        }

        let mut row = exit.fields.clone();
        row.insert("area".into(), json!(area));
        row.insert("room".into(), json!(room_id));
        row.insert("direction".into(), json!(exit.direction));
        row.insert("to_area".into(), json!(exit.to.area));
        row.insert("to_id".into(), json!(exit.to.room));
        exit.dbid = Some(store.insert(EntityKind::Exit, row)?);
        room.exits.push(exit);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Repopulate every room from its spawn points. Returns the number of
    /// instances placed.
    pub fn reset(&mut self) -> usize {
        let Self {
            meta,
            items,
            npcs,
            rooms,
            resets,
            ..
        } = self;

        let mut placed = 0;
        for room in rooms.entries.iter_mut() {
            room.contents.clear();
            for spawn in &room.spawns {
                let name = match spawn.spawn_type {
                    SpawnKind::Item => items.get(spawn.spawn_object_id).map(|i| i.name.clone()),
                    SpawnKind::Npc => npcs.get(spawn.spawn_object_id).map(|n| n.name.clone()),
                };
                let Some(name) = name else {
                    warn!(
                        area = %meta.name,
                        room = %room.id,
                        spawn = %spawn.id,
                        prototype = %spawn.spawn_object_id,
                        "spawn names a missing prototype, skipping"
                    );
                    continue;
                };
                for _ in 0..spawn.quantity {
                    room.contents.push(Occupant {
                        kind: spawn.spawn_type,
                        prototype: spawn.spawn_object_id,
                        name: name.clone(),
                    });
                    placed += 1;
                }
            }
        }
        *resets += 1;
        debug!(area = %meta.name, placed, "area reset");
        placed
    }

    /// Delete every row the area owns, then the area row itself.
    ///
    /// Runs to completion even if single deletes fail; failures are logged.
    /// Returns the number of rows removed.
    pub fn destroy(self, store: &mut dyn Store) -> usize {
        let name = self.meta.name.clone();
        let mut removed = 0;
        let mut drop_row = |kind: EntityKind, dbid: Option<DbId>| {
            let Some(dbid) = dbid else { return };
            match store.delete(kind, dbid) {
                Ok(true) => removed += 1,
                Ok(false) => debug!(area = %name, %kind, %dbid, "row already gone"),
                Err(e) => warn!(area = %name, %kind, %dbid, error = %e, "teardown delete failed"),
            }
        };

        let rooms = self.rooms.as_slice();
        for exit in rooms.iter().flat_map(|r| &r.exits) {
            drop_row(EntityKind::Exit, exit.dbid);
        }
        for room in rooms {
            drop_row(EntityKind::Room, room.dbid);
        }
        for spawn in rooms.iter().flat_map(|r| &r.spawns) {
            drop_row(EntityKind::Spawn, spawn.dbid);
        }
        let npcs = self.npcs.as_slice();
        for event in npcs.iter().flat_map(|n| &n.events) {
            drop_row(EntityKind::NpcEvent, event.dbid);
        }
        for npc in npcs {
            drop_row(EntityKind::Npc, npc.dbid);
        }
        let items = self.items.as_slice();
        for facet in items.iter().flat_map(|i| &i.item_types) {
            drop_row(EntityKind::ItemType, facet.dbid);
        }
        for item in items {
            drop_row(EntityKind::Item, item.dbid);
        }
        for script in self.scripts.as_slice() {
            drop_row(EntityKind::Script, script.dbid);
        }
        drop_row(EntityKind::Area, Some(self.dbid));

        info!(area = %self.meta.name, rows = removed, "area torn down");
        removed
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of scripts.
    pub fn script_count(&self) -> usize {
        self.scripts.entries.len()
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.entries.len()
    }

    /// Number of item facets across all items.
    pub fn item_type_count(&self) -> usize {
        self.items.entries.iter().map(|i| i.item_types.len()).sum()
    }

    /// Number of npcs.
    pub fn npc_count(&self) -> usize {
        self.npcs.entries.len()
    }

    /// Number of npc events across all npcs.
    pub fn npc_event_count(&self) -> usize {
        self.npcs.entries.iter().map(|n| n.events.len()).sum()
    }

    /// Number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.entries.len()
    }

    /// Number of exits across all rooms.
    pub fn exit_count(&self) -> usize {
        self.rooms.entries.iter().map(|r| r.exits.len()).sum()
    }

    /// Number of spawn points across all rooms.
    pub fn spawn_count(&self) -> usize {
        self.rooms.entries.iter().map(|r| r.spawns.len()).sum()
    }
}
