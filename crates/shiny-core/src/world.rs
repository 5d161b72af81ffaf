use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::area::Area;
use crate::entity::{EntityId, Room, RoomRef};
use crate::error::{CoreError, CoreResult};
use crate::store::{MemoryStore, Store};

/// Read view over the registered areas, keyed by name.
#[derive(Debug, Default)]
pub struct Registry {
    areas: BTreeMap<String, Area>,
}

impl Registry {
    /// Find an area by name.
    pub fn get(&self, name: &str) -> Option<&Area> {
        self.areas.get(name)
    }

    /// Whether an area with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.areas.contains_key(name)
    }

    /// Resolve a room reference against the registered areas.
    pub fn resolve_room(&self, to: &RoomRef) -> Option<&Room> {
        self.get(&to.area).and_then(|area| area.room(to.room))
    }

    /// Names of all registered areas, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }

    /// All registered areas, sorted by name.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    /// Number of registered areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether no area is registered.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// The running world: every registered area plus the store backing them.
///
/// Areas only become visible here once they are fully built; a half-built
/// area lives outside the registry until [`World::register_area`].
pub struct World {
    registry: Registry,
    store: Box<dyn Store>,
}

impl World {
    /// Create an empty world on top of the given store.
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            registry: Registry::default(),
            store: Box::new(store),
        }
    }

    /// Create an empty world backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    // -----------------------------------------------------------------------
    // Area registry
    // -----------------------------------------------------------------------

    /// Find an area by name.
    pub fn get_area(&self, name: &str) -> Option<&Area> {
        self.registry.get(name)
    }

    /// Read view over all registered areas.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Make a fully built area visible.
    ///
    /// If the name is already taken the new area is torn down, since an
    /// unregistered area must not linger in the store.
    pub fn register_area(&mut self, area: Area) -> CoreResult<()> {
        let name = area.name().to_string();
        if self.registry.contains(&name) {
            warn!(area = %name, "area already registered, discarding the new copy");
            area.destroy(self.store.as_mut());
            return Err(CoreError::DuplicateArea(name));
        }
        info!(area = %name, rooms = area.room_count(), "area registered");
        self.registry.areas.insert(name, area);
        Ok(())
    }

    /// Remove an area from the world and delete everything it owns.
    pub fn destroy_area(&mut self, name: &str, reason: &str) -> CoreResult<()> {
        let area = self
            .registry
            .areas
            .remove(name)
            .ok_or_else(|| CoreError::AreaNotFound(name.to_string()))?;
        info!(area = %name, reason, "destroying area");
        area.destroy(self.store.as_mut());
        Ok(())
    }

    /// Resolve a room in any registered area.
    pub fn room(&self, area: &str, room: EntityId) -> Option<&Room> {
        self.registry.resolve_room(&RoomRef::new(area, room))
    }

    // -----------------------------------------------------------------------
    // Store access
    // -----------------------------------------------------------------------

    /// The backing store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// The backing store, mutably.
    pub fn store_mut(&mut self) -> &mut dyn Store {
        self.store.as_mut()
    }

    /// Borrow the registry for lookups while writing to the store.
    pub fn parts_mut(&mut self) -> (&Registry, &mut dyn Store) {
        (&self.registry, self.store.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::entity::{AreaMeta, EntityKind};

    fn area(world: &mut World, name: &str) -> Area {
        let mut area = Area::create(AreaMeta::new(name), world.store_mut()).unwrap();
        area.new_room(world.store_mut(), Room::new(1, "Gate")).unwrap();
        area
    }

    #[test]
    fn register_and_find() {
        let mut world = World::in_memory();
        let haven = area(&mut world, "haven");
        world.register_area(haven).unwrap();

        assert!(world.get_area("haven").is_some());
        assert!(world.get_area("dunmoor").is_none());
        assert_eq!(world.room("haven", EntityId(1)).unwrap().name, "Gate");
        assert_eq!(world.registry().names().collect::<Vec<_>>(), ["haven"]);
    }

    #[test]
    fn duplicate_registration_discards_new_copy() {
        let mut world = World::in_memory();
        let first = area(&mut world, "haven");
        world.register_area(first).unwrap();
        let second = area(&mut world, "haven");
        let err = world.register_area(second).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateArea(_)));

        let rooms = world
            .store()
            .select(EntityKind::Room, "area", &json!("haven"));
        assert_eq!(rooms.len(), 1);
    }

    #[test]
    fn destroy_area_clears_registry_and_store() {
        let mut world = World::in_memory();
        let haven = area(&mut world, "haven");
        world.register_area(haven).unwrap();

        world.destroy_area("haven", "test").unwrap();
        assert!(world.get_area("haven").is_none());
        for kind in EntityKind::ALL {
            assert!(world.store().select(kind, "area", &json!("haven")).is_empty());
        }
        assert!(world.destroy_area("haven", "test").is_err());
    }
}
