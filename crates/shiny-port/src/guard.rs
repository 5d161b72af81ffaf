//! All-or-nothing imports on top of a store with single-row operations.

use shiny_core::{Area, AreaMeta, CoreError, CoreResult, Store, World};
use tracing::info;

/// Tracks the area created by one import attempt.
///
/// Every entity the builder creates is owned by the tracked area, so undoing
/// the attempt is a single cascading [`Area::destroy`]. The area stays out of
/// the world registry until [`ImportGuard::commit`].
#[derive(Debug, Default)]
pub struct ImportGuard {
    area: Option<Area>,
}

impl ImportGuard {
    /// A guard with nothing tracked yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the area shell and start tracking it. A guard tracks exactly
    /// one area.
    pub fn begin(&mut self, meta: AreaMeta, store: &mut dyn Store) -> CoreResult<&mut Area> {
        if let Some(area) = &self.area {
            return Err(CoreError::Validation(format!(
                "import of area \"{}\" already in progress",
                area.name()
            )));
        }
        let area = Area::create(meta, store)?;
        Ok(self.area.insert(area))
    }

    /// The tracked area, if the shell was created.
    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    /// Delete everything created during the attempt. Returns the number of
    /// rows removed.
    pub fn rollback(self, store: &mut dyn Store) -> usize {
        match self.area {
            Some(area) => {
                let name = area.name().to_string();
                let removed = area.destroy(store);
                info!(area = %name, rows = removed, "import rolled back");
                removed
            }
            None => 0,
        }
    }

    /// Publish the fully built area to the world.
    pub fn commit(self, world: &mut World) -> CoreResult<()> {
        let Some(area) = self.area else {
            return Err(CoreError::Validation("no area to commit".into()));
        };
        world.register_area(area)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use shiny_core::{EntityKind, Room};

    use super::*;

    #[test]
    fn rollback_removes_everything_created() {
        let mut world = World::in_memory();
        let mut guard = ImportGuard::new();
        {
            let area = guard
                .begin(AreaMeta::new("haven"), world.store_mut())
                .unwrap();
            area.new_room(world.store_mut(), Room::new(1, "Gate")).unwrap();
        }
        assert_eq!(guard.rollback(world.store_mut()), 2);
        assert!(world.store().select(EntityKind::Area, "area", &json!("haven")).is_empty());
        assert!(world.get_area("haven").is_none());
    }

    #[test]
    fn rollback_without_shell_is_a_no_op() {
        let mut world = World::in_memory();
        assert_eq!(ImportGuard::new().rollback(world.store_mut()), 0);
    }

    #[test]
    fn begin_twice_is_rejected() {
        let mut world = World::in_memory();
        let mut guard = ImportGuard::new();
        guard.begin(AreaMeta::new("haven"), world.store_mut()).unwrap();
        assert!(guard.begin(AreaMeta::new("other"), world.store_mut()).is_err());
        assert_eq!(guard.area().unwrap().name(), "haven");
    }

    #[test]
    fn commit_registers_area() {
        let mut world = World::in_memory();
        let mut guard = ImportGuard::new();
        guard.begin(AreaMeta::new("haven"), world.store_mut()).unwrap();
        guard.commit(&mut world).unwrap();
        assert!(world.get_area("haven").is_some());
        assert!(ImportGuard::new().commit(&mut world).is_err());
    }
}
