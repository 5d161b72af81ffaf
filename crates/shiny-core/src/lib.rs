//! Core types for the ShinyMUD area port: areas and their owned entities.
//!
//! An [`Area`] owns scripts, items, npcs, and rooms; items own their typed
//! facets, npcs their events, rooms their exits and spawn points. Every entity
//! is persisted through a [`Store`] as it is created, and the [`World`]
//! registry only exposes areas that were built completely.

/// The area aggregate and its construction and teardown operations.
pub mod area;
/// Entity types, identifiers, and field maps.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The single-row storage interface and its in-memory implementation.
pub mod store;
/// The registry of live areas.
pub mod world;

/// Re-export the area aggregate.
pub use area::{Area, MAX_SPAWN_QUANTITY};
/// Re-export entity types.
pub use entity::{
    AreaMeta, DbId, Direction, EntityId, EntityKind, Exit, Fields, Item, ItemType, Npc, NpcEvent,
    Occupant, Room, RoomRef, Script, SpawnKind, SpawnPoint,
};
/// Re-export error types.
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
/// Re-export storage types.
pub use store::{MemoryStore, Row, Store};
/// Re-export the world registry.
pub use world::{Registry, World};
