use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Free-form field mapping carried alongside an entity's known fields.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Identifier of an entity, unique only within its owning area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Area files written by older servers store ids as strings, and JSON
        // object keys are always strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u32),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(Self(n)),
            RawId::Text(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid entity id: \"{s}\""))),
        }
    }
}

/// Storage row identifier. Meaningless outside the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbId(pub i64);

impl fmt::Display for DbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a persisted entity. Each kind maps to one storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// The area row itself.
    Area,
    /// A reusable script.
    Script,
    /// A build item prototype.
    Item,
    /// A typed facet attached to an item.
    ItemType,
    /// An npc prototype.
    Npc,
    /// A script binding on an npc.
    NpcEvent,
    /// A room.
    Room,
    /// A directional exit out of a room.
    Exit,
    /// A spawn point inside a room.
    Spawn,
}

impl EntityKind {
    /// Every kind, in the order their tables are created.
    pub const ALL: [EntityKind; 9] = [
        Self::Area,
        Self::Script,
        Self::Item,
        Self::ItemType,
        Self::Npc,
        Self::NpcEvent,
        Self::Room,
        Self::Exit,
        Self::Spawn,
    ];

    /// Name of the storage table holding rows of this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Script => "script",
            Self::Item => "build_item",
            Self::ItemType => "item_type",
            Self::Npc => "npc",
            Self::NpcEvent => "npc_event",
            Self::Room => "room",
            Self::Exit => "room_exit",
            Self::Spawn => "room_spawns",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Area => "area",
            Self::Script => "script",
            Self::Item => "item",
            Self::ItemType => "item type",
            Self::Npc => "npc",
            Self::NpcEvent => "npc event",
            Self::Room => "room",
            Self::Exit => "exit",
            Self::Spawn => "spawn",
        };
        f.write_str(name)
    }
}

/// Compass direction of a room exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// North.
    North,
    /// South.
    South,
    /// East.
    East,
    /// West.
    West,
    /// Up.
    Up,
    /// Down.
    Down,
}

impl Direction {
    /// Returns the direction leading back the way one came.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Lowercase name as written in area files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            "east" | "e" => Ok(Self::East),
            "west" | "w" => Ok(Self::West),
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            other => Err(format!("unknown direction: \"{other}\"")),
        }
    }
}

/// Top-level fields of an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaMeta {
    /// Unique, human-chosen area name.
    #[serde(default)]
    pub name: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Suggested player level range, e.g. `"1-5"`.
    #[serde(default)]
    pub level_range: String,
    /// Comma-separated builder names.
    #[serde(default)]
    pub builders: String,
    /// Any other field carried by the area.
    #[serde(flatten)]
    pub extra: Fields,
}

impl AreaMeta {
    /// Creates metadata with the given name and empty fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
            level_range: String::new(),
            builders: String::new(),
            extra: Fields::new(),
        }
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// A reusable behavior unit owned by an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Area-scoped id.
    pub id: EntityId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Script source.
    #[serde(default)]
    pub body: String,
    /// Any other field carried by the script.
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl Script {
    /// Creates a script with the given id, name, and body.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: body.into(),
            extra: Fields::new(),
            dbid: None,
        }
    }

    /// Storage row id, once persisted.
    pub fn dbid(&self) -> Option<DbId> {
        self.dbid
    }
}

/// A typed facet that augments an item with type-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemType {
    /// Facet type name, e.g. `"equippable"` or `"food"`.
    pub item_type: String,
    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl ItemType {
    /// Creates an empty facet of the given type.
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            fields: Fields::new(),
            dbid: None,
        }
    }

    /// Sets a type-specific field.
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// An item prototype owned by an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Area-scoped id.
    pub id: EntityId,
    /// Short name.
    #[serde(default)]
    pub name: String,
    /// Title shown when the item lies in a room.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Comma-separated keywords.
    #[serde(default)]
    pub keywords: String,
    /// Any other field carried by the item.
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(skip)]
    pub(crate) item_types: Vec<ItemType>,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl Item {
    /// Creates an item with the given id and name.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            extra: Fields::new(),
            item_types: Vec::new(),
            dbid: None,
        }
    }

    /// Facets attached to this item, in attachment order.
    pub fn item_types(&self) -> &[ItemType] {
        &self.item_types
    }

    /// Look up a facet by type name.
    pub fn item_type(&self, name: &str) -> Option<&ItemType> {
        self.item_types.iter().find(|t| t.item_type == name)
    }

    /// Storage row id, once persisted.
    pub fn dbid(&self) -> Option<DbId> {
        self.dbid
    }
}

/// A script binding on an npc, fired by one trigger kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcEvent {
    /// Trigger kind, e.g. `"pc_enter"` or `"hears"`.
    pub event_trigger: String,
    /// Id of the script run when the event fires.
    pub script: EntityId,
    /// Trigger-specific fields (condition, probability, ...).
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl NpcEvent {
    /// Creates an event bound to a script.
    pub fn new(event_trigger: impl Into<String>, script: impl Into<EntityId>) -> Self {
        Self {
            event_trigger: event_trigger.into(),
            script: script.into(),
            fields: Fields::new(),
            dbid: None,
        }
    }
}

/// An npc prototype owned by an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    /// Area-scoped id.
    pub id: EntityId,
    /// Short name.
    #[serde(default)]
    pub name: String,
    /// Title shown when the npc stands in a room.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Comma-separated keywords.
    #[serde(default)]
    pub keywords: String,
    /// Any other field carried by the npc.
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(skip)]
    pub(crate) events: Vec<NpcEvent>,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl Npc {
    /// Creates an npc with the given id and name.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            extra: Fields::new(),
            events: Vec::new(),
            dbid: None,
        }
    }

    /// Events bound to this npc, in attachment order.
    pub fn events(&self) -> &[NpcEvent] {
        &self.events
    }

    /// Events fired by the given trigger.
    pub fn events_for<'a>(&'a self, trigger: &'a str) -> impl Iterator<Item = &'a NpcEvent> + 'a {
        self.events.iter().filter(move |e| e.event_trigger == trigger)
    }

    /// Storage row id, once persisted.
    pub fn dbid(&self) -> Option<DbId> {
        self.dbid
    }
}

/// Reference to a room by area name and area-scoped id.
///
/// Exits may lead into other areas, so the destination is never a direct
/// link; it is resolved through the world registry when needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomRef {
    /// Name of the area owning the room.
    pub area: String,
    /// Id of the room within that area.
    pub room: EntityId,
}

impl RoomRef {
    /// Creates a room reference.
    pub fn new(area: impl Into<String>, room: impl Into<EntityId>) -> Self {
        Self {
            area: area.into(),
            room: room.into(),
        }
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.area, self.room)
    }
}

/// A directional exit out of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    /// Direction the exit leads.
    pub direction: Direction,
    /// Destination room.
    pub to: RoomRef,
    /// Door state and other exit fields.
    pub fields: Fields,
    pub(crate) dbid: Option<DbId>,
}

impl Exit {
    /// Creates an exit leading to `to`.
    pub fn new(direction: Direction, to: RoomRef) -> Self {
        Self {
            direction,
            to,
            fields: Fields::new(),
            dbid: None,
        }
    }
}

/// What a spawn point produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnKind {
    /// Spawns an item prototype.
    Item,
    /// Spawns an npc prototype.
    Npc,
}

fn one() -> u32 {
    1
}

/// A rule describing what repopulates a room on reset, and how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Room-scoped spawn id.
    pub id: EntityId,
    /// Whether an item or an npc is spawned.
    pub spawn_type: SpawnKind,
    /// Id of the prototype within the area.
    pub spawn_object_id: EntityId,
    /// Number of instances placed on each reset.
    #[serde(default = "one")]
    pub quantity: u32,
    /// Any other field carried by the spawn.
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl SpawnPoint {
    /// Creates a spawn point placing one instance of a prototype.
    pub fn new(
        id: impl Into<EntityId>,
        spawn_type: SpawnKind,
        object: impl Into<EntityId>,
    ) -> Self {
        Self {
            id: id.into(),
            spawn_type,
            spawn_object_id: object.into(),
            quantity: 1,
            fields: Fields::new(),
            dbid: None,
        }
    }
}

/// An instance placed in a room by a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    /// Item or npc.
    pub kind: SpawnKind,
    /// Prototype id within the area.
    pub prototype: EntityId,
    /// Prototype name at the time of the reset.
    pub name: String,
}

/// A room owned by an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Area-scoped id.
    pub id: EntityId,
    /// Room title.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Any other field carried by the room.
    #[serde(flatten)]
    pub extra: Fields,
    #[serde(skip)]
    pub(crate) exits: Vec<Exit>,
    #[serde(skip)]
    pub(crate) spawns: Vec<SpawnPoint>,
    #[serde(skip)]
    pub(crate) contents: Vec<Occupant>,
    #[serde(skip)]
    pub(crate) dbid: Option<DbId>,
}

impl Room {
    /// Creates a room with the given id and name.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            extra: Fields::new(),
            exits: Vec::new(),
            spawns: Vec::new(),
            contents: Vec::new(),
            dbid: None,
        }
    }

    /// Exits out of this room, in attachment order.
    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    /// The exit leading in `direction`, if any.
    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.exits.iter().find(|e| e.direction == direction)
    }

    /// Spawn points of this room.
    pub fn spawns(&self) -> &[SpawnPoint] {
        &self.spawns
    }

    /// Instances placed by the last reset.
    pub fn contents(&self) -> &[Occupant] {
        &self.contents
    }

    /// Storage row id, once persisted.
    pub fn dbid(&self) -> Option<DbId> {
        self.dbid
    }
}
