// Static game model for the Zelda 1 item randomizer: items, locations,
// enemy tables, and the requirement-annotated logic graph.

use anyhow::{bail, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

pub type Capacity = i16; // Data type used to represent item tiers and counters (hearts, triforce, etc.)
pub type RegionId = usize; // 0 = overworld, 1-9 = dungeon levels
pub type LocationId = usize;
pub type VertexId = usize;
pub type EnemyGroupId = u8; // ROM enemy-group code for a room

pub const OVERWORLD: RegionId = 0;
pub const LEVEL_NINE: RegionId = 9;
pub const NUM_REGIONS: usize = 10;

pub const STARTING_HEARTS: Capacity = 3;
pub const TRIFORCE_FRAGMENTS_REQUIRED: Capacity = 8;

// Item byte tables in the PRG ROM. Cave positions are indexed off the cave
// item/price tables; dungeon slots are indexed per level.
pub const CAVE_ITEM_TABLE: usize = 0x18600;
pub const CAVE_PRICE_TABLE: usize = 0x18680;
pub const DUNGEON_ITEM_TABLE: usize = 0x18700;
pub const ARMOS_ITEM_ADDR: usize = 0x10CF5;
pub const COAST_ITEM_ADDR: usize = 0x1788A;
pub const WHITE_SWORD_HEARTS_ADDR: usize = 0x48F4;
pub const MAGICAL_SWORD_HEARTS_ADDR: usize = 0x48FB;
pub const START_SCREEN_ADDR: usize = 0x19D0F;
pub const QUEST_VARIANT_ADDR: usize = 0x19D13;

pub const VANILLA_START_SCREEN: u8 = 0x77;

pub fn dungeon_item_addr(level: RegionId, slot: usize) -> usize {
    DUNGEON_ITEM_TABLE + level * 0x10 + slot
}

/// Item kinds. Tiered kinds (sword, candle, ring, arrow, boomerang) carry a
/// per-kind level in the inventory; duplicate pickups of a lower tier never
/// downgrade it.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString,
    VariantNames, Display,
)]
#[repr(usize)]
pub enum ItemKind {
    Sword,         // 0
    Candle,        // 1
    Ring,          // 2
    Arrow,         // 3
    Boomerang,     // 4
    Bow,           // 5
    Raft,          // 6
    Ladder,        // 7
    Recorder,      // 8
    Wand,          // 9
    Bracelet,      // 10
    Letter,        // 11
    Bait,          // 12
    Book,          // 13
    MagicalShield, // 14
    Key,           // 15
    MagicalKey,    // 16
    Bomb,          // 17
    HeartContainer,   // 18
    TriforceFragment, // 19
    Nothing,          // 20
}

pub const NUM_ITEM_KINDS: usize = 21;

impl ItemKind {
    pub fn max_tier(self) -> Capacity {
        match self {
            ItemKind::Sword => 3,
            ItemKind::Candle
            | ItemKind::Ring
            | ItemKind::Arrow
            | ItemKind::Boomerang => 2,
            _ => 1,
        }
    }
}

/// A concrete item as it appears in a placement slot. The five `*` variants
/// without a tier suffix (Sword, Candle, Ring, Arrow, Boomerang) are the
/// progressive copies substituted by the progressive-items flag: collecting
/// one raises the kind's level by one instead of setting an absolute tier.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString,
    VariantNames, Display,
)]
pub enum Item {
    WoodSword,
    WhiteSword,
    MagicalSword,
    Sword,
    BlueCandle,
    RedCandle,
    Candle,
    BlueRing,
    RedRing,
    Ring,
    WoodArrow,
    SilverArrow,
    Arrow,
    WoodBoomerang,
    MagicalBoomerang,
    Boomerang,
    Bow,
    Raft,
    Ladder,
    Recorder,
    Wand,
    Bracelet,
    Letter,
    Bait,
    Book,
    MagicalShield,
    Key,
    MagicalKey,
    Bomb,
    HeartContainer,
    TriforceFragment,
    Nothing,
}

impl Item {
    pub fn kind(self) -> ItemKind {
        match self {
            Item::WoodSword | Item::WhiteSword | Item::MagicalSword | Item::Sword => {
                ItemKind::Sword
            }
            Item::BlueCandle | Item::RedCandle | Item::Candle => ItemKind::Candle,
            Item::BlueRing | Item::RedRing | Item::Ring => ItemKind::Ring,
            Item::WoodArrow | Item::SilverArrow | Item::Arrow => ItemKind::Arrow,
            Item::WoodBoomerang | Item::MagicalBoomerang | Item::Boomerang => ItemKind::Boomerang,
            Item::Bow => ItemKind::Bow,
            Item::Raft => ItemKind::Raft,
            Item::Ladder => ItemKind::Ladder,
            Item::Recorder => ItemKind::Recorder,
            Item::Wand => ItemKind::Wand,
            Item::Bracelet => ItemKind::Bracelet,
            Item::Letter => ItemKind::Letter,
            Item::Bait => ItemKind::Bait,
            Item::Book => ItemKind::Book,
            Item::MagicalShield => ItemKind::MagicalShield,
            Item::Key => ItemKind::Key,
            Item::MagicalKey => ItemKind::MagicalKey,
            Item::Bomb => ItemKind::Bomb,
            Item::HeartContainer => ItemKind::HeartContainer,
            Item::TriforceFragment => ItemKind::TriforceFragment,
            Item::Nothing => ItemKind::Nothing,
        }
    }

    /// Absolute tier granted by this item, or None for a progressive copy
    /// (which grants current level + 1).
    pub fn tier(self) -> Option<Capacity> {
        match self {
            Item::Sword | Item::Candle | Item::Ring | Item::Arrow | Item::Boomerang => None,
            Item::WoodSword | Item::BlueCandle | Item::BlueRing | Item::WoodArrow
            | Item::WoodBoomerang => Some(1),
            Item::WhiteSword | Item::RedCandle | Item::RedRing | Item::SilverArrow
            | Item::MagicalBoomerang => Some(2),
            Item::MagicalSword => Some(3),
            _ => Some(1),
        }
    }

    /// The progressive stand-in for a tiered item, if its kind has one.
    pub fn progressive(self) -> Option<Item> {
        match self.kind() {
            ItemKind::Sword => Some(Item::Sword),
            ItemKind::Candle => Some(Item::Candle),
            ItemKind::Ring => Some(Item::Ring),
            ItemKind::Arrow => Some(Item::Arrow),
            ItemKind::Boomerang => Some(Item::Boomerang),
            _ => None,
        }
    }

    /// Item type code as stored in the ROM item tables. Progressive copies
    /// use their base-tier code; the pickup routine resolves the actual tier.
    pub fn rom_code(self) -> u8 {
        match self {
            Item::Bomb => 0x00,
            Item::WoodSword | Item::Sword => 0x01,
            Item::WhiteSword => 0x02,
            Item::MagicalSword => 0x03,
            Item::Bait => 0x04,
            Item::Recorder => 0x05,
            Item::BlueCandle | Item::Candle => 0x06,
            Item::RedCandle => 0x07,
            Item::WoodArrow | Item::Arrow => 0x08,
            Item::SilverArrow => 0x09,
            Item::Bow => 0x0A,
            Item::MagicalKey => 0x0B,
            Item::Raft => 0x0C,
            Item::Ladder => 0x0D,
            Item::Wand => 0x10,
            Item::Book => 0x11,
            Item::BlueRing | Item::Ring => 0x12,
            Item::RedRing => 0x13,
            Item::Bracelet => 0x14,
            Item::Letter => 0x15,
            Item::Nothing => 0x18, // single rupee
            Item::Key => 0x19,
            Item::HeartContainer => 0x1A,
            Item::TriforceFragment => 0x1B,
            Item::MagicalShield => 0x1C,
            Item::WoodBoomerang | Item::Boomerang => 0x1D,
            Item::MagicalBoomerang => 0x1E,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quest {
    First,
    Second,
}

/// How dungeon item rooms present their item: vanilla, all enemy-guarded
/// minor items converted to standing items, or standing items (outside
/// push-block rooms) converted to enemy drops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemRoomStyle {
    Vanilla,
    ExtraStanding,
    ExtraDrops,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, VariantNames,
    Display,
)]
pub enum Enemy {
    Keese,
    Stalfos,
    Goriya,
    BlueGoriya,
    Darknut,
    BlueDarknut,
    Wizzrobe,
    BlueWizzrobe,
    Gibdo,
    Lanmola,
    BlueLanmola,
    Dodongo,
    Aquamentus,
    Digdogger,
    Gohma,
    Gleeok,
    Manhandla,
    Patra,
    Ganon,
}

impl Enemy {
    /// The four enemy kinds whose rooms count as hard combat.
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Enemy::BlueDarknut | Enemy::BlueWizzrobe | Enemy::BlueLanmola | Enemy::Patra
        )
    }
}

// Direct enemy-group codes.
pub const EG_GORIYA: EnemyGroupId = 0x01;
pub const EG_BLUE_GORIYA: EnemyGroupId = 0x02;
pub const EG_STALFOS: EnemyGroupId = 0x03;
pub const EG_KEESE: EnemyGroupId = 0x04;
pub const EG_DARKNUT: EnemyGroupId = 0x05;
pub const EG_BLUE_DARKNUT: EnemyGroupId = 0x06;
pub const EG_WIZZROBE: EnemyGroupId = 0x07;
pub const EG_BLUE_WIZZROBE: EnemyGroupId = 0x08;
pub const EG_DODONGO: EnemyGroupId = 0x09;
pub const EG_AQUAMENTUS: EnemyGroupId = 0x0A;
pub const EG_DIGDOGGER: EnemyGroupId = 0x0B;
pub const EG_GOHMA: EnemyGroupId = 0x0C;
pub const EG_GLEEOK: EnemyGroupId = 0x0D;
pub const EG_MANHANDLA: EnemyGroupId = 0x0E;
pub const EG_PATRA: EnemyGroupId = 0x0F;
pub const EG_GANON: EnemyGroupId = 0x10;
// Mixed enemy-group codes (0x60+), resolved through the mixed-group table.
pub const EG_MIXED_BASIC: EnemyGroupId = 0x61;
pub const EG_MIXED_DARKNUT: EnemyGroupId = 0x62;
pub const EG_MIXED_WIZZROBE: EnemyGroupId = 0x63;
pub const EG_MIXED_LANMOLA: EnemyGroupId = 0x64;
pub const EG_MIXED_PATRA: EnemyGroupId = 0x65;

/// Which sword cave's heart threshold gates a connection. The numeric
/// threshold comes from the generation parameters, not the graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwordCave {
    White,
    Magical,
}

/// A boolean requirement over collected items, heart count, triforce count,
/// and room combat, attached to a logic-graph link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    Free,
    Never,
    /// Item level for the kind must be at least the given tier.
    Item(ItemKind, Capacity),
    Hearts(SwordCave),
    Triforce(Capacity),
    /// All enemies in the room must be killable (drop items, boss rooms).
    ClearRoom(EnemyGroupId),
    /// Passing through a room whose occupants may count as hard combat.
    HardCombat(EnemyGroupId),
    And(Vec<Requirement>),
    Or(Vec<Requirement>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    /// Standing item on a dungeon room floor.
    Floor,
    /// Dropped by the room's enemies; the room must be cleared first.
    Drop,
    /// One of up to three positions inside an overworld cave or shop.
    Cave { position: usize },
    Armos,
    Coast,
}

#[derive(Clone, Debug)]
pub struct Location {
    pub name: &'static str,
    pub region: RegionId,
    pub kind: LocationKind,
    pub vanilla_item: Item,
    /// Occupants of the containing room, if any. Required for Drop slots.
    pub enemy_group: Option<EnemyGroupId>,
    /// Non-combat requirement to reach the slot from its region's entrance.
    pub access: Requirement,
    /// ROM address of the slot's item byte.
    pub addr: usize,
    /// ROM address of the slot's price byte (cave positions only).
    pub price_addr: Option<usize>,
    pub vanilla_price: Option<u8>,
}

#[derive(Clone, Debug)]
pub struct Link {
    pub from_vertex_id: VertexId,
    pub to_vertex_id: VertexId,
    pub requirement: Requirement,
}

#[derive(Debug)]
pub struct GameData {
    pub quest: Quest,
    pub item_room_style: ItemRoomStyle,
    pub locations: Vec<Location>,
    pub links: Vec<Link>,
    pub enemy_groups: HashMap<EnemyGroupId, Vec<Enemy>>,
    pub num_vertices: usize,
}

struct LocationSpec {
    name: &'static str,
    region: RegionId,
    kind: LocationKind,
    vanilla_item: Item,
    enemy_group: Option<EnemyGroupId>,
    access: Requirement,
    addr: usize,
    price: Option<u8>,
}

fn cave(name: &'static str, position: usize, item: Item, index: usize, price: Option<u8>) -> LocationSpec {
    LocationSpec {
        name,
        region: OVERWORLD,
        kind: LocationKind::Cave { position },
        vanilla_item: item,
        enemy_group: None,
        access: Requirement::Free,
        addr: CAVE_ITEM_TABLE + index,
        price,
    }
}

fn floor(
    name: &'static str,
    level: RegionId,
    slot: usize,
    item: Item,
    group: EnemyGroupId,
    access: Requirement,
) -> LocationSpec {
    LocationSpec {
        name,
        region: level,
        kind: LocationKind::Floor,
        vanilla_item: item,
        enemy_group: Some(group),
        access,
        addr: dungeon_item_addr(level, slot),
        price: None,
    }
}

fn drop_item(
    name: &'static str,
    level: RegionId,
    slot: usize,
    item: Item,
    group: EnemyGroupId,
) -> LocationSpec {
    LocationSpec {
        name,
        region: level,
        kind: LocationKind::Drop,
        vanilla_item: item,
        enemy_group: Some(group),
        access: Requirement::Free,
        addr: dungeon_item_addr(level, slot),
        price: None,
    }
}

fn vanilla_locations() -> Vec<LocationSpec> {
    use Requirement::{And, Free, Hearts, Item as Req};
    vec![
        // Overworld caves:
        cave("Starting Sword Cave", 0, Item::WoodSword, 0, None),
        LocationSpec {
            access: Hearts(SwordCave::White),
            ..cave("White Sword Cave", 0, Item::WhiteSword, 1, None)
        },
        LocationSpec {
            access: Hearts(SwordCave::Magical),
            ..cave("Magical Sword Cave", 0, Item::MagicalSword, 2, None)
        },
        cave("Letter Cave", 0, Item::Letter, 3, None),
        LocationSpec {
            name: "Armos Item",
            region: OVERWORLD,
            kind: LocationKind::Armos,
            vanilla_item: Item::Bracelet,
            enemy_group: None,
            access: Free,
            addr: ARMOS_ITEM_ADDR,
            price: None,
        },
        LocationSpec {
            name: "Coast Item",
            region: OVERWORLD,
            kind: LocationKind::Coast,
            vanilla_item: Item::HeartContainer,
            enemy_group: None,
            access: Req(ItemKind::Ladder, 1),
            addr: COAST_ITEM_ADDR,
            price: None,
        },
        // Shops:
        cave("Shield Shop Left", 0, Item::MagicalShield, 4, Some(160)),
        cave("Shield Shop Middle", 1, Item::Key, 5, Some(100)),
        cave("Shield Shop Right", 2, Item::BlueCandle, 6, Some(60)),
        cave("Ring Shop Left", 0, Item::BlueRing, 7, Some(250)),
        cave("Ring Shop Middle", 1, Item::Bait, 8, Some(100)),
        cave("Ring Shop Right", 2, Item::WoodArrow, 9, Some(80)),
        // Level 1:
        floor("Level 1 Bow", 1, 0, Item::Bow, EG_STALFOS, Free),
        drop_item("Level 1 Boomerang", 1, 1, Item::WoodBoomerang, EG_GORIYA),
        drop_item("Level 1 Key", 1, 2, Item::Key, EG_STALFOS),
        floor(
            "Level 1 Triforce",
            1,
            3,
            Item::TriforceFragment,
            EG_AQUAMENTUS,
            Requirement::ClearRoom(EG_AQUAMENTUS),
        ),
        drop_item("Level 1 Heart Container", 1, 4, Item::HeartContainer, EG_AQUAMENTUS),
        // Level 2:
        drop_item("Level 2 Boomerang", 2, 0, Item::MagicalBoomerang, EG_BLUE_GORIYA),
        drop_item("Level 2 Bombs", 2, 1, Item::Bomb, EG_MIXED_BASIC),
        floor(
            "Level 2 Triforce",
            2,
            2,
            Item::TriforceFragment,
            EG_DODONGO,
            Requirement::ClearRoom(EG_DODONGO),
        ),
        drop_item("Level 2 Heart Container", 2, 3, Item::HeartContainer, EG_DODONGO),
        // Level 3:
        floor("Level 3 Raft", 3, 0, Item::Raft, EG_DARKNUT, Free),
        drop_item("Level 3 Key", 3, 1, Item::Key, EG_KEESE),
        floor(
            "Level 3 Triforce",
            3,
            2,
            Item::TriforceFragment,
            EG_MANHANDLA,
            Requirement::ClearRoom(EG_MANHANDLA),
        ),
        drop_item("Level 3 Heart Container", 3, 3, Item::HeartContainer, EG_MANHANDLA),
        // Level 4:
        floor("Level 4 Ladder", 4, 0, Item::Ladder, EG_MIXED_BASIC, Free),
        drop_item("Level 4 Key", 4, 1, Item::Key, EG_MIXED_BASIC),
        floor(
            "Level 4 Triforce",
            4,
            2,
            Item::TriforceFragment,
            EG_GLEEOK,
            Requirement::ClearRoom(EG_GLEEOK),
        ),
        drop_item("Level 4 Heart Container", 4, 3, Item::HeartContainer, EG_GLEEOK),
        // Level 5:
        drop_item("Level 5 Recorder", 5, 0, Item::Recorder, EG_MIXED_DARKNUT),
        drop_item("Level 5 Key", 5, 1, Item::Key, EG_KEESE),
        floor(
            "Level 5 Triforce",
            5,
            2,
            Item::TriforceFragment,
            EG_DIGDOGGER,
            Requirement::ClearRoom(EG_DIGDOGGER),
        ),
        drop_item("Level 5 Heart Container", 5, 3, Item::HeartContainer, EG_DIGDOGGER),
        // Level 6:
        drop_item("Level 6 Wand", 6, 0, Item::Wand, EG_BLUE_WIZZROBE),
        drop_item("Level 6 Key", 6, 1, Item::Key, EG_WIZZROBE),
        floor(
            "Level 6 Triforce",
            6,
            2,
            Item::TriforceFragment,
            EG_GOHMA,
            Requirement::ClearRoom(EG_GOHMA),
        ),
        drop_item("Level 6 Heart Container", 6, 3, Item::HeartContainer, EG_GOHMA),
        // Level 7:
        drop_item("Level 7 Red Candle", 7, 0, Item::RedCandle, EG_DIGDOGGER),
        drop_item("Level 7 Key", 7, 1, Item::Key, EG_GORIYA),
        floor(
            "Level 7 Triforce",
            7,
            2,
            Item::TriforceFragment,
            EG_AQUAMENTUS,
            Requirement::ClearRoom(EG_AQUAMENTUS),
        ),
        drop_item("Level 7 Heart Container", 7, 3, Item::HeartContainer, EG_AQUAMENTUS),
        // Level 8:
        floor(
            "Level 8 Magical Key",
            8,
            0,
            Item::MagicalKey,
            EG_MIXED_LANMOLA,
            Req(ItemKind::Ladder, 1),
        ),
        floor(
            "Level 8 Book",
            8,
            1,
            Item::Book,
            EG_GOHMA,
            Requirement::ClearRoom(EG_GOHMA),
        ),
        floor(
            "Level 8 Triforce",
            8,
            2,
            Item::TriforceFragment,
            EG_GLEEOK,
            And(vec![
                Requirement::HardCombat(EG_MIXED_WIZZROBE),
                Requirement::ClearRoom(EG_GLEEOK),
            ]),
        ),
        drop_item("Level 8 Heart Container", 8, 3, Item::HeartContainer, EG_GLEEOK),
        // Level 9:
        floor(
            "Level 9 Silver Arrow",
            9,
            0,
            Item::SilverArrow,
            EG_MIXED_WIZZROBE,
            And(vec![
                Req(ItemKind::Ladder, 1),
                Requirement::HardCombat(EG_MIXED_WIZZROBE),
            ]),
        ),
        floor(
            "Level 9 Red Ring",
            9,
            1,
            Item::RedRing,
            EG_MIXED_PATRA,
            Requirement::ClearRoom(EG_MIXED_PATRA),
        ),
    ]
}

fn enemy_group_table() -> HashMap<EnemyGroupId, Vec<Enemy>> {
    let mut groups: HashMap<EnemyGroupId, Vec<Enemy>> = HashMap::new();
    groups.insert(EG_GORIYA, vec![Enemy::Goriya]);
    groups.insert(EG_BLUE_GORIYA, vec![Enemy::BlueGoriya]);
    groups.insert(EG_STALFOS, vec![Enemy::Stalfos]);
    groups.insert(EG_KEESE, vec![Enemy::Keese]);
    groups.insert(EG_DARKNUT, vec![Enemy::Darknut]);
    groups.insert(EG_BLUE_DARKNUT, vec![Enemy::BlueDarknut]);
    groups.insert(EG_WIZZROBE, vec![Enemy::Wizzrobe]);
    groups.insert(EG_BLUE_WIZZROBE, vec![Enemy::BlueWizzrobe]);
    groups.insert(EG_DODONGO, vec![Enemy::Dodongo]);
    groups.insert(EG_AQUAMENTUS, vec![Enemy::Aquamentus]);
    groups.insert(EG_DIGDOGGER, vec![Enemy::Digdogger]);
    groups.insert(EG_GOHMA, vec![Enemy::Gohma]);
    groups.insert(EG_GLEEOK, vec![Enemy::Gleeok]);
    groups.insert(EG_MANHANDLA, vec![Enemy::Manhandla]);
    groups.insert(EG_PATRA, vec![Enemy::Patra]);
    groups.insert(EG_GANON, vec![Enemy::Ganon]);
    // Mixed groups: ROM codes resolving to multiple concrete enemy types.
    groups.insert(EG_MIXED_BASIC, vec![Enemy::Keese, Enemy::Stalfos, Enemy::Goriya]);
    groups.insert(EG_MIXED_DARKNUT, vec![Enemy::Keese, Enemy::Darknut, Enemy::BlueDarknut]);
    groups.insert(EG_MIXED_WIZZROBE, vec![Enemy::Wizzrobe, Enemy::BlueWizzrobe]);
    groups.insert(EG_MIXED_LANMOLA, vec![Enemy::Lanmola, Enemy::BlueLanmola]);
    groups.insert(EG_MIXED_PATRA, vec![Enemy::Patra, Enemy::Keese]);
    groups
}

/// Overworld-to-dungeon entrance requirements for the given quest layout.
/// In the second quest several dungeons hide under recorder spots.
fn entrance_requirement(level: RegionId, quest: Quest) -> Requirement {
    use Requirement::{And, Free, Item as Req, Triforce};
    let base = match level {
        4 => Req(ItemKind::Raft, 1),
        7 => Req(ItemKind::Recorder, 1),
        8 => Req(ItemKind::Candle, 1),
        9 => Triforce(TRIFORCE_FRAGMENTS_REQUIRED),
        _ => Free,
    };
    let recorder_hidden = quest == Quest::Second && matches!(level, 4 | 5 | 6 | 8);
    if recorder_hidden {
        And(vec![base, Req(ItemKind::Recorder, 1)])
    } else {
        base
    }
}

impl GameData {
    pub fn new(quest: Quest, item_room_style: ItemRoomStyle) -> GameData {
        let specs = vanilla_locations();
        let locations: Vec<Location> = specs
            .into_iter()
            .map(|s| Location {
                name: s.name,
                region: s.region,
                kind: s.kind,
                vanilla_item: s.vanilla_item,
                enemy_group: s.enemy_group,
                access: s.access,
                addr: s.addr,
                price_addr: s.price.map(|_| CAVE_PRICE_TABLE + (s.addr - CAVE_ITEM_TABLE)),
                vanilla_price: s.price,
            })
            .collect();

        let num_vertices = NUM_REGIONS + locations.len();
        let mut links: Vec<Link> = Vec::new();
        for level in 1..NUM_REGIONS {
            links.push(Link {
                from_vertex_id: OVERWORLD,
                to_vertex_id: level,
                requirement: entrance_requirement(level, quest),
            });
        }

        let mut game_data = GameData {
            quest,
            item_room_style,
            locations,
            links,
            enemy_groups: enemy_group_table(),
            num_vertices,
        };

        for loc_id in 0..game_data.locations.len() {
            let loc = &game_data.locations[loc_id];
            let mut reqs = vec![loc.access.clone()];
            if game_data.is_drop(loc_id) {
                // Drop slots are only granted once the room is cleared.
                let group = loc.enemy_group.expect("drop location without enemy group");
                reqs.push(Requirement::ClearRoom(group));
            }
            let requirement = if reqs.len() == 1 {
                reqs.pop().unwrap()
            } else {
                Requirement::And(reqs)
            };
            game_data.links.push(Link {
                from_vertex_id: loc.region,
                to_vertex_id: NUM_REGIONS + loc_id,
                requirement,
            });
        }

        game_data
    }

    pub fn start_vertex_id(&self) -> VertexId {
        OVERWORLD
    }

    pub fn location_vertex_id(&self, loc_id: LocationId) -> VertexId {
        NUM_REGIONS + loc_id
    }

    /// Whether the slot behaves as an enemy drop under the active item-room
    /// style. Triforce rooms are push-block rooms and never convert.
    pub fn is_drop(&self, loc_id: LocationId) -> bool {
        let loc = &self.locations[loc_id];
        match self.item_room_style {
            ItemRoomStyle::Vanilla => loc.kind == LocationKind::Drop,
            ItemRoomStyle::ExtraStanding => {
                loc.kind == LocationKind::Drop
                    && !matches!(loc.vanilla_item.kind(), ItemKind::Key | ItemKind::Bomb)
            }
            ItemRoomStyle::ExtraDrops => {
                loc.kind == LocationKind::Drop
                    || (loc.kind == LocationKind::Floor
                        && loc.vanilla_item != Item::TriforceFragment)
            }
        }
    }

    pub fn resolve_enemy_group(&self, group: EnemyGroupId) -> Result<&[Enemy]> {
        match self.enemy_groups.get(&group) {
            Some(enemies) => Ok(enemies),
            None => bail!("unrecognized enemy group code {group:#04x}"),
        }
    }

    pub fn group_has_hard_enemies(&self, group: EnemyGroupId) -> Result<bool> {
        Ok(self
            .resolve_enemy_group(group)?
            .iter()
            .any(|e| e.is_hard()))
    }

    pub fn triforce_locations(&self) -> Vec<LocationId> {
        (0..self.locations.len())
            .filter(|&i| self.locations[i].vanilla_item == Item::TriforceFragment)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_snapshot_is_consistent() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        assert_eq!(game_data.triforce_locations().len(), 8);
        // One item byte address per location, no two slots sharing one.
        let mut addrs: Vec<usize> = game_data.locations.iter().map(|l| l.addr).collect();
        addrs.sort();
        addrs.dedup();
        assert_eq!(addrs.len(), game_data.locations.len());
        // Every drop slot names its room's occupants.
        for loc_id in 0..game_data.locations.len() {
            if game_data.is_drop(loc_id) {
                assert!(game_data.locations[loc_id].enemy_group.is_some());
            }
        }
    }

    #[test]
    fn unknown_enemy_group_is_an_error() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        assert!(game_data.resolve_enemy_group(0xEE).is_err());
        assert!(game_data.resolve_enemy_group(EG_MIXED_DARKNUT).is_ok());
    }

    #[test]
    fn mixed_groups_resolve_to_concrete_enemies() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        assert!(game_data.group_has_hard_enemies(EG_MIXED_DARKNUT).unwrap());
        assert!(game_data.group_has_hard_enemies(EG_MIXED_PATRA).unwrap());
        assert!(!game_data.group_has_hard_enemies(EG_MIXED_BASIC).unwrap());
    }

    #[test]
    fn second_quest_hides_dungeons_under_recorder_spots() {
        let first = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let second = GameData::new(Quest::Second, ItemRoomStyle::Vanilla);
        let entrance = |gd: &GameData, level: RegionId| {
            gd.links
                .iter()
                .find(|l| l.from_vertex_id == OVERWORLD && l.to_vertex_id == level)
                .unwrap()
                .requirement
                .clone()
        };
        assert_eq!(entrance(&first, 5), Requirement::Free);
        assert_eq!(
            entrance(&second, 5),
            Requirement::And(vec![
                Requirement::Free,
                Requirement::Item(ItemKind::Recorder, 1)
            ])
        );
    }

    #[test]
    fn item_room_style_changes_drop_behavior() {
        let vanilla = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let standing = GameData::new(Quest::First, ItemRoomStyle::ExtraStanding);
        let drops = GameData::new(Quest::First, ItemRoomStyle::ExtraDrops);
        let key_drop = (0..vanilla.locations.len())
            .find(|&i| {
                vanilla.locations[i].kind == LocationKind::Drop
                    && vanilla.locations[i].vanilla_item == Item::Key
            })
            .unwrap();
        assert!(vanilla.is_drop(key_drop));
        assert!(!standing.is_drop(key_drop));
        let bow_floor = (0..vanilla.locations.len())
            .find(|&i| vanilla.locations[i].vanilla_item == Item::Bow)
            .unwrap();
        assert!(!vanilla.is_drop(bow_floor));
        assert!(drops.is_drop(bow_floor));
        // Triforce rooms are push-block rooms; they never become drops.
        for &t in &drops.triforce_locations() {
            assert!(!drops.is_drop(t));
        }
    }
}
