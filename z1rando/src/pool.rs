// Item/location pool construction. Each shuffle flag contributes a fixed
// sub-list of locations together with their vanilla items, keeping the two
// pools size-matched at every step.

use anyhow::{ensure, Result};
use z1rando_game::{GameData, Item, LocationId, LocationKind, RegionId};

use crate::settings::{CaveShuffle, RandomizerSettings};

#[derive(Clone, Debug)]
pub struct PoolEntry {
    pub item: Item,
    /// Region the item came from in the vanilla layout, used for
    /// within-level partitioning.
    pub origin_region: RegionId,
}

#[derive(Clone, Debug, Default)]
pub struct Pools {
    pub items: Vec<PoolEntry>,
    pub locations: Vec<LocationId>,
}

impl Pools {
    fn add(&mut self, game_data: &GameData, loc_ids: impl IntoIterator<Item = LocationId>) {
        for loc_id in loc_ids {
            let loc = &game_data.locations[loc_id];
            self.items.push(PoolEntry {
                item: loc.vanilla_item,
                origin_region: loc.region,
            });
            self.locations.push(loc_id);
        }
    }
}

fn named_location(game_data: &GameData, name: &str) -> Vec<LocationId> {
    (0..game_data.locations.len())
        .filter(|&i| game_data.locations[i].name == name)
        .collect()
}

pub fn build_pools(game_data: &GameData, settings: &RandomizerSettings) -> Result<Pools> {
    let shuffle = &settings.item_shuffle_settings;
    let mut pools = Pools::default();

    if shuffle.shuffle_dungeon_items {
        let loc_ids = (0..game_data.locations.len()).filter(|&i| {
            let loc = &game_data.locations[i];
            loc.region != z1rando_game::OVERWORLD && loc.vanilla_item != Item::TriforceFragment
        });
        pools.add(game_data, loc_ids);
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.shuffle_white_sword {
        pools.add(game_data, named_location(game_data, "White Sword Cave"));
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.shuffle_magical_sword {
        pools.add(game_data, named_location(game_data, "Magical Sword Cave"));
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.shuffle_letter {
        pools.add(game_data, named_location(game_data, "Letter Cave"));
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.shuffle_armos_item {
        pools.add(game_data, named_location(game_data, "Armos Item"));
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.shuffle_coast_item {
        pools.add(game_data, named_location(game_data, "Coast Item"));
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }
    if shuffle.cave_shuffle != CaveShuffle::Vanilla {
        // Shops: cave positions with a price byte.
        let loc_ids = (0..game_data.locations.len()).filter(|&i| {
            let loc = &game_data.locations[i];
            matches!(loc.kind, LocationKind::Cave { .. }) && loc.price_addr.is_some()
        });
        pools.add(game_data, loc_ids);
        ensure!(pools.items.len() == pools.locations.len(), "pool size mismatch");
    }

    if shuffle.progressive_items {
        // Tiered items become ascending copies of the progressive stand-in.
        for entry in &mut pools.items {
            if let Some(progressive) = entry.item.progressive() {
                entry.item = progressive;
            }
        }
    }

    ensure!(
        pools.items.len() == pools.locations.len(),
        "item pool size {} does not match location pool size {}",
        pools.items.len(),
        pools.locations.len()
    );
    Ok(pools)
}
