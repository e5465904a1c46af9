// Placement shuffling and the retry orchestration: build pools once, then
// shuffle and validate with a single RNG stream until a placement passes.

use anyhow::{bail, ensure, Result};
use hashbrown::HashMap;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use z1rando_game::{
    GameData, ItemKind, LocationId, Quest, RegionId, LEVEL_NINE, NUM_REGIONS,
};
use z1rando_logic::LogicParams;

use crate::pool::{build_pools, PoolEntry, Pools};
use crate::settings::{
    CaveShuffle, OverworldQuest, RandomizerSettings, MAGICAL_SWORD_HEARTS_RANGE,
    WHITE_SWORD_HEARTS_RANGE,
};
use crate::traverse::{traverse, validate, Placement};

pub const DEFAULT_MAX_ATTEMPTS: usize = 2000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ForcedTarget {
    Region(RegionId),
    Location(LocationId),
}

#[derive(Clone, Debug)]
struct ForcedSpec {
    kind: ItemKind,
    target: ForcedTarget,
    flag: &'static str,
}

impl ForcedSpec {
    fn target_region(&self, game_data: &GameData) -> RegionId {
        match self.target {
            ForcedTarget::Region(region) => region,
            ForcedTarget::Location(loc_id) => game_data.locations[loc_id].region,
        }
    }
}

/// The accepted output of one generation run.
#[derive(Debug)]
pub struct Randomization {
    pub placement: Placement,
    /// Locations chosen for forced items, in forcing-flag order.
    pub forced_locations: Vec<LocationId>,
    /// Progression spheres from the final accepted traversal.
    pub spheres: Vec<Vec<LocationId>>,
    pub params: LogicParams,
    pub quest: Quest,
    pub cave_prices: Vec<(LocationId, u8)>,
    pub attempt_num: usize,
}

pub struct Randomizer<'a> {
    pub game_data: &'a GameData,
    pub settings: &'a RandomizerSettings,
    pub params: LogicParams,
    pools: Pools,
    forced: Vec<ForcedSpec>,
}

fn named_location(game_data: &GameData, name: &str) -> Result<LocationId> {
    match (0..game_data.locations.len()).find(|&i| game_data.locations[i].name == name) {
        Some(loc_id) => Ok(loc_id),
        None => bail!("no location named '{name}' in the game data"),
    }
}

fn forced_specs(game_data: &GameData, settings: &RandomizerSettings) -> Result<Vec<ForcedSpec>> {
    let forcing = &settings.forcing_settings;
    let mut specs = Vec::new();
    if forcing.force_arrow_to_level_nine {
        specs.push(ForcedSpec {
            kind: ItemKind::Arrow,
            target: ForcedTarget::Region(LEVEL_NINE),
            flag: "force_arrow_to_level_nine",
        });
    }
    if forcing.force_ring_to_level_nine {
        specs.push(ForcedSpec {
            kind: ItemKind::Ring,
            target: ForcedTarget::Region(LEVEL_NINE),
            flag: "force_ring_to_level_nine",
        });
    }
    if forcing.force_wand_to_level_nine {
        specs.push(ForcedSpec {
            kind: ItemKind::Wand,
            target: ForcedTarget::Region(LEVEL_NINE),
            flag: "force_wand_to_level_nine",
        });
    }
    if forcing.force_heart_container_to_armos {
        specs.push(ForcedSpec {
            kind: ItemKind::HeartContainer,
            target: ForcedTarget::Location(named_location(game_data, "Armos Item")?),
            flag: "force_heart_container_to_armos",
        });
    }
    if forcing.force_heart_container_to_coast {
        specs.push(ForcedSpec {
            kind: ItemKind::HeartContainer,
            target: ForcedTarget::Location(named_location(game_data, "Coast Item")?),
            flag: "force_heart_container_to_coast",
        });
    }
    Ok(specs)
}

pub fn resolve_quest(quest: OverworldQuest, rng: &mut StdRng) -> Quest {
    match quest {
        OverworldQuest::First => Quest::First,
        OverworldQuest::Second => Quest::Second,
        OverworldQuest::Mixed => {
            if rng.gen_range(0..2) == 0 {
                Quest::First
            } else {
                Quest::Second
            }
        }
    }
}

impl<'a> Randomizer<'a> {
    /// Builds the pools and forcing constraints, drawing the heart
    /// thresholds from the seed stream if they are randomized. All
    /// configuration and infeasibility errors surface here, before any
    /// placement attempt is made.
    pub fn new(
        game_data: &'a GameData,
        settings: &'a RandomizerSettings,
        rng: &mut StdRng,
    ) -> Result<Randomizer<'a>> {
        settings.validate()?;
        let logic = &settings.logic_settings;
        let (white_sword_hearts, magical_sword_hearts) = if logic.randomize_heart_requirements {
            (
                rng.gen_range(WHITE_SWORD_HEARTS_RANGE.0..=WHITE_SWORD_HEARTS_RANGE.1),
                rng.gen_range(MAGICAL_SWORD_HEARTS_RANGE.0..=MAGICAL_SWORD_HEARTS_RANGE.1),
            )
        } else {
            (logic.white_sword_hearts, logic.magical_sword_hearts)
        };
        let params = LogicParams {
            avoid_hard_combat: logic.avoid_hard_combat,
            white_sword_hearts,
            magical_sword_hearts,
        };
        let pools = build_pools(game_data, settings)?;
        let forced = forced_specs(game_data, settings)?;
        let randomizer = Randomizer {
            game_data,
            settings,
            params,
            pools,
            forced,
        };
        randomizer.check_feasibility()?;
        Ok(randomizer)
    }

    /// Counts eligible slots and pooled items for every forcing constraint
    /// before any assignment is attempted. A shortfall here would otherwise
    /// reshuffle forever. With within-level shuffle active, forced items may
    /// only come from the target region's own partition, so item
    /// availability is counted per region in that case.
    fn check_feasibility(&self) -> Result<()> {
        let within = self.settings.item_shuffle_settings.shuffle_within_levels;
        let mut demanded_slots: HashMap<RegionId, usize> = HashMap::new();
        let mut demanded_kinds: HashMap<(Option<RegionId>, ItemKind), usize> = HashMap::new();
        for spec in &self.forced {
            let region = spec.target_region(self.game_data);
            let region_key = if within { Some(region) } else { None };
            *demanded_kinds.entry((region_key, spec.kind)).or_insert(0) += 1;
            match spec.target {
                ForcedTarget::Region(_) => {
                    *demanded_slots.entry(region).or_insert(0) += 1;
                }
                ForcedTarget::Location(loc_id) => {
                    ensure!(
                        self.pools.locations.contains(&loc_id),
                        "{} requires location '{}' to be shuffled",
                        spec.flag,
                        self.game_data.locations[loc_id].name
                    );
                }
            }
        }
        for (&region, &demanded) in &demanded_slots {
            let eligible = self
                .pools
                .locations
                .iter()
                .filter(|&&loc_id| self.game_data.locations[loc_id].region == region)
                .count();
            if eligible < demanded {
                bail!(
                    "infeasible configuration: {demanded} items forced to region {region}, \
                     but only {eligible} eligible locations are shuffled there"
                );
            }
        }
        for (&(region_key, kind), &demanded) in &demanded_kinds {
            let available = self
                .pools
                .items
                .iter()
                .filter(|e| {
                    e.item.kind() == kind
                        && region_key.map_or(true, |region| e.origin_region == region)
                })
                .count();
            if available < demanded {
                match region_key {
                    Some(region) => bail!(
                        "infeasible configuration: {demanded} {kind:?} item(s) forced to \
                         region {region}, but only {available} originate there \
                         (shuffle_within_levels)"
                    ),
                    None => bail!(
                        "infeasible configuration: {demanded} {kind:?} item(s) forced, \
                         but only {available} in the item pool"
                    ),
                }
            }
        }
        Ok(())
    }

    /// Produce one candidate placement: forced pre-placements first, then a
    /// uniform permutation of the remainder within each partition.
    fn shuffle(&self, rng: &mut StdRng) -> Result<(Placement, Vec<LocationId>)> {
        let mut items: Vec<PoolEntry> = self.pools.items.clone();
        let mut locations: Vec<LocationId> = self.pools.locations.clone();
        let mut placement = Placement::vanilla(self.game_data);
        let mut forced_locations: Vec<LocationId> = Vec::new();

        let within = self.settings.item_shuffle_settings.shuffle_within_levels;
        for spec in &self.forced {
            let slot_candidates: Vec<usize> = (0..locations.len())
                .filter(|&i| match spec.target {
                    ForcedTarget::Region(region) => {
                        self.game_data.locations[locations[i]].region == region
                    }
                    ForcedTarget::Location(loc_id) => locations[i] == loc_id,
                })
                .collect();
            // Within-level shuffle keeps every region's partition intact, so
            // the forced item must come from the target region's own entries.
            let target_region = spec.target_region(self.game_data);
            let item_candidates: Vec<usize> = (0..items.len())
                .filter(|&i| {
                    items[i].item.kind() == spec.kind
                        && (!within || items[i].origin_region == target_region)
                })
                .collect();
            // Ruled out by the feasibility pre-check.
            ensure!(
                !slot_candidates.is_empty() && !item_candidates.is_empty(),
                "forcing constraint {} became unsatisfiable",
                spec.flag
            );
            let slot_idx = slot_candidates[rng.gen_range(0..slot_candidates.len())];
            let item_idx = item_candidates[rng.gen_range(0..item_candidates.len())];
            let loc_id = locations.remove(slot_idx);
            let entry = items.remove(item_idx);
            placement.items[loc_id] = entry.item;
            forced_locations.push(loc_id);
        }

        if within {
            for region in 0..NUM_REGIONS {
                let mut region_items: Vec<&PoolEntry> =
                    items.iter().filter(|e| e.origin_region == region).collect();
                let region_locations: Vec<LocationId> = locations
                    .iter()
                    .copied()
                    .filter(|&loc_id| self.game_data.locations[loc_id].region == region)
                    .collect();
                ensure!(
                    region_items.len() == region_locations.len(),
                    "forcing constraints left region {region} with {} items \
                     for {} locations; cannot shuffle within levels",
                    region_items.len(),
                    region_locations.len()
                );
                region_items.shuffle(rng);
                for (entry, loc_id) in region_items.iter().zip(region_locations) {
                    placement.items[loc_id] = entry.item;
                }
            }
        } else {
            items.shuffle(rng);
            for (entry, &loc_id) in items.iter().zip(locations.iter()) {
                placement.items[loc_id] = entry.item;
            }
        }

        Ok((placement, forced_locations))
    }

    fn roll_cave_prices(&self, rng: &mut StdRng) -> Vec<(LocationId, u8)> {
        if self.settings.item_shuffle_settings.cave_shuffle != CaveShuffle::ShuffleItemsAndPrices {
            return vec![];
        }
        let mut prices = Vec::new();
        for &loc_id in &self.pools.locations {
            if self.game_data.locations[loc_id].price_addr.is_some() {
                prices.push((loc_id, rng.gen_range(10..=250) as u8));
            }
        }
        prices
    }

    /// The retry loop: SHUFFLE -> VALIDATE until a placement passes, every
    /// retry a full fresh shuffle from the same RNG stream. The attempt cap
    /// turns configurations that can never validate into an explicit error
    /// instead of an endless loop.
    pub fn randomize(&self, max_attempts: usize, rng: &mut StdRng) -> Result<Randomization> {
        for attempt_num in 1..=max_attempts {
            let (placement, forced_locations) = self.shuffle(rng)?;
            let result = traverse(self.game_data, &placement, &self.params)?;
            if validate(self.game_data, &result, &forced_locations, &self.params)? {
                info!("[attempt {attempt_num}] Placement validated");
                let cave_prices = self.roll_cave_prices(rng);
                return Ok(Randomization {
                    placement,
                    forced_locations,
                    spheres: result.spheres,
                    params: self.params,
                    quest: self.game_data.quest,
                    cave_prices,
                    attempt_num,
                });
            }
            info!("[attempt {attempt_num}] Placement failed validation; reshuffling");
        }
        bail!("exhausted {max_attempts} randomization attempts without a valid placement");
    }
}

/// Run one full generation: resolve the quest variant, build the game data,
/// and drive the retry loop, all from a single RNG stream seeded by `seed`
/// so the entire run is reproducible.
pub fn generate(
    settings: &RandomizerSettings,
    seed: usize,
    max_attempts: usize,
) -> Result<(GameData, Randomization)> {
    settings.validate()?;
    let mut rng_seed = [0u8; 32];
    rng_seed[..8].copy_from_slice(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(rng_seed);
    let quest = resolve_quest(settings.overworld_quest, &mut rng);
    let game_data = GameData::new(quest, settings.item_room_style());
    let randomization = {
        let randomizer = Randomizer::new(&game_data, settings, &mut rng)?;
        randomizer.randomize(max_attempts, &mut rng)?
    };
    Ok((game_data, randomization))
}
