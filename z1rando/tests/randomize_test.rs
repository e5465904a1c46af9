// End-to-end randomization scenarios: pool laws, forcing constraints,
// infeasible configurations, and completability of accepted placements.

use anyhow::Result;
use z1rando::randomize::generate;
use z1rando::settings::{CaveShuffle, RandomizerSettings};
use z1rando::traverse::{traverse, validate, Placement};
use z1rando_game::{Item, ItemKind};

#[test]
fn vanilla_preset_leaves_the_layout_untouched() -> Result<()> {
    let settings = RandomizerSettings::vanilla_preset();
    let (game_data, randomization) = generate(&settings, 1, 2000)?;
    assert_eq!(randomization.placement, Placement::vanilla(&game_data));
    assert_eq!(randomization.attempt_num, 1);
    assert!(randomization.cave_prices.is_empty());
    Ok(())
}

#[test]
fn accepted_placements_are_completable() -> Result<()> {
    let settings = RandomizerSettings::full_preset();
    for seed in [3, 17, 99, 2024] {
        let (game_data, randomization) = generate(&settings, seed, 2000)?;
        let result = traverse(&game_data, &randomization.placement, &randomization.params)?;
        assert!(
            validate(&game_data, &result, &randomization.forced_locations, &randomization.params)?,
            "accepted placement for seed {seed} fails re-validation"
        );
        for loc_id in game_data.triforce_locations() {
            assert!(result.location_reachable(&game_data, loc_id));
        }
    }
    Ok(())
}

#[test]
fn forced_arrow_lands_in_level_nine() -> Result<()> {
    let mut settings = RandomizerSettings::full_preset();
    settings.forcing_settings.force_arrow_to_level_nine = true;
    let (game_data, randomization) = generate(&settings, 42, 2000)?;
    assert_eq!(randomization.forced_locations.len(), 1);
    let loc_id = randomization.forced_locations[0];
    assert_eq!(game_data.locations[loc_id].region, 9);
    assert_eq!(
        randomization.placement.items[loc_id].kind(),
        ItemKind::Arrow
    );
    Ok(())
}

#[test]
fn forced_heart_container_lands_at_the_armos() -> Result<()> {
    let mut settings = RandomizerSettings::vanilla_preset();
    settings.item_shuffle_settings.shuffle_armos_item = true;
    settings.item_shuffle_settings.shuffle_coast_item = true;
    settings.forcing_settings.force_heart_container_to_armos = true;
    let (game_data, randomization) = generate(&settings, 7, 2000)?;
    let armos = (0..game_data.locations.len())
        .find(|&i| game_data.locations[i].name == "Armos Item")
        .expect("no Armos location");
    assert_eq!(randomization.placement.items[armos], Item::HeartContainer);
    Ok(())
}

#[test]
fn forced_heart_container_lands_at_the_coast() -> Result<()> {
    let mut settings = RandomizerSettings::full_preset();
    settings.forcing_settings.force_heart_container_to_coast = true;
    let (game_data, randomization) = generate(&settings, 11, 2000)?;
    let coast = (0..game_data.locations.len())
        .find(|&i| game_data.locations[i].name == "Coast Item")
        .expect("no Coast location");
    assert_eq!(randomization.forced_locations, vec![coast]);
    assert_eq!(randomization.placement.items[coast], Item::HeartContainer);
    Ok(())
}

#[test]
fn forcing_composes_with_within_level_shuffle() -> Result<()> {
    // The forced item must be drawn from the target region's own partition,
    // so every seed generates and every region's multiset survives.
    let mut settings = RandomizerSettings::full_preset();
    settings.item_shuffle_settings.shuffle_within_levels = true;
    settings.forcing_settings.force_arrow_to_level_nine = true;
    for seed in 0..20 {
        let (game_data, randomization) = generate(&settings, seed, 2000)?;
        assert_eq!(randomization.forced_locations.len(), 1);
        let loc_id = randomization.forced_locations[0];
        assert_eq!(game_data.locations[loc_id].region, 9);
        assert_eq!(
            randomization.placement.items[loc_id].kind(),
            ItemKind::Arrow
        );
        for region in 0..10 {
            let mut vanilla: Vec<Item> = vec![];
            let mut placed: Vec<Item> = vec![];
            for loc_id in 0..game_data.locations.len() {
                if game_data.locations[loc_id].region == region {
                    vanilla.push(game_data.locations[loc_id].vanilla_item);
                    placed.push(randomization.placement.items[loc_id]);
                }
            }
            vanilla.sort();
            placed.sort();
            assert_eq!(placed, vanilla, "seed {seed}: region {region} pool changed");
        }
    }
    Ok(())
}

#[test]
fn forcing_outside_the_region_partition_is_rejected_up_front() {
    // The wand originates in level 6; with within-level shuffle it can
    // never reach level 9, and the pre-check must say so.
    let mut settings = RandomizerSettings::full_preset();
    settings.item_shuffle_settings.shuffle_within_levels = true;
    settings.forcing_settings.force_wand_to_level_nine = true;
    let err = generate(&settings, 1, 2000).unwrap_err();
    assert!(err.to_string().contains("infeasible"), "unexpected error: {err}");
}

#[test]
fn overdemanding_level_nine_is_rejected_up_front() {
    // Level 9 only has two shuffled slots; three forced items cannot fit.
    let mut settings = RandomizerSettings::full_preset();
    settings.forcing_settings.force_arrow_to_level_nine = true;
    settings.forcing_settings.force_ring_to_level_nine = true;
    settings.forcing_settings.force_wand_to_level_nine = true;
    let err = generate(&settings, 1, 2000).unwrap_err();
    assert!(err.to_string().contains("infeasible"), "unexpected error: {err}");
}

#[test]
fn within_level_shuffle_preserves_each_region_pool() -> Result<()> {
    let mut settings = RandomizerSettings::full_preset();
    settings.item_shuffle_settings.shuffle_within_levels = true;
    let (game_data, randomization) = generate(&settings, 5, 2000)?;
    for region in 0..10 {
        let mut vanilla: Vec<Item> = vec![];
        let mut placed: Vec<Item> = vec![];
        for loc_id in 0..game_data.locations.len() {
            if game_data.locations[loc_id].region == region {
                vanilla.push(game_data.locations[loc_id].vanilla_item);
                placed.push(randomization.placement.items[loc_id]);
            }
        }
        vanilla.sort();
        placed.sort();
        assert_eq!(placed, vanilla, "region {region} pool changed");
    }
    Ok(())
}

#[test]
fn cave_prices_roll_only_for_shop_slots() -> Result<()> {
    let mut settings = RandomizerSettings::full_preset();
    settings.item_shuffle_settings.cave_shuffle = CaveShuffle::ShuffleItemsAndPrices;
    let (game_data, randomization) = generate(&settings, 9, 2000)?;
    assert!(!randomization.cave_prices.is_empty());
    for &(loc_id, price) in &randomization.cave_prices {
        assert!(game_data.locations[loc_id].price_addr.is_some());
        assert!((10..=250).contains(&price));
    }
    Ok(())
}
