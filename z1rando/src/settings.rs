use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use z1rando_game::{Capacity, ItemRoomStyle};

// Declared ranges for the sword-cave heart thresholds. Randomized values are
// drawn from these and re-checked by the validator.
pub const WHITE_SWORD_HEARTS_RANGE: (Capacity, Capacity) = (1, 8);
pub const MAGICAL_SWORD_HEARTS_RANGE: (Capacity, Capacity) = (8, 14);

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct RandomizerSettings {
    pub name: Option<String>,
    pub item_shuffle_settings: ItemShuffleSettings,
    pub forcing_settings: ForcingSettings,
    pub logic_settings: LogicSettings,
    pub overworld_quest: OverworldQuest,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct ItemShuffleSettings {
    pub shuffle_dungeon_items: bool,
    pub shuffle_white_sword: bool,
    pub shuffle_magical_sword: bool,
    pub shuffle_letter: bool,
    pub shuffle_armos_item: bool,
    pub shuffle_coast_item: bool,
    pub cave_shuffle: CaveShuffle,
    pub progressive_items: bool,
    /// Keep shuffled items within their vanilla region rather than mixing
    /// across the whole pool.
    pub shuffle_within_levels: bool,
    pub extra_standing_items: bool,
    pub extra_drop_items: bool,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct ForcingSettings {
    pub force_arrow_to_level_nine: bool,
    pub force_ring_to_level_nine: bool,
    pub force_wand_to_level_nine: bool,
    pub force_heart_container_to_armos: bool,
    pub force_heart_container_to_coast: bool,
}

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct LogicSettings {
    pub avoid_hard_combat: bool,
    pub white_sword_hearts: Capacity,
    pub magical_sword_hearts: Capacity,
    /// Draw the two thresholds from their declared ranges instead of using
    /// the configured values.
    pub randomize_heart_requirements: bool,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverworldQuest {
    First,
    Second,
    /// Resolved to First or Second with one draw from the seed stream.
    Mixed,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaveShuffle {
    Vanilla,
    ShuffleItems,
    ShuffleItemsAndPrices,
}

impl RandomizerSettings {
    /// Configuration-time checks: mutually exclusive flags, threshold
    /// ranges, and forcing flags whose item source is not in the pool.
    /// Anything caught here is fatal before randomization begins.
    pub fn validate(&self) -> Result<()> {
        let shuffle = &self.item_shuffle_settings;
        if shuffle.extra_standing_items && shuffle.extra_drop_items {
            bail!("extra_standing_items and extra_drop_items are mutually exclusive");
        }
        let logic = &self.logic_settings;
        if !range_contains(WHITE_SWORD_HEARTS_RANGE, logic.white_sword_hearts) {
            bail!(
                "white_sword_hearts {} outside range {:?}",
                logic.white_sword_hearts,
                WHITE_SWORD_HEARTS_RANGE
            );
        }
        if !range_contains(MAGICAL_SWORD_HEARTS_RANGE, logic.magical_sword_hearts) {
            bail!(
                "magical_sword_hearts {} outside range {:?}",
                logic.magical_sword_hearts,
                MAGICAL_SWORD_HEARTS_RANGE
            );
        }
        let forcing = &self.forcing_settings;
        let forcing_to_level_nine = forcing.force_arrow_to_level_nine
            || forcing.force_ring_to_level_nine
            || forcing.force_wand_to_level_nine;
        if forcing_to_level_nine && !shuffle.shuffle_dungeon_items {
            bail!("forcing an item to level 9 requires shuffle_dungeon_items");
        }
        if forcing.force_heart_container_to_armos && !shuffle.shuffle_armos_item {
            bail!("force_heart_container_to_armos requires shuffle_armos_item");
        }
        if forcing.force_heart_container_to_coast && !shuffle.shuffle_coast_item {
            bail!("force_heart_container_to_coast requires shuffle_coast_item");
        }
        Ok(())
    }

    pub fn item_room_style(&self) -> ItemRoomStyle {
        let shuffle = &self.item_shuffle_settings;
        if shuffle.extra_standing_items {
            ItemRoomStyle::ExtraStanding
        } else if shuffle.extra_drop_items {
            ItemRoomStyle::ExtraDrops
        } else {
            ItemRoomStyle::Vanilla
        }
    }

    /// Vanilla layout: nothing shuffled, first quest, combat unrestricted.
    pub fn vanilla_preset() -> Self {
        RandomizerSettings {
            name: None,
            item_shuffle_settings: ItemShuffleSettings {
                shuffle_dungeon_items: false,
                shuffle_white_sword: false,
                shuffle_magical_sword: false,
                shuffle_letter: false,
                shuffle_armos_item: false,
                shuffle_coast_item: false,
                cave_shuffle: CaveShuffle::Vanilla,
                progressive_items: false,
                shuffle_within_levels: false,
                extra_standing_items: false,
                extra_drop_items: false,
            },
            forcing_settings: ForcingSettings {
                force_arrow_to_level_nine: false,
                force_ring_to_level_nine: false,
                force_wand_to_level_nine: false,
                force_heart_container_to_armos: false,
                force_heart_container_to_coast: false,
            },
            logic_settings: LogicSettings {
                avoid_hard_combat: false,
                white_sword_hearts: 5,
                magical_sword_hearts: 12,
                randomize_heart_requirements: false,
            },
            overworld_quest: OverworldQuest::First,
        }
    }

    /// The usual full-shuffle configuration.
    pub fn full_preset() -> Self {
        let mut settings = Self::vanilla_preset();
        settings.name = Some("Full".to_string());
        let shuffle = &mut settings.item_shuffle_settings;
        shuffle.shuffle_dungeon_items = true;
        shuffle.shuffle_white_sword = true;
        shuffle.shuffle_magical_sword = true;
        shuffle.shuffle_letter = true;
        shuffle.shuffle_armos_item = true;
        shuffle.shuffle_coast_item = true;
        shuffle.cave_shuffle = CaveShuffle::ShuffleItems;
        settings
    }
}

fn range_contains(range: (Capacity, Capacity), value: Capacity) -> bool {
    value >= range.0 && value <= range.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_flags_fail_validation() {
        let mut settings = RandomizerSettings::vanilla_preset();
        settings.item_shuffle_settings.extra_standing_items = true;
        settings.item_shuffle_settings.extra_drop_items = true;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn out_of_range_thresholds_fail_validation() {
        let mut settings = RandomizerSettings::vanilla_preset();
        settings.logic_settings.white_sword_hearts = 9;
        assert!(settings.validate().is_err());
        settings.logic_settings.white_sword_hearts = 5;
        settings.logic_settings.magical_sword_hearts = 20;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn forcing_without_a_source_pool_fails_validation() {
        let mut settings = RandomizerSettings::vanilla_preset();
        settings.forcing_settings.force_arrow_to_level_nine = true;
        assert!(settings.validate().is_err());
        settings.item_shuffle_settings.shuffle_dungeon_items = true;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn coast_forcing_without_a_source_pool_fails_validation() {
        let mut settings = RandomizerSettings::vanilla_preset();
        settings.forcing_settings.force_heart_container_to_coast = true;
        assert!(settings.validate().is_err());
        settings.item_shuffle_settings.shuffle_coast_item = true;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = RandomizerSettings::full_preset();
        let text = serde_json::to_string(&settings).unwrap();
        let parsed: RandomizerSettings = serde_json::from_str(&text).unwrap();
        assert!(parsed == settings);
    }
}
