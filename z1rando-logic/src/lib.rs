// Pure logic layer: the player inventory and requirement evaluation.
// Everything here is a function of (inventory, parameters, game data);
// no randomness and no mutation outside `Inventory::collect`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use z1rando_game::{
    Capacity, Enemy, EnemyGroupId, GameData, Item, ItemKind, Requirement, SwordCave,
    NUM_ITEM_KINDS, STARTING_HEARTS,
};

/// Logic inputs that vary per generation run but not per traversal round:
/// the hard-combat flag and the two sword-cave heart thresholds (which may
/// have been randomized within their declared ranges).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicParams {
    pub avoid_hard_combat: bool,
    pub white_sword_hearts: Capacity,
    pub magical_sword_hearts: Capacity,
}

/// The collected-item state. Tiered kinds store their highest collected
/// tier; hearts and triforce fragments are counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub levels: Vec<Capacity>, // indexed by ItemKind
    pub heart_containers: Capacity,
    pub triforce_fragments: Capacity,
}

impl Inventory {
    pub fn starting() -> Self {
        Inventory {
            levels: vec![0; NUM_ITEM_KINDS],
            heart_containers: STARTING_HEARTS,
            triforce_fragments: 0,
        }
    }

    pub fn level(&self, kind: ItemKind) -> Capacity {
        self.levels[kind as usize]
    }

    pub fn has(&self, kind: ItemKind) -> bool {
        self.level(kind) >= 1
    }

    pub fn hearts(&self) -> Capacity {
        self.heart_containers
    }

    /// Collect one item. A fixed-tier pickup raises the kind's level to at
    /// least that tier (never lowers it); a progressive copy raises the
    /// level by one up to the kind's maximum tier.
    pub fn collect(&mut self, item: Item) {
        match item.kind() {
            ItemKind::HeartContainer => {
                self.heart_containers += 1;
            }
            ItemKind::TriforceFragment => {
                self.triforce_fragments += 1;
            }
            ItemKind::MagicalKey => {
                self.levels[ItemKind::MagicalKey as usize] = 1;
            }
            // Small keys and bombs are farmable consumables; no requirement
            // reads them, so they are not tracked.
            ItemKind::Key | ItemKind::Bomb | ItemKind::Nothing => {}
            kind => {
                let slot = &mut self.levels[kind as usize];
                match item.tier() {
                    Some(tier) => *slot = (*slot).max(tier),
                    None => *slot = (*slot + 1).min(kind.max_tier()),
                }
            }
        }
    }
}

/// White-sword-tier sword plus any ring: the compensating precondition that
/// lets hard-combat rooms back into logic when hard combat is avoided.
fn hard_combat_compensated(inventory: &Inventory) -> bool {
    inventory.level(ItemKind::Sword) >= 2 && inventory.level(ItemKind::Ring) >= 1
}

fn can_defeat(enemy: Enemy, inventory: &Inventory) -> bool {
    let armed = inventory.has(ItemKind::Sword) || inventory.has(ItemKind::Wand);
    match enemy {
        Enemy::Gohma => inventory.has(ItemKind::Bow) && inventory.has(ItemKind::Arrow),
        Enemy::Digdogger => inventory.has(ItemKind::Recorder) && armed,
        // Dodongos eat bombs, which are farmable from common enemies.
        Enemy::Dodongo => true,
        Enemy::Ganon => {
            inventory.has(ItemKind::Sword)
                && inventory.has(ItemKind::Bow)
                && inventory.level(ItemKind::Arrow) >= 2
        }
        _ => armed,
    }
}

/// Whether the player can be required to clear the room holding the given
/// enemy group: every occupant must be killable, and if hard combat is
/// being avoided, hard occupants demand the compensating precondition.
pub fn can_clear_room(
    group: EnemyGroupId,
    inventory: &Inventory,
    params: &LogicParams,
    game_data: &GameData,
) -> Result<bool> {
    let enemies = game_data.resolve_enemy_group(group)?;
    if !enemies.iter().all(|&e| can_defeat(e, inventory)) {
        return Ok(false);
    }
    if params.avoid_hard_combat
        && enemies.iter().any(|e| e.is_hard())
        && !hard_combat_compensated(inventory)
    {
        return Ok(false);
    }
    Ok(true)
}

/// Whether an edge passing through the given enemy group's room is open.
/// With hard-combat avoidance off the edge is unconditionally passable;
/// with it on, the resolved composition must contain no hard enemy kinds
/// unless the precondition items are held.
pub fn can_pass_room(
    group: EnemyGroupId,
    inventory: &Inventory,
    params: &LogicParams,
    game_data: &GameData,
) -> Result<bool> {
    if !params.avoid_hard_combat {
        return Ok(true);
    }
    Ok(!game_data.group_has_hard_enemies(group)? || hard_combat_compensated(inventory))
}

pub fn requirement_met(
    req: &Requirement,
    inventory: &Inventory,
    params: &LogicParams,
    game_data: &GameData,
) -> Result<bool> {
    Ok(match req {
        Requirement::Free => true,
        Requirement::Never => false,
        Requirement::Item(kind, tier) => inventory.level(*kind) >= *tier,
        Requirement::Hearts(cave) => {
            let threshold = match cave {
                SwordCave::White => params.white_sword_hearts,
                SwordCave::Magical => params.magical_sword_hearts,
            };
            inventory.hearts() >= threshold
        }
        Requirement::Triforce(count) => inventory.triforce_fragments >= *count,
        Requirement::ClearRoom(group) => can_clear_room(*group, inventory, params, game_data)?,
        Requirement::HardCombat(group) => can_pass_room(*group, inventory, params, game_data)?,
        Requirement::And(reqs) => {
            for r in reqs {
                if !requirement_met(r, inventory, params, game_data)? {
                    return Ok(false);
                }
            }
            true
        }
        Requirement::Or(reqs) => {
            for r in reqs {
                if requirement_met(r, inventory, params, game_data)? {
                    return Ok(true);
                }
            }
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use z1rando_game::{ItemRoomStyle, Quest, EG_BLUE_WIZZROBE, EG_GOHMA, EG_STALFOS};

    fn params(avoid_hard_combat: bool) -> LogicParams {
        LogicParams {
            avoid_hard_combat,
            white_sword_hearts: 5,
            magical_sword_hearts: 12,
        }
    }

    #[test]
    fn progressive_upgrade_law() {
        // Collecting tier 1 then tier 2 matches collecting tier 2 directly.
        let mut stepped = Inventory::starting();
        stepped.collect(Item::WoodSword);
        stepped.collect(Item::WhiteSword);
        let mut direct = Inventory::starting();
        direct.collect(Item::WhiteSword);
        assert_eq!(stepped.level(ItemKind::Sword), direct.level(ItemKind::Sword));

        // Collection order within the same tier sequence is commutative.
        let mut forward = Inventory::starting();
        forward.collect(Item::BlueRing);
        forward.collect(Item::RedRing);
        let mut backward = Inventory::starting();
        backward.collect(Item::RedRing);
        backward.collect(Item::BlueRing);
        assert_eq!(forward.level(ItemKind::Ring), backward.level(ItemKind::Ring));
        assert_eq!(forward.level(ItemKind::Ring), 2);
    }

    #[test]
    fn progressive_copies_step_one_tier_at_a_time() {
        let mut inv = Inventory::starting();
        inv.collect(Item::Sword);
        assert_eq!(inv.level(ItemKind::Sword), 1);
        inv.collect(Item::Sword);
        assert_eq!(inv.level(ItemKind::Sword), 2);
        inv.collect(Item::Sword);
        inv.collect(Item::Sword); // capped at the kind's maximum tier
        assert_eq!(inv.level(ItemKind::Sword), 3);
    }

    #[test]
    fn consumable_pickups_do_not_change_logic_state() {
        let mut inv = Inventory::starting();
        inv.collect(Item::Key);
        inv.collect(Item::Bomb);
        inv.collect(Item::Nothing);
        assert_eq!(inv, Inventory::starting());
    }

    #[test]
    fn duplicate_lower_tier_does_not_downgrade() {
        let mut inv = Inventory::starting();
        inv.collect(Item::MagicalSword);
        inv.collect(Item::WoodSword);
        assert_eq!(inv.level(ItemKind::Sword), 3);
    }

    #[test]
    fn gohma_requires_bow_and_arrow() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let mut inv = Inventory::starting();
        inv.collect(Item::WoodSword);
        assert!(!can_clear_room(EG_GOHMA, &inv, &params(false), &game_data).unwrap());
        inv.collect(Item::Bow);
        inv.collect(Item::WoodArrow);
        assert!(can_clear_room(EG_GOHMA, &inv, &params(false), &game_data).unwrap());
    }

    #[test]
    fn hard_room_gating_depends_on_setting_and_precondition() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let mut inv = Inventory::starting();
        inv.collect(Item::WoodSword);
        // Avoidance off: hard rooms are not gated.
        assert!(can_clear_room(EG_BLUE_WIZZROBE, &inv, &params(false), &game_data).unwrap());
        assert!(can_pass_room(EG_BLUE_WIZZROBE, &inv, &params(false), &game_data).unwrap());
        // Avoidance on: gated until the sword upgrade and a ring are held.
        assert!(!can_clear_room(EG_BLUE_WIZZROBE, &inv, &params(true), &game_data).unwrap());
        assert!(!can_pass_room(EG_BLUE_WIZZROBE, &inv, &params(true), &game_data).unwrap());
        inv.collect(Item::WhiteSword);
        inv.collect(Item::BlueRing);
        assert!(can_clear_room(EG_BLUE_WIZZROBE, &inv, &params(true), &game_data).unwrap());
        assert!(can_pass_room(EG_BLUE_WIZZROBE, &inv, &params(true), &game_data).unwrap());
        // Non-hard rooms are unaffected by the setting.
        let fresh = {
            let mut i = Inventory::starting();
            i.collect(Item::WoodSword);
            i
        };
        assert!(can_clear_room(EG_STALFOS, &fresh, &params(true), &game_data).unwrap());
    }

    #[test]
    fn unknown_group_propagates_an_error() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let inv = Inventory::starting();
        assert!(can_clear_room(0xEE, &inv, &params(false), &game_data).is_err());
        assert!(
            requirement_met(
                &Requirement::ClearRoom(0xEE),
                &inv,
                &params(false),
                &game_data
            )
            .is_err()
        );
    }

    #[test]
    fn heart_gates_use_the_configured_thresholds() {
        let game_data = GameData::new(Quest::First, ItemRoomStyle::Vanilla);
        let mut inv = Inventory::starting();
        let req = Requirement::Hearts(SwordCave::White);
        assert!(!requirement_met(&req, &inv, &params(false), &game_data).unwrap());
        inv.collect(Item::HeartContainer);
        inv.collect(Item::HeartContainer);
        assert!(requirement_met(&req, &inv, &params(false), &game_data).unwrap());
    }
}
