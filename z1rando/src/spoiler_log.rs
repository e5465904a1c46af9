// Spoiler log: a serializable summary of the accepted placement and the
// progression order discovered by the final traversal.

use serde::{Deserialize, Serialize};
use z1rando_game::GameData;

use crate::randomize::Randomization;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpoilerItemDetails {
    pub item: String,
    pub location: String,
    pub region: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpoilerSphere {
    pub step: usize,
    pub items: Vec<SpoilerItemDetails>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpoilerLog {
    pub seed: usize,
    pub attempt_num: usize,
    pub quest: String,
    pub white_sword_hearts: i16,
    pub magical_sword_hearts: i16,
    pub spheres: Vec<SpoilerSphere>,
    pub all_items: Vec<SpoilerItemDetails>,
}

fn details(game_data: &GameData, randomization: &Randomization, loc_id: usize) -> SpoilerItemDetails {
    let loc = &game_data.locations[loc_id];
    SpoilerItemDetails {
        item: randomization.placement.items[loc_id].to_string(),
        location: loc.name.to_string(),
        region: loc.region,
    }
}

pub fn get_spoiler_log(
    game_data: &GameData,
    randomization: &Randomization,
    seed: usize,
) -> SpoilerLog {
    let spheres = randomization
        .spheres
        .iter()
        .enumerate()
        .map(|(step, loc_ids)| SpoilerSphere {
            step: step + 1,
            items: loc_ids
                .iter()
                .map(|&loc_id| details(game_data, randomization, loc_id))
                .collect(),
        })
        .collect();
    let all_items = (0..game_data.locations.len())
        .map(|loc_id| details(game_data, randomization, loc_id))
        .collect();
    SpoilerLog {
        seed,
        attempt_num: randomization.attempt_num,
        quest: format!("{:?}", randomization.quest),
        white_sword_hearts: randomization.params.white_sword_hearts,
        magical_sword_hearts: randomization.params.magical_sword_hearts,
        spheres,
        all_items,
    }
}
