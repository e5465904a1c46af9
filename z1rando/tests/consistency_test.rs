// Consistency test: given the same settings and seed, the same placement,
// patch, and spoiler log are produced. This catches any unintended
// non-deterministic behavior in the randomization process.

use anyhow::Result;
use z1rando::patch::{make_rom, Rom};
use z1rando::randomize::generate;
use z1rando::settings::RandomizerSettings;
use z1rando::spoiler_log::get_spoiler_log;

const ROM_SIZE: usize = 0x20000;

#[test]
fn identical_seeds_produce_identical_output() -> Result<()> {
    let settings = RandomizerSettings::full_preset();
    let seed = 12345;

    let (game_data1, randomization1) = generate(&settings, seed, 2000)?;
    let (game_data2, randomization2) = generate(&settings, seed, 2000)?;

    assert_eq!(randomization1.placement, randomization2.placement);
    assert_eq!(randomization1.attempt_num, randomization2.attempt_num);
    assert_eq!(randomization1.cave_prices, randomization2.cave_prices);

    let base_rom = Rom::new(vec![0; ROM_SIZE]);
    let (rom1, patch1) = make_rom(&base_rom, &game_data1, &randomization1)?;
    let (rom2, patch2) = make_rom(&base_rom, &game_data2, &randomization2)?;
    assert_eq!(rom1.data, rom2.data);
    assert_eq!(patch1, patch2);

    let spoiler1 = serde_json::to_string(&get_spoiler_log(&game_data1, &randomization1, seed))?;
    let spoiler2 = serde_json::to_string(&get_spoiler_log(&game_data2, &randomization2, seed))?;
    assert_eq!(spoiler1, spoiler2);
    Ok(())
}

#[test]
fn heart_requirement_randomization_is_deterministic() -> Result<()> {
    let mut settings = RandomizerSettings::full_preset();
    settings.logic_settings.randomize_heart_requirements = true;
    let (_, randomization1) = generate(&settings, 777, 2000)?;
    let (_, randomization2) = generate(&settings, 777, 2000)?;
    assert_eq!(randomization1.params, randomization2.params);
    Ok(())
}

#[test]
fn patch_applies_cleanly_to_the_base_image() -> Result<()> {
    let settings = RandomizerSettings::full_preset();
    let (game_data, randomization) = generate(&settings, 4242, 2000)?;
    let base_rom = Rom::new(vec![0; ROM_SIZE]);
    let (rom, patch) = make_rom(&base_rom, &game_data, &randomization)?;
    let mut patched = vec![0u8; ROM_SIZE];
    patch.apply(&mut patched)?;
    assert_eq!(patched, rom.data);
    Ok(())
}
