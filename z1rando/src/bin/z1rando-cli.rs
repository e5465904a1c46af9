use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::{RngCore, SeedableRng};
use z1rando::patch::{make_rom, Rom};
use z1rando::randomize::{generate, DEFAULT_MAX_ATTEMPTS};
use z1rando::settings::RandomizerSettings;
use z1rando::spoiler_log::get_spoiler_log;

#[derive(Parser)]
struct Args {
    #[arg(long)]
    input_rom: PathBuf,

    #[arg(long)]
    output_rom: Option<PathBuf>,

    #[arg(long)]
    random_seed: Option<usize>,

    #[arg(long)]
    max_attempts: Option<usize>,

    /// RandomizerSettings as JSON; defaults to the full-shuffle preset.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    output_spoiler_log: Option<PathBuf>,

    #[arg(long)]
    output_patch: Option<PathBuf>,

    #[arg(long)]
    output_ips: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Unable to read settings file at {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Unable to parse settings file at {}", path.display()))?
        }
        None => RandomizerSettings::full_preset(),
    };

    let seed = match args.random_seed {
        Some(s) => s,
        None => (rand::rngs::StdRng::from_entropy().next_u64() & 0xFFFFFFFF) as usize,
    };
    let max_attempts = args.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
    info!("Seed: {seed}");

    let (game_data, randomization) = generate(&settings, seed, max_attempts)?;
    info!(
        "Randomization accepted on attempt {}",
        randomization.attempt_num
    );

    let base_rom = Rom::load(&args.input_rom)?;
    let (output_rom, patch) = make_rom(&base_rom, &game_data, &randomization)?;

    if let Some(output_rom_path) = &args.output_rom {
        info!("Writing output ROM to {}", output_rom_path.display());
        output_rom.save(output_rom_path)?;
    }

    if let Some(output_patch_path) = &args.output_patch {
        info!("Writing patch to {}", output_patch_path.display());
        let patch_str = serde_json::to_string_pretty(&patch)?;
        std::fs::write(output_patch_path, patch_str)?;
    }

    if let Some(output_ips_path) = &args.output_ips {
        info!("Writing IPS patch to {}", output_ips_path.display());
        std::fs::write(output_ips_path, patch.to_ips()?)?;
    }

    if let Some(output_spoiler_log_path) = &args.output_spoiler_log {
        info!(
            "Writing spoiler log to {}",
            output_spoiler_log_path.display()
        );
        let spoiler_log = get_spoiler_log(&game_data, &randomization, seed);
        let spoiler_str = serde_json::to_string_pretty(&spoiler_log)?;
        std::fs::write(output_spoiler_log_path, spoiler_str)?;
    }

    Ok(())
}
