// ROM byte access and patch assembly. All writes are tracked so the final
// artifact is an ordered address -> bytes mapping (plus an IPS rendering)
// that applies cleanly to the vanilla image.

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use z1rando_game::{
    GameData, MAGICAL_SWORD_HEARTS_ADDR, QUEST_VARIANT_ADDR, Quest, START_SCREEN_ADDR,
    VANILLA_START_SCREEN, WHITE_SWORD_HEARTS_ADDR,
};

use crate::randomize::Randomization;

#[derive(Clone)]
pub struct Rom {
    pub data: Vec<u8>,
    track_touched: bool,
    touched: HashSet<usize>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Self {
        Rom {
            data,
            track_touched: false,
            touched: HashSet::new(),
        }
    }

    pub fn enable_tracking(&mut self) {
        self.track_touched = true;
        self.touched.clear();
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Unable to load ROM at path {}", path.display()))?;
        Ok(Rom::new(data))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.data)
            .with_context(|| format!("Unable to save ROM at path {}", path.display()))?;
        Ok(())
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8> {
        ensure!(addr < self.data.len(), "read_u8 address out of bounds");
        Ok(self.data[addr])
    }

    pub fn write_u8(&mut self, addr: usize, x: u8) -> Result<()> {
        ensure!(addr < self.data.len(), "write_u8 address out of bounds");
        self.data[addr] = x;
        if self.track_touched {
            self.touched.insert(addr);
        }
        Ok(())
    }

    pub fn write_n(&mut self, addr: usize, x: &[u8]) -> Result<()> {
        ensure!(
            addr + x.len() <= self.data.len(),
            "write_n address out of bounds"
        );
        for (i, &b) in x.iter().enumerate() {
            self.write_u8(addr + i, b)?;
        }
        Ok(())
    }

    /// Returns a list of [start, end) ranges covering every touched address.
    pub fn get_modified_ranges(&self) -> Vec<(usize, usize)> {
        let mut addresses: Vec<usize> = self.touched.iter().copied().collect();
        addresses.sort();
        let mut ranges: Vec<(usize, usize)> = vec![];
        let mut i = 0;
        while i < addresses.len() {
            let mut j = i;
            while j + 1 < addresses.len() && addresses[j + 1] == addresses[j] + 1 {
                j += 1;
            }
            ranges.push((addresses[i], addresses[j] + 1));
            i = j + 1;
        }
        ranges
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchWrite {
    pub addr: usize,
    pub bytes: Vec<u8>,
}

/// Ordered address -> bytes mapping representing every modification made
/// during one generation run. Ranges are sorted and disjoint by
/// construction, so no address is written twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub writes: Vec<PatchWrite>,
}

impl Patch {
    /// Extract the patch from a tracked ROM's touched ranges.
    pub fn from_rom(rom: &Rom) -> Result<Patch> {
        let mut writes = Vec::new();
        let mut last_end = 0usize;
        for (start, end) in rom.get_modified_ranges() {
            ensure!(start >= last_end, "overlapping patch ranges");
            last_end = end;
            writes.push(PatchWrite {
                addr: start,
                bytes: rom.data[start..end].to_vec(),
            });
        }
        Ok(Patch { writes })
    }

    pub fn apply(&self, data: &mut [u8]) -> Result<()> {
        for write in &self.writes {
            ensure!(
                write.addr + write.bytes.len() <= data.len(),
                "patch write at {:#x} out of bounds",
                write.addr
            );
            data[write.addr..write.addr + write.bytes.len()].copy_from_slice(&write.bytes);
        }
        Ok(())
    }

    /// Render the same diff in IPS format.
    pub fn to_ips(&self) -> Result<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        out.extend("PATCH".as_bytes());
        for write in &self.writes {
            ensure!(write.addr <= 0xFFFFFF, "IPS offset does not fit in 3 bytes");
            ensure!(!write.bytes.is_empty(), "empty patch write");
            ensure!(write.bytes.len() <= 0xFFFF, "IPS chunk too large");
            out.extend(&write.addr.to_be_bytes()[5..8]);
            out.extend(&write.bytes.len().to_be_bytes()[6..8]);
            out.extend(&write.bytes);
        }
        out.extend("EOF".as_bytes());
        Ok(out)
    }
}

pub struct Patcher<'a> {
    pub rom: &'a mut Rom,
    pub game_data: &'a GameData,
    pub randomization: &'a Randomization,
}

impl<'a> Patcher<'a> {
    fn write_items(&mut self) -> Result<()> {
        for loc_id in 0..self.game_data.locations.len() {
            let loc = &self.game_data.locations[loc_id];
            let item = self.randomization.placement.items[loc_id];
            if item != loc.vanilla_item {
                self.rom.write_u8(loc.addr, item.rom_code())?;
            }
        }
        Ok(())
    }

    fn write_cave_prices(&mut self) -> Result<()> {
        for &(loc_id, price) in &self.randomization.cave_prices {
            let loc = &self.game_data.locations[loc_id];
            match loc.price_addr {
                Some(addr) => self.rom.write_u8(addr, price)?,
                None => bail!("price rolled for non-shop location '{}'", loc.name),
            }
        }
        Ok(())
    }

    fn write_heart_requirements(&mut self) -> Result<()> {
        self.rom.write_u8(
            WHITE_SWORD_HEARTS_ADDR,
            self.randomization.params.white_sword_hearts as u8,
        )?;
        self.rom.write_u8(
            MAGICAL_SWORD_HEARTS_ADDR,
            self.randomization.params.magical_sword_hearts as u8,
        )?;
        Ok(())
    }

    fn write_start_metadata(&mut self) -> Result<()> {
        self.rom.write_u8(START_SCREEN_ADDR, VANILLA_START_SCREEN)?;
        let quest_byte = match self.randomization.quest {
            Quest::First => 0,
            Quest::Second => 1,
        };
        self.rom.write_u8(QUEST_VARIANT_ADDR, quest_byte)?;
        Ok(())
    }

    pub fn apply_all(&mut self) -> Result<()> {
        self.write_items()?;
        self.write_cave_prices()?;
        self.write_heart_requirements()?;
        self.write_start_metadata()?;
        Ok(())
    }
}

/// Apply an accepted randomization to a copy of the base image and return
/// the patched ROM together with its patch.
pub fn make_rom(
    base_rom: &Rom,
    game_data: &GameData,
    randomization: &Randomization,
) -> Result<(Rom, Patch)> {
    let mut rom = base_rom.clone();
    rom.enable_tracking();
    let mut patcher = Patcher {
        rom: &mut rom,
        game_data,
        randomization,
    };
    patcher.apply_all()?;
    let patch = Patch::from_rom(&rom)?;
    Ok((rom, patch))
}
