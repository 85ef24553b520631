//
// mapper/nrom.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jan 03 2020
//

use serde::{Serialize, Deserialize};

use super::MapperControl;
use super::mem::Memory;
use crate::cart::{Cartridge, PRG_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE};
use crate::state::{self, StateError};

const PRG_RAM_SIZE: usize = kb!(8);

/// NROM Mapper
/// https://wiki.nesdev.com/w/index.php/NROM
pub struct Nrom {
    prg_rom: Memory,
    prg_ram: Vec<u8>,
    chr: Memory,
}

#[derive(Serialize, Deserialize)]
struct NromState {
    prg_ram: Vec<u8>,
    chr_ram: Option<Vec<u8>>,
}

impl From<Cartridge> for Nrom {
    fn from(cart: Cartridge) -> Self {
        let (_, prg_rom, chr_rom, sav_ram) = cart.into_parts();

        // Battery RAM is loaded into PRG RAM
        let mut prg_ram = vec![0u8; PRG_RAM_SIZE];
        let n = std::cmp::min(sav_ram.len(), PRG_RAM_SIZE);
        prg_ram[..n].copy_from_slice(&sav_ram[..n]);

        Nrom {
            prg_rom: Memory::new(prg_rom, PRG_ROM_BANK_SIZE),
            prg_ram,
            chr: Memory::rom_or_ram(chr_rom, CHR_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE),
        }
    }
}

impl MapperControl for Nrom {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[(addr - 0x6000) as usize]
            },
            // NROM-128 mirrors its only bank into $C000
            0x8000..=0xFFFF => {
                let bank = ((addr - 0x8000) >> 14) as usize;
                self.prg_rom.read(bank, (addr & 0x3FFF) as usize)
            },
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            self.prg_ram[(addr - 0x6000) as usize] = value
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr.read_first(addr as usize)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.chr.write(0, addr as usize, value);
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::to_bytes(&NromState {
            prg_ram: self.prg_ram.clone(),
            chr_ram: self.chr.snapshot(),
        })
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: NromState = state::from_bytes(data)?;
        if s.prg_ram.len() != PRG_RAM_SIZE {
            return Err(StateError::Inconsistent(String::from("PRG RAM size")));
        }

        self.chr.restore(s.chr_ram.as_deref())?;
        self.prg_ram = s.prg_ram;

        Ok(())
    }
}
