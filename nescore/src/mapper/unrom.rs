//
// mapper/unrom.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Dec 27 2019
//

// +-----------------+
// ¦ Mapper 2: UNROM ¦
// +-----------------+
//
// +---------------+         +------------------------------------------+
// ¦ $8000 - $FFFF +---------¦ PPPPPPPP                                 ¦
// +---------------+         ¦ +------+                                 ¦
//                           ¦    ¦                                     ¦
//                           ¦    ¦                                     ¦
//                           ¦    +------- Select 16K ROM bank at $8000 ¦
//                           +------------------------------------------+
//
// The last 16K bank is hard-wired to $C000. Boards without CHR ROM have 8K of CHR RAM.
// http://tuxnes.sourceforge.net/mappers-0.80.txt

use serde::{Serialize, Deserialize};

use super::MapperControl;
use super::mem::Memory;
use crate::cart::{Cartridge, PRG_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE};
use crate::state::{self, StateError};

/// UNROM Mapper
pub struct Unrom {
    prg_rom: Memory,
    chr: Memory,
    rom_bank_selection: u8,
}

#[derive(Serialize, Deserialize)]
struct UnromState {
    rom_bank_selection: u8,
    chr_ram: Option<Vec<u8>>,
}

impl From<Cartridge> for Unrom {
    fn from(cart: Cartridge) -> Self {
        let (_, prg_rom, chr_rom, _) = cart.into_parts();

        Unrom {
            prg_rom: Memory::new(prg_rom, PRG_ROM_BANK_SIZE),
            chr: Memory::rom_or_ram(chr_rom, CHR_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE),
            rom_bank_selection: 0,
        }
    }
}

impl MapperControl for Unrom {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xBFFF => self.prg_rom.read(self.rom_bank_selection as usize, (addr - 0x8000) as usize),
            0xC000..=0xFFFF => self.prg_rom.read_last((addr - 0xC000) as usize),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let 0x8000..=0xFFFF = addr {
            self.rom_bank_selection = data;
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr.read_first(addr as usize)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.chr.write(0, addr as usize, value);
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::to_bytes(&UnromState {
            rom_bank_selection: self.rom_bank_selection,
            chr_ram: self.chr.snapshot(),
        })
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: UnromState = state::from_bytes(data)?;
        self.chr.restore(s.chr_ram.as_deref())?;
        self.rom_bank_selection = s.rom_bank_selection;

        Ok(())
    }
}
