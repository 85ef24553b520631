//
// cnrom.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jan 01 2021
//

use serde::{Serialize, Deserialize};

use super::MapperControl;
use super::mem::Memory;
use crate::cart::{Cartridge, PRG_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE};
use crate::state::{self, StateError};

///
/// CNROM
///
/// * CPU $8000-$FFFF: 16 KB PRG ROM, fixed (if 16 KB PRG ROM used, then this is the same as $C000-$FFFF)
/// * CPU $C000-$FFFF: 16 KB PRG ROM, fixed
/// * PPU $0000-$1FFF: 8 KB switchable CHR ROM bank
///
/// https://wiki.nesdev.com/w/index.php/CNROM
///
pub struct Cnrom {
    prg_rom: Memory,
    chr_rom: Memory,
    chr_rom_bank: u8,
}

#[derive(Serialize, Deserialize)]
struct CnromState {
    chr_rom_bank: u8,
}

impl From<Cartridge> for Cnrom {
    fn from(cart: Cartridge) -> Self {
        let (_, prg_rom, chr_rom, _) = cart.into_parts();

        Cnrom {
            prg_rom: Memory::new(prg_rom, PRG_ROM_BANK_SIZE),
            chr_rom: Memory::rom_or_ram(chr_rom, CHR_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE),
            chr_rom_bank: 0,
        }
    }
}

impl MapperControl for Cnrom {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => {
                let bank = ((addr - 0x8000) >> 14) as usize;
                self.prg_rom.read(bank, (addr & 0x3FFF) as usize)
            },
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let 0x8000..=0xFFFF = addr {
            self.chr_rom_bank = data;
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr_rom.read(self.chr_rom_bank as usize, (addr & 0x1FFF) as usize)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.chr_rom.write(self.chr_rom_bank as usize, (addr & 0x1FFF) as usize, value);
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::to_bytes(&CnromState { chr_rom_bank: self.chr_rom_bank })
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: CnromState = state::from_bytes(data)?;
        self.chr_rom_bank = s.chr_rom_bank;

        Ok(())
    }
}
