//
// axrom.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Apr 15 2021
//

use serde::{Serialize, Deserialize};

use super::{MapperControl, Mirroring};
use super::mem::Memory;
use crate::cart::{Cartridge, CHR_ROM_BANK_SIZE};
use crate::state::{self, StateError};

/// AxROM: 32K PRG bank switching and one screen mirroring
/// https://wiki.nesdev.com/w/index.php/AxROM
pub struct Axrom {
    prg_rom: Memory,
    chr: Memory,
    bank_select: u8,
    single_screen_select: bool,
}

#[derive(Serialize, Deserialize)]
struct AxromState {
    bank_select: u8,
    single_screen_select: bool,
    chr_ram: Option<Vec<u8>>,
}

impl From<Cartridge> for Axrom {
    fn from(cart: Cartridge) -> Self {
        let (_, prg_rom, chr_rom, _) = cart.into_parts();

        Axrom {
            prg_rom: Memory::new(prg_rom, kb!(32)),
            chr: Memory::rom_or_ram(chr_rom, CHR_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE),
            bank_select: 0,
            single_screen_select: false,
        }
    }
}

impl MapperControl for Axrom {
    fn read(&self, addr: u16) -> u8 {
        if let 0x8000..=0xFFFF = addr {
            self.prg_rom.read(self.bank_select as usize, (addr - 0x8000) as usize)
        }
        else {
            0
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let 0x8000..=0xFFFF = addr {
            self.bank_select = data & 0x07;
            self.single_screen_select = bit_is_set!(data, 4);
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr.read_first(addr as usize)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        self.chr.write(0, addr as usize, value);
    }

    fn mirroring(&self) -> Option<Mirroring> {
        if self.single_screen_select {
            Some(Mirroring::OneScreenUpper)
        }
        else {
            Some(Mirroring::OneScreenLower)
        }
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::to_bytes(&AxromState {
            bank_select: self.bank_select,
            single_screen_select: self.single_screen_select,
            chr_ram: self.chr.snapshot(),
        })
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: AxromState = state::from_bytes(data)?;
        self.chr.restore(s.chr_ram.as_deref())?;
        self.bank_select = s.bank_select;
        self.single_screen_select = s.single_screen_select;

        Ok(())
    }
}
