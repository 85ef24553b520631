//
// mapper/mmc1.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Dec 26 2019
//

use serde::{Serialize, Deserialize};

use super::{MapperControl, Mirroring};
use super::mem::Memory;
use crate::cart::{Cartridge, PRG_ROM_BANK_SIZE, CHR_ROM_BANK_SIZE};
use crate::state::{self, StateError};

const PRG_RAM_SIZE: usize = kb!(8);
const CHR_BANK_SIZE: usize = kb!(4);
const SHIFT_REGISTER_INIT_VALUE: u8 = 0x10;

/// Program ROM Bank Mode Options
#[derive(Debug, PartialEq)]
enum PrgRomBankMode {
    Switch32K,
    FixFirst,
    FixLast,
}

/// Serial loaded registers
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Registers {
    shift: u8,
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            shift: SHIFT_REGISTER_INIT_VALUE,
            // Power on in fixed last bank mode
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Mmc1State {
    regs: Registers,
    prg_ram: Vec<u8>,
    chr_ram: Option<Vec<u8>>,
}

/// MMC1 Mapper
/// https://wiki.nesdev.com/w/index.php/MMC1
pub struct Mmc1 {
    prg_rom: Memory,  // Program ROM, 16K banks
    prg_ram: Vec<u8>, // Program RAM
    chr: Memory,      // Character ROM or RAM, 4K banks
    regs: Registers,
}

impl From<Cartridge> for Mmc1 {
    fn from(cart: Cartridge) -> Self {
        let (_, prg_rom, chr_rom, sav_ram) = cart.into_parts();

        let mut prg_ram = vec![0u8; PRG_RAM_SIZE];
        let n = std::cmp::min(sav_ram.len(), PRG_RAM_SIZE);
        prg_ram[..n].copy_from_slice(&sav_ram[..n]);

        Mmc1 {
            prg_rom: Memory::new(prg_rom, PRG_ROM_BANK_SIZE),
            prg_ram,
            chr: Memory::rom_or_ram(chr_rom, CHR_ROM_BANK_SIZE, CHR_BANK_SIZE),
            regs: Registers::default(),
        }
    }
}

impl Mmc1 {
    fn load_shift_register(&mut self, data: u8) -> Option<u8> {
        // The initial marker bit reaching bit 0 means this is the fifth write
        let final_write = bit_is_set!(self.regs.shift, 0);

        self.regs.shift = (self.regs.shift >> 1) | ((data & 0x01) << 4);

        if final_write {
            let sr = self.regs.shift;
            self.regs.shift = SHIFT_REGISTER_INIT_VALUE;

            Some(sr)
        }
        else {
            None
        }
    }

    fn write_registers(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.regs.control = value,
            0xA000..=0xBFFF => self.regs.chr_bank0 = value,
            0xC000..=0xDFFF => self.regs.chr_bank1 = value,
            _ => self.regs.prg_bank = value,
        }
    }

    fn prg_rom_bank_mode(&self) -> PrgRomBankMode {
        match bit_group!(self.regs.control, 0x03, 2) {
            0 | 1 => PrgRomBankMode::Switch32K,
            2     => PrgRomBankMode::FixFirst,
            _     => PrgRomBankMode::FixLast,
        }
    }

    /// 16K bank mapped at the given CPU address
    fn prg_bank(&self, addr: u16) -> usize {
        let bank = (self.regs.prg_bank & 0x0F) as usize;
        let upper = addr >= 0xC000;
        // 512K boards use CHR bank bit 4 to select the PRG ROM half
        let outer = if self.prg_rom.num_banks() > 16 { (self.regs.chr_bank0 & 0x10) as usize } else { 0 };

        let bank = match self.prg_rom_bank_mode() {
            PrgRomBankMode::Switch32K => (bank & !1) | upper as usize,
            PrgRomBankMode::FixFirst  => if upper { bank } else { 0 },
            PrgRomBankMode::FixLast   => if upper { 0x0F } else { bank },
        };

        outer | bank
    }

    /// 4K bank mapped at the given PPU address
    fn chr_bank(&self, addr: u16) -> usize {
        let upper = addr >= 0x1000;

        if bit_is_set!(self.regs.control, 4) {
            if upper { self.regs.chr_bank1 as usize } else { self.regs.chr_bank0 as usize }
        }
        else {
            ((self.regs.chr_bank0 & 0x1E) as usize) | upper as usize
        }
    }
}

impl MapperControl for Mmc1 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[(addr - 0x6000) as usize]
            },
            0x8000..=0xFFFF => {
                self.prg_rom.read(self.prg_bank(addr), (addr & 0x3FFF) as usize)
            },
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[(addr - 0x6000) as usize] = value;
            },
            0x8000..=0xFFFF => {
                if bit_is_set!(value, 7) {
                    self.regs.shift = SHIFT_REGISTER_INIT_VALUE;
                    self.regs.control |= 0x0C;
                }
                else if let Some(value) = self.load_shift_register(value) {
                    self.write_registers(addr, value);
                }
            },
            _ => {},
        }
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr.read(self.chr_bank(addr), (addr & 0x0FFF) as usize)
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        let bank = self.chr_bank(addr);
        self.chr.write(bank, (addr & 0x0FFF) as usize, value);
    }

    fn mirroring(&self) -> Option<Mirroring> {
        let mirroring = match self.regs.control & 0x03 {
            0 => Mirroring::OneScreenLower,
            1 => Mirroring::OneScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };

        Some(mirroring)
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::to_bytes(&Mmc1State {
            regs: self.regs.clone(),
            prg_ram: self.prg_ram.clone(),
            chr_ram: self.chr.snapshot(),
        })
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: Mmc1State = state::from_bytes(data)?;
        if s.prg_ram.len() != PRG_RAM_SIZE {
            return Err(StateError::Inconsistent(String::from("PRG RAM size")));
        }

        self.chr.restore(s.chr_ram.as_deref())?;
        self.prg_ram = s.prg_ram;
        self.regs = s.regs;

        Ok(())
    }
}
