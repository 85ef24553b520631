//
// mapper/base.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 28 2020
//

use serde::{Serialize, Deserialize};

use super::{MapperControl, Mirroring};
use crate::cart::Cartridge;
use crate::state::{self, StateError};

const NAMETABLE_RAM_SIZE: usize = kb!(4);
const PALETTE_RAM_SIZE: usize = 32;

/// Holds common mapper functionality: nametable VRAM and palette RAM
pub struct MapperBase<Mapper: MapperControl> {
    mapper: Mapper,

    // VRAM
    nametable_ram: Vec<u8>,
    palette_ram: Vec<u8>,
    mirror_v: bool,
    four_screen: bool,
}

#[derive(Serialize, Deserialize)]
struct BaseState {
    nametable_ram: Vec<u8>,
    palette_ram: Vec<u8>,
    board: Vec<u8>,
}

impl<Mapper: MapperControl + From<Cartridge>> From<Cartridge> for MapperBase<Mapper> {
    fn from(cart: Cartridge) -> Self {
        let mirror_v = cart.info.mirror_v;
        let four_screen = cart.info.four_screen_mode;

        MapperBase {
            mapper: Mapper::from(cart),

            nametable_ram: vec![0; NAMETABLE_RAM_SIZE],
            palette_ram: vec![0; PALETTE_RAM_SIZE],
            mirror_v,
            four_screen,
        }
    }
}

impl<Mapper: MapperControl> MapperControl for MapperBase<Mapper> {
    //------------------------------------------------------------------------------------------------------------------
    // PRG
    //------------------------------------------------------------------------------------------------------------------
    fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data)
    }

    //------------------------------------------------------------------------------------------------------------------
    // CHR
    //------------------------------------------------------------------------------------------------------------------
    fn read_chr(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.mapper.read_chr(addr),
            0x2000..=0x3EFF => self.nametable_ram[self.nametable_index(addr)],
            _ => self.palette_ram[mirror_palette(addr)],
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.mapper.write_chr(addr, value),
            0x2000..=0x3EFF => {
                let idx = self.nametable_index(addr);
                self.nametable_ram[idx] = value;
            },
            _ => self.palette_ram[mirror_palette(addr)] = value & 0x3F,
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(self.get_mirroring_type())
    }

    fn get_battery_ram(&self) -> Vec<u8> {
        self.mapper.get_battery_ram()
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        let s = BaseState {
            nametable_ram: self.nametable_ram.clone(),
            palette_ram: self.palette_ram.clone(),
            board: self.mapper.save_state()?,
        };
        state::to_bytes(&s)
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let s: BaseState = state::from_bytes(data)?;
        if s.nametable_ram.len() != NAMETABLE_RAM_SIZE || s.palette_ram.len() != PALETTE_RAM_SIZE {
            return Err(StateError::Inconsistent(String::from("video RAM size")));
        }

        self.mapper.load_state(&s.board)?;
        self.nametable_ram = s.nametable_ram;
        self.palette_ram = s.palette_ram;

        Ok(())
    }
}

impl<Mapper: MapperControl> MapperBase<Mapper> {
    fn nametable_index(&self, addr: u16) -> usize {
        // $3000-$3EFF mirrors $2000-$2EFF
        let addr = 0x2000 | (addr & 0x0FFF);

        let mirrored = if self.four_screen {
            // In Four Screen Mode, mirroring is disabled
            addr
        }
        else {
            helpers::calc_nametable_addr(addr, self.get_mirroring_type())
        };

        (mirrored - 0x2000) as usize
    }

    fn get_mirroring_type(&self) -> Mirroring {
        self.mapper.mirroring().unwrap_or(if self.mirror_v { Mirroring::Vertical } else { Mirroring::Horizontal })
    }
}

/// $3F10/$3F14/$3F18/$3F1C are the backdrop entries of the background palettes
fn mirror_palette(addr: u16) -> usize {
    let idx = (addr & 0x1F) as usize;
    match idx {
        0x10 | 0x14 | 0x18 | 0x1C => idx - 0x10,
        _ => idx,
    }
}

mod helpers {
    use super::Mirroring;

    /// Map a nametable address into the two physical 1 KB pages ($2000 and $2400)
    pub fn calc_nametable_addr(addr: u16, mirror_type: Mirroring) -> u16 {
        let offset = addr & 0x03FF;
        match mirror_type {
            Mirroring::Vertical => 0x2000 | (addr & 0x07FF),
            Mirroring::Horizontal => 0x2000 | ((addr & 0x0800) >> 1) | offset,
            Mirroring::OneScreenLower => 0x2000 | offset,
            Mirroring::OneScreenUpper => 0x2400 | offset,
        }
    }
}
