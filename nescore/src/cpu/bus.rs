//
// cpu/bus.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 21 2019
//

use crate::common::{IoAccess, IoAccessRef};
use crate::mapper::Mapper;
use super::memorymap::*;

/// CPU address space: internal RAM, PPU registers, joypads and the cartridge
pub struct CpuIoBus {
    ram: Vec<u8>, // CPU RAM
    ppu: IoAccessRef,
    joy: IoAccessRef,
    mapper: Mapper,
}

fn mirror_address(addr: u16, base: u16, count: u16) -> u16 {
    base + (addr % count)
}

impl CpuIoBus {
    pub fn new(ppu_io: IoAccessRef, joy_io: IoAccessRef, mapper: Mapper) -> Self {
        CpuIoBus {
            ram: vec![0x00; INTERNAL_RAM_SIZE],
            ppu: ppu_io,
            joy: joy_io,
            mapper,
        }
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for i in 0..256 {
            let cpu_byte = self.read_byte(base + i);
            // OAMDATA write, starting from the current OAM address
            self.ppu.borrow_mut().write_byte(0x2004, cpu_byte);
        }
    }
}

impl IoAccess for CpuIoBus {
    fn read_byte(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=INTERNAL_RAM_END => self.ram[mirror_address(addr, 0x0000, INTERNAL_RAM_SIZE as u16) as usize],
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                // First 8 bytes are mirrored up to $3FFF
                self.ppu.borrow_mut().read_byte(mirror_address(addr, 0x2000, 8))
            },
            JOY1 | JOY2 => self.joy.borrow_mut().read_byte(addr),
            0x4000..=0x401F => 0,
            _ => self.mapper.borrow().read(addr),
        }
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=INTERNAL_RAM_END => self.ram[mirror_address(addr, 0x0000, INTERNAL_RAM_SIZE as u16) as usize] = data,
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                self.ppu.borrow_mut().write_byte(mirror_address(addr, 0x2000, 8), data);
            },
            OAM_DMA => self.oam_dma(data),
            JOY1 => self.joy.borrow_mut().write_byte(addr, data),
            // APU registers are not emulated
            0x4000..=0x401F => {},
            _ => self.mapper.borrow_mut().write(addr, data),
        }
    }
}
