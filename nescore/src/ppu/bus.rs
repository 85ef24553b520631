//
// ppu/bus.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Feb 11 2020
//

use crate::common::{IoAccess, IoAccessWeak, Interrupt};
use crate::mapper::Mapper;

/// PPU address space. Pattern tables, nametables and palette RAM are all owned by the cartridge mapper
pub struct PpuIoBus {
    cpu: IoAccessWeak,
    mapper: Mapper,
}

impl PpuIoBus {
    pub fn new(cpu: IoAccessWeak, mapper: Mapper) -> Self {
        PpuIoBus {
            cpu,
            mapper,
        }
    }
}

impl IoAccess for PpuIoBus {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.mapper.borrow().read_chr(addr & 0x3FFF)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.mapper.borrow_mut().write_chr(addr & 0x3FFF, value);
    }

    fn raise_interrupt(&mut self, interrupt_type: Interrupt) {
        if let Some(cpu) = self.cpu.upgrade() {
            cpu.borrow_mut().raise_interrupt(interrupt_type);
        }
    }
}
