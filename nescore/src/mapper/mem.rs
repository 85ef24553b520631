//
// mapper/mem.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Dec 27 2019
//

use crate::state::StateError;

/// Representation of a banked memory block in the mapper
pub struct Memory {
    mem: Vec<u8>,
    bank_size: usize,
    writable: bool,
}

impl Memory {
    /// Read only memory
    pub fn new(mem: Vec<u8>, bank_size: usize) -> Self {
        Memory {
            mem,
            bank_size,
            writable: false,
        }
    }

    /// Zero initialized RAM
    pub fn ram(size: usize, bank_size: usize) -> Self {
        Memory {
            mem: vec![0; size],
            bank_size,
            writable: true,
        }
    }

    /// Boards without CHR ROM carry CHR RAM instead
    pub fn rom_or_ram(rom: Vec<u8>, ram_size: usize, bank_size: usize) -> Self {
        if rom.is_empty() {
            Memory::ram(ram_size, bank_size)
        }
        else {
            Memory::new(rom, bank_size)
        }
    }

    pub fn num_banks(&self) -> usize {
        std::cmp::max(1, self.mem.len() / self.bank_size)
    }

    /// Bank numbers wrap around the available banks, like unconnected address lines on the board
    pub fn read(&self, bank: usize, index: usize) -> u8 {
        let offset = self.get_bank_offset(bank) + index;
        self.mem.get(offset).copied().unwrap_or(0)
    }

    pub fn read_first(&self, index: usize) -> u8 {
        self.read(0, index)
    }

    pub fn read_last(&self, index: usize) -> u8 {
        self.read(self.num_banks() - 1, index)
    }

    pub fn write(&mut self, bank: usize, index: usize, data: u8) {
        if !self.writable {
            return;
        }

        let offset = self.get_bank_offset(bank) + index;
        if let Some(byte) = self.mem.get_mut(offset) {
            *byte = data;
        }
    }

    pub fn set_bank_size(&mut self, bank_size: usize) {
        self.bank_size = bank_size;
    }

    /// Contents worth saving. ROM is never part of a save state
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        if self.writable { Some(self.mem.clone()) } else { None }
    }

    pub fn restore(&mut self, data: Option<&[u8]>) -> Result<(), StateError> {
        match data {
            Some(data) if self.writable && data.len() == self.mem.len() => {
                self.mem.copy_from_slice(data);
                Ok(())
            },
            None if !self.writable => Ok(()),
            _ => Err(StateError::Inconsistent(String::from("cartridge memory layout differs"))),
        }
    }

    fn get_bank_offset(&self, bank_num: usize) -> usize {
        (bank_num % self.num_banks()) * self.bank_size
    }
}
