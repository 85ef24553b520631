//
// nes.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 17 2020
//
use crate::cart::{Cartridge, CartridgeError};
use crate::cpu::{Cpu, bus::CpuIoBus, memorymap::INTERNAL_RAM_SIZE};
use crate::ppu::{Ppu, bus::PpuIoBus, Pixel, CYCLES_PER_FRAME};
use crate::joy::{Joy, Controller, Button};
use crate::mapper::Mapper;
use crate::common::{Clockable, IoAccessRef};
use crate::state::{NesState, StateError};
use crate::palette;

use crate::ppu::{DISPLAY_WIDTH, DISPLAY_HEIGHT};

use std::convert::TryFrom;
use std::rc::Rc;
use std::cell::RefCell;

/// Size of the display frame buffer in palette indices
pub const FRAME_BUFFER_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;
/// Size of an RGB24 frame
pub const RGB_FRAME_SIZE: usize = FRAME_BUFFER_SIZE * 3;

/// Upper bound on PPU cycles spent waiting for a frame. A frame normally completes in `CYCLES_PER_FRAME`
const FRAME_CYCLE_LIMIT: usize = CYCLES_PER_FRAME * 2;
/// Upper bound on PPU cycles for `run_until`
const RUN_UNTIL_CYCLE_LIMIT: usize = CYCLES_PER_FRAME * 60;

/// Sequencer event
#[derive(Clone, Copy)]
enum Event {
    Cpu, Ppu, None,
}

type SequencerEvents = [Event; 2];

/// Component frame sequencer. The PPU runs three cycles for every CPU cycle
#[derive(Default)]
struct FrameSequencer {
    counter: u8,
}

impl Clockable<SequencerEvents> for FrameSequencer {
    fn tick(&mut self) -> SequencerEvents {
        let events = match self.counter {
            0 => [Event::Ppu, Event::Cpu],
            _ => [Event::Ppu, Event::None],
        };

        self.counter = (self.counter + 1) % 3;

        events
    }
}

/// Representation of the NES system
pub struct Nes {
    cpu: Rc<RefCell<Cpu<CpuIoBus>>>, // NES Central Processing Unit
    ppu: Rc<RefCell<Ppu<PpuIoBus>>>, // NES Picture Processing Unit
    joy: Rc<RefCell<Joy>>,           // NES Joystick
    mapper: Option<Mapper>,          // Cartridge Mapper

    sequencer: FrameSequencer,

    frame: Vec<u8>,                  // Last completed frame as palette indices
    frame_count: u64,
    rom_checksum: u32,
}

impl Default for Nes {
    fn default() -> Self {
        Nes {
            cpu: Rc::default(),
            ppu: Rc::default(),
            joy: Rc::default(),
            mapper: None,

            sequencer: FrameSequencer::default(),

            frame: vec![0; FRAME_BUFFER_SIZE],
            frame_count: 0,
            rom_checksum: 0,
        }
    }
}

impl Nes {
    /// Directly set the CPU entry point
    /// ```
    /// # use nescore::Nes;
    /// let nes = Nes::default().entry(0xC000);
    /// ```
    pub fn entry(self, entry_addr: u16) -> Self {
        self.cpu.borrow_mut().set_pc(entry_addr);
        self
    }

    /// Builder function to allow inserting the cartridge
    pub fn with_cart(mut self, cart: Cartridge) -> Result<Self, CartridgeError> {
        self.insert(cart)?;
        Ok(self)
    }

    /// Builder function to set debug mode
    /// ```
    /// # use nescore::Nes;
    /// let nes = Nes::default().debug_mode(true);
    /// ```
    pub fn debug_mode(self, debug: bool) -> Self {
        self.cpu.borrow_mut().set_debug(debug);
        self
    }

    /// Run the emulator until the PPU finishes the visible part of the next frame
    /// ```no_run
    /// # use nescore::{Nes, Cartridge};
    /// # use std::convert::TryFrom;
    /// let mut nes = Nes::try_from(Cartridge::from_path("/path/to/rom").unwrap()).unwrap();
    /// let frame = nes.emulate_frame();
    /// ```
    ///
    /// Returns the frame as NES palette indices, one byte per pixel
    pub fn emulate_frame(&mut self) -> &[u8] {
        if self.mapper.is_some() {
            for _ in 0..FRAME_CYCLE_LIMIT {
                if let Some(pixel) = self.clock_components() {
                    self.frame[pixel.y * DISPLAY_WIDTH + pixel.x] = pixel.color;
                }

                if self.ppu.borrow_mut().take_frame_complete() {
                    break;
                }
            }

            self.frame_count += 1;
        }

        &self.frame
    }

    /// Apply a button input into the emulator
    /// ```
    /// # use nescore::{Nes, Button};
    /// # let mut nes = Nes::default();
    /// nes.input(Button::A, true);
    /// ```
    pub fn input(&mut self, btn: Button, pressed: bool) {
        self.joy.borrow_mut().input(btn, pressed);
    }

    /// Apply a button input to the emulator from the specified controller
    /// ```
    /// # use nescore::{Nes, Button, Controller};
    /// # let mut nes = Nes::default();
    /// // Send an `A` button press to input 1
    /// nes.controller_input(Controller::Input1, Button::A, true);
    /// // Send an `A` button press to input 2
    /// nes.controller_input(Controller::Input2, Button::A, true);
    /// ```
    pub fn controller_input(&mut self, controller: Controller, btn: Button, pressed: bool) {
        self.joy.borrow_mut().controller_input(controller, btn, pressed);
    }

    /// Set every button of a controller at once. Bit n is `Button` n
    pub fn set_buttons(&mut self, controller: Controller, buttons: u8) {
        self.joy.borrow_mut().set_buttons(controller, buttons);
    }

    /// Run until the CPU's PC is at address **addr**. Returns false if the address was not reached
    pub fn run_until(&mut self, addr: u16) -> bool {
        if self.mapper.is_none() {
            return false;
        }

        for _ in 0..RUN_UNTIL_CYCLE_LIMIT {
            if self.cpu.borrow().get_pc() == addr {
                return true;
            }
            self.clock_components();
        }

        false
    }

    /// Soft reset. The CPU reloads the reset vector, memory is left intact
    pub fn reset(&mut self) {
        self.cpu.borrow_mut().reset();
    }

    /// Clock the NES components
    fn clock_components(&mut self) -> Option<Pixel> {
        let mut pixel: Option<Pixel> = None;

        for event in self.sequencer.tick().iter() {
            match event {
                Event::Ppu => {
                    pixel = self.ppu.borrow_mut().tick();
                },
                Event::Cpu => {
                    self.cpu.borrow_mut().tick();
                },
                Event::None => {},
            }
        }

        pixel
    }

    /// Check if the CPU is in an infinite loop state
    pub fn is_holding(&self) -> bool {
        self.cpu.borrow().is_holding()
    }

    /// Load a cartridge
    pub fn insert(&mut self, cart: Cartridge) -> Result<(), CartridgeError> {
        let rom_checksum = cart.checksum();

        // Consume provided cartridge and get the mapper
        let mapper = crate::mapper::from_cartridge(cart)?;

        // Complete initialization of components
        let ppu_io: IoAccessRef = self.ppu.clone();
        let joy_io: IoAccessRef = self.joy.clone();
        let cpu_bus = CpuIoBus::new(ppu_io, joy_io, mapper.clone());
        self.cpu.borrow_mut().load_bus(cpu_bus);

        let cpu_io: IoAccessRef = self.cpu.clone();
        let ppu_bus = PpuIoBus::new(Rc::downgrade(&cpu_io), mapper.clone());
        self.ppu.borrow_mut().load_bus(ppu_bus);

        self.mapper = Some(mapper);
        self.rom_checksum = rom_checksum;

        Ok(())
    }

    /// Eject the cartridge, returning the battery backed RAM
    /// ```
    /// # use nescore::Nes;
    /// let nes = Nes::default();
    /// // This consumes the nes instance
    /// let battery_ram = nes.eject();
    /// ```
    pub fn eject(self) -> Vec<u8> {
        self.mapper.map_or(vec![], |mapper| mapper.borrow().get_battery_ram())
    }

    //------------------------------------------------------------------------------------------------------------------
    // Save states
    //------------------------------------------------------------------------------------------------------------------

    /// Capture the complete machine state
    pub fn save_state(&self) -> Result<NesState, StateError> {
        let mapper = self.mapper.as_ref().ok_or_else(|| StateError::Inconsistent("no cartridge inserted".into()))?;

        Ok(NesState {
            cpu: self.cpu.borrow().save_state(),
            ppu: self.ppu.borrow().save_state(),
            joy: self.joy.borrow().clone(),
            ram: self.cpu_ram(),
            mapper: mapper.borrow().save_state()?,
            sequencer: self.sequencer.counter,
        })
    }

    /// Restore a machine state. The cartridge the state was taken from must already be inserted
    pub fn load_state(&mut self, state: &NesState) -> Result<(), StateError> {
        let mapper = self.mapper.as_ref().ok_or_else(|| StateError::Inconsistent("no cartridge inserted".into()))?;

        if state.ram.len() != INTERNAL_RAM_SIZE {
            return Err(StateError::Inconsistent(format!("CPU RAM is {} bytes", state.ram.len())));
        }

        mapper.borrow_mut().load_state(&state.mapper)?;

        {
            let mut cpu = self.cpu.borrow_mut();
            cpu.load_state(&state.cpu);
            if let Some(bus) = cpu.bus_mut() {
                bus.ram_mut().copy_from_slice(&state.ram);
            }
        }

        self.ppu.borrow_mut().load_state(&state.ppu);
        *self.joy.borrow_mut() = state.joy.clone();
        self.sequencer.counter = state.sequencer % 3;

        Ok(())
    }

    /// CRC-32 of the inserted cartridge's ROM
    pub fn rom_checksum(&self) -> u32 {
        self.rom_checksum
    }

    //------------------------------------------------------------------------------------------------------------------
    // Inspect the state of the NES system
    //------------------------------------------------------------------------------------------------------------------

    /// Get the CPU's program counter
    pub fn get_program_counter(&self) -> u16 {
        self.cpu.borrow().get_pc()
    }

    /// Read the byte, at the specified address, from CPU's internal RAM
    pub fn read_cpu_ram(&self, addr: u16) -> u8 {
        let cpu = self.cpu.borrow();
        cpu.bus().map_or(0, |bus| bus.ram()[addr as usize % INTERNAL_RAM_SIZE])
    }

    /// Write a byte to CPU's internal RAM
    pub fn write_cpu_ram(&mut self, addr: u16, value: u8) {
        if let Some(bus) = self.cpu.borrow_mut().bus_mut() {
            bus.ram_mut()[addr as usize % INTERNAL_RAM_SIZE] = value;
        }
    }

    /// Copy of the 2KB CPU internal RAM
    pub fn cpu_ram(&self) -> Vec<u8> {
        let mut ram = vec![0; INTERNAL_RAM_SIZE];
        self.copy_cpu_ram(&mut ram);
        ram
    }

    /// Copy CPU internal RAM into `out`. Returns the number of bytes copied
    pub fn copy_cpu_ram(&self, out: &mut [u8]) -> usize {
        let cpu = self.cpu.borrow();
        match cpu.bus() {
            Some(bus) => {
                let n = out.len().min(INTERNAL_RAM_SIZE);
                out[..n].copy_from_slice(&bus.ram()[..n]);
                n
            },
            None => 0,
        }
    }

    /// Read directly from VRAM
    pub fn read_ppu_memory(&self, addr: u16) -> u8 {
        self.ppu.borrow_mut().read_vram(addr)
    }

    /// Read a tile from the current nametable
    pub fn read_tile(&self, nametable: u16, x: usize, y: usize) -> u8 {
        self.ppu.borrow_mut().read_tile(nametable, x, y)
    }

    /// Last completed frame as NES palette indices
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Replace the displayed frame, e.g. with one captured alongside a save state
    pub fn set_frame(&mut self, frame: &[u8]) {
        let len = frame.len().min(FRAME_BUFFER_SIZE);
        self.frame[..len].copy_from_slice(&frame[..len]);
    }

    /// Last completed frame as RGB24
    pub fn frame_rgb(&self) -> Vec<u8> {
        let mut rgb = vec![0; RGB_FRAME_SIZE];
        palette::fill_rgb(&self.frame, &mut rgb);
        rgb
    }

    /// Number of frames emulated since power on
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl TryFrom<Cartridge> for Nes {
    type Error = CartridgeError;

    fn try_from(cart: Cartridge) -> Result<Self, Self::Error> {
        Nes::default().with_cart(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cartridge() {
        let mut nes = Nes::default();

        assert_eq!(nes.emulate_frame().len(), FRAME_BUFFER_SIZE);
        assert_eq!(nes.frame_count(), 0);
        assert_eq!(nes.read_cpu_ram(0x0000), 0);
        assert!(!nes.run_until(0x8000));
        assert!(nes.save_state().is_err());
        assert!(nes.eject().is_empty());
    }

    #[test]
    fn sequencer_clocks_cpu_every_third_cycle() {
        let mut sequencer = FrameSequencer::default();

        let cpu_ticks = (0..9)
            .map(|_| sequencer.tick())
            .filter(|events| matches!(events[1], Event::Cpu))
            .count();

        assert_eq!(cpu_ticks, 3);
    }
}
