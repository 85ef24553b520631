//
// ppu/hw.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Feb 21 2020
//

use serde::{Serialize, Deserialize};

use crate::common::Clockable;

// http://wiki.nesdev.com/w/index.php/PPU_rendering

/// Two 16 bit shift registers used to process background data.
///
/// The high byte holds the tile being drawn. The next tile is loaded into the low byte.
/// Attribute bits use the same shifter with each plane filled with the palette bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TileRegister {
    plane0: u16,
    plane1: u16,
}

impl Clockable for TileRegister {
    fn tick(&mut self) {
        self.plane0 <<= 1;
        self.plane1 <<= 1;
    }
}

impl TileRegister {
    /// Load tile data into the lower bytes of the two shift registers
    pub fn load(&mut self, lo: u8, hi: u8) {
        self.plane0 = (self.plane0 & 0xFF00) | lo as u16;
        self.plane1 = (self.plane1 & 0xFF00) | hi as u16;
    }

    /// Load a 2-bit palette number, expanding each bit to a full byte
    pub fn load_attribute(&mut self, palette: u8) {
        let lo = if bit_is_set!(palette, 0) { 0xFF } else { 0x00 };
        let hi = if bit_is_set!(palette, 1) { 0xFF } else { 0x00 };
        self.load(lo, hi);
    }

    /// Get the value of the two registers combined at the fine x offset
    pub fn get_value(&self, fine_x: u8) -> u8 {
        let sel = 15 - (fine_x & 0x07);
        let lo = bit_as_value!(self.plane0, sel) as u8;
        let hi = bit_as_value!(self.plane1, sel) as u8;

        (hi << 1) | lo
    }
}

/// Sprite output unit for one of the eight sprites on a scanline
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteRegister {
    x_counter: u8,

    palette: u8,
    behind_background: bool,
    sprite_zero: bool,

    plane0: u8,
    plane1: u8,
}

impl Clockable for SpriteRegister {
    fn tick(&mut self) {
        if self.x_counter > 0 {
            self.x_counter -= 1;
        }
        else {
            self.plane0 <<= 1;
            self.plane1 <<= 1;
        }
    }
}

impl SpriteRegister {
    /// Pattern data must already be flipped horizontally if required. The leftmost pixel is bit 7
    pub fn new(x_pos: u8, pattern: (u8, u8), palette: u8, behind_background: bool, sprite_zero: bool) -> Self {
        SpriteRegister {
            x_counter: x_pos,
            palette,
            behind_background,
            sprite_zero,
            plane0: pattern.0,
            plane1: pattern.1,
        }
    }

    pub fn active(&self) -> bool {
        self.x_counter == 0
    }

    /// Current pixel value (0 is transparent)
    pub fn pixel(&self) -> u8 {
        if !self.active() {
            return 0;
        }

        let lo = bit_as_value!(self.plane0, 7);
        let hi = bit_as_value!(self.plane1, 7);

        (hi << 1) | lo
    }

    pub fn palette(&self) -> u8 {
        self.palette
    }

    pub fn behind_background(&self) -> bool {
        self.behind_background
    }

    pub fn is_sprite_zero(&self) -> bool {
        self.sprite_zero
    }
}
