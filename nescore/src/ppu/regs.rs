//
// ppu/regs.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Feb 07 2020
//

use serde::{Serialize, Deserialize};

use crate::common::Register;

/// PPU Control Register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PpuCtrl {
    pub base_nametable_address: u8,     // Base nametable address (0=$2000, 1=$2400, 2=$2800, 3=$2C00)
    pub inc_mode: bool,                 // VRAM address increment mode (0: Add 1, 1: Add 32)
    pub sprite_pattern_table: bool,     // Sprite pattern table address (0: $0000, 1: $1000)
    pub background_pattern_table: bool, // Background pattern table address (0: $0000, 1: $1000)
    pub sprite_size: bool,              // 0: 8x8, 1: 8x16
    pub master_slave_select: bool,      // Master slave, select
    pub nmi_enable: bool,               // Generate NMI on Vblank
}

impl PpuCtrl {
    pub fn vram_increment(&self) -> u16 {
        if self.inc_mode { 32 } else { 1 }
    }

    pub fn background_pattern_table(&self) -> u16 {
        self.background_pattern_table as u16 * 0x1000
    }

    pub fn sprite_pattern_table(&self) -> u16 {
        self.sprite_pattern_table as u16 * 0x1000
    }

    pub fn sprite_height(&self) -> u8 {
        (self.sprite_size as u8 * 8) + 8
    }
}

impl Register<u8> for PpuCtrl {
    fn load(&mut self, value: u8) {
        self.base_nametable_address = value & 0x03;
        self.inc_mode = bit_is_set!(value, 2);
        self.sprite_pattern_table = bit_is_set!(value, 3);
        self.background_pattern_table = bit_is_set!(value, 4);
        self.sprite_size = bit_is_set!(value, 5);
        self.master_slave_select = bit_is_set!(value, 6);
        self.nmi_enable = bit_is_set!(value, 7);
    }

    fn value(&self) -> u8 {
        self.base_nametable_address
        | (self.inc_mode as u8) << 2
        | (self.sprite_pattern_table as u8) << 3
        | (self.background_pattern_table as u8) << 4
        | (self.sprite_size as u8) << 5
        | (self.master_slave_select as u8) << 6
        | (self.nmi_enable as u8) << 7
    }
}

/// PPU Status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PpuStatus {
    pub lsb: u8,               // Least significant bits of the previous write to a PPU register
    pub sprite_overflow: bool, // More than 8 sprites on a scanline
    pub sprite0_hit: bool,     // Set when a non-zero pixel of sprite 0 overlaps a nonzero background pixel.
    pub vblank: bool,          // Set when PPU enters vertical blanking period
}

impl Register<u8> for PpuStatus {
    fn value(&self) -> u8 {
        (self.lsb & 0x1F)
        | (self.sprite_overflow as u8) << 5
        | (self.sprite0_hit as u8) << 6
        | (self.vblank as u8) << 7
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PpuMask {
    pub greyscale: bool,            // Grey scale render mode
    pub show_background_left: bool, // Show background in left most 8 pixels of the screen
    pub show_sprites_left: bool,    // Show sprites in left most 8 pixels of the screen
    pub background_enabled: bool,   // Show background
    pub sprites_enabled: bool,      // Show sprites
    pub emphasize_red: bool,        // Emphasize Red
    pub emphasize_green: bool,      // Emphasize Green
    pub emphasize_blue: bool,       // Emphasize Blue
}

impl PpuMask {
    pub fn rendering_enabled(&self) -> bool {
        self.background_enabled || self.sprites_enabled
    }
}

impl Register<u8> for PpuMask {
    fn load(&mut self, value: u8) {
        self.greyscale = bit_is_set!(value, 0);
        self.show_background_left = bit_is_set!(value, 1);
        self.show_sprites_left = bit_is_set!(value, 2);
        self.background_enabled = bit_is_set!(value, 3);
        self.sprites_enabled = bit_is_set!(value, 4);
        self.emphasize_red = bit_is_set!(value, 5);
        self.emphasize_green = bit_is_set!(value, 6);
        self.emphasize_blue = bit_is_set!(value, 7);
    }

    fn value(&self) -> u8 {
        self.greyscale as u8
        | (self.show_background_left as u8) << 1
        | (self.show_sprites_left as u8) << 2
        | (self.background_enabled as u8) << 3
        | (self.sprites_enabled as u8) << 4
        | (self.emphasize_red as u8) << 5
        | (self.emphasize_green as u8) << 6
        | (self.emphasize_blue as u8) << 7
    }
}

/// Internal VRAM address (the `v` and `t` registers).
///
/// ```text
/// yyy NN YYYYY XXXXX
/// ||| || ||||| +++++-- coarse X scroll
/// ||| || +++++-------- coarse Y scroll
/// ||| ++-------------- nametable select
/// +++----------------- fine Y scroll
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VramAddr(pub u16);

impl VramAddr {
    pub fn coarse_x(&self) -> u16 {
        self.0 & 0x001F
    }

    pub fn coarse_y(&self) -> u16 {
        (self.0 >> 5) & 0x001F
    }

    pub fn nametable(&self) -> u16 {
        (self.0 >> 10) & 0x0003
    }

    pub fn fine_y(&self) -> u16 {
        (self.0 >> 12) & 0x0007
    }

    pub fn set_coarse_x(&mut self, value: u8) {
        self.0 = (self.0 & !0x001F) | (value as u16 & 0x1F);
    }

    pub fn set_coarse_y(&mut self, value: u8) {
        self.0 = (self.0 & !0x03E0) | ((value as u16 & 0x1F) << 5);
    }

    pub fn set_nametable(&mut self, value: u8) {
        self.0 = (self.0 & !0x0C00) | ((value as u16 & 0x03) << 10);
    }

    pub fn set_fine_y(&mut self, value: u8) {
        self.0 = (self.0 & !0x7000) | ((value as u16 & 0x07) << 12);
    }

    /// Address of the nametable byte for the current tile
    pub fn tile_addr(&self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Address of the attribute byte for the current tile
    pub fn attribute_addr(&self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.coarse_y() >> 2) << 3) | (self.coarse_x() >> 2)
    }

    /// Move to the next tile, wrapping into the horizontally adjacent nametable
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !0x001F;
            self.0 ^= 0x0400;
        }
        else {
            self.0 += 1;
        }
    }

    /// Move to the next pixel row, wrapping into the vertically adjacent nametable
    pub fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.0 += 0x1000;
            return;
        }

        self.0 &= !0x7000;

        let y = self.coarse_y();
        if y == 29 {
            self.set_coarse_y(0);
            self.0 ^= 0x0800;
        }
        else if y == 31 {
            // Out of bounds rows wrap without switching nametables
            self.set_coarse_y(0);
        }
        else {
            self.set_coarse_y(y as u8 + 1);
        }
    }

    /// Copy horizontal position bits from `t`
    pub fn copy_horizontal(&mut self, t: VramAddr) {
        self.0 = (self.0 & !0x041F) | (t.0 & 0x041F);
    }

    /// Copy vertical position bits from `t`
    pub fn copy_vertical(&mut self, t: VramAddr) {
        self.0 = (self.0 & !0x7BE0) | (t.0 & 0x7BE0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppuctrl() {
        let ctrl = PpuCtrl::new(0xFF);

        assert_eq!(ctrl.base_nametable_address, 0x03);
        assert_eq!(ctrl.inc_mode, true);
        assert_eq!(ctrl.sprite_pattern_table, true);
        assert_eq!(ctrl.background_pattern_table, true);
        assert_eq!(ctrl.sprite_size, true);
        assert_eq!(ctrl.master_slave_select, true);
        assert_eq!(ctrl.nmi_enable, true);

        let value = ctrl.value();
        assert_eq!(value, 0xFF);
    }

    #[test]
    fn sprite_height() {
        let mut ctrl = PpuCtrl::default();

        ctrl.load(0x00);
        assert_eq!(ctrl.sprite_height(), 8);

        ctrl.load(0x20);
        assert_eq!(ctrl.sprite_height(), 16);
    }

    #[test]
    fn ppustatus() {
        let mut status = PpuStatus::default();
        status.sprite0_hit = true;
        status.sprite_overflow = true;
        status.vblank = true;

        let value: u8 = status.value();

        assert_eq!(value, 0xE0);
    }

    #[test]
    fn ppustatus_lsb() {
        let mut status = PpuStatus::default();
        status.lsb = 0xFF;

        assert_eq!(status.value(), 0x1F);
    }

    #[test]
    fn ppumask() {
        let mut mask = PpuMask::default();
        mask.load(0xFF);

        assert_eq!(mask.greyscale, true);
        assert_eq!(mask.show_background_left, true);
        assert_eq!(mask.show_sprites_left, true);
        assert_eq!(mask.background_enabled, true);
        assert_eq!(mask.sprites_enabled, true);
        assert_eq!(mask.emphasize_red, true);
        assert_eq!(mask.emphasize_blue, true);
        assert_eq!(mask.emphasize_green, true);
        assert_eq!(mask.value(), 0xFF);

        mask.load(0x00);
        assert!(!mask.rendering_enabled());
    }

    #[test]
    fn vram_addr_fields() {
        let mut v = VramAddr::default();
        v.set_coarse_x(0x1F);
        v.set_coarse_y(0x1D);
        v.set_nametable(0x02);
        v.set_fine_y(0x05);

        assert_eq!(v.coarse_x(), 0x1F);
        assert_eq!(v.coarse_y(), 0x1D);
        assert_eq!(v.nametable(), 0x02);
        assert_eq!(v.fine_y(), 0x05);
        assert_eq!(v.0, 0x5BBF);
    }

    #[test]
    fn increment_x_wraps_nametable() {
        let mut v = VramAddr::default();
        v.set_coarse_x(31);

        v.increment_x();

        assert_eq!(v.coarse_x(), 0);
        assert_eq!(v.nametable(), 1);
    }

    #[test]
    fn increment_y_wraps_nametable() {
        let mut v = VramAddr::default();
        v.set_fine_y(7);
        v.set_coarse_y(29);

        v.increment_y();

        assert_eq!(v.fine_y(), 0);
        assert_eq!(v.coarse_y(), 0);
        assert_eq!(v.nametable(), 2);

        let mut v = VramAddr::default();
        v.set_fine_y(7);
        v.set_coarse_y(31);
        v.increment_y();

        assert_eq!(v.coarse_y(), 0);
        assert_eq!(v.nametable(), 0);
    }

    #[test]
    fn tile_and_attribute_address() {
        let mut v = VramAddr::default();
        v.set_nametable(1);
        v.set_coarse_x(5);
        v.set_coarse_y(9);

        assert_eq!(v.tile_addr(), 0x2400 + 9 * 32 + 5);
        assert_eq!(v.attribute_addr(), 0x27C0 + (9 / 4) * 8 + 5 / 4);
    }

    #[test]
    fn copy_scroll_bits() {
        let t = VramAddr(0x7FFF);

        let mut v = VramAddr(0);
        v.copy_horizontal(t);
        assert_eq!(v.0, 0x041F);

        let mut v = VramAddr(0);
        v.copy_vertical(t);
        assert_eq!(v.0, 0x7BE0);
    }
}
