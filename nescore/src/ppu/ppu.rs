//
// ppu/ppu.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 10 2019
//

use serde::{Serialize, Deserialize};

use super::regs::*;
use super::hw::{TileRegister, SpriteRegister};
use super::sprite::Sprite;
use crate::common::{IoAccess, Clockable, Register, Interrupt};

pub const DISPLAY_WIDTH: usize = 256;
pub const DISPLAY_HEIGHT: usize = 240;

const NUM_SCANLINES: usize = 262;
const CYCLES_PER_SCANLINE: usize = 341;
pub const CYCLES_PER_FRAME: usize = NUM_SCANLINES * CYCLES_PER_SCANLINE;

const PRE_RENDER_SCANLINE: usize = 261;
const POST_RENDER_SCANLINE: usize = 240;
const VBLANK_SCANLINE: usize = 241;

const OAM_SIZE: usize = 256;
const MAX_SPRITES_PER_LINE: usize = 8;

const PALETTE_BASE: u16 = 0x3F00;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Scanline {
    PreRender,
    Visible,
    PostRender,
    VBlank,
}

impl Scanline {
    pub fn from(scanline: usize) -> Self {
        match scanline {
            0..=239 => Scanline::Visible,
            POST_RENDER_SCANLINE => Scanline::PostRender,
            241..=260 => Scanline::VBlank,
            _ => Scanline::PreRender,
        }
    }
}

/// A pixel produced by the PPU: screen position and NES master palette index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    pub color: u8,
}

/// Serializable snapshot of the PPU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpuState {
    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,
    pub oam: Vec<u8>,
    pub oam_addr: u8,

    pub v: VramAddr,
    pub t: VramAddr,
    pub fine_x: u8,
    pub w: bool,
    pub read_buffer: u8,

    pub cycle: usize,
    pub scanline: usize,
    pub odd_frame: bool,
    pub frame_complete: bool,

    pub next_tile: u8,
    pub next_attribute: u8,
    pub next_pattern: (u8, u8),
    pub bg_pattern: TileRegister,
    pub bg_attribute: TileRegister,
    pub sprites: Vec<SpriteRegister>,
}

/// NES Picture Processing Unit
pub struct Ppu<Io: IoAccess> {
    oam: [u8; OAM_SIZE],

    ctrl: PpuCtrl,     // PPUCTRL   - Control Register
    mask: PpuMask,     // PPUMASK   - Mask Register (Render controls)
    status: PpuStatus, // PPUSTATUS - Status Register
    oam_addr: u8,      // OAMADDR   - OAM Address

    v: VramAddr,       // Current VRAM address
    t: VramAddr,       // Temporary VRAM address
    fine_x: u8,        // Fine X scroll
    w: bool,           // First or second write toggle for PPUSCROLL and PPUADDR
    read_buffer: u8,   // PPUDATA read buffer

    cycle: usize,      // Cycle count per scanline
    scanline: usize,   // Current scanline
    odd_frame: bool,
    frame_complete: bool,

    // Background fetch latches
    next_tile: u8,
    next_attribute: u8,
    next_pattern: (u8, u8),
    bg_pattern: TileRegister,
    bg_attribute: TileRegister,

    // Sprites on the current scanline
    sprites: Vec<SpriteRegister>,

    bus: Option<Io>,
}

impl<Io: IoAccess> Default for Ppu<Io> {
    fn default() -> Self {
        Ppu {
            oam: [0; OAM_SIZE],

            ctrl: PpuCtrl::default(),
            mask: PpuMask::default(),
            status: PpuStatus::default(),
            oam_addr: 0,

            v: VramAddr::default(),
            t: VramAddr::default(),
            fine_x: 0,
            w: false,
            read_buffer: 0,

            cycle: 0,
            scanline: PRE_RENDER_SCANLINE,
            odd_frame: false,
            frame_complete: false,

            next_tile: 0,
            next_attribute: 0,
            next_pattern: (0, 0),
            bg_pattern: TileRegister::default(),
            bg_attribute: TileRegister::default(),

            sprites: Vec::with_capacity(MAX_SPRITES_PER_LINE),

            bus: None,
        }
    }
}

impl<Io: IoAccess> Ppu<Io> {
    pub fn load_bus(&mut self, bus: Io) {
        self.bus = Some(bus);
    }

    /// Check if the PPU is in vertical blanking mode
    pub fn is_vblank(&self) -> bool {
        self.status.vblank
    }

    /// Returns true once after the last visible scanline of a frame has been drawn
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::replace(&mut self.frame_complete, false)
    }

    pub fn scanline(&self) -> usize {
        self.scanline
    }

    /// Read directly from PPU memory, bypassing the register interface
    pub fn read_vram(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    /// Read a tile number from the nametable at the given tile coordinates
    pub fn read_tile(&mut self, nametable: u16, x: usize, y: usize) -> u8 {
        let base = 0x2000 + 0x400 * (nametable & 0x03);
        let offset = ((y % 30) * 32 + (x % 32)) as u16;
        self.read(base + offset)
    }

    pub fn save_state(&self) -> PpuState {
        PpuState {
            ctrl: self.ctrl.clone(),
            mask: self.mask.clone(),
            status: self.status.clone(),
            oam: self.oam.to_vec(),
            oam_addr: self.oam_addr,

            v: self.v,
            t: self.t,
            fine_x: self.fine_x,
            w: self.w,
            read_buffer: self.read_buffer,

            cycle: self.cycle,
            scanline: self.scanline,
            odd_frame: self.odd_frame,
            frame_complete: self.frame_complete,

            next_tile: self.next_tile,
            next_attribute: self.next_attribute,
            next_pattern: self.next_pattern,
            bg_pattern: self.bg_pattern,
            bg_attribute: self.bg_attribute,
            sprites: self.sprites.clone(),
        }
    }

    pub fn load_state(&mut self, state: &PpuState) {
        let n = state.oam.len().min(OAM_SIZE);
        self.oam = [0; OAM_SIZE];
        self.oam[..n].copy_from_slice(&state.oam[..n]);

        self.ctrl = state.ctrl.clone();
        self.mask = state.mask.clone();
        self.status = state.status.clone();
        self.oam_addr = state.oam_addr;

        self.v = state.v;
        self.t = state.t;
        self.fine_x = state.fine_x & 0x07;
        self.w = state.w;
        self.read_buffer = state.read_buffer;

        self.cycle = state.cycle % CYCLES_PER_SCANLINE;
        self.scanline = state.scanline % NUM_SCANLINES;
        self.odd_frame = state.odd_frame;
        self.frame_complete = state.frame_complete;

        self.next_tile = state.next_tile;
        self.next_attribute = state.next_attribute;
        self.next_pattern = state.next_pattern;
        self.bg_pattern = state.bg_pattern;
        self.bg_attribute = state.bg_attribute;
        self.sprites = state.sprites.iter().take(MAX_SPRITES_PER_LINE).copied().collect();
    }

    //------------------------------------------------------------------------------------------------------------------
    // Rendering
    //------------------------------------------------------------------------------------------------------------------

    fn run_cycle(&mut self) -> Option<Pixel> {
        match Scanline::from(self.scanline) {
            Scanline::PreRender => {
                if self.cycle == 1 {
                    self.status.vblank = false;
                    self.status.sprite0_hit = false;
                    self.status.sprite_overflow = false;
                }

                self.render_cycle();

                // Reload the vertical scroll for the next frame
                if (280..=304).contains(&self.cycle) && self.mask.rendering_enabled() {
                    self.v.copy_vertical(self.t);
                }

                None
            },
            Scanline::Visible => {
                self.render_cycle();

                if (1..=256).contains(&self.cycle) { Some(self.compose_pixel()) } else { None }
            },
            Scanline::PostRender => None,
            Scanline::VBlank => {
                if self.scanline == VBLANK_SCANLINE && self.cycle == 1 {
                    self.status.vblank = true;
                    if self.ctrl.nmi_enable {
                        self.raise_nmi();
                    }
                }

                None
            },
        }
    }

    /// Background fetches, scroll updates and sprite evaluation shared by the visible and pre-render scanlines
    fn render_cycle(&mut self) {
        let rendering = self.mask.rendering_enabled();

        if (2..=257).contains(&self.cycle) && rendering {
            for sprite in self.sprites.iter_mut() {
                sprite.tick();
            }
        }

        if (2..=257).contains(&self.cycle) || (321..=337).contains(&self.cycle) {
            if rendering {
                self.bg_pattern.tick();
                self.bg_attribute.tick();
            }

            match (self.cycle - 1) % 8 {
                0 => {
                    self.load_background_shifters();
                    self.next_tile = self.read(self.v.tile_addr());
                },
                2 => {
                    let attribute = self.read(self.v.attribute_addr());
                    let shift = ((self.v.coarse_y() & 0x02) << 1) | (self.v.coarse_x() & 0x02);
                    self.next_attribute = (attribute >> shift) & 0x03;
                },
                4 => {
                    let addr = self.background_pattern_addr();
                    self.next_pattern.0 = self.read(addr);
                },
                6 => {
                    let addr = self.background_pattern_addr() + 8;
                    self.next_pattern.1 = self.read(addr);
                },
                7 => {
                    if rendering {
                        self.v.increment_x();
                    }
                },
                _ => {},
            }
        }

        if self.cycle == 256 && rendering {
            self.v.increment_y();
        }

        if self.cycle == 257 {
            self.load_background_shifters();
            if rendering {
                self.v.copy_horizontal(self.t);
            }
            self.evaluate_sprites();
        }
    }

    fn background_pattern_addr(&self) -> u16 {
        self.ctrl.background_pattern_table() + (self.next_tile as u16) * 16 + self.v.fine_y()
    }

    fn load_background_shifters(&mut self) {
        self.bg_pattern.load(self.next_pattern.0, self.next_pattern.1);
        self.bg_attribute.load_attribute(self.next_attribute);
    }

    /// Find the sprites on the next scanline and fetch their pattern data
    fn evaluate_sprites(&mut self) {
        self.sprites.clear();

        // Sprites are never drawn on the first visible scanline
        if self.scanline == PRE_RENDER_SCANLINE || !self.mask.rendering_enabled() {
            return;
        }

        let height = self.ctrl.sprite_height();
        let table = self.ctrl.sprite_pattern_table();

        for n in 0..(OAM_SIZE / 4) {
            let sprite = Sprite::from(&self.oam[n * 4..n * 4 + 4]);

            // OAM holds the sprite's Y position minus one
            let row = self.scanline as i32 - sprite.y as i32;
            if row < 0 || row >= height as i32 {
                continue;
            }

            if self.sprites.len() == MAX_SPRITES_PER_LINE {
                self.status.sprite_overflow = true;
                break;
            }

            let addr = sprite.pattern_addr(row as u8, height, table);
            let mut lo = self.read(addr);
            let mut hi = self.read(addr + 8);

            if sprite.flip_h() {
                lo = lo.reverse_bits();
                hi = hi.reverse_bits();
            }

            self.sprites.push(SpriteRegister::new(sprite.x, (lo, hi), sprite.palette(), sprite.priority(), n == 0));
        }
    }

    fn compose_pixel(&mut self) -> Pixel {
        let x = self.cycle - 1;
        let y = self.scanline;

        let (mut bg_pixel, mut bg_palette) = (0u8, 0u8);
        if self.mask.background_enabled && (self.mask.show_background_left || x >= 8) {
            bg_pixel = self.bg_pattern.get_value(self.fine_x);
            bg_palette = self.bg_attribute.get_value(self.fine_x);
        }

        let (mut fg_pixel, mut fg_palette, mut fg_behind, mut sprite_zero) = (0u8, 0u8, false, false);
        if self.mask.sprites_enabled && (self.mask.show_sprites_left || x >= 8) {
            // Lower OAM index wins
            if let Some(sprite) = self.sprites.iter().find(|s| s.pixel() != 0) {
                fg_pixel = sprite.pixel();
                fg_palette = sprite.palette() + 4;
                fg_behind = sprite.behind_background();
                sprite_zero = sprite.is_sprite_zero();
            }
        }

        let (pixel, palette) = match (bg_pixel, fg_pixel) {
            (0, 0) => (0, 0),
            (0, _) => (fg_pixel, fg_palette),
            (_, 0) => (bg_pixel, bg_palette),
            _ => {
                if sprite_zero && x != 255 {
                    self.status.sprite0_hit = true;
                }

                if fg_behind { (bg_pixel, bg_palette) } else { (fg_pixel, fg_palette) }
            },
        };

        let addr = if pixel == 0 { PALETTE_BASE } else { PALETTE_BASE + ((palette as u16) << 2) + pixel as u16 };
        let mut color = self.read(addr) & 0x3F;
        if self.mask.greyscale {
            color &= 0x30;
        }

        Pixel { x, y, color }
    }

    //------------------------------------------------------------------------------------------------------------------
    // Bus
    //------------------------------------------------------------------------------------------------------------------

    fn read(&mut self, addr: u16) -> u8 {
        match self.bus.as_mut() {
            Some(bus) => bus.read_byte(addr),
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(bus) = self.bus.as_mut() {
            bus.write_byte(addr, value);
        }
    }

    fn raise_nmi(&mut self) {
        if let Some(bus) = self.bus.as_mut() {
            bus.raise_interrupt(Interrupt::Nmi);
        }
    }

    fn increment_vram_addr(&mut self) {
        self.v.0 = self.v.0.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
    }
}

impl<Io: IoAccess> IoAccess for Ppu<Io> {
    fn read_byte(&mut self, addr: u16) -> u8 {
        match 0x2000 | (addr & 0x0007) {
            0x2002 => {
                let value = self.status.value();
                self.status.vblank = false;
                self.w = false;

                value
            },
            0x2004 => {
                self.oam[self.oam_addr as usize]
            },
            0x2007 => {
                let addr = self.v.0 & 0x3FFF;

                let data = if addr >= PALETTE_BASE {
                    // Palette reads are not buffered. The buffer is filled with the nametable byte underneath
                    self.read_buffer = self.read(addr - 0x1000);
                    self.read(addr)
                }
                else {
                    let data = self.read_buffer;
                    self.read_buffer = self.read(addr);
                    data
                };

                self.increment_vram_addr();

                data
            },
            // Write only registers return the last value written
            _ => self.status.lsb,
        }
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.status.lsb = value;

        match 0x2000 | (addr & 0x0007) {
            // PPU Control Register
            0x2000 => {
                let nmi_was_enabled = self.ctrl.nmi_enable;
                self.ctrl.load(value);
                self.t.set_nametable(value & 0x03);

                // Enabling NMI during vblank triggers it immediately
                if !nmi_was_enabled && self.ctrl.nmi_enable && self.status.vblank {
                    self.raise_nmi();
                }
            },
            // PPU Mask
            0x2001 => {
                self.mask.load(value);
            },
            // OAM ADDR
            0x2003 => {
                self.oam_addr = value;
            },
            // OAM DATA
            0x2004 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            },
            // PPU Scroll
            0x2005 => {
                if !self.w {
                    self.t.set_coarse_x(value >> 3);
                    self.fine_x = value & 0x07;
                }
                else {
                    self.t.set_fine_y(value & 0x07);
                    self.t.set_coarse_y(value >> 3);
                }

                self.w = !self.w;
            },
            // PPU Address
            0x2006 => {
                if !self.w {
                    self.t.0 = (self.t.0 & 0x00FF) | (((value & 0x3F) as u16) << 8);
                }
                else {
                    self.t.0 = (self.t.0 & 0xFF00) | value as u16;
                    self.v = self.t;
                }

                self.w = !self.w;
            },
            // PPU Data
            0x2007 => {
                let addr = self.v.0 & 0x3FFF;
                self.write(addr, value);
                self.increment_vram_addr();
            },
            _ => {},
        }
    }
}

impl<Io: IoAccess> Clockable<Option<Pixel>> for Ppu<Io> {
    fn tick(&mut self) -> Option<Pixel> {
        let pixel = self.run_cycle();

        self.cycle += 1;

        // Odd frames skip the last cycle of the pre-render scanline when rendering is enabled
        if self.scanline == PRE_RENDER_SCANLINE && self.cycle == CYCLES_PER_SCANLINE - 1
            && self.odd_frame && self.mask.rendering_enabled() {
            self.cycle = CYCLES_PER_SCANLINE;
        }

        if self.cycle >= CYCLES_PER_SCANLINE {
            self.cycle = 0;
            self.scanline = (self.scanline + 1) % NUM_SCANLINES;

            if self.scanline == POST_RENDER_SCANLINE {
                self.frame_complete = true;
            }
            else if self.scanline == 0 {
                self.odd_frame = !self.odd_frame;
            }
        }

        pixel
    }
}
