//
// common/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 23 2020
//
#![allow(dead_code)]

use nescore::{Nes, Cartridge};
use std::convert::TryFrom;

const PRG_BANK_SIZE: usize = 0x4000;
const CHR_BANK_SIZE: usize = 0x2000;

/// RAM address the test program increments on every NMI
pub const FRAME_COUNTER: u16 = 0x0010;
/// RAM address the test program stores controller 1 into on every NMI (A in bit 7, Right in bit 0)
pub const BUTTONS: u16 = 0x0011;
/// Backdrop color the test program loads into the palette
pub const BACKDROP: u8 = 0x21;

/// Assemble an NROM-128 image in memory
pub struct RomBuilder {
    mapper: u8,
    mirror_v: bool,
    prg: Vec<u8>,
    chr: Vec<u8>,
}

impl Default for RomBuilder {
    fn default() -> Self {
        RomBuilder {
            mapper: 0,
            mirror_v: false,
            prg: vec![0xEA; PRG_BANK_SIZE],
            chr: vec![0x00; CHR_BANK_SIZE],
        }
    }
}

impl RomBuilder {
    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn vertical_mirroring(mut self) -> Self {
        self.mirror_v = true;
        self
    }

    /// Place code at a CPU address in $8000-$BFFF (mirrored at $C000-$FFFF)
    pub fn code(mut self, addr: u16, bytes: &[u8]) -> Self {
        let offset = (addr as usize) & (PRG_BANK_SIZE - 1);
        self.prg[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn vectors(self, nmi: u16, reset: u16, irq: u16) -> Self {
        let mut bytes = vec![];
        for v in [nmi, reset, irq] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        self.code(0xFFFA, &bytes)
    }

    pub fn chr(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.chr[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut rom = vec![
            b'N', b'E', b'S', 0x1A,
            1, 1,
            ((self.mapper & 0x0F) << 4) | self.mirror_v as u8,
            self.mapper & 0xF0,
            0, 0, 0, 0, 0, 0, 0, 0,
        ];
        rom.extend_from_slice(&self.prg);
        rom.extend_from_slice(&self.chr);

        rom
    }
}

/// A small game loop: waits two vblanks, sets the backdrop color, enables NMI and spins.
/// The NMI handler counts frames and reads controller 1.
pub fn test_program() -> RomBuilder {
    RomBuilder::default()
        .code(0x8000, &[
            0x78,                   // SEI
            0xD8,                   // CLD
            0xA2, 0xFF,             // LDX #$FF
            0x9A,                   // TXS
            0x2C, 0x02, 0x20,       // BIT $2002
            0x10, 0xFB,             // BPL -5
            0x2C, 0x02, 0x20,       // BIT $2002
            0x10, 0xFB,             // BPL -5
            0xA9, 0x3F,             // LDA #$3F
            0x8D, 0x06, 0x20,       // STA $2006
            0xA9, 0x00,             // LDA #$00
            0x8D, 0x06, 0x20,       // STA $2006
            0xA9, BACKDROP,         // LDA #BACKDROP
            0x8D, 0x07, 0x20,       // STA $2007
            0xA9, 0x00,             // LDA #$00
            0x8D, 0x06, 0x20,       // STA $2006
            0x8D, 0x06, 0x20,       // STA $2006
            0xA9, 0x80,             // LDA #$80
            0x8D, 0x00, 0x20,       // STA $2000
            0x4C, 0x2B, 0x80,       // JMP $802B
        ])
        .code(0x8040, &[
            0x48,                   // PHA
            0xE6, 0x10,             // INC $10
            0xA9, 0x01,             // LDA #$01
            0x8D, 0x16, 0x40,       // STA $4016
            0xA9, 0x00,             // LDA #$00
            0x8D, 0x16, 0x40,       // STA $4016
            0xA2, 0x08,             // LDX #$08
            0xAD, 0x16, 0x40,       // LDA $4016
            0x4A,                   // LSR A
            0x26, 0x11,             // ROL $11
            0xCA,                   // DEX
            0xD0, 0xF7,             // BNE -9
            0x68,                   // PLA
            0x40,                   // RTI
        ])
        .code(0x805A, &[0x40])
        .vectors(0x8040, 0x8000, 0x805A)
}

/// Program running at $8000 with NMI and IRQ pointing at RTI
pub fn program(code: &[u8]) -> RomBuilder {
    RomBuilder::default()
        .code(0x8000, code)
        .code(0x9000, &[0x40])
        .vectors(0x9000, 0x8000, 0x9000)
}

pub fn init_nes(rom: &[u8]) -> Nes {
    let cart = Cartridge::from_slice(rom).unwrap();
    Nes::try_from(cart).unwrap()
}

pub fn run_frames(nes: &mut Nes, frames: usize) {
    for _ in 0..frames {
        nes.emulate_frame();
    }
}
