//
// common/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 14 2021
//
#![allow(dead_code)]

use nesle::{NesInterface, EnvConfig};
use std::path::{Path, PathBuf};

const PRG_BANK_SIZE: usize = 0x4000;
const CHR_BANK_SIZE: usize = 0x2000;

/// RAM address the generic program increments on every NMI
pub const FRAME_COUNTER: usize = 0x0010;
/// RAM address both programs store controller 1 into (A in bit 7, Right in bit 0)
pub const BUTTONS: usize = 0x0011;
pub const BACKDROP: u8 = 0x21;

/// Waits two vblanks, runs `init`, enables NMI and spins
fn reset_routine(init: &[u8]) -> Vec<u8> {
    let mut code = vec![
        0x78,                   // SEI
        0xD8,                   // CLD
        0xA2, 0xFF,             // LDX #$FF
        0x9A,                   // TXS
        0x2C, 0x02, 0x20,       // BIT $2002
        0x10, 0xFB,             // BPL -5
        0x2C, 0x02, 0x20,       // BIT $2002
        0x10, 0xFB,             // BPL -5
    ];
    code.extend_from_slice(init);
    code.extend_from_slice(&[
        0xA9, 0x80,             // LDA #$80
        0x8D, 0x00, 0x20,       // STA $2000
    ]);

    let spin = 0x8000 + code.len() as u16;
    code.push(0x4C);            // JMP spin
    code.extend_from_slice(&spin.to_le_bytes());

    code
}

/// Strobe controller 1 and shift its 8 buttons into $11
const READ_JOYPAD: [u8; 20] = [
    0xA9, 0x01,             // LDA #$01
    0x8D, 0x16, 0x40,       // STA $4016
    0xA9, 0x00,             // LDA #$00
    0x8D, 0x16, 0x40,       // STA $4016
    0xA2, 0x08,             // LDX #$08
    0xAD, 0x16, 0x40,       // LDA $4016
    0x4A,                   // LSR A
    0x26, 0x11,             // ROL $11
    0xCA,                   // DEX
    0xD0,                   // BNE -9
];

fn nmi_routine(body: &[u8], tail: &[u8]) -> Vec<u8> {
    let mut code = vec![0x48];  // PHA
    code.extend_from_slice(body);
    code.extend_from_slice(&READ_JOYPAD);
    code.push(0xF7);
    code.extend_from_slice(tail);
    code.extend_from_slice(&[
        0x68,                   // PLA
        0x40,                   // RTI
    ]);

    code
}

fn assemble(reset: &[u8], nmi: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; PRG_BANK_SIZE];
    prg[..reset.len()].copy_from_slice(reset);
    prg[0x40..0x40 + nmi.len()].copy_from_slice(nmi);
    // IRQ handler
    prg[0x1000] = 0x40;
    // NMI $8040, RESET $8000, IRQ $9000
    prg[0x3FFA..].copy_from_slice(&[0x40, 0x80, 0x00, 0x80, 0x00, 0x90]);

    let mut rom = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&vec![0u8; CHR_BANK_SIZE]);

    rom
}

/// Sets the backdrop color, counts frames at $10 and reads controller 1 into $11
pub fn generic_rom() -> Vec<u8> {
    let reset = reset_routine(&[
        0xA9, 0x3F,             // LDA #$3F
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, 0x00,             // LDA #$00
        0x8D, 0x06, 0x20,       // STA $2006
        0xA9, BACKDROP,         // LDA #BACKDROP
        0x8D, 0x07, 0x20,       // STA $2007
        0xA9, 0x00,             // LDA #$00
        0x8D, 0x06, 0x20,       // STA $2006
        0x8D, 0x06, 0x20,       // STA $2006
    ]);
    let nmi = nmi_routine(&[
        0xE6, 0x10,             // INC $10
    ], &[]);

    assemble(&reset, &nmi)
}

/// Mimics the RAM layout Super Mario Bros. settings read: the player moves right one pixel per frame
/// and holding A loses a life. Starts with 3 lives.
pub fn mario_rom() -> Vec<u8> {
    let reset = reset_routine(&[
        0xA9, 0x02,             // LDA #$02
        0x8D, 0x5A, 0x07,       // STA $075A
    ]);
    let nmi = nmi_routine(&[
        0xE6, 0x86,             // INC $86
        0xD0, 0x02,             // BNE +2
        0xE6, 0x6D,             // INC $6D
    ], &[
        0xA5, 0x11,             // LDA $11
        0x10, 0x03,             // BPL +3
        0xCE, 0x5A, 0x07,       // DEC $075A
    ]);

    assemble(&reset, &nmi)
}

/// Same as `generic_rom` with one byte changed
pub fn other_rom() -> Vec<u8> {
    let mut rom = generic_rom();
    let last = rom.len() - 1;
    rom[last] = 0x01;
    rom
}

pub fn write_rom(dir: &Path, name: &str, rom: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, rom).unwrap();
    path
}

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub generic: PathBuf,
    pub mario: PathBuf,
    pub other: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let generic = write_rom(dir.path(), "game.nes", &generic_rom());
        let mario = write_rom(dir.path(), "super_mario_bros.nes", &mario_rom());
        let other = write_rom(dir.path(), "other.nes", &other_rom());

        Fixture { dir, generic, mario, other }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn generic_env(fixture: &Fixture, config: EnvConfig) -> NesInterface {
    NesInterface::with_config(&fixture.generic, config).unwrap()
}

/// The programs wait two vblanks before enabling NMI
pub fn warm_up(env: &mut NesInterface) {
    for _ in 0..6 {
        env.act(0);
    }
}

/// Act a few times and record what the environment reported
pub fn trajectory(env: &mut NesInterface, actions: &[i32]) -> Vec<(i32, Vec<u8>, Vec<u8>)> {
    actions.iter()
        .map(|&action| {
            let reward = env.act(action);
            (reward, env.ram(), env.screen().to_vec())
        })
        .collect()
}
