//
// rendering.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Apr 05 2020
//

mod common;
use nescore::{palette, DISPLAY_WIDTH, DISPLAY_HEIGHT, FRAME_BUFFER_SIZE};

/// Sets the palette, places tile 1 in the top left corner and enables the background
fn background_program() -> common::RomBuilder {
    common::RomBuilder::default()
        .code(0x8000, &[
            0x2C, 0x02, 0x20,   // BIT $2002
            0x10, 0xFB,         // BPL -5
            0x2C, 0x02, 0x20,   // BIT $2002
            0x10, 0xFB,         // BPL -5
            0xA9, 0x3F,         // LDA #$3F
            0x8D, 0x06, 0x20,   // STA $2006
            0xA9, 0x00,         // LDA #$00
            0x8D, 0x06, 0x20,   // STA $2006
            0xA9, 0x0F,         // LDA #$0F
            0x8D, 0x07, 0x20,   // STA $2007
            0xA9, 0x16,         // LDA #$16
            0x8D, 0x07, 0x20,   // STA $2007
            0xA9, 0x20,         // LDA #$20
            0x8D, 0x06, 0x20,   // STA $2006
            0xA9, 0x00,         // LDA #$00
            0x8D, 0x06, 0x20,   // STA $2006
            0xA9, 0x01,         // LDA #$01
            0x8D, 0x07, 0x20,   // STA $2007
            0xA9, 0x00,         // LDA #$00
            0x8D, 0x05, 0x20,   // STA $2005
            0x8D, 0x05, 0x20,   // STA $2005
            0x8D, 0x00, 0x20,   // STA $2000
            0xA9, 0x0A,         // LDA #$0A
            0x8D, 0x01, 0x20,   // STA $2001
            0x4C, 0x3D, 0x80,   // JMP $803D
        ])
        .code(0x9000, &[0x40])
        .vectors(0x9000, 0x8000, 0x9000)
        // Tile 1 is solid color 1
        .chr(0x0010, &[0xFF; 8])
}

#[test]
fn frame_dimensions() {
    let mut nes = common::init_nes(&common::test_program().build());

    assert_eq!(nes.emulate_frame().len(), DISPLAY_WIDTH * DISPLAY_HEIGHT);
    assert_eq!(nes.frame().len(), FRAME_BUFFER_SIZE);
    assert_eq!(nes.frame_rgb().len(), FRAME_BUFFER_SIZE * 3);
}

#[test]
fn frame_count_advances() {
    let mut nes = common::init_nes(&common::test_program().build());
    common::run_frames(&mut nes, 7);

    assert_eq!(nes.frame_count(), 7);
}

#[test]
fn backdrop_fills_screen() {
    let mut nes = common::init_nes(&common::test_program().build());
    common::run_frames(&mut nes, 6);

    assert!(nes.frame().iter().all(|&c| c == common::BACKDROP));

    let (r, g, b) = palette::rgb(common::BACKDROP);
    let rgb = nes.frame_rgb();
    assert_eq!(&rgb[0..3], &[r, g, b]);
    assert_eq!(&rgb[rgb.len() - 3..], &[r, g, b]);
}

#[test]
fn background_tile() {
    let mut nes = common::init_nes(&background_program().build());
    common::run_frames(&mut nes, 6);

    let frame = nes.frame();
    let at = |x: usize, y: usize| frame[y * DISPLAY_WIDTH + x];

    assert_eq!(at(0, 0), 0x16);
    assert_eq!(at(7, 7), 0x16);
    assert_eq!(at(8, 0), 0x0F);
    assert_eq!(at(0, 8), 0x0F);
    assert_eq!(at(255, 239), 0x0F);
}

#[test]
fn ppu_memory_access() {
    let mut nes = common::init_nes(&background_program().build());
    common::run_frames(&mut nes, 6);

    assert_eq!(nes.read_tile(0, 0, 0), 0x01);
    assert_eq!(nes.read_ppu_memory(0x2000), 0x01);
    assert_eq!(nes.read_ppu_memory(0x3F01), 0x16);
    // Pattern data comes from CHR ROM
    assert_eq!(nes.read_ppu_memory(0x0010), 0xFF);
}
