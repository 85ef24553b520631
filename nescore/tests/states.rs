//
// states.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date May 02 2021
//

mod common;
use nescore::{Nes, NesState, StateError, Button};

/// Run a few frames with input and record what the machine did
fn trajectory(nes: &mut Nes) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..6).map(|i| {
        nes.input(Button::A, i % 2 == 0);
        nes.emulate_frame();
        (nes.cpu_ram(), nes.frame().to_vec())
    })
    .collect()
}

#[test]
fn save_and_load_state() {
    let mut nes = common::init_nes(&common::test_program().build());
    common::run_frames(&mut nes, 8);

    let state = nes.save_state().unwrap();
    let first = trajectory(&mut nes);

    nes.load_state(&state).unwrap();
    let second = trajectory(&mut nes);

    assert_eq!(first, second);
}

#[test]
fn encoded_state_restores_on_fresh_console() {
    let rom = common::test_program().build();

    let mut nes = common::init_nes(&rom);
    common::run_frames(&mut nes, 8);

    let blob = nes.save_state().unwrap().encode(nes.rom_checksum()).unwrap();
    let first = trajectory(&mut nes);

    let mut fresh = common::init_nes(&rom);
    let state = NesState::decode(&blob, fresh.rom_checksum()).unwrap();
    fresh.load_state(&state).unwrap();

    assert_eq!(trajectory(&mut fresh), first);
}

#[test]
fn state_from_other_rom_is_rejected() {
    let mut nes = common::init_nes(&common::test_program().build());
    common::run_frames(&mut nes, 2);
    let blob = nes.save_state().unwrap().encode(nes.rom_checksum()).unwrap();

    let other = common::init_nes(&common::test_program().code(0x9500, &[0x01]).build());
    assert_ne!(other.rom_checksum(), nes.rom_checksum());

    match NesState::decode(&blob, other.rom_checksum()) {
        Err(StateError::RomMismatch { expected, found }) => {
            assert_eq!(expected, other.rom_checksum());
            assert_eq!(found, nes.rom_checksum());
        },
        r => panic!("unexpected result: {:?}", r.map(|_| ())),
    }
}

#[test]
fn corrupt_state_is_rejected() {
    let mut nes = common::init_nes(&common::test_program().build());
    common::run_frames(&mut nes, 2);
    let crc = nes.rom_checksum();

    let mut blob = nes.save_state().unwrap().encode(crc).unwrap();

    assert!(matches!(NesState::decode(&blob[..4], crc), Err(StateError::Truncated(_))));
    assert!(matches!(NesState::decode(&blob[..blob.len() / 2], crc), Err(StateError::Truncated(_))));

    blob[0] = b'X';
    assert!(matches!(NesState::decode(&blob, crc), Err(StateError::BadMagic)));
}

#[test]
fn state_with_wrong_ram_size_is_rejected() {
    let mut nes = common::init_nes(&common::test_program().build());
    let mut state = nes.save_state().unwrap();
    state.ram.truncate(100);

    assert!(matches!(nes.load_state(&state), Err(StateError::Inconsistent(_))));
}
