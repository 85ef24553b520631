//
// ffi.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 15 2021
//

mod common;
use common::Fixture;

use nesle::ffi::*;
use nesle::{registry, RAM_SIZE, CLONE_STATE_BUFFER_SIZE};
use nescore::palette;

use std::ffi::CString;
use std::os::raw::c_int;
use std::path::Path;
use std::ptr;

fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().unwrap()).unwrap()
}

fn create(path: &Path, eb_compatible: bool) -> usize {
    let rom = c_path(path);
    unsafe { NESInterface(rom.as_ptr(), eb_compatible) }
}

fn ram(handle: usize) -> Vec<u8> {
    let mut ram = vec![0u8; RAM_SIZE];
    unsafe { getRam(handle, ram.as_mut_ptr()) };
    ram
}

fn walk(handle: usize) -> Vec<(c_int, Vec<u8>)> {
    [0, 1, 3, 3, 0, 11, 4].iter().map(|&action| (act(handle, action), ram(handle))).collect()
}

#[test]
fn create_and_destroy() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);

    assert_ne!(handle, 0);
    assert!(nesle_is_valid_handle(handle));
    assert_eq!(getScreenWidth(handle), 256);
    assert_eq!(getScreenHeight(handle), 240);
    assert_eq!(getRAMSize(handle), 2048);

    delete_NES(handle);
    assert!(!nesle_is_valid_handle(handle));

    // Every call on a destroyed handle is neutral
    assert_eq!(act(handle, 0), 0);
    assert!(!gameOver(handle));
    assert_eq!(getScreenWidth(handle), 0);
    assert_eq!(getFrameNumber(handle), 0);
    assert!(!loadState(handle));
    resetGame(handle);

    // Double destroy is detected, not undefined
    delete_NES(handle);
}

#[test]
fn create_failures() {
    let fixture = Fixture::new();

    assert_eq!(unsafe { NESInterface(ptr::null(), false) }, 0);
    assert_eq!(create(&fixture.path("missing.nes"), false), 0);

    let mut mmc3 = common::generic_rom();
    mmc3[6] = 0x40;
    let path = common::write_rom(fixture.dir.path(), "mmc3.nes", &mmc3);
    assert_eq!(create(&path, false), 0);
}

#[test]
fn handles_are_not_reused() {
    let fixture = Fixture::new();
    let first = create(&fixture.generic, false);
    delete_NES(first);

    let second = create(&fixture.generic, false);
    assert_ne!(second, first);
    assert!(!nesle_is_valid_handle(first));
    assert!(nesle_is_valid_handle(second));

    delete_NES(second);
}

#[test]
fn legal_actions() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);

    assert_eq!(getNumLegalActions(handle), 25);

    let mut actions = vec![-1 as c_int; 25];
    unsafe { getLegalActionSet(handle, actions.as_mut_ptr()) };
    assert_eq!(actions, (0..25).collect::<Vec<c_int>>());

    let mut minimal = vec![-1 as c_int; 25];
    assert_eq!(unsafe { getMinimalActionSet(handle, minimal.as_mut_ptr()) }, 25);
    assert_eq!(getNumMinimalActions(handle), 25);

    delete_NES(handle);
}

#[test]
fn screen_is_bounded_by_size() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    for _ in 0..6 {
        act(handle, 0);
    }

    let len = 256 * 240;
    let mut screen = vec![0xAAu8; len + 16];
    unsafe { getScreen(handle, screen.as_mut_ptr(), screen.len() as c_int) };
    assert!(screen[..len].iter().all(|&c| c == common::BACKDROP));
    assert!(screen[len..].iter().all(|&c| c == 0xAA));

    let mut screen = vec![0xAAu8; 200];
    unsafe { getScreen(handle, screen.as_mut_ptr(), 100) };
    assert!(screen[..100].iter().all(|&c| c == common::BACKDROP));
    assert!(screen[100..].iter().all(|&c| c == 0xAA));

    // Negative sizes and null buffers are rejected
    unsafe { getScreen(handle, screen.as_mut_ptr(), -5) };
    unsafe { getScreen(handle, ptr::null_mut(), 100) };
    assert!(screen[100..].iter().all(|&c| c == 0xAA));

    delete_NES(handle);
}

#[test]
fn ram_is_exactly_2k() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    for _ in 0..6 {
        act(handle, 0);
    }

    let mut buf = vec![0xAAu8; RAM_SIZE + 8];
    unsafe { getRam(handle, buf.as_mut_ptr()) };

    let expected = registry::with(handle, |env| env.ram()).unwrap();
    assert_eq!(&buf[..RAM_SIZE], expected.as_slice());
    assert_eq!(&buf[RAM_SIZE..], &[0xAA; 8]);
    assert!(buf[common::FRAME_COUNTER] > 0);

    delete_NES(handle);
}

#[test]
fn palette_conversion() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);

    let raw = [0x16u8, 0x0F, 0x30];
    let mut rgb = [0u8; 9];
    unsafe { fillRGBfromPalette(handle, raw.as_ptr(), rgb.as_mut_ptr(), raw.len() as c_int) };

    for (i, &index) in raw.iter().enumerate() {
        let (r, g, b) = palette::rgb(index);
        assert_eq!(&rgb[i * 3..i * 3 + 3], &[r, g, b]);
    }

    delete_NES(handle);
}

#[test]
fn save_and_load_state() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    walk(handle);

    assert!(!loadState(handle));

    saveState(handle);
    let frame = getFrameNumber(handle);
    let first = walk(handle);
    assert_ne!(getFrameNumber(handle), frame);

    assert!(loadState(handle));
    assert_eq!(getFrameNumber(handle), frame);
    assert_eq!(walk(handle), first);

    delete_NES(handle);
}

#[test]
fn clone_and_restore_on_new_handle() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    walk(handle);

    let mut buf = vec![0u8; CLONE_STATE_BUFFER_SIZE];
    let written = unsafe { cloneState(handle, buf.as_mut_ptr()) };
    assert!(written > 0);
    assert_eq!(written, getStateSize(handle));

    let first = walk(handle);

    let fresh = create(&fixture.generic, false);
    assert!(unsafe { restoreState(fresh, buf.as_ptr(), written) });
    assert_eq!(walk(fresh), first);

    delete_NES(handle);
    delete_NES(fresh);
}

#[test]
fn clone_respects_capacity() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);

    let mut buf = vec![0xAAu8; 16];
    assert_eq!(unsafe { cloneStateWithCapacity(handle, buf.as_mut_ptr(), 16) }, -1);
    assert_eq!(unsafe { cloneStateWithCapacity(handle, buf.as_mut_ptr(), -1) }, -1);
    assert_eq!(unsafe { cloneSystemState(handle, buf.as_mut_ptr(), 16) }, -1);
    assert_eq!(unsafe { cloneState(handle, ptr::null_mut()) }, -1);
    assert!(buf.iter().all(|&b| b == 0xAA));

    delete_NES(handle);
}

#[test]
fn restore_rejects_bad_input() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    let other = create(&fixture.other, false);

    let garbage = [0x55u8; 64];
    assert!(!unsafe { restoreState(handle, garbage.as_ptr(), garbage.len() as c_int) });
    assert!(!unsafe { restoreState(handle, garbage.as_ptr(), -1) });
    assert!(!unsafe { restoreState(handle, ptr::null(), 10) });

    let mut buf = vec![0u8; CLONE_STATE_BUFFER_SIZE];
    let written = unsafe { cloneState(other, buf.as_mut_ptr()) };
    assert!(written > 0);
    assert!(!unsafe { restoreState(handle, buf.as_ptr(), written) });

    delete_NES(handle);
    delete_NES(other);
}

#[test]
fn system_state_round_trip() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    walk(handle);

    let mut buf = vec![0u8; CLONE_STATE_BUFFER_SIZE];
    let written = unsafe { cloneSystemState(handle, buf.as_mut_ptr(), buf.len() as c_int) };
    assert!(written > 0);

    let first = walk(handle);
    assert!(unsafe { restoreSystemState(handle, buf.as_ptr(), written) });
    assert_eq!(walk(handle), first);

    delete_NES(handle);
}

#[test]
fn snapshots() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    walk(handle);

    let snapshot = c_path(&fixture.path("snapshot.bin"));
    unsafe { getSnapshot(handle, snapshot.as_ptr()) };
    assert!(fixture.path("snapshot.bin").exists());

    let first = walk(handle);

    let fresh = create(&fixture.generic, false);
    unsafe { restoreSnapshot(fresh, snapshot.as_ptr()) };
    assert_eq!(walk(fresh), first);

    // Null names are ignored
    unsafe { getSnapshot(handle, ptr::null()) };

    delete_NES(handle);
    delete_NES(fresh);
}

#[test]
fn screen_png() {
    let fixture = Fixture::new();
    let handle = create(&fixture.generic, false);
    act(handle, 0);
    render(handle);

    let path = c_path(&fixture.path("screen.png"));
    assert!(unsafe { saveScreenPNG(handle, path.as_ptr()) });
    assert!(fixture.path("screen.png").exists());
    assert!(!unsafe { saveScreenPNG(handle, ptr::null()) });

    delete_NES(handle);
}

#[test]
fn mario_queries() {
    let fixture = Fixture::new();
    let handle = create(&fixture.mario, true);

    assert_eq!(lives(handle), 3);
    assert_eq!(minReward(handle), -15);
    assert_eq!(maxReward(handle), 15);
    assert_eq!(getCurrentScore(handle), 0);
    assert_eq!(getNumMinimalActions(handle), 12);

    assert_eq!(act(handle, 3), 1);
    assert_eq!(getEpisodeFrameNumber(handle), 1);

    setMaxNumFrames(handle, 2);
    act(handle, 3);
    assert!(gameOver(handle));

    resetGame(handle);
    assert_eq!(getEpisodeFrameNumber(handle), 0);
    assert!(!gameOver(handle));

    delete_NES(handle);
}

#[test]
fn logging_can_be_initialized_twice() {
    nesle_init_logging();
    nesle_init_logging();
}
