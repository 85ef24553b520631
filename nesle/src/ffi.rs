//
// ffi.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 12 2021
//

//! C binding.
//!
//! Symbol names and signatures match the Python `ctypes` binding of the FCEUX learning environment, so existing
//! callers can load this library unchanged. Environments are addressed by integer handles (see `registry`).
//! Failures are logged and reported through neutral return values. Panics never cross the boundary.
#![allow(non_snake_case)]

use crate::environment::{NesInterface, RAM_SIZE, CLONE_STATE_BUFFER_SIZE};
use crate::error::NesleError;
use crate::registry::{self, Handle};

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::slice;

/// Run `f` on the environment behind `handle`, returning `default` on any failure
fn call<R, F>(name: &'static str, handle: Handle, default: R, f: F) -> R
where
    F: FnOnce(&mut NesInterface) -> Result<R, NesleError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| registry::with(handle, f))) {
        Ok(Ok(Ok(value))) => value,
        Ok(Ok(Err(e))) => {
            tracing::error!(call = name, handle, error = %e, "call failed");
            default
        },
        Ok(Err(e)) => {
            tracing::error!(call = name, handle, error = %e, "invalid handle");
            default
        },
        Err(_) => {
            tracing::error!(call = name, handle, "panic in call");
            default
        },
    }
}

/// Borrow a C string as UTF-8
unsafe fn convert_c_string<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }

    CStr::from_ptr(ptr).to_str().ok()
}

/// Borrow a caller buffer. `None` for null pointers and negative sizes
unsafe fn input_buffer<'a>(ptr: *const u8, size: c_int) -> Option<&'a [u8]> {
    let size = usize::try_from(size).ok()?;
    if ptr.is_null() {
        return None;
    }

    Some(slice::from_raw_parts(ptr, size))
}

unsafe fn output_buffer<'a>(ptr: *mut u8, size: usize) -> Option<&'a mut [u8]> {
    if ptr.is_null() {
        return None;
    }

    Some(slice::from_raw_parts_mut(ptr, size))
}

fn to_c_int<T: TryInto<c_int>>(value: T) -> c_int {
    value.try_into().unwrap_or(c_int::MAX)
}

fn null_argument(name: &'static str, arg: &'static str) {
    tracing::error!(call = name, arg, "null or invalid argument");
}

//----------------------------------------------------------------------------------------------------------------------
// Lifetime
//----------------------------------------------------------------------------------------------------------------------

/// Create an environment for the ROM at `rom`
///
/// # Returns
/// * A non-zero handle, or `0` if the ROM could not be loaded
///
/// # Safety
/// * `rom` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn NESInterface(rom: *const c_char, eb_compatible: bool) -> Handle {
    let path = match convert_c_string(rom) {
        Some(path) => path,
        None => {
            null_argument("NESInterface", "rom");
            return 0;
        },
    };

    match panic::catch_unwind(|| NesInterface::new(path, eb_compatible)) {
        Ok(Ok(env)) => registry::insert(env),
        Ok(Err(e)) => {
            tracing::error!(rom = path, error = %e, "failed to create environment");
            0
        },
        Err(_) => {
            tracing::error!(rom = path, "panic while creating environment");
            0
        },
    }
}

/// Destroy an environment. The handle is invalid afterwards
#[no_mangle]
pub extern "C" fn delete_NES(handle: Handle) {
    if let Err(e) = registry::remove(handle) {
        tracing::error!(call = "delete_NES", handle, error = %e, "failed to destroy environment");
    }
}

#[no_mangle]
pub extern "C" fn nesle_is_valid_handle(handle: Handle) -> bool {
    registry::contains(handle)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`. Calling it again has no effect
#[no_mangle]
pub extern "C" fn nesle_init_logging() {
    crate::init_logging();
}

//----------------------------------------------------------------------------------------------------------------------
// Episodes
//----------------------------------------------------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn resetGame(handle: Handle) {
    call("resetGame", handle, (), |env| env.reset_game())
}

#[no_mangle]
pub extern "C" fn gameOver(handle: Handle) -> bool {
    call("gameOver", handle, false, |env| Ok(env.game_over()))
}

#[no_mangle]
pub extern "C" fn act(handle: Handle, action: c_int) -> c_int {
    call("act", handle, 0, |env| Ok(env.act(action)))
}

#[no_mangle]
pub extern "C" fn render(handle: Handle) {
    call("render", handle, (), |env| {
        env.render();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn getFrameNumber(handle: Handle) -> c_int {
    call("getFrameNumber", handle, 0, |env| Ok(to_c_int(env.frame_number())))
}

#[no_mangle]
pub extern "C" fn getEpisodeFrameNumber(handle: Handle) -> c_int {
    call("getEpisodeFrameNumber", handle, 0, |env| Ok(to_c_int(env.episode_frame_number())))
}

/// Episode frame limit. Zero or negative disables it
#[no_mangle]
pub extern "C" fn setMaxNumFrames(handle: Handle, frames: c_int) {
    call("setMaxNumFrames", handle, (), |env| {
        env.set_max_num_frames(frames as i64);
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn minReward(handle: Handle) -> c_int {
    call("minReward", handle, 0, |env| Ok(env.min_reward()))
}

#[no_mangle]
pub extern "C" fn maxReward(handle: Handle) -> c_int {
    call("maxReward", handle, 0, |env| Ok(env.max_reward()))
}

#[no_mangle]
pub extern "C" fn lives(handle: Handle) -> c_int {
    call("lives", handle, 0, |env| Ok(env.lives()))
}

#[no_mangle]
pub extern "C" fn getCurrentScore(handle: Handle) -> c_int {
    call("getCurrentScore", handle, 0, |env| Ok(env.current_score()))
}

//----------------------------------------------------------------------------------------------------------------------
// Actions
//----------------------------------------------------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn getNumLegalActions(handle: Handle) -> c_int {
    call("getNumLegalActions", handle, 0, |env| Ok(to_c_int(env.legal_action_set().len())))
}

/// Write the legal action codes
///
/// # Safety
/// * `out` must be valid for `getNumLegalActions` writes
#[no_mangle]
pub unsafe extern "C" fn getLegalActionSet(handle: Handle, out: *mut c_int) {
    if out.is_null() {
        return null_argument("getLegalActionSet", "out");
    }

    call("getLegalActionSet", handle, (), |env| {
        let actions = env.legal_action_set();
        let out = slice::from_raw_parts_mut(out, actions.len());
        for (dst, action) in out.iter_mut().zip(actions) {
            *dst = action.code();
        }

        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn getNumMinimalActions(handle: Handle) -> c_int {
    call("getNumMinimalActions", handle, 0, |env| Ok(to_c_int(env.minimal_action_set().len())))
}

/// Write the minimal action codes and return how many were written
///
/// # Safety
/// * `out` must be valid for `getNumMinimalActions` writes
#[no_mangle]
pub unsafe extern "C" fn getMinimalActionSet(handle: Handle, out: *mut c_int) -> c_int {
    if out.is_null() {
        null_argument("getMinimalActionSet", "out");
        return 0;
    }

    call("getMinimalActionSet", handle, 0, |env| {
        let actions = env.minimal_action_set();
        let out = slice::from_raw_parts_mut(out, actions.len());
        for (dst, action) in out.iter_mut().zip(&actions) {
            *dst = action.code();
        }

        Ok(to_c_int(actions.len()))
    })
}

//----------------------------------------------------------------------------------------------------------------------
// Observations
//----------------------------------------------------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn getScreenHeight(handle: Handle) -> c_int {
    call("getScreenHeight", handle, 0, |env| Ok(to_c_int(env.screen_dims().1)))
}

#[no_mangle]
pub extern "C" fn getScreenWidth(handle: Handle) -> c_int {
    call("getScreenWidth", handle, 0, |env| Ok(to_c_int(env.screen_dims().0)))
}

/// Copy the screen as palette indices. At most `size` bytes are written
///
/// # Safety
/// * `out` must be valid for `size` writes
#[no_mangle]
pub unsafe extern "C" fn getScreen(handle: Handle, out: *mut u8, size: c_int) {
    let size = match usize::try_from(size) {
        Ok(size) if !out.is_null() => size,
        _ => return null_argument("getScreen", "out"),
    };

    call("getScreen", handle, (), |env| {
        let screen = env.screen();
        let len = size.min(screen.len());
        if let Some(out) = output_buffer(out, len) {
            out.copy_from_slice(&screen[..len]);
        }

        Ok(())
    })
}

/// Copy the 2 KB of CPU RAM
///
/// # Safety
/// * `out` must be valid for 2048 writes
#[no_mangle]
pub unsafe extern "C" fn getRam(handle: Handle, out: *mut u8) {
    let out = match output_buffer(out, RAM_SIZE) {
        Some(out) => out,
        None => return null_argument("getRam", "out"),
    };

    call("getRam", handle, (), |env| env.get_ram(out).map(|_| ()))
}

#[no_mangle]
pub extern "C" fn getRAMSize(handle: Handle) -> c_int {
    call("getRAMSize", handle, 0, |_| Ok(to_c_int(RAM_SIZE)))
}

/// Convert `raw_size` palette indices to `3 * raw_size` RGB bytes
///
/// # Safety
/// * `raw` must be valid for `raw_size` reads
/// * `rgb` must be valid for `3 * raw_size` writes
#[no_mangle]
pub unsafe extern "C" fn fillRGBfromPalette(handle: Handle, raw: *const u8, rgb: *mut u8, raw_size: c_int) {
    let raw = match input_buffer(raw, raw_size) {
        Some(raw) => raw,
        None => return null_argument("fillRGBfromPalette", "raw"),
    };
    let rgb = match output_buffer(rgb, raw.len() * 3) {
        Some(rgb) => rgb,
        None => return null_argument("fillRGBfromPalette", "rgb"),
    };

    call("fillRGBfromPalette", handle, (), |env| {
        env.fill_rgb_from_palette(raw, rgb);
        Ok(())
    })
}

/// Write the current screen to a PNG file
///
/// # Safety
/// * `path` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn saveScreenPNG(handle: Handle, path: *const c_char) -> bool {
    let path = match convert_c_string(path) {
        Some(path) => path,
        None => {
            null_argument("saveScreenPNG", "path");
            return false;
        },
    };

    call("saveScreenPNG", handle, false, |env| env.save_screen_png(path).map(|_| true))
}

//----------------------------------------------------------------------------------------------------------------------
// State
//----------------------------------------------------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn saveState(handle: Handle) {
    call("saveState", handle, (), |env| env.save_state())
}

#[no_mangle]
pub extern "C" fn loadState(handle: Handle) -> bool {
    call("loadState", handle, false, |env| env.load_state())
}

/// Clone the state into a buffer of `CLONE_STATE_BUFFER_SIZE` bytes
///
/// # Returns
/// * Bytes written, or `-1` on failure
///
/// # Safety
/// * `out` must be valid for `CLONE_STATE_BUFFER_SIZE` writes
#[no_mangle]
pub unsafe extern "C" fn cloneState(handle: Handle, out: *mut u8) -> c_int {
    cloneStateWithCapacity(handle, out, CLONE_STATE_BUFFER_SIZE as c_int)
}

/// Clone the state into a buffer of `capacity` bytes
///
/// # Returns
/// * Bytes written, or `-1` on failure
///
/// # Safety
/// * `out` must be valid for `capacity` writes
#[no_mangle]
pub unsafe extern "C" fn cloneStateWithCapacity(handle: Handle, out: *mut u8, capacity: c_int) -> c_int {
    let out = match usize::try_from(capacity).ok().and_then(|capacity| output_buffer(out, capacity)) {
        Some(out) => out,
        None => {
            null_argument("cloneState", "out");
            return -1;
        },
    };

    call("cloneState", handle, -1, |env| env.clone_state_into(out).map(to_c_int))
}

#[no_mangle]
pub extern "C" fn getStateSize(handle: Handle) -> c_int {
    call("getStateSize", handle, 0, |env| env.state_size().map(to_c_int))
}

/// Restore a state produced by `cloneState`
///
/// # Safety
/// * `buf` must be valid for `size` reads
#[no_mangle]
pub unsafe extern "C" fn restoreState(handle: Handle, buf: *const u8, size: c_int) -> bool {
    let buf = match input_buffer(buf, size) {
        Some(buf) => buf,
        None => {
            null_argument("restoreState", "buf");
            return false;
        },
    };

    call("restoreState", handle, false, |env| env.restore_state(buf).map(|_| true))
}

/// Clone the state, including the random generator, into a buffer of `capacity` bytes
///
/// # Returns
/// * Bytes written, or `-1` on failure
///
/// # Safety
/// * `out` must be valid for `capacity` writes
#[no_mangle]
pub unsafe extern "C" fn cloneSystemState(handle: Handle, out: *mut u8, capacity: c_int) -> c_int {
    let out = match usize::try_from(capacity).ok().and_then(|capacity| output_buffer(out, capacity)) {
        Some(out) => out,
        None => {
            null_argument("cloneSystemState", "out");
            return -1;
        },
    };

    call("cloneSystemState", handle, -1, |env| env.clone_system_state_into(out).map(to_c_int))
}

/// Restore a state produced by `cloneSystemState`
///
/// # Safety
/// * `buf` must be valid for `size` reads
#[no_mangle]
pub unsafe extern "C" fn restoreSystemState(handle: Handle, buf: *const u8, size: c_int) -> bool {
    let buf = match input_buffer(buf, size) {
        Some(buf) => buf,
        None => {
            null_argument("restoreSystemState", "buf");
            return false;
        },
    };

    call("restoreSystemState", handle, false, |env| env.restore_system_state(buf).map(|_| true))
}

/// Write the system state to the file `name`
///
/// # Safety
/// * `name` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn getSnapshot(handle: Handle, name: *const c_char) {
    match convert_c_string(name) {
        Some(name) => call("getSnapshot", handle, (), |env| env.get_snapshot(name)),
        None => null_argument("getSnapshot", "name"),
    }
}

/// Restore the system state from the file `name`
///
/// # Safety
/// * `name` must be null or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn restoreSnapshot(handle: Handle, name: *const c_char) {
    match convert_c_string(name) {
        Some(name) => call("restoreSnapshot", handle, (), |env| env.restore_snapshot(name)),
        None => null_argument("restoreSnapshot", "name"),
    }
}
