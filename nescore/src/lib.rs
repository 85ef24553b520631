///
/// nescore/lib.rs
///
/// @author Natesh Narain <nnaraindev@gmail.com>
///

#[macro_use]
mod bit;
#[macro_use]
mod common;

mod asm;
mod cpu;
mod ppu;
mod mapper;
mod joy;
mod nes;

pub mod cart;
pub mod palette;
pub mod state;

pub use nes::{Nes, FRAME_BUFFER_SIZE, RGB_FRAME_SIZE};
pub use cart::{Cartridge, CartridgeInfo, CartridgeError};
pub use joy::{Button, Controller};
pub use state::{NesState, StateError};
pub use ppu::{DISPLAY_WIDTH, DISPLAY_HEIGHT};
pub use mapper::is_supported as is_mapper_supported;
