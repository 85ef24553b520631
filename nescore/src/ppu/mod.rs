//
// ppu/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 17 2020
//

mod ppu;
pub mod bus;
mod regs;
mod hw;
mod sprite;

// Public re-exports
pub use ppu::{Ppu, PpuState, Pixel, DISPLAY_HEIGHT, DISPLAY_WIDTH, CYCLES_PER_FRAME};
