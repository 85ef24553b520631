//
// cpu/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 17 2020
//

// Modules
mod cpu;
pub mod bus;
pub mod memorymap;

// Public re-exports
pub use cpu::{Cpu, CpuState};
