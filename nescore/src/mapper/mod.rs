//
// mapper/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 17 2020
//
mod mapper;

mod mem;

mod base;
mod nrom;
mod mmc1;
mod unrom;
mod cnrom;
mod axrom;

// Public re-exports
pub use mapper::{Mapper, Mirroring, MapperControl, from_cartridge, is_supported};
