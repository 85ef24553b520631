//
// mapper.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 11 2019
//

use super::base::MapperBase;
use super::nrom::Nrom;
use super::mmc1::Mmc1;
use super::unrom::Unrom;
use super::cnrom::Cnrom;
use super::axrom::Axrom;

use std::rc::Rc;
use std::cell::RefCell;

use crate::cart::{Cartridge, CartridgeError, get_mapper_name};
use crate::state::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    OneScreenLower,
    OneScreenUpper,
    Vertical,
    Horizontal,
}

pub trait MapperControl {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    fn read_chr(&self, addr: u16) -> u8;
    fn write_chr(&mut self, addr: u16, value: u8);

    /// Mirroring selected by the board. `None` means the header's mirroring applies
    fn mirroring(&self) -> Option<Mirroring> { None }

    fn get_battery_ram(&self) -> Vec<u8> {
        (0x6000..0x8000).map(|addr| self.read(addr)).collect()
    }

    /// Serialize the banking registers and any RAM on the board. ROM contents are not included
    fn save_state(&self) -> Result<Vec<u8>, StateError>;
    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError>;
}

pub type Mapper = Rc<RefCell<dyn MapperControl>>;

/// Mapper numbers this core can run
pub fn is_supported(mapper: usize) -> bool {
    matches!(mapper, 0 | 1 | 2 | 3 | 7)
}

/// Create mapper instance from cartridge
pub fn from_cartridge(cart: Cartridge) -> Result<Mapper, CartridgeError> {
    let mapper = cart.info.mapper;
    tracing::debug!(mapper = %get_mapper_name(mapper), "selecting mapper");

    match mapper {
        0 => Ok(create_mapper::<Nrom>(cart)),
        1 => Ok(create_mapper::<Mmc1>(cart)),
        2 => Ok(create_mapper::<Unrom>(cart)),
        3 => Ok(create_mapper::<Cnrom>(cart)),
        7 => Ok(create_mapper::<Axrom>(cart)),
        _ => Err(CartridgeError::UnsupportedMapper(mapper)),
    }
}

/// Instantiate a mapper from a Cartridge
fn create_mapper<T: 'static + MapperControl + From<Cartridge>>(cart: Cartridge) -> Mapper {
    let mapper = MapperBase::<T>::from(cart);
    Rc::new(RefCell::new(mapper))
}
