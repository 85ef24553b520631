//
// common.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 21 2019
//
use std::rc::{Rc, Weak};
use std::cell::RefCell;

#[macro_export]
macro_rules! kb {
    ($x:expr) => {
        $x * 1024
    };
}

/// Interrupt
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Irq,
}

/// Access a memory mapped component.
///
/// Reads take `&mut self` since reading some registers (PPUSTATUS, PPUDATA, the joypads) has side effects.
pub trait IoAccess {
    #[allow(unused)]
    fn read_byte(&mut self, addr: u16) -> u8 { 0 }
    #[allow(unused)]
    fn write_byte(&mut self, addr: u16, data: u8) {}
    #[allow(unused)]
    fn raise_interrupt(&mut self, interrupt_type: Interrupt) {}
}

pub type IoAccessRef = Rc<RefCell<dyn IoAccess>>;
/// Back reference to a component that must not keep it alive (PPU -> CPU)
pub type IoAccessWeak = Weak<RefCell<dyn IoAccess>>;

/// A clockable component. Optionally, returns a value for every tick
pub trait Clockable<T=()> {
    fn tick(&mut self) -> T;
}

/// A memory mapped register with a packed byte representation
pub trait Register<T> {
    fn new(value: T) -> Self
    where Self: Default {
        let mut r = Self::default();
        r.load(value);
        r
    }
    #[allow(unused)]
    fn load(&mut self, value: T){}
    fn value(&self) -> T;
}
