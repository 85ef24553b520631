//
// cpu/memorymap.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 21 2019
//

pub const INTERNAL_RAM_SIZE: usize = 0x800;
pub const INTERNAL_RAM_END: u16 = 0x1FFF;

pub const PPU_REGISTERS_START: u16 = 0x2000;
pub const PPU_REGISTERS_END: u16 = 0x3FFF;

pub const OAM_DMA: u16 = 0x4014;
pub const JOY1: u16 = 0x4016;
pub const JOY2: u16 = 0x4017;

pub const STACK_PAGE: u16 = 0x0100;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
