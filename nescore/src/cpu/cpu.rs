//
// cpu/cpu.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Nov 21 2019
//

use serde::{Serialize, Deserialize};

use crate::common::{IoAccess, Clockable, Interrupt};
use crate::asm::{self, Instruction, AddressingMode};
use super::memorymap::*;

/// Status flags
mod flags {
    pub const CARRY: u8 = bv!(0);
    pub const ZERO: u8 = bv!(1);
    pub const INTERRUPT_DISABLE: u8 = bv!(2);
    pub const DECIMAL: u8 = bv!(3);
    pub const BREAK: u8 = bv!(4);
    pub const UNUSED: u8 = bv!(5);
    pub const OVERFLOW: u8 = bv!(6);
    pub const NEGATIVE: u8 = bv!(7);
}

/// Cycles taken to service an interrupt or reset
const INTERRUPT_CYCLES: usize = 7;
/// CPU stall while OAM DMA copies a page
const OAM_DMA_CYCLES: usize = 513;

/// Where an instruction gets its operand from
#[derive(Clone, Copy)]
enum Operand {
    None,
    Accumulator,
    Address(u16),
}

/// Serializable snapshot of the CPU
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub p: u8,
    pub stall: usize,
    pub nmi_pending: bool,
    pub irq_pending: bool,
    pub reset_pending: bool,
    pub jammed: bool,
    pub holding: bool,
    pub cycles: u64,
}

/// NES 2A03: a 6502 without decimal mode.
///
/// Instructions execute atomically on their first cycle. The CPU then idles for the remainder of the
/// instruction's cycle count so it stays in step with the PPU.
pub struct Cpu<Io: IoAccess> {
    a: u8,
    x: u8,
    y: u8,
    pc: u16,
    sp: u8,
    p: u8,

    stall: usize,         // Cycles left in the current instruction
    nmi_pending: bool,
    irq_pending: bool,
    reset_pending: bool,  // Load the reset vector on the next cycle
    jammed: bool,         // Executed a KIL opcode
    holding: bool,        // Last instruction jumped to itself
    cycles: u64,

    debug: bool,
    bus: Option<Io>,
}

impl<Io: IoAccess> Default for Cpu<Io> {
    fn default() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0x00,
            p: flags::INTERRUPT_DISABLE | flags::UNUSED,

            stall: 0,
            nmi_pending: false,
            irq_pending: false,
            reset_pending: true,
            jammed: false,
            holding: false,
            cycles: 0,

            debug: false,
            bus: None,
        }
    }
}

impl<Io: IoAccess> Cpu<Io> {
    pub fn load_bus(&mut self, bus: Io) {
        self.bus = Some(bus);
    }

    pub fn bus(&self) -> Option<&Io> {
        self.bus.as_ref()
    }

    pub fn bus_mut(&mut self) -> Option<&mut Io> {
        self.bus.as_mut()
    }

    /// Start executing at the given address instead of the reset vector
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
        self.reset_pending = false;
    }

    pub fn get_pc(&self) -> u16 {
        self.pc
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Soft reset: reload the reset vector on the next cycle
    pub fn reset(&mut self) {
        self.reset_pending = true;
        self.jammed = false;
        self.holding = false;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.stall = 0;
    }

    /// The CPU is stuck: either jammed or spinning on a jump to itself
    pub fn is_holding(&self) -> bool {
        self.jammed || self.holding
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn save_state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            p: self.p,
            stall: self.stall,
            nmi_pending: self.nmi_pending,
            irq_pending: self.irq_pending,
            reset_pending: self.reset_pending,
            jammed: self.jammed,
            holding: self.holding,
            cycles: self.cycles,
        }
    }

    pub fn load_state(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.pc = state.pc;
        self.sp = state.sp;
        self.p = state.p;
        self.stall = state.stall;
        self.nmi_pending = state.nmi_pending;
        self.irq_pending = state.irq_pending;
        self.reset_pending = state.reset_pending;
        self.jammed = state.jammed;
        self.holding = state.holding;
        self.cycles = state.cycles;
    }

    //------------------------------------------------------------------------------------------------------------------
    // Execution
    //------------------------------------------------------------------------------------------------------------------

    /// Run the next instruction or interrupt sequence and return the number of cycles it takes
    fn step(&mut self) -> usize {
        if self.reset_pending {
            self.reset_pending = false;
            self.sp = self.sp.wrapping_sub(3);
            self.set_flag(flags::INTERRUPT_DISABLE, true);
            self.pc = self.read_u16(RESET_VECTOR);
            return INTERRUPT_CYCLES;
        }

        if self.jammed {
            return 1;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(NMI_VECTOR, false);
            return INTERRUPT_CYCLES;
        }

        if self.irq_pending && !self.flag(flags::INTERRUPT_DISABLE) {
            self.irq_pending = false;
            self.interrupt(IRQ_VECTOR, false);
            return INTERRUPT_CYCLES;
        }

        self.execute()
    }

    fn execute(&mut self) -> usize {
        let opcode_addr = self.pc;
        let opcode = self.fetch();

        let (instr, mode) = match asm::decode(opcode) {
            Some(decoded) => decoded,
            None => {
                tracing::warn!(opcode = format_args!("${:02X}", opcode), pc = format_args!("${:04X}", opcode_addr), "CPU jammed");
                self.jammed = true;
                return 2;
            }
        };

        if self.debug {
            self.trace(opcode_addr, opcode, instr, mode);
        }

        let (operand, page_crossed) = self.resolve_operand(mode);

        let mut cycles = asm::cycle_count(instr, mode);
        if page_crossed && asm::has_page_penalty(instr, mode) {
            cycles += 1;
        }

        cycles += self.run_instruction(instr, operand, opcode_addr);

        if let Operand::Address(OAM_DMA) = operand {
            if matches!(instr.category(), asm::InstructionCategory::Write) {
                cycles += OAM_DMA_CYCLES;
            }
        }

        cycles
    }

    /// Execute an instruction. Returns additional cycles taken by branches
    fn run_instruction(&mut self, instr: Instruction, operand: Operand, opcode_addr: u16) -> usize {
        self.holding = false;

        match instr {
            // Loads and stores
            Instruction::LDA => { self.a = self.read_operand(operand); self.update_zn(self.a); },
            Instruction::LDX => { self.x = self.read_operand(operand); self.update_zn(self.x); },
            Instruction::LDY => { self.y = self.read_operand(operand); self.update_zn(self.y); },
            Instruction::LAX => {
                let m = self.read_operand(operand);
                self.a = m;
                self.x = m;
                self.update_zn(m);
            },
            Instruction::STA => self.write_operand(operand, self.a),
            Instruction::STX => self.write_operand(operand, self.x),
            Instruction::STY => self.write_operand(operand, self.y),
            Instruction::SAX => self.write_operand(operand, self.a & self.x),
            Instruction::SHY => self.write_high_masked(operand, self.y),
            Instruction::SHX => self.write_high_masked(operand, self.x),

            // Transfers
            Instruction::TAX => { self.x = self.a; self.update_zn(self.x); },
            Instruction::TAY => { self.y = self.a; self.update_zn(self.y); },
            Instruction::TXA => { self.a = self.x; self.update_zn(self.a); },
            Instruction::TYA => { self.a = self.y; self.update_zn(self.a); },
            Instruction::TSX => { self.x = self.sp; self.update_zn(self.x); },
            Instruction::TXS => self.sp = self.x,

            // Stack
            Instruction::PHA => self.push(self.a),
            Instruction::PHP => self.push(self.p | flags::BREAK | flags::UNUSED),
            Instruction::PLA => { self.a = self.pop(); self.update_zn(self.a); },
            Instruction::PLP => { let p = self.pop(); self.set_status(p); },

            // Logic and arithmetic
            Instruction::AND => { self.a &= self.read_operand(operand); self.update_zn(self.a); },
            Instruction::ORA => { self.a |= self.read_operand(operand); self.update_zn(self.a); },
            Instruction::EOR => { self.a ^= self.read_operand(operand); self.update_zn(self.a); },
            Instruction::ADC => { let m = self.read_operand(operand); self.add(m); },
            Instruction::SBC => { let m = self.read_operand(operand); self.add(!m); },
            Instruction::CMP => { let m = self.read_operand(operand); self.compare(self.a, m); },
            Instruction::CPX => { let m = self.read_operand(operand); self.compare(self.x, m); },
            Instruction::CPY => { let m = self.read_operand(operand); self.compare(self.y, m); },
            Instruction::BIT => {
                let m = self.read_operand(operand);
                self.set_flag(flags::ZERO, self.a & m == 0);
                self.set_flag(flags::OVERFLOW, bit_is_set!(m, 6));
                self.set_flag(flags::NEGATIVE, bit_is_set!(m, 7));
            },
            Instruction::ANC => {
                self.a &= self.read_operand(operand);
                self.update_zn(self.a);
                self.set_flag(flags::CARRY, bit_is_set!(self.a, 7));
            },
            Instruction::ALR => {
                self.a &= self.read_operand(operand);
                self.a = self.lsr(self.a);
            },
            Instruction::ARR => {
                self.a &= self.read_operand(operand);
                self.a = self.ror(self.a);
                self.set_flag(flags::CARRY, bit_is_set!(self.a, 6));
                self.set_flag(flags::OVERFLOW, bit_is_set!(self.a, 6) != bit_is_set!(self.a, 5));
            },
            Instruction::AXS => {
                let m = self.read_operand(operand);
                let ax = self.a & self.x;
                self.set_flag(flags::CARRY, ax >= m);
                self.x = ax.wrapping_sub(m);
                self.update_zn(self.x);
            },

            // Increments and decrements
            Instruction::INX => { self.x = self.x.wrapping_add(1); self.update_zn(self.x); },
            Instruction::INY => { self.y = self.y.wrapping_add(1); self.update_zn(self.y); },
            Instruction::DEX => { self.x = self.x.wrapping_sub(1); self.update_zn(self.x); },
            Instruction::DEY => { self.y = self.y.wrapping_sub(1); self.update_zn(self.y); },
            Instruction::INC => { self.modify(operand, |cpu, m| { let r = m.wrapping_add(1); cpu.update_zn(r); r }); },
            Instruction::DEC => { self.modify(operand, |cpu, m| { let r = m.wrapping_sub(1); cpu.update_zn(r); r }); },

            // Shifts
            Instruction::ASL => { self.modify(operand, Self::asl); },
            Instruction::LSR => { self.modify(operand, Self::lsr); },
            Instruction::ROL => { self.modify(operand, Self::rol); },
            Instruction::ROR => { self.modify(operand, Self::ror); },

            // Read-modify-write combinations
            Instruction::SLO => {
                let r = self.modify(operand, Self::asl);
                self.a |= r;
                self.update_zn(self.a);
            },
            Instruction::RLA => {
                let r = self.modify(operand, Self::rol);
                self.a &= r;
                self.update_zn(self.a);
            },
            Instruction::SRE => {
                let r = self.modify(operand, Self::lsr);
                self.a ^= r;
                self.update_zn(self.a);
            },
            Instruction::RRA => {
                let r = self.modify(operand, Self::ror);
                self.add(r);
            },
            Instruction::DCP => {
                let r = self.modify(operand, |_, m| m.wrapping_sub(1));
                self.compare(self.a, r);
            },
            Instruction::ISB => {
                let r = self.modify(operand, |_, m| m.wrapping_add(1));
                self.add(!r);
            },

            // Flags
            Instruction::CLC => self.set_flag(flags::CARRY, false),
            Instruction::SEC => self.set_flag(flags::CARRY, true),
            Instruction::CLI => self.set_flag(flags::INTERRUPT_DISABLE, false),
            Instruction::SEI => self.set_flag(flags::INTERRUPT_DISABLE, true),
            Instruction::CLD => self.set_flag(flags::DECIMAL, false),
            Instruction::SED => self.set_flag(flags::DECIMAL, true),
            Instruction::CLV => self.set_flag(flags::OVERFLOW, false),

            // Branches
            Instruction::BCC => return self.branch(operand, !self.flag(flags::CARRY)),
            Instruction::BCS => return self.branch(operand, self.flag(flags::CARRY)),
            Instruction::BNE => return self.branch(operand, !self.flag(flags::ZERO)),
            Instruction::BEQ => return self.branch(operand, self.flag(flags::ZERO)),
            Instruction::BPL => return self.branch(operand, !self.flag(flags::NEGATIVE)),
            Instruction::BMI => return self.branch(operand, self.flag(flags::NEGATIVE)),
            Instruction::BVC => return self.branch(operand, !self.flag(flags::OVERFLOW)),
            Instruction::BVS => return self.branch(operand, self.flag(flags::OVERFLOW)),

            // Jumps and subroutines
            Instruction::JMP => {
                if let Operand::Address(addr) = operand {
                    self.holding = addr == opcode_addr;
                    self.pc = addr;
                }
            },
            Instruction::JSR => {
                if let Operand::Address(addr) = operand {
                    self.push_u16(self.pc.wrapping_sub(1));
                    self.pc = addr;
                }
            },
            Instruction::RTS => {
                self.pc = self.pop_u16().wrapping_add(1);
            },
            Instruction::RTI => {
                let p = self.pop();
                self.set_status(p);
                self.pc = self.pop_u16();
            },
            Instruction::BRK => {
                // The padding byte after BRK was consumed as an immediate operand
                self.interrupt(IRQ_VECTOR, true);
            },

            Instruction::NOP => {
                if let Operand::Address(_) = operand {
                    self.read_operand(operand);
                }
            },
        }

        0
    }

    //------------------------------------------------------------------------------------------------------------------
    // Operand resolution
    //------------------------------------------------------------------------------------------------------------------

    /// Resolve the effective address. Also reports whether indexing crossed a page
    fn resolve_operand(&mut self, mode: AddressingMode) -> (Operand, bool) {
        match mode {
            AddressingMode::Implied => (Operand::None, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Address(addr), false)
            },
            AddressingMode::ZeroPage => {
                let addr = self.fetch() as u16;
                (Operand::Address(addr), false)
            },
            AddressingMode::ZeroPageX => {
                let addr = self.fetch().wrapping_add(self.x) as u16;
                (Operand::Address(addr), false)
            },
            AddressingMode::ZeroPageY => {
                let addr = self.fetch().wrapping_add(self.y) as u16;
                (Operand::Address(addr), false)
            },
            AddressingMode::Absolute => {
                let addr = self.fetch_u16();
                (Operand::Address(addr), false)
            },
            AddressingMode::AbsoluteX => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.x as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            },
            AddressingMode::AbsoluteY => {
                let base = self.fetch_u16();
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            },
            AddressingMode::Indirect => {
                // The pointer's high byte does not carry into the next page
                let ptr = self.fetch_u16();
                let lo = self.read_u8(ptr) as u16;
                let hi = self.read_u8((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
                (Operand::Address((hi << 8) | lo), false)
            },
            AddressingMode::IndexedIndirect => {
                let zp = self.fetch().wrapping_add(self.x);
                let addr = self.read_zero_page_u16(zp);
                (Operand::Address(addr), false)
            },
            AddressingMode::IndirectIndexed => {
                let zp = self.fetch();
                let base = self.read_zero_page_u16(zp);
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Address(addr), page_crossed(base, addr))
            },
            AddressingMode::Relative => {
                let offset = self.fetch() as i8;
                let addr = self.pc.wrapping_add(offset as u16);
                (Operand::Address(addr), false)
            },
        }
    }

    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Address(addr) => self.read_u8(addr),
            Operand::None => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Address(addr) => self.write_u8(addr, value),
            Operand::None => {},
        }
    }

    /// Read-modify-write helper. Returns the value written back
    fn modify<F>(&mut self, operand: Operand, f: F) -> u8
    where F: FnOnce(&mut Self, u8) -> u8 {
        let m = self.read_operand(operand);
        let r = f(self, m);
        self.write_operand(operand, r);
        r
    }

    /// SHX/SHY store the register ANDed with the high byte of the target address plus one
    fn write_high_masked(&mut self, operand: Operand, value: u8) {
        if let Operand::Address(addr) = operand {
            let hi = (high_byte!(addr) as u8).wrapping_add(1);
            self.write_u8(addr, value & hi);
        }
    }

    //------------------------------------------------------------------------------------------------------------------
    // ALU
    //------------------------------------------------------------------------------------------------------------------

    fn add(&mut self, m: u8) {
        let carry = self.flag(flags::CARRY) as u16;
        let sum = self.a as u16 + m as u16 + carry;
        let result = sum as u8;

        self.set_flag(flags::CARRY, sum > 0xFF);
        self.set_flag(flags::OVERFLOW, (!(self.a ^ m) & (self.a ^ result) & 0x80) != 0);

        self.a = result;
        self.update_zn(result);
    }

    fn compare(&mut self, reg: u8, m: u8) {
        self.set_flag(flags::CARRY, reg >= m);
        self.update_zn(reg.wrapping_sub(m));
    }

    fn asl(&mut self, m: u8) -> u8 {
        self.set_flag(flags::CARRY, bit_is_set!(m, 7));
        let r = m << 1;
        self.update_zn(r);
        r
    }

    fn lsr(&mut self, m: u8) -> u8 {
        self.set_flag(flags::CARRY, bit_is_set!(m, 0));
        let r = m >> 1;
        self.update_zn(r);
        r
    }

    fn rol(&mut self, m: u8) -> u8 {
        let carry_in = self.flag(flags::CARRY) as u8;
        self.set_flag(flags::CARRY, bit_is_set!(m, 7));
        let r = (m << 1) | carry_in;
        self.update_zn(r);
        r
    }

    fn ror(&mut self, m: u8) -> u8 {
        let carry_in = (self.flag(flags::CARRY) as u8) << 7;
        self.set_flag(flags::CARRY, bit_is_set!(m, 0));
        let r = (m >> 1) | carry_in;
        self.update_zn(r);
        r
    }

    fn branch(&mut self, operand: Operand, condition: bool) -> usize {
        match operand {
            Operand::Address(target) if condition => {
                let extra = if page_crossed(self.pc, target) { 2 } else { 1 };
                self.pc = target;
                extra
            },
            _ => 0,
        }
    }

    fn interrupt(&mut self, vector: u16, brk: bool) {
        self.push_u16(self.pc);

        let p = if brk { self.p | flags::BREAK } else { self.p & !flags::BREAK };
        self.push(p | flags::UNUSED);

        self.set_flag(flags::INTERRUPT_DISABLE, true);
        self.pc = self.read_u16(vector);
    }

    //------------------------------------------------------------------------------------------------------------------
    // Flags
    //------------------------------------------------------------------------------------------------------------------

    fn flag(&self, mask: u8) -> bool {
        mask_is_set!(self.p, mask)
    }

    fn set_flag(&mut self, mask: u8, set: bool) {
        if set {
            self.p |= mask;
        }
        else {
            self.p &= !mask;
        }
    }

    /// Status loaded from the stack. Break does not exist in the register and bit 5 always reads set
    fn set_status(&mut self, value: u8) {
        self.p = (value & !flags::BREAK) | flags::UNUSED;
    }

    fn update_zn(&mut self, value: u8) {
        self.set_flag(flags::ZERO, value == 0);
        self.set_flag(flags::NEGATIVE, bit_is_set!(value, 7));
    }

    //------------------------------------------------------------------------------------------------------------------
    // Memory
    //------------------------------------------------------------------------------------------------------------------

    fn fetch(&mut self) -> u8 {
        let byte = self.read_u8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_u16(&mut self) -> u16 {
        let lo = self.fetch() as u16;
        let hi = self.fetch() as u16;
        (hi << 8) | lo
    }

    fn read_u8(&mut self, addr: u16) -> u8 {
        match self.bus.as_mut() {
            Some(bus) => bus.read_byte(addr),
            None => 0,
        }
    }

    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read_u8(addr) as u16;
        let hi = self.read_u8(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Pointers in the zero page wrap within the zero page
    fn read_zero_page_u16(&mut self, zp: u8) -> u16 {
        let lo = self.read_u8(zp as u16) as u16;
        let hi = self.read_u8(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    fn write_u8(&mut self, addr: u16, value: u8) {
        if let Some(bus) = self.bus.as_mut() {
            bus.write_byte(addr, value);
        }
    }

    fn push(&mut self, value: u8) {
        self.write_u8(STACK_PAGE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read_u8(STACK_PAGE | self.sp as u16)
    }

    fn push_u16(&mut self, value: u16) {
        self.push(high_byte!(value) as u8);
        self.push(low_byte!(value) as u8);
    }

    fn pop_u16(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }

    fn trace(&mut self, addr: u16, opcode: u8, instr: Instruction, mode: AddressingMode) {
        let len = mode.operand_len();
        let mut data = [opcode, 0, 0];
        for i in 0..len {
            data[i + 1] = self.read_u8(addr.wrapping_add(1 + i as u16));
        }

        tracing::trace!(
            "{:04X}  {}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            addr,
            asm::operands(&data, len),
            asm::disassemble(instr, mode, &data[1..]),
            self.a, self.x, self.y, self.p, self.sp, self.cycles
        );
    }
}

fn page_crossed(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl<Io: IoAccess> Clockable for Cpu<Io> {
    fn tick(&mut self) {
        if self.stall == 0 {
            let cycles = self.step();
            self.stall = cycles - 1;
        }
        else {
            self.stall -= 1;
        }

        self.cycles += 1;
    }
}

impl<Io: IoAccess> IoAccess for Cpu<Io> {
    fn raise_interrupt(&mut self, interrupt_type: Interrupt) {
        match interrupt_type {
            Interrupt::Nmi => self.nmi_pending = true,
            Interrupt::Irq => self.irq_pending = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 64K of flat memory
    struct FlatBus {
        mem: Vec<u8>,
    }

    impl FlatBus {
        fn with_program(addr: u16, program: &[u8]) -> Self {
            let mut mem = vec![0u8; 0x10000];
            mem[addr as usize..addr as usize + program.len()].copy_from_slice(program);
            // Reset, NMI and IRQ vectors
            mem[0xFFFC] = low_byte!(addr) as u8;
            mem[0xFFFD] = high_byte!(addr) as u8;
            mem[0xFFFA] = 0x00;
            mem[0xFFFB] = 0x90;
            mem[0xFFFE] = 0x00;
            mem[0xFFFF] = 0xA0;

            FlatBus { mem }
        }
    }

    impl IoAccess for FlatBus {
        fn read_byte(&mut self, addr: u16) -> u8 {
            self.mem[addr as usize]
        }

        fn write_byte(&mut self, addr: u16, data: u8) {
            self.mem[addr as usize] = data;
        }
    }

    fn init_cpu(program: &[u8]) -> Cpu<FlatBus> {
        let mut cpu = Cpu::default();
        cpu.load_bus(FlatBus::with_program(0x8000, program));
        // Consume the reset sequence
        run_cycles(&mut cpu, INTERRUPT_CYCLES);
        cpu
    }

    fn run_cycles(cpu: &mut Cpu<FlatBus>, n: usize) {
        for _ in 0..n {
            cpu.tick();
        }
    }

    /// Run whole instructions
    fn run_instructions(cpu: &mut Cpu<FlatBus>, n: usize) {
        for _ in 0..n {
            cpu.tick();
            while cpu.stall > 0 {
                cpu.tick();
            }
        }
    }

    fn mem(cpu: &Cpu<FlatBus>, addr: u16) -> u8 {
        cpu.bus().unwrap().mem[addr as usize]
    }

    #[test]
    fn pc_after_reset() {
        let cpu = init_cpu(&[0xEA]);

        assert_eq!(cpu.get_pc(), 0x8000);
        assert_eq!(cpu.sp, 0xFD);
        assert!(cpu.flag(flags::INTERRUPT_DISABLE));
    }

    #[test]
    fn lda_immediate_sets_flags() {
        let mut cpu = init_cpu(&[0xA9, 0x00, 0xA9, 0x80]);

        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flag(flags::ZERO));

        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.flag(flags::NEGATIVE));
        assert!(!cpu.flag(flags::ZERO));
    }

    #[test]
    fn store_and_load_through_memory() {
        // LDA #$42, STA $0200, LDX $0200
        let mut cpu = init_cpu(&[0xA9, 0x42, 0x8D, 0x00, 0x02, 0xAE, 0x00, 0x02]);
        run_instructions(&mut cpu, 3);

        assert_eq!(mem(&cpu, 0x0200), 0x42);
        assert_eq!(cpu.x, 0x42);
    }

    #[test]
    fn adc_overflow_and_carry() {
        // CLC, LDA #$50, ADC #$50
        let mut cpu = init_cpu(&[0x18, 0xA9, 0x50, 0x69, 0x50]);
        run_instructions(&mut cpu, 3);

        assert_eq!(cpu.a, 0xA0);
        assert!(cpu.flag(flags::OVERFLOW));
        assert!(!cpu.flag(flags::CARRY));

        // SEC, LDA #$FF, ADC #$01 -> carry in and out
        let mut cpu = init_cpu(&[0x38, 0xA9, 0xFF, 0x69, 0x01]);
        run_instructions(&mut cpu, 3);

        assert_eq!(cpu.a, 0x01);
        assert!(cpu.flag(flags::CARRY));
    }

    #[test]
    fn sbc_borrows() {
        // SEC, LDA #$10, SBC #$20
        let mut cpu = init_cpu(&[0x38, 0xA9, 0x10, 0xE9, 0x20]);
        run_instructions(&mut cpu, 3);

        assert_eq!(cpu.a, 0xF0);
        assert!(!cpu.flag(flags::CARRY));
        assert!(cpu.flag(flags::NEGATIVE));
    }

    #[test]
    fn compare_sets_carry() {
        // LDA #$40, CMP #$30
        let mut cpu = init_cpu(&[0xA9, 0x40, 0xC9, 0x30]);
        run_instructions(&mut cpu, 2);

        assert!(cpu.flag(flags::CARRY));
        assert!(!cpu.flag(flags::ZERO));
    }

    #[test]
    fn shifts_and_rotates() {
        // LDA #$81, ASL A, ROL A
        let mut cpu = init_cpu(&[0xA9, 0x81, 0x0A, 0x2A]);

        run_instructions(&mut cpu, 2);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.flag(flags::CARRY));

        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.a, 0x05);
        assert!(!cpu.flag(flags::CARRY));
    }

    #[test]
    fn inc_memory() {
        // INC $10, INC $10
        let mut cpu = init_cpu(&[0xE6, 0x10, 0xE6, 0x10]);
        run_instructions(&mut cpu, 2);

        assert_eq!(mem(&cpu, 0x0010), 0x02);
    }

    #[test]
    fn branch_taken_and_not_taken() {
        // LDX #$03, DEX, BNE -3, STX $00
        let mut cpu = init_cpu(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD, 0x86, 0x00]);
        run_instructions(&mut cpu, 1 + 3 * 2 + 1);

        assert_eq!(cpu.x, 0x00);
        assert_eq!(cpu.get_pc(), 0x8007);
    }

    #[test]
    fn jsr_rts() {
        // JSR $8004, BRK, NOP(pad), LDA #$07, RTS
        let mut cpu = init_cpu(&[0x20, 0x04, 0x80, 0xEA, 0xA9, 0x07, 0x60]);
        run_instructions(&mut cpu, 3);

        assert_eq!(cpu.a, 0x07);
        assert_eq!(cpu.get_pc(), 0x8003);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn jmp_indirect_page_wrap() {
        // JMP ($02FF)
        let mut cpu = init_cpu(&[0x6C, 0xFF, 0x02]);
        cpu.bus_mut().unwrap().mem[0x02FF] = 0x34;
        cpu.bus_mut().unwrap().mem[0x0200] = 0x12;
        cpu.bus_mut().unwrap().mem[0x0300] = 0x56;

        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.get_pc(), 0x1234);
    }

    #[test]
    fn stack_push_pull() {
        // LDA #$99, PHA, LDA #$00, PLA
        let mut cpu = init_cpu(&[0xA9, 0x99, 0x48, 0xA9, 0x00, 0x68]);
        run_instructions(&mut cpu, 4);

        assert_eq!(cpu.a, 0x99);
        assert_eq!(mem(&cpu, 0x01FD), 0x99);
    }

    #[test]
    fn php_sets_break_bits() {
        // PHP, PLA
        let mut cpu = init_cpu(&[0x08, 0x68]);
        run_instructions(&mut cpu, 2);

        assert_eq!(cpu.a & 0x30, 0x30);
    }

    #[test]
    fn unofficial_lax_and_dcp() {
        // LAX $10, DCP $11
        let mut cpu = init_cpu(&[0xA7, 0x10, 0xC7, 0x11]);
        cpu.bus_mut().unwrap().mem[0x10] = 0x5A;
        cpu.bus_mut().unwrap().mem[0x11] = 0x5B;
        run_instructions(&mut cpu, 2);

        assert_eq!(cpu.a, 0x5A);
        assert_eq!(cpu.x, 0x5A);
        assert_eq!(mem(&cpu, 0x11), 0x5A);
        assert!(cpu.flag(flags::ZERO));
        assert!(cpu.flag(flags::CARRY));
    }

    #[test]
    fn instruction_cycle_counts() {
        // LDA #$01 (2), LDA $0200 (4), LDA $02FF,X with X=1 (5)
        let mut cpu = init_cpu(&[0xA2, 0x01, 0xA9, 0x01, 0xAD, 0x00, 0x02, 0xBD, 0xFF, 0x02]);
        run_instructions(&mut cpu, 1);

        let start = cpu.cycles();
        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.cycles() - start, 2);

        let start = cpu.cycles();
        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.cycles() - start, 4);

        let start = cpu.cycles();
        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.cycles() - start, 5);
    }

    #[test]
    fn nmi_is_serviced() {
        // NOP, NOP ...
        let mut cpu = init_cpu(&[0xEA, 0xEA, 0xEA]);
        cpu.bus_mut().unwrap().mem[0x9000] = 0x40; // RTI

        run_instructions(&mut cpu, 1);
        cpu.raise_interrupt(Interrupt::Nmi);
        run_instructions(&mut cpu, 1);

        assert_eq!(cpu.get_pc(), 0x9000);
        assert!(cpu.flag(flags::INTERRUPT_DISABLE));

        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.get_pc(), 0x8001);
    }

    #[test]
    fn irq_masked_by_interrupt_disable() {
        // Reset leaves I set. CLI, NOP
        let mut cpu = init_cpu(&[0xEA, 0x58, 0xEA]);

        cpu.raise_interrupt(Interrupt::Irq);
        run_instructions(&mut cpu, 1);
        assert_eq!(cpu.get_pc(), 0x8001);

        run_instructions(&mut cpu, 2);
        assert_eq!(cpu.get_pc(), 0xA000);
    }

    #[test]
    fn jam_opcode_holds() {
        let mut cpu = init_cpu(&[0x02]);
        run_instructions(&mut cpu, 3);

        assert!(cpu.is_holding());
        assert_eq!(cpu.get_pc(), 0x8001);
    }

    #[test]
    fn jump_to_self_holds() {
        let mut cpu = init_cpu(&[0x4C, 0x00, 0x80]);
        run_instructions(&mut cpu, 1);

        assert!(cpu.is_holding());
    }

    #[test]
    fn state_round_trip() {
        let mut cpu = init_cpu(&[0xA9, 0x11, 0xA2, 0x22, 0xA0, 0x33]);
        run_instructions(&mut cpu, 3);

        let saved = cpu.save_state();

        let mut other = init_cpu(&[0xEA]);
        other.load_state(&saved);

        assert_eq!(other.save_state(), saved);
        assert_eq!(other.a, 0x11);
        assert_eq!(other.x, 0x22);
        assert_eq!(other.y, 0x33);
        assert_eq!(other.get_pc(), 0x8006);
    }
}
