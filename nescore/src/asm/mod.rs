//
// asm/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 26 2020
//
use std::fmt;

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum AddressingMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    Absolute,
    ZeroPageX,
    ZeroPageY,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl AddressingMode {
    pub fn operand_len(&self) -> usize {
        match *self {
            AddressingMode::Accumulator => 0,
            AddressingMode::Implied => 0,
            AddressingMode::Immediate => 1,
            AddressingMode::ZeroPage => 1,
            AddressingMode::Absolute => 2,
            AddressingMode::ZeroPageX => 1,
            AddressingMode::ZeroPageY => 1,
            AddressingMode::AbsoluteX => 2,
            AddressingMode::AbsoluteY => 2,
            AddressingMode::Indirect => 2,
            AddressingMode::IndexedIndirect => 1,
            AddressingMode::IndirectIndexed => 1,
            AddressingMode::Relative => 1,
        }
    }
}


#[derive(Copy, Clone, Debug)]
pub enum InstructionCategory {
    Read, Write, ReadModifyWrite, Branch, Implied
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Instruction {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,
    LAX, SAX, DCP, ISB, SLO, RLA, RRA, SRE, ANC, ALR, ARR, AXS, SHY, SHX
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", *self)
    }
}

impl Instruction {
    pub fn category(&self) -> InstructionCategory {
        match *self {
              Instruction::LDA
            | Instruction::LAX
            | Instruction::LDX
            | Instruction::LDY
            | Instruction::EOR
            | Instruction::AND
            | Instruction::ANC
            | Instruction::ALR
            | Instruction::ARR
            | Instruction::AXS
            | Instruction::ORA
            | Instruction::ADC
            | Instruction::SBC
            | Instruction::CMP
            | Instruction::CPY
            | Instruction::CPX
            | Instruction::NOP
            | Instruction::BIT => InstructionCategory::Read,
            
              Instruction::STA
            | Instruction::STX
            | Instruction::SAX
            | Instruction::SHY
            | Instruction::SHX
            | Instruction::STY => InstructionCategory::Write,

              Instruction::ASL
            | Instruction::LSR
            | Instruction::ROL
            | Instruction::ROR
            | Instruction::DCP
            | Instruction::ISB
            | Instruction::SLO
            | Instruction::RLA
            | Instruction::RRA
            | Instruction::SRE
            | Instruction::INC
            | Instruction::DEC => InstructionCategory::ReadModifyWrite,

              Instruction::BCC
            | Instruction::BCS
            | Instruction::BEQ
            | Instruction::BMI
            | Instruction::BNE
            | Instruction::BPL
            | Instruction::BVC
            | Instruction::BVS => InstructionCategory::Branch,

              Instruction::CLD
            | Instruction::CLI
            | Instruction::CLV
            | Instruction::CLC
            | Instruction::DEX
            | Instruction::DEY
            | Instruction::BRK
            | Instruction::INX
            | Instruction::INY
            | Instruction::PHA
            | Instruction::PHP
            | Instruction::PLA
            | Instruction::PLP => InstructionCategory::Implied,

            _ => InstructionCategory::Implied,
        }
    }
}

/// Total cycles taken by an instruction, not counting page crossing and taken branch penalties
pub fn cycle_count(instr: Instruction, mode: AddressingMode) -> usize {
    let category = instr.category();

    match mode {
        AddressingMode::Implied | AddressingMode::Accumulator => {
            match instr {
                Instruction::BRK => 7,
                Instruction::RTI | Instruction::RTS => 6,
                Instruction::PHA | Instruction::PHP => 3,
                Instruction::PLA | Instruction::PLP => 4,
                _ => 2,
            }
        },
        AddressingMode::Immediate => {
            match instr {
                Instruction::BRK => 7,
                _ => 2,
            }
        },
        AddressingMode::Relative => 2,
        AddressingMode::ZeroPage => {
            match category {
                InstructionCategory::ReadModifyWrite => 5,
                _ => 3,
            }
        },
        AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
            match category {
                InstructionCategory::ReadModifyWrite => 6,
                _ => 4,
            }
        },
        AddressingMode::Absolute => {
            match instr {
                Instruction::JMP => 3,
                Instruction::JSR => 6,
                _ => {
                    match category {
                        InstructionCategory::ReadModifyWrite => 6,
                        _ => 4,
                    }
                }
            }
        },
        AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
            match category {
                InstructionCategory::ReadModifyWrite => 7,
                InstructionCategory::Write => 5,
                _ => 4,
            }
        },
        AddressingMode::Indirect => 5,
        AddressingMode::IndexedIndirect => {
            match category {
                InstructionCategory::ReadModifyWrite => 8,
                _ => 6,
            }
        },
        AddressingMode::IndirectIndexed => {
            match category {
                InstructionCategory::ReadModifyWrite => 8,
                InstructionCategory::Write => 6,
                _ => 5,
            }
        },
    }
}

/// Reads through an indexed address take an extra cycle when the index crosses a page
pub fn has_page_penalty(instr: Instruction, mode: AddressingMode) -> bool {
    let indexed = matches!(mode, AddressingMode::AbsoluteX | AddressingMode::AbsoluteY | AddressingMode::IndirectIndexed);
    indexed && matches!(instr.category(), InstructionCategory::Read)
}

/// Decode an opcode. `None` for the opcodes that jam the CPU and the unstable ones this core does not run
pub fn decode(opcode: u8) -> Option<(Instruction, AddressingMode)> {
    match opcode {
        // NOP
        0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => Some((Instruction::NOP, AddressingMode::Implied)),
        0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => Some((Instruction::NOP, AddressingMode::Immediate)),
        0x04 | 0x44 | 0x64 => Some((Instruction::NOP, AddressingMode::ZeroPage)),
        0x0C => Some((Instruction::NOP, AddressingMode::Absolute)),
        0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => Some((Instruction::NOP, AddressingMode::ZeroPageX)),
        0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => Some((Instruction::NOP, AddressingMode::AbsoluteX)),
        // LDA
        0xA9 => Some((Instruction::LDA, AddressingMode::Immediate)),
        0xA5 => Some((Instruction::LDA, AddressingMode::ZeroPage)),
        0xB5 => Some((Instruction::LDA, AddressingMode::ZeroPageX)),
        0xAD => Some((Instruction::LDA, AddressingMode::Absolute)),
        0xBD => Some((Instruction::LDA, AddressingMode::AbsoluteX)),
        0xB9 => Some((Instruction::LDA, AddressingMode::AbsoluteY)),
        0xA1 => Some((Instruction::LDA, AddressingMode::IndexedIndirect)),
        0xB1 => Some((Instruction::LDA, AddressingMode::IndirectIndexed)),
        // LAX
        0xAB => Some((Instruction::LAX, AddressingMode::Immediate)),
        0xA7 => Some((Instruction::LAX, AddressingMode::ZeroPage)),
        0xB7 => Some((Instruction::LAX, AddressingMode::ZeroPageY)),
        0xAF => Some((Instruction::LAX, AddressingMode::Absolute)),
        0xBF => Some((Instruction::LAX, AddressingMode::AbsoluteY)),
        0xA3 => Some((Instruction::LAX, AddressingMode::IndexedIndirect)),
        0xB3 => Some((Instruction::LAX, AddressingMode::IndirectIndexed)),
        // SAX
        0x87 => Some((Instruction::SAX, AddressingMode::ZeroPage)),
        0x97 => Some((Instruction::SAX, AddressingMode::ZeroPageY)),
        0x8F => Some((Instruction::SAX, AddressingMode::Absolute)),
        0x83 => Some((Instruction::SAX, AddressingMode::IndexedIndirect)),
        // DCP
        0xC7 => Some((Instruction::DCP, AddressingMode::ZeroPage)),
        0xD7 => Some((Instruction::DCP, AddressingMode::ZeroPageX)),
        0xCF => Some((Instruction::DCP, AddressingMode::Absolute)),
        0xDF => Some((Instruction::DCP, AddressingMode::AbsoluteX)),
        0xDB => Some((Instruction::DCP, AddressingMode::AbsoluteY)),
        0xC3 => Some((Instruction::DCP, AddressingMode::IndexedIndirect)),
        0xD3 => Some((Instruction::DCP, AddressingMode::IndirectIndexed)),
        // JMP
        0x4C => Some((Instruction::JMP, AddressingMode::Absolute)),
        0x6C => Some((Instruction::JMP, AddressingMode::Indirect)),
        // ADC
        0x69 => Some((Instruction::ADC, AddressingMode::Immediate)),
        0x65 => Some((Instruction::ADC, AddressingMode::ZeroPage)),
        0x75 => Some((Instruction::ADC, AddressingMode::ZeroPageX)),
        0x6D => Some((Instruction::ADC, AddressingMode::Absolute)),
        0x7D => Some((Instruction::ADC, AddressingMode::AbsoluteX)),
        0x79 => Some((Instruction::ADC, AddressingMode::AbsoluteY)),
        0x61 => Some((Instruction::ADC, AddressingMode::IndexedIndirect)),
        0x71 => Some((Instruction::ADC, AddressingMode::IndirectIndexed)),
        // AND
        0x29 => Some((Instruction::AND, AddressingMode::Immediate)),
        0x25 => Some((Instruction::AND, AddressingMode::ZeroPage)),
        0x35 => Some((Instruction::AND, AddressingMode::ZeroPageX)),
        0x2D => Some((Instruction::AND, AddressingMode::Absolute)),
        0x3D => Some((Instruction::AND, AddressingMode::AbsoluteX)),
        0x39 => Some((Instruction::AND, AddressingMode::AbsoluteY)),
        0x21 => Some((Instruction::AND, AddressingMode::IndexedIndirect)),
        0x31 => Some((Instruction::AND, AddressingMode::IndirectIndexed)),
        // ANC
        0x0B | 0x2B => Some((Instruction::ANC, AddressingMode::Immediate)),
        // ASL
        0x0A => Some((Instruction::ASL, AddressingMode::Accumulator)),
        0x06 => Some((Instruction::ASL, AddressingMode::ZeroPage)),
        0x16 => Some((Instruction::ASL, AddressingMode::ZeroPageX)),
        0x0E => Some((Instruction::ASL, AddressingMode::Absolute)),
        0x1E => Some((Instruction::ASL, AddressingMode::AbsoluteX)),
        // STA
        0x85 => Some((Instruction::STA, AddressingMode::ZeroPage)),
        0x95 => Some((Instruction::STA, AddressingMode::ZeroPageX)),
        0x8D => Some((Instruction::STA, AddressingMode::Absolute)),
        0x9D => Some((Instruction::STA, AddressingMode::AbsoluteX)),
        0x99 => Some((Instruction::STA, AddressingMode::AbsoluteY)),
        0x81 => Some((Instruction::STA, AddressingMode::IndexedIndirect)),
        0x91 => Some((Instruction::STA, AddressingMode::IndirectIndexed)),
        // BCC
        0x90 => Some((Instruction::BCC, AddressingMode::Relative)),
        // BCS
        0xB0 => Some((Instruction::BCS, AddressingMode::Relative)),
        // BEQ
        0xF0 => Some((Instruction::BEQ, AddressingMode::Relative)),
        // BNE
        0xD0 => Some((Instruction::BNE, AddressingMode::Relative)),
        // BMI
        0x30 => Some((Instruction::BMI, AddressingMode::Relative)),
        // BPL
        0x10 => Some((Instruction::BPL, AddressingMode::Relative)),
        // BIT
        0x24 => Some((Instruction::BIT, AddressingMode::ZeroPage)),
        0x2C => Some((Instruction::BIT, AddressingMode::Absolute)),
        // BVC
        0x50 => Some((Instruction::BVC, AddressingMode::Relative)),
        // BVS
        0x70 => Some((Instruction::BVS, AddressingMode::Relative)),
        // CLC
        0x18 => Some((Instruction::CLC, AddressingMode::Implied)),
        // CLD
        0xD8 => Some((Instruction::CLD, AddressingMode::Implied)),
        // CLI
        0x58 => Some((Instruction::CLI, AddressingMode::Implied)),
        // CLV
        0xB8 => Some((Instruction::CLV, AddressingMode::Implied)),
        // CMP
        0xC9 => Some((Instruction::CMP, AddressingMode::Immediate)),
        0xC5 => Some((Instruction::CMP, AddressingMode::ZeroPage)),
        0xD5 => Some((Instruction::CMP, AddressingMode::ZeroPageX)),
        0xCD => Some((Instruction::CMP, AddressingMode::Absolute)),
        0xDD => Some((Instruction::CMP, AddressingMode::AbsoluteX)),
        0xD9 => Some((Instruction::CMP, AddressingMode::AbsoluteY)),
        0xC1 => Some((Instruction::CMP, AddressingMode::IndexedIndirect)),
        0xD1 => Some((Instruction::CMP, AddressingMode::IndirectIndexed)),
        // CPX
        0xE0 => Some((Instruction::CPX, AddressingMode::Immediate)),
        0xE4 => Some((Instruction::CPX, AddressingMode::ZeroPage)),
        0xEC => Some((Instruction::CPX, AddressingMode::Absolute)),
        // CPY
        0xC0 => Some((Instruction::CPY, AddressingMode::Immediate)),
        0xC4 => Some((Instruction::CPY, AddressingMode::ZeroPage)),
        0xCC => Some((Instruction::CPY, AddressingMode::Absolute)),
        // DEC
        0xC6 => Some((Instruction::DEC, AddressingMode::ZeroPage)),
        0xD6 => Some((Instruction::DEC, AddressingMode::ZeroPageX)),
        0xCE => Some((Instruction::DEC, AddressingMode::Absolute)),
        0xDE => Some((Instruction::DEC, AddressingMode::AbsoluteX)),
        // DEX
        0xCA => Some((Instruction::DEX, AddressingMode::Implied)),
        // DEY
        0x88 => Some((Instruction::DEY, AddressingMode::Implied)),
        // INC
        0xE6 => Some((Instruction::INC, AddressingMode::ZeroPage)),
        0xF6 => Some((Instruction::INC, AddressingMode::ZeroPageX)),
        0xEE => Some((Instruction::INC, AddressingMode::Absolute)),
        0xFE => Some((Instruction::INC, AddressingMode::AbsoluteX)),
        // INX
        0xE8 => Some((Instruction::INX, AddressingMode::Implied)),
        // INY
        0xC8 => Some((Instruction::INY, AddressingMode::Implied)),
        // EOR
        0x49 => Some((Instruction::EOR, AddressingMode::Immediate)),
        0x45 => Some((Instruction::EOR, AddressingMode::ZeroPage)),
        0x55 => Some((Instruction::EOR, AddressingMode::ZeroPageX)),
        0x4D => Some((Instruction::EOR, AddressingMode::Absolute)),
        0x5D => Some((Instruction::EOR, AddressingMode::AbsoluteX)),
        0x59 => Some((Instruction::EOR, AddressingMode::AbsoluteY)),
        0x41 => Some((Instruction::EOR, AddressingMode::IndexedIndirect)),
        0x51 => Some((Instruction::EOR, AddressingMode::IndirectIndexed)),
        // LDX
        0xA2 => Some((Instruction::LDX, AddressingMode::Immediate)),
        0xA6 => Some((Instruction::LDX, AddressingMode::ZeroPage)),
        0xB6 => Some((Instruction::LDX, AddressingMode::ZeroPageY)),
        0xAE => Some((Instruction::LDX, AddressingMode::Absolute)),
        0xBE => Some((Instruction::LDX, AddressingMode::AbsoluteY)),
        // LDY
        0xA0 => Some((Instruction::LDY, AddressingMode::Immediate)),
        0xA4 => Some((Instruction::LDY, AddressingMode::ZeroPage)),
        0xB4 => Some((Instruction::LDY, AddressingMode::ZeroPageX)),
        0xAC => Some((Instruction::LDY, AddressingMode::Absolute)),
        0xBC => Some((Instruction::LDY, AddressingMode::AbsoluteX)),
        // PHA
        0x48 => Some((Instruction::PHA, AddressingMode::Implied)),
        // PHP
        0x08 => Some((Instruction::PHP, AddressingMode::Implied)),
        // PLA
        0x68 => Some((Instruction::PLA, AddressingMode::Implied)),
        // PLP
        0x28 => Some((Instruction::PLP, AddressingMode::Implied)),
        // LSR
        0x4A => Some((Instruction::LSR, AddressingMode::Accumulator)),
        0x46 => Some((Instruction::LSR, AddressingMode::ZeroPage)),
        0x56 => Some((Instruction::LSR, AddressingMode::ZeroPageX)),
        0x4E => Some((Instruction::LSR, AddressingMode::Absolute)),
        0x5E => Some((Instruction::LSR, AddressingMode::AbsoluteX)),
        // ALR
        0x4B => Some((Instruction::ALR, AddressingMode::Immediate)),
        // ARR
        0x6B => Some((Instruction::ARR, AddressingMode::Immediate)),
        // AXS
        0xCB => Some((Instruction::AXS, AddressingMode::Immediate)),
        // ORA
        0x09 => Some((Instruction::ORA, AddressingMode::Immediate)),
        0x05 => Some((Instruction::ORA, AddressingMode::ZeroPage)),
        0x15 => Some((Instruction::ORA, AddressingMode::ZeroPageX)),
        0x0D => Some((Instruction::ORA, AddressingMode::Absolute)),
        0x1D => Some((Instruction::ORA, AddressingMode::AbsoluteX)),
        0x19 => Some((Instruction::ORA, AddressingMode::AbsoluteY)),
        0x01 => Some((Instruction::ORA, AddressingMode::IndexedIndirect)),
        0x11 => Some((Instruction::ORA, AddressingMode::IndirectIndexed)),
        // ROR
        0x6A => Some((Instruction::ROR, AddressingMode::Accumulator)),
        0x66 => Some((Instruction::ROR, AddressingMode::ZeroPage)),
        0x76 => Some((Instruction::ROR, AddressingMode::ZeroPageX)),
        0x6E => Some((Instruction::ROR, AddressingMode::Absolute)),
        0x7E => Some((Instruction::ROR, AddressingMode::AbsoluteX)),
        // ROL
        0x2A => Some((Instruction::ROL, AddressingMode::Accumulator)),
        0x26 => Some((Instruction::ROL, AddressingMode::ZeroPage)),
        0x36 => Some((Instruction::ROL, AddressingMode::ZeroPageX)),
        0x2E => Some((Instruction::ROL, AddressingMode::Absolute)),
        0x3E => Some((Instruction::ROL, AddressingMode::AbsoluteX)),
        // RLA
        0x27 => Some((Instruction::RLA, AddressingMode::ZeroPage)),
        0x37 => Some((Instruction::RLA, AddressingMode::ZeroPageX)),
        0x2F => Some((Instruction::RLA, AddressingMode::Absolute)),
        0x3F => Some((Instruction::RLA, AddressingMode::AbsoluteX)),
        0x3B => Some((Instruction::RLA, AddressingMode::AbsoluteY)),
        0x23 => Some((Instruction::RLA, AddressingMode::IndexedIndirect)),
        0x33 => Some((Instruction::RLA, AddressingMode::IndirectIndexed)),
        // RRA
        0x67 => Some((Instruction::RRA, AddressingMode::ZeroPage)),
        0x77 => Some((Instruction::RRA, AddressingMode::ZeroPageX)),
        0x6F => Some((Instruction::RRA, AddressingMode::Absolute)),
        0x7F => Some((Instruction::RRA, AddressingMode::AbsoluteX)),
        0x7B => Some((Instruction::RRA, AddressingMode::AbsoluteY)),
        0x63 => Some((Instruction::RRA, AddressingMode::IndexedIndirect)),
        0x73 => Some((Instruction::RRA, AddressingMode::IndirectIndexed)),
        // SRE
        0x47 => Some((Instruction::SRE, AddressingMode::ZeroPage)),
        0x57 => Some((Instruction::SRE, AddressingMode::ZeroPageX)),
        0x4F => Some((Instruction::SRE, AddressingMode::Absolute)),
        0x5F => Some((Instruction::SRE, AddressingMode::AbsoluteX)),
        0x5B => Some((Instruction::SRE, AddressingMode::AbsoluteY)),
        0x43 => Some((Instruction::SRE, AddressingMode::IndexedIndirect)),
        0x53 => Some((Instruction::SRE, AddressingMode::IndirectIndexed)),
        // RTI
        0x40 => Some((Instruction::RTI, AddressingMode::Implied)),
        // JSR
        0x20 => Some((Instruction::JSR, AddressingMode::Absolute)),
        // RTS
        0x60 => Some((Instruction::RTS, AddressingMode::Implied)),
        // SBC
        0xE9 | 0xEB => Some((Instruction::SBC, AddressingMode::Immediate)),
        0xE5 => Some((Instruction::SBC, AddressingMode::ZeroPage)),
        0xF5 => Some((Instruction::SBC, AddressingMode::ZeroPageX)),
        0xED => Some((Instruction::SBC, AddressingMode::Absolute)),
        0xFD => Some((Instruction::SBC, AddressingMode::AbsoluteX)),
        0xF9 => Some((Instruction::SBC, AddressingMode::AbsoluteY)),
        0xE1 => Some((Instruction::SBC, AddressingMode::IndexedIndirect)),
        0xF1 => Some((Instruction::SBC, AddressingMode::IndirectIndexed)),
        // ISB
        0xE7 => Some((Instruction::ISB, AddressingMode::ZeroPage)),
        0xF7 => Some((Instruction::ISB, AddressingMode::ZeroPageX)),
        0xEF => Some((Instruction::ISB, AddressingMode::Absolute)),
        0xFF => Some((Instruction::ISB, AddressingMode::AbsoluteX)),
        0xFB => Some((Instruction::ISB, AddressingMode::AbsoluteY)),
        0xE3 => Some((Instruction::ISB, AddressingMode::IndexedIndirect)),
        0xF3 => Some((Instruction::ISB, AddressingMode::IndirectIndexed)),
        // SLO
        0x07 => Some((Instruction::SLO, AddressingMode::ZeroPage)),
        0x17 => Some((Instruction::SLO, AddressingMode::ZeroPageX)),
        0x0F => Some((Instruction::SLO, AddressingMode::Absolute)),
        0x1F => Some((Instruction::SLO, AddressingMode::AbsoluteX)),
        0x1B => Some((Instruction::SLO, AddressingMode::AbsoluteY)),
        0x03 => Some((Instruction::SLO, AddressingMode::IndexedIndirect)),
        0x13 => Some((Instruction::SLO, AddressingMode::IndirectIndexed)),
        // SEC
        0x38 => Some((Instruction::SEC, AddressingMode::Implied)),
        // SED
        0xF8 => Some((Instruction::SED, AddressingMode::Implied)),
        // SEI
        0x78 => Some((Instruction::SEI, AddressingMode::Implied)),
        // SHY
        0x9C => Some((Instruction::SHY, AddressingMode::AbsoluteX)),
        // SHX
        0x9E => Some((Instruction::SHX, AddressingMode::AbsoluteY)),
        // STX
        0x86 => Some((Instruction::STX, AddressingMode::ZeroPage)),
        0x96 => Some((Instruction::STX, AddressingMode::ZeroPageY)),
        0x8E => Some((Instruction::STX, AddressingMode::Absolute)),
        // STY
        0x84 => Some((Instruction::STY, AddressingMode::ZeroPage)),
        0x94 => Some((Instruction::STY, AddressingMode::ZeroPageX)),
        0x8C => Some((Instruction::STY, AddressingMode::Absolute)),
        // TAX
        0xAA => Some((Instruction::TAX, AddressingMode::Implied)),
        // TAY
        0xA8 => Some((Instruction::TAY, AddressingMode::Implied)),
        // TSX
        0xBA => Some((Instruction::TSX, AddressingMode::Implied)),
        // TXA
        0x8A => Some((Instruction::TXA, AddressingMode::Implied)),
        // TXS
        0x9A => Some((Instruction::TXS, AddressingMode::Implied)),
        // TYA
        0x98 => Some((Instruction::TYA, AddressingMode::Implied)),
        // BRK - Followed by an unused byte
        0x00 => Some((Instruction::BRK, AddressingMode::Immediate)),

        _ => None,
    }
}

/// Returns a `String` representation of the instruction and the given addressing mode
pub fn disassemble(instr: Instruction, mode: AddressingMode, data: &[u8]) -> String {
    match mode {
        AddressingMode::Accumulator     => format!("{:?} A       ", instr),
        AddressingMode::Implied         => format!("{:?}         ", instr),
        AddressingMode::Immediate       => format!("{:?} #{:02X}     ", instr, data[0]),
        AddressingMode::Relative        => format!("{:?} +{:02X}     ", instr, data[0]),
        AddressingMode::ZeroPage        => format!("{:?} {:02X}      ", instr, data[0]),
        AddressingMode::ZeroPageX       => format!("{:?} {:02X},X    ", instr, data[0]),
        AddressingMode::ZeroPageY       => format!("{:?} {:02X},Y    ", instr, data[0]),
        AddressingMode::Absolute        => format!("{:?} {:04X}    ", instr, address(data)),
        AddressingMode::AbsoluteX       => format!("{:?} {:04X},X  ", instr, address(data)),
        AddressingMode::AbsoluteY       => format!("{:?} {:04X},Y  ", instr, address(data)),
        AddressingMode::Indirect        => format!("{:?} ({:04X})  ", instr, address(data)),
        AddressingMode::IndexedIndirect => format!("{:?} ({:02X},X)  ", instr, data[0]),
        AddressingMode::IndirectIndexed => format!("{:?} ({:02X}),Y  ", instr, data[0]),
    }
}

/// Raw instruction bytes, opcode first, right aligned
pub fn operands(data: &[u8], operand_len: usize) -> String {
    match operand_len {
        0 => format!("      {:02X}", data[0]),
        1 => format!("   {:02X} {:02X}", data[0], data[1]),
        _ => format!("{:02X} {:02X} {:02X}", data[0], data[1], data[2]),
    }
}

fn address(data: &[u8]) -> u16 {
    let hi = data[1] as u16;
    let lo = data[0] as u16;

    (hi << 8) | lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jam_opcodes_do_not_decode() {
        for opcode in [0x02u8, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2].iter() {
            assert!(decode(*opcode).is_none(), "${:02X}", opcode);
        }
    }

    #[test]
    fn multi_byte_nops() {
        assert_eq!(decode(0x80), Some((Instruction::NOP, AddressingMode::Immediate)));
        assert_eq!(decode(0x04), Some((Instruction::NOP, AddressingMode::ZeroPage)));
        assert_eq!(decode(0x0C), Some((Instruction::NOP, AddressingMode::Absolute)));
        assert_eq!(decode(0x1C), Some((Instruction::NOP, AddressingMode::AbsoluteX)));
    }

    #[test]
    fn official_cycle_counts() {
        let cases = [
            (0xA9, 2), (0xA5, 3), (0xB5, 4), (0xAD, 4), (0xBD, 4), (0xA1, 6), (0xB1, 5),
            (0x85, 3), (0x9D, 5), (0x91, 6), (0x81, 6),
            (0x06, 5), (0x16, 6), (0x0E, 6), (0x1E, 7), (0x0A, 2),
            (0x4C, 3), (0x6C, 5), (0x20, 6), (0x60, 6), (0x40, 6), (0x00, 7),
            (0x48, 3), (0x68, 4), (0xEA, 2), (0x90, 2),
            (0xC3, 8), (0xD3, 8), (0xDB, 7),
        ];

        for (opcode, cycles) in cases.iter() {
            let (instr, mode) = decode(*opcode).unwrap();
            assert_eq!(cycle_count(instr, mode), *cycles, "${:02X}", opcode);
        }
    }

    #[test]
    fn page_penalty_only_for_indexed_reads() {
        assert!(has_page_penalty(Instruction::LDA, AddressingMode::AbsoluteX));
        assert!(has_page_penalty(Instruction::NOP, AddressingMode::AbsoluteX));
        assert!(!has_page_penalty(Instruction::STA, AddressingMode::AbsoluteX));
        assert!(!has_page_penalty(Instruction::INC, AddressingMode::AbsoluteX));
        assert!(!has_page_penalty(Instruction::LDA, AddressingMode::Absolute));
    }

    #[test]
    fn disassemble_formats_operands() {
        assert_eq!(disassemble(Instruction::LDA, AddressingMode::Immediate, &[0x10]).trim(), "LDA #10");
        assert_eq!(disassemble(Instruction::JMP, AddressingMode::Indirect, &[0x34, 0x12]).trim(), "JMP (1234)");
        assert_eq!(operands(&[0xA9, 0x10, 0x00], 1), "   A9 10");
    }
}
