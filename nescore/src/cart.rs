//
// cart.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Sep 19 2019
//

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

pub const PRG_ROM_BANK_SIZE: usize = kb!(16);
pub const CHR_ROM_BANK_SIZE: usize = kb!(8);

const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Format {
    INES,
    NES2
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Format::INES => write!(f, "INES"),
            Format::NES2 => write!(f, "NES2"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("not enough data to parse header (size: {0})")]
    InvalidSize(usize),
    #[error("invalid signature at start of file, expected `NES<EOF>`")]
    InvalidSig,
}

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM: {0}")]
    ReadFail(#[from] io::Error),
    #[error("invalid ROM: {0}")]
    InvalidRom(#[from] ParseError),
    #[error("ROM is truncated (expected {expected} bytes, found {actual})")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeInfo {
    pub format: Format,
    pub prg_rom_banks: usize,    // 16kB units
    pub chr_rom_banks: usize,    // 8kB units (0 means board uses CHR RAM)
    pub mapper: usize,           // Mapper Number
    pub four_screen_mode: bool,  // Four screen mode
    pub trainer: bool,           // Trainer present
    pub battback_sram: bool,     // Battery backed SRAM at $6000-$7000
    pub mirror_v: bool,          // Vertical mirroring if true, horizontal if false
    pub vs_unisystem: bool,      // VS Unisystem
    pub playchoice10: bool,      // PlayChoice
    pub tv_system_pal: bool,     // NTSC if false, PAL if true
    pub tv_system_ext: usize,    // Unofficial TV supper, 0 - NTSC, 1 - PAL, 2 - Dual Compat

    // below are NES 2.0 only
    pub submapper: usize,        // Submapper number
    pub mapper_planes: usize,    // Mapper planes
    pub batt_prg_ram: usize,     // Amount of battery backed PRG RAM
    pub prg_ram: usize,          // Amount of non-battery backed PRG RAM
    pub batt_chr_ram: usize,     // Amount of battery backed CHR RAM
    pub chr_ram: usize,          // Amount of non-battery backed CHR RAM
}

impl CartridgeInfo {
    pub fn from(rom: &[u8]) -> Result<Self, CartridgeError> {
        parse_header(rom)
    }

    /// Number of bytes the header says follow it
    pub fn payload_size(&self) -> usize {
        let trainer_bytes = if self.trainer { TRAINER_SIZE } else { 0 };
        trainer_bytes + self.prg_rom_banks * PRG_ROM_BANK_SIZE + self.chr_rom_banks * CHR_ROM_BANK_SIZE
    }
}

impl fmt::Display for CartridgeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mirroring = if self.four_screen_mode {
            "Four Screen"
        }
        else if self.mirror_v {
            "Vertical"
        }
        else {
            "Horizontal"
        };
        let tv_system = if self.tv_system_pal { "PAL" } else { "NTSC" };

        writeln!(f, "Format:              {}", self.format)?;
        writeln!(f, "PRG ROM Banks:       {}", self.prg_rom_banks)?;
        writeln!(f, "CHR ROM Banks:       {}", self.chr_rom_banks)?;
        writeln!(f, "Mapper:              {}", get_mapper_name(self.mapper))?;
        writeln!(f, "Trainer:             {}", self.trainer)?;
        writeln!(f, "Battery Backed SRAM: {}", self.battback_sram)?;
        writeln!(f, "Mirroring:           {}", mirroring)?;
        write!(f, "TV System:           {}", tv_system)
    }
}

pub fn get_mapper_name(mapper: usize) -> String {
    match mapper {
        0 => format!("NROM (Mapper {})", mapper),
        1 => format!("MMC1 (Mapper {})", mapper),
        2 => format!("UNROM (Mapper {})", mapper),
        3 => format!("CNROM (Mapper {})", mapper),
        4 => format!("MMC3 (Mapper {})", mapper),
        5 => format!("MMC5 (Mapper {})", mapper),
        7 => format!("AOROM (Mapper {})", mapper),
        9 => format!("MMC2 (Mapper {})", mapper),
        10 => format!("MMC4 (Mapper {})", mapper),
        11 => format!("Color Dreams (Mapper {})", mapper),
        16 => format!("Bandai (Mapper {})", mapper),
        _ => format!("Mapper {}", mapper)
    }
}

#[derive(Debug, Clone)]
pub struct Cartridge {
    pub info: CartridgeInfo,
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    bat_ram: Vec<u8>,
}

impl Cartridge {
    pub fn from(rom: Vec<u8>) -> Result<Cartridge, CartridgeError> {
        Cartridge::from_slice(&rom)
    }

    /// Parse an iNES / NES 2.0 image
    pub fn from_slice(rom: &[u8]) -> Result<Cartridge, CartridgeError> {
        let info = CartridgeInfo::from(rom)?;

        let expected = HEADER_SIZE + info.payload_size();
        if rom.len() < expected {
            return Err(CartridgeError::Truncated { expected, actual: rom.len() });
        }

        // Determine the number of bytes for PRG ROM and CHR ROM
        let prg_rom_size = info.prg_rom_banks * PRG_ROM_BANK_SIZE;
        let chr_rom_size = info.chr_rom_banks * CHR_ROM_BANK_SIZE;

        let trainer_bytes = if info.trainer { TRAINER_SIZE } else { 0 };
        let prg_rom_offset = HEADER_SIZE + trainer_bytes;
        let chr_rom_offset = prg_rom_offset + prg_rom_size;

        let prg_rom = rom[prg_rom_offset..chr_rom_offset].to_vec();
        let chr_rom = rom[chr_rom_offset..chr_rom_offset + chr_rom_size].to_vec();

        Ok(Cartridge::from_parts(info, prg_rom, chr_rom, vec![]))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Cartridge, CartridgeError> {
        let rom = fs::read(path)?;
        Cartridge::from(rom)
    }

    /// Construct a Cartridge from parts
    pub fn from_parts(info: CartridgeInfo, prg_rom: Vec<u8>, chr_rom: Vec<u8>, bat_ram: Vec<u8>) -> Self {
        Cartridge {
            info,
            prg_rom,
            chr_rom,
            bat_ram,
        }
    }

    /// Consume the cartridge and return the info, program ROM, character ROM and battery RAM
    pub fn into_parts(self) -> (CartridgeInfo, Vec<u8>, Vec<u8>, Vec<u8>) {
        (self.info, self.prg_rom, self.chr_rom, self.bat_ram)
    }

    /// CRC-32 over the program and character ROM. Identifies the game independently of header quirks.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.prg_rom);
        hasher.update(&self.chr_rom);
        hasher.finalize()
    }
}

// Parse NES ROM header
fn parse_header(rom_header: &[u8]) -> Result<CartridgeInfo, CartridgeError> {
    if rom_header.len() < HEADER_SIZE {
        return Err(ParseError::InvalidSize(rom_header.len()).into());
    }

    if !verify_signature(&rom_header[0..4]) {
        return Err(ParseError::InvalidSig.into());
    }

    Ok(get_rom_info(rom_header))
}

/// Pull rom info from header
fn get_rom_info(rom_header: &[u8]) -> CartridgeInfo {
    let format = get_format(rom_header);

    let mut info = CartridgeInfo {
        format,
        prg_rom_banks: 0,
        chr_rom_banks: 0,
        mapper: 0,
        four_screen_mode: false,
        trainer: false,
        battback_sram: false,
        mirror_v: false,
        vs_unisystem: false,
        playchoice10: false,
        tv_system_pal: false,
        tv_system_ext: 0,
        submapper: 0,
        mapper_planes: 0,
        batt_prg_ram: 0,
        prg_ram: 0,
        batt_chr_ram: 0,
        chr_ram: 0,
    };

    get_info_common(rom_header, &mut info);

    match format {
        Format::INES => get_info_ines(rom_header, &mut info),
        Format::NES2 => get_info_nes2(rom_header, &mut info),
    }

    info
}

fn get_info_common(rom_header: &[u8], info: &mut CartridgeInfo) {
    let flag6 = rom_header[6];
    let flag7 = rom_header[7];

    info.prg_rom_banks = rom_header[4] as usize;
    info.chr_rom_banks = rom_header[5] as usize;
    info.mirror_v = bit_is_set!(flag6, 0);
    info.battback_sram = bit_is_set!(flag6, 1);
    info.trainer = bit_is_set!(flag6, 2);
    info.four_screen_mode = bit_is_set!(flag6, 3);
    info.vs_unisystem = bit_is_set!(flag7, 0);
    info.playchoice10 = bit_is_set!(flag7, 1);

    let mapper_lo = flag6 >> 4;
    let mapper_hi = flag7 & 0xF0;
    info.mapper = (mapper_hi | mapper_lo) as usize;
}

/// Get info from INES formatted ROM
fn get_info_ines(rom_header: &[u8], info: &mut CartridgeInfo) {
    // Old dumping tools wrote a signature into bytes 7-15. Flag 7 can't be trusted for those.
    if rom_header[12..16] != [0, 0, 0, 0] {
        info.mapper &= 0x0F;
        info.vs_unisystem = false;
        info.playchoice10 = false;
        return;
    }

    // TV system support
    info.tv_system_pal = (rom_header[9] & 0x01u8) != 0;
    info.tv_system_ext = match rom_header[10] & 0x03u8 {
        0     => 0,
        2     => 1,
        _     => 2,
    };
}

/// Get info from NES 2.0 formatted ROM
fn get_info_nes2(rom_header: &[u8], info: &mut CartridgeInfo) {
    info.submapper = ((rom_header[8] & 0xF0u8) >> 4) as usize;
    info.mapper_planes = (rom_header[8] & 0x0Fu8) as usize;

    // extend PRG and CHR rom size
    let prg_rom_hi_bits = rom_header[9] & 0x0Fu8;
    let chr_rom_hi_bits = (rom_header[9] & 0xF0u8) >> 4;

    info.prg_rom_banks |= (prg_rom_hi_bits as usize) << 8;
    info.chr_rom_banks |= (chr_rom_hi_bits as usize) << 8;

    info.batt_prg_ram = (rom_header[10] >> 4) as usize;
    info.prg_ram = (rom_header[10] & 0x0Fu8) as usize;

    info.batt_chr_ram = (rom_header[11] >> 4) as usize;
    info.chr_ram = (rom_header[11] & 0x0Fu8) as usize;

    info.tv_system_pal = (rom_header[12] & 0x01) != 0;
    info.tv_system_ext = if info.tv_system_pal { 1 } else { 0 };
}

/// Get the NES ROM format
fn get_format(rom_header: &[u8]) -> Format {
    if (rom_header[7] & 0x0Cu8) == 0x08u8 {
        Format::NES2
    }
    else {
        Format::INES
    }
}

/// Verify the signature at the start of the file `NES<EOF>`
fn verify_signature(sig: &[u8]) -> bool {
    sig == [0x4E, 0x45, 0x53, 0x1A]
}
