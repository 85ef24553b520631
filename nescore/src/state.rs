//
// state.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date May 02 2021
//

//! Binary save states.
//!
//! A state blob is a fixed header followed by a bincode body:
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 4    | `NESL`                        |
//! | 4      | 2    | format version, little endian |
//! | 6      | 4    | ROM CRC-32, little endian     |
//! | 10     | ..   | bincode payload               |

use std::io;

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cpu::CpuState;
use crate::ppu::PpuState;
use crate::joy::Joy;

pub const STATE_MAGIC: [u8; 4] = *b"NESL";
pub const STATE_VERSION: u16 = 1;
pub const STATE_HEADER_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state does not start with the NESL signature")]
    BadMagic,
    #[error("state format version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u16, found: u16 },
    #[error("state was recorded from a different ROM (checksum {found:08X}, expected {expected:08X})")]
    RomMismatch { expected: u32, found: u32 },
    #[error("state is truncated ({0} bytes)")]
    Truncated(usize),
    #[error("state does not fit this machine: {0}")]
    Inconsistent(String),
    #[error("state codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Complete machine state, minus the cartridge ROM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NesState {
    pub cpu: CpuState,
    pub ppu: PpuState,
    pub joy: Joy,
    pub ram: Vec<u8>,
    pub mapper: Vec<u8>,
    pub sequencer: u8,
}

impl NesState {
    pub fn encode(&self, rom_checksum: u32) -> Result<Vec<u8>, StateError> {
        encode(self, rom_checksum)
    }

    pub fn decode(data: &[u8], rom_checksum: u32) -> Result<Self, StateError> {
        decode(data, rom_checksum)
    }
}

/// Header of a state blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHeader {
    pub version: u16,
    pub rom_checksum: u32,
}

impl StateHeader {
    pub fn parse(data: &[u8]) -> Result<Self, StateError> {
        if data.len() < STATE_HEADER_SIZE {
            return Err(StateError::Truncated(data.len()));
        }

        if data[0..4] != STATE_MAGIC {
            return Err(StateError::BadMagic);
        }

        let version = u16::from_le_bytes([data[4], data[5]]);
        let rom_checksum = u32::from_le_bytes([data[6], data[7], data[8], data[9]]);

        Ok(StateHeader { version, rom_checksum })
    }
}

/// Wrap a serializable payload in a state blob
pub fn encode<T: Serialize>(payload: &T, rom_checksum: u32) -> Result<Vec<u8>, StateError> {
    let mut blob = Vec::with_capacity(STATE_HEADER_SIZE + kb!(24));
    blob.extend_from_slice(&STATE_MAGIC);
    blob.extend_from_slice(&STATE_VERSION.to_le_bytes());
    blob.extend_from_slice(&rom_checksum.to_le_bytes());

    bincode::serialize_into(&mut blob, payload)?;

    Ok(blob)
}

/// Validate the header against the running ROM and decode the payload
pub fn decode<T: DeserializeOwned>(data: &[u8], rom_checksum: u32) -> Result<T, StateError> {
    let header = StateHeader::parse(data)?;

    if header.version != STATE_VERSION {
        return Err(StateError::VersionMismatch { expected: STATE_VERSION, found: header.version });
    }

    if header.rom_checksum != rom_checksum {
        return Err(StateError::RomMismatch { expected: rom_checksum, found: header.rom_checksum });
    }

    from_bytes(&data[STATE_HEADER_SIZE..]).map_err(|e| match e {
        StateError::Truncated(_) => StateError::Truncated(data.len()),
        e => e,
    })
}

pub(crate) fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, StateError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn from_bytes<T: DeserializeOwned>(data: &[u8]) -> Result<T, StateError> {
    bincode::deserialize(data).map_err(|e| match *e {
        bincode::ErrorKind::Io(ref io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
            StateError::Truncated(data.len())
        },
        _ => StateError::Codec(e),
    })
}
