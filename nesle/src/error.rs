//
// error.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 06 2021
//

use std::io;

use thiserror::Error;
use nescore::{CartridgeError, StateError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for env var {0}")]
    InvalidEnv(&'static str),
    #[error("unknown game `{0}`")]
    UnknownGame(String),
}

#[derive(Debug, Error)]
pub enum NesleError {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("buffer too small (needed {needed} bytes, capacity {capacity})")]
    BufferTooSmall { needed: usize, capacity: usize },
}

/// Errors raised when resolving a handle
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown or destroyed handle {0}")]
    UnknownHandle(usize),
    #[error("handle {0} is already in use by an outer call")]
    Busy(usize),
}
