//
// nesle/lib.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 06 2021
//

//! NES learning environment.
//!
//! `NesInterface` steps a game one action at a time and reports reward, lives and terminal state in the manner of
//! the Arcade Learning Environment. `ffi` exposes it to foreign callers through a flat C interface.
//!
//! ```no_run
//! use nesle::{NesInterface, EnvConfig};
//!
//! let mut env = NesInterface::with_config("roms/mario.nes", EnvConfig::new(true).frame_skip(4)).unwrap();
//! while !env.game_over() {
//!     let reward = env.act(3);
//!     println!("reward: {}", reward);
//! }
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod ffi;
pub mod registry;
pub mod render;
pub mod reward;
pub mod settings;

mod environment;

pub use action::{Action, LEGAL_ACTIONS, NUM_ACTIONS};
pub use config::{EnvConfig, Game};
pub use environment::{NesInterface, RAM_SIZE, CLONE_STATE_BUFFER_SIZE};
pub use error::{NesleError, ConfigError, RegistryError};
pub use reward::RewardSource;
pub use settings::GameSettings;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`. Does nothing if a subscriber is already set
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
