//
// config.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 06 2021
//

use crate::error::ConfigError;

use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_EB_COMPATIBLE: &str = "NESLE_EB_COMPATIBLE";
pub const ENV_FRAME_SKIP: &str = "NESLE_FRAME_SKIP";
pub const ENV_REPEAT_ACTION_PROBABILITY: &str = "NESLE_REPEAT_ACTION_PROBABILITY";
pub const ENV_MAX_NUM_FRAMES_PER_EPISODE: &str = "NESLE_MAX_NUM_FRAMES_PER_EPISODE";
pub const ENV_AUTO_RENDER_PERIOD: &str = "NESLE_AUTO_RENDER_PERIOD";
pub const ENV_RENDER_DIR: &str = "NESLE_RENDER_DIR";
pub const ENV_RANDOM_SEED: &str = "NESLE_RANDOM_SEED";
pub const ENV_NOOP_RESET_MAX: &str = "NESLE_NOOP_RESET_MAX";
pub const ENV_GAME: &str = "NESLE_GAME";

/// Render period used by eb-compatible environments
pub const EB_AUTO_RENDER_PERIOD: u32 = 120;

/// Game settings selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    /// Pick from the ROM file name
    Auto,
    SuperMarioBros,
    Generic,
}

impl FromStr for Game {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Game::Auto),
            "smb" | "mario" | "super_mario_bros" => Ok(Game::SuperMarioBros),
            "generic" => Ok(Game::Generic),
            other => Err(ConfigError::UnknownGame(other.to_string())),
        }
    }
}

/// Learning environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub eb_compatible: bool,
    pub frame_skip: u32,
    pub repeat_action_probability: f64,
    pub max_num_frames_per_episode: u64,
    pub auto_render_period: Option<u32>,
    pub render_dir: Option<PathBuf>,
    pub seed: u64,
    pub noop_reset_max: u32,
    pub game: Game,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig::new(false)
    }
}

impl EnvConfig {
    pub fn new(eb_compatible: bool) -> Self {
        EnvConfig {
            eb_compatible,
            frame_skip: 1,
            repeat_action_probability: 0.0,
            max_num_frames_per_episode: 0,
            auto_render_period: if eb_compatible { Some(EB_AUTO_RENDER_PERIOD) } else { None },
            render_dir: None,
            seed: 0,
            noop_reset_max: 0,
            game: Game::Auto,
        }
    }

    /// Load the configuration from `NESLE_*` environment variables on top of the eb-compatible defaults
    pub fn from_env(eb_compatible: bool) -> Result<Self, ConfigError> {
        EnvConfig::from_lookup(eb_compatible, |var| std::env::var(var).ok())
    }

    /// Load the configuration from an arbitrary variable source
    pub fn from_lookup<F>(eb_compatible: bool, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let eb_compatible = match lookup(ENV_EB_COMPATIBLE) {
            Some(value) => parse_bool(ENV_EB_COMPATIBLE, &value)?,
            None => eb_compatible,
        };

        let mut config = EnvConfig::new(eb_compatible);

        if let Some(frame_skip) = parse_var::<u32, _>(&lookup, ENV_FRAME_SKIP)? {
            if frame_skip == 0 {
                return Err(ConfigError::InvalidEnv(ENV_FRAME_SKIP));
            }
            config.frame_skip = frame_skip;
        }

        if let Some(p) = parse_var::<f64, _>(&lookup, ENV_REPEAT_ACTION_PROBABILITY)? {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidEnv(ENV_REPEAT_ACTION_PROBABILITY));
            }
            config.repeat_action_probability = p;
        }

        if let Some(frames) = parse_var::<i64, _>(&lookup, ENV_MAX_NUM_FRAMES_PER_EPISODE)? {
            config.max_num_frames_per_episode = frames.max(0) as u64;
        }

        // Zero or negative turns auto rendering off
        if let Some(period) = parse_var::<i64, _>(&lookup, ENV_AUTO_RENDER_PERIOD)? {
            config.auto_render_period = u32::try_from(period).ok().filter(|&p| p > 0);
        }

        if let Some(dir) = lookup(ENV_RENDER_DIR).filter(|dir| !dir.is_empty()) {
            config.render_dir = Some(PathBuf::from(dir));
        }

        if let Some(seed) = parse_var::<u64, _>(&lookup, ENV_RANDOM_SEED)? {
            config.seed = seed;
        }

        if let Some(noops) = parse_var::<u32, _>(&lookup, ENV_NOOP_RESET_MAX)? {
            config.noop_reset_max = noops;
        }

        if let Some(game) = lookup(ENV_GAME) {
            config.game = game.parse()?;
        }

        Ok(config)
    }

    pub fn frame_skip(mut self, frame_skip: u32) -> Self {
        self.frame_skip = frame_skip.max(1);
        self
    }

    pub fn repeat_action_probability(mut self, p: f64) -> Self {
        self.repeat_action_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn max_num_frames_per_episode(mut self, frames: u64) -> Self {
        self.max_num_frames_per_episode = frames;
        self
    }

    pub fn auto_render_period(mut self, period: Option<u32>) -> Self {
        self.auto_render_period = period.filter(|&p| p > 0);
        self
    }

    pub fn render_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.render_dir = Some(dir.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn noop_reset_max(mut self, noops: u32) -> Self {
        self.noop_reset_max = noops;
        self
    }

    pub fn game(mut self, game: Game) -> Self {
        self.game = game;
        self
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| ConfigError::InvalidEnv(var)),
        None => Ok(None),
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv(var)),
    }
}
