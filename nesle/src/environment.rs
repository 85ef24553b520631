//
// environment.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 09 2021
//

use nescore::{Nes, Cartridge, Controller, NesState, palette, state};
use nescore::{DISPLAY_WIDTH, DISPLAY_HEIGHT, FRAME_BUFFER_SIZE};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};

use crate::action::{Action, LEGAL_ACTIONS};
use crate::config::EnvConfig;
use crate::error::NesleError;
use crate::render;
use crate::reward::RewardSource;
use crate::settings::{self, GameSettings};

use std::convert::TryFrom;
use std::fs;
use std::path::{Path, PathBuf};

/// Size of the CPU RAM view
pub const RAM_SIZE: usize = 2048;
/// Capacity assumed by the legacy `cloneState` export
pub const CLONE_STATE_BUFFER_SIZE: usize = 79304;

/// Environment state carried by `clone_state`
#[derive(Serialize, Deserialize)]
struct EnvState {
    machine: NesState,
    settings: Vec<u8>,
    frame_number: u64,
    episode_frame_number: u64,
    last_action: Action,
}

/// `EnvState` plus everything needed to reproduce random decisions
#[derive(Serialize, Deserialize)]
struct SystemState {
    env: EnvState,
    rng: ChaCha8Rng,
    act_counter: u64,
}

/// Entry of the saved state stack
struct SavedState {
    env: EnvState,
    screen: Vec<u8>,
}

/// NES learning environment
pub struct NesInterface {
    config: EnvConfig,
    rom_path: PathBuf,
    cart: Cartridge,
    nes: Nes,
    settings: Box<dyn GameSettings>,
    reward: RewardSource,
    rng: ChaCha8Rng,

    last_action: Action,
    frame_number: u64,
    episode_frame_number: u64,
    act_counter: u64,

    saved: Vec<SavedState>,
}

impl NesInterface {
    /// Create an environment configured from `NESLE_*` environment variables.
    /// Invalid variables are logged and the defaults used instead.
    pub fn new<P: AsRef<Path>>(rom_path: P, eb_compatible: bool) -> Result<Self, NesleError> {
        let config = EnvConfig::from_env(eb_compatible).unwrap_or_else(|e| {
            tracing::error!(error = %e, "invalid environment configuration, using defaults");
            EnvConfig::new(eb_compatible)
        });

        NesInterface::with_config(rom_path, config)
    }

    pub fn with_config<P: AsRef<Path>>(rom_path: P, config: EnvConfig) -> Result<Self, NesleError> {
        let rom_path = rom_path.as_ref().to_path_buf();
        let cart = Cartridge::from_path(&rom_path)?;
        let nes = Nes::try_from(cart.clone())?;

        let settings = settings::select(config.game, &rom_path, config.eb_compatible);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        tracing::info!(
            rom = %rom_path.display(),
            game = settings.name(),
            eb_compatible = config.eb_compatible,
            frame_skip = config.frame_skip,
            "created environment"
        );

        let mut env = NesInterface {
            config,
            rom_path,
            cart,
            nes,
            settings,
            reward: RewardSource::default(),
            rng,

            last_action: Action::Noop,
            frame_number: 0,
            episode_frame_number: 0,
            act_counter: 0,

            saved: vec![],
        };

        env.start_episode();

        Ok(env)
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn rom_path(&self) -> &Path {
        &self.rom_path
    }

    pub fn game_name(&self) -> &'static str {
        self.settings.name()
    }

    /// Replace the reward source. Factories are rebuilt on every reset
    pub fn set_reward_source(&mut self, reward: RewardSource) {
        self.reward = reward;
    }

    //------------------------------------------------------------------------------------------------------------------
    // Episodes
    //------------------------------------------------------------------------------------------------------------------

    /// Apply an action code for `frame_skip` frames and return the reward
    pub fn act(&mut self, code: i32) -> i32 {
        let action = Action::try_from(code).unwrap_or_else(|code| {
            tracing::warn!(code, "unknown action, using NOOP");
            Action::Noop
        });

        self.act_with(action)
    }

    pub fn act_with(&mut self, action: Action) -> i32 {
        let mut reward = 0;

        for _ in 0..self.config.frame_skip {
            let applied = if self.sticky() { self.last_action } else { action };
            self.last_action = applied;

            self.emulate(applied);
            reward += self.settings.reward();

            if self.game_over() {
                break;
            }
        }

        if self.should_render() {
            self.render();
        }
        self.act_counter += 1;

        match self.reward.evaluate(self.nes.cpu_ram().as_slice()) {
            Some(reward) => reward,
            None if self.config.eb_compatible => reward.clamp(self.min_reward(), self.max_reward()),
            None => reward,
        }
    }

    pub fn game_over(&self) -> bool {
        let limit = self.config.max_num_frames_per_episode;
        self.settings.is_terminal() || (limit > 0 && self.episode_frame_number >= limit)
    }

    /// Power cycle the console and start a new episode
    pub fn reset_game(&mut self) -> Result<(), NesleError> {
        self.nes = Nes::try_from(self.cart.clone())?;
        self.reward.reset();
        self.start_episode();

        Ok(())
    }

    fn start_episode(&mut self) {
        for action in self.settings.starting_actions() {
            self.run_frame(action);
        }

        let noops = if self.config.noop_reset_max > 0 {
            self.rng.gen_range(0..=self.config.noop_reset_max)
        }
        else {
            0
        };

        for _ in 0..noops {
            self.run_frame(Action::Noop);
        }

        self.settings.reset(&self.nes.cpu_ram());
        self.last_action = Action::Noop;
        self.episode_frame_number = 0;

        tracing::debug!(noops, game = self.settings.name(), "episode started");
    }

    /// Run a frame without touching the counters or the settings
    fn run_frame(&mut self, action: Action) {
        self.nes.set_buttons(Controller::Input1, action.joypad());
        self.nes.emulate_frame();
    }

    fn emulate(&mut self, action: Action) {
        self.run_frame(action);
        self.settings.step(&self.nes.cpu_ram());

        self.frame_number += 1;
        self.episode_frame_number += 1;
    }

    fn sticky(&mut self) -> bool {
        let p = self.config.repeat_action_probability;
        p > 0.0 && self.rng.gen::<f64>() < p
    }

    fn should_render(&self) -> bool {
        match self.config.auto_render_period {
            Some(period) => self.act_counter % period as u64 == 0,
            None => false,
        }
    }

    //------------------------------------------------------------------------------------------------------------------
    // Counters and queries
    //------------------------------------------------------------------------------------------------------------------

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn episode_frame_number(&self) -> u64 {
        self.episode_frame_number
    }

    /// Episode frame limit. Zero or negative disables it
    pub fn set_max_num_frames(&mut self, frames: i64) {
        self.config.max_num_frames_per_episode = frames.max(0) as u64;
    }

    pub fn lives(&self) -> i32 {
        self.settings.lives()
    }

    pub fn current_score(&self) -> i32 {
        self.settings.score()
    }

    pub fn min_reward(&self) -> i32 {
        self.settings.min_reward()
    }

    pub fn max_reward(&self) -> i32 {
        self.settings.max_reward()
    }

    pub fn legal_action_set(&self) -> Vec<Action> {
        LEGAL_ACTIONS.to_vec()
    }

    pub fn minimal_action_set(&self) -> Vec<Action> {
        self.settings.minimal_actions()
    }

    /// (width, height)
    pub fn screen_dims(&self) -> (usize, usize) {
        (DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    //------------------------------------------------------------------------------------------------------------------
    // Observations
    //------------------------------------------------------------------------------------------------------------------

    /// Current frame as palette indices
    pub fn screen(&self) -> &[u8] {
        self.nes.frame()
    }

    pub fn get_screen(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        let screen = self.screen();
        let out = checked_output(out, screen.len())?;
        out.copy_from_slice(screen);

        Ok(screen.len())
    }

    pub fn get_screen_rgb(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        let out = checked_output(out, FRAME_BUFFER_SIZE * 3)?;
        Ok(palette::fill_rgb(self.screen(), out) * 3)
    }

    pub fn get_screen_grayscale(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        let screen = self.screen();
        let out = checked_output(out, screen.len())?;
        for (dst, &index) in out.iter_mut().zip(screen) {
            *dst = palette::luminance(index);
        }

        Ok(screen.len())
    }

    pub fn ram(&self) -> Vec<u8> {
        self.nes.cpu_ram()
    }

    pub fn get_ram(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        let out = checked_output(out, RAM_SIZE)?;
        Ok(self.nes.copy_cpu_ram(out))
    }

    /// Convert palette indices to RGB. Returns the number of pixels converted
    pub fn fill_rgb_from_palette(&self, raw: &[u8], rgb: &mut [u8]) -> usize {
        palette::fill_rgb(raw, rgb)
    }

    //------------------------------------------------------------------------------------------------------------------
    // Rendering
    //------------------------------------------------------------------------------------------------------------------

    pub fn render(&self) {
        match &self.config.render_dir {
            Some(dir) => {
                let path = render::frame_path(dir, self.frame_number);
                if let Err(e) = render::save_png(&path, self.screen()) {
                    tracing::error!(path = %path.display(), error = %e, "failed to render frame");
                }
            },
            None => {
                let screen = self.screen();
                let backdrop = screen.first().copied().unwrap_or_default();
                let lit = screen.iter().filter(|&&c| c != backdrop).count();
                tracing::debug!(frame = self.frame_number, backdrop, lit, "render");
            },
        }
    }

    pub fn save_screen_png<P: AsRef<Path>>(&self, path: P) -> Result<(), NesleError> {
        render::save_png(path, self.screen())
    }

    //------------------------------------------------------------------------------------------------------------------
    // State
    //------------------------------------------------------------------------------------------------------------------

    /// Push the current state onto the saved state stack
    pub fn save_state(&mut self) -> Result<(), NesleError> {
        let env = self.env_state()?;
        self.saved.push(SavedState { env, screen: self.screen().to_vec() });

        Ok(())
    }

    /// Pop the saved state stack. `false` when it is empty.
    /// A state that fails to apply stays on the stack.
    pub fn load_state(&mut self) -> Result<bool, NesleError> {
        let saved = match self.saved.pop() {
            Some(saved) => saved,
            None => return Ok(false),
        };

        if let Err(e) = self.apply_env_state(&saved.env) {
            self.saved.push(saved);
            return Err(e);
        }

        self.nes.set_frame(&saved.screen);

        Ok(true)
    }

    pub fn saved_state_count(&self) -> usize {
        self.saved.len()
    }

    /// Serialize the environment without its random generator
    pub fn clone_state(&self) -> Result<Vec<u8>, NesleError> {
        Ok(state::encode(&self.env_state()?, self.nes.rom_checksum())?)
    }

    pub fn clone_state_into(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        copy_blob(&self.clone_state()?, out)
    }

    pub fn state_size(&self) -> Result<usize, NesleError> {
        Ok(self.clone_state()?.len())
    }

    pub fn restore_state(&mut self, blob: &[u8]) -> Result<(), NesleError> {
        let env: EnvState = state::decode(blob, self.nes.rom_checksum())?;
        self.apply_env_state(&env)
    }

    /// Serialize the environment including its random generator
    pub fn clone_system_state(&self) -> Result<Vec<u8>, NesleError> {
        let system = SystemState {
            env: self.env_state()?,
            rng: self.rng.clone(),
            act_counter: self.act_counter,
        };

        Ok(state::encode(&system, self.nes.rom_checksum())?)
    }

    pub fn clone_system_state_into(&self, out: &mut [u8]) -> Result<usize, NesleError> {
        copy_blob(&self.clone_system_state()?, out)
    }

    pub fn restore_system_state(&mut self, blob: &[u8]) -> Result<(), NesleError> {
        let system: SystemState = state::decode(blob, self.nes.rom_checksum())?;
        self.apply_env_state(&system.env)?;
        self.rng = system.rng;
        self.act_counter = system.act_counter;

        Ok(())
    }

    /// Persist the system state to a file
    pub fn get_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), NesleError> {
        fs::write(path.as_ref(), self.clone_system_state()?)?;
        tracing::debug!(path = %path.as_ref().display(), "wrote snapshot");

        Ok(())
    }

    pub fn restore_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<(), NesleError> {
        let blob = fs::read(path.as_ref())?;
        self.restore_system_state(&blob)?;
        tracing::debug!(path = %path.as_ref().display(), "restored snapshot");

        Ok(())
    }

    fn env_state(&self) -> Result<EnvState, NesleError> {
        Ok(EnvState {
            machine: self.nes.save_state()?,
            settings: self.settings.save_state().map_err(nescore::StateError::from)?,
            frame_number: self.frame_number,
            episode_frame_number: self.episode_frame_number,
            last_action: self.last_action,
        })
    }

    /// Apply a decoded state. On error the environment is left as it was
    fn apply_env_state(&mut self, env: &EnvState) -> Result<(), NesleError> {
        let previous = self.settings.save_state().map_err(nescore::StateError::from)?;
        self.settings.load_state(&env.settings).map_err(nescore::StateError::from)?;

        if let Err(e) = self.nes.load_state(&env.machine) {
            self.settings.load_state(&previous).map_err(nescore::StateError::from)?;
            return Err(e.into());
        }

        self.frame_number = env.frame_number;
        self.episode_frame_number = env.episode_frame_number;
        self.last_action = env.last_action;

        Ok(())
    }
}

fn checked_output(out: &mut [u8], needed: usize) -> Result<&mut [u8], NesleError> {
    let capacity = out.len();
    out.get_mut(..needed).ok_or(NesleError::BufferTooSmall { needed, capacity })
}

fn copy_blob(blob: &[u8], out: &mut [u8]) -> Result<usize, NesleError> {
    let out = checked_output(out, blob.len())?;
    out.copy_from_slice(blob);

    Ok(blob.len())
}
