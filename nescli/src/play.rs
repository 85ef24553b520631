//
// play.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 20 2021
//

use clap::Args;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use nesle::{NesInterface, EnvConfig, Action, NesleError};

#[derive(Args, Debug)]
pub struct Options {
    /// The ROM file to run
    pub rom: String,
    /// Number of episodes
    #[arg(long, default_value_t = 1)]
    pub episodes: u32,
    /// Frames each action is held for
    #[arg(long = "frame-skip", default_value_t = 4)]
    pub frame_skip: u32,
    /// Seed for the agent and the environment
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Episode frame limit, 0 for none
    #[arg(long = "max-frames", default_value_t = 10000)]
    pub max_frames: u64,
    /// Use eb-compatible rewards
    #[arg(long)]
    pub eb: bool,
}

pub fn dispatch(opts: Options) -> Result<(), NesleError> {
    let config = EnvConfig::from_env(opts.eb)?
        .frame_skip(opts.frame_skip)
        .seed(opts.seed)
        .max_num_frames_per_episode(opts.max_frames);

    let mut env = NesInterface::with_config(&opts.rom, config)?;
    let actions = env.minimal_action_set();
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);

    tracing::info!(game = env.game_name(), actions = actions.len(), "playing");

    for episode in 0..opts.episodes {
        if episode > 0 {
            env.reset_game()?;
        }

        let mut total = 0i64;
        while !env.game_over() {
            let action = actions.choose(&mut rng).copied().unwrap_or(Action::Noop);
            total += env.act_with(action) as i64;
        }

        println!("Episode {} ended with reward {} after {} frames", episode, total, env.episode_frame_number());
    }

    Ok(())
}
