//
// settings/mod.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 07 2021
//

//! Per-game reward, score, lives and terminal extraction from CPU RAM.

mod smb;
mod generic;

pub use smb::SuperMarioBros;
pub use generic::GenericSettings;

use crate::action::Action;
use crate::config::Game;

use std::path::Path;

/// Game specific view of the console
pub trait GameSettings {
    fn name(&self) -> &'static str;

    /// Start a new episode. `ram` is the console RAM once the start-up actions have run
    fn reset(&mut self, ram: &[u8]);

    /// Observe RAM after an emulated frame
    fn step(&mut self, ram: &[u8]);

    /// Reward for the last observed frame
    fn reward(&self) -> i32;
    fn score(&self) -> i32;
    fn is_terminal(&self) -> bool;
    fn lives(&self) -> i32;

    fn min_reward(&self) -> i32;
    fn max_reward(&self) -> i32;

    fn minimal_actions(&self) -> Vec<Action>;

    /// Actions applied one per frame after power on, before the episode starts
    fn starting_actions(&self) -> Vec<Action>;

    fn is_minimal(&self, action: Action) -> bool {
        self.minimal_actions().contains(&action)
    }

    /// Serialize the tracking state needed to resume an episode
    fn save_state(&self) -> Result<Vec<u8>, bincode::Error>;
    fn load_state(&mut self, data: &[u8]) -> Result<(), bincode::Error>;
}

/// Select game settings, detecting the game from the ROM file name when asked to
pub fn select<P: AsRef<Path>>(game: Game, rom_path: P, eb_compatible: bool) -> Box<dyn GameSettings> {
    let game = match game {
        Game::Auto => detect(rom_path.as_ref()),
        game => game,
    };

    tracing::debug!(?game, "selected game settings");

    match game {
        Game::SuperMarioBros => Box::new(SuperMarioBros::new(eb_compatible)),
        _ => Box::new(GenericSettings::default()),
    }
}

fn detect(rom_path: &Path) -> Game {
    let name = rom_path
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if name.contains("mario") {
        Game::SuperMarioBros
    }
    else {
        Game::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_from_file_name() {
        assert_eq!(select(Game::Auto, "roms/Super Mario Bros (JU).nes", false).name(), "smb");
        assert_eq!(select(Game::Auto, "roms/mario.nes", true).name(), "smb");
        assert_eq!(select(Game::Auto, "roms/tetris.nes", false).name(), "generic");
        // Only the file name is considered
        assert_eq!(select(Game::Auto, "mario/tetris.nes", false).name(), "generic");
    }

    #[test]
    fn explicit_game_wins() {
        assert_eq!(select(Game::Generic, "mario.nes", false).name(), "generic");
        assert_eq!(select(Game::SuperMarioBros, "game.nes", false).name(), "smb");
    }
}
