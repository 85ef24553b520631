//
// settings/generic.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 07 2021
//

use super::GameSettings;
use crate::action::{Action, LEGAL_ACTIONS};

/// Fallback for games without dedicated settings. No reward and no terminal state
#[derive(Default)]
pub struct GenericSettings;

impl GameSettings for GenericSettings {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn reset(&mut self, _ram: &[u8]) {}

    fn step(&mut self, _ram: &[u8]) {}

    fn reward(&self) -> i32 {
        0
    }

    fn score(&self) -> i32 {
        0
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn lives(&self) -> i32 {
        0
    }

    fn min_reward(&self) -> i32 {
        0
    }

    fn max_reward(&self) -> i32 {
        0
    }

    fn minimal_actions(&self) -> Vec<Action> {
        LEGAL_ACTIONS.to_vec()
    }

    fn starting_actions(&self) -> Vec<Action> {
        vec![]
    }

    fn save_state(&self) -> Result<Vec<u8>, bincode::Error> {
        Ok(vec![])
    }

    fn load_state(&mut self, _data: &[u8]) -> Result<(), bincode::Error> {
        Ok(())
    }
}
