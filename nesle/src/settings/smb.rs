//
// settings/smb.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 07 2021
//

use super::GameSettings;
use crate::action::Action;

use serde::{Serialize, Deserialize};

const SCORE_DIGITS: std::ops::RangeInclusive<usize> = 0x07DE..=0x07E3;
const LIVES: usize = 0x075A;
const PLAYER_STATE: usize = 0x000E;
const VIEWPORT_Y: usize = 0x00B5;
const PAGE_X: usize = 0x006D;
const SCREEN_X: usize = 0x0086;

const PLAYER_DYING: u8 = 0x0B;
const PLAYER_DEAD: u8 = 0x06;

/// Horizontal jumps larger than this are level transitions or respawns
const MAX_PROGRESS_STEP: i32 = 5;
const DEATH_PENALTY: i32 = -15;
const EB_REWARD_RANGE: (i32, i32) = (-15, 15);
const SCORE_REWARD_RANGE: (i32, i32) = (0, 10000);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tracking {
    reward: i32,
    score: i32,
    lives: i32,
    terminal: bool,
    dying: bool,
    x: i32,
}

/// Super Mario Bros.
pub struct SuperMarioBros {
    eb_compatible: bool,
    state: Tracking,
}

impl SuperMarioBros {
    pub fn new(eb_compatible: bool) -> Self {
        SuperMarioBros {
            eb_compatible,
            state: Tracking::default(),
        }
    }

    fn read_score(ram: &[u8]) -> i32 {
        ram[SCORE_DIGITS].iter().fold(0, |acc, &digit| acc * 10 + (digit % 10) as i32) * 10
    }

    fn read_lives(ram: &[u8]) -> i32 {
        match ram[LIVES] {
            0xFF => 0,
            n => n as i32 + 1,
        }
    }

    fn read_x(ram: &[u8]) -> i32 {
        ram[PAGE_X] as i32 * 256 + ram[SCREEN_X] as i32
    }

    fn is_dying(ram: &[u8]) -> bool {
        matches!(ram[PLAYER_STATE], PLAYER_DYING | PLAYER_DEAD) || ram[VIEWPORT_Y] > 1
    }

    fn observe(&mut self, ram: &[u8]) {
        self.state.score = Self::read_score(ram);
        self.state.lives = Self::read_lives(ram);
        self.state.terminal = ram[LIVES] == 0xFF;
        self.state.dying = Self::is_dying(ram);
        self.state.x = Self::read_x(ram);
    }
}

impl GameSettings for SuperMarioBros {
    fn name(&self) -> &'static str {
        "smb"
    }

    fn reset(&mut self, ram: &[u8]) {
        self.state = Tracking::default();
        self.observe(ram);
    }

    fn step(&mut self, ram: &[u8]) {
        let prev = self.state.clone();
        self.observe(ram);

        self.state.reward = if self.eb_compatible {
            let dx = match self.state.x - prev.x {
                dx if dx.abs() > MAX_PROGRESS_STEP => 0,
                dx => dx,
            };

            let death = if self.state.dying && !prev.dying { DEATH_PENALTY } else { 0 };

            (dx + death).clamp(EB_REWARD_RANGE.0, EB_REWARD_RANGE.1)
        }
        else {
            (self.state.score - prev.score).max(0)
        };
    }

    fn reward(&self) -> i32 {
        self.state.reward
    }

    fn score(&self) -> i32 {
        self.state.score
    }

    fn is_terminal(&self) -> bool {
        self.state.terminal
    }

    fn lives(&self) -> i32 {
        self.state.lives
    }

    fn min_reward(&self) -> i32 {
        if self.eb_compatible { EB_REWARD_RANGE.0 } else { SCORE_REWARD_RANGE.0 }
    }

    fn max_reward(&self) -> i32 {
        if self.eb_compatible { EB_REWARD_RANGE.1 } else { SCORE_REWARD_RANGE.1 }
    }

    fn minimal_actions(&self) -> Vec<Action> {
        vec![
            Action::Noop,
            Action::Right,
            Action::RightFire,
            Action::RightB,
            Action::RightFireB,
            Action::Fire,
            Action::Left,
            Action::LeftFire,
            Action::LeftB,
            Action::LeftFireB,
            Action::Down,
            Action::Up,
        ]
    }

    fn starting_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::Noop; 100];
        actions.extend([Action::Start; 3]);
        actions.extend([Action::Noop; 150]);
        actions
    }

    fn save_state(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(&self.state)
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), bincode::Error> {
        self.state = bincode::deserialize(data)?;
        Ok(())
    }
}
