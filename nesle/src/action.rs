//
// action.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 06 2021
//

//! Action codes accepted by the environment.
//!
//! The first 18 codes follow the Arcade Learning Environment with FIRE on the `A` button.
//! The remaining codes cover the `B`, `Start` and `Select` buttons.

use nescore::Button;
use serde::{Serialize, Deserialize};

use std::convert::TryFrom;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Noop = 0,
    Fire,
    Up,
    Right,
    Left,
    Down,
    UpRight,
    UpLeft,
    DownRight,
    DownLeft,
    UpFire,
    RightFire,
    LeftFire,
    DownFire,
    UpRightFire,
    UpLeftFire,
    DownRightFire,
    DownLeftFire,
    B,
    RightB,
    LeftB,
    RightFireB,
    LeftFireB,
    Start,
    Select,
}

/// Number of action codes
pub const NUM_ACTIONS: usize = 25;

/// Every action, indexed by code
pub const LEGAL_ACTIONS: [Action; NUM_ACTIONS] = [
    Action::Noop,
    Action::Fire,
    Action::Up,
    Action::Right,
    Action::Left,
    Action::Down,
    Action::UpRight,
    Action::UpLeft,
    Action::DownRight,
    Action::DownLeft,
    Action::UpFire,
    Action::RightFire,
    Action::LeftFire,
    Action::DownFire,
    Action::UpRightFire,
    Action::UpLeftFire,
    Action::DownRightFire,
    Action::DownLeftFire,
    Action::B,
    Action::RightB,
    Action::LeftB,
    Action::RightFireB,
    Action::LeftFireB,
    Action::Start,
    Action::Select,
];

impl Action {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Buttons held for this action
    pub fn buttons(self) -> &'static [Button] {
        match self {
            Action::Noop          => &[],
            Action::Fire          => &[Button::A],
            Action::Up            => &[Button::Up],
            Action::Right         => &[Button::Right],
            Action::Left          => &[Button::Left],
            Action::Down          => &[Button::Down],
            Action::UpRight       => &[Button::Up, Button::Right],
            Action::UpLeft        => &[Button::Up, Button::Left],
            Action::DownRight     => &[Button::Down, Button::Right],
            Action::DownLeft      => &[Button::Down, Button::Left],
            Action::UpFire        => &[Button::Up, Button::A],
            Action::RightFire     => &[Button::Right, Button::A],
            Action::LeftFire      => &[Button::Left, Button::A],
            Action::DownFire      => &[Button::Down, Button::A],
            Action::UpRightFire   => &[Button::Up, Button::Right, Button::A],
            Action::UpLeftFire    => &[Button::Up, Button::Left, Button::A],
            Action::DownRightFire => &[Button::Down, Button::Right, Button::A],
            Action::DownLeftFire  => &[Button::Down, Button::Left, Button::A],
            Action::B             => &[Button::B],
            Action::RightB        => &[Button::Right, Button::B],
            Action::LeftB         => &[Button::Left, Button::B],
            Action::RightFireB    => &[Button::Right, Button::A, Button::B],
            Action::LeftFireB     => &[Button::Left, Button::A, Button::B],
            Action::Start         => &[Button::Start],
            Action::Select        => &[Button::Select],
        }
    }

    /// Joypad byte for this action (A in bit 0, Right in bit 7)
    pub fn joypad(self) -> u8 {
        self.buttons().iter().fold(0, |acc, btn| acc | btn.mask())
    }
}

impl TryFrom<i32> for Action {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| LEGAL_ACTIONS.get(idx).copied())
            .ok_or(code)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table_position() {
        for (i, action) in LEGAL_ACTIONS.iter().enumerate() {
            assert_eq!(action.code(), i as i32);
            assert_eq!(Action::try_from(i as i32), Ok(*action));
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(Action::try_from(-1), Err(-1));
        assert_eq!(Action::try_from(25), Err(25));
    }

    #[test]
    fn joypad_bits() {
        assert_eq!(Action::Noop.joypad(), 0x00);
        assert_eq!(Action::Fire.joypad(), 0x01);
        assert_eq!(Action::B.joypad(), 0x02);
        assert_eq!(Action::Select.joypad(), 0x04);
        assert_eq!(Action::Start.joypad(), 0x08);
        assert_eq!(Action::DownRightFire.joypad(), 0x01 | 0x20 | 0x80);
        assert_eq!(Action::LeftFireB.joypad(), 0x01 | 0x02 | 0x40);
    }
}
