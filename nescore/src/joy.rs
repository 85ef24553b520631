//
// joy.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 14 2020
//

use serde::{Serialize, Deserialize};

use crate::common::IoAccess;

/// Standard controller buttons. The value is the bit position in the controller's report byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A      = 0,
    B      = 1,
    Select = 2,
    Start  = 3,
    Up     = 4,
    Down   = 5,
    Left   = 6,
    Right  = 7,
}

impl Button {
    /// Mask of this button within a report byte
    pub fn mask(self) -> u8 {
        bv!(self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Input1 = 0,
    Input2 = 1,
}

/// NES Joystick Control
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Joy {
    strobe: bool,          // While set the shift registers continuously reload
    ctrls_states: [u8; 2], // States for both standard controllers
    ctrls_shifts: [u8; 2], // Controller shift registers
}

impl Joy {
    pub fn input(&mut self, btn: Button, pressed: bool) {
        self.controller_input(Controller::Input1, btn, pressed)
    }

    pub fn controller_input(&mut self, ctrl: Controller, btn: Button, pressed: bool) {
        let state = &mut self.ctrls_states[ctrl as usize];
        bit_assign!(*state, btn as u8, pressed);

        self.apply_strobe();
    }

    /// Replace the full button state of a controller
    pub fn set_buttons(&mut self, ctrl: Controller, buttons: u8) {
        self.ctrls_states[ctrl as usize] = buttons;
        self.apply_strobe();
    }

    pub fn buttons(&self, ctrl: Controller) -> u8 {
        self.ctrls_states[ctrl as usize]
    }

    fn apply_strobe(&mut self) {
        if self.strobe {
            self.ctrls_shifts = self.ctrls_states;
        }
    }
}

impl IoAccess for Joy {
    fn read_byte(&mut self, addr: u16) -> u8 {
        match addr {
            0x4016 | 0x4017 => {
                let shift = &mut self.ctrls_shifts[(addr - 0x4016) as usize];
                let current_state = *shift & 0x01;

                // Official controllers report 1 after all eight buttons have been read
                if !self.strobe {
                    *shift = (*shift >> 1) | 0x80;
                }

                current_state
            },
            _ => 0,
        }
    }

    fn write_byte(&mut self, addr: u16, data: u8) {
        if addr == 0x4016 {
            self.strobe = bit_is_set!(data, 0);
            self.apply_strobe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latch(joy: &mut Joy) {
        joy.write_byte(0x4016, 0x01);
        joy.write_byte(0x4016, 0x00);
    }

    #[test]
    fn basic_input_1() {
        let mut joy = Joy::default();

        joy.input(Button::A, true);
        latch(&mut joy);

        assert_eq!(joy.read_byte(0x4016), 0x01);
    }

    #[test]
    fn basic_input_2() {
        let mut joy = Joy::default();

        joy.input(Button::A, true);
        joy.input(Button::B, true);
        latch(&mut joy);

        assert_eq!(joy.read_byte(0x4016), 0x01);
        assert_eq!(joy.read_byte(0x4016), 0x01);
        assert_eq!(joy.read_byte(0x4016), 0x00);
    }

    #[test]
    fn controller2_basic_input_1() {
        let mut joy = Joy::default();

        joy.controller_input(Controller::Input2, Button::A, true);
        latch(&mut joy);

        assert_eq!(joy.read_byte(0x4017), 0x01);
        assert_eq!(joy.read_byte(0x4016), 0x00);
    }

    #[test]
    fn report_order() {
        let mut joy = Joy::default();

        joy.set_buttons(Controller::Input1, Button::Start.mask() | Button::Right.mask());
        latch(&mut joy);

        let report: Vec<u8> = (0..8).map(|_| joy.read_byte(0x4016)).collect();
        assert_eq!(report, vec![0, 0, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn reads_one_after_report() {
        let mut joy = Joy::default();
        latch(&mut joy);

        for _ in 0..8 {
            assert_eq!(joy.read_byte(0x4016), 0x00);
        }
        assert_eq!(joy.read_byte(0x4016), 0x01);
    }

    #[test]
    fn strobe_high_reports_button_a() {
        let mut joy = Joy::default();
        joy.write_byte(0x4016, 0x01);
        joy.input(Button::A, true);

        assert_eq!(joy.read_byte(0x4016), 0x01);
        assert_eq!(joy.read_byte(0x4016), 0x01);
    }

    #[test]
    fn release_button() {
        let mut joy = Joy::default();
        joy.input(Button::B, true);
        joy.input(Button::B, false);

        assert_eq!(joy.buttons(Controller::Input1), 0x00);
    }
}
