//! Control commands
//!
//! Human input and the decision agent produce the same [`ControlCommand`]
//! record, so the simulation treats both sides uniformly. Input is sampled
//! once per tick into an [`InputSnapshot`] and passed explicitly to every
//! consumer that tick.

use serde::{Deserialize, Serialize};

use crate::game::state::ShipId;

/// One tick of controls for one ship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub shoot: bool,
    pub hyperspace: bool,
    pub shield: bool,
}

impl ControlCommand {
    /// No buttons held
    pub const IDLE: ControlCommand = ControlCommand {
        rotate_left: false,
        rotate_right: false,
        thrust: false,
        shoot: false,
        hyperspace: false,
        shield: false,
    };

    /// Net rotation direction: -1 (left), 0, or +1 (right)
    pub fn rotation(&self) -> i8 {
        match (self.rotate_left, self.rotate_right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Commands for both ships, sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub commands: [ControlCommand; 2],
}

impl InputSnapshot {
    pub fn new(one: ControlCommand, two: ControlCommand) -> Self {
        Self {
            commands: [one, two],
        }
    }

    #[inline]
    pub fn get(&self, id: ShipId) -> ControlCommand {
        self.commands[id.index()]
    }

    pub fn set(&mut self, id: ShipId, command: ControlCommand) {
        self.commands[id.index()] = command;
    }
}

/// Source of human input (keyboard, gamepad, replay, test script)
pub trait InputSource {
    /// Sample the current controls. Called exactly once per tick.
    fn poll(&mut self, tick: u64) -> InputSnapshot;
}

/// Input source with nothing pressed, for computer-only matches
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll(&mut self, _tick: u64) -> InputSnapshot {
        InputSnapshot::default()
    }
}

impl<F> InputSource for F
where
    F: FnMut(u64) -> InputSnapshot,
{
    fn poll(&mut self, tick: u64) -> InputSnapshot {
        self(tick)
    }
}
