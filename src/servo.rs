//! Servo position controller.
//!
//! Servos plug into the numbered ports. The controller remembers the last
//! angle written to each port so gradual moves know where they start from.
//! Every port starts at 90°.

use crate::ports::{Port, PORT_COUNT};
use crate::traits::{PinId, PinLayer};

/// Smallest servo angle.
pub const MIN_ANGLE: u8 = 0;
/// Largest servo angle.
pub const MAX_ANGLE: u8 = 180;
/// Angle every port is assumed to hold at start-up.
pub const DEFAULT_ANGLE: u8 = 90;

/// Clamps a requested angle to 0..=180.
#[inline]
pub fn clamp_angle(angle: i32) -> u8 {
    angle.clamp(i32::from(MIN_ANGLE), i32::from(MAX_ANGLE)) as u8
}

/// Last written angle per port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServoTable {
    angles: [u8; PORT_COUNT],
}

impl Default for ServoTable {
    fn default() -> Self {
        Self {
            angles: [DEFAULT_ANGLE; PORT_COUNT],
        }
    }
}

impl ServoTable {
    /// Tracked angle of `port`.
    #[inline]
    pub fn angle(&self, port: Port) -> u8 {
        self.angles[port.index()]
    }

    fn set(&mut self, port: Port, angle: u8) {
        self.angles[port.index()] = angle;
    }
}

/// Servo controller over the auxiliary ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServoController {
    pins: [PinId; PORT_COUNT],
    table: ServoTable,
}

impl ServoController {
    /// Creates a controller with every port at [`DEFAULT_ANGLE`].
    pub fn new(pins: [PinId; PORT_COUNT]) -> Self {
        Self {
            pins,
            table: ServoTable::default(),
        }
    }

    /// Tracked angle of `port`.
    #[inline]
    pub fn position(&self, port: Port) -> u8 {
        self.table.angle(port)
    }

    /// Position table.
    #[inline]
    pub fn table(&self) -> &ServoTable {
        &self.table
    }

    /// Writes `angle` (clamped to 0..=180) and records it.
    pub fn set_angle<P: PinLayer>(&mut self, pins: &mut P, port: Port, angle: i32) -> Result<(), P::Error> {
        let angle = clamp_angle(angle);
        pins.servo_write(self.pins[port.index()], angle)?;
        self.table.set(port, angle);
        Ok(())
    }

    /// Sweeps to `angle` one degree at a time, pausing `step_delay_ms`
    /// (at least 1) after each step.
    ///
    /// Blocks for about `|target - current| * step_delay_ms` milliseconds. The
    /// table is updated once the target is reached. Returns the number of
    /// degree steps taken.
    pub fn move_gradual<P: PinLayer>(
        &mut self,
        pins: &mut P,
        port: Port,
        angle: i32,
        step_delay_ms: i32,
    ) -> Result<u32, P::Error> {
        let target = clamp_angle(angle);
        let step_delay_ms = step_delay_ms.max(1) as u32;
        let pin = self.pins[port.index()];
        let mut current = self.table.angle(port);

        if current == target {
            pins.servo_write(pin, target)?;
            return Ok(0);
        }

        let mut steps = 0;
        while current != target {
            current = if target > current {
                current + 1
            } else {
                current - 1
            };
            pins.servo_write(pin, current)?;
            pins.pause_ms(step_delay_ms);
            steps += 1;
        }

        self.table.set(port, target);
        log::debug!(
            "servo port {} reached {} in {} steps",
            port.number(),
            target,
            steps
        );
        Ok(steps)
    }
}
