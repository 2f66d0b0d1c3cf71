//! Two-motor drive unit.
//!
//! Maps a [`MotorCommand`] (direction, motor selector, speed 0..100) onto
//! a direction-pin level and a PWM duty for each selected motor.
//!
//! # Direction Resolution
//!
//! Levels come from the active [`PolarityTable`]. [`Forward`](Direction::Forward)
//! and [`Backward`](Direction::Backward) give both motors the same logical
//! direction; the turns give one motor its forward level and the other its
//! backward level for an in-place pivot.
//!
//! Selecting a single motor applies that motor's entry from the table for the
//! requested direction. A turn with one motor selected therefore drives that
//! motor in its turn sense only; the resulting robot motion is not a
//! translation.
//!
//! # Example
//!
//! ```rust
//! use beatbot::motor::{Direction, MotorCommand, MotorDrive, MotorSelect};
//! use beatbot::config::Config;
//! use beatbot::hal::MockPins;
//! use beatbot::traits::Level;
//!
//! let config = Config::default();
//! let drive = MotorDrive::from_config(&config);
//! let mut pins = MockPins::new();
//!
//! drive.drive(&mut pins, MotorCommand::new(Direction::Forward, MotorSelect::Both, 100)).unwrap();
//!
//! let left = config.pins.left_motor;
//! assert_eq!(pins.digital_output(left.direction), Some(Level::High));
//! assert_eq!(pins.analog_output(left.pwm), Some(1023));
//! ```

use crate::config::{Config, MotorPins, PolarityTable};
use crate::traits::{Level, PinLayer, MAX_DUTY};

/// Speed used by [`MotorDrive::move_default`].
pub const DEFAULT_SPEED_PERCENT: i32 = 50;

/// Highest accepted speed percentage.
pub const MAX_SPEED_PERCENT: i32 = 100;

// ============================================================================
// Command Types
// ============================================================================

/// Requested robot motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Both motors forward.
    Forward,
    /// Both motors backward.
    Backward,
    /// Pivot left: left motor backward, right motor forward.
    TurnLeft,
    /// Pivot right: left motor forward, right motor backward.
    TurnRight,
}

impl Direction {
    /// All directions, in polarity-table order.
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::TurnLeft,
        Direction::TurnRight,
    ];

    /// Index of this direction in a polarity table.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
            Direction::TurnLeft => 2,
            Direction::TurnRight => 3,
        }
    }

    /// Returns the direction as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::TurnLeft => "left",
            Direction::TurnRight => "right",
        }
    }

    /// Parse a direction from text input.
    ///
    /// Accepts full names and short forms. Input is trimmed and
    /// case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use beatbot::motor::Direction;
    ///
    /// assert_eq!(Direction::from_text("forward"), Some(Direction::Forward));
    /// assert_eq!(Direction::from_text("BACK"), Some(Direction::Backward));
    /// assert_eq!(Direction::from_text(" left "), Some(Direction::TurnLeft));
    /// assert_eq!(Direction::from_text("sideways"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" | "ahead" => Some(Direction::Forward),
            "backward" | "back" | "reverse" | "rev" => Some(Direction::Backward),
            "left" | "turn-left" | "turnleft" => Some(Direction::TurnLeft),
            "right" | "turn-right" | "turnright" => Some(Direction::TurnRight),
            _ => None,
        }
    }
}

/// One physical drive motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Motor {
    /// Left-hand motor.
    Left,
    /// Right-hand motor.
    Right,
}

/// Which motor(s) a command applies to.
///
/// # Default
///
/// Defaults to [`Both`](Self::Both).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MotorSelect {
    /// Both motors.
    #[default]
    Both,
    /// Left motor only.
    Left,
    /// Right motor only.
    Right,
}

impl MotorSelect {
    /// Returns true if `motor` is covered by this selection.
    #[inline]
    pub const fn includes(self, motor: Motor) -> bool {
        matches!(
            (self, motor),
            (MotorSelect::Both, _)
                | (MotorSelect::Left, Motor::Left)
                | (MotorSelect::Right, Motor::Right)
        )
    }

    /// Returns the selector as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MotorSelect::Both => "both",
            MotorSelect::Left => "left",
            MotorSelect::Right => "right",
        }
    }

    /// Parse a selector from text input (trimmed, case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use beatbot::motor::MotorSelect;
    ///
    /// assert_eq!(MotorSelect::from_text("both"), Some(MotorSelect::Both));
    /// assert_eq!(MotorSelect::from_text("L"), Some(MotorSelect::Left));
    /// assert_eq!(MotorSelect::from_text("middle"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" | "all" => Some(MotorSelect::Both),
            "left" | "l" => Some(MotorSelect::Left),
            "right" | "r" => Some(MotorSelect::Right),
            _ => None,
        }
    }
}

/// A single drive request. Lives only for the duration of one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorCommand {
    /// Requested motion.
    pub direction: Direction,
    /// Motor(s) that receive the write.
    pub select: MotorSelect,
    /// Speed in percent; clamped to 0..=100 when applied.
    pub speed_percent: i32,
}

impl MotorCommand {
    /// Creates a command.
    pub const fn new(direction: Direction, select: MotorSelect, speed_percent: i32) -> Self {
        Self {
            direction,
            select,
            speed_percent,
        }
    }

    /// Creates a command at [`DEFAULT_SPEED_PERCENT`].
    pub const fn at_default_speed(direction: Direction, select: MotorSelect) -> Self {
        Self::new(direction, select, DEFAULT_SPEED_PERCENT)
    }
}

/// Rescales a speed percentage to a PWM duty.
///
/// The input is clamped to 0..=100, mapped linearly onto 0..=1023, and the
/// result clamped again.
///
/// # Examples
///
/// ```
/// use beatbot::motor::speed_to_duty;
///
/// assert_eq!(speed_to_duty(0), 0);
/// assert_eq!(speed_to_duty(50), 511);
/// assert_eq!(speed_to_duty(100), 1023);
/// assert_eq!(speed_to_duty(250), 1023);
/// assert_eq!(speed_to_duty(-10), 0);
/// ```
pub fn speed_to_duty(speed_percent: i32) -> u16 {
    let speed = speed_percent.clamp(0, MAX_SPEED_PERCENT);
    let duty = speed * i32::from(MAX_DUTY) / MAX_SPEED_PERCENT;
    duty.clamp(0, i32::from(MAX_DUTY)) as u16
}

// ============================================================================
// Drive Unit
// ============================================================================

/// Pin writes computed for one motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorOutput {
    /// Level for the direction pin.
    pub direction: Level,
    /// PWM duty (0..=1023).
    pub duty: u16,
}

/// Per-motor outputs for one command. `None` means the motor is not written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DrivePlan {
    /// Left motor writes.
    pub left: Option<MotorOutput>,
    /// Right motor writes.
    pub right: Option<MotorOutput>,
}

/// Two-motor drive unit.
///
/// Holds the pin pairs and the active polarity table. Stateless apart from
/// configuration; every call writes directly to the pin layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MotorDrive {
    left: MotorPins,
    right: MotorPins,
    polarity: PolarityTable,
}

impl MotorDrive {
    /// Creates a drive unit.
    pub const fn new(left: MotorPins, right: MotorPins, polarity: PolarityTable) -> Self {
        Self {
            left,
            right,
            polarity,
        }
    }

    /// Creates a drive unit from the motor section of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pins.left_motor,
            config.pins.right_motor,
            config.polarity,
        )
    }

    /// Returns the active polarity table.
    #[inline]
    pub fn polarity(&self) -> &PolarityTable {
        &self.polarity
    }

    /// Replaces the polarity table (wiring change).
    pub fn set_polarity(&mut self, polarity: PolarityTable) {
        self.polarity = polarity;
    }

    /// Computes the pin writes for `cmd` without touching hardware.
    pub fn plan(&self, cmd: MotorCommand) -> DrivePlan {
        let duty = speed_to_duty(cmd.speed_percent);
        let output = |motor| MotorOutput {
            direction: self.polarity.level(motor, cmd.direction),
            duty,
        };

        DrivePlan {
            left: cmd.select.includes(Motor::Left).then(|| output(Motor::Left)),
            right: cmd.select.includes(Motor::Right).then(|| output(Motor::Right)),
        }
    }

    /// Applies `cmd`: one direction write and one PWM write per selected motor.
    pub fn drive<P: PinLayer>(&self, pins: &mut P, cmd: MotorCommand) -> Result<(), P::Error> {
        if cmd.speed_percent != cmd.speed_percent.clamp(0, MAX_SPEED_PERCENT) {
            log::debug!("speed {}% clamped to 0..=100", cmd.speed_percent);
        }

        let plan = self.plan(cmd);
        if let Some(out) = plan.left {
            Self::apply(pins, self.left, out)?;
        }
        if let Some(out) = plan.right {
            Self::apply(pins, self.right, out)?;
        }

        log::trace!(
            "drive {} {} -> {:?}",
            cmd.direction.as_str(),
            cmd.select.as_str(),
            plan
        );
        Ok(())
    }

    /// Shorthand for [`drive`](Self::drive) at [`DEFAULT_SPEED_PERCENT`].
    pub fn move_default<P: PinLayer>(
        &self,
        pins: &mut P,
        direction: Direction,
        select: MotorSelect,
    ) -> Result<(), P::Error> {
        self.drive(pins, MotorCommand::at_default_speed(direction, select))
    }

    /// Zeroes PWM on the selected motor(s). Direction pins are left alone so
    /// the motor coasts.
    pub fn stop<P: PinLayer>(&self, pins: &mut P, select: MotorSelect) -> Result<(), P::Error> {
        if select.includes(Motor::Left) {
            pins.analog_write(self.left.pwm, 0)?;
        }
        if select.includes(Motor::Right) {
            pins.analog_write(self.right.pwm, 0)?;
        }
        log::trace!("stop {}", select.as_str());
        Ok(())
    }

    fn apply<P: PinLayer>(pins: &mut P, motor: MotorPins, out: MotorOutput) -> Result<(), P::Error> {
        pins.digital_write(motor.direction, out.direction)?;
        pins.analog_write(motor.pwm, out.duty)
    }
}
