//! Text command surface for the robot.
//!
//! Block-level front ends (the desktop simulator, a serial console) speak to
//! the drivers through whitespace-separated commands. Each line parses into a
//! [`Command`], and [`Robot::execute`] runs it and returns an [`Outcome`].
//!
//! # Grammar
//!
//! | Command | Meaning |
//! |---------|---------|
//! | `move <dir> [motor]` | drive at the default 50 % |
//! | `drive <dir> <motor> <speed>` | drive at `speed` percent |
//! | `stop [motor]` | cut PWM |
//! | `line` | classify the line position |
//! | `over <sensor>` | is one line sensor over the line |
//! | `distance` | ultrasonic range in cm |
//! | `analog <port>` | raw analog sample |
//! | `touch <port>` | touch button state |
//! | `temp <port>` / `humidity <port>` | DHT11 reading |
//! | `lcd init` / `lcd clear` / `lcd <col> <row> <text...>` | display |
//! | `fan <port> on\|off\|<percent>` | fan actuator |
//! | `servo <port> <angle> [step_ms]` | servo, gradual when `step_ms` is given |
//!
//! Keywords are case-insensitive. Numbers are signed integers; range clamping
//! happens in the drivers, not here.
//!
//! ```rust
//! use beatbot::{Command, Outcome, Robot, hal::MockPins};
//!
//! let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
//!
//! let cmd: Command = "servo p1 120 5".parse().unwrap();
//! assert_eq!(robot.execute(&cmd).unwrap(), Outcome::Steps(30));
//!
//! assert!("servo p9 120".parse::<Command>().is_err());
//! ```

use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use crate::line::{LinePosition, LineSensor};
use crate::motor::{Direction, MotorSelect};
use crate::ports::Port;
use crate::readings::ReadingText;
use crate::robot::Robot;
use crate::traits::PinLayer;

// ============================================================================
// Commands
// ============================================================================

/// What to do with a fan port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanSetting {
    /// Fully on.
    On,
    /// Off.
    Off,
    /// PWM speed in percent.
    Speed(i32),
}

/// A parsed robot command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Drive at the default speed.
    Move {
        /// Requested motion.
        direction: Direction,
        /// Motors to drive.
        select: MotorSelect,
    },
    /// Drive at an explicit speed.
    Drive {
        /// Requested motion.
        direction: Direction,
        /// Motors to drive.
        select: MotorSelect,
        /// Speed in percent.
        speed_percent: i32,
    },
    /// Cut PWM.
    Stop(MotorSelect),
    /// Classify the line position.
    Line,
    /// Query one line sensor.
    Over(LineSensor),
    /// Ultrasonic range.
    Distance,
    /// Raw analog sample.
    Analog(Port),
    /// Touch button state.
    Touch(Port),
    /// DHT11 temperature.
    Temperature(Port),
    /// DHT11 humidity.
    Humidity(Port),
    /// Initialize the display.
    LcdInit,
    /// Clear the display.
    LcdClear,
    /// Write text on the display.
    LcdWrite {
        /// Start column.
        column: i32,
        /// Row.
        row: i32,
        /// Text to show.
        text: String,
    },
    /// Drive a fan.
    Fan(Port, FanSetting),
    /// Position a servo.
    Servo {
        /// Servo port.
        port: Port,
        /// Target angle.
        angle: i32,
        /// Per-degree delay for a gradual move; `None` jumps straight there.
        step_delay_ms: Option<i32>,
    },
}

/// Why a command line failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.
    Empty,
    /// First word is not a command.
    UnknownCommand(String),
    /// A required argument is absent.
    Missing(&'static str),
    /// An argument did not parse as the expected kind.
    Invalid {
        /// Kind of value expected.
        expected: &'static str,
        /// Offending token.
        token: String,
    },
    /// Extra words after a complete command.
    Unexpected(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::UnknownCommand(word) => write!(f, "unknown command '{}'", word),
            ParseError::Missing(what) => write!(f, "missing {}", what),
            ParseError::Invalid { expected, token } => {
                write!(f, "expected {}, got '{}'", expected, token)
            }
            ParseError::Unexpected(token) => write!(f, "unexpected '{}'", token),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Word-at-a-time reader over a command line.
struct Words<'a> {
    iter: core::str::SplitWhitespace<'a>,
}

impl<'a> Words<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            iter: line.split_whitespace(),
        }
    }

    fn next_word(&mut self) -> Option<&'a str> {
        self.iter.next()
    }

    fn required<T>(
        &mut self,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, ParseError> {
        let token = self.next_word().ok_or(ParseError::Missing(expected))?;
        parse(token).ok_or_else(|| ParseError::Invalid {
            expected,
            token: token.to_string(),
        })
    }

    fn optional<T>(
        &mut self,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, ParseError> {
        match self.next_word() {
            None => Ok(None),
            Some(token) => parse(token).map(Some).ok_or_else(|| ParseError::Invalid {
                expected,
                token: token.to_string(),
            }),
        }
    }

    fn rest(&mut self) -> String {
        let mut text = String::new();
        for word in self.iter.by_ref() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(word);
        }
        text
    }

    fn finish(mut self, cmd: Command) -> Result<Command, ParseError> {
        match self.next_word() {
            None => Ok(cmd),
            Some(token) => Err(ParseError::Unexpected(token.to_string())),
        }
    }
}

fn integer(token: &str) -> Option<i32> {
    token.parse().ok()
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = Words::new(line);
        let keyword = words.next_word().ok_or(ParseError::Empty)?;

        let cmd = match keyword.to_ascii_lowercase().as_str() {
            "move" => Command::Move {
                direction: words.required("direction", Direction::from_text)?,
                select: words
                    .optional("motor", MotorSelect::from_text)?
                    .unwrap_or_default(),
            },
            "drive" => Command::Drive {
                direction: words.required("direction", Direction::from_text)?,
                select: words.required("motor", MotorSelect::from_text)?,
                speed_percent: words.required("speed", integer)?,
            },
            "stop" => Command::Stop(
                words
                    .optional("motor", MotorSelect::from_text)?
                    .unwrap_or_default(),
            ),
            "line" => Command::Line,
            "over" => Command::Over(words.required("sensor", LineSensor::from_text)?),
            "distance" | "dist" => Command::Distance,
            "analog" => Command::Analog(words.required("port", Port::from_text)?),
            "touch" => Command::Touch(words.required("port", Port::from_text)?),
            "temp" | "temperature" => Command::Temperature(words.required("port", Port::from_text)?),
            "humidity" => Command::Humidity(words.required("port", Port::from_text)?),
            "lcd" => return parse_lcd(words),
            "fan" => Command::Fan(
                words.required("port", Port::from_text)?,
                words.required("on, off or percent", fan_setting)?,
            ),
            "servo" => Command::Servo {
                port: words.required("port", Port::from_text)?,
                angle: words.required("angle", integer)?,
                step_delay_ms: words.optional("step delay", integer)?,
            },
            _ => return Err(ParseError::UnknownCommand(keyword.to_string())),
        };
        words.finish(cmd)
    }
}

fn parse_lcd(mut words: Words<'_>) -> Result<Command, ParseError> {
    let first = words.next_word().ok_or(ParseError::Missing("lcd action"))?;
    if first.eq_ignore_ascii_case("init") {
        return words.finish(Command::LcdInit);
    }
    if first.eq_ignore_ascii_case("clear") {
        return words.finish(Command::LcdClear);
    }

    let column = integer(first).ok_or_else(|| ParseError::Invalid {
        expected: "init, clear or column",
        token: first.to_string(),
    })?;
    let row = words.required("row", integer)?;
    Ok(Command::LcdWrite {
        column,
        row,
        text: words.rest(),
    })
}

fn fan_setting(token: &str) -> Option<FanSetting> {
    if token.eq_ignore_ascii_case("on") {
        Some(FanSetting::On)
    } else if token.eq_ignore_ascii_case("off") {
        Some(FanSetting::Off)
    } else {
        integer(token).map(FanSetting::Speed)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of executing a [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Actuator command completed.
    Done,
    /// Range in cm (0 = no echo).
    Distance(u32),
    /// Classified line position.
    Line(LinePosition),
    /// Whether the queried sensor is over the line.
    Over(bool),
    /// Raw analog sample.
    Raw(u16),
    /// Touch button state.
    Pressed(bool),
    /// Reading already in text form (DHT11 values or `"ERR"`).
    Text(ReadingText),
    /// Degree steps taken by a gradual servo move.
    Steps(u32),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "ok"),
            Outcome::Distance(cm) => write!(f, "{} cm", cm),
            Outcome::Line(position) => write!(f, "{}", position.as_str()),
            Outcome::Over(over) | Outcome::Pressed(over) => write!(f, "{}", over),
            Outcome::Raw(value) => write!(f, "{}", value),
            Outcome::Text(text) => write!(f, "{}", text),
            Outcome::Steps(steps) => write!(f, "{} steps", steps),
        }
    }
}

impl<P: PinLayer> Robot<P> {
    /// Runs one command to completion.
    pub fn execute(&mut self, cmd: &Command) -> Result<Outcome, P::Error> {
        log::trace!("execute {:?}", cmd);
        let outcome = match *cmd {
            Command::Move { direction, select } => {
                self.move_motors(direction, select)?;
                Outcome::Done
            }
            Command::Drive {
                direction,
                select,
                speed_percent,
            } => {
                self.drive(direction, select, speed_percent)?;
                Outcome::Done
            }
            Command::Stop(select) => {
                self.stop(select)?;
                Outcome::Done
            }
            Command::Line => Outcome::Line(self.line_position()?),
            Command::Over(sensor) => Outcome::Over(self.is_over_line(sensor)?),
            Command::Distance => Outcome::Distance(self.distance_cm()?),
            Command::Analog(port) => Outcome::Raw(self.read_analog(port)?),
            Command::Touch(port) => Outcome::Pressed(self.is_touched(port)?),
            Command::Temperature(port) => Outcome::Text(self.temperature_text(port)?),
            Command::Humidity(port) => Outcome::Text(self.humidity_text(port)?),
            Command::LcdInit => {
                self.lcd_init()?;
                Outcome::Done
            }
            Command::LcdClear => {
                self.lcd_clear()?;
                Outcome::Done
            }
            Command::LcdWrite {
                column,
                row,
                ref text,
            } => {
                self.lcd_write(text, column, row)?;
                Outcome::Done
            }
            Command::Fan(port, FanSetting::On) => {
                self.set_fan(port, true)?;
                Outcome::Done
            }
            Command::Fan(port, FanSetting::Off) => {
                self.set_fan(port, false)?;
                Outcome::Done
            }
            Command::Fan(port, FanSetting::Speed(percent)) => {
                self.set_fan_speed(port, percent)?;
                Outcome::Done
            }
            Command::Servo {
                port,
                angle,
                step_delay_ms: None,
            } => {
                self.servo_set(port, angle)?;
                Outcome::Done
            }
            Command::Servo {
                port,
                angle,
                step_delay_ms: Some(step),
            } => Outcome::Steps(self.servo_move(port, angle, step)?),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        line.parse()
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    #[test]
    fn move_defaults_to_both_motors() {
        assert_eq!(
            parse("move forward").unwrap(),
            Command::Move {
                direction: Direction::Forward,
                select: MotorSelect::Both
            }
        );
        assert_eq!(
            parse("MOVE back left").unwrap(),
            Command::Move {
                direction: Direction::Backward,
                select: MotorSelect::Left
            }
        );
    }

    #[test]
    fn drive_keeps_out_of_range_speed() {
        assert_eq!(
            parse("drive right r 150").unwrap(),
            Command::Drive {
                direction: Direction::TurnRight,
                select: MotorSelect::Right,
                speed_percent: 150
            }
        );
    }

    #[test]
    fn lcd_variants() {
        assert_eq!(parse("lcd init").unwrap(), Command::LcdInit);
        assert_eq!(parse("lcd Clear").unwrap(), Command::LcdClear);
        assert_eq!(
            parse("lcd 2 1  hello   world").unwrap(),
            Command::LcdWrite {
                column: 2,
                row: 1,
                text: "hello world".to_string()
            }
        );
        assert_eq!(
            parse("lcd 0 0").unwrap(),
            Command::LcdWrite {
                column: 0,
                row: 0,
                text: String::new()
            }
        );
    }

    #[test]
    fn fan_settings() {
        assert_eq!(parse("fan 1 on").unwrap(), Command::Fan(Port::P1, FanSetting::On));
        assert_eq!(parse("fan p2 OFF").unwrap(), Command::Fan(Port::P2, FanSetting::Off));
        assert_eq!(
            parse("fan 3 40").unwrap(),
            Command::Fan(Port::P3, FanSetting::Speed(40))
        );
    }

    #[test]
    fn servo_step_is_optional() {
        assert_eq!(
            parse("servo 4 -10").unwrap(),
            Command::Servo {
                port: Port::P4,
                angle: -10,
                step_delay_ms: None
            }
        );
    }

    #[test]
    fn errors_name_the_token() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("jump"), Err(ParseError::UnknownCommand("jump".to_string())));
        assert_eq!(parse("over"), Err(ParseError::Missing("sensor")));
        assert_eq!(
            parse("analog p7"),
            Err(ParseError::Invalid {
                expected: "port",
                token: "p7".to_string()
            })
        );
        assert_eq!(
            parse("distance now"),
            Err(ParseError::Unexpected("now".to_string()))
        );
    }

    #[test]
    fn parse_error_display() {
        let err = parse("drive up").unwrap_err();
        assert_eq!(err.to_string(), "expected direction, got 'up'");
    }

    // ========================================================================
    // Outcome display
    // ========================================================================

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::Done.to_string(), "ok");
        assert_eq!(Outcome::Distance(12).to_string(), "12 cm");
        assert_eq!(Outcome::Line(LinePosition::Left).to_string(), "left");
        assert_eq!(Outcome::Steps(3).to_string(), "3 steps");
    }
}
