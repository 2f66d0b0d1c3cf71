//! # beatbot
//!
//! Sensor and actuator drivers for a two-motor educational robot: motor
//! drive, a three-sensor line classifier, ultrasonic ranging, a DHT11
//! humidity/temperature decoder, an I2C character LCD and servos on the
//! auxiliary ports.
//!
//! ## Features
//!
//! - **Pin abstraction**: every driver talks to a [`PinLayer`], so the same
//!   code runs on hardware and against the recording mock
//! - **Data-driven wiring**: pin map and motor polarity live in [`Config`],
//!   validated so no pin is claimed twice
//! - **Sentinel readings**: protocol failures come back in-band (0 cm, no
//!   frame, `"ERR"`); pin-layer failures propagate as errors
//! - **Text commands**: a small command language for consoles and the
//!   simulator
//!
//! ## Architecture
//!
//! - `traits` - Pin layer abstraction
//! - `config` - Pin map, polarity, thresholds and timing
//! - `motor`, `line`, `ranging`, `dht11`, `lcd`, `servo`, `ports` - One
//!   driver per device
//! - `robot` - Driver object owning the pins and all driver state
//! - `commands` - Text command parsing and execution
//! - `hal` - Concrete pin layers (mock for testing, embedded-hal adapter)
//!
//! ## Example
//!
//! ```rust
//! use beatbot::{Robot, hal::MockPins};
//! use beatbot::motor::{Direction, MotorSelect};
//! use beatbot::line::LinePosition;
//!
//! let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
//!
//! // Dark under the left sensor only
//! let pins = robot.config().pins;
//! robot.pins_mut().set_analog_input(pins.line_left, 10);
//! robot.pins_mut().set_analog_input(pins.line_center, 100);
//! robot.pins_mut().set_analog_input(pins.line_right, 100);
//!
//! if robot.line_position().unwrap() == LinePosition::Left {
//!     robot.drive(Direction::TurnLeft, MotorSelect::Both, 40).unwrap();
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Text command surface.
pub mod commands;
/// Wiring, polarity, thresholds and timing.
pub mod config;
/// DHT11 single-wire decoder.
pub mod dht11;
/// Pin layer implementations.
pub mod hal;
/// HD44780 character display over an I2C backpack.
pub mod lcd;
/// Three-sensor line classifier.
pub mod line;
/// Two-motor drive.
pub mod motor;
/// Auxiliary numbered ports.
pub mod ports;
/// Ultrasonic range finder.
pub mod ranging;
/// Text form of sensor readings.
pub mod readings;
/// The robot driver object.
pub mod robot;
/// Servo position controller.
pub mod servo;
/// Pin layer abstraction.
pub mod traits;

// Re-exports for convenience
pub use commands::{Command, FanSetting, Outcome, ParseError};
pub use config::{Config, ConfigError, LcdConfig, LineConfig, PinMap, PolarityTable, TimingConfig};
pub use dht11::Dht11Frame;
pub use line::{LinePolicy, LinePosition, LineSensor};
pub use motor::{Direction, MotorSelect};
pub use ports::Port;
pub use robot::Robot;
pub use traits::{Level, PinId, PinLayer};
