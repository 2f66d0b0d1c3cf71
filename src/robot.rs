//! The robot driver object.
//!
//! [`Robot`] owns the pin layer and every piece of mutable driver state (the
//! servo position table and the LCD initialized flag). Each method runs one
//! driver operation to completion before returning; there is no background
//! work.
//!
//! # Example
//!
//! ```rust
//! use beatbot::{Robot, hal::MockPins};
//! use beatbot::motor::{Direction, MotorSelect};
//! use beatbot::ports::Port;
//!
//! let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
//!
//! robot.drive(Direction::Forward, MotorSelect::Both, 80).unwrap();
//! robot.stop(MotorSelect::Both).unwrap();
//!
//! robot.servo_move(Port::P1, 120, 5).unwrap();
//! assert_eq!(robot.servo_position(Port::P1), 120);
//!
//! // No echo scripted: no reading
//! assert_eq!(robot.distance_cm().unwrap(), 0);
//! ```
//!
//! # Blocking
//!
//! Ranging (up to the echo timeout), DHT11 reads (bounded by the per-step
//! timeout), gradual servo moves (`|Δangle| × step delay`) and LCD commands
//! all block the caller. None of them can be cancelled once started.
//!
//! # Thread Safety
//!
//! `Robot` is not synchronized. It is meant to be driven from a single
//! control loop.

use crate::config::{Config, ConfigError, PolarityTable};
use crate::dht11::{Dht11, Dht11Frame};
use crate::lcd::CharacterLcd;
use crate::line::{LineClassifier, LinePolicy, LinePosition, LineReading, LineSensor};
use crate::motor::{Direction, MotorCommand, MotorDrive, MotorSelect};
use crate::ports::{AuxPorts, Port};
use crate::ranging::RangeFinder;
use crate::readings::{number_text, ReadingText};
use crate::servo::ServoController;
use crate::traits::PinLayer;

/// Driver object for the whole robot.
pub struct Robot<P: PinLayer> {
    pins: P,
    config: Config,
    motors: MotorDrive,
    line: LineClassifier,
    range: RangeFinder,
    dht: Dht11,
    lcd: CharacterLcd,
    servos: ServoController,
    ports: AuxPorts,
}

impl<P: PinLayer> Robot<P> {
    /// Builds the drivers from `config` after validating pin ownership.
    pub fn new(pins: P, config: Config) -> Result<Self, ConfigError> {
        config.pins.validate()?;
        config.lcd.validate()?;

        let map = &config.pins;
        Ok(Self {
            motors: MotorDrive::from_config(&config),
            line: LineClassifier::new(map.line_left, map.line_center, map.line_right, config.line),
            range: RangeFinder::new(map.trigger, map.echo, config.timing.echo_timeout_us),
            dht: Dht11::from_timing(&config.timing),
            lcd: CharacterLcd::new(config.lcd, &config.timing),
            servos: ServoController::new(map.ports),
            ports: AuxPorts::new(map.ports),
            pins,
            config,
        })
    }

    /// Builds a robot with the stock wiring.
    pub fn with_defaults(pins: P) -> Result<Self, ConfigError> {
        Self::new(pins, Config::default())
    }

    /// Configuration the robot was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared access to the pin layer.
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Exclusive access to the pin layer.
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Consumes the robot, returning the pin layer.
    pub fn into_pins(self) -> P {
        self.pins
    }

    // ------------------------------------------------------------------------
    // Motors
    // ------------------------------------------------------------------------

    /// Drives at `speed_percent` (clamped to 0..=100).
    pub fn drive(
        &mut self,
        direction: Direction,
        select: MotorSelect,
        speed_percent: i32,
    ) -> Result<(), P::Error> {
        self.motors.drive(
            &mut self.pins,
            MotorCommand::new(direction, select, speed_percent),
        )
    }

    /// Drives at the default 50 %.
    pub fn move_motors(&mut self, direction: Direction, select: MotorSelect) -> Result<(), P::Error> {
        self.motors.move_default(&mut self.pins, direction, select)
    }

    /// Cuts PWM on the selected motor(s); direction pins are untouched.
    pub fn stop(&mut self, select: MotorSelect) -> Result<(), P::Error> {
        self.motors.stop(&mut self.pins, select)
    }

    /// Swaps in a new polarity table after a wiring change.
    pub fn set_polarity(&mut self, polarity: PolarityTable) {
        self.config.polarity = polarity;
        self.motors.set_polarity(polarity);
    }

    // ------------------------------------------------------------------------
    // Line sensors
    // ------------------------------------------------------------------------

    /// Samples and classifies the line position.
    pub fn line_position(&mut self) -> Result<LinePosition, P::Error> {
        self.line.classify(&mut self.pins)
    }

    /// Raw samples of the three line sensors.
    pub fn line_reading(&mut self) -> Result<LineReading, P::Error> {
        self.line.read(&mut self.pins)
    }

    /// Whether one sensor is at or below the threshold.
    pub fn is_over_line(&mut self, sensor: LineSensor) -> Result<bool, P::Error> {
        self.line.is_over_line(&mut self.pins, sensor)
    }

    /// Chooses what an all-above reading means.
    pub fn set_line_policy(&mut self, policy: LinePolicy) {
        self.config.line.policy = policy;
        self.line.set_policy(policy);
    }

    // ------------------------------------------------------------------------
    // Ranging
    // ------------------------------------------------------------------------

    /// Distance in cm; 0 means no echo within the configured timeout.
    pub fn distance_cm(&mut self) -> Result<u32, P::Error> {
        self.range.measure_cm(&mut self.pins)
    }

    /// Distance in cm with an explicit echo timeout.
    pub fn distance_cm_within(&mut self, timeout_us: u32) -> Result<u32, P::Error> {
        self.range.measure_cm_within(&mut self.pins, timeout_us)
    }

    /// Distance as text.
    pub fn distance_text(&mut self) -> Result<ReadingText, P::Error> {
        self.range.measure_text(&mut self.pins)
    }

    // ------------------------------------------------------------------------
    // Auxiliary ports
    // ------------------------------------------------------------------------

    /// Raw analog sample (soil moisture, light, potentiometer).
    pub fn read_analog(&mut self, port: Port) -> Result<u16, P::Error> {
        self.ports.read_analog(&mut self.pins, port)
    }

    /// Raw analog sample as text.
    pub fn read_analog_text(&mut self, port: Port) -> Result<ReadingText, P::Error> {
        Ok(number_text(i64::from(self.read_analog(port)?)))
    }

    /// Touch button state.
    pub fn is_touched(&mut self, port: Port) -> Result<bool, P::Error> {
        self.ports.is_touched(&mut self.pins, port)
    }

    /// Fan fully on or off.
    pub fn set_fan(&mut self, port: Port, on: bool) -> Result<(), P::Error> {
        self.ports.set_fan(&mut self.pins, port, on)
    }

    /// Fan at a PWM speed.
    pub fn set_fan_speed(&mut self, port: Port, speed_percent: i32) -> Result<(), P::Error> {
        self.ports.set_fan_speed(&mut self.pins, port, speed_percent)
    }

    // ------------------------------------------------------------------------
    // DHT11
    // ------------------------------------------------------------------------

    /// One DHT11 frame from `port`, or `None` if rejected.
    pub fn read_climate(&mut self, port: Port) -> Result<Option<Dht11Frame>, P::Error> {
        self.dht.read(&mut self.pins, self.ports.pin(port))
    }

    /// One DHT11 frame with an explicit per-step timeout.
    pub fn read_climate_within(
        &mut self,
        port: Port,
        step_timeout_us: u32,
    ) -> Result<Option<Dht11Frame>, P::Error> {
        self.dht
            .read_within(&mut self.pins, self.ports.pin(port), step_timeout_us)
    }

    /// Temperature in °C as text, or `"ERR"`.
    pub fn temperature_text(&mut self, port: Port) -> Result<ReadingText, P::Error> {
        self.dht.temperature_text(&mut self.pins, self.ports.pin(port))
    }

    /// Relative humidity in % as text, or `"ERR"`.
    pub fn humidity_text(&mut self, port: Port) -> Result<ReadingText, P::Error> {
        self.dht.humidity_text(&mut self.pins, self.ports.pin(port))
    }

    // ------------------------------------------------------------------------
    // LCD
    // ------------------------------------------------------------------------

    /// Initializes the display if it has not been already.
    pub fn lcd_init(&mut self) -> Result<(), P::Error> {
        self.lcd.init(&mut self.pins)
    }

    /// Clears the display.
    pub fn lcd_clear(&mut self) -> Result<(), P::Error> {
        self.lcd.clear(&mut self.pins)
    }

    /// Writes text at (column, row), truncated at the right edge.
    pub fn lcd_write(&mut self, text: &str, column: i32, row: i32) -> Result<(), P::Error> {
        self.lcd.write_text(&mut self.pins, text, column, row)
    }

    /// Whether the display has been initialized.
    pub fn lcd_initialized(&self) -> bool {
        self.lcd.is_initialized()
    }

    // ------------------------------------------------------------------------
    // Servos
    // ------------------------------------------------------------------------

    /// Moves a servo straight to `angle`.
    pub fn servo_set(&mut self, port: Port, angle: i32) -> Result<(), P::Error> {
        self.servos.set_angle(&mut self.pins, port, angle)
    }

    /// Sweeps a servo to `angle` one degree per `step_delay_ms`.
    pub fn servo_move(&mut self, port: Port, angle: i32, step_delay_ms: i32) -> Result<u32, P::Error> {
        self.servos
            .move_gradual(&mut self.pins, port, angle, step_delay_ms)
    }

    /// Last angle written to the servo on `port`.
    pub fn servo_position(&self, port: Port) -> u8 {
        self.servos.position(port)
    }
}
