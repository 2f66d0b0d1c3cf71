//! Driver configuration: pin bindings, motor polarity, line policy and timing.
//!
//! All sections have defaults matching the stock robot and builder-style
//! `with_*` setters. The pin map is checked for overlapping claims before a
//! [`Robot`](crate::Robot) is built, so two drivers can never share a pin
//! silently.
//!
//! # Example
//!
//! ```rust
//! use beatbot::config::{Config, LineConfig, PinMap, PolarityTable};
//! use beatbot::line::LinePolicy;
//! use beatbot::traits::Level;
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.pins.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_polarity(PolarityTable::from_forward(Level::Low, Level::High))
//!     .with_line(LineConfig::default().with_policy(LinePolicy::AllAboveIsCenter));
//! ```

use core::fmt;

use crate::line::LinePolicy;
use crate::motor::{Direction, Motor};
use crate::ports::{Port, PORT_COUNT};
use crate::traits::{Level, PinId};

// ============================================================================
// Main Config
// ============================================================================

/// Complete driver configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Physical pin bindings
    pub pins: PinMap,
    /// Motor direction-pin polarity
    pub polarity: PolarityTable,
    /// Line classifier settings
    pub line: LineConfig,
    /// Protocol timeouts and settle delays
    pub timing: TimingConfig,
    /// Character display settings
    pub lcd: LcdConfig,
}

impl Config {
    /// Set pin bindings
    pub fn with_pins(mut self, pins: PinMap) -> Self {
        self.pins = pins;
        self
    }

    /// Set the polarity table
    pub fn with_polarity(mut self, polarity: PolarityTable) -> Self {
        self.polarity = polarity;
        self
    }

    /// Set line classifier settings
    pub fn with_line(mut self, line: LineConfig) -> Self {
        self.line = line;
        self
    }

    /// Set timing
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set display settings
    pub fn with_lcd(mut self, lcd: LcdConfig) -> Self {
        self.lcd = lcd;
        self
    }
}

// ============================================================================
// Pin Map
// ============================================================================

/// Direction and PWM pins of one motor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorPins {
    /// Direction pin (digital)
    pub direction: PinId,
    /// Speed pin (PWM)
    pub pwm: PinId,
}

/// Physical pin bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinMap {
    /// Left motor pins
    pub left_motor: MotorPins,
    /// Right motor pins
    pub right_motor: MotorPins,
    /// Left reflectance sensor (analog)
    pub line_left: PinId,
    /// Center reflectance sensor (analog)
    pub line_center: PinId,
    /// Right reflectance sensor (analog)
    pub line_right: PinId,
    /// Ultrasonic trigger output
    pub trigger: PinId,
    /// Ultrasonic echo input
    pub echo: PinId,
    /// I2C clock line
    pub i2c_scl: PinId,
    /// I2C data line
    pub i2c_sda: PinId,
    /// Auxiliary ports, indexed by [`Port::index`]
    pub ports: [PinId; PORT_COUNT],
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            left_motor: MotorPins {
                direction: 15,
                pwm: 16,
            },
            right_motor: MotorPins {
                direction: 13,
                pwm: 14,
            },
            line_left: 10,
            line_center: 1,
            line_right: 2,
            trigger: 8,
            echo: 12,
            i2c_scl: 19,
            i2c_sda: 20,
            ports: [0, 3, 4, 9],
        }
    }
}

/// Role a pin is claimed for in a [`PinMap`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinRole {
    /// Motor direction pin
    MotorDirection(Motor),
    /// Motor PWM pin
    MotorPwm(Motor),
    /// Left line sensor
    LineLeft,
    /// Center line sensor
    LineCenter,
    /// Right line sensor
    LineRight,
    /// Ultrasonic trigger
    Trigger,
    /// Ultrasonic echo
    Echo,
    /// I2C clock
    I2cClock,
    /// I2C data
    I2cData,
    /// Auxiliary port
    Port(Port),
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinRole::MotorDirection(Motor::Left) => f.write_str("left motor direction"),
            PinRole::MotorDirection(Motor::Right) => f.write_str("right motor direction"),
            PinRole::MotorPwm(Motor::Left) => f.write_str("left motor pwm"),
            PinRole::MotorPwm(Motor::Right) => f.write_str("right motor pwm"),
            PinRole::LineLeft => f.write_str("left line sensor"),
            PinRole::LineCenter => f.write_str("center line sensor"),
            PinRole::LineRight => f.write_str("right line sensor"),
            PinRole::Trigger => f.write_str("ultrasonic trigger"),
            PinRole::Echo => f.write_str("ultrasonic echo"),
            PinRole::I2cClock => f.write_str("i2c clock"),
            PinRole::I2cData => f.write_str("i2c data"),
            PinRole::Port(port) => write!(f, "port {}", port.number()),
        }
    }
}

/// Number of pin claims a [`PinMap`] makes
pub const PIN_CLAIMS: usize = 11 + PORT_COUNT;

/// Configuration rejected before any pin is touched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Two roles claim the same pin
    PinConflict {
        /// Contested pin
        pin: PinId,
        /// Role listed first in the map
        first: PinRole,
        /// Role that collides with it
        second: PinRole,
    },
    /// Display geometry outside what the driver can address
    LcdGeometry {
        /// Configured columns
        columns: u8,
        /// Configured rows
        rows: u8,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PinConflict { pin, first, second } => {
                write!(f, "pin {} claimed by both {} and {}", pin, first, second)
            }
            ConfigError::LcdGeometry { columns, rows } => {
                write!(f, "unsupported display geometry {}x{}", columns, rows)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl PinMap {
    /// Every (pin, role) claim made by this map, in declaration order
    pub fn claims(&self) -> heapless::Vec<(PinId, PinRole), PIN_CLAIMS> {
        let mut claims = heapless::Vec::new();
        let fixed = [
            (self.left_motor.direction, PinRole::MotorDirection(Motor::Left)),
            (self.left_motor.pwm, PinRole::MotorPwm(Motor::Left)),
            (self.right_motor.direction, PinRole::MotorDirection(Motor::Right)),
            (self.right_motor.pwm, PinRole::MotorPwm(Motor::Right)),
            (self.line_left, PinRole::LineLeft),
            (self.line_center, PinRole::LineCenter),
            (self.line_right, PinRole::LineRight),
            (self.trigger, PinRole::Trigger),
            (self.echo, PinRole::Echo),
            (self.i2c_scl, PinRole::I2cClock),
            (self.i2c_sda, PinRole::I2cData),
        ];
        // Capacity is exactly fixed.len() + PORT_COUNT
        let _ = claims.extend_from_slice(&fixed);
        for port in Port::ALL {
            let _ = claims.push((self.ports[port.index()], PinRole::Port(port)));
        }
        claims
    }

    /// Rejects maps where one pin is claimed by more than one role
    pub fn validate(&self) -> Result<(), ConfigError> {
        let claims = self.claims();
        for (i, &(pin, first)) in claims.iter().enumerate() {
            if let Some(&(_, second)) = claims[i + 1..].iter().find(|(other, _)| *other == pin) {
                return Err(ConfigError::PinConflict { pin, first, second });
            }
        }
        Ok(())
    }

    /// Set the left motor pins
    pub fn with_left_motor(mut self, direction: PinId, pwm: PinId) -> Self {
        self.left_motor = MotorPins { direction, pwm };
        self
    }

    /// Set the right motor pins
    pub fn with_right_motor(mut self, direction: PinId, pwm: PinId) -> Self {
        self.right_motor = MotorPins { direction, pwm };
        self
    }

    /// Set the line sensor pins
    pub fn with_line_sensors(mut self, left: PinId, center: PinId, right: PinId) -> Self {
        self.line_left = left;
        self.line_center = center;
        self.line_right = right;
        self
    }

    /// Set the ultrasonic pins
    pub fn with_ultrasonic(mut self, trigger: PinId, echo: PinId) -> Self {
        self.trigger = trigger;
        self.echo = echo;
        self
    }

    /// Set the pin of one auxiliary port
    pub fn with_port(mut self, port: Port, pin: PinId) -> Self {
        self.ports[port.index()] = pin;
        self
    }
}

// ============================================================================
// Polarity Table
// ============================================================================

/// Direction-pin levels per (direction, motor)
///
/// Entries are data, not logic: a wiring revision is a table edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolarityTable {
    /// `(left, right)` levels indexed by [`Direction::index`]
    entries: [(Level, Level); 4],
}

impl Default for PolarityTable {
    /// Current wiring: left motor forward = High, right motor forward = Low
    fn default() -> Self {
        Self::from_forward(Level::High, Level::Low)
    }
}

impl PolarityTable {
    /// Derives the full table from each motor's forward level
    ///
    /// Backward inverts both; a left turn runs the left motor backward and
    /// the right motor forward; a right turn the opposite.
    pub const fn from_forward(left_forward: Level, right_forward: Level) -> Self {
        let left_back = left_forward.inverted();
        let right_back = right_forward.inverted();
        Self {
            entries: [
                (left_forward, right_forward),
                (left_back, right_back),
                (left_back, right_forward),
                (left_forward, right_back),
            ],
        }
    }

    /// Overrides the levels used for one direction
    pub fn with_entry(mut self, direction: Direction, left: Level, right: Level) -> Self {
        self.entries[direction.index()] = (left, right);
        self
    }

    /// Level for `motor` when moving in `direction`
    #[inline]
    pub fn level(&self, motor: Motor, direction: Direction) -> Level {
        let (left, right) = self.entries[direction.index()];
        match motor {
            Motor::Left => left,
            Motor::Right => right,
        }
    }
}

// ============================================================================
// Line Config
// ============================================================================

/// Default reflectance threshold
pub const DEFAULT_LINE_THRESHOLD: u16 = 30;

/// Line classifier configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineConfig {
    /// Samples at or below this value mark a sensor
    pub threshold: u16,
    /// What an all-above reading means
    pub policy: LinePolicy,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LINE_THRESHOLD,
            policy: LinePolicy::default(),
        }
    }
}

impl LineConfig {
    /// Set the threshold
    pub fn with_threshold(mut self, threshold: u16) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the all-above policy
    pub fn with_policy(mut self, policy: LinePolicy) -> Self {
        self.policy = policy;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Shortest wake pulse the DHT11 responds to (milliseconds)
pub const MIN_DHT_WAKE_MS: u32 = 18;

/// Shortest wait after an LCD clear command (milliseconds)
pub const MIN_LCD_CLEAR_MS: u32 = 2;

/// Protocol timeouts and settle delays
///
/// The DHT11 wake pulse and the LCD clear wait have protocol floors
/// ([`MIN_DHT_WAKE_MS`], [`MIN_LCD_CLEAR_MS`]); the drivers raise smaller
/// values to the floor however the config was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Longest wait for an ultrasonic echo pulse (microseconds)
    pub echo_timeout_us: u32,
    /// DHT11 wake pulse (milliseconds, at least 18)
    pub dht_wake_ms: u32,
    /// DHT11 host release before listening (microseconds)
    pub dht_release_us: u32,
    /// DHT11 bound on each response/bit pulse (microseconds)
    pub dht_step_timeout_us: u32,
    /// DHT11 high pulses longer than this are a 1 bit (microseconds)
    pub dht_one_threshold_us: u32,
    /// LCD power-up wait before the first nibble (milliseconds)
    pub lcd_power_up_ms: u32,
    /// LCD enable pulse width (microseconds)
    pub lcd_enable_us: u32,
    /// LCD settle after each nibble (microseconds)
    pub lcd_settle_us: u32,
    /// LCD clear/home execution time (milliseconds, at least 2)
    pub lcd_clear_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            echo_timeout_us: 25_000,
            dht_wake_ms: 18,
            dht_release_us: 30,
            dht_step_timeout_us: 1_000,
            dht_one_threshold_us: 40,
            lcd_power_up_ms: 50,
            lcd_enable_us: 1,
            lcd_settle_us: 50,
            lcd_clear_ms: 2,
        }
    }
}

impl TimingConfig {
    /// Set the ultrasonic echo timeout
    pub fn with_echo_timeout_us(mut self, us: u32) -> Self {
        self.echo_timeout_us = us;
        self
    }

    /// Set the DHT11 per-step timeout
    pub fn with_dht_step_timeout_us(mut self, us: u32) -> Self {
        self.dht_step_timeout_us = us;
        self
    }

    /// Set the DHT11 wake pulse; values below 18 ms are raised to 18
    pub fn with_dht_wake_ms(mut self, ms: u32) -> Self {
        self.dht_wake_ms = ms.max(MIN_DHT_WAKE_MS);
        self
    }
}

// ============================================================================
// LCD Config
// ============================================================================

/// Widest row the HD44780 DDRAM addresses
pub const MAX_LCD_COLUMNS: u8 = 40;

/// Rows the HD44780 DDRAM addresses
pub const MAX_LCD_ROWS: u8 = 2;

/// Character display configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LcdConfig {
    /// I2C address of the backpack
    pub address: u8,
    /// Characters per row
    pub columns: u8,
    /// Number of rows
    pub rows: u8,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            address: 0x27,
            columns: 16,
            rows: 2,
        }
    }
}

impl LcdConfig {
    /// Set the I2C address (0x27 and 0x3F are common)
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Checks the geometry against the two-row, 40-column DDRAM layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0
            || self.columns > MAX_LCD_COLUMNS
            || self.rows == 0
            || self.rows > MAX_LCD_ROWS
        {
            return Err(ConfigError::LcdGeometry {
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
