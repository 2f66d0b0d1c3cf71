//! Pin layer abstraction consumed by every driver.
//!
//! The robot controller never touches registers directly. Every digital,
//! analog, timing and I2C operation goes through [`PinLayer`], which the
//! host platform implements once.
//!
//! # Implementations
//!
//! For testing and desktop development, use [`MockPins`] from
//! [`crate::hal::mock`]. For boards with an `embedded-hal` 1.0 I2C bus and
//! delay, use `hal::board::HalBoard` (requires the `embedded-hal` feature).
//!
//! # Example
//!
//! ```rust
//! use beatbot::traits::{Level, PinLayer};
//! use beatbot::hal::MockPins;
//!
//! let mut pins = MockPins::new();
//! pins.digital_write(15, Level::High).unwrap();
//! pins.analog_write(16, 511).unwrap();
//!
//! assert_eq!(pins.digital_output(15), Some(Level::High));
//! assert_eq!(pins.analog_output(16), Some(511));
//! ```
//!
//! [`MockPins`]: crate::hal::MockPins

/// Identifier of a physical pin on the edge connector.
pub type PinId = u8;

/// Largest PWM duty accepted by [`PinLayer::analog_write`] (10-bit).
pub const MAX_DUTY: u16 = 1023;

/// Largest sample returned by [`PinLayer::analog_read`] (10-bit ADC).
pub const MAX_ANALOG: u16 = 1023;

/// Logic level of a digital pin.
///
/// # Default
///
/// Defaults to [`Low`](Self::Low).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Logic 0.
    #[default]
    Low,
    /// Logic 1.
    High,
}

impl Level {
    /// Builds a level from a 0/1 bit. Any non-zero value is [`High`](Self::High).
    ///
    /// # Examples
    ///
    /// ```
    /// use beatbot::traits::Level;
    ///
    /// assert_eq!(Level::from_bit(0), Level::Low);
    /// assert_eq!(Level::from_bit(1), Level::High);
    /// ```
    #[inline]
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Level::Low
        } else {
            Level::High
        }
    }

    /// Returns the level as a 0/1 bit.
    #[inline]
    pub const fn as_bit(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    /// Returns the opposite level.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Returns true for [`High`](Self::High).
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Host pin layer: digital/analog I/O, pulse timing, delays and I2C.
///
/// Implement this trait once per platform. Drivers call it synchronously
/// and propagate [`Error`](Self::Error) without interpreting it.
///
/// # Implementation Notes
///
/// - `analog_write` duty is 0..=[`MAX_DUTY`]; larger values may be clamped
/// - `pulse_in` waits for `level`, then times how long the pin stays there.
///   It must return `Ok(0)` when the wait or the pulse exceeds `timeout_us`
/// - `delay_us` and `pause_ms` block; they cannot fail
///
/// # Example Implementation
///
/// ```rust,ignore
/// use beatbot::traits::{Level, PinId, PinLayer};
///
/// struct MyBoard { /* peripheral handles */ }
///
/// impl PinLayer for MyBoard {
///     type Error = ();
///
///     fn digital_write(&mut self, pin: PinId, level: Level) -> Result<(), ()> {
///         // Drive the GPIO...
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait PinLayer {
    /// Error type for pin operations.
    type Error;

    /// Drives `pin` as an output at `level`.
    fn digital_write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error>;

    /// Samples `pin` as a digital input.
    fn digital_read(&mut self, pin: PinId) -> Result<Level, Self::Error>;

    /// Sets the PWM duty on `pin` (0..=1023).
    fn analog_write(&mut self, pin: PinId, duty: u16) -> Result<(), Self::Error>;

    /// Samples `pin` through the ADC (0..=1023).
    fn analog_read(&mut self, pin: PinId) -> Result<u16, Self::Error>;

    /// Releases `pin` to an input with the internal pull-up enabled.
    fn set_pull_up_input(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Measures the width of the next pulse at `level` in microseconds.
    ///
    /// Returns `Ok(0)` on timeout.
    fn pulse_in(&mut self, pin: PinId, level: Level, timeout_us: u32) -> Result<u32, Self::Error>;

    /// Positions a hobby servo on `pin` at `degrees` (0..=180).
    fn servo_write(&mut self, pin: PinId, degrees: u8) -> Result<(), Self::Error>;

    /// Writes a single byte to the I2C device at `address`.
    fn i2c_write(&mut self, address: u8, byte: u8) -> Result<(), Self::Error>;

    /// Busy-waits for `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Sleeps for `ms` milliseconds.
    fn pause_ms(&mut self, ms: u32);
}
