//! Pin layer built from `embedded-hal` 1.0 parts.
//!
//! `embedded-hal` covers the I2C bus and delays but has no notion of analog
//! pins, servos or numbered edge-connector pins. [`HalBoard`] therefore
//! combines:
//!
//! - a platform [`GpioBank`] for per-pin digital/analog/servo access
//! - any [`embedded_hal::i2c::I2c`] bus for the display backpack
//! - any [`embedded_hal::delay::DelayNs`] for blocking waits
//!
//! `pulse_in` is implemented here by polling the bank once per microsecond
//! of delay, so its resolution is bounded by the cost of a digital read.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::traits::{Level, PinId, PinLayer};

/// Per-pin I/O a platform must provide on top of `embedded-hal`.
pub trait GpioBank {
    /// Error type for pin operations.
    type Error;

    /// Drives `pin` as an output.
    fn digital_write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error>;

    /// Samples `pin` as an input.
    fn digital_read(&mut self, pin: PinId) -> Result<Level, Self::Error>;

    /// Sets PWM duty (0..=1023) on `pin`.
    fn analog_write(&mut self, pin: PinId, duty: u16) -> Result<(), Self::Error>;

    /// Samples `pin` through the ADC (0..=1023).
    fn analog_read(&mut self, pin: PinId) -> Result<u16, Self::Error>;

    /// Releases `pin` to an input with pull-up.
    fn set_pull_up_input(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Positions a servo on `pin`.
    fn servo_write(&mut self, pin: PinId, degrees: u8) -> Result<(), Self::Error>;
}

/// Error from either half of a [`HalBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError<G, I> {
    /// GPIO bank failure.
    Gpio(G),
    /// I2C bus failure.
    I2c(I),
}

impl<G: core::fmt::Debug, I: core::fmt::Debug> core::fmt::Display for BoardError<G, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::Gpio(e) => write!(f, "gpio error: {:?}", e),
            BoardError::I2c(e) => write!(f, "i2c error: {:?}", e),
        }
    }
}

/// [`PinLayer`] over a GPIO bank, an I2C bus and a delay source.
pub struct HalBoard<G, I, D> {
    gpio: G,
    i2c: I,
    delay: D,
}

impl<G, I, D> HalBoard<G, I, D>
where
    G: GpioBank,
    I: I2c,
    D: DelayNs,
{
    /// Combines the three parts.
    pub fn new(gpio: G, i2c: I, delay: D) -> Self {
        Self { gpio, i2c, delay }
    }

    /// Returns the parts.
    pub fn release(self) -> (G, I, D) {
        (self.gpio, self.i2c, self.delay)
    }

    fn read(&mut self, pin: PinId) -> Result<Level, BoardError<G::Error, I::Error>> {
        self.gpio.digital_read(pin).map_err(BoardError::Gpio)
    }
}

impl<G, I, D> PinLayer for HalBoard<G, I, D>
where
    G: GpioBank,
    I: I2c,
    D: DelayNs,
{
    type Error = BoardError<G::Error, I::Error>;

    fn digital_write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error> {
        self.gpio.digital_write(pin, level).map_err(BoardError::Gpio)
    }

    fn digital_read(&mut self, pin: PinId) -> Result<Level, Self::Error> {
        self.read(pin)
    }

    fn analog_write(&mut self, pin: PinId, duty: u16) -> Result<(), Self::Error> {
        self.gpio.analog_write(pin, duty).map_err(BoardError::Gpio)
    }

    fn analog_read(&mut self, pin: PinId) -> Result<u16, Self::Error> {
        self.gpio.analog_read(pin).map_err(BoardError::Gpio)
    }

    fn set_pull_up_input(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.gpio.set_pull_up_input(pin).map_err(BoardError::Gpio)
    }

    fn pulse_in(&mut self, pin: PinId, level: Level, timeout_us: u32) -> Result<u32, Self::Error> {
        // Wait for the pulse to start
        let mut waited = 0;
        while self.read(pin)? != level {
            if waited >= timeout_us {
                return Ok(0);
            }
            self.delay.delay_us(1);
            waited += 1;
        }

        // Time it
        let mut width = 0;
        while self.read(pin)? == level {
            if width >= timeout_us {
                return Ok(0);
            }
            self.delay.delay_us(1);
            width += 1;
        }
        Ok(width)
    }

    fn servo_write(&mut self, pin: PinId, degrees: u8) -> Result<(), Self::Error> {
        self.gpio.servo_write(pin, degrees).map_err(BoardError::Gpio)
    }

    fn i2c_write(&mut self, address: u8, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(address, &[byte]).map_err(BoardError::I2c)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::i2c::{ErrorType, Operation};
    use std::collections::VecDeque;

    /// Digital reads follow a script; everything else is a no-op.
    #[derive(Default)]
    struct ScriptedBank {
        reads: VecDeque<Level>,
    }

    impl GpioBank for ScriptedBank {
        type Error = Infallible;

        fn digital_write(&mut self, _: PinId, _: Level) -> Result<(), Infallible> {
            Ok(())
        }
        fn digital_read(&mut self, _: PinId) -> Result<Level, Infallible> {
            Ok(self.reads.pop_front().unwrap_or(Level::Low))
        }
        fn analog_write(&mut self, _: PinId, _: u16) -> Result<(), Infallible> {
            Ok(())
        }
        fn analog_read(&mut self, _: PinId) -> Result<u16, Infallible> {
            Ok(0)
        }
        fn set_pull_up_input(&mut self, _: PinId) -> Result<(), Infallible> {
            Ok(())
        }
        fn servo_write(&mut self, _: PinId, _: u8) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingI2c {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl ErrorType for RecordingI2c {
        type Error = Infallible;
    }

    impl I2c for RecordingI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn board(reads: &[Level]) -> HalBoard<ScriptedBank, RecordingI2c, CountingDelay> {
        let bank = ScriptedBank {
            reads: reads.iter().copied().collect(),
        };
        HalBoard::new(bank, RecordingI2c::default(), CountingDelay::default())
    }

    #[test]
    fn i2c_write_sends_single_byte() {
        let mut board = board(&[]);
        board.i2c_write(0x27, 0x0C).unwrap();

        let (_, i2c, _) = board.release();
        assert_eq!(i2c.writes, vec![(0x27, vec![0x0C])]);
    }

    #[test]
    fn pulse_in_counts_level_duration() {
        use Level::{High, Low};
        // Two polls before the edge, the edge itself, three polls high, then low
        let mut board = board(&[Low, Low, High, High, High, High, Low]);
        assert_eq!(board.pulse_in(1, High, 100).unwrap(), 3);
    }

    #[test]
    fn pulse_in_times_out_waiting_for_edge() {
        let mut board = board(&[]);
        assert_eq!(board.pulse_in(1, Level::High, 10).unwrap(), 0);
    }

    #[test]
    fn pause_uses_delay_source() {
        let mut board = board(&[]);
        board.pause_ms(2);
        board.delay_us(5);

        let (_, _, delay) = board.release();
        assert_eq!(delay.total_ns, 2_005_000);
    }
}
