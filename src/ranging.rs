//! Ultrasonic range finder (HC-SR04 style).
//!
//! A 10 µs trigger pulse starts a measurement; the sensor answers with an
//! echo pulse whose width is the round-trip time of the sound burst.
//!
//! # Protocol
//!
//! 1. trigger Low, wait 2 µs
//! 2. trigger High, wait 10 µs
//! 3. trigger Low
//! 4. time the High echo pulse, bounded by the timeout (25 ms by default)
//!
//! Distance is `echo_us / 58`, truncated. A timeout yields 0, which by
//! convention means "no object in range", not "object at 0 cm".
//!
//! # Blocking
//!
//! A call blocks for up to the echo timeout. Callers with a tighter budget
//! pass their own bound to [`RangeFinder::measure_cm_within`].

use crate::readings::{number_text, ReadingText};
use crate::traits::{Level, PinId, PinLayer};

/// Default upper bound on the echo wait.
pub const ECHO_TIMEOUT_US: u32 = 25_000;

/// Round-trip microseconds per centimeter.
pub const US_PER_CM: u32 = 58;

/// Converts an echo width to whole centimeters.
///
/// # Examples
///
/// ```
/// use beatbot::ranging::echo_to_cm;
///
/// assert_eq!(echo_to_cm(0), 0);
/// assert_eq!(echo_to_cm(580), 10);
/// assert_eq!(echo_to_cm(637), 10);
/// ```
#[inline]
pub const fn echo_to_cm(echo_us: u32) -> u32 {
    echo_us / US_PER_CM
}

/// Range finder bound to a trigger and an echo pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeFinder {
    trigger: PinId,
    echo: PinId,
    timeout_us: u32,
}

impl RangeFinder {
    /// Creates a range finder with the given default echo timeout.
    pub const fn new(trigger: PinId, echo: PinId, timeout_us: u32) -> Self {
        Self {
            trigger,
            echo,
            timeout_us,
        }
    }

    /// Default echo timeout in microseconds.
    #[inline]
    pub const fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Fires one trigger pulse and returns the echo width in µs (0 on timeout).
    pub fn echo_us<P: PinLayer>(&self, pins: &mut P, timeout_us: u32) -> Result<u32, P::Error> {
        pins.digital_write(self.trigger, Level::Low)?;
        pins.delay_us(2);
        pins.digital_write(self.trigger, Level::High)?;
        pins.delay_us(10);
        pins.digital_write(self.trigger, Level::Low)?;

        let echo = pins.pulse_in(self.echo, Level::High, timeout_us)?;
        if echo == 0 {
            log::debug!("no echo within {} us", timeout_us);
        }
        Ok(echo)
    }

    /// Distance in centimeters with the default timeout; 0 means no reading.
    pub fn measure_cm<P: PinLayer>(&self, pins: &mut P) -> Result<u32, P::Error> {
        self.measure_cm_within(pins, self.timeout_us)
    }

    /// Distance in centimeters with an explicit timeout; 0 means no reading.
    pub fn measure_cm_within<P: PinLayer>(
        &self,
        pins: &mut P,
        timeout_us: u32,
    ) -> Result<u32, P::Error> {
        Ok(echo_to_cm(self.echo_us(pins, timeout_us)?))
    }

    /// Distance as text with the default timeout.
    pub fn measure_text<P: PinLayer>(&self, pins: &mut P) -> Result<ReadingText, P::Error> {
        Ok(number_text(i64::from(self.measure_cm(pins)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockPins, PinEvent};

    #[test]
    fn trigger_pulse_sequence() {
        let finder = RangeFinder::new(8, 12, ECHO_TIMEOUT_US);
        let mut pins = MockPins::new();
        pins.queue_pulse(580);

        assert_eq!(finder.measure_cm(&mut pins).unwrap(), 10);
        assert_eq!(
            pins.events(),
            &[
                PinEvent::DigitalWrite(8, Level::Low),
                PinEvent::DelayUs(2),
                PinEvent::DigitalWrite(8, Level::High),
                PinEvent::DelayUs(10),
                PinEvent::DigitalWrite(8, Level::Low),
                PinEvent::PulseIn(12, Level::High, ECHO_TIMEOUT_US),
            ]
        );
    }

    #[test]
    fn timeout_reads_zero() {
        let finder = RangeFinder::new(8, 12, ECHO_TIMEOUT_US);
        let mut pins = MockPins::new();

        assert_eq!(finder.measure_cm(&mut pins).unwrap(), 0);
    }

    #[test]
    fn explicit_timeout_reaches_pin_layer() {
        let finder = RangeFinder::new(8, 12, ECHO_TIMEOUT_US);
        let mut pins = MockPins::new();
        pins.queue_pulse(1_160);

        assert_eq!(finder.measure_cm_within(&mut pins, 5_000).unwrap(), 20);
        assert_eq!(
            pins.events().last(),
            Some(&PinEvent::PulseIn(12, Level::High, 5_000))
        );
    }

    #[test]
    fn text_form() {
        let finder = RangeFinder::new(8, 12, ECHO_TIMEOUT_US);
        let mut pins = MockPins::new();
        pins.queue_pulse(5_800);

        assert_eq!(finder.measure_text(&mut pins).unwrap().as_str(), "100");
    }
}
