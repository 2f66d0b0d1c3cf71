//! Mock pin layer for testing without hardware.
//!
//! [`MockPins`] implements [`PinLayer`] entirely in memory. It records every
//! call as a [`PinEvent`], remembers the last level/duty written to each pin,
//! answers reads from scripted inputs, and accumulates simulated delay time.
//!
//! # Scripting Inputs
//!
//! | Input | Method |
//! |-------|--------|
//! | Digital level | [`set_digital_input`](MockPins::set_digital_input) |
//! | Analog sample | [`set_analog_input`](MockPins::set_analog_input) |
//! | Pulse widths | [`queue_pulse`](MockPins::queue_pulse), [`queue_dht_frame`](MockPins::queue_dht_frame) |
//!
//! `pulse_in` consumes queued widths in FIFO order. An empty queue, or a
//! width above the requested timeout, reads as a timeout (0).
//!
//! # Example
//!
//! ```rust
//! use beatbot::hal::{MockPins, PinEvent};
//! use beatbot::traits::{Level, PinLayer};
//!
//! let mut pins = MockPins::new();
//! pins.queue_pulse(580);
//!
//! assert_eq!(pins.pulse_in(12, Level::High, 25_000).unwrap(), 580);
//! assert_eq!(pins.pulse_in(12, Level::High, 25_000).unwrap(), 0); // Empty
//! assert_eq!(pins.events().len(), 2);
//! ```
//!
//! [`PinLayer`]: crate::traits::PinLayer

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use crate::dht11::FRAME_BYTES;
use crate::lcd::{ENABLE, REGISTER_SELECT};
use crate::traits::{Level, PinId, PinLayer};

/// Response pulse width scripted by [`MockPins::queue_dht_frame`].
pub const DHT_RESPONSE_US: u32 = 80;
/// Bit separator width scripted by [`MockPins::queue_dht_frame`].
pub const DHT_SEPARATOR_US: u32 = 50;
/// High width of a 0 bit.
pub const DHT_ZERO_US: u32 = 26;
/// High width of a 1 bit.
pub const DHT_ONE_US: u32 = 70;

/// One recorded pin-layer call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinEvent {
    /// `digital_write(pin, level)`
    DigitalWrite(PinId, Level),
    /// `digital_read(pin)`
    DigitalRead(PinId),
    /// `analog_write(pin, duty)`
    AnalogWrite(PinId, u16),
    /// `analog_read(pin)`
    AnalogRead(PinId),
    /// `set_pull_up_input(pin)`
    PullUpInput(PinId),
    /// `pulse_in(pin, level, timeout_us)`
    PulseIn(PinId, Level, u32),
    /// `servo_write(pin, degrees)`
    ServoWrite(PinId, u8),
    /// `i2c_write(address, byte)`
    I2cWrite(u8, u8),
    /// `delay_us(us)`
    DelayUs(u32),
    /// `pause_ms(ms)`
    PauseMs(u32),
}

/// A byte reassembled from the LCD nibble stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcdByte {
    /// Register select clear.
    Command(u8),
    /// Register select set.
    Data(u8),
}

/// Recording pin layer.
///
/// Fallible calls return `Err(())` only for a pin marked with
/// [`fail_on`](Self::fail_on), or for I2C writes after
/// [`fail_on_i2c`](Self::fail_on_i2c).
#[derive(Debug, Default)]
pub struct MockPins {
    events: Vec<PinEvent>,
    digital_outputs: BTreeMap<PinId, Level>,
    analog_outputs: BTreeMap<PinId, u16>,
    digital_inputs: BTreeMap<PinId, Level>,
    analog_inputs: BTreeMap<PinId, u16>,
    pulses: VecDeque<u32>,
    elapsed_us: u64,
    failing_pin: Option<PinId>,
    calls_before_failure: usize,
    failing_i2c: bool,
}

impl MockPins {
    /// Creates a mock with all inputs Low/0 and no queued pulses.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------------

    /// Sets the level returned by `digital_read(pin)`.
    pub fn set_digital_input(&mut self, pin: PinId, level: Level) {
        self.digital_inputs.insert(pin, level);
    }

    /// Sets the sample returned by `analog_read(pin)`.
    pub fn set_analog_input(&mut self, pin: PinId, value: u16) {
        self.analog_inputs.insert(pin, value);
    }

    /// Queues one pulse width for `pulse_in`.
    pub fn queue_pulse(&mut self, width_us: u32) {
        self.pulses.push_back(width_us);
    }

    /// Queues several pulse widths in order.
    pub fn queue_pulses(&mut self, widths_us: &[u32]) {
        self.pulses.extend(widths_us.iter().copied());
    }

    /// Queues the response and 40 bit pulses a DHT11 sends for `bytes`.
    ///
    /// The bytes are sent as given, so a wrong checksum can be scripted.
    pub fn queue_dht_frame(&mut self, bytes: [u8; FRAME_BYTES]) {
        self.queue_pulses(&[DHT_RESPONSE_US, DHT_RESPONSE_US]);
        for byte in bytes {
            for shift in (0..8).rev() {
                let high = if (byte >> shift) & 1 == 1 {
                    DHT_ONE_US
                } else {
                    DHT_ZERO_US
                };
                self.queue_pulses(&[DHT_SEPARATOR_US, high]);
            }
        }
    }

    /// Makes every fallible call on `pin` return an error.
    pub fn fail_on(&mut self, pin: PinId) {
        self.fail_on_after(pin, 0);
    }

    /// Lets `calls` fallible calls on `pin` succeed, then fails every
    /// later one.
    pub fn fail_on_after(&mut self, pin: PinId, calls: usize) {
        self.failing_pin = Some(pin);
        self.calls_before_failure = calls;
    }

    /// Makes every I2C write return an error.
    pub fn fail_on_i2c(&mut self) {
        self.failing_i2c = true;
    }

    /// Forgets recorded events and elapsed time. Outputs and inputs are kept.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.elapsed_us = 0;
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// All recorded calls, oldest first.
    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    /// Last level written to `pin`.
    pub fn digital_output(&self, pin: PinId) -> Option<Level> {
        self.digital_outputs.get(&pin).copied()
    }

    /// Last duty written to `pin`.
    pub fn analog_output(&self, pin: PinId) -> Option<u16> {
        self.analog_outputs.get(&pin).copied()
    }

    /// Number of `digital_write` calls on `pin`.
    pub fn digital_write_count(&self, pin: PinId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PinEvent::DigitalWrite(p, _) if *p == pin))
            .count()
    }

    /// Angles written to a servo on `pin`, in order.
    pub fn servo_writes(&self, pin: PinId) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                PinEvent::ServoWrite(p, angle) if p == pin => Some(angle),
                _ => None,
            })
            .collect()
    }

    /// Bytes written to the I2C device at `address`, in order.
    pub fn i2c_writes(&self, address: u8) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                PinEvent::I2cWrite(a, byte) if a == address => Some(byte),
                _ => None,
            })
            .collect()
    }

    /// Latched LCD nibbles (data bits and register select) at `address`.
    ///
    /// Only writes with the enable bit set are returned, one per nibble.
    pub fn lcd_nibbles(&self, address: u8) -> Vec<u8> {
        self.i2c_writes(address)
            .into_iter()
            .filter(|b| b & ENABLE != 0)
            .map(|b| b & (0xF0 | REGISTER_SELECT))
            .collect()
    }

    /// LCD bytes reassembled from nibble pairs at `address`.
    ///
    /// Pairs from the first nibble on, so call [`clear_events`](Self::clear_events)
    /// after initialization to skip the single-nibble start sequence.
    pub fn lcd_bytes(&self, address: u8) -> Vec<LcdByte> {
        self.lcd_nibbles(address)
            .chunks_exact(2)
            .map(|pair| {
                let value = (pair[0] & 0xF0) | (pair[1] >> 4);
                if pair[0] & REGISTER_SELECT != 0 {
                    LcdByte::Data(value)
                } else {
                    LcdByte::Command(value)
                }
            })
            .collect()
    }

    /// Simulated time spent in `delay_us` and `pause_ms`.
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    fn check(&mut self, pin: PinId) -> Result<(), ()> {
        if self.failing_pin != Some(pin) {
            return Ok(());
        }
        if self.calls_before_failure > 0 {
            self.calls_before_failure -= 1;
            Ok(())
        } else {
            Err(())
        }
    }
}

impl PinLayer for MockPins {
    type Error = ();

    fn digital_write(&mut self, pin: PinId, level: Level) -> Result<(), ()> {
        self.check(pin)?;
        self.events.push(PinEvent::DigitalWrite(pin, level));
        self.digital_outputs.insert(pin, level);
        Ok(())
    }

    fn digital_read(&mut self, pin: PinId) -> Result<Level, ()> {
        self.check(pin)?;
        self.events.push(PinEvent::DigitalRead(pin));
        Ok(self.digital_inputs.get(&pin).copied().unwrap_or_default())
    }

    fn analog_write(&mut self, pin: PinId, duty: u16) -> Result<(), ()> {
        self.check(pin)?;
        self.events.push(PinEvent::AnalogWrite(pin, duty));
        self.analog_outputs.insert(pin, duty);
        Ok(())
    }

    fn analog_read(&mut self, pin: PinId) -> Result<u16, ()> {
        self.check(pin)?;
        self.events.push(PinEvent::AnalogRead(pin));
        Ok(self.analog_inputs.get(&pin).copied().unwrap_or(0))
    }

    fn set_pull_up_input(&mut self, pin: PinId) -> Result<(), ()> {
        self.check(pin)?;
        self.events.push(PinEvent::PullUpInput(pin));
        Ok(())
    }

    fn pulse_in(&mut self, pin: PinId, level: Level, timeout_us: u32) -> Result<u32, ()> {
        self.check(pin)?;
        self.events.push(PinEvent::PulseIn(pin, level, timeout_us));
        Ok(match self.pulses.pop_front() {
            Some(width) if width <= timeout_us => width,
            _ => 0,
        })
    }

    fn servo_write(&mut self, pin: PinId, degrees: u8) -> Result<(), ()> {
        self.check(pin)?;
        self.events.push(PinEvent::ServoWrite(pin, degrees));
        Ok(())
    }

    fn i2c_write(&mut self, address: u8, byte: u8) -> Result<(), ()> {
        if self.failing_i2c {
            return Err(());
        }
        self.events.push(PinEvent::I2cWrite(address, byte));
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(PinEvent::DelayUs(us));
        self.elapsed_us += u64::from(us);
    }

    fn pause_ms(&mut self, ms: u32) {
        self.events.push(PinEvent::PauseMs(ms));
        self.elapsed_us += u64::from(ms) * 1_000;
    }
}

// ============================================================================
// Tests
// ============================================================================
