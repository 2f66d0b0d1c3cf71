//! DHT11 humidity/temperature decoder.
//!
//! Bit-banged single-wire protocol over one port pin. The read is fully
//! synchronous and bounded by the per-step timeout.
//!
//! # Protocol
//!
//! 1. **Start**: host drives the line Low for at least 18 ms, High for 30 µs,
//!    then releases it (input with pull-up)
//! 2. **Response**: sensor pulls Low, then High (~80 µs each)
//! 3. **Data**: 40 bits, each a Low separator followed by a High pulse;
//!    a High pulse longer than 40 µs is a 1. Bits are packed MSB first.
//! 4. **Checksum**: byte 5 equals the low byte of the sum of bytes 1-4
//!
//! A timeout at any step, or a checksum mismatch, discards the whole frame.
//! The decoder never returns a partial frame.
//!
//! # Example
//!
//! ```rust
//! use beatbot::dht11::Dht11Frame;
//!
//! let frame = Dht11Frame::from_bytes([45, 0, 23, 0, 68]).unwrap();
//! assert_eq!(frame.humidity, 45);
//! assert_eq!(frame.temperature, 23);
//!
//! // Bad checksum
//! assert!(Dht11Frame::from_bytes([45, 0, 23, 0, 69]).is_none());
//! ```

use crate::config::{TimingConfig, MIN_DHT_WAKE_MS};
use crate::readings::{error_text, number_text, ReadingText};
use crate::traits::{Level, PinId, PinLayer};

/// Number of data bits in a frame.
pub const FRAME_BITS: usize = 40;

/// Number of bytes in a frame.
pub const FRAME_BYTES: usize = FRAME_BITS / 8;

/// A checksum-valid DHT11 frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dht11Frame {
    /// Relative humidity, integer part (%).
    pub humidity: u8,
    /// Relative humidity, fractional part.
    pub humidity_fraction: u8,
    /// Temperature, integer part (°C).
    pub temperature: u8,
    /// Temperature, fractional part.
    pub temperature_fraction: u8,
    /// Transmitted checksum.
    pub checksum: u8,
}

impl Dht11Frame {
    /// Low byte of the sum of the four data bytes.
    #[inline]
    pub fn checksum_of(data: &[u8; 4]) -> u8 {
        data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
    }

    /// Builds a frame, returning `None` if the checksum does not match.
    pub fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Option<Self> {
        let [humidity, humidity_fraction, temperature, temperature_fraction, checksum] = bytes;
        let expected =
            Self::checksum_of(&[humidity, humidity_fraction, temperature, temperature_fraction]);
        (expected == checksum).then_some(Self {
            humidity,
            humidity_fraction,
            temperature,
            temperature_fraction,
            checksum,
        })
    }

    /// Wire bytes of the frame.
    pub fn to_bytes(&self) -> [u8; FRAME_BYTES] {
        [
            self.humidity,
            self.humidity_fraction,
            self.temperature,
            self.temperature_fraction,
            self.checksum,
        ]
    }
}

/// Packs 40 high-pulse widths into frame bytes (MSB first).
///
/// # Examples
///
/// ```
/// use beatbot::dht11::pack_bits;
///
/// let mut widths = [26u32; 40];
/// widths[0] = 70; // first bit of byte 0
/// widths[39] = 70; // last bit of byte 4
/// assert_eq!(pack_bits(&widths, 40), [0x80, 0, 0, 0, 0x01]);
/// ```
pub fn pack_bits(high_widths_us: &[u32; FRAME_BITS], one_threshold_us: u32) -> [u8; FRAME_BYTES] {
    let mut bytes = [0u8; FRAME_BYTES];
    for (bit, &width) in high_widths_us.iter().enumerate() {
        if width > one_threshold_us {
            bytes[bit >> 3] |= 0x80 >> (bit & 7);
        }
    }
    bytes
}

/// Why a read produced no data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Sensor never pulled the line Low after release.
    NoResponseLow,
    /// Sensor response High phase missing.
    NoResponseHigh,
    /// Separator before the given bit missing.
    BitSeparator(usize),
    /// High pulse of the given bit missing.
    BitHigh(usize),
    /// Frame received but checksum wrong.
    Checksum {
        /// Checksum computed from the data bytes.
        expected: u8,
        /// Checksum byte received.
        received: u8,
    },
}

/// DHT11 decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dht11 {
    wake_ms: u32,
    release_us: u32,
    step_timeout_us: u32,
    one_threshold_us: u32,
}

impl Default for Dht11 {
    fn default() -> Self {
        Self::from_timing(&TimingConfig::default())
    }
}

impl Dht11 {
    /// Creates a decoder using the DHT11 fields of `timing`.
    ///
    /// A wake pulse shorter than [`MIN_DHT_WAKE_MS`] is raised to it.
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self {
            wake_ms: timing.dht_wake_ms.max(MIN_DHT_WAKE_MS),
            release_us: timing.dht_release_us,
            step_timeout_us: timing.dht_step_timeout_us,
            one_threshold_us: timing.dht_one_threshold_us,
        }
    }

    /// Bound on each response and bit pulse.
    #[inline]
    pub const fn step_timeout_us(&self) -> u32 {
        self.step_timeout_us
    }

    /// Reads one frame; `None` if it was rejected at any stage.
    pub fn read<P: PinLayer>(&self, pins: &mut P, pin: PinId) -> Result<Option<Dht11Frame>, P::Error> {
        self.read_within(pins, pin, self.step_timeout_us)
    }

    /// Reads one frame with an explicit per-step timeout.
    pub fn read_within<P: PinLayer>(
        &self,
        pins: &mut P,
        pin: PinId,
        step_timeout_us: u32,
    ) -> Result<Option<Dht11Frame>, P::Error> {
        match self.try_read(pins, pin, step_timeout_us)? {
            Ok(frame) => Ok(Some(frame)),
            Err(rejection) => {
                log::warn!("dht11 on pin {} rejected: {:?}", pin, rejection);
                Ok(None)
            }
        }
    }

    /// Reads one frame, reporting the reason for a rejection.
    ///
    /// The outer `Result` carries pin-layer errors; the inner one protocol
    /// failures.
    pub fn try_read<P: PinLayer>(
        &self,
        pins: &mut P,
        pin: PinId,
        step_timeout_us: u32,
    ) -> Result<Result<Dht11Frame, Rejection>, P::Error> {
        // Start
        pins.digital_write(pin, Level::Low)?;
        pins.pause_ms(self.wake_ms);
        pins.digital_write(pin, Level::High)?;
        pins.delay_us(self.release_us);
        pins.set_pull_up_input(pin)?;

        // Response
        if pins.pulse_in(pin, Level::Low, step_timeout_us)? == 0 {
            return Ok(Err(Rejection::NoResponseLow));
        }
        if pins.pulse_in(pin, Level::High, step_timeout_us)? == 0 {
            return Ok(Err(Rejection::NoResponseHigh));
        }

        // Data
        let mut widths = [0u32; FRAME_BITS];
        for (bit, width) in widths.iter_mut().enumerate() {
            if pins.pulse_in(pin, Level::Low, step_timeout_us)? == 0 {
                return Ok(Err(Rejection::BitSeparator(bit)));
            }
            *width = pins.pulse_in(pin, Level::High, step_timeout_us)?;
            if *width == 0 {
                return Ok(Err(Rejection::BitHigh(bit)));
            }
        }

        // Checksum
        let bytes = pack_bits(&widths, self.one_threshold_us);
        let expected = Dht11Frame::checksum_of(&[bytes[0], bytes[1], bytes[2], bytes[3]]);
        Ok(Dht11Frame::from_bytes(bytes).ok_or(Rejection::Checksum {
            expected,
            received: bytes[4],
        }))
    }

    /// Integer temperature as text, or `"ERR"`.
    pub fn temperature_text<P: PinLayer>(&self, pins: &mut P, pin: PinId) -> Result<ReadingText, P::Error> {
        Ok(match self.read(pins, pin)? {
            Some(frame) => number_text(i64::from(frame.temperature)),
            None => error_text(),
        })
    }

    /// Integer humidity as text, or `"ERR"`.
    pub fn humidity_text<P: PinLayer>(&self, pins: &mut P, pin: PinId) -> Result<ReadingText, P::Error> {
        Ok(match self.read(pins, pin)? {
            Some(frame) => number_text(i64::from(frame.humidity)),
            None => error_text(),
        })
    }
}
