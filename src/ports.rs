//! Numbered auxiliary ports.
//!
//! The robot exposes four numbered connectors. Each port maps to one pin
//! and hosts one plug-in device at a time: an analog sensor (soil moisture,
//! light, potentiometer), a touch button, a fan-like digital actuator, a
//! DHT11 or a servo. Raw analog, touch and fan access live here; the DHT11
//! and servo drivers resolve their pin through the same table.

use crate::motor::speed_to_duty;
use crate::traits::{Level, PinId, PinLayer};

/// Number of auxiliary ports.
pub const PORT_COUNT: usize = 4;

/// A numbered auxiliary connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Port {
    /// Port 1.
    P1,
    /// Port 2.
    P2,
    /// Port 3.
    P3,
    /// Port 4.
    P4,
}

impl Port {
    /// All ports in connector order.
    pub const ALL: [Port; PORT_COUNT] = [Port::P1, Port::P2, Port::P3, Port::P4];

    /// Zero-based index into per-port tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Port::P1 => 0,
            Port::P2 => 1,
            Port::P3 => 2,
            Port::P4 => 3,
        }
    }

    /// Connector number as printed on the board (1-based).
    #[inline]
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Looks up a port by its printed number.
    ///
    /// # Examples
    ///
    /// ```
    /// use beatbot::ports::Port;
    ///
    /// assert_eq!(Port::from_number(1), Some(Port::P1));
    /// assert_eq!(Port::from_number(4), Some(Port::P4));
    /// assert_eq!(Port::from_number(0), None);
    /// assert_eq!(Port::from_number(5), None);
    /// ```
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Port::P1),
            2 => Some(Port::P2),
            3 => Some(Port::P3),
            4 => Some(Port::P4),
            _ => None,
        }
    }

    /// Parse a port from text such as `"2"` or `"p2"`.
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s
            .strip_prefix('p')
            .or_else(|| s.strip_prefix('P'))
            .unwrap_or(s);
        digits.parse().ok().and_then(Self::from_number)
    }
}

/// Pin lookup and plain I/O for the auxiliary ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuxPorts {
    pins: [PinId; PORT_COUNT],
}

impl AuxPorts {
    /// Creates the port table.
    pub const fn new(pins: [PinId; PORT_COUNT]) -> Self {
        Self { pins }
    }

    /// Pin wired to `port`.
    #[inline]
    pub const fn pin(&self, port: Port) -> PinId {
        self.pins[port.index()]
    }

    /// Raw 0..=1023 sample from an analog sensor on `port`.
    pub fn read_analog<P: PinLayer>(&self, pins: &mut P, port: Port) -> Result<u16, P::Error> {
        pins.analog_read(self.pin(port))
    }

    /// Returns true while a touch button on `port` is pressed (reads High).
    pub fn is_touched<P: PinLayer>(&self, pins: &mut P, port: Port) -> Result<bool, P::Error> {
        Ok(pins.digital_read(self.pin(port))?.is_high())
    }

    /// Switches a digital actuator on `port` fully on or off.
    pub fn set_fan<P: PinLayer>(&self, pins: &mut P, port: Port, on: bool) -> Result<(), P::Error> {
        pins.digital_write(self.pin(port), Level::from(on))
    }

    /// Runs a fan on `port` at `speed_percent` (clamped to 0..=100) via PWM.
    pub fn set_fan_speed<P: PinLayer>(
        &self,
        pins: &mut P,
        port: Port,
        speed_percent: i32,
    ) -> Result<(), P::Error> {
        pins.analog_write(self.pin(port), speed_to_duty(speed_percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockPins;

    #[test]
    fn port_numbers_round_trip() {
        for port in Port::ALL {
            assert_eq!(Port::from_number(port.number()), Some(port));
        }
    }

    #[test]
    fn port_from_text() {
        assert_eq!(Port::from_text("3"), Some(Port::P3));
        assert_eq!(Port::from_text("p2"), Some(Port::P2));
        assert_eq!(Port::from_text(" P4 "), Some(Port::P4));
        assert_eq!(Port::from_text("p9"), None);
        assert_eq!(Port::from_text("x"), None);
    }

    #[test]
    fn touch_reads_digital_level() {
        let ports = AuxPorts::new([0, 3, 4, 9]);
        let mut pins = MockPins::new();

        assert!(!ports.is_touched(&mut pins, Port::P2).unwrap());
        pins.set_digital_input(3, Level::High);
        assert!(ports.is_touched(&mut pins, Port::P2).unwrap());
    }

    #[test]
    fn fan_on_off_and_speed() {
        let ports = AuxPorts::new([0, 3, 4, 9]);
        let mut pins = MockPins::new();

        ports.set_fan(&mut pins, Port::P1, true).unwrap();
        assert_eq!(pins.digital_output(0), Some(Level::High));
        ports.set_fan(&mut pins, Port::P1, false).unwrap();
        assert_eq!(pins.digital_output(0), Some(Level::Low));

        ports.set_fan_speed(&mut pins, Port::P4, 150).unwrap();
        assert_eq!(pins.analog_output(9), Some(1023));
    }

    #[test]
    fn analog_passthrough() {
        let ports = AuxPorts::new([0, 3, 4, 9]);
        let mut pins = MockPins::new();
        pins.set_analog_input(4, 612);

        assert_eq!(ports.read_analog(&mut pins, Port::P3).unwrap(), 612);
    }
}
