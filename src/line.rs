//! Three-sensor line position classifier.
//!
//! Reads the left, center and right reflectance sensors once (no averaging,
//! no debouncing) and reduces the samples to a [`LinePosition`]. Each call is
//! an independent, stateless sample-and-classify.
//!
//! # Classification
//!
//! A sensor is *marked* when its sample is at or below the threshold.
//!
//! | Marked sensors | Result |
//! |----------------|--------|
//! | exactly one | that sensor's position |
//! | none (all above) | per [`LinePolicy`]: `None` or `Center` |
//! | two or three | `None` |
//!
//! # Example
//!
//! ```rust
//! use beatbot::line::{LinePolicy, LinePosition, LineReading};
//!
//! let reading = LineReading::new(10, 100, 100);
//! assert_eq!(reading.classify(30, LinePolicy::AllAboveIsNone), LinePosition::Left);
//!
//! let reading = LineReading::new(50, 50, 50);
//! assert_eq!(reading.classify(30, LinePolicy::AllAboveIsNone), LinePosition::None);
//! assert_eq!(reading.classify(30, LinePolicy::AllAboveIsCenter), LinePosition::Center);
//! ```

use crate::config::LineConfig;
use crate::traits::{PinId, PinLayer};

/// One of the three reflectance sensors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineSensor {
    /// Left sensor.
    Left,
    /// Center sensor.
    Center,
    /// Right sensor.
    Right,
}

impl LineSensor {
    /// Sensors in left-to-right order.
    pub const ALL: [LineSensor; 3] = [LineSensor::Left, LineSensor::Center, LineSensor::Right];

    /// Parse a sensor name (trimmed, case-insensitive).
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(LineSensor::Left),
            "center" | "centre" | "c" => Some(LineSensor::Center),
            "right" | "r" => Some(LineSensor::Right),
            _ => None,
        }
    }
}

/// Robot position relative to the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinePosition {
    /// Only the left sensor is marked.
    Left,
    /// Only the center sensor is marked, or the bar spans a wide line
    /// under [`LinePolicy::AllAboveIsCenter`].
    Center,
    /// Only the right sensor is marked.
    Right,
    /// No unambiguous position.
    None,
}

impl LinePosition {
    /// Returns the position as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LinePosition::Left => "left",
            LinePosition::Center => "center",
            LinePosition::Right => "right",
            LinePosition::None => "none",
        }
    }
}

impl From<LineSensor> for LinePosition {
    fn from(sensor: LineSensor) -> Self {
        match sensor {
            LineSensor::Left => LinePosition::Left,
            LineSensor::Center => LinePosition::Center,
            LineSensor::Right => LinePosition::Right,
        }
    }
}

/// Meaning of a reading where every sensor is above the threshold.
///
/// Two sensor-bar revisions disagree here, so the choice is explicit.
///
/// # Default
///
/// Defaults to [`AllAboveIsNone`](Self::AllAboveIsNone).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LinePolicy {
    /// Nothing detected: report [`LinePosition::None`].
    #[default]
    AllAboveIsNone,
    /// Bar centered over a line wider than the sensor spacing: report
    /// [`LinePosition::Center`].
    AllAboveIsCenter,
}

/// Raw samples from the three sensors (0..=1023).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LineReading {
    /// Left sensor sample.
    pub left: u16,
    /// Center sensor sample.
    pub center: u16,
    /// Right sensor sample.
    pub right: u16,
}

impl LineReading {
    /// Creates a reading from raw samples.
    pub const fn new(left: u16, center: u16, right: u16) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    /// Sample of one sensor.
    #[inline]
    pub const fn sample(&self, sensor: LineSensor) -> u16 {
        match sensor {
            LineSensor::Left => self.left,
            LineSensor::Center => self.center,
            LineSensor::Right => self.right,
        }
    }

    /// Returns true if `sensor` reads at or below `threshold`.
    #[inline]
    pub const fn is_marked(&self, sensor: LineSensor, threshold: u16) -> bool {
        self.sample(sensor) <= threshold
    }

    /// Reduces the reading to a position.
    pub fn classify(&self, threshold: u16, policy: LinePolicy) -> LinePosition {
        let mut marked = LineSensor::ALL
            .into_iter()
            .filter(|&sensor| self.is_marked(sensor, threshold));

        match (marked.next(), marked.next()) {
            (Some(sensor), None) => sensor.into(),
            (None, _) => match policy {
                LinePolicy::AllAboveIsNone => LinePosition::None,
                LinePolicy::AllAboveIsCenter => LinePosition::Center,
            },
            (Some(_), Some(_)) => LinePosition::None,
        }
    }
}

/// Line classifier bound to three analog pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineClassifier {
    pins: [PinId; 3],
    config: LineConfig,
}

impl LineClassifier {
    /// Creates a classifier for the left, center and right sensor pins.
    pub const fn new(left: PinId, center: PinId, right: PinId, config: LineConfig) -> Self {
        Self {
            pins: [left, center, right],
            config,
        }
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Switches the all-above policy.
    pub fn set_policy(&mut self, policy: LinePolicy) {
        self.config.policy = policy;
    }

    /// Samples all three sensors once.
    pub fn read<P: PinLayer>(&self, pins: &mut P) -> Result<LineReading, P::Error> {
        let [left, center, right] = self.pins;
        Ok(LineReading {
            left: pins.analog_read(left)?,
            center: pins.analog_read(center)?,
            right: pins.analog_read(right)?,
        })
    }

    /// Samples and classifies.
    pub fn classify<P: PinLayer>(&self, pins: &mut P) -> Result<LinePosition, P::Error> {
        let reading = self.read(pins)?;
        let position = reading.classify(self.config.threshold, self.config.policy);
        log::trace!("line {:?} -> {}", reading, position.as_str());
        Ok(position)
    }

    /// Samples one sensor and reports whether it is marked.
    pub fn is_over_line<P: PinLayer>(
        &self,
        pins: &mut P,
        sensor: LineSensor,
    ) -> Result<bool, P::Error> {
        let pin = match sensor {
            LineSensor::Left => self.pins[0],
            LineSensor::Center => self.pins[1],
            LineSensor::Right => self.pins[2],
        };
        Ok(pins.analog_read(pin)? <= self.config.threshold)
    }
}
