//! Text form of sensor readings.
//!
//! Block-level callers receive readings as short strings: the integer value,
//! or [`ERROR_TEXT`] when the sensor produced no data.

use core::fmt::Write;

/// Capacity of a [`ReadingText`]
pub const MAX_READING_TEXT: usize = 12;

/// Sentinel returned when a sensor read is rejected
pub const ERROR_TEXT: &str = "ERR";

/// Fixed-capacity reading string
pub type ReadingText = heapless::String<MAX_READING_TEXT>;

/// Formats an integer reading
///
/// # Examples
///
/// ```
/// use beatbot::readings::number_text;
///
/// assert_eq!(number_text(27).as_str(), "27");
/// assert_eq!(number_text(-4).as_str(), "-4");
/// ```
pub fn number_text(value: i64) -> ReadingText {
    let mut text = ReadingText::new();
    // i64::MIN is 20 characters; readings here are at most 5 digits
    let _ = write!(text, "{}", value);
    text
}

/// The [`ERROR_TEXT`] sentinel
pub fn error_text() -> ReadingText {
    let mut text = ReadingText::new();
    let _ = text.push_str(ERROR_TEXT);
    text
}
