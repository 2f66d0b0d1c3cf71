//! HD44780 character display behind a PCF8574 I2C backpack.
//!
//! The backpack exposes the display's 4-bit bus as one I2C byte:
//!
//! ```text
//!  bit  7  6  5  4 | 3  | 2 | 1  | 0
//!      D7 D6 D5 D4 | BL | E | RW | RS
//! ```
//!
//! Each command or character byte is sent as two nibbles, high nibble
//! first. Each nibble is latched by writing it with `E` set, then with `E`
//! cleared, followed by a settle delay.
//!
//! # Initialization
//!
//! The controller is brought up lazily on the first display call and stays
//! initialized for the lifetime of the driver:
//!
//! 1. three `0x3` function-set nibbles with decreasing waits (5 ms, 1 ms, 150 µs)
//! 2. one `0x2` nibble to enter 4-bit mode
//! 3. function set (2 lines, 5x8), display on, entry mode left-to-right, clear
//!
//! # Example
//!
//! ```rust
//! use beatbot::config::{LcdConfig, TimingConfig};
//! use beatbot::hal::MockPins;
//! use beatbot::lcd::CharacterLcd;
//!
//! let mut lcd = CharacterLcd::new(LcdConfig::default(), &TimingConfig::default());
//! let mut pins = MockPins::new();
//!
//! lcd.write_text(&mut pins, "Hola", 0, 0).unwrap();
//! assert!(lcd.is_initialized());
//! ```

use crate::config::{LcdConfig, TimingConfig, MAX_LCD_COLUMNS, MAX_LCD_ROWS, MIN_LCD_CLEAR_MS};
use crate::traits::PinLayer;

/// Backlight control bit.
pub const BACKLIGHT: u8 = 0x08;
/// Enable (latch) bit.
pub const ENABLE: u8 = 0x04;
/// Register select: set for character data, clear for commands.
pub const REGISTER_SELECT: u8 = 0x01;

/// Clear display.
pub const CMD_CLEAR: u8 = 0x01;
/// Entry mode: increment, no shift.
pub const CMD_ENTRY_LEFT_TO_RIGHT: u8 = 0x06;
/// Display on, cursor off, blink off.
pub const CMD_DISPLAY_ON: u8 = 0x0C;
/// Function set: 4-bit bus, 2 lines, 5x8 font.
pub const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
/// Set DDRAM address.
pub const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first column of each row.
pub const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// Character display driver.
///
/// Holds the only mutable display state: whether the controller has been
/// initialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterLcd {
    config: LcdConfig,
    power_up_ms: u32,
    enable_us: u32,
    settle_us: u32,
    clear_ms: u32,
    initialized: bool,
}

impl CharacterLcd {
    /// Creates an uninitialized driver.
    ///
    /// Geometry is clamped to what the controller can address (1..=40
    /// columns, 1..=2 rows) and the clear wait is at least
    /// [`MIN_LCD_CLEAR_MS`].
    pub fn new(mut config: LcdConfig, timing: &TimingConfig) -> Self {
        config.columns = config.columns.clamp(1, MAX_LCD_COLUMNS);
        config.rows = config.rows.clamp(1, MAX_LCD_ROWS);
        Self {
            config,
            power_up_ms: timing.lcd_power_up_ms,
            enable_us: timing.lcd_enable_us,
            settle_us: timing.lcd_settle_us,
            clear_ms: timing.lcd_clear_ms.max(MIN_LCD_CLEAR_MS),
            initialized: false,
        }
    }

    /// Returns true once the controller has been initialized.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Display configuration.
    #[inline]
    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    /// Runs the cold-start sequence if it has not run yet.
    pub fn init<P: PinLayer>(&mut self, pins: &mut P) -> Result<(), P::Error> {
        if self.initialized {
            return Ok(());
        }

        pins.pause_ms(self.power_up_ms);

        self.write_nibble(pins, 0x30)?;
        pins.pause_ms(5);
        self.write_nibble(pins, 0x30)?;
        pins.pause_ms(1);
        self.write_nibble(pins, 0x30)?;
        pins.delay_us(150);
        self.write_nibble(pins, 0x20)?;

        self.command(pins, CMD_FUNCTION_4BIT_2LINE)?;
        self.command(pins, CMD_DISPLAY_ON)?;
        self.command(pins, CMD_ENTRY_LEFT_TO_RIGHT)?;
        self.command(pins, CMD_CLEAR)?;
        pins.pause_ms(self.clear_ms);

        self.initialized = true;
        log::info!("lcd at 0x{:02x} initialized", self.config.address);
        Ok(())
    }

    /// Clears the display and waits for the controller to finish.
    pub fn clear<P: PinLayer>(&mut self, pins: &mut P) -> Result<(), P::Error> {
        self.init(pins)?;
        self.command(pins, CMD_CLEAR)?;
        pins.pause_ms(self.clear_ms);
        Ok(())
    }

    /// DDRAM address command for a clamped (column, row).
    ///
    /// # Examples
    ///
    /// ```
    /// use beatbot::config::{LcdConfig, TimingConfig};
    /// use beatbot::lcd::CharacterLcd;
    ///
    /// let lcd = CharacterLcd::new(LcdConfig::default(), &TimingConfig::default());
    /// assert_eq!(lcd.cursor_command(0, 0), 0x80);
    /// assert_eq!(lcd.cursor_command(5, 1), 0xC5);
    /// assert_eq!(lcd.cursor_command(99, 7), 0xCF);
    /// ```
    pub fn cursor_command(&self, column: i32, row: i32) -> u8 {
        let (column, row) = self.clamp_position(column, row);
        CMD_SET_DDRAM | (ROW_OFFSETS[usize::from(row)] + column)
    }

    /// Moves the cursor. Out-of-range coordinates are clamped.
    pub fn set_cursor<P: PinLayer>(&mut self, pins: &mut P, column: i32, row: i32) -> Result<(), P::Error> {
        self.init(pins)?;
        let cmd = self.cursor_command(column, row);
        self.command(pins, cmd)
    }

    /// Writes `text` starting at (column, row).
    ///
    /// Output stops at the right edge of the display; the rest of the text is
    /// dropped without wrapping. Non-ASCII characters are shown as `?`.
    pub fn write_text<P: PinLayer>(
        &mut self,
        pins: &mut P,
        text: &str,
        column: i32,
        row: i32,
    ) -> Result<(), P::Error> {
        self.set_cursor(pins, column, row)?;

        let (column, _) = self.clamp_position(column, row);
        let room = usize::from(self.config.columns - column);
        for c in text.chars().take(room) {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.send(pins, byte, REGISTER_SELECT)?;
        }
        Ok(())
    }

    /// Sends a command byte.
    pub fn command<P: PinLayer>(&self, pins: &mut P, cmd: u8) -> Result<(), P::Error> {
        self.send(pins, cmd, 0)
    }

    fn clamp_position(&self, column: i32, row: i32) -> (u8, u8) {
        let max_column = i32::from(self.config.columns) - 1;
        let max_row = i32::from(self.config.rows) - 1;
        (column.clamp(0, max_column) as u8, row.clamp(0, max_row) as u8)
    }

    fn send<P: PinLayer>(&self, pins: &mut P, byte: u8, mode: u8) -> Result<(), P::Error> {
        self.write_nibble(pins, (byte & 0xF0) | mode)?;
        self.write_nibble(pins, ((byte << 4) & 0xF0) | mode)
    }

    fn write_nibble<P: PinLayer>(&self, pins: &mut P, bits: u8) -> Result<(), P::Error> {
        let address = self.config.address;
        pins.i2c_write(address, bits | BACKLIGHT | ENABLE)?;
        pins.delay_us(self.enable_us);
        pins.i2c_write(address, (bits | BACKLIGHT) & !ENABLE)?;
        pins.delay_us(self.settle_us);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{LcdByte, MockPins};

    fn lcd() -> CharacterLcd {
        CharacterLcd::new(LcdConfig::default(), &TimingConfig::default())
    }

    #[test]
    fn init_runs_once() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();

        lcd.init(&mut pins).unwrap();
        let first = pins.i2c_writes(0x27).len();
        assert!(first > 0);

        lcd.init(&mut pins).unwrap();
        assert_eq!(pins.i2c_writes(0x27).len(), first);
    }

    #[test]
    fn init_nibble_sequence() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();

        let nibbles = pins.lcd_nibbles(0x27);
        assert_eq!(&nibbles[..4], &[0x30, 0x30, 0x30, 0x20]);

        // Remaining nibbles pair into the four setup commands
        let commands: Vec<u8> = nibbles[4..]
            .chunks(2)
            .map(|pair| (pair[0] & 0xF0) | (pair[1] >> 4))
            .collect();
        assert_eq!(commands, vec![0x28, 0x0C, 0x06, 0x01]);
    }

    #[test]
    fn every_write_keeps_backlight_on() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.write_text(&mut pins, "abc", 0, 0).unwrap();

        assert!(pins.i2c_writes(0x27).iter().all(|b| b & BACKLIGHT != 0));
    }

    #[test]
    fn text_is_cursor_then_data() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();
        pins.clear_events();

        lcd.write_text(&mut pins, "Hi", 3, 1).unwrap();
        assert_eq!(
            pins.lcd_bytes(0x27),
            vec![
                LcdByte::Command(0xC3),
                LcdByte::Data(b'H'),
                LcdByte::Data(b'i'),
            ]
        );
    }

    #[test]
    fn text_truncates_at_right_edge() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();
        pins.clear_events();

        lcd.write_text(&mut pins, "0123456789", 12, 0).unwrap();
        let data: Vec<LcdByte> = pins
            .lcd_bytes(0x27)
            .into_iter()
            .filter(|b| matches!(b, LcdByte::Data(_)))
            .collect();
        assert_eq!(
            data,
            vec![
                LcdByte::Data(b'0'),
                LcdByte::Data(b'1'),
                LcdByte::Data(b'2'),
                LcdByte::Data(b'3'),
            ]
        );
    }

    #[test]
    fn non_ascii_becomes_question_mark() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();
        pins.clear_events();

        lcd.write_text(&mut pins, "ñ", 0, 0).unwrap();
        assert_eq!(pins.lcd_bytes(0x27)[1], LcdByte::Data(b'?'));
    }

    #[test]
    fn clear_waits_for_controller() {
        let mut lcd = lcd();
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();
        pins.clear_events();

        lcd.clear(&mut pins).unwrap();
        assert_eq!(pins.lcd_bytes(0x27), vec![LcdByte::Command(CMD_CLEAR)]);
        assert_eq!(pins.elapsed_us() / 1_000, 2);
    }

    #[test]
    fn clear_wait_has_floor() {
        let timing = TimingConfig {
            lcd_clear_ms: 0,
            ..TimingConfig::default()
        };
        let mut lcd = CharacterLcd::new(LcdConfig::default(), &timing);
        let mut pins = MockPins::new();
        lcd.init(&mut pins).unwrap();
        pins.clear_events();

        lcd.clear(&mut pins).unwrap();
        assert!(pins.elapsed_us() >= 2_000);
    }

    #[test]
    fn oversized_geometry_is_clamped() {
        let config = LcdConfig {
            columns: 255,
            rows: 9,
            ..LcdConfig::default()
        };
        let lcd = CharacterLcd::new(config, &TimingConfig::default());

        assert_eq!(lcd.config().columns, 40);
        assert_eq!(lcd.config().rows, 2);
        assert_eq!(lcd.cursor_command(250, 1), 0x80 | (0x40 + 39));
    }
}
