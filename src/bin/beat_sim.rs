//! Desktop simulator for the beatbot drivers.
//!
//! Reads one command per line from stdin, runs it against a [`Robot`] over
//! the recording mock pin layer, and prints the outcome. The mock answers
//! sensor reads from a small simulated world:
//!
//! - an obstacle 40 cm ahead of the ultrasonic sensor
//! - a dark line under the center sensor
//! - a DHT11 on port 1 reporting 24 °C and 55 %
//! - a potentiometer on port 2 at mid travel
//!
//! Lines starting with `world` adjust it:
//!
//! ```text
//! world obstacle <cm>         # 0 removes the obstacle
//! world line <left> <center> <right>
//! world climate <temp> <humidity>
//! world analog <port> <value>
//! world touch <port> on|off
//! ```
//!
//! # Run
//!
//! ```bash
//! BEATBOT_LOG=debug cargo run --features sim --bin beat_sim
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use beatbot::hal::{LcdByte, MockPins};
use beatbot::ranging::US_PER_CM;
use beatbot::traits::MAX_ANALOG;
use beatbot::{Command, Dht11Frame, Level, Port, Robot};
use log::LevelFilter;

/// Sensor values the mock reports.
struct World {
    obstacle_cm: u32,
    climate: Dht11Frame,
}

impl Default for World {
    fn default() -> Self {
        Self {
            obstacle_cm: 40,
            climate: frame(24, 55),
        }
    }
}

fn frame(temperature: u8, humidity: u8) -> Dht11Frame {
    let data = [humidity, 0, temperature, 0];
    Dht11Frame {
        humidity,
        humidity_fraction: 0,
        temperature,
        temperature_fraction: 0,
        checksum: Dht11Frame::checksum_of(&data),
    }
}

fn init_logger() -> Result<()> {
    let level = std::env::var("BEATBOT_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{:5}] {}: {}",
                    record.level(),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!("[{:5}] {}", record.level(), message))
            }
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("installing logger")?;

    log::debug!("log level {:?}", level);
    Ok(())
}

/// Scripts the pulses a command will consume.
fn prime(robot: &mut Robot<MockPins>, world: &World, cmd: &Command) {
    let pins = robot.pins_mut();
    match cmd {
        Command::Distance if world.obstacle_cm > 0 => {
            pins.queue_pulse(world.obstacle_cm.saturating_mul(US_PER_CM));
        }
        Command::Temperature(Port::P1) | Command::Humidity(Port::P1) => {
            pins.queue_dht_frame(world.climate.to_bytes());
        }
        _ => {}
    }
}

fn apply_world(robot: &mut Robot<MockPins>, world: &mut World, args: &[&str]) -> Result<()> {
    let map = robot.config().pins;
    let number = |s: &str| -> Result<u32> { s.parse().with_context(|| format!("bad number '{}'", s)) };
    let sample = |s: &str| -> Result<u16> {
        u16::try_from(number(s)?)
            .ok()
            .filter(|v| *v <= MAX_ANALOG)
            .with_context(|| format!("'{}' is not a 0..=1023 sample", s))
    };
    let byte = |s: &str| -> Result<u8> {
        u8::try_from(number(s)?).with_context(|| format!("'{}' does not fit in a byte", s))
    };
    let port = |s: &str| Port::from_text(s).with_context(|| format!("bad port '{}'", s));

    match *args {
        ["obstacle", cm] => world.obstacle_cm = number(cm)?,
        ["line", left, center, right] => {
            let pins = robot.pins_mut();
            pins.set_analog_input(map.line_left, sample(left)?);
            pins.set_analog_input(map.line_center, sample(center)?);
            pins.set_analog_input(map.line_right, sample(right)?);
        }
        ["climate", temperature, humidity] => {
            world.climate = frame(byte(temperature)?, byte(humidity)?);
        }
        ["analog", p, value] => {
            let pin = map.ports[port(p)?.index()];
            robot.pins_mut().set_analog_input(pin, sample(value)?);
        }
        ["touch", p, state] => {
            let pin = map.ports[port(p)?.index()];
            let level = match state {
                "on" => Level::High,
                "off" => Level::Low,
                other => bail!("expected on or off, got '{}'", other),
            };
            robot.pins_mut().set_digital_input(pin, level);
        }
        _ => bail!("unknown world setting"),
    }
    Ok(())
}

/// Logs the characters the last command sent to the display.
fn report_lcd(robot: &Robot<MockPins>) {
    let text: String = robot
        .pins()
        .lcd_bytes(robot.config().lcd.address)
        .into_iter()
        .filter_map(|byte| match byte {
            LcdByte::Data(c) => Some(char::from(c)),
            LcdByte::Command(_) => None,
        })
        .collect();
    if !text.is_empty() {
        log::debug!("lcd shows \"{}\"", text);
    }
}

fn main() -> Result<()> {
    init_logger()?;

    let mut robot = Robot::with_defaults(MockPins::new()).context("default wiring")?;
    let mut world = World::default();

    let map = robot.config().pins;
    robot.pins_mut().set_analog_input(map.line_left, 200);
    robot.pins_mut().set_analog_input(map.line_center, 12);
    robot.pins_mut().set_analog_input(map.line_right, 200);
    robot.pins_mut().set_analog_input(map.ports[Port::P2.index()], 512);

    log::info!("beat_sim ready, one command per line");

    let mut simulated_us = 0;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words[0] == "world" {
            match apply_world(&mut robot, &mut world, &words[1..]) {
                Ok(()) => writeln!(stdout, "ok")?,
                Err(e) => writeln!(stdout, "error: {:#}", e)?,
            }
            continue;
        }

        let cmd = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(stdout, "error: {}", e)?;
                continue;
            }
        };

        robot.pins_mut().clear_events();
        prime(&mut robot, &world, &cmd);
        match robot.execute(&cmd) {
            Ok(outcome) => writeln!(stdout, "{}", outcome)?,
            Err(()) => writeln!(stdout, "error: pin failure")?,
        }
        report_lcd(&robot);
        simulated_us += robot.pins().elapsed_us();
    }

    log::info!("simulated time {} ms", simulated_us / 1_000);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_obstacle_saturates_echo() {
        let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
        let mut world = World::default();
        apply_world(&mut robot, &mut world, &["obstacle", "99999999"]).unwrap();

        prime(&mut robot, &world, &Command::Distance);
        // Longer than any echo timeout, so it reads as no echo
        assert_eq!(robot.distance_cm().unwrap(), 0);
    }

    #[test]
    fn out_of_range_world_values_are_rejected() {
        let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
        let mut world = World::default();

        assert!(apply_world(&mut robot, &mut world, &["line", "10", "70000", "10"]).is_err());
        assert!(apply_world(&mut robot, &mut world, &["analog", "2", "2000"]).is_err());
        assert!(apply_world(&mut robot, &mut world, &["climate", "300", "50"]).is_err());
        assert_eq!(world.climate.temperature, 24);
    }
}
