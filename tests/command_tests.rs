//! Tests for the text command surface against the mock pin layer

use beatbot::hal::{LcdByte, MockPins};
use beatbot::{Command, Level, LinePosition, Outcome, ParseError, Port, Robot};

fn run(robot: &mut Robot<MockPins>, line: &str) -> Outcome {
    let cmd: Command = line.parse().unwrap();
    robot.execute(&cmd).unwrap()
}

fn robot() -> Robot<MockPins> {
    Robot::with_defaults(MockPins::new()).unwrap()
}

#[test]
fn move_and_stop() {
    let mut robot = robot();
    let map = robot.config().pins;

    assert_eq!(run(&mut robot, "move forward"), Outcome::Done);
    assert_eq!(robot.pins().analog_output(map.left_motor.pwm), Some(511));
    assert_eq!(robot.pins().analog_output(map.right_motor.pwm), Some(511));

    assert_eq!(run(&mut robot, "stop left"), Outcome::Done);
    assert_eq!(robot.pins().analog_output(map.left_motor.pwm), Some(0));
    assert_eq!(robot.pins().analog_output(map.right_motor.pwm), Some(511));
}

#[test]
fn drive_clamps_in_driver() {
    let mut robot = robot();
    let pwm = robot.config().pins.right_motor.pwm;

    run(&mut robot, "drive back right 250");
    assert_eq!(robot.pins().analog_output(pwm), Some(1023));
}

#[test]
fn line_and_over() {
    let mut robot = robot();
    let map = robot.config().pins;
    robot.pins_mut().set_analog_input(map.line_left, 100);
    robot.pins_mut().set_analog_input(map.line_center, 100);
    robot.pins_mut().set_analog_input(map.line_right, 3);

    assert_eq!(run(&mut robot, "line"), Outcome::Line(LinePosition::Right));
    assert_eq!(run(&mut robot, "over right"), Outcome::Over(true));
    assert_eq!(run(&mut robot, "over c"), Outcome::Over(false));
}

#[test]
fn distance_reading() {
    let mut robot = robot();
    robot.pins_mut().queue_pulse(58 * 25);
    assert_eq!(run(&mut robot, "distance"), Outcome::Distance(25));
    assert_eq!(run(&mut robot, "distance").to_string(), "0 cm");
}

#[test]
fn port_sensors() {
    let mut robot = robot();
    let pins = robot.config().pins.ports;
    robot.pins_mut().set_analog_input(pins[0], 321);
    robot.pins_mut().set_digital_input(pins[1], Level::High);

    assert_eq!(run(&mut robot, "analog 1"), Outcome::Raw(321));
    assert_eq!(run(&mut robot, "touch p2"), Outcome::Pressed(true));
    assert_eq!(run(&mut robot, "touch p3"), Outcome::Pressed(false));
}

#[test]
fn climate_commands_return_text() {
    let mut robot = robot();
    robot.pins_mut().queue_dht_frame([60, 0, 19, 0, 79]);
    assert_eq!(run(&mut robot, "temp 1").to_string(), "19");

    assert_eq!(run(&mut robot, "humidity 1").to_string(), "ERR");
}

#[test]
fn lcd_commands() {
    let mut robot = robot();

    assert_eq!(run(&mut robot, "lcd init"), Outcome::Done);
    assert!(robot.lcd_initialized());
    robot.pins_mut().clear_events();

    run(&mut robot, "lcd 14 1 ok!");
    let bytes = robot.pins().lcd_bytes(0x27);
    assert_eq!(
        bytes,
        vec![
            LcdByte::Command(0xC0 | 14),
            LcdByte::Data(b'o'),
            LcdByte::Data(b'k'),
        ]
    );
}

#[test]
fn fan_commands() {
    let mut robot = robot();
    let pin = robot.config().pins.ports[Port::P3.index()];

    run(&mut robot, "fan 3 on");
    assert_eq!(robot.pins().digital_output(pin), Some(Level::High));
    run(&mut robot, "fan 3 off");
    assert_eq!(robot.pins().digital_output(pin), Some(Level::Low));
    run(&mut robot, "fan 3 100");
    assert_eq!(robot.pins().analog_output(pin), Some(1023));
}

#[test]
fn servo_commands() {
    let mut robot = robot();

    assert_eq!(run(&mut robot, "servo 2 45"), Outcome::Done);
    assert_eq!(robot.servo_position(Port::P2), 45);

    assert_eq!(run(&mut robot, "servo 2 50 3"), Outcome::Steps(5));
    assert_eq!(robot.servo_position(Port::P2), 50);
}

#[test]
fn pin_failure_surfaces_from_execute() {
    let mut robot = robot();
    let pin = robot.config().pins.ports[Port::P1.index()];
    robot.pins_mut().fail_on(pin);

    let cmd: Command = "servo 1 10".parse().unwrap();
    assert_eq!(robot.execute(&cmd), Err(()));
    assert_eq!(robot.servo_position(Port::P1), 90);
}

#[test]
fn malformed_commands_are_rejected() {
    assert_eq!(
        "fan 2 fast".parse::<Command>(),
        Err(ParseError::Invalid {
            expected: "on, off or percent",
            token: "fast".to_string()
        })
    );
    assert_eq!(
        "lcd 1".parse::<Command>(),
        Err(ParseError::Missing("row"))
    );
    assert!("servo 1 x".parse::<Command>().is_err());
    assert!("stop sideways".parse::<Command>().is_err());
}
