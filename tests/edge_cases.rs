//! Edge case and boundary condition tests for the drivers

use beatbot::config::{ConfigError, PinRole};
use beatbot::dht11::{Dht11, Rejection};
use beatbot::hal::{MockPins, PinEvent};
use beatbot::motor::speed_to_duty;
use beatbot::servo::clamp_angle;
use beatbot::{
    Config, Direction, LcdConfig, LineConfig, LinePolicy, LinePosition, MotorSelect, PinMap, Port,
    Robot, TimingConfig,
};

// ============================================================================
// Boundary Value Tests
// ============================================================================

#[test]
fn duty_stays_in_range_for_any_speed() {
    for speed in [-1_000, -1, 0, 1, 50, 99, 100, 101, i32::MAX, i32::MIN] {
        assert!(speed_to_duty(speed) <= 1023, "speed {}", speed);
    }
    assert_eq!(speed_to_duty(i32::MIN), 0);
    assert_eq!(speed_to_duty(i32::MAX), 1023);
}

#[test]
fn duty_is_monotonic() {
    let duties: Vec<u16> = (-10..=110).map(speed_to_duty).collect();
    assert!(duties.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(speed_to_duty(0), 0);
    assert_eq!(speed_to_duty(100), 1023);
}

#[test]
fn negative_speed_drives_at_zero_duty() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    let pwm = robot.config().pins.left_motor.pwm;

    robot.drive(Direction::Forward, MotorSelect::Left, -40).unwrap();
    assert_eq!(robot.pins().analog_output(pwm), Some(0));
}

#[test]
fn servo_angle_clamps() {
    assert_eq!(clamp_angle(-1), 0);
    assert_eq!(clamp_angle(181), 180);
    assert_eq!(clamp_angle(i32::MIN), 0);
}

#[test]
fn servo_out_of_range_sweep_stops_at_limit() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    let steps = robot.servo_move(Port::P2, 500, 1).unwrap();

    assert_eq!(steps, 90);
    assert_eq!(robot.servo_position(Port::P2), 180);
}

#[test]
fn line_threshold_is_inclusive() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    let map = robot.config().pins;
    robot.pins_mut().set_analog_input(map.line_left, 31);
    robot.pins_mut().set_analog_input(map.line_center, 31);
    robot.pins_mut().set_analog_input(map.line_right, 30);

    assert_eq!(robot.line_position().unwrap(), LinePosition::Right);
}

#[test]
fn line_custom_threshold_and_policy() {
    let line = LineConfig::default()
        .with_threshold(100)
        .with_policy(LinePolicy::AllAboveIsCenter);
    let mut robot = Robot::new(MockPins::new(), Config::default().with_line(line)).unwrap();
    let map = robot.config().pins;

    robot.pins_mut().set_analog_input(map.line_left, 200);
    robot.pins_mut().set_analog_input(map.line_center, 200);
    robot.pins_mut().set_analog_input(map.line_right, 200);
    assert_eq!(robot.line_position().unwrap(), LinePosition::Center);

    robot.pins_mut().set_analog_input(map.line_left, 90);
    assert_eq!(robot.line_position().unwrap(), LinePosition::Left);
}

// ============================================================================
// DHT11 Rejection Tests
// ============================================================================

#[test]
fn dht_single_bit_flip_is_rejected() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    // Humidity 40 -> 41 without touching the checksum
    robot.pins_mut().queue_dht_frame([41, 0, 22, 5, 67]);
    assert_eq!(robot.read_climate(Port::P1).unwrap(), None);
}

#[test]
fn dht_truncated_frame_is_rejected() {
    let mut pins = MockPins::new();
    // Response plus the first three bits only
    pins.queue_pulses(&[80, 80, 50, 26, 50, 70, 50, 26]);

    let dht = Dht11::default();
    let result = dht.try_read(&mut pins, 4, dht.step_timeout_us()).unwrap();
    assert_eq!(result, Err(Rejection::BitSeparator(3)));
}

#[test]
fn dht_silent_sensor_is_rejected_at_response() {
    let mut pins = MockPins::new();
    let dht = Dht11::default();
    let result = dht.try_read(&mut pins, 4, dht.step_timeout_us()).unwrap();
    assert_eq!(result, Err(Rejection::NoResponseLow));
}

#[test]
fn dht_slow_pulse_times_out_under_tight_budget() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    robot.pins_mut().queue_dht_frame([40, 0, 22, 5, 67]);

    // The 80 µs response pulse exceeds a 60 µs budget
    assert_eq!(robot.read_climate_within(Port::P1, 60).unwrap(), None);
}

#[test]
fn dht_wake_has_protocol_floor() {
    let timing = TimingConfig::default().with_dht_wake_ms(5);
    assert_eq!(timing.dht_wake_ms, 18);
}

#[test]
fn literal_timing_still_honours_protocol_floors() {
    let timing = TimingConfig {
        dht_wake_ms: 5,
        lcd_clear_ms: 0,
        ..TimingConfig::default()
    };
    let mut robot = Robot::new(MockPins::new(), Config::default().with_timing(timing)).unwrap();

    robot.read_climate(Port::P1).unwrap();
    assert_eq!(robot.pins().events()[1], PinEvent::PauseMs(18));

    robot.lcd_init().unwrap();
    robot.pins_mut().clear_events();
    robot.lcd_clear().unwrap();
    assert!(robot.pins().elapsed_us() >= 2_000);
}

#[test]
fn servo_failure_mid_sweep_keeps_tracked_angle() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    let pin = robot.config().pins.ports[Port::P2.index()];
    robot.pins_mut().fail_on_after(pin, 5);

    assert_eq!(robot.servo_move(Port::P2, 150, 2), Err(()));
    assert_eq!(robot.servo_position(Port::P2), 90);
}

// ============================================================================
// Configuration Validation
// ============================================================================

#[test]
fn ultrasonic_on_line_sensor_pins_is_rejected() {
    let pins = PinMap::default().with_ultrasonic(1, 2);
    let config = Config::default().with_pins(pins);

    match Robot::new(MockPins::new(), config) {
        Err(ConfigError::PinConflict { pin, first, second }) => {
            assert_eq!(pin, 1);
            assert_eq!(first, PinRole::LineCenter);
            assert_eq!(second, PinRole::Trigger);
        }
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("conflicting map accepted"),
    }
}

#[test]
fn invalid_lcd_geometry_is_rejected() {
    let lcd = LcdConfig {
        columns: 0,
        ..LcdConfig::default()
    };
    let result = Robot::new(MockPins::new(), Config::default().with_lcd(lcd));
    assert!(matches!(result, Err(ConfigError::LcdGeometry { .. })));
}

#[test]
fn default_map_is_conflict_free() {
    assert!(PinMap::default().validate().is_ok());
}

// ============================================================================
// Pin Error Propagation
// ============================================================================

#[test]
fn range_error_propagates() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    let trigger = robot.config().pins.trigger;
    robot.pins_mut().fail_on(trigger);
    assert_eq!(robot.distance_cm(), Err(()));
}

#[test]
fn lcd_error_leaves_display_uninitialized() {
    let mut robot = Robot::with_defaults(MockPins::new()).unwrap();
    robot.pins_mut().fail_on_i2c();
    assert_eq!(robot.lcd_init(), Err(()));
    assert!(!robot.lcd_initialized());
}
