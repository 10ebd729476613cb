//! Integration tests for servo-motion.
//!
//! These tests run the complete workflow from TOML parsing through command
//! dispatch and the control poll loop, against the simulated plant and a
//! registry-backed counter bench.

use servo_motion::config::{Port, SystemConfig};
use servo_motion::device::sim::SimBench;
use servo_motion::device::{CounterMotors, Counter, DeviceRegistry};
use servo_motion::error::{DeviceError, Error, MotionError};
use servo_motion::motion::{Action, MotionPhase};
use servo_motion::motor::{Activity, Command, MotorOutput, MotorSystem};
use servo_motion::{parse_config, AfterStop};

// =============================================================================
// Test configuration data
// =============================================================================

const ROBOT_CONFIG: &str = r#"
[ports.A]
direction = "counterclockwise"

[ports.B]

[ports.C]
counts_per_unit = 2.0
gear_ratio = 3.0

[ports.C.settings]
max_speed = 200
acceleration_start = 400
tight_loop_time_ms = 50

[drivebase]
left = "A"
right = "B"
wheel_diameter_mm = 56.0
axle_track_mm = 112.0
"#;

const TICK: i64 = 1_000;

fn robot() -> (MotorSystem, SimBench<4>) {
    let config = parse_config(ROBOT_CONFIG).expect("Config should parse");
    let system = MotorSystem::from_config(&config).expect("System should build");
    (system, SimBench::new())
}

/// Poll and advance the plant once per millisecond over `[from, to)`.
fn run_loop(system: &mut MotorSystem, hw: &mut SimBench<4>, from: i64, to: i64) {
    let mut now = from;
    while now < to {
        system.poll(hw, now);
        hw.step(TICK);
        now += TICK;
    }
}

// =============================================================================
// Configuration to system
// =============================================================================

#[test]
fn test_config_builds_calibrated_servos() {
    let (system, _) = robot();

    let c = system.servo(Port::C).unwrap();
    assert_eq!(c.scale().counts_per_output_unit(), 6.0);
    assert_eq!(c.limits().max_rate, 1200);
    assert_eq!(c.limits().abs_accl_start, 2400);
    assert_eq!(c.limits().tight_loop_time, 50_000);

    assert!(system.servo(Port::A).unwrap().is_connected());
    assert!(!system.servo(Port::D).unwrap().is_connected());
    assert!(system.drivebase().is_some());
}

#[test]
fn test_invalid_config_rejected_before_system() {
    let config: SystemConfig = toml::from_str(
        r#"
[ports.A]
gear_ratio = 0.0
"#,
    )
    .expect("TOML itself is valid");

    assert!(MotorSystem::<servo_motion::Pid>::from_config(&config).is_err());
}

// =============================================================================
// Maneuvers through the poll loop
// =============================================================================

#[test]
fn test_run_angle_finishes_and_holds_target() {
    let (mut system, mut hw) = robot();

    system
        .command(&mut hw, Port::C, 0, Command::run_angle(90, 45, AfterStop::Hold))
        .unwrap();
    let trajectory = *system.servo(Port::C).unwrap().trajectory();
    // 45 output degrees at 6 counts each
    assert_eq!(trajectory.th3 - trajectory.th0, 270);
    assert_eq!(trajectory.action, Action::RunAngle);

    run_loop(&mut system, &mut hw, 0, trajectory.t3 + 10 * TICK);

    let c = system.servo(Port::C).unwrap();
    assert_eq!(c.activity(), Activity::Holding);
    assert_eq!(c.trajectory().phase(trajectory.t3 + 10 * TICK), MotionPhase::Holding);
    assert_eq!(c.status().reference.count, 270);
    assert_eq!(c.status().reference.rate, 0);
}

#[test]
fn test_run_time_brakes_when_done() {
    let (mut system, mut hw) = robot();

    system
        .command(&mut hw, Port::B, 0, Command::run_time(300, 800, AfterStop::Brake))
        .unwrap();
    run_loop(&mut system, &mut hw, 0, 790_000);
    assert_eq!(system.servo(Port::B).unwrap().activity(), Activity::Running);

    run_loop(&mut system, &mut hw, 790_000, 810_000);
    let b = system.servo(Port::B).unwrap();
    assert_eq!(b.activity(), Activity::Idle);
    assert_eq!(b.status().duty, 0);
    assert_eq!(hw.motor(Port::B).unwrap().duty(), 0);
    assert!(!hw.motor(Port::B).unwrap().is_coasting());
}

#[test]
fn test_run_keeps_going_past_nominal_duration() {
    let (mut system, mut hw) = robot();

    system.command(&mut hw, Port::B, 0, Command::run(200)).unwrap();
    run_loop(&mut system, &mut hw, 0, 10 * TICK);

    // Far beyond the fictitious end of the RUN profile
    let late = 45_000_000;
    run_loop(&mut system, &mut hw, late, late + 10 * TICK);

    let b = system.servo(Port::B).unwrap();
    assert_eq!(b.activity(), Activity::Running);
    assert_eq!(b.status().reference.rate, 200);
}

#[test]
fn test_tight_loop_run_is_continuous() {
    let (mut system, mut hw) = robot();

    system.command(&mut hw, Port::A, 0, Command::run(400)).unwrap();
    run_loop(&mut system, &mut hw, 0, 60 * TICK);

    let expected = system
        .servo(Port::A)
        .unwrap()
        .trajectory()
        .reference(60 * TICK);
    system
        .command(&mut hw, Port::A, 60 * TICK, Command::run(400))
        .unwrap();

    let a = system.servo(Port::A).unwrap();
    assert_eq!(a.trajectory().th0, expected.count);
    assert_eq!(a.trajectory().t0, 60 * TICK);
    assert_eq!(a.trajectory().w1, 400);
    // The sensed position lags the reference, so a fresh start would differ
    assert_ne!(a.status().count, expected.count);
}

#[test]
fn test_command_rejection_keeps_previous_maneuver() {
    let (mut system, mut hw) = robot();

    system
        .command(&mut hw, Port::B, 0, Command::run_time(300, 2000, AfterStop::Coast))
        .unwrap();
    run_loop(&mut system, &mut hw, 0, 100 * TICK);
    let before = *system.servo(Port::B).unwrap().trajectory();

    let result = system.command(
        &mut hw,
        Port::B,
        100 * TICK,
        Command::run_target(0, 720, AfterStop::Hold),
    );
    assert!(matches!(
        result,
        Err(Error::Motion(MotionError::InvalidArgument(_)))
    ));
    assert_eq!(*system.servo(Port::B).unwrap().trajectory(), before);
    assert_eq!(system.servo(Port::B).unwrap().activity(), Activity::Running);
}

#[test]
fn test_reset_count_then_get_count() {
    let (mut system, mut hw) = robot();

    for (port, value) in [(Port::A, 500), (Port::B, -42), (Port::C, 0)] {
        let servo = system.servo_mut(port).unwrap();
        servo.reset_count(&mut hw, value).unwrap();
        assert_eq!(servo.get_count(&mut hw), Ok(value));
    }
}

#[test]
fn test_stop_hold_pins_current_position() {
    let (mut system, mut hw) = robot();

    system.command(&mut hw, Port::B, 0, Command::run(300)).unwrap();
    run_loop(&mut system, &mut hw, 0, 300 * TICK);

    let servo = system.servo_mut(Port::B).unwrap();
    servo.stop(&mut hw, 300 * TICK, AfterStop::Hold).unwrap();
    let pinned = servo.get_count(&mut hw).unwrap();
    assert_eq!(servo.activity(), Activity::Holding);
    assert_eq!(servo.trajectory().th3, pinned);
    assert_eq!(servo.trajectory().reference(10_000_000).rate, 0);
}

// =============================================================================
// Drivebase
// =============================================================================

#[test]
fn test_drivebase_straight_line() {
    let (mut system, mut hw) = robot();

    for port in [Port::A, Port::B] {
        system
            .command(&mut hw, port, 0, Command::run_angle(360, 360, AfterStop::Hold))
            .unwrap();
    }
    run_loop(&mut system, &mut hw, 0, 2_000_000);

    let state = system.drivebase().unwrap().state();
    assert!(state.distance > 0.0);
    // Both wheels follow identical profiles, whatever their mounting
    assert_eq!(state.heading, 0.0);
}

#[test]
fn test_drivebase_survives_other_port_fault() {
    let (mut system, mut hw) = robot();

    system
        .command(&mut hw, Port::A, 0, Command::run_time(-300, 1000, AfterStop::Coast))
        .unwrap();
    system
        .command(&mut hw, Port::B, 0, Command::run_time(300, 1000, AfterStop::Coast))
        .unwrap();
    hw.motor_mut(Port::C).unwrap().faulted = true;

    run_loop(&mut system, &mut hw, 0, 500 * TICK);

    assert!(!system.servo(Port::C).unwrap().is_connected());
    assert_eq!(system.servo(Port::C).unwrap().activity(), Activity::Errored);
    assert!(system.drivebase().unwrap().state().heading > 0.0);
}

// =============================================================================
// Registry-backed hardware
// =============================================================================

#[derive(Debug, PartialEq)]
struct FixedCounter(i64);

impl Counter for FixedCounter {
    fn count(&mut self) -> Result<i64, DeviceError> {
        Ok(self.0)
    }

    fn rate(&mut self) -> Result<i64, DeviceError> {
        Ok(0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Recorder {
    duty: i32,
    coasting: bool,
}

impl MotorOutput for Recorder {
    fn coast(&mut self) -> Result<(), DeviceError> {
        self.coasting = true;
        self.duty = 0;
        Ok(())
    }

    fn brake(&mut self) -> Result<(), DeviceError> {
        self.coasting = false;
        self.duty = 0;
        Ok(())
    }

    fn set_duty(&mut self, duty: i32) -> Result<(), DeviceError> {
        self.coasting = false;
        self.duty = duty;
        Ok(())
    }
}

#[test]
fn test_registry_not_ready_disconnects_until_reconnected() {
    let config = parse_config("[ports.A]\n[ports.B]\n").unwrap();
    let mut system: MotorSystem = MotorSystem::from_config(&config).unwrap();

    let mut counters: DeviceRegistry<FixedCounter, 4> = DeviceRegistry::new();
    counters.register(0, FixedCounter(0)).unwrap();
    let mut hw = CounterMotors::new(counters, [Recorder::default(); 4]);

    // Registered but still coming up
    assert_eq!(
        system.command(&mut hw, Port::A, 0, Command::run_target(200, 90, AfterStop::Hold)),
        Err(Error::Device(DeviceError::NotReady))
    );
    system.poll(&mut hw, 0);
    assert!(!system.servo(Port::A).unwrap().is_connected());
    // Port B never got a counter
    assert!(!system.servo(Port::B).unwrap().is_connected());

    hw.counters_mut().set_initialized(0, true).unwrap();
    system.reconnect(Port::A).unwrap();
    system
        .command(&mut hw, Port::A, 0, Command::run_target(200, 90, AfterStop::Hold))
        .unwrap();

    system.poll(&mut hw, 0);
    system.poll(&mut hw, 100 * TICK);
    assert!(system.servo(Port::A).unwrap().is_connected());
    assert_eq!(system.servo(Port::A).unwrap().activity(), Activity::Running);
    assert!(hw.outputs_mut()[0].duty > 0);
    assert!(!system.servo(Port::B).unwrap().is_connected());
}
