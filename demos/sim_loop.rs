//! Simulated control loop example.
//!
//! Demonstrates building a motor system from TOML, issuing commands and
//! running the control poll loop against the simulated plant:
//! - a RUN_ANGLE on one port finishing in HOLD
//! - a two-motor drivebase turning in place
//! - RUN repeated from a joystick-style tight loop
//!
//! Run with: `cargo run --example sim_loop --features std`

use servo_motion::{
    device::sim::SimBench,
    error::Result,
    motor::{Command, MotorSystem},
    parse_config, AfterStop, Port,
};

const CONFIG: &str = r#"
[ports.A]
direction = "counterclockwise"

[ports.B]

[ports.C]
gear_ratio = 3.0

[ports.C.settings]
max_speed = 300
acceleration_start = 600

[drivebase]
left = "A"
right = "B"
wheel_diameter_mm = 56.0
axle_track_mm = 112.0
"#;

/// Control tick in microseconds.
const TICK: i64 = 1_000;

fn run_for(system: &mut MotorSystem, hw: &mut SimBench<4>, now: &mut i64, duration: i64) {
    let end = *now + duration;
    while *now < end {
        system.poll(hw, *now);
        hw.step(TICK);
        *now += TICK;
    }
}

fn main() -> Result<()> {
    println!("=== Simulated Servo Loop ===\n");

    let config = parse_config(CONFIG)?;
    let mut system: MotorSystem = MotorSystem::from_config(&config)?;
    let mut hw: SimBench<4> = SimBench::new();
    let mut now = 0;

    println!("Port C settings:\n{}\n", system.settings_report(Port::C)?);

    // Positioning move on a geared output
    system.command(&mut hw, Port::C, now, Command::run_angle(200, 90, AfterStop::Hold))?;
    let trajectory = *system.servo(Port::C)?.trajectory();
    println!(
        "RUN_ANGLE 90: {} -> {} counts over {} ms",
        trajectory.th0,
        trajectory.th3,
        trajectory.duration() / 1_000
    );

    // Spin the drivebase in place at the same time
    system.command(&mut hw, Port::A, now, Command::run_time(-300, 1500, AfterStop::Brake))?;
    system.command(&mut hw, Port::B, now, Command::run_time(300, 1500, AfterStop::Brake))?;

    for _ in 0..4 {
        run_for(&mut system, &mut hw, &mut now, 500 * TICK);
        let c = system.servo(Port::C)?;
        let db = system.drivebase().map(|d| *d.state()).unwrap_or_default();
        println!(
            "t={:>5} ms  C: {:<10} count {:>5} ref {:>5}  drivebase heading {:>7.1} deg",
            now / 1_000,
            c.activity().name(),
            c.status().count,
            c.status().reference.count,
            db.heading,
        );
    }

    // Joystick polling: RUN every 20 ms only refreshes the degenerate profile
    println!("\nTight-loop RUN on port B:");
    for speed in [100, 200, 300, 400, 300, 200] {
        system.command(&mut hw, Port::B, now, Command::run(speed))?;
        run_for(&mut system, &mut hw, &mut now, 20 * TICK);
        let b = system.servo(Port::B)?;
        println!(
            "  speed {:>3}: th0 {:>5}, measured rate {:>4}",
            speed,
            b.trajectory().th0,
            b.status().rate
        );
    }

    system.servo_mut(Port::B)?.stop(&mut hw, now, AfterStop::Coast)?;
    println!("\nStopped. Connected ports: {}", system.connected_count());
    Ok(())
}
