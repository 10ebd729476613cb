//! Unit tests for TOML configuration parsing.

use servo_motion::config::{load_config, Direction, Port, SystemConfig};

/// Test parsing a port with every field given.
#[test]
fn test_parse_port_config() {
    let toml_str = r#"
[ports.C]
direction = "counterclockwise"
counts_per_unit = 2.0
gear_ratio = 12.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let port = config.port(Port::C).expect("Port not found");

    assert_eq!(port.direction, Direction::Counterclockwise);
    assert_eq!(port.counts_per_unit, 2.0);
    assert_eq!(port.gear_ratio, 12.0);
    assert_eq!(port.counts_per_output_unit(), 24.0);
}

/// Test that omitted settings fall back to the firmware defaults.
#[test]
fn test_settings_defaults() {
    let config: SystemConfig = toml::from_str("[ports.A]\n").expect("Failed to parse TOML");
    let settings = config.port(Port::A).unwrap().settings;

    assert_eq!(settings.stall_torque_limit, 100);
    assert_eq!(settings.stall_speed_limit, 2);
    assert_eq!(settings.stall_time, 500);
    assert_eq!(settings.speed_tolerance, 5);
    assert_eq!(settings.max_speed, 1000);
    assert_eq!(settings.position_tolerance, 1);
    assert_eq!(settings.acceleration_start, 1000);
    assert_eq!(settings.acceleration_end, 1000);
    assert_eq!(settings.tight_loop_time, 100);
    assert_eq!((settings.pid_kp, settings.pid_ki, settings.pid_kd), (800, 800, 5));
}

/// Test partial settings tables with renamed keys.
#[test]
fn test_parse_partial_settings() {
    let toml_str = r#"
[ports.D.settings]
stall_torque_limit_pct = 40
stall_time_ms = 200
tight_loop_time_ms = 20
acceleration_end = 3000
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let settings = config.port(Port::D).unwrap().settings;

    assert_eq!(settings.stall_torque_limit, 40);
    assert_eq!(settings.stall_time, 200);
    assert_eq!(settings.tight_loop_time, 20);
    assert_eq!(settings.acceleration_end, 3000);
    assert_eq!(settings.acceleration_start, 1000);
}

/// Test parsing the drivebase table.
#[test]
fn test_parse_drivebase() {
    let toml_str = r#"
[ports.A]
[ports.B]

[drivebase]
left = "B"
right = "A"
wheel_diameter_mm = 43.2
axle_track_mm = 120.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let db = config.drivebase.as_ref().expect("Drivebase not found");

    assert_eq!(db.wheel_diameter, 43.2);
    assert_eq!(db.axle_track, 120.0);
    assert_eq!(config.drivebase_ports(), Some((Port::B, Port::A)));
}

/// Test that configured ports are listed by their parsed names.
#[test]
fn test_configured_ports() {
    let config: SystemConfig =
        toml::from_str("[ports.b]\n[ports.D]\n").expect("Failed to parse TOML");
    let ports: Vec<_> = config.configured_ports().collect();

    assert_eq!(ports, vec![Port::B, Port::D]);
}

/// Test that an unknown direction is a parse error.
#[test]
fn test_unknown_direction_fails() {
    let result: Result<SystemConfig, _> = toml::from_str(
        r#"
[ports.A]
direction = "sideways"
"#,
    );
    assert!(result.is_err());
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("servo_motion_load_config_test.toml");
    std::fs::write(&path, "[ports.A]\ngear_ratio = 5.0\n").expect("Failed to write config");

    let config = load_config(&path).expect("Failed to load config");
    assert_eq!(config.port(Port::A).unwrap().gear_ratio, 5.0);

    let _ = std::fs::remove_file(&path);
}

/// Test that a missing file is reported as an I/O error.
#[test]
fn test_load_config_missing_file() {
    let result = load_config("/nonexistent/servo_motion/ports.toml");
    assert!(matches!(
        result,
        Err(servo_motion::Error::Config(servo_motion::error::ConfigError::IoError(_)))
    ));
}
