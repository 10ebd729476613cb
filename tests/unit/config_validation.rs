//! Unit tests for configuration validation.

use servo_motion::config::{validate_config, SystemConfig};
use servo_motion::error::{ConfigError, Error};

fn parse(toml_str: &str) -> SystemConfig {
    toml::from_str(toml_str).expect("Failed to parse TOML")
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = parse(
        r#"
[ports.A]
gear_ratio = 3.0

[ports.B]
direction = "counterclockwise"

[drivebase]
left = "A"
right = "B"
wheel_diameter_mm = 56.0
axle_track_mm = 112.0
"#,
    );
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a port name outside A-D.
#[test]
fn test_invalid_port_name() {
    let config = parse("[ports.E]\n");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidPortName(_)))
    ));
}

/// Test validation fails when one port is named twice.
#[test]
fn test_duplicate_port() {
    let config = parse("[ports.a]\n[ports.A]\n");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicatePort(_)))
    ));
}

/// Test validation fails for a non-positive counts per unit.
#[test]
fn test_invalid_counts_per_unit() {
    let config = parse("[ports.A]\ncounts_per_unit = -2.0\n");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidCountsPerUnit(_)))
    ));
}

/// Test validation fails for out-of-range settings.
#[test]
fn test_invalid_settings() {
    for (key, value) in [
        ("stall_torque_limit_pct", 0),
        ("stall_torque_limit_pct", 101),
        ("max_speed", 0),
        ("acceleration_start", -5),
        ("acceleration_end", 0),
        ("tight_loop_time_ms", -1),
        ("pid_kd", -3),
    ] {
        let config = parse(&format!("[ports.A.settings]\n{key} = {value}\n"));
        let result = validate_config(&config);
        assert!(
            matches!(result, Err(Error::Config(ConfigError::InvalidSetting { .. }))),
            "{key} = {value} should be rejected"
        );
    }
}

/// Test validation fails for a drivebase on an unconfigured port.
#[test]
fn test_drivebase_unconfigured_port() {
    let config = parse(
        r#"
[ports.A]

[drivebase]
left = "A"
right = "C"
wheel_diameter_mm = 56.0
axle_track_mm = 112.0
"#,
    );
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidDrivebase))
    );
}

/// Test validation fails for a drivebase using one port twice.
#[test]
fn test_drivebase_same_port() {
    let config = parse(
        r#"
[ports.A]

[drivebase]
left = "A"
right = "a"
wheel_diameter_mm = 56.0
axle_track_mm = 112.0
"#,
    );
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidDrivebase))
    );
}

/// Test validation fails for zero wheel geometry.
#[test]
fn test_drivebase_geometry() {
    let config = parse(
        r#"
[ports.A]
[ports.B]

[drivebase]
left = "A"
right = "B"
wheel_diameter_mm = 56.0
axle_track_mm = 0.0
"#,
    );
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGeometry(0.0)))
    );
}
