//! Two-motor differential drivebase.

use core::f32::consts::PI;

use crate::config::{Port, SystemConfig};

use super::servo::Servo;

/// Aggregate odometry of a drivebase.
///
/// Wheel angles are taken in output units, assumed to be degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrivebaseState {
    /// Distance driven by the midpoint of the axle, millimeters.
    pub distance: f32,
    /// Heading change, degrees, counterclockwise positive.
    pub heading: f32,
    /// Forward speed, millimeters per second.
    pub drive_speed: f32,
    /// Turn rate, degrees per second.
    pub turn_rate: f32,
}

/// Left and right servo ports plus wheel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Drivebase {
    left: Port,
    right: Port,
    wheel_diameter: f32,
    axle_track: f32,
    state: DrivebaseState,
}

impl Drivebase {
    /// Create a drivebase. Geometry in millimeters.
    pub fn new(left: Port, right: Port, wheel_diameter: f32, axle_track: f32) -> Self {
        Self {
            left,
            right,
            wheel_diameter,
            axle_track,
            state: DrivebaseState::default(),
        }
    }

    /// Drivebase described by a configuration, if any.
    pub fn from_config(config: &SystemConfig) -> Option<Self> {
        let (left, right) = config.drivebase_ports()?;
        let db = config.drivebase.as_ref()?;
        Some(Self::new(left, right, db.wheel_diameter, db.axle_track))
    }

    /// `(left, right)` ports.
    #[inline]
    pub fn ports(&self) -> (Port, Port) {
        (self.left, self.right)
    }

    /// State as of the last update.
    #[inline]
    pub fn state(&self) -> &DrivebaseState {
        &self.state
    }

    /// Recompute the aggregate from both servos' latest status.
    ///
    /// Must run after both servos' control updates for the tick.
    pub fn update(&mut self, left: &Servo, right: &Servo) {
        let (l_angle, l_rate) = wheel(left);
        let (r_angle, r_rate) = wheel(right);

        let mm_per_degree = PI * self.wheel_diameter / 360.0;
        let degrees_per_degree = self.wheel_diameter / (2.0 * self.axle_track);

        self.state = DrivebaseState {
            distance: (l_angle + r_angle) / 2.0 * mm_per_degree,
            heading: (r_angle - l_angle) * degrees_per_degree,
            drive_speed: (l_rate + r_rate) / 2.0 * mm_per_degree,
            turn_rate: (r_rate - l_rate) * degrees_per_degree,
        };
    }
}

/// Wheel angle and angular rate in output units.
fn wheel(servo: &Servo) -> (f32, f32) {
    let status = servo.status();
    let cpou = servo.scale().counts_per_output_unit();
    (status.count as f32 / cpou, status.rate as f32 / cpou)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortConfig;
    use crate::device::sim::{SimBench, SimMotor};
    use crate::motor::Pid;

    fn servo_at(hw: &mut SimBench<2>, port: Port, count: i64) -> Servo {
        *hw.motor_mut(port).unwrap() = SimMotor::at(count);
        let mut servo = Servo::from_config(port, &PortConfig::default());
        // Idle update only samples the encoder
        servo.control_update(hw, &mut Pid::default(), 0).unwrap();
        servo
    }

    #[test]
    fn test_straight_and_turning() {
        let mut hw = SimBench::new();
        // 360/π mm wheels travel exactly 1 mm per degree
        let mut db = Drivebase::new(Port::A, Port::B, 360.0 / PI, 100.0);

        let left = servo_at(&mut hw, Port::A, 360);
        let right = servo_at(&mut hw, Port::B, 360);
        db.update(&left, &right);
        assert!((db.state().distance - 360.0).abs() < 1e-3);
        assert!(db.state().heading.abs() < 1e-3);

        let left = servo_at(&mut hw, Port::A, -100);
        let right = servo_at(&mut hw, Port::B, 100);
        db.update(&left, &right);
        assert!(db.state().distance.abs() < 1e-3);
        // 200 mm of differential travel on a 100 mm track is 2 rad
        let expected = 2.0 * 180.0 / PI;
        assert!((db.state().heading - expected).abs() < 1e-2);
    }
}
