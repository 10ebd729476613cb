//! Motor module for servo-motion.
//!
//! Everything between a trajectory and the hardware: encoder calibration,
//! the per-port command state machine, the control law, H-bridge outputs and
//! the poller that ties all ports and the drivebase together.

mod control;
mod drivebase;
mod encoder;
mod hbridge;
mod servo;
pub mod state;
mod system;

pub use control::{ControlLaw, Pid, Tracking};
pub use drivebase::{Drivebase, DrivebaseState};
pub use encoder::EncoderScale;
pub use hbridge::{HBridge, MotorOutput};
pub use servo::{unbounded_run_duration, Command, Servo, ServoStatus, UNBOUNDED_RUN_MS};
pub use state::Activity;
pub use system::MotorSystem;
