//! Real-time trajectory evaluation.

use super::fixed::{timest, timest2, Counts, Micros, Rate};
use super::trajectory::Trajectory;

/// Instantaneous reference produced by [`Trajectory::reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reference {
    /// Reference position in counts.
    pub count: Counts,
    /// Reference speed in counts per second.
    pub rate: Rate,
}

/// Segment of a trajectory active at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Constant `a0` from `(t0, th0, w0)`.
    Accelerating,
    /// Constant `w1` from `(t1, th1)`.
    Cruising,
    /// Constant `a2` from `(t2, th2, w1)`.
    Decelerating,
    /// Pinned at `th3`.
    Holding,
}

impl Trajectory {
    /// Which segment applies at `now`.
    ///
    /// Unbounded actions never leave the cruise segment once acceleration
    /// ends, however far past the nominal `t3` the clock runs.
    pub fn phase(&self, now: Micros) -> MotionPhase {
        if now < self.t1 {
            MotionPhase::Accelerating
        } else if self.action.is_unbounded() {
            MotionPhase::Cruising
        } else if now >= self.t3 {
            MotionPhase::Holding
        } else if now <= self.t2 {
            MotionPhase::Cruising
        } else {
            MotionPhase::Decelerating
        }
    }

    /// Reference position and speed at `now`.
    ///
    /// Deltas are taken relative to the segment start so that large absolute
    /// timestamps never enter a product.
    pub fn reference(&self, now: Micros) -> Reference {
        match self.phase(now) {
            MotionPhase::Accelerating => {
                let dt = now - self.t0;
                Reference {
                    count: self.th0 + timest(self.w0, dt) + timest2(self.a0, dt),
                    rate: self.w0 + timest(self.a0, dt),
                }
            }
            MotionPhase::Cruising => Reference {
                count: self.th1 + timest(self.w1, now - self.t1),
                rate: self.w1,
            },
            MotionPhase::Decelerating => {
                let dt = now - self.t2;
                Reference {
                    count: self.th2 + timest(self.w1, dt) + timest2(self.a2, dt),
                    rate: self.w1 + timest(self.a2, dt),
                }
            }
            MotionPhase::Holding => Reference {
                count: self.th3,
                rate: 0,
            },
        }
    }
}
