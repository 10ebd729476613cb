//! Integer kinematics helpers.
//!
//! Positions are encoder counts, speeds counts/s, accelerations counts/s² and
//! times microseconds, all `i64`. Products with a time delta are split into
//! whole seconds and the sub-second remainder so the intermediate never holds
//! `value × delta_us` in one piece.

/// Microseconds per millisecond.
pub const US_PER_MS: i64 = 1_000;

/// Microseconds per second.
pub const US_PER_SECOND: i64 = 1_000_000;

/// Time stamp or interval in microseconds.
pub type Micros = i64;

/// Encoder position.
pub type Counts = i64;

/// Encoder speed in counts per second.
pub type Rate = i64;

/// Encoder acceleration in counts per second squared.
pub type Accel = i64;

/// `x · dt` for a per-second quantity `x` and a delta in microseconds.
#[inline]
pub fn timest(x: i64, dt: Micros) -> i64 {
    x * (dt / US_PER_SECOND) + x * (dt % US_PER_SECOND) / US_PER_SECOND
}

/// `½ · a · dt²`, integrated in two bounded steps.
#[inline]
pub fn timest2(a: Accel, dt: Micros) -> Counts {
    timest(timest(a, dt), dt) / 2
}

/// Time in microseconds for speed change `w` at acceleration `a` (`w / a`).
///
/// Also gives the time to cover distance `w` at speed `a`.
#[inline]
pub fn wdiva(w: i64, a: i64) -> Micros {
    (w / a) * US_PER_SECOND + (w % a) * US_PER_SECOND / a
}

/// Integer square root of a non-negative value, truncated.
#[inline]
pub fn isqrt(x: i64) -> i64 {
    if x <= 0 {
        return 0;
    }
    libm::sqrt(x as f64) as i64
}
