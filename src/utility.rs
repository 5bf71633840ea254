//! Generic numeric helpers shared by the model and the sensor conversions

use num_traits::{Float, FloatConst};

/// Wrap an angle into (-π, π]
pub fn wrap<T: Float + FloatConst>(angle: T) -> T {
    let two_pi = T::PI() + T::PI();
    let mut angle = angle % two_pi;
    if angle > T::PI() {
        angle = angle - two_pi;
    }
    if angle <= -T::PI() {
        angle = angle + two_pi;
    }
    angle
}

/// Clamp `v` into `[lo, hi]`; `hi` must be greater than `lo`
pub fn clamp<T: PartialOrd + Copy>(v: T, lo: T, hi: T) -> T {
    debug_assert!(hi > lo, "hi must be greater than lo");
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}
