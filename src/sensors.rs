//! Encoder count and rate conversion
//!
//! Drivers and rate filters live outside this crate; they are reached through
//! the [`Encoder`] and [`RateEstimator`] traits.

use num_traits::{AsPrimitive, Float, FloatConst};

use crate::types::{EncoderConfig, RawEncoderSample};

/// Source of raw, wrapping position counts
pub trait Encoder {
    fn count(&self) -> u32;
    fn config(&self) -> &EncoderConfig;
}

/// Source of a filtered rate estimate in counts per cycle
pub trait RateEstimator {
    fn velocity(&self) -> f64;
    fn config(&self) -> &EncoderConfig;
}

/// Latest sample of a single encoder together with its configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderChannel {
    config: EncoderConfig,
    latest: RawEncoderSample,
}

impl EncoderChannel {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            latest: RawEncoderSample::default(),
        }
    }

    /// Replace the latest sample with a new driver reading
    pub fn record(&mut self, sample: RawEncoderSample) {
        self.latest = sample;
    }

    pub fn latest(&self) -> RawEncoderSample {
        self.latest
    }
}

impl Encoder for EncoderChannel {
    fn count(&self) -> u32 {
        self.latest.count
    }

    fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl RateEstimator for EncoderChannel {
    fn velocity(&self) -> f64 {
        f64::from(self.latest.velocity_count)
    }

    fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

/// Angle in radians from an encoder count
///
/// The unsigned count is reinterpreted as signed and counts past half a
/// revolution map to negative angles, giving a result in (-π, π].
pub fn encoder_count<T, E>(encoder: &E) -> T
where
    T: Float + FloatConst + 'static,
    i32: AsPrimitive<T>,
    E: Encoder + ?Sized,
{
    let rev = encoder.config().counts_per_revolution() as i32;
    let mut position = encoder.count() as i32;
    if position > rev / 2 {
        position -= rev;
    }
    let position: T = position.as_();
    let rev: T = rev.as_();
    position / rev * (T::PI() + T::PI())
}

/// Angular rate in radians per cycle from a rate estimate in counts per cycle
pub fn encoder_rate<T, R>(estimator: &R) -> T
where
    T: Float + FloatConst + 'static,
    f64: AsPrimitive<T>,
    i32: AsPrimitive<T>,
    R: RateEstimator + ?Sized,
{
    let rev: T = (estimator.config().counts_per_revolution() as i32).as_();
    let velocity: T = estimator.velocity().as_();
    velocity / rev * (T::PI() + T::PI())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn channel(counts_per_revolution: u32, count: u32, velocity_count: i32) -> EncoderChannel {
        let mut channel = EncoderChannel::new(EncoderConfig::new(counts_per_revolution).unwrap());
        channel.record(RawEncoderSample {
            count,
            velocity_count,
        });
        channel
    }

    #[test]
    fn test_zero_count() {
        let enc = channel(4096, 0, 0);
        assert_eq!(encoder_count::<f64, _>(&enc), 0.0);
    }

    #[test]
    fn test_quarter_revolution() {
        let enc = channel(4096, 1024, 0);
        assert_relative_eq!(encoder_count::<f64, _>(&enc), PI / 2.0);
    }

    #[test]
    fn test_half_revolution_stays_positive() {
        let enc = channel(4096, 2048, 0);
        assert_relative_eq!(encoder_count::<f64, _>(&enc), PI);
    }

    #[test]
    fn test_sign_flip_past_half_revolution() {
        let cpr = 4096_u32;
        let half = f64::from(cpr / 2);
        let enc = channel(cpr, cpr / 2 + 1, 0);
        let expected = -PI * (half - 1.0) / half;
        assert_relative_eq!(encoder_count::<f64, _>(&enc), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_last_count_is_small_negative() {
        let enc = channel(2000, 1999, 0);
        assert_relative_eq!(encoder_count::<f64, _>(&enc), -2.0 * PI / 2000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_count_f32() {
        let enc = channel(4096, 3072, 0);
        let angle: f32 = encoder_count(&enc);
        assert!((angle + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_rate_scaling() {
        let enc = channel(4096, 0, 1024);
        assert_relative_eq!(encoder_rate::<f64, _>(&enc), PI / 2.0);

        let enc = channel(4096, 0, -2048);
        assert_relative_eq!(encoder_rate::<f64, _>(&enc), -PI);
    }

    #[test]
    fn test_conversion_does_not_touch_sample() {
        let enc = channel(4096, 3000, 12);
        let before = enc.latest();
        let _: f64 = encoder_count(&enc);
        let _: f64 = encoder_rate(&enc);
        assert_eq!(enc.latest(), before);
    }
}
