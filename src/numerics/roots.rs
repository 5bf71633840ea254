//! Bounded Newton-Raphson root finding
//!
//! The target function is any closure returning `(f(x), f'(x))`, so the
//! solver knows nothing about the geometry it is applied to. Steps that
//! would leave the bracket, or that fail to halve over two iterations, fall
//! back to bisection of the remaining bracket. Only a plain Newton step can
//! terminate the iteration as converged.

use crate::utility::clamp;

/// Outcome of a root search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootEstimate {
    /// Best estimate, always inside the search bounds
    pub root: f64,
    /// Function evaluations performed
    pub iterations: usize,
    /// False if the iteration budget ran out or the search stalled
    pub converged: bool,
}

/// Find a root of `f` in `[min, max]` starting from `guess`
///
/// A non-finite `guess` is replaced by the middle of the bounds.
/// Iteration stops once a Newton step is no larger than
/// `2^(1 - digits) * max(|x|, 1)`, or after `max_iterations` evaluations.
pub fn newton_raphson_iterate<F>(
    mut f: F,
    guess: f64,
    min: f64,
    max: f64,
    digits: u32,
    max_iterations: usize,
) -> RootEstimate
where
    F: FnMut(f64) -> (f64, f64),
{
    let factor = 2.0_f64.powi(1 - digits as i32);
    let guess = if guess.is_finite() { guess } else { 0.5 * (min + max) };
    let mut x = clamp(guess, min, max);
    let (mut lo, mut hi) = (min, max);

    // Last two step sizes; start wide so the first step is never rejected
    let mut delta = max - min;
    let mut delta1 = delta;

    for iteration in 1..=max_iterations {
        let delta2 = delta1;
        delta1 = delta;

        let (f0, f1) = f(x);
        if f0 == 0.0 {
            return RootEstimate {
                root: x,
                iterations: iteration,
                converged: true,
            };
        }
        if !f0.is_finite() {
            return RootEstimate {
                root: x,
                iterations: iteration,
                converged: false,
            };
        }

        let newton_delta = f0 / f1;
        let mut newton = f1 != 0.0 && newton_delta.is_finite();
        delta = if newton {
            newton_delta
        } else {
            x - 0.5 * (lo + hi)
        };

        // Not halving: bisect what is left of the bracket on the step's side
        if (delta * 2.0).abs() > delta2.abs() {
            newton = false;
            delta = if delta > 0.0 {
                0.5 * (x - lo)
            } else {
                0.5 * (x - hi)
            };
            delta1 = 3.0 * delta;
        }

        let previous = x;
        x -= delta;
        if x <= lo {
            newton = false;
            delta = 0.5 * (previous - lo);
            x = previous - delta;
        } else if x >= hi {
            newton = false;
            delta = 0.5 * (previous - hi);
            x = previous - delta;
        }

        if x == previous {
            // Pinned against a bound without a sign change
            return RootEstimate {
                root: x,
                iterations: iteration,
                converged: false,
            };
        }

        if delta > 0.0 {
            hi = previous;
        } else {
            lo = previous;
        }

        if newton && delta.abs() <= factor * x.abs().max(1.0) {
            return RootEstimate {
                root: x,
                iterations: iteration,
                converged: true,
            };
        }
    }

    RootEstimate {
        root: x,
        iterations: max_iterations,
        converged: false,
    }
}
