//! Interpolation policy for numeric column reads between samples.

/// Computes a value between two bracketing samples.
///
/// Implementations may assume `t0 <= query <= t1`. Exact matches and
/// past-the-end clamping are handled by the caller before a policy is
/// consulted.
pub trait Interpolator {
    /// Value at `query` given the samples `(t0, v0)` and `(t1, v1)`.
    fn compute(&self, query: f64, t0: f64, v0: f64, t1: f64, v1: f64) -> f64;
}

/// Straight-line interpolation between the bracketing samples. The default
/// policy when a caller supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn compute(&self, query: f64, t0: f64, v0: f64, t1: f64, v1: f64) -> f64 {
        let span = t1 - t0;
        if span <= 0.0 {
            return v0;
        }
        let scale = (query - t0) / span;
        v0 + scale * (v1 - v0)
    }
}
