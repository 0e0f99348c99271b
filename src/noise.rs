//! Gaussian noise synthesis for demo and test measurements.

use rand::Rng;

/// Draw one sample from `N(mean, variance)` via the Box-Muller transform.
///
/// Used to fabricate noisy sensor readings for the demo scenarios; the
/// filters themselves never generate randomness.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, variance: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let unit_normal = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + variance.sqrt() * unit_normal
}
