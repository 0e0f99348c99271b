//! Fit the amplitude, frequency and phase of a sinusoid with the extended
//! filter.
//!
//! State: (amplitude, frequency, phase, elapsed time). The signal is
//! observed through `amplitude * sin(phase + frequency * t)`, and the time
//! component rides along in the state with a near-exact pseudo-measurement
//! pinning it.

use kalman_filter_rs::models::{Observation, ObservationModel, Transition, TransitionModel};
use kalman_filter_rs::noise::gaussian;
use kalman_filter_rs::{ExtendedFilterParams, ExtendedKalmanFilter};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f64 = 1.0;
const STEPS: usize = 1000;
const MAGNITUDE: f64 = 10.0;
const MEASUREMENT_VARIANCE: f64 = 1.0;

/// Named view over the 4-dimensional sinusoid state vector.
struct SinusoidState {
    amplitude: f64,
    frequency: f64,
    phase: f64,
    elapsed: f64,
}

impl SinusoidState {
    fn from_vector(x: &DVector<f64>) -> Self {
        Self {
            amplitude: x[0],
            frequency: x[1],
            phase: x[2],
            elapsed: x[3],
        }
    }
}

/// Parameters are constant; only elapsed time advances.
struct SinusoidTransition;

impl TransitionModel for SinusoidTransition {
    fn evaluate(&self, x: &DVector<f64>, _u: &DVector<f64>) -> DVector<f64> {
        let s = SinusoidState::from_vector(x);
        DVector::from_vec(vec![s.amplitude, s.frequency, s.phase, s.elapsed + DT])
    }

    fn jacobian(&self, _x: &DVector<f64>, _u: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::identity(4, 4)
    }
}

struct SinusoidObservation;

impl ObservationModel for SinusoidObservation {
    fn evaluate(&self, x: &DVector<f64>) -> DVector<f64> {
        let s = SinusoidState::from_vector(x);
        DVector::from_vec(vec![
            s.amplitude * (s.phase + s.frequency * s.elapsed).sin(),
            s.elapsed,
        ])
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        let s = SinusoidState::from_vector(x);
        let arg = s.phase + s.frequency * s.elapsed;
        DMatrix::from_row_slice(
            2,
            4,
            &[
                arg.sin(),
                s.amplitude * s.elapsed * arg.cos(),
                s.amplitude * arg.cos(),
                s.amplitude * s.frequency * arg.cos(),
                0.0,
                0.0,
                0.0,
                1.0,
            ],
        )
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let period = DT * STEPS as f64 / 3.0;
    let true_frequency = 2.0 * std::f64::consts::PI / period;

    // Parameters start wildly uncertain; elapsed time is known exactly.
    let mut initial_covariance = DMatrix::<f64>::identity(4, 4) * 1e12;
    initial_covariance[(3, 3)] = 0.0;

    let mut filter = ExtendedKalmanFilter::new(
        initial_covariance,
        DVector::from_vec(vec![5.0, true_frequency * 0.8, 0.1, 0.0]),
        ExtendedFilterParams {
            measurement_covariance: DMatrix::from_row_slice(
                2,
                2,
                &[MEASUREMENT_VARIANCE, 0.0, 0.0, 1e-12],
            ),
            process_covariance: DMatrix::zeros(4, 4),
            transition: Transition::Static(Box::new(SinusoidTransition)),
            observation: Observation::Static(Box::new(SinusoidObservation)),
        },
    )?;

    let mut rng = StdRng::seed_from_u64(1);
    let control = DVector::zeros(1);

    println!("step,true,measured,reconstructed,amplitude,frequency,phase");
    for i in 0..STEPS {
        let t = DT * (i + 1) as f64;
        let truth = MAGNITUDE * (true_frequency * t).sin();
        let measured = gaussian(&mut rng, truth, MEASUREMENT_VARIANCE);
        let z = DVector::from_vec(vec![measured, t]);

        let estimate = filter.step(&z, &control, None)?;
        let s = SinusoidState::from_vector(&estimate.state);
        let reconstructed = s.amplitude * (s.phase + s.frequency * s.elapsed).sin();

        println!(
            "{},{},{},{},{},{},{}",
            i, truth, measured, reconstructed, s.amplitude, s.frequency, s.phase
        );
    }

    Ok(())
}
