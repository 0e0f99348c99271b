//! Track a constant scalar voltage from noisy readings.
//!
//! Prints `step,true,measured,estimate,variance` as CSV; pipe it into your
//! plotting tool of choice.

use kalman_filter_rs::noise::gaussian;
use kalman_filter_rs::{LinearFilterConfig, LinearKalmanFilter};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

const STEPS: usize = 50;
const TRUE_VALUE: f64 = 1.3;
const MEASUREMENT_VARIANCE: f64 = 0.1;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut filter = LinearKalmanFilter::new(LinearFilterConfig {
        control_model: DMatrix::from_row_slice(1, 1, &[0.0]),
        initial_covariance: DMatrix::from_row_slice(1, 1, &[1.0]),
        initial_state: DVector::from_vec(vec![3.0]),
        measurement_covariance: DMatrix::from_row_slice(1, 1, &[0.2]),
        observation_model: DMatrix::from_row_slice(1, 1, &[1.0]),
        process_covariance: DMatrix::from_row_slice(1, 1, &[1e-5]),
        state_transition_model: DMatrix::from_row_slice(1, 1, &[1.0]),
    })?;

    let mut rng = StdRng::seed_from_u64(1);
    let control = DVector::from_vec(vec![0.0]);

    println!("step,true,measured,estimate,variance");
    for i in 0..STEPS {
        let measured = gaussian(&mut rng, TRUE_VALUE, MEASUREMENT_VARIANCE);
        let z = DVector::from_vec(vec![measured]);
        let estimate = filter.step(&z, &control, None)?;

        println!(
            "{},{},{},{},{}",
            i,
            TRUE_VALUE,
            measured,
            estimate.state[0],
            estimate.covariance[(0, 0)]
        );
    }

    Ok(())
}
