//! Track a target moving at constant velocity, measuring position only.
//!
//! 2-state filter (position, velocity) with F = [[1, dt], [0, 1]]; the
//! velocity is never observed directly and must be inferred.

use kalman_filter_rs::noise::gaussian;
use kalman_filter_rs::{LinearFilterConfig, LinearKalmanFilter};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f64 = 1.0;
const STEPS: usize = 200;
const VELOCITY: f64 = 0.1;
const MEASUREMENT_VARIANCE: f64 = 0.5;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let process_variance = 0.01 * DT;
    let mut filter = LinearKalmanFilter::new(LinearFilterConfig {
        control_model: DMatrix::from_row_slice(2, 1, &[0.0, 0.0]),
        initial_covariance: DMatrix::from_row_slice(2, 2, &[99.0, 0.0, 0.0, 99.0]),
        initial_state: DVector::from_vec(vec![0.0, 0.0]),
        measurement_covariance: DMatrix::from_row_slice(1, 1, &[MEASUREMENT_VARIANCE]),
        observation_model: DMatrix::from_row_slice(1, 2, &[1.0, 0.0]),
        process_covariance: DMatrix::from_row_slice(
            2,
            2,
            &[process_variance, 0.0, 0.0, process_variance],
        ),
        state_transition_model: DMatrix::from_row_slice(2, 2, &[1.0, DT, 0.0, 1.0]),
    })?;

    let mut rng = StdRng::seed_from_u64(1);
    let control = DVector::from_vec(vec![0.0]);

    println!("step,true_position,measured,estimated_position,estimated_velocity");
    for i in 0..STEPS {
        let true_position = VELOCITY * DT * (i + 1) as f64;
        let measured = gaussian(&mut rng, true_position, MEASUREMENT_VARIANCE);
        let z = DVector::from_vec(vec![measured]);

        let estimate = filter.step(&z, &control, None)?;
        println!(
            "{},{},{},{},{}",
            i,
            true_position,
            measured,
            estimate.state[0],
            estimate.state[1]
        );
    }

    Ok(())
}
