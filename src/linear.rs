//! Linear Kalman filter.
//!
//! Fixed linear state-transition and observation matrices; the baseline
//! predict/update recursion. Nonlinear systems belong in
//! [`crate::extended`].

use nalgebra::{DMatrix, DVector};

use crate::chain::multiply_chain;
use crate::error::{FilterError, Result};
use crate::Estimate;

/// Construction configuration for [`LinearKalmanFilter`].
///
/// All fields are required. The state dimension `N` is taken from the row
/// count of `initial_state`, the measurement dimension `M` from
/// `measurement_covariance`, and the control dimension `K` from the column
/// count of `control_model`; every other matrix must be consistent with
/// those.
#[derive(Debug)]
pub struct LinearFilterConfig {
    /// Control model `B` [N x K]: maps the control input into state space.
    pub control_model: DMatrix<f64>,

    /// Initial state covariance `P0` [N x N].
    pub initial_covariance: DMatrix<f64>,

    /// Initial state estimate `x0` [N x 1].
    pub initial_state: DVector<f64>,

    /// Measurement noise covariance `R` [M x M].
    pub measurement_covariance: DMatrix<f64>,

    /// Observation model `H` [M x N]: maps a state into measurement space.
    pub observation_model: DMatrix<f64>,

    /// Process noise covariance `Q` [N x N], injected each predict step.
    pub process_covariance: DMatrix<f64>,

    /// State transition model `F` [N x N].
    pub state_transition_model: DMatrix<f64>,
}

/// Linear Kalman filter over dense, real-valued matrices.
///
/// The filter owns its state estimate and covariance exclusively; each call
/// to [`LinearKalmanFilter::step`] replaces both with posterior values. It
/// is ready to step immediately after construction and remains callable
/// indefinitely.
#[derive(Debug)]
pub struct LinearKalmanFilter {
    state: DVector<f64>,
    covariance: DMatrix<f64>,

    state_transition_model: DMatrix<f64>,
    control_model: DMatrix<f64>,
    observation_model: DMatrix<f64>,
    process_covariance: DMatrix<f64>,
    measurement_covariance: DMatrix<f64>,
}

impl LinearKalmanFilter {
    /// Create a new filter, validating that every configured matrix is
    /// dimensionally consistent.
    pub fn new(config: LinearFilterConfig) -> Result<Self> {
        let n = config.initial_state.nrows();
        if n == 0 {
            return Err(FilterError::InvalidArgument(
                "initial state must have at least one row".to_string(),
            ));
        }

        let m = config.measurement_covariance.nrows();
        if config.measurement_covariance.ncols() != m {
            return Err(FilterError::shape(
                "measurement covariance",
                (m, m),
                config.measurement_covariance.shape(),
            ));
        }

        if config.initial_covariance.shape() != (n, n) {
            return Err(FilterError::shape(
                "initial covariance",
                (n, n),
                config.initial_covariance.shape(),
            ));
        }
        if config.state_transition_model.shape() != (n, n) {
            return Err(FilterError::shape(
                "state transition model",
                (n, n),
                config.state_transition_model.shape(),
            ));
        }
        if config.process_covariance.shape() != (n, n) {
            return Err(FilterError::shape(
                "process covariance",
                (n, n),
                config.process_covariance.shape(),
            ));
        }
        if config.control_model.nrows() != n {
            return Err(FilterError::shape(
                "control model",
                (n, config.control_model.ncols()),
                config.control_model.shape(),
            ));
        }
        if config.observation_model.shape() != (m, n) {
            return Err(FilterError::shape(
                "observation model",
                (m, n),
                config.observation_model.shape(),
            ));
        }

        log::debug!(
            "linear filter constructed: {} state dims, {} measurement dims, {} control dims",
            n,
            m,
            config.control_model.ncols()
        );

        Ok(Self {
            state: config.initial_state,
            covariance: config.initial_covariance,
            state_transition_model: config.state_transition_model,
            control_model: config.control_model,
            observation_model: config.observation_model,
            process_covariance: config.process_covariance,
            measurement_covariance: config.measurement_covariance,
        })
    }

    /// Advance the filter by one predict/update cycle.
    ///
    /// `process_covariance` transiently replaces the configured `Q` for this
    /// call only; the configured value is never overwritten.
    ///
    /// On error the internal state and covariance are left exactly as they
    /// were before the call.
    pub fn step(
        &mut self,
        measurement: &DVector<f64>,
        control: &DVector<f64>,
        process_covariance: Option<&DMatrix<f64>>,
    ) -> Result<Estimate> {
        let n = self.state.nrows();
        let m = self.measurement_covariance.nrows();
        let k = self.control_model.ncols();

        if measurement.nrows() != m {
            return Err(FilterError::shape(
                "measurement input",
                (m, 1),
                (measurement.nrows(), 1),
            ));
        }
        if control.nrows() != k {
            return Err(FilterError::shape("control input", (k, 1), (control.nrows(), 1)));
        }
        let q = match process_covariance {
            Some(q) => {
                if q.shape() != (n, n) {
                    return Err(FilterError::shape(
                        "process covariance override",
                        (n, n),
                        q.shape(),
                    ));
                }
                q
            }
            None => &self.process_covariance,
        };

        let f = &self.state_transition_model;
        let h = &self.observation_model;

        // Predict
        let state_priori = f * &self.state + &self.control_model * control;
        let f_t = f.transpose();
        let covariance_priori = multiply_chain(&[f, &self.covariance, &f_t])? + q;

        // Innovation and its covariance
        let innovation = measurement - h * &state_priori;
        let h_t = h.transpose();
        let innovation_covariance =
            multiply_chain(&[h, &covariance_priori, &h_t])? + &self.measurement_covariance;

        // Kalman gain
        let innovation_covariance_inv = innovation_covariance
            .clone()
            .try_inverse()
            .ok_or(FilterError::SingularInnovationCovariance)?;
        let gain = multiply_chain(&[&covariance_priori, &h_t, &innovation_covariance_inv])?;

        // Update
        let state_posteriori = &state_priori + &gain * &innovation;
        let covariance_posteriori =
            (DMatrix::<f64>::identity(n, n) - &gain * h) * &covariance_priori;

        log::trace!(
            "linear step: innovation norm {:.6e}, covariance trace {:.6e}",
            innovation.norm(),
            covariance_posteriori.trace()
        );

        self.state = state_posteriori;
        self.covariance = covariance_posteriori;

        Ok(self.estimate())
    }

    /// Current state estimate.
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    /// Current state covariance.
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Snapshot of the current estimate.
    pub fn estimate(&self) -> Estimate {
        Estimate {
            state: self.state.clone(),
            covariance: self.covariance.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_config() -> LinearFilterConfig {
        LinearFilterConfig {
            control_model: DMatrix::from_row_slice(1, 1, &[0.0]),
            initial_covariance: DMatrix::from_row_slice(1, 1, &[1.0]),
            initial_state: DVector::from_vec(vec![3.0]),
            measurement_covariance: DMatrix::from_row_slice(1, 1, &[0.2]),
            observation_model: DMatrix::from_row_slice(1, 1, &[1.0]),
            process_covariance: DMatrix::from_row_slice(1, 1, &[1e-5]),
            state_transition_model: DMatrix::from_row_slice(1, 1, &[1.0]),
        }
    }

    #[test]
    fn test_construction_fixes_dimensions() {
        let filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        assert_eq!(filter.state().nrows(), 1);
        assert_eq!(filter.covariance().shape(), (1, 1));
    }

    #[test]
    fn test_filter_is_debug_and_send() {
        fn check<T: std::fmt::Debug + Send>(_: &T) {}
        let filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        check(&filter);
    }

    #[test]
    fn test_construction_rejects_bad_transition_shape() {
        let mut config = scalar_config();
        config.state_transition_model = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let err = LinearKalmanFilter::new(config).unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_construction_rejects_bad_observation_shape() {
        let mut config = scalar_config();
        config.observation_model = DMatrix::from_row_slice(2, 1, &[1.0, 0.0]);
        let err = LinearKalmanFilter::new(config).unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_construction_rejects_nonsquare_measurement_covariance() {
        let mut config = scalar_config();
        config.measurement_covariance = DMatrix::from_row_slice(1, 2, &[0.2, 0.0]);
        let err = LinearKalmanFilter::new(config).unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_step_rejects_wrong_measurement_size() {
        let mut filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        let z = DVector::from_vec(vec![1.0, 2.0]);
        let u = DVector::from_vec(vec![0.0]);
        let err = filter.step(&z, &u, None).unwrap_err();
        assert!(matches!(err, FilterError::DimensionMismatch { .. }));
        // Failed step must not move the state.
        assert_eq!(filter.state()[0], 3.0);
    }

    #[test]
    fn test_step_moves_estimate_toward_measurement() {
        let mut filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        let z = DVector::from_vec(vec![1.3]);
        let u = DVector::from_vec(vec![0.0]);

        let estimate = filter.step(&z, &u, None).unwrap();
        assert!(estimate.state[0] < 3.0);
        assert!(estimate.state[0] > 1.3);
        // Posterior variance shrinks once a measurement arrives.
        assert!(estimate.covariance[(0, 0)] < 1.0);
    }

    #[test]
    fn test_repeated_steps_advance_the_filter() {
        let mut filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        let z = DVector::from_vec(vec![1.3]);
        let u = DVector::from_vec(vec![0.0]);

        let first = filter.step(&z, &u, None).unwrap();
        let second = filter.step(&z, &u, None).unwrap();
        // Same inputs, different internal state: the recursion is not
        // idempotent across calls.
        assert_ne!(first.state[0], second.state[0]);
    }

    #[test]
    fn test_process_covariance_override_is_transient() {
        let mut filter = LinearKalmanFilter::new(scalar_config()).unwrap();
        let z = DVector::from_vec(vec![1.3]);
        let u = DVector::from_vec(vec![0.0]);
        let big_q = DMatrix::from_row_slice(1, 1, &[10.0]);

        filter.step(&z, &u, Some(&big_q)).unwrap();
        // The configured Q must be untouched by the override.
        assert_eq!(filter.process_covariance[(0, 0)], 1e-5);

        // A later call without the override behaves as if it never happened:
        // with tiny Q the posterior variance stays small.
        let after = filter.step(&z, &u, None).unwrap();
        assert!(after.covariance[(0, 0)] < 0.2);
    }

    #[test]
    fn test_huge_measurement_noise_ignores_measurement() {
        // R -> infinity: the update step adds no information, so the
        // posterior tracks the pure prediction.
        let mut config = scalar_config();
        config.measurement_covariance = DMatrix::from_row_slice(1, 1, &[1e12]);
        let mut filter = LinearKalmanFilter::new(config).unwrap();

        let z = DVector::from_vec(vec![100.0]);
        let u = DVector::from_vec(vec![0.0]);
        let estimate = filter.step(&z, &u, None).unwrap();

        // Prediction from x0 = 3 with F = I is 3; the wild measurement is
        // effectively discarded.
        approx::assert_relative_eq!(estimate.state[0], 3.0, epsilon = 1e-6);
        // P_posteriori ~ P_priori = P0 + Q
        approx::assert_relative_eq!(estimate.covariance[(0, 0)], 1.0 + 1e-5, epsilon = 1e-6);
    }

    #[test]
    fn test_singular_innovation_covariance_leaves_state_unchanged() {
        let config = LinearFilterConfig {
            control_model: DMatrix::from_row_slice(1, 1, &[0.0]),
            initial_covariance: DMatrix::from_row_slice(1, 1, &[0.0]),
            initial_state: DVector::from_vec(vec![3.0]),
            measurement_covariance: DMatrix::from_row_slice(1, 1, &[0.0]),
            observation_model: DMatrix::from_row_slice(1, 1, &[0.0]),
            process_covariance: DMatrix::from_row_slice(1, 1, &[0.0]),
            state_transition_model: DMatrix::from_row_slice(1, 1, &[1.0]),
        };
        let mut filter = LinearKalmanFilter::new(config).unwrap();

        let z = DVector::from_vec(vec![1.0]);
        let u = DVector::from_vec(vec![0.0]);
        let err = filter.step(&z, &u, None).unwrap_err();
        assert_eq!(err, FilterError::SingularInnovationCovariance);

        assert_eq!(filter.state()[0], 3.0);
        assert_eq!(filter.covariance()[(0, 0)], 0.0);
    }

    #[test]
    fn test_covariance_stays_symmetric() {
        let config = LinearFilterConfig {
            control_model: DMatrix::from_row_slice(2, 1, &[0.0, 0.0]),
            initial_covariance: DMatrix::from_row_slice(2, 2, &[99.0, 0.0, 0.0, 99.0]),
            initial_state: DVector::from_vec(vec![0.0, 0.0]),
            measurement_covariance: DMatrix::from_row_slice(1, 1, &[10.0]),
            observation_model: DMatrix::from_row_slice(1, 2, &[1.0, 0.0]),
            process_covariance: DMatrix::from_row_slice(2, 2, &[0.01, 0.0, 0.0, 0.01]),
            state_transition_model: DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]),
        };
        let mut filter = LinearKalmanFilter::new(config).unwrap();

        let u = DVector::from_vec(vec![0.0]);
        for i in 0..20 {
            let z = DVector::from_vec(vec![0.1 * i as f64]);
            let estimate = filter.step(&z, &u, None).unwrap();

            let p = &estimate.covariance;
            let p_t = p.transpose();
            for r in 0..2 {
                for c in 0..2 {
                    let scale = p[(r, c)].abs().max(1.0);
                    assert!(
                        (p[(r, c)] - p_t[(r, c)]).abs() / scale < 1e-9,
                        "asymmetric covariance at step {}: {:?}",
                        i,
                        p
                    );
                }
            }
        }
    }
}
