//! Extended Kalman filter.
//!
//! The transition and observation maps are nonlinear, so a fixed linear
//! approximation would diverge as the estimate moves away from the point
//! where it was last linearized. The filter therefore re-evaluates both
//! Jacobians at the current state on every step and then runs the same
//! predict/update recursion as the linear filter.

use nalgebra::{DMatrix, DVector};

use crate::chain::multiply_chain;
use crate::error::{FilterError, Result};
use crate::models::{Observation, Transition};
use crate::Estimate;

/// Model bundle for [`ExtendedKalmanFilter`].
#[derive(Debug)]
pub struct ExtendedFilterParams {
    /// Measurement noise covariance `R` [M x M].
    pub measurement_covariance: DMatrix<f64>,

    /// Process noise covariance `Q` [N x N].
    pub process_covariance: DMatrix<f64>,

    /// Nonlinear state transition with its Jacobian.
    pub transition: Transition,

    /// Nonlinear observation with its Jacobian.
    pub observation: Observation,
}

/// Extended Kalman filter over dense, real-valued matrices.
///
/// `F` and `H` are derived values here, recomputed from the linearization
/// point on every step; they are never stored. Time-varying models receive
/// the `time` argument passed to [`ExtendedKalmanFilter::step`].
#[derive(Debug)]
pub struct ExtendedKalmanFilter {
    state: DVector<f64>,
    covariance: DMatrix<f64>,
    params: ExtendedFilterParams,
}

impl ExtendedKalmanFilter {
    /// Create a new filter from an initial covariance, an initial state and
    /// a model parameter bundle.
    ///
    /// Matrix-valued parameters are validated here; the shapes of the
    /// model-function outputs can only be checked per step, when the
    /// functions run.
    pub fn new(
        initial_covariance: DMatrix<f64>,
        initial_state: DVector<f64>,
        params: ExtendedFilterParams,
    ) -> Result<Self> {
        let n = initial_state.nrows();
        if n == 0 {
            return Err(FilterError::InvalidArgument(
                "initial state must have at least one row".to_string(),
            ));
        }

        let m = params.measurement_covariance.nrows();
        if params.measurement_covariance.ncols() != m {
            return Err(FilterError::shape(
                "measurement covariance",
                (m, m),
                params.measurement_covariance.shape(),
            ));
        }
        if initial_covariance.shape() != (n, n) {
            return Err(FilterError::shape(
                "initial covariance",
                (n, n),
                initial_covariance.shape(),
            ));
        }
        if params.process_covariance.shape() != (n, n) {
            return Err(FilterError::shape(
                "process covariance",
                (n, n),
                params.process_covariance.shape(),
            ));
        }

        log::debug!(
            "extended filter constructed: {} state dims, {} measurement dims, time-varying: {}",
            n,
            m,
            params.transition.is_time_varying() || params.observation.is_time_varying()
        );

        Ok(Self {
            state: initial_state,
            covariance: initial_covariance,
            params,
        })
    }

    fn is_time_varying(&self) -> bool {
        self.params.transition.is_time_varying() || self.params.observation.is_time_varying()
    }

    /// Advance the filter by one linearize/predict/update cycle.
    ///
    /// `time` is required when any configured model is time-varying and
    /// must be omitted otherwise; a mismatch fails with `InvalidArgument`
    /// rather than being silently ignored.
    ///
    /// On error the internal state and covariance are left exactly as they
    /// were before the call.
    pub fn step(
        &mut self,
        measurement: &DVector<f64>,
        control: &DVector<f64>,
        time: Option<f64>,
    ) -> Result<Estimate> {
        let n = self.state.nrows();
        let m = self.params.measurement_covariance.nrows();

        let t = match (self.is_time_varying(), time) {
            (true, Some(t)) => t,
            (true, None) => {
                return Err(FilterError::InvalidArgument(
                    "filter models are time-varying; step requires a time argument".to_string(),
                ))
            }
            (false, Some(_)) => {
                return Err(FilterError::InvalidArgument(
                    "filter models are not time-varying; step takes no time argument".to_string(),
                ))
            }
            (false, None) => 0.0,
        };

        if measurement.nrows() != m {
            return Err(FilterError::shape(
                "measurement input",
                (m, 1),
                (measurement.nrows(), 1),
            ));
        }

        // Linearize at the current state, before prediction. Both Jacobians
        // use the same linearization point.
        let transition_jacobian = self.params.transition.jacobian(&self.state, control, t);
        if transition_jacobian.shape() != (n, n) {
            return Err(FilterError::shape(
                "state transition Jacobian",
                (n, n),
                transition_jacobian.shape(),
            ));
        }
        let observation_jacobian = self.params.observation.jacobian(&self.state, t);
        if observation_jacobian.shape() != (m, n) {
            return Err(FilterError::shape(
                "observation Jacobian",
                (m, n),
                observation_jacobian.shape(),
            ));
        }

        // Predict
        let state_priori = self.params.transition.evaluate(&self.state, control, t);
        if state_priori.nrows() != n {
            return Err(FilterError::shape(
                "state transition output",
                (n, 1),
                (state_priori.nrows(), 1),
            ));
        }
        let transition_jacobian_t = transition_jacobian.transpose();
        let covariance_priori = &self.params.process_covariance
            + multiply_chain(&[
                &transition_jacobian,
                &self.covariance,
                &transition_jacobian_t,
            ])?;

        // Innovation and its covariance
        let predicted_measurement = self.params.observation.evaluate(&state_priori, t);
        if predicted_measurement.nrows() != m {
            return Err(FilterError::shape(
                "observation output",
                (m, 1),
                (predicted_measurement.nrows(), 1),
            ));
        }
        let innovation = measurement - predicted_measurement;
        let observation_jacobian_t = observation_jacobian.transpose();
        let innovation_covariance = &self.params.measurement_covariance
            + multiply_chain(&[
                &observation_jacobian,
                &covariance_priori,
                &observation_jacobian_t,
            ])?;

        // Kalman gain
        let innovation_covariance_inv = innovation_covariance
            .clone()
            .try_inverse()
            .ok_or(FilterError::SingularInnovationCovariance)?;
        let gain = multiply_chain(&[
            &covariance_priori,
            &observation_jacobian_t,
            &innovation_covariance_inv,
        ])?;

        // Update
        let state_posteriori = &state_priori + &gain * &innovation;
        let covariance_posteriori =
            (DMatrix::<f64>::identity(n, n) - &gain * &observation_jacobian) * &covariance_priori;

        log::trace!(
            "extended step: innovation norm {:.6e}, covariance trace {:.6e}",
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
