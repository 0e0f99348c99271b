//! Recursive Bayesian state estimation from noisy, partial measurements.
//!
//! Two filter variants share one contract:
//!
//! - [`LinearKalmanFilter`] — fixed linear state-transition and observation
//!   matrices; the baseline predict/update recursion.
//! - [`ExtendedKalmanFilter`] — nonlinear transition/observation models plus
//!   their Jacobians (optionally time-varying), re-linearized at every step
//!   before running the same recursion.
//!
//! Both are constructed with an initial state estimate, an initial
//! covariance and model parameters, then driven by repeated `step` calls.
//! Each call consumes one measurement (plus control input), mutates the
//! filter's state and covariance in place, and returns the posterior
//! [`Estimate`].
//!
//! ```
//! use kalman_filter_rs::{LinearFilterConfig, LinearKalmanFilter};
//! use nalgebra::{DMatrix, DVector};
//!
//! // Track a constant scalar from noisy readings.
//! let mut filter = LinearKalmanFilter::new(LinearFilterConfig {
//!     control_model: DMatrix::from_row_slice(1, 1, &[0.0]),
//!     initial_covariance: DMatrix::from_row_slice(1, 1, &[1.0]),
//!     initial_state: DVector::from_vec(vec![3.0]),
//!     measurement_covariance: DMatrix::from_row_slice(1, 1, &[0.2]),
//!     observation_model: DMatrix::from_row_slice(1, 1, &[1.0]),
//!     process_covariance: DMatrix::from_row_slice(1, 1, &[1e-5]),
//!     state_transition_model: DMatrix::from_row_slice(1, 1, &[1.0]),
//! })
//! .unwrap();
//!
//! let control = DVector::from_vec(vec![0.0]);
//! let measurement = DVector::from_vec(vec![1.3]);
//! let estimate = filter.step(&measurement, &control, None).unwrap();
//! assert!(estimate.state[0] < 3.0);
//! ```

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

pub mod chain;
pub mod error;
pub mod extended;
pub mod linear;
pub mod models;
pub mod noise;

pub use chain::multiply_chain;
pub use error::{FilterError, Result};
pub use extended::{ExtendedFilterParams, ExtendedKalmanFilter};
pub use linear::{LinearFilterConfig, LinearKalmanFilter};
pub use models::{
    FnObservation, FnTimedObservation, FnTimedTransition, FnTransition, Observation,
    ObservationModel, TimedObservationModel, TimedTransitionModel, Transition, TransitionModel,
};

/// Posterior `{state, covariance}` snapshot returned by each `step`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// State estimate [N x 1]
    pub state: DVector<f64>,

    /// State covariance [N x N]
    pub covariance: DMatrix<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_round_trips_through_serde() {
        let estimate = Estimate {
            state: DVector::from_vec(vec![1.0, 2.0]),
            covariance: DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]),
        };
        let json = serde_json::to_string(&estimate).unwrap();
        let back: Estimate = serde_json::from_str(&json).unwrap();
        assert_eq!(estimate, back);
    }
}
