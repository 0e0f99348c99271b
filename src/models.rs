//! Model interfaces for the extended filter.
//!
//! The extended filter cannot take fixed matrices; its transition and
//! observation maps are nonlinear and must be re-linearized at every step.
//! Model authors implement one of the trait pairs below: the plain variants
//! for models that depend only on state (and control), the `Timed` variants
//! for models that also depend on elapsed time (e.g. a sinusoid whose phase
//! advances with `t`). The two capabilities are selected at construction via
//! [`Transition`] / [`Observation`], so there is no optional-argument
//! handling at the call site.

use std::fmt;

use nalgebra::{DMatrix, DVector};

/// Nonlinear state transition `x' = f(x, u)` with its Jacobian `F = ∂f/∂x`.
pub trait TransitionModel {
    /// Propagate the state one step forward.
    fn evaluate(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of the transition, evaluated at `x`.
    fn jacobian(&self, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64>;
}

/// Time-varying state transition `x' = f(x, u, t)`.
pub trait TimedTransitionModel {
    fn evaluate(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DVector<f64>;
    fn jacobian(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DMatrix<f64>;
}

/// Nonlinear observation `z' = h(x)` with its Jacobian `H = ∂h/∂x`.
pub trait ObservationModel {
    /// Project a state into measurement space.
    fn evaluate(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of the observation, evaluated at `x`.
    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64>;
}

/// Time-varying observation `z' = h(x, t)`.
pub trait TimedObservationModel {
    fn evaluate(&self, x: &DVector<f64>, t: f64) -> DVector<f64>;
    fn jacobian(&self, x: &DVector<f64>, t: f64) -> DMatrix<f64>;
}

/// Transition capability held by an extended filter.
///
/// Models are `Send` so that independent filter instances can be moved to
/// and run on separate threads.
pub enum Transition {
    Static(Box<dyn TransitionModel + Send>),
    TimeVarying(Box<dyn TimedTransitionModel + Send>),
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Static(_) => f.write_str("Transition::Static"),
            Transition::TimeVarying(_) => f.write_str("Transition::TimeVarying"),
        }
    }
}

impl Transition {
    pub(crate) fn is_time_varying(&self) -> bool {
        matches!(self, Transition::TimeVarying(_))
    }

    /// `t` is only forwarded to time-varying models; static models never
    /// see it. Callers validate the time argument before dispatching.
    pub(crate) fn evaluate(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DVector<f64> {
        match self {
            Transition::Static(model) => model.evaluate(x, u),
            Transition::TimeVarying(model) => model.evaluate(x, u, t),
        }
    }

    pub(crate) fn jacobian(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DMatrix<f64> {
        match self {
            Transition::Static(model) => model.jacobian(x, u),
            Transition::TimeVarying(model) => model.jacobian(x, u, t),
        }
    }
}

/// Observation capability held by an extended filter.
pub enum Observation {
    Static(Box<dyn ObservationModel + Send>),
    TimeVarying(Box<dyn TimedObservationModel + Send>),
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Static(_) => f.write_str("Observation::Static"),
            Observation::TimeVarying(_) => f.write_str("Observation::TimeVarying"),
        }
    }
}

impl Observation {
    pub(crate) fn is_time_varying(&self) -> bool {
        matches!(self, Observation::TimeVarying(_))
    }

    pub(crate) fn evaluate(&self, x: &DVector<f64>, t: f64) -> DVector<f64> {
        match self {
            Observation::Static(model) => model.evaluate(x),
            Observation::TimeVarying(model) => model.evaluate(x, t),
        }
    }

    pub(crate) fn jacobian(&self, x: &DVector<f64>, t: f64) -> DMatrix<f64> {
        match self {
            Observation::Static(model) => model.jacobian(x),
            Observation::TimeVarying(model) => model.jacobian(x, t),
        }
    }
}

/// Adapter implementing [`TransitionModel`] from a pair of closures.
pub struct FnTransition<F, J> {
    evaluate: F,
    jacobian: J,
}

impl<F, J> FnTransition<F, J>
where
    F: Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> DMatrix<f64>,
{
    pub fn new(evaluate: F, jacobian: J) -> Self {
        Self { evaluate, jacobian }
    }
}

impl<F, J> TransitionModel for FnTransition<F, J>
where
    F: Fn(&DVector<f64>, &DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> DMatrix<f64>,
{
    fn evaluate(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        (self.evaluate)(x, u)
    }

    fn jacobian(&self, x: &DVector<f64>, u: &DVector<f64>) -> DMatrix<f64> {
        (self.jacobian)(x, u)
    }
}

/// Adapter implementing [`TimedTransitionModel`] from a pair of closures.
pub struct FnTimedTransition<F, J> {
    evaluate: F,
    jacobian: J,
}

impl<F, J> FnTimedTransition<F, J>
where
    F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64>,
    J: Fn(&DVector<f64>, &DVector<f64>, f64) -> DMatrix<f64>,
{
    pub fn new(evaluate: F, jacobian: J) -> Self {
        Self { evaluate, jacobian }
    }
}

impl<F, J> TimedTransitionModel for FnTimedTransition<F, J>
where
    F: Fn(&DVector<f64>, &DVector<f64>, f64) -> DVector<f64>,
    J: Fn(&DVector<f64>, &DVector<f64>, f64) -> DMatrix<f64>,
{
    fn evaluate(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DVector<f64> {
        (self.evaluate)(x, u, t)
    }

    fn jacobian(&self, x: &DVector<f64>, u: &DVector<f64>, t: f64) -> DMatrix<f64> {
        (self.jacobian)(x, u, t)
    }
}

/// Adapter implementing [`ObservationModel`] from a pair of closures.
pub struct FnObservation<F, J> {
    evaluate: F,
    jacobian: J,
}

impl<F, J> FnObservation<F, J>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    pub fn new(evaluate: F, jacobian: J) -> Self {
        Self { evaluate, jacobian }
    }
}

impl<F, J> ObservationModel for FnObservation<F, J>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    fn evaluate(&self, x: &DVector<f64>) -> DVector<f64> {
        (self.evaluate)(x)
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        (self.jacobian)(x)
    }
}

/// Adapter implementing [`TimedObservationModel`] from a pair of closures.
pub struct FnTimedObservation<F, J> {
    evaluate: F,
    jacobian: J,
}

impl<F, J> FnTimedObservation<F, J>
where
    F: Fn(&DVector<f64>, f64) -> DVector<f64>,
    J: Fn(&DVector<f64>, f64) -> DMatrix<f64>,
{
    pub fn new(evaluate: F, jacobian: J) -> Self {
        Self { evaluate, jacobian }
    }
}

impl<F, J> TimedObservationModel for FnTimedObservation<F, J>
where
    F: Fn(&DVector<f64>, f64) -> DVector<f64>,
    J: Fn(&DVector<f64>, f64) -> DMatrix<f64>,
{
    fn evaluate(&self, x: &DVector<f64>, t: f64) -> DVector<f64> {
        (self.evaluate)(x, t)
    }

    fn jacobian(&self, x: &DVector<f64>, t: f64) -> DMatrix<f64> {
        (self.jacobian)(x, t)
    }
}
