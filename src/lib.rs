//! Score parameter proposals of dynamical system models.
//!
//! A [`PidInterface`] turns a flat parameter vector proposed by a sampler or
//! optimizer into an unnormalized log-posterior: the proposal is checked
//! against the prior, bound onto the [`Model`] and scored by a
//! [`LikelihoodEngine`]. The result is always a finite number or `-inf`.

pub(crate) mod data;
pub(crate) mod error;
pub(crate) mod inference;
pub(crate) mod interface;
pub(crate) mod likelihood;
pub(crate) mod math;
pub(crate) mod model;
pub(crate) mod params;
pub mod prior;
pub mod test_engines;

pub use data::{InitialConditions, ObservedData, State, Trajectory};
pub use error::{PidError, Result};
pub use inference::{DeterministicInference, StochasticInference};
pub use interface::{
    InferenceKind, PidInterface, ScoreSettings, DEFAULT_NORM_ORDER, DEFAULT_N_SIMULATIONS,
};
pub use likelihood::{Evaluation, LikelihoodEngine, LikelihoodError, LikelihoodRequest};
pub use model::{Model, ModelError};
pub use params::NamedParams;
pub use prior::{
    gaussian_log_prior, total_log_prior, uniform_log_prior, PriorEntry, PriorFamily,
    PriorRegistry, PriorSpec,
};
