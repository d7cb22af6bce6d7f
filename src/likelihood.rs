use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::data::{InitialConditions, ObservedData};
use crate::model::Model;

/// Errors that happen when a back end computes a log-likelihood
pub trait LikelihoodError: std::error::Error + Send + Sync + 'static {
    /// Recoverable errors (a diverging simulation, a non-finite residual)
    /// are scored as `-inf`. Unrecoverable errors stop the scoring call.
    fn is_recoverable(&self) -> bool;
}

/// The kind of comparison the back end should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Every trajectory is compared against a single deterministic simulation
    /// started from its initial condition.
    Deterministic,
    /// The trajectories are an ensemble of independent stochastic
    /// realizations, compared against `n_simulations` simulated replicates
    /// per initial condition.
    Stochastic { n_simulations: usize, seed: u64 },
}

/// Everything a back end needs to score a model that has its parameters bound.
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodRequest<'a> {
    pub data: &'a ObservedData,
    pub initial_conditions: &'a InitialConditions,
    /// Order of the norm used on the residuals.
    pub norm_order: u32,
    pub evaluation: Evaluation,
}

impl LikelihoodRequest<'_> {
    /// Random number generator for stochastic replicates.
    ///
    /// Equal requests produce generators with equal streams, which makes
    /// repeated scoring of the same proposal reproducible.
    pub fn rng(&self) -> Option<ChaCha8Rng> {
        match self.evaluation {
            Evaluation::Deterministic => None,
            Evaluation::Stochastic { seed, .. } => Some(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

/// A simulation back end that turns a parameterized model and observed data
/// into a log-likelihood.
pub trait LikelihoodEngine<M: Model + ?Sized> {
    type Error: LikelihoodError;

    /// Compute the log-likelihood of `request.data` under `model`.
    ///
    /// A back end that cannot be set up for the request (for example because
    /// the data does not contain a species it needs) must return an
    /// unrecoverable error.
    fn log_likelihood(
        &mut self,
        model: &M,
        request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error>;
}

impl<M: Model + ?Sized, E: LikelihoodEngine<M> + ?Sized> LikelihoodEngine<M> for &mut E {
    type Error = E::Error;

    fn log_likelihood(
        &mut self,
        model: &M,
        request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error> {
        (**self).log_likelihood(model, request)
    }
}
