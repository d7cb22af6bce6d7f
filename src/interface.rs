//! Turn parameter proposals into log-posterior scores.

use tracing::{debug, trace};

use crate::{
    data::{validate_inputs, InitialConditions, ObservedData},
    error::{config_err, PidError, Result},
    likelihood::{Evaluation, LikelihoodEngine, LikelihoodError, LikelihoodRequest},
    math::log_posterior,
    model::Model,
    params::{check_unique, NamedParams},
    prior::{PriorRegistry, PriorSpec},
};

pub const DEFAULT_NORM_ORDER: u32 = 2;
pub const DEFAULT_N_SIMULATIONS: usize = 3;

/// Options of a single scoring call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSettings {
    /// Order of the norm used by the back end on the residuals.
    pub norm_order: u32,
    /// Number of stochastic replicates per initial condition. Only valid
    /// for stochastic inference, where `None` means
    /// [`DEFAULT_N_SIMULATIONS`].
    pub n_simulations: Option<usize>,
    /// Seed for the stochastic replicates.
    pub seed: u64,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            norm_order: DEFAULT_NORM_ORDER,
            n_simulations: None,
            seed: 0,
        }
    }
}

/// The kind of likelihood the back end is asked to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceKind {
    Deterministic,
    Stochastic,
}

impl InferenceKind {
    fn evaluation(&self, settings: &ScoreSettings) -> Result<Evaluation> {
        if settings.norm_order == 0 {
            return config_err("norm_order must be at least 1");
        }
        match self {
            InferenceKind::Deterministic => {
                if let Some(n) = settings.n_simulations {
                    return config_err(format!(
                        "Deterministic inference does not accept N_simulations (got {})",
                        n
                    ));
                }
                Ok(Evaluation::Deterministic)
            }
            InferenceKind::Stochastic => {
                let n_simulations = settings.n_simulations.unwrap_or(DEFAULT_N_SIMULATIONS);
                if n_simulations == 0 {
                    return config_err("N_simulations must be at least 1");
                }
                Ok(Evaluation::Stochastic {
                    n_simulations,
                    seed: settings.seed,
                })
            }
        }
    }
}

/// Parameter identification interface.
///
/// Combines the prior admissibility check with a likelihood back end into a
/// single log-posterior score for an external sampler or optimizer. The
/// interface holds an exclusive borrow of the model for its whole lifetime,
/// because every scoring call binds the proposed parameters onto it.
pub struct PidInterface<'model, M: Model + ?Sized, E: LikelihoodEngine<M>> {
    params_to_estimate: Vec<String>,
    model: &'model mut M,
    prior: PriorSpec,
    registry: PriorRegistry,
    engine: E,
    kind: InferenceKind,
}

impl<'model, M: Model + ?Sized, E: LikelihoodEngine<M>> PidInterface<'model, M, E> {
    /// Create an interface using the built-in prior families.
    ///
    /// Fails if a parameter name is repeated, or if a parameter has no valid
    /// prior entry.
    pub fn new<S: Into<String>>(
        params_to_estimate: impl IntoIterator<Item = S>,
        model: &'model mut M,
        prior: PriorSpec,
        engine: E,
        kind: InferenceKind,
    ) -> Result<Self> {
        let params_to_estimate: Vec<String> =
            params_to_estimate.into_iter().map(Into::into).collect();
        check_unique(&params_to_estimate)?;
        let registry = PriorRegistry::default();
        registry.validate(&params_to_estimate, &prior)?;
        Ok(Self {
            params_to_estimate,
            model,
            prior,
            registry,
            engine,
            kind,
        })
    }

    /// Replace the prior families, e.g. with a registry that contains
    /// additional user defined families.
    pub fn with_registry(mut self, registry: PriorRegistry) -> Result<Self> {
        registry.validate(&self.params_to_estimate, &self.prior)?;
        self.registry = registry;
        Ok(self)
    }

    pub fn params_to_estimate(&self) -> &[String] {
        &self.params_to_estimate
    }

    /// The number of parameters under estimation.
    pub fn dim(&self) -> usize {
        self.params_to_estimate.len()
    }

    pub fn prior(&self) -> &PriorSpec {
        &self.prior
    }

    pub fn kind(&self) -> InferenceKind {
        self.kind
    }

    pub fn model(&self) -> &M {
        &*self.model
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Log-prior of a proposal, `0.0` if admissible and `-inf` otherwise.
    pub fn log_prior(&self, params_values: &[f64]) -> Result<f64> {
        let named = NamedParams::zip(&self.params_to_estimate, params_values)?;
        self.registry.total_log_prior(&named, &self.prior)
    }

    /// Compute the unnormalized log-posterior of `params_values`.
    ///
    /// Returns `-inf` without running the back end if the proposal lies
    /// outside of the prior support. Recoverable back-end errors and
    /// non-finite likelihoods are also scored as `-inf`, so the result is
    /// never NaN.
    pub fn score(
        &mut self,
        params_values: &[f64],
        data: &ObservedData,
        initial_conditions: &InitialConditions,
        settings: &ScoreSettings,
    ) -> Result<f64> {
        let evaluation = self.kind.evaluation(settings)?;
        let named = NamedParams::zip(&self.params_to_estimate, params_values)?;

        let lp = self.registry.total_log_prior(&named, &self.prior)?;
        if !lp.is_finite() {
            trace!(?params_values, "Proposal rejected by prior");
            return Ok(f64::NEG_INFINITY);
        }

        validate_inputs(data, initial_conditions)?;

        if let Err(err) = self.model.set_params(&named) {
            return Err(PidError::Configuration(err.to_string()));
        }

        let request = LikelihoodRequest {
            data,
            initial_conditions,
            norm_order: settings.norm_order,
            evaluation,
        };
        match self.engine.log_likelihood(&*self.model, &request) {
            Ok(ll) => {
                let score = log_posterior(lp, ll);
                if !ll.is_finite() {
                    debug!(log_likelihood = ll, "Non-finite log-likelihood scored as -inf");
                }
                Ok(score)
            }
            Err(err) if err.is_recoverable() => {
                debug!(error = %err, "Recoverable likelihood error scored as -inf");
                Ok(f64::NEG_INFINITY)
            }
            Err(err) => Err(PidError::Engine(Box::new(err))),
        }
    }
}
