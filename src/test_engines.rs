//! Models and likelihood back ends for tests and benchmarks.

use std::collections::{HashMap, HashSet};

use rand_distr::{Distribution, Normal};
use thiserror::Error;

use crate::likelihood::{Evaluation, LikelihoodEngine, LikelihoodError, LikelihoodRequest};
use crate::model::{Model, ModelError};
use crate::params::NamedParams;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TestEngineError {
    #[error("Simulation diverged")]
    Diverged,
    #[error("Could not construct likelihood: {0}")]
    Construction(String),
}

impl LikelihoodError for TestEngineError {
    fn is_recoverable(&self) -> bool {
        matches!(self, TestEngineError::Diverged)
    }
}

/// Model that stores whatever parameters are bound to it.
#[derive(Debug, Default, Clone)]
pub struct RecordingModel {
    values: HashMap<String, f64>,
    known: Option<HashSet<String>>,
    bindings: usize,
}

impl RecordingModel {
    /// A model that rejects parameters not in `known`.
    pub fn with_known<S: Into<String>>(known: impl IntoIterator<Item = S>) -> Self {
        Self {
            known: Some(known.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// How often parameters were bound.
    pub fn bindings(&self) -> usize {
        self.bindings
    }
}

impl Model for RecordingModel {
    fn set_params(&mut self, params: &NamedParams) -> Result<(), ModelError> {
        if let Some(known) = &self.known {
            if let Some(name) = params.names().find(|name| !known.contains(*name)) {
                return Err(ModelError::UnknownParameter(name.to_string()));
            }
        }
        self.values
            .extend(params.iter().map(|(name, value)| (name.to_string(), value)));
        self.bindings += 1;
        Ok(())
    }
}

/// Returns the same log-likelihood for every request.
#[derive(Debug, Clone, Copy)]
pub struct ConstantEngine {
    value: f64,
}

impl ConstantEngine {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl<M: Model + ?Sized> LikelihoodEngine<M> for ConstantEngine {
    type Error = TestEngineError;

    fn log_likelihood(
        &mut self,
        _model: &M,
        _request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error> {
        Ok(self.value)
    }
}

/// Fails every request with the same error.
#[derive(Debug, Clone)]
pub struct FailingEngine {
    error: TestEngineError,
}

impl FailingEngine {
    pub fn new(error: TestEngineError) -> Self {
        Self { error }
    }
}

impl<M: Model + ?Sized> LikelihoodEngine<M> for FailingEngine {
    type Error = TestEngineError;

    fn log_likelihood(
        &mut self,
        _model: &M,
        _request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error> {
        Err(self.error.clone())
    }
}

/// Counts the requests that reach the wrapped engine.
#[derive(Debug)]
pub struct CountingEngine<E> {
    inner: E,
    calls: usize,
    last_request: Option<(u32, Evaluation, usize)>,
}

impl<E> CountingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: 0,
            last_request: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Norm order, evaluation and number of trajectories of the last request.
    pub fn last_request(&self) -> Option<(u32, Evaluation, usize)> {
        self.last_request
    }
}

impl<M: Model + ?Sized, E: LikelihoodEngine<M>> LikelihoodEngine<M> for CountingEngine<E> {
    type Error = E::Error;

    fn log_likelihood(
        &mut self,
        model: &M,
        request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error> {
        self.calls += 1;
        self.last_request = Some((request.norm_order, request.evaluation, request.data.len()));
        self.inner.log_likelihood(model, request)
    }
}

/// Exponential decay `X(t) = X(0) * exp(-k * t)`.
#[derive(Debug, Clone, Copy)]
pub struct DecayModel {
    pub k: f64,
}

impl DecayModel {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn simulate(&self, x0: f64, timepoints: &[f64]) -> Vec<f64> {
        timepoints.iter().map(|t| x0 * (-self.k * t).exp()).collect()
    }
}

impl Model for DecayModel {
    fn set_params(&mut self, params: &NamedParams) -> Result<(), ModelError> {
        for (name, value) in params.iter() {
            match name {
                "k" => self.k = value,
                _ => return Err(ModelError::UnknownParameter(name.to_string())),
            }
        }
        Ok(())
    }
}

/// Compares the `X` measurement with simulations of a [`DecayModel`].
///
/// The deterministic log-likelihood is `-sum |residual|^p`. Stochastic
/// requests add gaussian noise with standard deviation `noise` to every
/// replicate and average the deterministic score over replicates.
#[derive(Debug, Clone, Copy)]
pub struct DecayEngine {
    pub noise: f64,
}

impl DecayEngine {
    pub fn new(noise: f64) -> Self {
        Self { noise }
    }
}

impl LikelihoodEngine<DecayModel> for DecayEngine {
    type Error = TestEngineError;

    fn log_likelihood(
        &mut self,
        model: &DecayModel,
        request: &LikelihoodRequest<'_>,
    ) -> Result<f64, Self::Error> {
        let data = request.data;
        let Some(column) = data.measurements().iter().position(|m| m == "X") else {
            return Err(TestEngineError::Construction(
                "measurement `X` not in data".to_string(),
            ));
        };
        let noise = Normal::new(0., self.noise)
            .map_err(|err| TestEngineError::Construction(err.to_string()))?;
        let mut rng = request.rng();
        let replicates = match request.evaluation {
            Evaluation::Deterministic => 1,
            Evaluation::Stochastic { n_simulations, .. } => n_simulations,
        };
        let p = request.norm_order as i32;

        let mut total = 0f64;
        for (idx, trajectory) in data.trajectories().iter().enumerate() {
            let Some(&x0) = request.initial_conditions.get(idx).and_then(|s| s.get("X")) else {
                return Err(TestEngineError::Construction(format!(
                    "no initial condition for `X` in trajectory {}",
                    idx
                )));
            };
            let predicted = model.simulate(x0, trajectory.timepoints());
            if predicted.iter().any(|x| !x.is_finite()) {
                return Err(TestEngineError::Diverged);
            }
            for _ in 0..replicates {
                for (row, &x) in predicted.iter().enumerate() {
                    let sim = match rng.as_mut() {
                        Some(rng) => x + noise.sample(rng),
                        None => x,
                    };
                    let residual = trajectory.values()[(row, column)] - sim;
                    total -= residual.abs().powi(p);
                }
            }
        }
        Ok(total / replicates as f64)
    }
}
