//! Built-in parameter identification interfaces.
//!
//! Both variants are a [`PidInterface`] with a different [`InferenceKind`].
//! New kinds of inference only need a new [`LikelihoodEngine`]; the
//! scoring pipeline itself does not change.

use crate::{
    error::Result,
    interface::{InferenceKind, PidInterface},
    likelihood::LikelihoodEngine,
    model::Model,
    prior::PriorSpec,
};

/// Inference from deterministic simulations.
///
/// Each trajectory is compared with one simulation from its initial
/// condition. Use this for ODE models and data with one (possibly averaged)
/// trajectory per condition.
pub struct DeterministicInference;

impl DeterministicInference {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<'model, M, E, S>(
        params_to_estimate: impl IntoIterator<Item = S>,
        model: &'model mut M,
        prior: PriorSpec,
        engine: E,
    ) -> Result<PidInterface<'model, M, E>>
    where
        M: Model + ?Sized,
        E: LikelihoodEngine<M>,
        S: Into<String>,
    {
        PidInterface::new(
            params_to_estimate,
            model,
            prior,
            engine,
            InferenceKind::Deterministic,
        )
    }
}

/// Inference from an ensemble of stochastic trajectories.
///
/// The observed trajectories are compared with the distribution of
/// `n_simulations` simulated replicates per initial condition (see
/// [`ScoreSettings`](crate::ScoreSettings)). More replicates lower the
/// variance of the likelihood estimate at a higher cost.
pub struct StochasticInference;

impl StochasticInference {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<'model, M, E, S>(
        params_to_estimate: impl IntoIterator<Item = S>,
        model: &'model mut M,
        prior: PriorSpec,
        engine: E,
    ) -> Result<PidInterface<'model, M, E>>
    where
        M: Model + ?Sized,
        E: LikelihoodEngine<M>,
        S: Into<String>,
    {
        PidInterface::new(
            params_to_estimate,
            model,
            prior,
            engine,
            InferenceKind::Stochastic,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::{data, state};
    use crate::interface::ScoreSettings;
    use crate::likelihood::Evaluation;
    use crate::prior::PriorEntry;
    use crate::test_engines::{ConstantEngine, CountingEngine, RecordingModel};
    use crate::PidError;
    use pretty_assertions::assert_eq;

    fn prior() -> PriorSpec {
        [
            ("k1".to_string(), PriorEntry::uniform(0., 1.)),
            ("k2".to_string(), PriorEntry::gaussian(1., 0.5, 0.05)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn deterministic_kind() {
        let mut model = RecordingModel::default();
        let engine = CountingEngine::new(ConstantEngine::new(-2.));
        let mut pid =
            DeterministicInference::new(["k1", "k2"], &mut model, prior(), engine).unwrap();
        assert_eq!(pid.kind(), InferenceKind::Deterministic);
        assert_eq!(pid.dim(), 2);

        let ic = state(&[("X", 1.)]).into();
        let score = pid
            .score(&[0.5, 1.2], &data(3), &ic, &ScoreSettings::default())
            .unwrap();
        assert_eq!(score, -2.);
        assert_eq!(
            pid.engine().last_request(),
            Some((2, Evaluation::Deterministic, 3))
        );
    }

    #[test]
    fn stochastic_kind() {
        let mut model = RecordingModel::default();
        let engine = CountingEngine::new(ConstantEngine::new(-2.));
        let mut pid = StochasticInference::new(["k1", "k2"], &mut model, prior(), engine).unwrap();
        assert_eq!(pid.kind(), InferenceKind::Stochastic);

        let ic = state(&[("X", 1.)]).into();
        let settings = ScoreSettings {
            n_simulations: Some(20),
            ..Default::default()
        };
        pid.score(&[0.5, 1.2], &data(3), &ic, &settings).unwrap();
        assert_eq!(
            pid.engine().last_request(),
            Some((2, Evaluation::Stochastic { n_simulations: 20, seed: 0 }, 3))
        );

        let settings = ScoreSettings {
            n_simulations: Some(0),
            ..Default::default()
        };
        let err = pid.score(&[0.5, 1.2], &data(3), &ic, &settings).unwrap_err();
        assert!(matches!(err, PidError::Configuration(_)));
        assert_eq!(pid.engine().calls(), 1);
    }

    #[test]
    fn gaussian_rejection() {
        let mut model = RecordingModel::default();
        let engine = CountingEngine::new(ConstantEngine::new(-2.));
        let mut pid = StochasticInference::new(["k1", "k2"], &mut model, prior(), engine).unwrap();
        let ic = state(&[("X", 1.)]).into();
        let score = pid
            .score(&[0.5, 5.], &data(3), &ic, &ScoreSettings::default())
            .unwrap();
        assert_eq!(score, f64::NEG_INFINITY);
        assert_eq!(pid.engine().calls(), 0);
    }
}
