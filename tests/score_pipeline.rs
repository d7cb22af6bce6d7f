use std::collections::HashMap;

use anyhow::Context;
use pid_rs::test_engines::{
    ConstantEngine, CountingEngine, DecayEngine, DecayModel, RecordingModel,
};
use pid_rs::{
    DeterministicInference, InitialConditions, ObservedData, PidError, PriorEntry, PriorSpec,
    ScoreSettings, State, StochasticInference, Trajectory,
};
use pretty_assertions::assert_eq;
use rayon::prelude::*;

fn uniform_prior(names: &[&str], lower: f64, upper: f64) -> PriorSpec {
    names
        .iter()
        .map(|name| (name.to_string(), PriorEntry::uniform(lower, upper)))
        .collect()
}

fn x0(value: f64) -> State {
    HashMap::from([("X".to_string(), value)])
}

/// Noise free decay data for `k = 0.4`.
fn decay_data(x0s: &[f64]) -> anyhow::Result<ObservedData> {
    let truth = DecayModel::new(0.4);
    let timepoints = vec![0., 0.5, 1., 2., 4.];
    let trajectories = x0s
        .iter()
        .map(|&x0| {
            let rows: Vec<Vec<f64>> = truth
                .simulate(x0, &timepoints)
                .into_iter()
                .map(|x| vec![x])
                .collect();
            Trajectory::from_rows(timepoints.clone(), &rows)
        })
        .collect::<pid_rs::Result<Vec<_>>>()?;
    Ok(ObservedData::new(["X"], trajectories))
}

#[test]
fn rejected_proposal() -> anyhow::Result<()> {
    let mut model = RecordingModel::default();
    let engine = CountingEngine::new(ConstantEngine::new(-3.2));
    let prior: PriorSpec = [
        ("k1".to_string(), PriorEntry::new("uniform", [0., 1.])),
        ("k2".to_string(), PriorEntry::new("uniform", [0., 1.])),
    ]
    .into_iter()
    .collect();
    let mut pid = DeterministicInference::new(["k1", "k2"], &mut model, prior, engine)?;

    let data = decay_data(&[1.])?;
    let ic = InitialConditions::from(x0(1.));
    let score = pid.score(&[0.5, 2.0], &data, &ic, &ScoreSettings::default())?;
    assert_eq!(score, f64::NEG_INFINITY);
    assert_eq!(pid.engine().calls(), 0);

    let score = pid.score(&[0.5, 1.0], &data, &ic, &ScoreSettings::default())?;
    assert_eq!(score, 0.0 + (-3.2));
    assert_eq!(pid.engine().calls(), 1);
    Ok(())
}

#[test]
fn initial_condition_mismatch() -> anyhow::Result<()> {
    let mut model = DecayModel::new(1.);
    let engine = CountingEngine::new(DecayEngine::new(0.));
    let mut pid =
        DeterministicInference::new(["k"], &mut model, uniform_prior(&["k"], 0., 10.), engine)?;

    let data = decay_data(&[1., 2., 3., 4., 5.])?;
    let ic = InitialConditions::from(vec![x0(1.), x0(2.), x0(3.)]);
    let err = pid
        .score(&[0.4], &data, &ic, &ScoreSettings::default())
        .unwrap_err();
    assert!(matches!(err, PidError::DataShape(_)));
    assert_eq!(pid.engine().calls(), 0);

    let ic = InitialConditions::from(vec![x0(1.), x0(2.), x0(3.), x0(4.), x0(5.)]);
    let score = pid.score(&[0.4], &data, &ic, &ScoreSettings::default())?;
    assert!(score.abs() < 1e-20);
    Ok(())
}

#[test]
fn malformed_gaussian_prior() {
    let mut model = DecayModel::new(1.);
    let prior: PriorSpec = [("k".to_string(), PriorEntry::new("gaussian", [0.4, 0.1]))]
        .into_iter()
        .collect();
    let result = DeterministicInference::new(
        ["k"],
        &mut model,
        prior,
        CountingEngine::new(DecayEngine::new(0.)),
    );
    assert!(matches!(result, Err(PidError::Configuration(_))));
}

#[test]
fn deterministic_decay() -> anyhow::Result<()> {
    let mut model = DecayModel::new(1.);
    let mut pid = DeterministicInference::new(
        ["k"],
        &mut model,
        uniform_prior(&["k"], 0., 10.),
        DecayEngine::new(0.),
    )?;

    let data = decay_data(&[1., 3.])?;
    let ic = InitialConditions::from(vec![x0(1.), x0(3.)]);
    let settings = ScoreSettings::default();

    let at_truth = pid.score(&[0.4], &data, &ic, &settings)?;
    let near = pid.score(&[0.5], &data, &ic, &settings)?;
    let far = pid.score(&[2.0], &data, &ic, &settings)?;
    assert!(at_truth > near);
    assert!(near > far);

    let first = pid.score(&[0.7], &data, &ic, &settings)?;
    let second = pid.score(&[0.7], &data, &ic, &settings)?;
    assert_eq!(first.to_bits(), second.to_bits());

    // the model keeps the last binding
    assert_eq!(pid.model().k, 0.7);
    Ok(())
}

#[test]
fn diverging_simulation() -> anyhow::Result<()> {
    let mut model = DecayModel::new(1.);
    let mut pid = DeterministicInference::new(
        ["k"],
        &mut model,
        uniform_prior(&["k"], -1e6, 10.),
        DecayEngine::new(0.),
    )?;
    let data = decay_data(&[1.])?;
    let ic = InitialConditions::from(x0(1.));
    let score = pid.score(&[-1e5], &data, &ic, &ScoreSettings::default())?;
    assert_eq!(score, f64::NEG_INFINITY);
    Ok(())
}

#[test]
fn missing_measurement_is_refused() -> anyhow::Result<()> {
    let mut model = DecayModel::new(1.);
    let mut pid = DeterministicInference::new(
        ["k"],
        &mut model,
        uniform_prior(&["k"], 0., 10.),
        DecayEngine::new(0.),
    )?;
    let trajectory = Trajectory::from_rows(vec![0., 1.], &[vec![1.], vec![0.5]])?;
    let data = ObservedData::new(["Y"], vec![trajectory]);
    let ic = InitialConditions::from(x0(1.));
    let err = pid
        .score(&[0.4], &data, &ic, &ScoreSettings::default())
        .unwrap_err();
    assert!(matches!(err, PidError::Engine(_)));
    Ok(())
}

#[test]
fn stochastic_decay_is_reproducible() -> anyhow::Result<()> {
    let mut model = DecayModel::new(1.);
    let mut pid = StochasticInference::new(
        ["k"],
        &mut model,
        uniform_prior(&["k"], 0., 10.),
        DecayEngine::new(0.05),
    )?;
    let data = decay_data(&[1., 1., 1., 1.])?;
    let ic = InitialConditions::from(x0(1.));
    let settings = ScoreSettings {
        n_simulations: Some(10),
        seed: 42,
        ..Default::default()
    };

    let first = pid.score(&[0.4], &data, &ic, &settings)?;
    let second = pid.score(&[0.4], &data, &ic, &settings)?;
    assert_eq!(first.to_bits(), second.to_bits());
    assert!(first.is_finite());
    assert!(first < 0.);

    let other_seed = ScoreSettings { seed: 43, ..settings };
    let third = pid.score(&[0.4], &data, &ic, &other_seed)?;
    assert!(third != first);

    let far = pid.score(&[3.], &data, &ic, &settings)?;
    assert!(far < first);
    Ok(())
}

#[test]
fn parallel_chains_with_own_models() -> anyhow::Result<()> {
    let data = decay_data(&[1., 2.])?;
    let ic = InitialConditions::from(vec![x0(1.), x0(2.)]);
    let proposals = vec![0.1, 0.4, 0.9, 20., 2.5, 0.4];

    let scores = proposals
        .par_iter()
        .map(|&k| {
            let mut model = DecayModel::new(1.);
            let mut pid = DeterministicInference::new(
                ["k"],
                &mut model,
                uniform_prior(&["k"], 0., 10.),
                DecayEngine::new(0.),
            )?;
            pid.score(&[k], &data, &ic, &ScoreSettings::default())
        })
        .collect::<pid_rs::Result<Vec<f64>>>()
        .context("parallel scoring failed")?;

    assert_eq!(scores[3], f64::NEG_INFINITY);
    assert_eq!(scores[1].to_bits(), scores[5].to_bits());
    assert!(scores[1] > scores[0]);
    assert!(scores[1] > scores[2]);
    Ok(())
}
