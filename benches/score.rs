use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pid_rs::test_engines::{DecayEngine, DecayModel};
use pid_rs::{
    DeterministicInference, InitialConditions, ObservedData, PriorEntry, PriorSpec, ScoreSettings,
    StochasticInference, Trajectory,
};

fn make_data(num_trajectories: usize, num_timepoints: usize) -> ObservedData {
    let truth = DecayModel::new(0.4);
    let timepoints: Vec<f64> = (0..num_timepoints).map(|i| i as f64 * 0.1).collect();
    let trajectories = (0..num_trajectories)
        .map(|_| {
            let rows: Vec<Vec<f64>> = truth
                .simulate(1., &timepoints)
                .into_iter()
                .map(|x| vec![x])
                .collect();
            Trajectory::from_rows(timepoints.clone(), &rows).unwrap()
        })
        .collect();
    ObservedData::new(["X"], trajectories)
}

fn make_prior() -> PriorSpec {
    [("k".to_string(), PriorEntry::uniform(0., 10.))]
        .into_iter()
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let data = make_data(10, 100);
    let ic = InitialConditions::from(HashMap::from([("X".to_string(), 1.)]));

    let mut model = DecayModel::new(1.);
    let mut pid =
        DeterministicInference::new(["k"], &mut model, make_prior(), DecayEngine::new(0.)).unwrap();
    let settings = ScoreSettings::default();
    c.bench_function("deterministic score 10x100", |b| {
        b.iter(|| pid.score(black_box(&[0.5]), &data, &ic, &settings).unwrap())
    });
    c.bench_function("prior rejection", |b| {
        b.iter(|| pid.score(black_box(&[50.]), &data, &ic, &settings).unwrap())
    });

    let mut model = DecayModel::new(1.);
    let mut pid =
        StochasticInference::new(["k"], &mut model, make_prior(), DecayEngine::new(0.05)).unwrap();
    let settings = ScoreSettings {
        n_simulations: Some(10),
        ..Default::default()
    };
    c.bench_function("stochastic score 10x100x10", |b| {
        b.iter(|| pid.score(black_box(&[0.5]), &data, &ic, &settings).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
