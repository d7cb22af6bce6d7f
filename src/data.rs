//! Observed trajectories and initial conditions.

use std::collections::HashMap;

use faer::Mat;
use tracing::debug;

use crate::error::{shape_err, Result};

/// A single observed trajectory.
///
/// `values` has one row per timepoint and one column per measurement of the
/// enclosing [`ObservedData`].
#[derive(Debug, Clone)]
pub struct Trajectory {
    timepoints: Vec<f64>,
    values: Mat<f64>,
}

impl Trajectory {
    pub fn new(timepoints: Vec<f64>, values: Mat<f64>) -> Self {
        Self { timepoints, values }
    }

    /// Build a trajectory from row-major rows, one row per timepoint.
    pub fn from_rows(timepoints: Vec<f64>, rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = rows.first().map_or(0, |row| row.len());
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
            return shape_err(format!(
                "Row {} has {} values, expected {}",
                idx,
                row.len(),
                ncols
            ));
        }
        let values = Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j]);
        Ok(Self::new(timepoints, values))
    }

    pub fn timepoints(&self) -> &[f64] {
        &self.timepoints
    }

    pub fn values(&self) -> &Mat<f64> {
        &self.values
    }

    pub fn num_timepoints(&self) -> usize {
        self.timepoints.len()
    }

    fn validate(&self, idx: usize, num_measurements: usize) -> Result<()> {
        if self.values.nrows() != self.timepoints.len() {
            return shape_err(format!(
                "Trajectory {} has {} timepoints but {} rows of data",
                idx,
                self.timepoints.len(),
                self.values.nrows()
            ));
        }
        if self.values.ncols() != num_measurements {
            return shape_err(format!(
                "Trajectory {} has {} data columns but {} measurements are declared",
                idx,
                self.values.ncols(),
                num_measurements
            ));
        }
        if self.timepoints.iter().any(|t| t.is_nan()) {
            return shape_err(format!("Trajectory {} has a NaN timepoint", idx));
        }
        if let Some(pos) = self.timepoints.windows(2).position(|w| w[1] < w[0]) {
            return shape_err(format!(
                "Timepoints of trajectory {} decrease at index {}",
                idx,
                pos + 1
            ));
        }
        Ok(())
    }
}

/// Observed trajectories of a declared set of measurements.
#[derive(Debug, Clone)]
pub struct ObservedData {
    measurements: Vec<String>,
    trajectories: Vec<Trajectory>,
}

impl ObservedData {
    pub fn new<S: Into<String>>(
        measurements: impl IntoIterator<Item = S>,
        trajectories: Vec<Trajectory>,
    ) -> Self {
        Self {
            measurements: measurements.into_iter().map(Into::into).collect(),
            trajectories,
        }
    }

    pub fn measurements(&self) -> &[String] {
        &self.measurements
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// The number of trajectories `N`.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Check every trajectory against the declared measurements.
    pub fn validate(&self) -> Result<()> {
        if self.trajectories.is_empty() {
            return shape_err("Observed data contains no trajectories");
        }
        if self.measurements.is_empty() {
            return shape_err("Observed data declares no measurements");
        }
        for (idx, trajectory) in self.trajectories.iter().enumerate() {
            trajectory.validate(idx, self.measurements.len())?;
        }
        Ok(())
    }
}

/// Initial state of a simulation, keyed by species name.
pub type State = HashMap<String, f64>;

/// Initial conditions of the simulations that are compared with the data.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialConditions {
    /// One state used for every trajectory.
    Shared(State),
    /// One state per trajectory. A single state is broadcast.
    PerTrajectory(Vec<State>),
}

impl InitialConditions {
    pub fn len(&self) -> usize {
        match self {
            InitialConditions::Shared(_) => 1,
            InitialConditions::PerTrajectory(states) => states.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Initial state of trajectory `idx`.
    pub fn get(&self, idx: usize) -> Option<&State> {
        match self {
            InitialConditions::Shared(state) => Some(state),
            InitialConditions::PerTrajectory(states) if states.len() == 1 => states.first(),
            InitialConditions::PerTrajectory(states) => states.get(idx),
        }
    }

    /// Check that there is either one state or exactly one per trajectory.
    pub fn validate(&self, num_trajectories: usize) -> Result<()> {
        let count = self.len();
        if count != 1 && count != num_trajectories {
            return shape_err(format!(
                "Expected 1 or {} initial conditions (one per trajectory), got {}",
                num_trajectories, count
            ));
        }
        Ok(())
    }
}

impl From<State> for InitialConditions {
    fn from(state: State) -> Self {
        InitialConditions::Shared(state)
    }
}

impl From<Vec<State>> for InitialConditions {
    fn from(states: Vec<State>) -> Self {
        InitialConditions::PerTrajectory(states)
    }
}

/// Validate data and initial conditions against each other.
pub(crate) fn validate_inputs(
    data: &ObservedData,
    initial_conditions: &InitialConditions,
) -> Result<()> {
    let timepoints: Vec<_> = data
        .trajectories()
        .iter()
        .map(Trajectory::num_timepoints)
        .collect();
    debug!(
        num_trajectories = data.len(),
        timepoints = ?timepoints,
        measurements = ?data.measurements(),
        num_initial_conditions = initial_conditions.len(),
        "Validating observed data"
    );
    data.validate()?;
    initial_conditions.validate(data.len())
}
