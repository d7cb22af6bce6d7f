//! Named parameter assignments.
//!
//! The sampler only knows about a flat vector of values. [`NamedParams`] pairs
//! those values positionally with the names of the parameters under
//! estimation, which is the form priors and models consume.

use itertools::Itertools;

use crate::error::{config_err, Result};

/// Ordered mapping from parameter name to candidate value.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, f64)>,
}

impl NamedParams {
    /// Zip `names` with `values` positionally.
    ///
    /// Fails if the lengths differ or if a name occurs twice.
    pub fn zip<S: AsRef<str>>(names: &[S], values: &[f64]) -> Result<Self> {
        if names.len() != values.len() {
            return config_err(format!(
                "Expected {} parameter values, got {}",
                names.len(),
                values.len()
            ));
        }
        check_unique(names)?;
        let entries = names
            .iter()
            .zip(values.iter())
            .map(|(name, &value)| (name.as_ref().to_string(), value))
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|&(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

pub(crate) fn check_unique<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let duplicates: Vec<&str> = names.iter().map(|name| name.as_ref()).duplicates().collect();
    if !duplicates.is_empty() {
        return config_err(format!(
            "Parameter names must be unique, found duplicates: {}",
            duplicates.join(", ")
        ));
    }
    Ok(())
}
