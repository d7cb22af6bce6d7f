//! Prior admissibility checks.
//!
//! A prior here does not contribute a continuous log-density. Each family
//! only decides whether a candidate value lies in the support that the user
//! is willing to explore, and reports `0.0` (admissible) or `-inf`
//! (rejected). A rejected proposal therefore zeroes the posterior no matter
//! what the likelihood would have been, and the simulator is never asked to
//! run with parameter values outside of its valid domain.
//!
//! Families are looked up by tag in a [`PriorRegistry`]. The built-in tags
//! are `uniform` and `gaussian`; additional families can be registered with
//! [`PriorRegistry::register`].

use std::collections::HashMap;
use std::fmt::Debug;

use tracing::{trace, warn};

use crate::error::{config_err, Result};
use crate::math::normal_pdf;
use crate::params::NamedParams;

pub const UNIFORM: &str = "uniform";
pub const GAUSSIAN: &str = "gaussian";

/// Prior specification of a single parameter: a family tag and the
/// parameters of that family, e.g. `uniform` with `[lower, upper]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorEntry {
    pub tag: String,
    pub params: Vec<f64>,
}

impl PriorEntry {
    pub fn new(tag: impl Into<String>, params: impl Into<Vec<f64>>) -> Self {
        Self {
            tag: tag.into(),
            params: params.into(),
        }
    }

    pub fn uniform(lower: f64, upper: f64) -> Self {
        Self::new(UNIFORM, [lower, upper])
    }

    pub fn gaussian(mean: f64, std_dev: f64, threshold: f64) -> Self {
        Self::new(GAUSSIAN, [mean, std_dev, threshold])
    }
}

/// Prior entries keyed by parameter name.
pub type PriorSpec = HashMap<String, PriorEntry>;

/// A family of prior distributions that can decide admissibility of a value.
pub trait PriorFamily: Debug + Send + Sync {
    /// Check that `params` are valid parameters for this family.
    fn validate(&self, param_name: &str, params: &[f64]) -> Result<()>;

    /// Return `0.0` if `value` is admissible and `-inf` otherwise.
    ///
    /// Implementations can assume that `validate` accepted `params`.
    fn log_prior(&self, value: f64, params: &[f64]) -> f64;
}

/// Bounds check, inclusive on both ends.
pub fn uniform_log_prior(value: f64, lower: f64, upper: f64) -> f64 {
    if (lower..=upper).contains(&value) {
        0.0
    } else {
        f64::NEG_INFINITY
    }
}

/// Accept `value` if the normal density at `value` is at least `threshold`.
///
/// A density above one means the distribution is far narrower than any
/// sensible prior and usually points at a mistake in the prior parameters.
/// This is reported as a warning only.
pub fn gaussian_log_prior(value: f64, mean: f64, std_dev: f64, threshold: f64) -> f64 {
    let density = normal_pdf(value, mean, std_dev);
    if density > 1. {
        warn!(
            value,
            mean,
            std_dev,
            density,
            "Probability density greater than 1 while checking Gaussian prior"
        );
    }
    if density >= threshold {
        0.0
    } else {
        f64::NEG_INFINITY
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl PriorFamily for Uniform {
    fn validate(&self, param_name: &str, params: &[f64]) -> Result<()> {
        let &[lower, upper] = params else {
            return config_err(format!(
                "Uniform prior for `{}` needs [lower_bound, upper_bound], got {} values",
                param_name,
                params.len()
            ));
        };
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return config_err(format!(
                "Uniform prior for `{}` has invalid bounds [{}, {}]",
                param_name, lower, upper
            ));
        }
        Ok(())
    }

    fn log_prior(&self, value: f64, params: &[f64]) -> f64 {
        let &[lower, upper] = params else {
            return f64::NEG_INFINITY;
        };
        uniform_log_prior(value, lower, upper)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl PriorFamily for Gaussian {
    fn validate(&self, param_name: &str, params: &[f64]) -> Result<()> {
        let &[mean, std_dev, threshold] = params else {
            return config_err(format!(
                "Gaussian prior for `{}` needs [mean, std_dev, probability_threshold], got {} values",
                param_name,
                params.len()
            ));
        };
        if !mean.is_finite() {
            return config_err(format!(
                "Gaussian prior for `{}` has non-finite mean {}",
                param_name, mean
            ));
        }
        if !(std_dev.is_finite() && std_dev > 0.) {
            return config_err(format!(
                "Gaussian prior for `{}` needs a positive std_dev, got {}",
                param_name, std_dev
            ));
        }
        if !(threshold >= 0.) {
            return config_err(format!(
                "Gaussian prior for `{}` needs a non-negative probability threshold, got {}",
                param_name, threshold
            ));
        }
        Ok(())
    }

    fn log_prior(&self, value: f64, params: &[f64]) -> f64 {
        let &[mean, std_dev, threshold] = params else {
            return f64::NEG_INFINITY;
        };
        gaussian_log_prior(value, mean, std_dev, threshold)
    }
}

/// Maps prior tags to the families that evaluate them.
#[derive(Debug)]
pub struct PriorRegistry {
    families: HashMap<String, Box<dyn PriorFamily>>,
}

impl Default for PriorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(UNIFORM, Uniform);
        registry.register(GAUSSIAN, Gaussian);
        registry
    }
}

impl PriorRegistry {
    /// A registry without any families, not even the built-in ones.
    pub fn empty() -> Self {
        Self {
            families: HashMap::new(),
        }
    }

    /// Register `family` under `tag`, replacing any family already using that tag.
    pub fn register(&mut self, tag: impl Into<String>, family: impl PriorFamily + 'static) {
        self.families.insert(tag.into(), Box::new(family));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.families.contains_key(tag)
    }

    fn family(&self, param_name: &str, entry: &PriorEntry) -> Result<&dyn PriorFamily> {
        match self.families.get(&entry.tag) {
            Some(family) => Ok(family.as_ref()),
            None => config_err(format!(
                "Prior type `{}` of parameter `{}` is undefined",
                entry.tag, param_name
            )),
        }
    }

    fn entry<'a>(&self, prior_spec: &'a PriorSpec, param_name: &str) -> Result<&'a PriorEntry> {
        match prior_spec.get(param_name) {
            Some(entry) => Ok(entry),
            None => config_err(format!("No prior found for parameter `{}`", param_name)),
        }
    }

    /// Check that every name has a prior entry with a known tag and valid
    /// family parameters.
    pub fn validate<S: AsRef<str>>(&self, names: &[S], prior_spec: &PriorSpec) -> Result<()> {
        for name in names {
            let name = name.as_ref();
            let entry = self.entry(prior_spec, name)?;
            self.family(name, entry)?.validate(name, &entry.params)?;
        }
        Ok(())
    }

    /// Log-prior contribution of a single parameter.
    pub fn log_prior(
        &self,
        param_name: &str,
        value: f64,
        prior_spec: &PriorSpec,
    ) -> Result<f64> {
        let entry = self.entry(prior_spec, param_name)?;
        let family = self.family(param_name, entry)?;
        family.validate(param_name, &entry.params)?;
        Ok(family.log_prior(value, &entry.params))
    }

    /// Sum of the log-prior contributions of all parameters.
    ///
    /// Every entry is resolved and validated before any value is evaluated,
    /// so a missing or malformed entry is an error even when an earlier
    /// parameter is already outside its support.
    pub fn total_log_prior(
        &self,
        named_params: &NamedParams,
        prior_spec: &PriorSpec,
    ) -> Result<f64> {
        let resolved = named_params
            .iter()
            .map(|(name, value)| -> Result<_> {
                let entry = self.entry(prior_spec, name)?;
                let family = self.family(name, entry)?;
                family.validate(name, &entry.params)?;
                Ok((name, value, family, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut total = 0.0;
        for (name, value, family, entry) in resolved {
            let lp = family.log_prior(value, &entry.params);
            if lp == f64::NEG_INFINITY {
                trace!(parameter = name, value, "Parameter outside of prior support");
                return Ok(f64::NEG_INFINITY);
            }
            total += lp;
        }
        Ok(total)
    }
}

/// [`PriorRegistry::total_log_prior`] with the built-in families.
pub fn total_log_prior(named_params: &NamedParams, prior_spec: &PriorSpec) -> Result<f64> {
    PriorRegistry::default().total_log_prior(named_params, prior_spec)
}
