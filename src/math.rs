use std::f64::consts::PI;

/// Density of the normal distribution with mean `mu` and standard deviation `sigma`.
#[inline]
pub(crate) fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2. * PI).sqrt())
}

/// Add a log-prior and a log-likelihood, mapping anything that is not a
/// finite number (or `-inf`) to `-inf`.
#[inline]
pub(crate) fn log_posterior(log_prior: f64, log_likelihood: f64) -> f64 {
    let sum = log_prior + log_likelihood;
    if sum.is_finite() {
        sum
    } else {
        f64::NEG_INFINITY
    }
}
