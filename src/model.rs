//! Core abstraction for the simulated dynamical system.
//!
//! The model itself, and the simulator that integrates it, live outside of
//! this crate. Scoring only needs to bind the proposed parameter values onto
//! the model before handing it to a likelihood back end.

use thiserror::Error;

use crate::params::NamedParams;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model has no parameter named `{0}`")]
    UnknownParameter(String),
    #[error("Invalid value {value} for parameter `{name}`")]
    InvalidValue { name: String, value: f64 },
}

/// Trait for dynamical system models whose parameters can be estimated.
///
/// Binding parameters mutates the model, so a model must not be shared
/// between concurrent scoring calls. The scoring interface enforces this by
/// holding an exclusive borrow of the model. Parallel chains need one model
/// per chain.
pub trait Model {
    /// Set the parameters in `params` on the model.
    ///
    /// Parameters that are not mentioned keep their current value.
    fn set_params(&mut self, params: &NamedParams) -> Result<(), ModelError>;
}

impl<M: Model + ?Sized> Model for &mut M {
    fn set_params(&mut self, params: &NamedParams) -> Result<(), ModelError> {
        (**self).set_params(params)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn set_params(&mut self, params: &NamedParams) -> Result<(), ModelError> {
        (**self).set_params(params)
    }
}
