//! Error types for costcast-core
//!
//! Provides the error hierarchy with thiserror. The billing variants are the
//! only recoverable ones: the provider downgrades them to a warning and falls
//! back to synthetic data. Everything else ends the run.

use thiserror::Error;

/// Core error type for costcast operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Series Errors
    // ===================
    #[error("Cost series is empty or contains no usable values")]
    EmptySeries,

    #[error("Insufficient data: {points} observations, at least {required} required")]
    InsufficientData { points: usize, required: usize },

    // ===================
    // Billing Errors
    // ===================
    #[error("Billing API request failed: {source}")]
    BillingFetch {
        #[from]
        source: reqwest::Error,
    },

    #[error("Failed to parse billing response: {message}")]
    BillingParse { message: String },

    // ===================
    // Model Errors
    // ===================
    #[error("Forecast model failed: {message}")]
    ModelFit { message: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// True for errors the provider may recover from by falling back to
    /// synthetic data. Model and configuration errors are always fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::BillingFetch { .. } | CoreError::BillingParse { .. }
        )
    }
}
