//! Regression predictor for DBS share prices
//!
//! The model is a single-feature linear regression (USD/SGD rate in, DBS
//! share price in SGD out) stored as a small JSON artifact:
//!
//! ```json
//! { "intercept": -12.4, "coefficient": 31.8 }
//! ```
//!
//! The artifact is loaded once at startup. A missing or unreadable artifact
//! never aborts the process; the predictor reports itself unavailable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GroqSeekerError, Result};

/// Reply shown when no model artifact was loaded
pub const MODEL_UNAVAILABLE_REPLY: &str = "Prediction model not loaded.";

/// Stateless numeric prediction
#[cfg_attr(test, mockall::automock)]
pub trait RegressionPredictor: Send + Sync {
    /// Predicts the target for a single feature value
    fn predict(&self, x: f64) -> Result<f64>;
}

/// Single-feature linear regression `y = intercept + coefficient * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Value of `y` at `x = 0`
    pub intercept: f64,
    /// Slope
    pub coefficient: f64,
}

impl LinearModel {
    /// Loads a model from a JSON artifact
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if a parameter
    /// is not finite
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let model: LinearModel = serde_json::from_str(&contents)?;
        if !model.intercept.is_finite() || !model.coefficient.is_finite() {
            return Err(GroqSeekerError::Config(format!(
                "Model parameters in {} must be finite",
                path.as_ref().display()
            ))
            .into());
        }
        Ok(model)
    }
}

impl RegressionPredictor for LinearModel {
    fn predict(&self, x: f64) -> Result<f64> {
        Ok(self.intercept + self.coefficient * x)
    }
}

/// Predictor handle that may have no model behind it
pub struct Predictor {
    model: Option<Box<dyn RegressionPredictor>>,
}

impl Predictor {
    /// Wraps a loaded model
    pub fn new(model: Box<dyn RegressionPredictor>) -> Self {
        Self { model: Some(model) }
    }

    /// A predictor with no model; every prediction reports unavailable
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    /// Loads the artifact at `path`, falling back to an unavailable predictor
    ///
    /// # Examples
    ///
    /// ```
    /// use groqseeker::predictor::Predictor;
    ///
    /// let predictor = Predictor::load("does/not/exist.json");
    /// assert!(!predictor.is_available());
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                "Prediction model not found at {}, predictions disabled",
                path.display()
            );
            return Self::unavailable();
        }

        match LinearModel::from_file(path) {
            Ok(model) => {
                tracing::info!(
                    intercept = model.intercept,
                    coefficient = model.coefficient,
                    "Loaded prediction model from {}",
                    path.display()
                );
                Self::new(Box::new(model))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load prediction model from {}: {:#}",
                    path.display(),
                    e
                );
                Self::unavailable()
            }
        }
    }

    /// Returns true if a model is loaded
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Predicts the DBS share price for a USD/SGD rate
    ///
    /// # Errors
    ///
    /// Returns `ModelUnavailable` if no model is loaded
    pub fn predict(&self, usdsgd: f64) -> Result<f64> {
        match &self.model {
            Some(model) => model.predict(usdsgd),
            None => Err(GroqSeekerError::ModelUnavailable.into()),
        }
    }

    /// Predicts and formats the user-facing reply
    ///
    /// An unavailable model yields a stable notice rather than an error.
    pub fn predict_reply(&self, usdsgd: f64) -> String {
        match self.predict(usdsgd) {
            Ok(price) => format!("Predicted DBS share price: {:.2} SGD", price),
            Err(e) => match e.downcast_ref::<GroqSeekerError>() {
                Some(GroqSeekerError::ModelUnavailable) => MODEL_UNAVAILABLE_REPLY.to_string(),
                _ => {
                    tracing::error!("Prediction failed: {:#}", e);
                    format!("Prediction failed: {}", e)
                }
            },
        }
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Parses a USD/SGD rate supplied by the user
///
/// # Errors
///
/// Returns `InvalidNumber` if the input is not a finite number
///
/// # Examples
///
/// ```
/// use groqseeker::predictor::parse_rate;
///
/// assert_eq!(parse_rate(" 1.35 ").unwrap(), 1.35);
/// assert!(parse_rate("abc").is_err());
/// assert!(parse_rate("inf").is_err());
/// ```
pub fn parse_rate(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(GroqSeekerError::InvalidNumber(trimmed.to_string()).into()),
    }
}
