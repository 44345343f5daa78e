//! Analysis configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration.
//!
//! # Examples
//!
//! ```
//! use conc_capability::config::AnalysisConfig;
//!
//! let cfg = AnalysisConfig::from_json_str(
//!     r#"{ "limits": { "lower": 0.09, "target": 0.10, "upper": 0.11 } }"#,
//! )
//! .unwrap();
//! assert_eq!(cfg.limits.upper(), 0.11);
//! assert_eq!(cfg.normality_alpha, 0.05);
//! assert_eq!(cfg.batch_cv_threshold, 5.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::SpecificationLimits;
use crate::error::ConfigError;

/// Default significance level of the normality test.
pub const DEFAULT_NORMALITY_ALPHA: f64 = 0.05;
/// Default coefficient-of-variation ceiling (percent) for approving a batch.
pub const DEFAULT_BATCH_CV_THRESHOLD: f64 = 5.0;

/// Parameters of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Specification limits of the concentration.
    pub limits: SpecificationLimits,
    /// Normality is accepted when the Shapiro–Wilk p-value exceeds this.
    pub normality_alpha: f64,
    /// A batch is approved when its CV% is strictly below this.
    pub batch_cv_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            limits: SpecificationLimits::default(),
            normality_alpha: DEFAULT_NORMALITY_ALPHA,
            batch_cv_threshold: DEFAULT_BATCH_CV_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Json`] for malformed JSON, unknown fields or invalid limits
    /// - [`ConfigError::Alpha`] if `normality_alpha` is outside `(0, 1)`
    /// - [`ConfigError::CvThreshold`] if `batch_cv_threshold` is negative or non-finite
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the scalar fields; the limits validate themselves on construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.normality_alpha > 0.0 && self.normality_alpha < 1.0) {
            return Err(ConfigError::Alpha(self.normality_alpha));
        }
        if !(self.batch_cv_threshold.is_finite() && self.batch_cv_threshold >= 0.0) {
            return Err(ConfigError::CvThreshold(self.batch_cv_threshold));
        }
        Ok(())
    }
}
