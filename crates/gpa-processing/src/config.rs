//! Configuration types for feature preprocessing.
//!
//! This module provides configuration options using the builder pattern.

use serde::{Deserialize, Serialize};

/// Sentinel used to fill missing categorical values.
pub const MISSING_CATEGORY: &str = "Missing";

/// What to do with a categorical value that was never seen at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnknownCategoryPolicy {
    /// Encode the value as an all-zero indicator block
    #[default]
    Ignore,
    /// Fail the call with `UnknownCategory`
    Error,
}

/// Configuration for the feature preprocessor.
///
/// Use [`PreprocessingConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use gpa_processing::config::{PreprocessingConfig, UnknownCategoryPolicy};
///
/// let config = PreprocessingConfig::builder()
///     .unknown_categories(UnknownCategoryPolicy::Error)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Value substituted for missing categorical entries before encoding.
    /// Default: "Missing"
    pub missing_category: String,

    /// Handling of categories unseen at training time.
    /// Default: Ignore
    pub unknown_categories: UnknownCategoryPolicy,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            missing_category: MISSING_CATEGORY.to_string(),
            unknown_categories: UnknownCategoryPolicy::default(),
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessingConfigBuilder {
        PreprocessingConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.missing_category.trim().is_empty() {
            return Err(ConfigValidationError::EmptyMissingCategory);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing-category sentinel must not be blank")]
    EmptyMissingCategory,
}

impl From<ConfigValidationError> for crate::error::PreprocessingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PreprocessingConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessingConfigBuilder {
    missing_category: Option<String>,
    unknown_categories: Option<UnknownCategoryPolicy>,
}

impl PreprocessingConfigBuilder {
    /// Set the sentinel used for missing categorical values.
    pub fn missing_category(mut self, sentinel: impl Into<String>) -> Self {
        self.missing_category = Some(sentinel.into());
        self
    }

    /// Set the policy for categories unseen at training time.
    pub fn unknown_categories(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_categories = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessingConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessingConfig, ConfigValidationError> {
        let config = PreprocessingConfig {
            missing_category: self
                .missing_category
                .unwrap_or_else(|| MISSING_CATEGORY.to_string()),
            unknown_categories: self.unknown_categories.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
