//! Configuration builder trait
//!
//! Configuration structures implement [`ConfigBuilder`] to get a uniform way
//! of loading from the environment and validating the result.

use crate::Result;

/// Trait for configuration structures loaded from defaults or the environment
///
/// # Example
///
/// ```rust,ignore
/// use annotated_docs::config::{ConfigBuilder, SchemaOptions};
///
/// let options = SchemaOptions::from_env("MY_TOOLS_")?;
/// let schema = annotated_docs::as_json_schema_with_options(&tool, &options)?;
/// ```
pub trait ConfigBuilder: Default + Clone {
    /// Prefix used by [`ConfigBuilder::from_default_env`]
    const DEFAULT_ENV_PREFIX: &'static str;

    /// Validate the configuration
    ///
    /// The default implementation accepts every configuration.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from `{prefix}{FIELD}` environment variables
    ///
    /// Fields without a variable keep their default value.
    fn from_env(prefix: &str) -> Result<Self>;

    /// Load from the environment using [`ConfigBuilder::DEFAULT_ENV_PREFIX`]
    /// and validate the result
    fn from_default_env() -> Result<Self> {
        let config = Self::from_env(Self::DEFAULT_ENV_PREFIX)?;
        config.validate()?;
        Ok(config)
    }

    /// Create and validate the default configuration
    fn build() -> Result<Self> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }
}
