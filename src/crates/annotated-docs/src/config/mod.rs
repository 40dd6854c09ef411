//! Options for describing and invoking functions
//!
//! [`SchemaOptions`] can be built in code, parsed from YAML, or loaded from
//! environment variables through [`ConfigBuilder`]:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ANNOTATED_DOCS_INCLUDE_RETURNS` | `include_returns` | `false` |
//! | `ANNOTATED_DOCS_REJECT_UNKNOWN_ARGUMENTS` | `reject_unknown_arguments` | `false` |
//! | `ANNOTATED_DOCS_DESCRIPTION_POLICY` | `description_policy` | `first` |
//! | `ANNOTATED_DOCS_MAX_DEPTH` | `max_depth` | `64` |
//!
//! # Example
//!
//! ```rust
//! use annotated_docs::config::{DescriptionPolicy, SchemaOptions};
//!
//! let options = SchemaOptions::new()
//!     .with_include_returns(true)
//!     .with_description_policy(DescriptionPolicy::Reject);
//! assert!(options.include_returns);
//! ```

mod builder;
mod env;

pub use builder::ConfigBuilder;
pub use env::EnvReader;

use crate::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule for a parameter carrying more than one description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionPolicy {
    /// The first description found wins: the parameter's own docs before
    /// type annotations, outer annotations before inner ones
    #[default]
    First,
    /// The last description found wins
    Last,
    /// More than one description is an unsupported signature
    Reject,
}

impl FromStr for DescriptionPolicy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "reject" => Ok(Self::Reject),
            other => Err(SchemaError::InvalidConfig(format!(
                "unknown description policy `{other}` (expected first, last or reject)"
            ))),
        }
    }
}

impl fmt::Display for DescriptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Options shared by the describe and invoke paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Add a `returns` schema for the callable's declared return type
    pub include_returns: bool,
    /// Treat undeclared argument keys as validation failures instead of ignoring them
    pub reject_unknown_arguments: bool,
    /// How multiple descriptions on one parameter are resolved
    pub description_policy: DescriptionPolicy,
    /// Deepest nesting of raw argument values accepted during validation
    pub max_depth: usize,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            include_returns: false,
            reject_unknown_arguments: false,
            description_policy: DescriptionPolicy::default(),
            max_depth: 64,
        }
    }
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_returns(mut self, include_returns: bool) -> Self {
        self.include_returns = include_returns;
        self
    }

    pub fn with_reject_unknown_arguments(mut self, reject: bool) -> Self {
        self.reject_unknown_arguments = reject;
        self
    }

    pub fn with_description_policy(mut self, policy: DescriptionPolicy) -> Self {
        self.description_policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse options from a YAML document
    ///
    /// Missing fields take their default values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SchemaError::InvalidConfig(format!("invalid YAML options: {e}")))?;
        options.validate()?;
        Ok(options)
    }
}

impl ConfigBuilder for SchemaOptions {
    const DEFAULT_ENV_PREFIX: &'static str = "ANNOTATED_DOCS_";

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SchemaError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self> {
        let reader = EnvReader::new(prefix);
        let defaults = Self::default();

        Ok(Self {
            include_returns: reader
                .flag("include_returns")?
                .unwrap_or(defaults.include_returns),
            reject_unknown_arguments: reader
                .flag("reject_unknown_arguments")?
                .unwrap_or(defaults.reject_unknown_arguments),
            description_policy: reader
                .parse("description_policy")?
                .unwrap_or(defaults.description_policy),
            max_depth: reader.parse("max_depth")?.unwrap_or(defaults.max_depth),
        })
    }
}
