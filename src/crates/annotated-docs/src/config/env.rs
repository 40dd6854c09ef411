//! Prefixed environment variable reader

use crate::{Result, SchemaError};
use std::env;
use std::str::FromStr;

/// Reads `{PREFIX}{NAME}` environment variables
///
/// # Example
///
/// ```rust,ignore
/// let reader = EnvReader::new("ANNOTATED_DOCS_");
/// // Reads ANNOTATED_DOCS_INCLUDE_RETURNS
/// let include_returns = reader.flag("include_returns")?.unwrap_or(false);
/// ```
#[derive(Debug, Clone)]
pub struct EnvReader {
    prefix: String,
}

impl EnvReader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Full variable name for a field: prefix followed by the uppercased name
    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_uppercase())
    }

    /// Raw string value
    ///
    /// Returns `Ok(None)` when the variable is unset and an error when it is
    /// set but not valid UTF-8.
    pub fn string(&self, name: &str) -> Result<Option<String>> {
        let key = self.key(name);
        match env::var(&key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(SchemaError::InvalidConfig(format!(
                "environment variable {key} contains invalid UTF-8"
            ))),
        }
    }

    /// Value parsed with [`FromStr`]
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(name)?
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    SchemaError::InvalidConfig(format!(
                        "failed to parse environment variable {}: {e}",
                        self.key(name)
                    ))
                })
            })
            .transpose()
    }

    /// Boolean flag
    ///
    /// Accepts `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`, case-insensitively.
    pub fn flag(&self, name: &str) -> Result<Option<bool>> {
        let Some(raw) = self.string(name)? else {
            return Ok(None);
        };
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(SchemaError::InvalidConfig(format!(
                "invalid boolean value for {}: {raw}",
                self.key(name)
            ))),
        }
    }
}
