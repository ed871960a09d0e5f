//! Validated field identifiers

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml_ng::Value;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use super::scalar::scalar_to_string;
use crate::error::{FormSchemaError, Result};

/// Identifier naming one form field.
///
/// Construction rejects the empty string; equality and hashing delegate to
/// the inner string, so a `FieldMap` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FieldCode(String);

impl FieldCode {
    /// Create a field code, failing on empty input
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(FormSchemaError::EmptyFieldCode);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FieldCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for FieldCode {
    type Err = FormSchemaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for FieldCode {
    type Error = FormSchemaError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for FieldCode {
    type Error = FormSchemaError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for FieldCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let code = scalar_to_string(&raw).map_err(serde::de::Error::custom)?;
        FieldCode::new(code).map_err(serde::de::Error::custom)
    }
}
