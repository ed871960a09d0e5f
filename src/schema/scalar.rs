//! Scalar normalization helpers used by the property payload deserializers.
//!
//! The platform API treats every scalar constraint (lengths, bounds, sizes,
//! app ids) as a string. Authors are free to write `minValue: 0` in YAML, so
//! numbers are accepted and converted to their textual form here.

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_yaml_ng::Value;

/// Convert a YAML scalar into its string form.
///
/// Strings pass through, numbers are rendered with their YAML text. Anything
/// else (booleans, sequences, mappings) is rejected.
pub(crate) fn scalar_to_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected a string or number, found {}", kind_name(other))),
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// `Option<String>` that also accepts numbers
pub(crate) fn option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(&value).map(Some).map_err(D::Error::custom),
    }
}

/// `String` that also accepts numbers; null becomes the empty string
pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        value => scalar_to_string(&value).map_err(D::Error::custom),
    }
}

/// List of strings whose items may be written as numbers
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!(
            "expected a sequence, found {}",
            kind_name(&other)
        ))),
    }
}

/// Ordered map whose keys may be written as numbers (`1: {...}` keys as `"1"`)
pub(crate) fn string_keyed<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(IndexMap::new()),
        Some(Value::Mapping(entries)) => entries,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a mapping, found {}",
                kind_name(&other)
            )))
        }
    };

    let mut normalized = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let name =
            scalar_to_string(&key).map_err(|e| D::Error::custom(format!("key {}", e)))?;
        let entry = serde_yaml_ng::from_value(value)
            .map_err(|e| D::Error::custom(format!("`{}`: {}", name, e)))?;
        if normalized.insert(name.clone(), entry).is_some() {
            return Err(D::Error::custom(format!("duplicate key `{}`", name)));
        }
    }
    Ok(normalized)
}

/// Default value of a single-choice field.
///
/// A one-element list collapses to its element; an empty string or empty
/// list means "no default".
pub(crate) fn single_default<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let text = match value {
        Value::Sequence(mut items) => match items.len() {
            0 => return Ok(None),
            1 => scalar_to_string(&items.remove(0)).map_err(D::Error::custom)?,
            n => {
                return Err(D::Error::custom(format!(
                    "single-choice default accepts at most one value, found {}",
                    n
                )))
            }
        },
        other => scalar_to_string(&other).map_err(D::Error::custom)?,
    };

    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Default value of a multi-choice field.
///
/// A bare scalar is lifted into a one-element list; an empty string or empty
/// list means "no default".
pub(crate) fn multi_default<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?,
        Some(other) => {
            let text = scalar_to_string(&other).map_err(D::Error::custom)?;
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    };

    Ok(if values.is_empty() { None } else { Some(values) })
}
