//! Field value documents (`field_values: { name: value }`).
//!
//! Values follow the YAML 1.2 core schema: only `true` and `false` are
//! booleans. Words such as `yes`, `no`, `on` and `off` are plain text and are
//! written into the field as such. A key given more than once keeps its last
//! value.

use crate::error::{LayoutError, Result};
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// A value to write into a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Checkbox state; only `true` is ever written
    Bool(bool),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValuesFile {
    // A plain map so repeated keys overwrite instead of failing the parse
    #[serde(default)]
    field_values: Option<HashMap<Value, Value>>,
}

/// Values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: HashMap<String, FieldValue>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self> {
        let file: Option<ValuesFile> = serde_yaml_ng::from_str(yaml)?;
        let mapping = file.and_then(|f| f.field_values).unwrap_or_default();

        let mut values = Self::new();
        for (key, value) in mapping {
            let name = scalar_text(&key).ok_or_else(|| {
                LayoutError::InvalidDefinition(format!(
                    "field name must be a scalar, got {:?}",
                    key
                ))
            })?;
            let value = match value {
                Value::Null => {
                    log::debug!("Skipping null value for field '{}'", name);
                    continue;
                }
                Value::Bool(flag) => FieldValue::Bool(flag),
                other => FieldValue::Text(scalar_text(&other).ok_or_else(|| {
                    LayoutError::InvalidDefinition(format!(
                        "value of field '{}' must be a boolean, number or string",
                        name
                    ))
                })?),
            };
            values.insert(name, value);
        }

        log::debug!("Loaded {} field value(s)", values.len());
        Ok(values)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut yaml = String::new();
        reader.read_to_string(&mut yaml)?;
        Self::from_str(&yaml)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_str(&yaml)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
