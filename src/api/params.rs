//! Query parameter values and their rendering into a query string.
//!
//! Endpoints take typed parameter structs; those are turned into
//! [`QueryParams`] through serde so that field names stay in one place
//! (the `#[serde(rename_all = "camelCase")]` attribute on the struct).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Bool(bool),
    Integer(i64),
    /// Rendered as an ISO-8601 / RFC 3339 string in UTC.
    Timestamp(DateTime<Utc>),
    /// Rendered as one `name=value` pair per element.
    List(Vec<ParamValue>),
}

impl ParamValue {
    fn render_into(&self, name: &str, out: &mut Vec<(String, String)>) {
        match self {
            ParamValue::String(s) => out.push((name.to_string(), s.clone())),
            ParamValue::Bool(b) => out.push((name.to_string(), b.to_string())),
            ParamValue::Integer(i) => out.push((name.to_string(), i.to_string())),
            ParamValue::Timestamp(ts) => out.push((
                name.to_string(),
                ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            ParamValue::List(items) => {
                for item in items {
                    item.render_into(name, out);
                }
            }
        }
    }

    /// Converts a serialized JSON value. `Ok(None)` means "omit the parameter".
    fn from_json(name: &str, value: Value) -> ApiResult<Option<Self>> {
        let invalid = |message: &str| ApiError::InvalidParameter {
            name: name.to_string(),
            message: message.to_string(),
        };

        Ok(match value {
            Value::Null => None,
            Value::Bool(b) => Some(ParamValue::Bool(b)),
            Value::String(s) => Some(ParamValue::String(s)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                None => ParamValue::String(n.to_string()),
            }),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(_) | Value::Object(_) => {
                            return Err(invalid("nested lists and objects are not supported"));
                        }
                        scalar => values.extend(Self::from_json(name, scalar)?),
                    }
                }
                Some(ParamValue::List(values))
            }
            Value::Object(_) => return Err(invalid("objects cannot be sent as query parameters")),
        })
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        ParamValue::Timestamp(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered query parameters. Inserting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a serializable struct.
    ///
    /// `None` fields are skipped. Anything that does not serialize to a JSON
    /// object is rejected.
    pub fn from_serialize<P: Serialize + ?Sized>(params: &P) -> ApiResult<Self> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::InvalidParameter {
            name: std::any::type_name::<P>().to_string(),
            message: e.to_string(),
        })?;

        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(ApiError::InvalidParameter {
                    name: std::any::type_name::<P>().to_string(),
                    message: format!("expected a struct or map, got {other}"),
                });
            }
        };

        let mut params = Self::new();
        for (name, value) in map {
            if let Some(value) = ParamValue::from_json(&name, value)? {
                params.insert(name, value);
            }
        }
        Ok(params)
    }

    /// Sets `name` to `value`, replacing an earlier value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`QueryParams::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds every entry of `other`, replacing values with the same name.
    pub fn extend(&mut self, other: QueryParams) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the parameters as string pairs in insertion order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            value.render_into(name, &mut out);
        }
        out
    }
}
