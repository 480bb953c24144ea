//! Scalar property values.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A scalar property value.
///
/// Serialized untagged so a property map renders as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

/// JSON scalars map onto `Value`; arrays and objects are rejected because
/// vertex properties are flat.
impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n.as_f64().map(Value::Float).ok_or_else(|| {
                    Error::InvalidArgument(format!("number {n} is not representable"))
                }),
            },
            serde_json::Value::String(s) => Ok(Value::String(s)),
            other => Err(Error::InvalidArgument(format!(
                "property values must be scalars, got {other}"
            ))),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            // NaN and infinities have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(0.25), Value::Float(0.25));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_json_scalars_convert() {
        assert_eq!(Value::try_from(json!(7)).unwrap(), Value::Int(7));
        assert_eq!(Value::try_from(json!(0.5)).unwrap(), Value::Float(0.5));
        assert_eq!(Value::try_from(json!("x")).unwrap(), Value::from("x"));
        assert_eq!(Value::try_from(json!(null)).unwrap(), Value::Null);
    }

    #[test]
    fn test_json_containers_rejected() {
        assert!(matches!(
            Value::try_from(json!([1, 2])),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Value::try_from(json!({"a": 1})),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_non_finite_float_projects_to_null() {
        assert_eq!(serde_json::Value::from(&Value::Float(f64::NAN)), json!(null));
        assert_eq!(serde_json::Value::from(&Value::Float(f64::INFINITY)), json!(null));
        assert_eq!(serde_json::Value::from(&Value::Float(1.5)), json!(1.5));
    }

    #[test]
    fn test_untagged_serialization() {
        let rendered = serde_json::to_string(&Value::from("Ada")).unwrap();
        assert_eq!(rendered, "\"Ada\"");
        let back: Value = serde_json::from_str("12").unwrap();
        assert_eq!(back, Value::Int(12));
    }
}
