use serde_json::Value;

/// Outcome of resolving one field.
///
/// `Undefined` means "no value for this field" and is a normal result: the
/// field is skipped, not failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Undefined,
    Scalar(Value),
    List(Vec<Value>),
}

impl ResolvedValue {
    pub fn text(value: impl Into<String>) -> Self {
        ResolvedValue::Scalar(Value::String(value.into()))
    }

    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => ResolvedValue::List(items),
            other => ResolvedValue::Scalar(other),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ResolvedValue::Undefined)
    }

    /// Page-script truthiness: `false`, `0`, `""` and `null` are falsy,
    /// lists are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ResolvedValue::Undefined => false,
            ResolvedValue::List(_) => true,
            ResolvedValue::Scalar(v) => json_truthy(v),
        }
    }

    /// Text rendering used when writing into a control. Lists join with `,`.
    pub fn as_text(&self) -> String {
        match self {
            ResolvedValue::Undefined => String::new(),
            ResolvedValue::Scalar(v) => json_text(v),
            ResolvedValue::List(items) => items.iter().map(json_text).collect::<Vec<_>>().join(","),
        }
    }

    /// Multi-valued view: list items as text, or the scalar text split on
    /// commas with blanks dropped.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            ResolvedValue::Undefined | ResolvedValue::Scalar(Value::Null) => Vec::new(),
            ResolvedValue::List(items) => items.iter().map(json_text).collect(),
            ResolvedValue::Scalar(v) => json_text(v)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn json_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(json_text).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
