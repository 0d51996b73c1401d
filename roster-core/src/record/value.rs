//! Cell values as they arrive from a table, and their coercion into stored values.

use serde_json::{Map, Number, Value};

/// One raw cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Map(Map<String, Value>),
    /// Anything without a scalar representation; stored as its string form.
    Other { kind: String, repr: String },
}

impl Cell {
    /// Name of the input type, recorded alongside the coerced value.
    pub fn declared_type(&self) -> &str {
        match self {
            Cell::Empty => "null",
            Cell::Int(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Bool(_) => "boolean",
            Cell::Text(_) => "string",
            Cell::Map(_) => "map",
            Cell::Other { kind, .. } => kind,
        }
    }

    /// Coerce to the stored value: missing sentinels (empty, NaN) become null,
    /// scalars and maps pass through, everything else becomes its string form.
    pub fn into_value(self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Int(i) => Value::Number(i.into()),
            Cell::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            Cell::Bool(b) => Value::Bool(b),
            Cell::Text(s) => Value::String(s),
            Cell::Map(m) => Value::Object(m),
            Cell::Other { repr, .. } => Value::String(repr),
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Cell::Text(s),
            Value::Object(m) => Cell::Map(m),
            Value::Array(items) => {
                Cell::Other { kind: "list".to_string(), repr: Value::Array(items).to_string() }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(Cell::Float(f64::NAN).into_value(), Value::Null);
        assert_eq!(Cell::Float(f64::NAN).declared_type(), "float");
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(Cell::Int(42).into_value(), json!(42));
        assert_eq!(Cell::Float(1.5).into_value(), json!(1.5));
        assert_eq!(Cell::Bool(true).into_value(), json!(true));
        assert_eq!(Cell::from("Yes").into_value(), json!("Yes"));
    }

    #[test]
    fn test_unrepresentable_values_become_strings() {
        let cell = Cell::from(json!([1, 2]));
        assert_eq!(cell.declared_type(), "list");
        assert_eq!(cell.into_value(), json!("[1,2]"));

        let when = Cell::Other { kind: "datetime".into(), repr: "2024-01-15T00:00:00".into() };
        assert_eq!(when.into_value(), json!("2024-01-15T00:00:00"));
    }

    #[test]
    fn test_maps_pass_through() {
        let cell = Cell::from(json!({"city": "Lyon"}));
        assert_eq!(cell.declared_type(), "map");
        assert_eq!(cell.into_value(), json!({"city": "Lyon"}));
    }
}
