use serde::{Deserialize, Serialize};

/// The result of an item function, stringified for the wire.
///
/// # Examples
///
/// ```
/// use hostmon_common::value::Value;
///
/// assert_eq!(Value::from(42u64).to_string(), "42");
/// assert_eq!(Value::from(2.5).to_string(), "2.5");
/// assert_eq!(Value::from(1.0 / 3.0).to_string(), "0.333333");
/// assert_eq!(Value::from(4.0).to_string(), "4.0");
/// assert_eq!(Value::from("up").to_string(), "up");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Six fractional digits, trailing zeros trimmed but at least one kept.
fn format_float(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let mut s = format!("{v:.6}");
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(u64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_float_keeps_sign_and_precision() {
        assert_eq!(Value::from(-0.125).to_string(), "-0.125");
    }

    #[test]
    fn text_is_not_quoted() {
        assert_eq!(Value::from("результат").to_string(), "результат");
    }
}
