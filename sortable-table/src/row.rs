//! Row values.

use serde_json::Value;

/// A data row: field values keyed by column id.
pub type Row = serde_json::Map<String, Value>;

/// Field that identifies a row (used for the detail link and `data-key`).
pub const KEY_FIELD: &str = "id";

/// The row's identifying key, if it has one.
pub fn row_key(row: &Row) -> Option<String> {
    row.get(KEY_FIELD).map(value_text)
}

/// Display text of a field value.
///
/// Strings are used as-is; numbers print without a trailing `.0`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Numeric value of a field, using loose numeric coercion.
///
/// `null` is 0, booleans are 0/1, numeric strings are parsed (blank is 0).
/// Anything else, including a missing field, has no numeric value.
pub fn value_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                parse_number(s)?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}

/// Parse trimmed numeric text. Infinity is only spelled `Infinity`,
/// optionally signed; `inf`, `infinity` and `NaN` have no numeric value.
/// Digits that overflow still parse to an infinity.
fn parse_number(s: &str) -> Option<f64> {
    let n = s.parse::<f64>().ok()?;
    let unsigned = s.trim_start_matches(['+', '-']);
    if n.is_finite() || unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Some(n);
    }
    match s {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("Soap")), "Soap");
        assert_eq!(value_text(&json!(3)), "3");
        assert_eq!(value_text(&json!(2.0)), "2");
        assert_eq!(value_text(&json!(2.5)), "2.5");
        assert_eq!(value_text(&json!(null)), "null");
    }

    #[test]
    fn test_value_number_coercion() {
        assert_eq!(value_number(Some(&json!(12))), Some(12.0));
        assert_eq!(value_number(Some(&json!(" 7.5 "))), Some(7.5));
        assert_eq!(value_number(Some(&json!(""))), Some(0.0));
        assert_eq!(value_number(Some(&json!(true))), Some(1.0));
        assert_eq!(value_number(Some(&json!(null))), Some(0.0));
        assert_eq!(value_number(Some(&json!("abc"))), None);
        assert_eq!(value_number(Some(&json!("NaN"))), None);
        assert_eq!(value_number(Some(&json!("Infinity"))), Some(f64::INFINITY));
        assert_eq!(value_number(Some(&json!("+Infinity"))), Some(f64::INFINITY));
        assert_eq!(value_number(Some(&json!(" -Infinity "))), Some(f64::NEG_INFINITY));
        assert_eq!(value_number(Some(&json!("inf"))), None);
        assert_eq!(value_number(Some(&json!("+inf"))), None);
        assert_eq!(value_number(Some(&json!("infinity"))), None);
        assert_eq!(value_number(Some(&json!("INFINITY"))), None);
        assert_eq!(value_number(Some(&json!("1e400"))), Some(f64::INFINITY));
        assert_eq!(value_number(None), None);
    }

    #[test]
    fn test_row_key() {
        let row = json!({"id": "soap-1", "title": "Soap"});
        assert_eq!(row_key(row.as_object().unwrap()), Some("soap-1".into()));
    }
}
