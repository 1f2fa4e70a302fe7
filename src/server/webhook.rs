//! Parsing of the sensor-logger webhook envelope.
//!
//! Payloads look like `{"values": [{"name": "accelerometer_x", "value": 0.1}, ...]}`.
//! Some collectors send `accel_x` instead, and some send values as strings.

use serde_json::Value;
use thiserror::Error;

const COMPONENTS: [&str; 3] = ["accelerometer_x", "accelerometer_y", "accelerometer_z"];

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
    #[error("Invalid data format: expected an object with a 'values' array")]
    InvalidFormat,
    #[error("Missing accelerometer components: {}", .0.join(", "))]
    MissingComponents(Vec<&'static str>),
    #[error("Value of '{name}' is not a finite number: {value}")]
    NonNumeric { name: String, value: String },
}

impl IngestError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            IngestError::InvalidJson(_) => "invalid_json",
            IngestError::InvalidFormat => "invalid_format",
            IngestError::MissingComponents(_) => "missing_component",
            IngestError::NonNumeric { .. } => "non_numeric",
        }
    }
}

/// Lower-cases the name and rewrites the first `accel_` to `accelerometer_`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replacen("accel_", "accelerometer_", 1)
}

fn numeric_value(name: &str, value: &Value) -> Result<f64, IngestError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestError::NonNumeric {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Extracts the x, y and z components. Entries without a name or value and
/// entries for other sensors are ignored; a later entry for the same
/// component replaces an earlier one.
pub fn extract_components(payload: &Value) -> Result<[f64; 3], IngestError> {
    let entries = payload
        .get("values")
        .and_then(Value::as_array)
        .ok_or(IngestError::InvalidFormat)?;

    let mut found: [Option<f64>; 3] = [None; 3];
    for entry in entries {
        let name = entry.get("name").and_then(Value::as_str);
        let (Some(name), Some(value)) = (name, entry.get("value")) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let name = normalize_name(name);
        if let Some(slot) = COMPONENTS.iter().position(|c| *c == name) {
            found[slot] = Some(numeric_value(&name, value)?);
        }
    }

    match found {
        [Some(x), Some(y), Some(z)] => Ok([x, y, z]),
        _ => Err(IngestError::MissingComponents(
            COMPONENTS
                .iter()
                .zip(found.iter())
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect(),
        )),
    }
}

/// Parses a raw body. The returned value is echoed back to the caller on error.
pub fn parse_body(body: &[u8]) -> Result<Value, (IngestError, Value)> {
    serde_json::from_slice(body).map_err(|e| {
        (
            IngestError::InvalidJson(e.to_string()),
            Value::String(String::from_utf8_lossy(body).into_owned()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("Accel_X"), "accelerometer_x");
        assert_eq!(normalize_name("ACCELEROMETER_Y"), "accelerometer_y");
        assert_eq!(normalize_name("accel_accel_z"), "accelerometer_accel_z");
    }

    #[test]
    fn extracts_numbers_and_numeric_strings() {
        let payload = json!({"values": [
            {"name": "accel_x", "value": 0.3},
            {"name": "Accelerometer_Y", "value": "0.4"},
            {"name": "battery", "value": "full"},
            {"name": "accelerometer_z", "value": 1.2}
        ]});
        assert_eq!(extract_components(&payload), Ok([0.3, 0.4, 1.2]));
    }

    #[test]
    fn later_entries_win() {
        let payload = json!({"values": [
            {"name": "accelerometer_x", "value": 1.0},
            {"name": "accelerometer_y", "value": 1.0},
            {"name": "accelerometer_z", "value": 1.0},
            {"name": "accel_x", "value": 2.0}
        ]});
        assert_eq!(extract_components(&payload), Ok([2.0, 1.0, 1.0]));
    }

    #[test]
    fn reports_missing_components() {
        let payload = json!({"values": [
            {"name": "accelerometer_x", "value": 1.0},
            {"value": 3.0},
            {"name": "accelerometer_z"}
        ]});
        assert_eq!(
            extract_components(&payload),
            Err(IngestError::MissingComponents(vec![
                "accelerometer_y",
                "accelerometer_z"
            ]))
        );
    }

    #[test]
    fn rejects_bad_envelopes_and_values() {
        assert_eq!(
            extract_components(&json!({"data": []})),
            Err(IngestError::InvalidFormat)
        );
        assert_eq!(
            extract_components(&json!([1, 2, 3])),
            Err(IngestError::InvalidFormat)
        );

        let err = extract_components(&json!({"values": [
            {"name": "accelerometer_x", "value": "fast"}
        ]}))
        .unwrap_err();
        assert_eq!(err.reason(), "non_numeric");
    }

    #[test]
    fn invalid_json_is_echoed_as_text() {
        let (err, echoed) = parse_body(b"{not json").unwrap_err();
        assert_eq!(err.reason(), "invalid_json");
        assert_eq!(echoed, Value::String("{not json".to_string()));
        assert!(parse_body(br#"{"values": []}"#).is_ok());
    }
}
