use crate::ingest::error::{RowError, ShapeError};
use serde_json::Value;

const PREVIEW_CHARS: usize = 200;

/// One row of the CoinGlass RHODL series after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RhodlRow {
    pub timestamp_ms: i64,
    pub rhodl_ratio: f64,
    pub price: Option<f64>,
}

impl RhodlRow {
    /// Validate a raw JSON row. `timestamp` and `rhodl_ratio` are required; `price` may be
    /// absent or null. Numeric strings are accepted for all three.
    pub fn from_value(index: usize, raw: &Value) -> Result<Self, RowError> {
        let obj = raw.as_object().ok_or_else(|| RowError {
            index,
            field: "<row>",
            detail: format!("expected an object, got {}", type_name(raw)),
        })?;

        let timestamp_ms = match obj.get("timestamp") {
            None | Some(Value::Null) => return Err(missing(index, "timestamp")),
            Some(v) => as_i64(v).ok_or_else(|| malformed(index, "timestamp", v))?,
        };

        let rhodl_ratio = match obj.get("rhodl_ratio") {
            None | Some(Value::Null) => return Err(missing(index, "rhodl_ratio")),
            Some(v) => as_f64(v).ok_or_else(|| malformed(index, "rhodl_ratio", v))?,
        };

        let price = match obj.get("price") {
            None | Some(Value::Null) => None,
            Some(v) => Some(as_f64(v).ok_or_else(|| malformed(index, "price", v))?),
        };

        Ok(Self {
            timestamp_ms,
            rhodl_ratio,
            price,
        })
    }
}

/// Extract the `data` rows from the API document.
///
/// A `code` other than `"0"` means CoinGlass answered with an application-level error even
/// though HTTP succeeded.
pub fn parse_envelope(raw: Value) -> Result<Vec<Value>, ShapeError> {
    let mut obj = match raw {
        Value::Object(obj) => obj,
        other => return Err(shape_error("document is not an object", &other)),
    };

    if let Some(code) = obj.get("code") {
        let ok = match code {
            Value::String(s) => s == "0",
            Value::Number(n) => n.as_i64() == Some(0),
            _ => false,
        };
        if !ok {
            let msg = obj
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            let detail = format!("api code {code}: {msg}");
            return Err(shape_error(&detail, &Value::Object(obj)));
        }
    }

    match obj.remove("data") {
        Some(Value::Array(rows)) => Ok(rows),
        Some(other) => {
            let detail = format!("`data` is {}, expected an array", type_name(&other));
            obj.insert("data".to_string(), other);
            Err(shape_error(&detail, &Value::Object(obj)))
        }
        None => Err(shape_error("missing `data`", &Value::Object(obj))),
    }
}

fn shape_error(detail: &str, doc: &Value) -> ShapeError {
    ShapeError {
        detail: detail.to_string(),
        preview: doc.to_string().chars().take(PREVIEW_CHARS).collect(),
    }
}

fn missing(index: usize, field: &'static str) -> RowError {
    RowError {
        index,
        field,
        detail: "is missing".to_string(),
    }
}

fn malformed(index: usize, field: &'static str, v: &Value) -> RowError {
    RowError {
        index,
        field,
        detail: format!("is not numeric: {v}"),
    }
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
