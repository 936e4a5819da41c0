use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::data::filter::CompareOp;
use crate::data::model::Value;
use crate::error::FilterSpecError;

/// Reserved filter key for the distance clause.
pub const ZIP_RADIUS_KEY: &str = "zip_radius";

/// A filter on one friendly field.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// A bare literal: `"ownership": "Public"`.
    Equals(Value),
    /// `{"op": ">=", "value": 1200}`.
    Compare(CompareOp, Value),
}

impl Clause {
    pub fn op(&self) -> CompareOp {
        match self {
            Clause::Equals(_) => CompareOp::Eq,
            Clause::Compare(op, _) => *op,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Clause::Equals(v) | Clause::Compare(_, v) => v,
        }
    }
}

/// Restrict results to institutions within `radius` miles of `zip`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZipRadius {
    pub zip: String,
    pub radius: f64,
}

/// A decoded filter specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub clauses: Vec<(String, Clause)>,
    pub zip_radius: Option<ZipRadius>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((key.into(), Clause::Equals(value.into())));
        self
    }

    pub fn compare(mut self, key: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.clauses
            .push((key.into(), Clause::Compare(op, value.into())));
        self
    }

    pub fn within(mut self, zip: impl Into<String>, radius: f64) -> Self {
        self.zip_radius = Some(ZipRadius {
            zip: zip.into(),
            radius,
        });
        self
    }

    /// Decode a caller-supplied JSON object.
    ///
    /// ```json
    /// {
    ///   "ownership": "Public",
    ///   "sat_scores.average.overall": {"op": ">=", "value": 1200},
    ///   "zip_radius": {"zip": "60564", "radius": 100}
    /// }
    /// ```
    pub fn from_json(json: &JsonValue) -> Result<Self, FilterSpecError> {
        let obj = json
            .as_object()
            .ok_or_else(|| FilterSpecError::NotAnObject(json_kind(json)))?;

        let mut spec = FilterSpec::new();
        for (key, raw) in obj {
            if key == ZIP_RADIUS_KEY {
                spec.zip_radius = Some(decode_zip_radius(raw)?);
            } else {
                spec.clauses.push((key.clone(), decode_clause(key, raw)?));
            }
        }
        Ok(spec)
    }
}

fn decode_clause(key: &str, raw: &JsonValue) -> Result<Clause, FilterSpecError> {
    let Some(obj) = raw.as_object() else {
        return Ok(Clause::Equals(decode_literal(key, raw)?));
    };

    let op = match obj.get("op").or_else(|| obj.get("operator")) {
        None => CompareOp::Eq,
        Some(JsonValue::String(s)) => {
            CompareOp::parse(s).ok_or_else(|| FilterSpecError::UnknownOperator {
                key: key.to_string(),
                op: s.clone(),
            })?
        }
        Some(other) => {
            return Err(FilterSpecError::UnknownOperator {
                key: key.to_string(),
                op: other.to_string(),
            })
        }
    };
    let value = obj.get("value").ok_or_else(|| FilterSpecError::MissingValue {
        key: key.to_string(),
    })?;
    Ok(Clause::Compare(op, decode_literal(key, value)?))
}

fn decode_literal(key: &str, raw: &JsonValue) -> Result<Value, FilterSpecError> {
    match raw {
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Integer(i)),
            (None, Some(f)) => Ok(Value::Float(f)),
            (None, None) => Err(FilterSpecError::UnsupportedValue {
                key: key.to_string(),
                kind: "out-of-range number",
            }),
        },
        other => Err(FilterSpecError::UnsupportedValue {
            key: key.to_string(),
            kind: json_kind(other),
        }),
    }
}

fn decode_zip_radius(raw: &JsonValue) -> Result<ZipRadius, FilterSpecError> {
    let zip_radius = ZipRadius::deserialize(raw)
        .map_err(|e| FilterSpecError::InvalidZipRadius(e.to_string()))?;
    if !zip_radius.radius.is_finite() || zip_radius.radius < 0.0 {
        return Err(FilterSpecError::InvalidZipRadius(format!(
            "radius must be a non-negative number, got {}",
            zip_radius.radius
        )));
    }
    Ok(zip_radius)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
