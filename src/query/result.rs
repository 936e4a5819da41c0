use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::data::model::{Row, Value};
use crate::error::Diagnostic;

pub const DISTANCE_INT: &str = "distance_int";
pub const DISTANCE_DISPLAY: &str = "distance_display";

/// A matching dataset row, annotated with its distance when the query had a
/// radius clause. The source row itself is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub row: Row,
    /// Rounded miles from the radius clause's base postal code.
    pub distance_int: Option<i64>,
}

impl ResultRow {
    pub fn new(row: Row) -> Self {
        Self {
            row,
            distance_int: None,
        }
    }

    pub fn with_distance(row: Row, distance_int: i64) -> Self {
        Self {
            row,
            distance_int: Some(distance_int),
        }
    }

    pub fn distance_display(&self) -> Option<String> {
        self.distance_int.map(|miles| format!("{miles} miles"))
    }

    /// Look up a source field or one of the computed distance fields.
    pub fn get(&self, field: &str) -> Value {
        match field {
            DISTANCE_INT if !self.row.contains(field) => {
                self.distance_int.map_or(Value::Null, Value::Integer)
            }
            DISTANCE_DISPLAY if !self.row.contains(field) => {
                self.distance_display().map_or(Value::Null, Value::String)
            }
            _ => self.row.get(field).clone(),
        }
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.row.fields() {
            map.serialize_entry(name, value)?;
        }
        if let Some(miles) = self.distance_int {
            map.serialize_entry(DISTANCE_INT, &miles)?;
            map.serialize_entry(DISTANCE_DISPLAY, &format!("{miles} miles"))?;
        }
        map.end()
    }
}

/// Rows matching a query plus everything that was skipped or excluded on the
/// way.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub rows: Vec<ResultRow>,
    pub diagnostics: Vec<Diagnostic>,
}

impl QueryOutcome {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
