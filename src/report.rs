//! Rendering query results for the terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::data::model::Value;
use crate::query::{QueryOutcome, DISTANCE_DISPLAY, DISTANCE_INT};

/// Keep the requested columns that exist, in the requested order.
///
/// Distance columns only exist when the query had a radius clause.
pub fn display_columns(
    requested: &[String],
    dataset_columns: &[String],
    outcome: &QueryOutcome,
) -> Vec<String> {
    let has_distance = outcome.rows.iter().any(|r| r.distance_int.is_some());
    requested
        .iter()
        .filter(|col| {
            let known = dataset_columns.iter().any(|c| c == *col)
                || (has_distance && matches!(col.as_str(), DISTANCE_INT | DISTANCE_DISPLAY));
            if !known {
                log::warn!("column {col:?} is not in the result, skipping it");
            }
            known
        })
        .cloned()
        .collect()
}

/// Render the selected columns as an ASCII table.
pub fn render_table(outcome: &QueryOutcome, columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        return Ok(format!("({} rows, no columns selected)", outcome.len()));
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|name| {
            let cells: Vec<Option<String>> = outcome
                .rows
                .iter()
                .map(|row| match row.get(name) {
                    Value::Null => None,
                    value => Some(value.to_string()),
                })
                .collect();
            Arc::new(StringArray::from(cells)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building result table")?;
    let table = pretty_format_batches(&[batch]).context("formatting result table")?;
    Ok(table.to_string())
}

/// Render every result row, distance annotations included, as a JSON array.
pub fn render_json(outcome: &QueryOutcome) -> Result<String> {
    serde_json::to_string_pretty(&outcome.rows).context("serializing results")
}
