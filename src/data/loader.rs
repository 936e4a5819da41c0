use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Row, Value};
use crate::dictionary::DictionaryEntry;
use crate::geo::{Coordinate, Gazetteer};

/// Cell contents that a DataFrame reader treats as missing by default.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(s: &str) -> bool {
    MISSING_TOKENS.contains(&s)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Load the institution dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one institution per record
/// * `.json`    – `[{ "INSTNM": "...", "ZIP": "...", ... }, ...]`
/// * `.parquet` – one column per variable
///
/// Columns listed in `text_columns` are kept as text regardless of content,
/// so ZIP codes retain leading zeros and `+4` suffixes.
pub fn load_dataset(path: &Path, text_columns: &[String]) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let text_columns: BTreeSet<&str> = text_columns.iter().map(String::as_str).collect();
    let dataset = match ext.as_str() {
        "csv" => load_csv(path, &text_columns),
        "json" => load_json(path, &text_columns),
        "parquet" | "pq" => load_parquet(path, &text_columns),
        other => bail!("Unsupported dataset extension: .{other}"),
    }
    .with_context(|| format!("loading dataset {}", path.display()))?;

    log::info!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

fn load_csv(path: &Path, text_columns: &BTreeSet<&str>) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| {
                let value = if text_columns.contains(name.as_str()) {
                    text_cell(cell)
                } else {
                    guess_value_type(cell)
                };
                (name.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(headers, rows))
}

fn text_cell(s: &str) -> Value {
    if is_missing(s) {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

fn guess_value_type(s: &str) -> Value {
    if is_missing(s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path, text_columns: &BTreeSet<&str>) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Row::new();
        for (key, val) in obj {
            if seen.insert(key.clone()) {
                column_names.push(key.clone());
            }
            let value = json_to_value(val);
            let value = if text_columns.contains(key.as_str()) {
                as_text(value)
            } else {
                value
            };
            row.insert(key.clone(), value);
        }
        rows.push(row);
    }

    Ok(Dataset::new(column_names, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

fn as_text(value: Value) -> Value {
    match value {
        Value::Null | Value::String(_) => value,
        other => Value::String(other.to_string()),
    }
}

fn load_parquet(path: &Path, text_columns: &BTreeSet<&str>) -> Result<Dataset> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row_idx in 0..batch.num_rows() {
            let mut row = Row::new();
            for (col_idx, name) in column_names.iter().enumerate() {
                let value = extract_value(batch.column(col_idx), row_idx);
                let value = if text_columns.contains(name.as_str()) {
                    as_text(value)
                } else {
                    value
                };
                row.insert(name.clone(), value);
            }
            rows.push(row);
        }
    }

    Ok(Dataset::new(column_names, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        other => {
            log::debug!("unsupported parquet column type {other:?}, reading as null");
            Value::Null
        }
    }
}

// ---------------------------------------------------------------------------
// Data dictionary
// ---------------------------------------------------------------------------

const DICTIONARY_HEADERS: [&str; 4] = ["VARIABLE NAME", "developer-friendly name", "LABEL", "VALUE"];

#[derive(Debug, Deserialize)]
struct DictionaryRecord {
    #[serde(rename = "VARIABLE NAME")]
    variable_name: Option<String>,
    #[serde(rename = "developer-friendly name")]
    friendly_name: Option<String>,
    #[serde(rename = "LABEL")]
    label: Option<String>,
    #[serde(rename = "VALUE")]
    value: Option<String>,
}

fn present(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !is_missing(s))
}

/// Read the data dictionary in document order. Extra columns are ignored.
pub fn load_dictionary(path: &Path) -> Result<Vec<DictionaryEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening data dictionary {}", path.display()))?;
    let headers = reader.headers().context("reading data dictionary headers")?;
    for required in DICTIONARY_HEADERS {
        if !headers.iter().any(|h| h == required) {
            bail!(
                "data dictionary {} is missing the '{required}' column",
                path.display()
            );
        }
    }

    let mut entries = Vec::new();
    for (row_no, result) in reader.deserialize::<DictionaryRecord>().enumerate() {
        let record = result.with_context(|| format!("data dictionary row {row_no}"))?;
        entries.push(DictionaryEntry {
            variable_name: present(record.variable_name),
            friendly_name: present(record.friendly_name),
            label: present(record.label),
            value: present(record.value),
        });
    }

    log::info!("loaded {} data dictionary rows from {}", entries.len(), path.display());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Gazetteer
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GazetteerRecord {
    #[serde(rename = "GEOID")]
    geoid: String,
    #[serde(rename = "INTPTLAT")]
    latitude: f64,
    #[serde(rename = "INTPTLONG")]
    longitude: f64,
}

/// Read a tab-separated ZCTA gazetteer (`Gaz_zcta_national.txt`).
///
/// The Census files pad the last header with spaces, so headers and cells are
/// trimmed.
pub fn load_gazetteer(path: &Path) -> Result<Gazetteer> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening gazetteer {}", path.display()))?;

    let mut entries = Vec::new();
    for (row_no, result) in reader.deserialize::<GazetteerRecord>().enumerate() {
        let record = result.with_context(|| format!("gazetteer row {row_no}"))?;
        let code: u32 = record
            .geoid
            .parse()
            .with_context(|| format!("gazetteer row {row_no}: GEOID '{}'", record.geoid))?;
        entries.push((code, Coordinate::new(record.latitude, record.longitude)));
    }

    let gazetteer = Gazetteer::from_entries(entries);
    log::info!("loaded {} postal codes from {}", gazetteer.len(), path.display());
    Ok(gazetteer)
}
