//! Data dictionary translation: friendly field names → raw variable names, and
//! friendly category labels → raw coded values.

use std::collections::BTreeMap;

use crate::data::model::Value;

/// One physical row of the data dictionary.
///
/// Multi-line dictionary records leave `variable_name` and `friendly_name`
/// blank on continuation rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictionaryEntry {
    pub variable_name: Option<String>,
    pub friendly_name: Option<String>,
    pub label: Option<String>,
    pub value: Option<String>,
}

/// A raw code for a categorical label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodedValue {
    Integer(i64),
    /// Codes that are not integers are kept verbatim.
    Text(String),
}

impl CodedValue {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(i) => CodedValue::Integer(i),
            Err(_) => CodedValue::Text(raw.to_string()),
        }
    }
}

impl From<&CodedValue> for Value {
    fn from(code: &CodedValue) -> Self {
        match code {
            CodedValue::Integer(i) => Value::Integer(*i),
            CodedValue::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Lookup tables derived from the data dictionary.
#[derive(Debug, Clone, Default)]
pub struct DataDictionary {
    friendly_to_variable: BTreeMap<String, String>,
    label_to_value: BTreeMap<String, BTreeMap<String, CodedValue>>,
}

impl DataDictionary {
    /// Build both lookup tables from dictionary rows in document order.
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a DictionaryEntry>) -> Self {
        let mut dict = DataDictionary::default();
        let mut last_variable: Option<&str> = None;
        let mut last_friendly: Option<&str> = None;

        for entry in entries {
            if let (Some(friendly), Some(variable)) = (&entry.friendly_name, &entry.variable_name) {
                dict.friendly_to_variable
                    .insert(friendly.clone(), variable.clone());
            }

            if entry.variable_name.is_some() {
                last_variable = entry.variable_name.as_deref();
            }
            if entry.friendly_name.is_some() {
                last_friendly = entry.friendly_name.as_deref();
            }

            let (Some(label), Some(raw)) = (&entry.label, &entry.value) else {
                continue;
            };
            let Some(variable) = last_variable else {
                log::debug!(
                    "dictionary label {label:?} (friendly name {last_friendly:?}) has no variable, skipping"
                );
                continue;
            };
            dict.label_to_value
                .entry(variable.to_string())
                .or_default()
                .insert(label.clone(), CodedValue::parse(raw));
        }

        log::info!(
            "data dictionary: {} friendly names, {} coded variables",
            dict.friendly_to_variable.len(),
            dict.label_to_value.len()
        );
        dict
    }

    /// Raw variable name for a friendly field name.
    pub fn variable_for(&self, friendly_name: &str) -> Option<&str> {
        self.friendly_to_variable
            .get(friendly_name)
            .map(String::as_str)
    }

    /// Raw code for a label of a raw variable.
    pub fn coded_value(&self, variable_name: &str, label: &str) -> Option<&CodedValue> {
        self.label_to_value.get(variable_name)?.get(label)
    }
}
