use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::Value as JsonValue;

use crate::query::{DEFAULT_ZIP_FIELD, DISTANCE_INT};

pub const DEFAULT_DATA_FILE: &str = "datafiles/Most-Recent-Cohorts-Institution.csv";
pub const DEFAULT_DICTIONARY_FILE: &str = "datafiles/institution-data-dictionary.csv";
pub const DEFAULT_GAZETTEER_FILE: &str = "datafiles/Gaz_zcta_national.txt";

/// Columns printed when the caller does not choose any.
pub const DEFAULT_COLUMNS: [&str; 4] = ["INSTNM", "ADM_RATE", "SAT_AVG", DISTANCE_INT];

/// Where the three input tables live.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    pub data: PathBuf,
    pub dictionary: PathBuf,
    pub gazetteer: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_FILE),
            dictionary: PathBuf::from(DEFAULT_DICTIONARY_FILE),
            gazetteer: PathBuf::from(DEFAULT_GAZETTEER_FILE),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Everything one invocation needs besides the filter itself.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub paths: DataPaths,
    /// Dataset column holding postal codes; always loaded as text.
    pub zip_field: String,
    /// Columns shown in table output.
    pub columns: Vec<String>,
    pub format: OutputFormat,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            paths: DataPaths::default(),
            zip_field: DEFAULT_ZIP_FIELD.to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            format: OutputFormat::default(),
        }
    }
}

/// Read the filter JSON from an inline string or a file.
pub fn read_filter_json(inline: Option<&str>, file: Option<&Path>) -> Result<JsonValue> {
    let text = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading filter file {}", path.display()))?,
        (None, None) => anyhow::bail!("no filter given (use --filter or --filter-file)"),
    };
    serde_json::from_str(&text).context("parsing filter JSON")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_point_at_datafiles() {
        let config = QueryConfig::default();
        assert_eq!(config.paths.data, Path::new(DEFAULT_DATA_FILE));
        assert_eq!(config.zip_field, "ZIP");
        assert_eq!(config.columns, vec!["INSTNM", "ADM_RATE", "SAT_AVG", "distance_int"]);
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn inline_filter_takes_precedence() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let json = read_filter_json(Some(r#"{"ownership": "Public"}"#), Some(file.path())).unwrap();
        assert_eq!(json["ownership"], "Public");
    }

    #[test]
    fn filter_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"zip_radius": {{"zip": "60564", "radius": 100}}}}"#).unwrap();
        let json = read_filter_json(None, Some(file.path())).unwrap();
        assert_eq!(json["zip_radius"]["radius"], 100);
    }

    #[test]
    fn invalid_filters_are_errors() {
        assert!(read_filter_json(None, None).is_err());
        assert!(read_filter_json(Some("{not json"), None).is_err());
        let missing = Path::new("no/such/filter.json");
        let err = read_filter_json(None, Some(missing)).unwrap_err();
        assert!(err.to_string().contains("reading filter file"));
    }
}
