use anyhow::Result;

use crate::config::DataPaths;
use crate::data::loader::{load_dataset, load_dictionary, load_gazetteer};
use crate::data::model::Dataset;
use crate::dictionary::DataDictionary;
use crate::geo::Gazetteer;
use crate::query::{FilterSpec, QueryEngine, QueryOutcome, DEFAULT_ZIP_FIELD};

// ---------------------------------------------------------------------------
// Catalog: the three input tables for one query session
// ---------------------------------------------------------------------------

/// Loaded, read-only inputs. Nothing is cached between processes; a caller
/// that wants to reuse tables across queries keeps the `Catalog` around.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub dataset: Dataset,
    pub dictionary: DataDictionary,
    pub gazetteer: Gazetteer,
    zip_field: String,
}

impl Catalog {
    pub fn new(dataset: Dataset, dictionary: DataDictionary, gazetteer: Gazetteer) -> Self {
        Self {
            dataset,
            dictionary,
            gazetteer,
            zip_field: DEFAULT_ZIP_FIELD.to_string(),
        }
    }

    pub fn with_zip_field(mut self, zip_field: impl Into<String>) -> Self {
        self.zip_field = zip_field.into();
        self
    }

    /// Read all three tables eagerly.
    pub fn load(paths: &DataPaths, zip_field: &str) -> Result<Self> {
        let dataset = load_dataset(&paths.data, &[zip_field.to_string()])?;
        let entries = load_dictionary(&paths.dictionary)?;
        let dictionary = DataDictionary::build(&entries);
        let gazetteer = load_gazetteer(&paths.gazetteer)?;

        Ok(Self::new(dataset, dictionary, gazetteer).with_zip_field(zip_field))
    }

    pub fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.dictionary, &self.gazetteer).with_zip_field(self.zip_field.as_str())
    }

    pub fn query(&self, spec: &FilterSpec) -> QueryOutcome {
        self.engine().run(&self.dataset, spec)
    }

    pub fn zip_field(&self) -> &str {
        &self.zip_field
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::data::model::Value;

    #[test]
    fn loads_tables_and_answers_queries() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths {
            data: dir.path().join("colleges.csv"),
            dictionary: dir.path().join("dict.csv"),
            gazetteer: dir.path().join("gaz.txt"),
        };
        fs::write(
            &paths.data,
            "INSTNM,CONTROL,POSTAL\nAlpha,1,01002\nBeta,2,01003\nGamma,1,01001-0001\n",
        )
        .unwrap();
        fs::write(
            &paths.dictionary,
            "VARIABLE NAME,developer-friendly name,LABEL,VALUE\n\
             CONTROL,ownership,Public,1\n\
             ,,Private nonprofit,2\n",
        )
        .unwrap();
        fs::write(
            &paths.gazetteer,
            "GEOID\tINTPTLAT\tINTPTLONG\n01001\t42.062368\t-72.625754\n01002\t42.364061\t-72.458739\n",
        )
        .unwrap();

        let catalog = Catalog::load(&paths, "POSTAL").unwrap();
        assert_eq!(catalog.zip_field(), "POSTAL");
        assert_eq!(catalog.dataset.rows[0].get("POSTAL"), &Value::from("01002"));

        let outcome = catalog.query(&FilterSpec::new().equals("ownership", "Public").within("01001", 30.0));
        let names: Vec<String> = outcome.rows.iter().map(|r| r.get("INSTNM").to_string()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha"]);
        assert_eq!(outcome.rows[0].distance_int, Some(0));
    }
}
