//! Filter a College Scorecard style institution dataset using the
//! developer-friendly names from its data dictionary, optionally restricted to
//! a radius around a ZIP code.

pub mod catalog;
pub mod config;
pub mod data;
pub mod dictionary;
pub mod error;
pub mod geo;
pub mod query;
pub mod report;

pub use catalog::Catalog;
pub use config::{DataPaths, OutputFormat, QueryConfig};
pub use data::filter::CompareOp;
pub use data::model::{Dataset, Row, Value};
pub use dictionary::{DataDictionary, DictionaryEntry};
pub use error::{Diagnostic, FilterSpecError};
pub use geo::{Coordinate, Gazetteer};
pub use query::{FilterSpec, QueryEngine, QueryOutcome, ResultRow};
