use std::collections::BTreeSet;

use super::result::{QueryOutcome, ResultRow};
use super::spec::{FilterSpec, ZipRadius};
use crate::data::filter::{Predicate, Term};
use crate::data::model::{Dataset, Row, Value};
use crate::dictionary::DataDictionary;
use crate::error::Diagnostic;
use crate::geo::{distance_miles, Gazetteer};

/// Dataset column holding each institution's postal code.
pub const DEFAULT_ZIP_FIELD: &str = "ZIP";

/// Compiles friendly-name filter specifications against a data dictionary and
/// evaluates them over a dataset.
pub struct QueryEngine<'a> {
    dictionary: &'a DataDictionary,
    gazetteer: &'a Gazetteer,
    zip_field: String,
}

impl<'a> QueryEngine<'a> {
    pub fn new(dictionary: &'a DataDictionary, gazetteer: &'a Gazetteer) -> Self {
        Self {
            dictionary,
            gazetteer,
            zip_field: DEFAULT_ZIP_FIELD.to_string(),
        }
    }

    pub fn with_zip_field(mut self, zip_field: impl Into<String>) -> Self {
        self.zip_field = zip_field.into();
        self
    }

    /// Translate every clause into a term on its raw variable.
    ///
    /// Keys missing from the dictionary are skipped with a diagnostic. String
    /// literals that name a category label of the variable are replaced by
    /// the label's code.
    pub fn compile(&self, spec: &FilterSpec) -> (Predicate, Vec<Diagnostic>) {
        let mut predicate = Predicate::default();
        let mut diagnostics = Vec::new();

        for (key, clause) in &spec.clauses {
            let Some(variable) = self.dictionary.variable_for(key) else {
                log::warn!("\"{key}\" not found in the data dictionary, ignoring it");
                diagnostics.push(Diagnostic::UnrecognizedFilterKey(key.clone()));
                continue;
            };

            let value = match clause.value() {
                Value::String(label) => self
                    .dictionary
                    .coded_value(variable, label)
                    .map(Value::from)
                    .unwrap_or_else(|| clause.value().clone()),
                other => other.clone(),
            };

            let term = Term::new(variable, clause.op(), value);
            log::debug!("{key}: {term}");
            predicate.push(term);
        }

        (predicate, diagnostics)
    }

    /// Run a query: conjunctive filter first, then the radius pass.
    pub fn run(&self, dataset: &Dataset, spec: &FilterSpec) -> QueryOutcome {
        let (predicate, mut diagnostics) = self.compile(spec);

        if predicate.is_empty() && spec.zip_radius.is_none() {
            log::warn!("query is empty, returning no rows");
            diagnostics.push(Diagnostic::EmptyPredicate);
            return QueryOutcome {
                rows: Vec::new(),
                diagnostics,
            };
        }

        let matched = predicate.filter(&dataset.rows);
        log::info!("{} of {} rows match \"{predicate}\"", matched.len(), dataset.len());

        let rows = match &spec.zip_radius {
            Some(zip_radius) => self.within_radius(matched, zip_radius, &mut diagnostics),
            None => matched.into_iter().cloned().map(ResultRow::new).collect(),
        };

        QueryOutcome { rows, diagnostics }
    }

    /// Keep rows within the radius, annotate their distance and sort nearest
    /// first. Ties keep dataset order.
    ///
    /// The cutoff compares the unrounded distance, so `distance_int <= radius`
    /// holds for integer radii only: 4.79 miles passes a 4.9 radius as 5.
    fn within_radius(
        &self,
        rows: Vec<&Row>,
        zip_radius: &ZipRadius,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<ResultRow> {
        let base_zip = zip5(&zip_radius.zip);
        let Some(base) = self.gazetteer.resolve(base_zip) else {
            log::warn!("base postal code \"{base_zip}\" not found in the gazetteer");
            diagnostics.push(Diagnostic::UnresolvableLocation(base_zip.to_string()));
            return Vec::new();
        };

        let mut unresolved = BTreeSet::new();
        let mut results = Vec::new();
        for row in rows {
            let zip = match row.get(&self.zip_field) {
                Value::Null => {
                    log::debug!("row without {} excluded from radius match", self.zip_field);
                    continue;
                }
                Value::String(s) => zip5(s).to_string(),
                other => zip5(&other.to_string()).to_string(),
            };
            let Some(coord) = self.gazetteer.resolve(&zip) else {
                unresolved.insert(zip);
                continue;
            };

            let miles = distance_miles(base, coord);
            if miles <= zip_radius.radius {
                // Half-way distances round to even, like numpy.
                results.push(ResultRow::with_distance(row.clone(), miles.round_ties_even() as i64));
            }
        }

        for zip in unresolved {
            log::warn!("postal code \"{zip}\" not found in the gazetteer, excluding its rows");
            diagnostics.push(Diagnostic::UnresolvableLocation(zip));
        }

        results.sort_by_key(|r| r.distance_int);
        log::info!(
            "{} rows within {} miles of {base_zip}",
            results.len(),
            zip_radius.radius
        );
        results
    }
}

/// The 5-digit part of a ZIP or ZIP+4 code.
fn zip5(zip: &str) -> &str {
    match zip.char_indices().nth(5) {
        Some((idx, _)) => &zip[..idx],
        None => zip,
    }
}
