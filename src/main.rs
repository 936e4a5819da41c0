use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use cds_query::config::{
    read_filter_json, DataPaths, OutputFormat, QueryConfig, DEFAULT_DATA_FILE,
    DEFAULT_DICTIONARY_FILE, DEFAULT_GAZETTEER_FILE,
};
use cds_query::query::DEFAULT_ZIP_FIELD;
use cds_query::{report, Catalog, FilterSpec};

#[derive(Parser)]
#[command(about = "Filter institutions by data dictionary names and distance from a ZIP code.")]
struct Args {
    /// Institution dataset (.csv, .json or .parquet).
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    data: PathBuf,

    /// Data dictionary CSV.
    #[arg(long, default_value = DEFAULT_DICTIONARY_FILE)]
    dictionary: PathBuf,

    /// Tab-separated ZCTA gazetteer.
    #[arg(long, default_value = DEFAULT_GAZETTEER_FILE)]
    gazetteer: PathBuf,

    /// Filter specification as JSON, e.g.
    /// `{"ownership": "Public", "zip_radius": {"zip": "10001", "radius": 50}}`.
    #[arg(long, conflicts_with = "filter_file", required_unless_present = "filter_file")]
    filter: Option<String>,

    /// File containing the filter specification JSON.
    #[arg(long)]
    filter_file: Option<PathBuf>,

    /// Columns to print in table output.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "INSTNM,ADM_RATE,SAT_AVG,distance_int"
    )]
    columns: Vec<String>,

    /// Dataset column holding postal codes.
    #[arg(long, default_value = DEFAULT_ZIP_FIELD)]
    zip_column: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl Args {
    fn config(&self) -> QueryConfig {
        QueryConfig {
            paths: DataPaths {
                data: self.data.clone(),
                dictionary: self.dictionary.clone(),
                gazetteer: self.gazetteer.clone(),
            },
            zip_field: self.zip_column.clone(),
            columns: self.columns.clone(),
            format: self.format,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.config();

    let filter_json = read_filter_json(args.filter.as_deref(), args.filter_file.as_deref())?;
    let spec = FilterSpec::from_json(&filter_json)?;

    let catalog = Catalog::load(&config.paths, &config.zip_field)?;
    let outcome = catalog.query(&spec);

    for diagnostic in &outcome.diagnostics {
        eprintln!("Warning: {diagnostic}");
    }

    match config.format {
        OutputFormat::Table => {
            println!("filter:");
            println!("{}", serde_json::to_string_pretty(&filter_json)?);
            let columns =
                report::display_columns(&config.columns, &catalog.dataset.column_names, &outcome);
            println!("{}", report::render_table(&outcome, &columns)?);
        }
        OutputFormat::Json => println!("{}", report::render_json(&outcome)?),
    }

    Ok(())
}
