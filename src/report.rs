use log::{info, warn};

use vote_growth::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::cache::SourceCache;

pub mod cache;
pub mod geo;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod render;

/// The data file used when --data is not passed. It is the file written
/// by the companion simulation script.
pub const DEFAULT_DATA_FILE: &str = "base_de_dados_eleitoral.xlsx";

// Expected column headers of the vote spreadsheet.
pub const COL_NAME: &str = "Municipio";
pub const COL_CYCLE1: &str = "Votos_2022";
pub const COL_CYCLE2: &str = "Votos_2026";
pub const COL_AGENT: &str = "Cabo_Eleitoral";

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display(
        "Data file '{path}' not found! Generate it first with the simulation script (gerar_simulacao.py) or point --data at an existing spreadsheet."
    ))]
    MissingDataFile { path: String },

    #[snafu(display("Error opening spreadsheet {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no rows"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line in {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display("Missing required column '{column}' in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Unsupported input type '{input_type}' (expected 'xlsx' or 'csv')"))]
    UnsupportedInputType { input_type: String },

    #[snafu(display("Could not build the HTTP client"))]
    GeoClient { source: reqwest::Error },
    #[snafu(display("Error fetching the boundary dataset from {url}"))]
    GeoFetch { source: reqwest::Error, url: String },
    #[snafu(display("The boundary dataset has no 'features' collection"))]
    GeoShape {},

    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The computed summary differs from the reference summary"))]
    ReferenceMismatch {},

    #[snafu(display("Could not build the dashboard: {source}"))]
    Analysis { source: AnalysisErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// A row of the vote spreadsheet, as parsed by the readers.
///
/// This is before the coercion policy is applied: a vote cell that
/// could not be understood is `None` here and becomes 0 downstream.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRow {
    pub name: String,
    pub votes_cycle1: Option<u64>,
    pub votes_cycle2: Option<u64>,
    pub field_agent: Option<String>,
}

/// Applies the coercion policy and derives the cached join keys.
///
/// Malformed numeric cells are absorbed into a zero count; each one is
/// logged so that data-quality issues stay auditable. Rows without a
/// municipality name are dropped.
pub fn validate_rows(rows: &[ParsedRow]) -> Vec<VoteRecord> {
    let mut res: Vec<VoteRecord> = Vec::new();
    for row in rows.iter() {
        let name = row.name.trim();
        if name.is_empty() {
            warn!("validate_rows: dropping a row with an empty municipality name");
            continue;
        }
        let v1 = coerce_or_log(name, COL_CYCLE1, row.votes_cycle1);
        let v2 = coerce_or_log(name, COL_CYCLE2, row.votes_cycle2);
        let agent = row.field_agent.clone().unwrap_or_default();
        res.push(VoteRecord::new(name, v1, v2, agent.trim()));
    }
    res
}

fn coerce_or_log(name: &str, column: &str, value: Option<u64>) -> u64 {
    match value {
        Some(v) => v,
        None => {
            warn!(
                "validate_rows: malformed {} cell for {:?}, coercing to 0",
                column, name
            );
            0
        }
    }
}

/// Reads the vote dataset, selecting the provider from the explicit
/// input type or the file extension.
pub fn load_votes(path: &str, input_type: Option<&str>) -> ReportResult<Vec<VoteRecord>> {
    let provider = match input_type {
        Some(t) => t.to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase(),
    };
    info!("Attempting to read vote file {:?} (provider {:?})", path, provider);
    let rows = match provider.as_str() {
        "xlsx" => io_xlsx::read_votes_xlsx(path),
        "csv" => io_csv::read_votes_csv(path),
        x => UnsupportedInputTypeSnafu { input_type: x }.fail(),
    }?;
    Ok(validate_rows(&rows))
}

fn view_options(args: &Args) -> ReportResult<ViewOptions> {
    let map_metric = match args.map_metric.as_deref() {
        None => ViewOptions::DEFAULT.map_metric,
        Some(s) => match MapMetric::parse(s) {
            Some(m) => m,
            None => whatever!("Unknown map metric: {:?}", s),
        },
    };
    let chart_kind = match args.chart.as_deref() {
        None => ViewOptions::DEFAULT.chart_kind,
        Some(s) => match ChartKind::parse(s) {
            Some(k) => k,
            None => whatever!("Unknown chart type: {:?}", s),
        },
    };
    Ok(ViewOptions {
        map_metric,
        chart_kind,
        map_agents_only: args.map_agents_only,
        table_agents_only: args.table_agents_only,
    })
}

fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Runs the whole dashboard pass: load, join, derive, render.
///
/// The boundary fetch is the only degradable step; everything else is
/// fatal. Both sources go through a read-through cache keyed by their
/// identity, so no source is read twice in one pass however many
/// renderers consume it.
pub fn run_report(args: &Args) -> ReportResult<()> {
    let data_path = args
        .data
        .clone()
        .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
    ensure!(
        Path::new(&data_path).exists(),
        MissingDataFileSnafu { path: data_path.clone() }
    );

    let options = view_options(args)?;

    let mut votes_cache: SourceCache<Vec<VoteRecord>> = SourceCache::new();
    let records = votes_cache.get_or_load(&data_path, || {
        load_votes(&data_path, args.input_type.as_deref())
    })?;
    info!("Loaded {:?} records from {:?}", records.len(), data_path);

    let mut geo_cache: SourceCache<geo::GeoData> = SourceCache::new();
    let geo_data = if args.no_map {
        None
    } else {
        let url = args
            .geo_url
            .clone()
            .unwrap_or_else(|| geo::DEFAULT_GEO_URL.to_string());
        match geo_cache.get_or_load(&url, || geo::load_boundaries(&url)) {
            Ok(g) => Some(g),
            Err(e) => {
                // Degraded mode: the rest of the dashboard still renders.
                warn!("Boundary fetch failed: {}", e);
                eprintln!(
                    "Could not load the map boundaries ({}). Rendering without the map section.",
                    e
                );
                None
            }
        }
    };

    let regions = geo_data.map(|g| g.regions.as_slice());
    let model = build_dashboard(records, regions, &options).context(AnalysisSnafu {})?;

    println!("{}", render::render_text(&model));

    if let Some(html_path) = &args.html {
        let page = render::render_html(&model, geo_data.map(|g| &g.collection));
        fs::write(html_path, page).context(WritingOutputSnafu { path: html_path })?;
        info!("Wrote the HTML page to {:?}", html_path);
    }

    let summary = render::summary_json(&data_path, &options, &model);
    let pretty_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    if let Some(out) = &args.out {
        if out == "stdout" {
            println!("{}", pretty_summary);
        } else {
            fs::write(out, &pretty_summary).context(WritingOutputSnafu { path: out })?;
            info!("Wrote the JSON summary to {:?}", out);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path)?;
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_ref != pretty_summary {
            warn!("Found differences with the reference summary");
            print_diff(pretty_ref.as_str(), pretty_summary.as_ref(), "\n");
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_policy_on_rows() {
        let rows = vec![
            ParsedRow {
                name: "Niterói".to_string(),
                votes_cycle1: Some(1000),
                votes_cycle2: None,
                field_agent: Some("Agent A".to_string()),
            },
            ParsedRow {
                name: "Maricá".to_string(),
                votes_cycle1: Some(500),
                votes_cycle2: Some(400),
                field_agent: None,
            },
            ParsedRow {
                name: "".to_string(),
                votes_cycle1: Some(1),
                votes_cycle2: Some(2),
                field_agent: None,
            },
        ];
        let records = validate_rows(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].votes_cycle2, 0);
        assert_eq!(records[0].key, "NITEROI");
        assert_eq!(records[0].field_agent, "Agent A");
        assert_eq!(records[1].field_agent, "");
    }

    #[test]
    fn unsupported_provider_is_an_error() {
        let res = load_votes("votes.parquet", None);
        assert!(matches!(
            res,
            Err(ReportError::UnsupportedInputType { .. })
        ));
    }

    #[test]
    fn missing_file_message_names_the_file() {
        let err = MissingDataFileSnafu {
            path: "base_de_dados_eleitoral.xlsx".to_string(),
        }
        .build();
        let msg = format!("{}", err);
        assert!(msg.contains("base_de_dados_eleitoral.xlsx"));
        assert!(msg.contains("gerar_simulacao.py"));
    }
}
