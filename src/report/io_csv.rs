// Reader for the CSV flavour of the vote dataset.

use log::debug;
use snafu::{OptionExt, ResultExt};

use vote_growth::builder::coerce_votes;

use crate::report::io_common::locate_columns;
use crate::report::*;

pub fn read_votes_csv(path: &str) -> ReportResult<Vec<ParsedRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header = records
        .next()
        .context(EmptyExcelSnafu { path })?
        .context(CsvLineParseSnafu { path })?;
    let header_names: Vec<Option<String>> = header
        .iter()
        .map(|s| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        })
        .collect();
    let cols = locate_columns(&header_names, path)?;
    debug!("read_votes_csv: columns: {:?}", cols);

    let mut res: Vec<ParsedRow> = Vec::new();
    for line_r in records {
        let line = line_r.context(CsvLineParseSnafu { path })?;
        debug!("read_votes_csv: line: {:?}", line);
        let pr = ParsedRow {
            name: line.get(cols.name).unwrap_or("").to_string(),
            votes_cycle1: line.get(cols.cycle1).and_then(coerce_votes),
            votes_cycle2: line.get(cols.cycle2).and_then(coerce_votes),
            field_agent: cols
                .agent
                .and_then(|idx| line.get(idx))
                .map(|s| s.to_string()),
        };
        res.push(pr);
    }
    Ok(res)
}
