// Reader for the Excel (.xlsx) flavour of the vote dataset.

use calamine::{open_workbook, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use vote_growth::builder::coerce_votes;

use crate::report::io_common::locate_columns;
use crate::report::*;

pub fn read_votes_xlsx(path: &str) -> ReportResult<Vec<ParsedRow>> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let header = wrange.rows().next().context(EmptyExcelSnafu { path })?;
    debug!("read_votes_xlsx: header: {:?}", header);
    let header_names: Vec<Option<String>> = header.iter().map(cell_string).collect();
    let cols = locate_columns(&header_names, path)?;
    debug!("read_votes_xlsx: columns: {:?}", cols);

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<ParsedRow> = Vec::new();
    for row in iter {
        debug!("read_votes_xlsx: row: {:?}", row);
        let name = row
            .get(cols.name)
            .and_then(cell_string)
            .unwrap_or_default();
        let pr = ParsedRow {
            name,
            votes_cycle1: row.get(cols.cycle1).and_then(coerce_cell),
            votes_cycle2: row.get(cols.cycle2).and_then(coerce_cell),
            field_agent: cols
                .agent
                .and_then(|idx| row.get(idx))
                .and_then(cell_string),
        };
        res.push(pr);
    }
    Ok(res)
}

fn cell_string(cell: &calamine::DataType) -> Option<String> {
    match cell {
        calamine::DataType::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Permissive numeric reading of a cell. `None` stands for a malformed
/// or missing count and is coerced to zero downstream.
fn coerce_cell(cell: &calamine::DataType) -> Option<u64> {
    match cell {
        calamine::DataType::Int(i) if *i >= 0 => Some(*i as u64),
        calamine::DataType::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
        calamine::DataType::String(s) => coerce_votes(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_coercion() {
        assert_eq!(coerce_cell(&calamine::DataType::Int(1200)), Some(1200));
        assert_eq!(coerce_cell(&calamine::DataType::Float(500.0)), Some(500));
        assert_eq!(
            coerce_cell(&calamine::DataType::String("400".to_string())),
            Some(400)
        );
        assert_eq!(coerce_cell(&calamine::DataType::Empty), None);
        assert_eq!(coerce_cell(&calamine::DataType::Int(-3)), None);
        assert_eq!(coerce_cell(&calamine::DataType::Float(12.5)), None);
        assert_eq!(
            coerce_cell(&calamine::DataType::String("n/a".to_string())),
            None
        );
    }
}
