// Helpers shared by the tabular readers.

use std::collections::HashMap;

use log::debug;
use snafu::OptionExt;

use crate::report::*;

/// Index positions of the dataset columns inside a header row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnMap {
    pub name: usize,
    pub cycle1: usize,
    pub cycle2: usize,
    /// The field-agent column is optional in the source.
    pub agent: Option<usize>,
}

/// Given the header of a file (names of each of the columns), finds
/// the position of every dataset column. The three vote columns are
/// required; the agent column may be absent.
pub fn locate_columns(header: &[Option<String>], path: &str) -> ReportResult<ColumnMap> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_string(), idx)))
        .collect();
    debug!("locate_columns: col_names: {:?}", col_names);

    let required = |column: &str| -> ReportResult<usize> {
        col_names
            .get(column)
            .cloned()
            .context(MissingColumnSnafu { column, path })
    };

    Ok(ColumnMap {
        name: required(COL_NAME)?,
        cycle1: required(COL_CYCLE1)?,
        cycle2: required(COL_CYCLE2)?,
        agent: col_names.get(COL_AGENT).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<Option<String>> {
        names.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn columns_found_in_any_order() {
        let h = header(&["Cabo_Eleitoral", "Votos_2026", "Municipio", "Votos_2022"]);
        let cols = locate_columns(&h, "votes.xlsx").unwrap();
        assert_eq!(
            cols,
            ColumnMap {
                name: 2,
                cycle1: 3,
                cycle2: 1,
                agent: Some(0),
            }
        );
    }

    #[test]
    fn agent_column_is_optional() {
        let h = header(&["Municipio", "Votos_2022", "Votos_2026"]);
        let cols = locate_columns(&h, "votes.xlsx").unwrap();
        assert_eq!(cols.agent, None);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let h = header(&["Municipio", "Votos_2022"]);
        let res = locate_columns(&h, "votes.xlsx");
        assert!(matches!(
            res,
            Err(ReportError::MissingColumn { ref column, .. }) if column == "Votos_2026"
        ));
    }
}
