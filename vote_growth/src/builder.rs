pub use crate::config::*;
use crate::{normalize_key, VoteRecord};

use log::warn;

/// A builder for assembling the vote dataset from possibly malformed
/// tabular input.
///
/// Numeric cells are parsed permissively: a cell that cannot be read
/// as a non-negative count is coerced to zero instead of failing, and
/// a missing field agent becomes the empty string.
///
/// ```
/// pub use vote_growth::builder::Builder;
///
/// let mut builder = Builder::new();
/// builder.add_row_text("Niterói", "1000", "1200", Some("Agent A"));
/// builder.add_row_text("Maricá", "500", "", None);
///
/// let records = builder.records();
/// assert_eq!(records[0].key, "NITEROI");
/// assert_eq!(records[1].votes_cycle2, 0);
/// assert_eq!(records[1].field_agent, "");
/// ```
#[derive(Default)]
pub struct Builder {
    pub(crate) _records: Vec<VoteRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _records: Vec::new(),
        }
    }

    /// Adds a record with already-validated counts.
    pub fn add_record(&mut self, name: &str, votes_cycle1: u64, votes_cycle2: u64, agent: &str) {
        self._records
            .push(VoteRecord::new(name, votes_cycle1, votes_cycle2, agent));
    }

    /// Adds a record from free-text cells, applying the coercion
    /// policy. Rows with an empty municipality name are dropped.
    pub fn add_row_text(
        &mut self,
        name: &str,
        votes_cycle1: &str,
        votes_cycle2: &str,
        agent: Option<&str>,
    ) {
        let name = name.trim();
        if name.is_empty() {
            warn!("add_row_text: dropping a row with an empty municipality name");
            return;
        }
        let v1 = coerce_or_zero(name, "votes_cycle1", coerce_votes(votes_cycle1));
        let v2 = coerce_or_zero(name, "votes_cycle2", coerce_votes(votes_cycle2));
        self.add_record(name, v1, v2, agent.unwrap_or(""));
    }

    pub fn records(self) -> Vec<VoteRecord> {
        self._records
    }

    /// The join keys of all the records added so far.
    pub fn keys(&self) -> Vec<String> {
        self._records.iter().map(|r| r.key.clone()).collect()
    }
}

/// Parses a free-text vote count. Accepts integers and floats with a
/// zero fractional part; anything else (including negative values) is
/// rejected.
pub fn coerce_votes(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
        _ => None,
    }
}

fn coerce_or_zero(name: &str, column: &str, value: Option<u64>) -> u64 {
    match value {
        Some(v) => v,
        None => {
            // Logged for data-quality auditing: the page itself absorbs
            // malformed cells into a zero count.
            warn!(
                "coerce_or_zero: malformed {} cell for {:?} ({:?}), using 0",
                column,
                name,
                normalize_key(name)
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_accepts_integers_and_round_floats() {
        assert_eq!(coerce_votes("1200"), Some(1200));
        assert_eq!(coerce_votes(" 1200 "), Some(1200));
        assert_eq!(coerce_votes("1200.0"), Some(1200));
    }

    #[test]
    fn coercion_rejects_malformed_cells() {
        assert_eq!(coerce_votes(""), None);
        assert_eq!(coerce_votes("abc"), None);
        assert_eq!(coerce_votes("-5"), None);
        assert_eq!(coerce_votes("12.5"), None);
    }

    #[test]
    fn malformed_cells_become_zero_not_errors() {
        let mut builder = Builder::new();
        builder.add_row_text("Niterói", "1000", "", Some("Agent A"));
        builder.add_row_text("Maricá", "n/a", "400", None);
        let records = builder.records();
        assert_eq!(records[0].votes_cycle2, 0);
        assert_eq!(records[1].votes_cycle1, 0);
        assert_eq!(records[1].votes_cycle2, 400);
    }

    #[test]
    fn empty_names_are_dropped() {
        let mut builder = Builder::new();
        builder.add_row_text("  ", "1", "2", None);
        builder.add_row_text("Niterói", "1", "2", None);
        assert_eq!(builder.keys(), vec!["NITEROI".to_string()]);
    }
}
