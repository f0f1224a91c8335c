pub mod builder;
mod config;
use log::{debug, info, warn};

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

pub use crate::config::*;

/// Number of entries in the gains and losses tables.
const TOP_RANKED: usize = 5;

/// Number of municipalities kept in the bar chart.
const CHART_TOP: usize = 20;

/// Half-width, in percentage points, of the band around zero growth
/// that is treated as flat.
const GROWTH_DEADBAND: f64 = 0.01;

/// Derives the canonical join key of a free-text municipality name.
///
/// The name is NFKD-decomposed, every non-ASCII scalar is dropped and
/// the remainder is uppercased. The same function must be applied to
/// names coming from the vote dataset and from the boundary dataset,
/// otherwise the join silently drops regions from the map.
///
/// ```
/// use vote_growth::normalize_key;
///
/// assert_eq!(normalize_key("São Gonçalo"), "SAO GONCALO");
/// assert_eq!(normalize_key("SAO GONCALO"), "SAO GONCALO");
/// ```
pub fn normalize_key(name: &str) -> String {
    name.nfkd()
        .filter(|c| c.is_ascii())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// One row of the vote dataset: a municipality with its vote counts
/// for the two cycles.
///
/// The join key is computed once at construction and cached on the
/// record; the growth metrics are cheap and derived on demand.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRecord {
    pub name: String,
    /// Cached [normalize_key] of `name`.
    pub key: String,
    pub votes_cycle1: u64,
    pub votes_cycle2: u64,
    /// Empty string when no field agent covers this municipality.
    pub field_agent: String,
}

impl VoteRecord {
    pub fn new(name: &str, votes_cycle1: u64, votes_cycle2: u64, field_agent: &str) -> VoteRecord {
        VoteRecord {
            name: name.to_string(),
            key: normalize_key(name),
            votes_cycle1,
            votes_cycle2,
            field_agent: field_agent.to_string(),
        }
    }

    /// Exact vote difference between the two cycles.
    pub fn growth_absolute(&self) -> i64 {
        self.votes_cycle2 as i64 - self.votes_cycle1 as i64
    }

    /// Relative growth in percentage points.
    ///
    /// A zero first-cycle count is replaced by 1 in the denominator,
    /// so the value equals `growth_absolute * 100` for such records.
    /// This is a documented approximation, not a true ratio.
    pub fn growth_percent(&self) -> f64 {
        let denom = self.votes_cycle1.max(1) as f64;
        (self.growth_absolute() as f64) / denom * 100.0
    }

    pub fn has_field_agent(&self) -> bool {
        !self.field_agent.is_empty()
    }

    fn metric_value(&self, metric: MapMetric) -> f64 {
        match metric {
            MapMetric::GrowthPercent => self.growth_percent(),
            MapMetric::VotesCycle2 => self.votes_cycle2 as f64,
            MapMetric::VotesCycle1 => self.votes_cycle1 as f64,
            MapMetric::GrowthAbsolute => self.growth_absolute() as f64,
        }
    }
}

/// One named region of the boundary dataset.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Region {
    pub name: String,
    /// Cached [normalize_key] of `name`.
    pub key: String,
}

impl Region {
    pub fn new(name: &str) -> Region {
        Region {
            name: name.to_string(),
            key: normalize_key(name),
        }
    }
}

/// Builds the complete view-model of the dashboard page.
///
/// Arguments:
/// * `records` the vote dataset, loaded once and treated as immutable
/// * `regions` the boundary dataset, or `None` when it could not be
///   fetched. In that case the map view is omitted and everything else
///   is computed as usual (degraded mode).
/// * `options` the current page selection
pub fn build_dashboard(
    records: &[VoteRecord],
    regions: Option<&[Region]>,
    options: &ViewOptions,
) -> Result<DashboardModel, AnalysisErrors> {
    if records.is_empty() {
        return Err(AnalysisErrors::EmptyDataset);
    }
    info!(
        "build_dashboard: {:?} records, regions: {:?}, options: {:?}",
        records.len(),
        regions.map(|r| r.len()),
        options
    );

    Ok(DashboardModel {
        totals: totals(records),
        top_gains: top_gains(records),
        top_losses: top_losses(records),
        map: regions.map(|rs| map_view(records, rs, options.map_metric, options.map_agents_only)),
        chart: chart_view(records, options.chart_kind),
        table: detail_rows(records, options.table_agents_only),
    })
}

/// Consolidated totals across all records. The percentage uses the
/// same zero-denominator substitution as the per-record metric.
pub fn totals(records: &[VoteRecord]) -> Totals {
    let votes_cycle1: u64 = records.iter().map(|r| r.votes_cycle1).sum();
    let votes_cycle2: u64 = records.iter().map(|r| r.votes_cycle2).sum();
    let growth_absolute = votes_cycle2 as i64 - votes_cycle1 as i64;
    let growth_percent = (growth_absolute as f64) / (votes_cycle1.max(1) as f64) * 100.0;
    Totals {
        votes_cycle1,
        votes_cycle2,
        growth_absolute,
        growth_percent,
    }
}

/// The `n` largest records by absolute growth, ties broken by name so
/// that the ordering is deterministic.
fn rank_by_growth(records: &[VoteRecord], n: usize, descending: bool) -> Vec<RankingEntry> {
    let mut sorted: Vec<&VoteRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let ord = a.growth_absolute().cmp(&b.growth_absolute());
        let ord = if descending { ord.reverse() } else { ord };
        ord.then_with(|| a.name.cmp(&b.name))
    });
    sorted
        .iter()
        .take(n)
        .map(|r| RankingEntry {
            name: r.name.clone(),
            growth_absolute: r.growth_absolute(),
        })
        .collect()
}

pub fn top_gains(records: &[VoteRecord]) -> Vec<RankingEntry> {
    rank_by_growth(records, TOP_RANKED, true)
}

pub fn top_losses(records: &[VoteRecord]) -> Vec<RankingEntry> {
    rank_by_growth(records, TOP_RANKED, false)
}

/// The choropleth series: one value per region, restricted to the
/// records whose key also appears in the boundary dataset.
///
/// Records without a matching boundary are dropped from the map only.
/// This is a known degradation mode of the name join, not an error.
pub fn map_view(
    records: &[VoteRecord],
    regions: &[Region],
    metric: MapMetric,
    agents_only: bool,
) -> MapView {
    let region_keys: HashSet<&str> = regions.iter().map(|r| r.key.as_str()).collect();
    let mut entries: Vec<MapEntry> = Vec::new();
    let mut dropped: usize = 0;
    for r in records.iter() {
        if agents_only && !r.has_field_agent() {
            continue;
        }
        if region_keys.contains(r.key.as_str()) {
            entries.push(MapEntry {
                key: r.key.clone(),
                name: r.name.clone(),
                value: r.metric_value(metric),
            });
        } else {
            dropped += 1;
            debug!("map_view: no boundary for record {:?} ({:?})", r.name, r.key);
        }
    }
    if dropped > 0 {
        warn!(
            "map_view: {:?} records have no matching boundary and are absent from the map",
            dropped
        );
    }
    MapView { metric, entries }
}

/// The comparative chart series: both cycles per municipality.
///
/// Bars keep the top municipalities by first-cycle votes, in
/// decreasing order; Lines keep every municipality in dataset order.
pub fn chart_view(records: &[VoteRecord], kind: ChartKind) -> ChartView {
    let selected: Vec<&VoteRecord> = match kind {
        ChartKind::Bars => {
            let mut sorted: Vec<&VoteRecord> = records.iter().collect();
            sorted.sort_by(|a, b| {
                b.votes_cycle1
                    .cmp(&a.votes_cycle1)
                    .then_with(|| a.name.cmp(&b.name))
            });
            sorted.truncate(CHART_TOP);
            sorted
        }
        ChartKind::Lines => records.iter().collect(),
    };
    ChartView {
        kind,
        points: selected
            .iter()
            .map(|r| SeriesPoint {
                name: r.name.clone(),
                votes_cycle1: r.votes_cycle1,
                votes_cycle2: r.votes_cycle2,
            })
            .collect(),
    }
}

/// Classifies a relative growth value, applying the deadband around zero.
pub fn growth_sign(growth_percent: f64) -> GrowthSign {
    if growth_percent > GROWTH_DEADBAND {
        GrowthSign::Positive
    } else if growth_percent < -GROWTH_DEADBAND {
        GrowthSign::Negative
    } else {
        GrowthSign::Flat
    }
}

/// The detail table: all records, optionally restricted to those with
/// a field agent.
pub fn detail_rows(records: &[VoteRecord], agents_only: bool) -> Vec<DetailRow> {
    records
        .iter()
        .filter(|r| !agents_only || r.has_field_agent())
        .map(|r| DetailRow {
            name: r.name.clone(),
            votes_cycle1: r.votes_cycle1,
            votes_cycle2: r.votes_cycle2,
            field_agent: r.field_agent.clone(),
            growth_absolute: r.growth_absolute(),
            growth_percent: r.growth_percent(),
            sign: growth_sign(r.growth_percent()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_records() -> Vec<VoteRecord> {
        vec![
            VoteRecord::new("Niterói", 1000, 1200, "Agent A"),
            VoteRecord::new("Maricá", 500, 400, ""),
        ]
    }

    #[test]
    fn normalization_strips_accents_and_uppercases() {
        assert_eq!(normalize_key("São Gonçalo"), "SAO GONCALO");
        assert_eq!(normalize_key("Niterói"), "NITEROI");
        assert_eq!(normalize_key("Maricá"), "MARICA");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn normalization_is_symmetric_across_sources() {
        // The same logical municipality, spelled differently by the
        // spreadsheet and the boundary file, must land on the same key.
        let r = VoteRecord::new("São Gonçalo", 10, 20, "");
        let b = Region::new("SAO GONCALO");
        assert_eq!(r.key, b.key);
    }

    #[test]
    fn growth_absolute_is_exact() {
        let r = VoteRecord::new("A", 1000, 1200, "");
        assert_eq!(r.growth_absolute(), 200);
        let r = VoteRecord::new("B", 500, 400, "");
        assert_eq!(r.growth_absolute(), -100);
    }

    #[test]
    fn zero_cycle1_uses_unit_denominator() {
        let r = VoteRecord::new("A", 0, 42, "");
        assert_eq!(r.growth_absolute(), 42);
        // Numerically equal to the absolute growth, on the percent scale.
        assert_eq!(r.growth_percent(), 4200.0);
    }

    #[test]
    fn scenario_totals_and_records() {
        let records = scenario_records();
        let t = totals(&records);
        assert_eq!(t.votes_cycle1, 1500);
        assert_eq!(t.votes_cycle2, 1600);
        assert_eq!(t.growth_absolute, 100);
        assert!((t.growth_percent - 100.0 / 1500.0 * 100.0).abs() < 1e-9);

        assert_eq!(records[0].growth_absolute(), 200);
        assert!((records[0].growth_percent() - 20.0).abs() < 1e-9);
        assert_eq!(records[1].growth_absolute(), -100);
        assert!((records[1].growth_percent() + 20.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_agent_filter() {
        let records = scenario_records();
        let rows = detail_rows(&records, true);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Niterói");
    }

    #[test]
    fn rankings_are_disjoint_with_enough_records() {
        let records: Vec<VoteRecord> = (0..12)
            .map(|i| VoteRecord::new(&format!("M{:02}", i), 1000, 1000 + i * 10, ""))
            .collect();
        let gains = top_gains(&records);
        let losses = top_losses(&records);
        assert_eq!(gains.len(), 5);
        assert_eq!(losses.len(), 5);
        let gain_names: Vec<&str> = gains.iter().map(|e| e.name.as_str()).collect();
        for l in losses.iter() {
            assert!(!gain_names.contains(&l.name.as_str()), "{:?}", l.name);
        }
        assert_eq!(gains[0].name, "M11");
        assert_eq!(losses[0].name, "M00");
    }

    #[test]
    fn rankings_break_ties_by_name() {
        let records = vec![
            VoteRecord::new("Bravo", 100, 150, ""),
            VoteRecord::new("Alpha", 100, 150, ""),
            VoteRecord::new("Charlie", 100, 120, ""),
        ];
        let gains = top_gains(&records);
        assert_eq!(gains[0].name, "Alpha");
        assert_eq!(gains[1].name, "Bravo");
        assert_eq!(gains[2].name, "Charlie");
    }

    #[test]
    fn small_datasets_overlap_in_rankings() {
        let records = scenario_records();
        let gains = top_gains(&records);
        let losses = top_losses(&records);
        assert_eq!(gains.len(), 2);
        assert_eq!(losses.len(), 2);
    }

    #[test]
    fn map_is_restricted_to_matched_regions() {
        let records = vec![
            VoteRecord::new("Niterói", 1000, 1200, "Agent A"),
            VoteRecord::new("Atlantis", 10, 20, ""),
        ];
        let regions = vec![Region::new("NITERÓI"), Region::new("Maricá")];
        let mv = map_view(&records, &regions, MapMetric::GrowthAbsolute, false);
        assert_eq!(mv.entries.len(), 1);
        assert_eq!(mv.entries[0].key, "NITEROI");
        assert_eq!(mv.entries[0].value, 200.0);
    }

    #[test]
    fn map_metric_selection() {
        let records = vec![VoteRecord::new("Niterói", 1000, 1200, "")];
        let regions = vec![Region::new("Niterói")];
        let cases = [
            (MapMetric::GrowthPercent, 20.0),
            (MapMetric::VotesCycle2, 1200.0),
            (MapMetric::VotesCycle1, 1000.0),
            (MapMetric::GrowthAbsolute, 200.0),
        ];
        for (metric, expected) in cases {
            let mv = map_view(&records, &regions, metric, false);
            assert_eq!(mv.entries[0].value, expected, "{:?}", metric);
        }
    }

    #[test]
    fn map_agent_filter() {
        let records = scenario_records();
        let regions = vec![Region::new("Niterói"), Region::new("Maricá")];
        let mv = map_view(&records, &regions, MapMetric::GrowthPercent, true);
        assert_eq!(mv.entries.len(), 1);
        assert_eq!(mv.entries[0].name, "Niterói");
    }

    #[test]
    fn bar_chart_keeps_top_twenty_by_cycle1() {
        let records: Vec<VoteRecord> = (0..25)
            .map(|i| VoteRecord::new(&format!("M{:02}", i), 100 + i, 200, ""))
            .collect();
        let cv = chart_view(&records, ChartKind::Bars);
        assert_eq!(cv.points.len(), 20);
        // Decreasing first-cycle counts, starting with the largest.
        assert_eq!(cv.points[0].name, "M24");
        assert_eq!(cv.points[19].name, "M05");
    }

    #[test]
    fn line_chart_keeps_all_records_in_order() {
        let records = scenario_records();
        let cv = chart_view(&records, ChartKind::Lines);
        assert_eq!(cv.points.len(), 2);
        assert_eq!(cv.points[0].name, "Niterói");
        assert_eq!(cv.points[1].name, "Maricá");
    }

    #[test]
    fn growth_sign_deadband() {
        assert_eq!(growth_sign(0.02), GrowthSign::Positive);
        assert_eq!(growth_sign(0.005), GrowthSign::Flat);
        assert_eq!(growth_sign(0.0), GrowthSign::Flat);
        assert_eq!(growth_sign(-0.005), GrowthSign::Flat);
        assert_eq!(growth_sign(-0.02), GrowthSign::Negative);
    }

    #[test]
    fn degraded_mode_only_drops_the_map() {
        let records = scenario_records();
        let with_regions = build_dashboard(
            &records,
            Some(&[Region::new("Niterói"), Region::new("Maricá")]),
            &ViewOptions::DEFAULT,
        )
        .unwrap();
        let degraded = build_dashboard(&records, None, &ViewOptions::DEFAULT).unwrap();
        assert!(with_regions.map.is_some());
        assert!(degraded.map.is_none());
        assert_eq!(degraded.totals, with_regions.totals);
        assert_eq!(degraded.top_gains, with_regions.top_gains);
        assert_eq!(degraded.top_losses, with_regions.top_losses);
        assert_eq!(degraded.chart, with_regions.chart);
        assert_eq!(degraded.table, with_regions.table);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let res = build_dashboard(&[], None, &ViewOptions::DEFAULT);
        assert_eq!(res, Err(AnalysisErrors::EmptyDataset));
    }

    #[test]
    fn metric_labels_are_stable() {
        assert_eq!(MapMetric::GrowthPercent.label(), "Crescimento (%)");
        assert_eq!(MapMetric::parse("votes-2022"), Some(MapMetric::VotesCycle1));
        assert_eq!(MapMetric::parse("nope"), None);
        assert_eq!(ChartKind::parse("lines"), Some(ChartKind::Lines));
    }
}
