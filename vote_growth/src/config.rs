// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The metric used to color the choropleth map.
///
/// These are the four choices offered by the map selector on the
/// rendered page.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MapMetric {
    /// Relative growth between the two cycles, in percentage points.
    GrowthPercent,
    /// Raw vote count for the second (projected) cycle.
    VotesCycle2,
    /// Raw vote count for the first cycle.
    VotesCycle1,
    /// Absolute vote difference between the two cycles.
    GrowthAbsolute,
}

impl MapMetric {
    pub const ALL: [MapMetric; 4] = [
        MapMetric::GrowthPercent,
        MapMetric::VotesCycle2,
        MapMetric::VotesCycle1,
        MapMetric::GrowthAbsolute,
    ];

    /// The label shown next to the color scale.
    pub fn label(&self) -> &'static str {
        match self {
            MapMetric::GrowthPercent => "Crescimento (%)",
            MapMetric::VotesCycle2 => "Votos (Projeção 2026)",
            MapMetric::VotesCycle1 => "Votos (2022)",
            MapMetric::GrowthAbsolute => "Crescimento (Absoluto)",
        }
    }

    /// Parses the command-line spelling of a metric.
    pub fn parse(s: &str) -> Option<MapMetric> {
        match s {
            "growth-percent" => Some(MapMetric::GrowthPercent),
            "votes-2026" => Some(MapMetric::VotesCycle2),
            "votes-2022" => Some(MapMetric::VotesCycle1),
            "growth-absolute" => Some(MapMetric::GrowthAbsolute),
            _ => None,
        }
    }
}

/// The style of the comparative chart.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ChartKind {
    /// Grouped bars, restricted to the top municipalities by first-cycle votes.
    Bars,
    /// Lines over all municipalities.
    Lines,
}

impl ChartKind {
    pub fn parse(s: &str) -> Option<ChartKind> {
        match s {
            "bars" => Some(ChartKind::Bars),
            "lines" => Some(ChartKind::Lines),
            _ => None,
        }
    }
}

/// The selection state of the page: which metric colors the map, which
/// chart is drawn, and whether the agent-only filters are on.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ViewOptions {
    pub map_metric: MapMetric,
    pub chart_kind: ChartKind,
    /// Keep only records with a field agent on the map.
    pub map_agents_only: bool,
    /// Keep only records with a field agent in the detail table.
    pub table_agents_only: bool,
}

impl ViewOptions {
    pub const DEFAULT: ViewOptions = ViewOptions {
        map_metric: MapMetric::GrowthPercent,
        chart_kind: ChartKind::Bars,
        map_agents_only: false,
        table_agents_only: false,
    };
}

// ******** Output data structures *********

/// Aggregate totals over the whole dataset.
#[derive(PartialEq, Debug, Clone)]
pub struct Totals {
    pub votes_cycle1: u64,
    pub votes_cycle2: u64,
    pub growth_absolute: i64,
    pub growth_percent: f64,
}

/// One line of the top-5 gains or losses table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankingEntry {
    pub name: String,
    pub growth_absolute: i64,
}

/// One colored region of the choropleth.
#[derive(PartialEq, Debug, Clone)]
pub struct MapEntry {
    /// Normalized join key, matching the annotated boundary feature.
    pub key: String,
    pub name: String,
    pub value: f64,
}

/// The choropleth view. Only regions present in both the vote dataset
/// and the boundary dataset appear here.
#[derive(PartialEq, Debug, Clone)]
pub struct MapView {
    pub metric: MapMetric,
    pub entries: Vec<MapEntry>,
}

/// One municipality in the comparative chart.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeriesPoint {
    pub name: String,
    pub votes_cycle1: u64,
    pub votes_cycle2: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartView {
    pub kind: ChartKind,
    pub points: Vec<SeriesPoint>,
}

/// Direction of the growth of a record, after applying a deadband of
/// 0.01 percentage points so that noise-level zero crossings are not
/// highlighted.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum GrowthSign {
    Positive,
    Negative,
    Flat,
}

/// One row of the detail table.
#[derive(PartialEq, Debug, Clone)]
pub struct DetailRow {
    pub name: String,
    pub votes_cycle1: u64,
    pub votes_cycle2: u64,
    pub field_agent: String,
    pub growth_absolute: i64,
    pub growth_percent: f64,
    pub sign: GrowthSign,
}

/// The complete, immutable view-model of the dashboard page.
///
/// Every field is a pure function of the base tables and the current
/// [ViewOptions]; renderers consume this structure and never recompute
/// metrics on their own.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardModel {
    pub totals: Totals,
    pub top_gains: Vec<RankingEntry>,
    pub top_losses: Vec<RankingEntry>,
    /// Absent when the boundary dataset could not be loaded (degraded mode).
    pub map: Option<MapView>,
    pub chart: ChartView,
    pub table: Vec<DetailRow>,
}

/// Errors that prevent the view-model from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalysisErrors {
    EmptyDataset,
}

impl Error for AnalysisErrors {}

impl Display for AnalysisErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnalysisError in vote_growth")
    }
}
