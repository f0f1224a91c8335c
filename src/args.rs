use clap::Parser;

/// This is an analytical dashboard for two-cycle electoral datasets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The spreadsheet containing the per-municipality vote counts
    /// for the two cycles. The file must exist; generate it first with the
    /// simulation script if it does not.
    #[clap(short, long, value_parser)]
    pub data: Option<String>,

    /// (default inferred from the file extension) The type of the input,
    /// either 'xlsx' or 'csv'.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (URL) The boundary dataset to fetch for the choropleth. Defaults to the
    /// geodata-br municipalities of Rio de Janeiro.
    #[clap(long, value_parser)]
    pub geo_url: Option<String>,

    /// If passed as an argument, skips the boundary fetch entirely and renders
    /// without the map section.
    #[clap(long, takes_value = false)]
    pub no_map: bool,

    /// (default growth-percent) The metric coloring the map: 'growth-percent',
    /// 'votes-2026', 'votes-2022' or 'growth-absolute'.
    #[clap(long, value_parser)]
    pub map_metric: Option<String>,

    /// (default bars) The comparative chart type, 'bars' or 'lines'.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// If passed as an argument, only municipalities with a field agent are
    /// shown on the map.
    #[clap(long, takes_value = false)]
    pub map_agents_only: bool,

    /// If passed as an argument, only municipalities with a field agent are
    /// shown in the detail table.
    #[clap(long, takes_value = false)]
    pub table_agents_only: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the
    /// dashboard will be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the dashboard will be exported as a
    /// self-contained HTML page to the given location.
    #[clap(long, value_parser)]
    pub html: Option<String>,

    /// (file path) A reference file containing a dashboard summary in JSON
    /// format. If provided, votetrend will check that the computed summary
    /// matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard
    /// output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
