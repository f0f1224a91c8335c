// Renderers for the dashboard view-model.
//
// Every function here is a pure function of the DashboardModel; no
// metric is computed in this module.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;

use vote_growth::*;

pub const PAGE_TITLE: &str = "Painel de Análise Eleitoral Estratégica";
pub const PAGE_SUBTITLE: &str = "Comparativo de Votação: 2022 vs. Projeção 2026";

/// Header block of the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub title: String,
    pub source: String,
    #[serde(rename = "mapMetric")]
    pub map_metric: String,
    pub chart: String,
}

/// Formats a count with '.' thousands separators, the convention of
/// the source dataset locale.
pub fn format_count(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::new();
    for (idx, c) in digits.chars().enumerate() {
        let remaining = digits.len() - idx;
        out.push(c);
        if remaining > 1 && (remaining - 1) % 3 == 0 {
            out.push('.');
        }
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn chart_kind_str(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Bars => "bars",
        ChartKind::Lines => "lines",
    }
}

fn sign_str(sign: GrowthSign) -> &'static str {
    match sign {
        GrowthSign::Positive => "positive",
        GrowthSign::Negative => "negative",
        GrowthSign::Flat => "flat",
    }
}

fn sign_marker(sign: GrowthSign) -> &'static str {
    match sign {
        GrowthSign::Positive => "+",
        GrowthSign::Negative => "-",
        GrowthSign::Flat => " ",
    }
}

// ********* Terminal rendering *********

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

fn name_width(names: impl Iterator<Item = usize>) -> usize {
    names.max().unwrap_or(0).max("Município".chars().count()) + 2
}

/// The full dashboard as a terminal page.
pub fn render_text(model: &DashboardModel) -> String {
    let mut out = String::new();
    let divider = "-".repeat(72);

    out.push_str(&format!("{}\n{}\n{}\n", PAGE_TITLE, PAGE_SUBTITLE, divider));

    // Summary cards
    let t = &model.totals;
    out.push_str("Resumo Geral da Projeção\n");
    out.push_str(&format!(
        "  Total Votos 2022:        {}\n",
        format_count(t.votes_cycle1 as i64)
    ));
    out.push_str(&format!(
        "  Projeção Total 2026:     {} ({})\n",
        format_count(t.votes_cycle2 as i64),
        format_percent(t.growth_percent)
    ));
    out.push_str(&format!(
        "  Crescimento Consolidado: {}\n{}\n",
        format_count(t.growth_absolute),
        divider
    ));

    // Map section, or the degraded notice.
    out.push_str("Análise Geográfica da Projeção\n");
    match &model.map {
        Some(map) => {
            out.push_str(&format!("  Métrica: {}\n", map.metric.label()));
            let w = name_width(map.entries.iter().map(|e| e.name.chars().count()));
            for e in map.entries.iter() {
                out.push_str(&format!("  {}{:>14.2}\n", pad(&e.name, w), e.value));
            }
        }
        None => {
            out.push_str("  Mapa indisponível (falha ao carregar o contorno dos municípios).\n");
        }
    }
    out.push_str(&format!("{}\n", divider));

    // Highlights
    out.push_str("Destaques da Projeção\n");
    out.push_str("  Top 5 Maiores Crescimentos (Absoluto)\n");
    for e in model.top_gains.iter() {
        out.push_str(&format!(
            "    {}{:>12}\n",
            pad(&e.name, 24),
            format_count(e.growth_absolute)
        ));
    }
    out.push_str("  Top 5 Maiores Quedas (Absoluto)\n");
    for e in model.top_losses.iter() {
        out.push_str(&format!(
            "    {}{:>12}\n",
            pad(&e.name, 24),
            format_count(e.growth_absolute)
        ));
    }
    out.push_str(&format!("{}\n", divider));

    // Comparative chart
    match model.chart.kind {
        ChartKind::Bars => {
            out.push_str("Análise Gráfica Comparativa (20 principais municípios)\n")
        }
        ChartKind::Lines => out.push_str("Análise Gráfica Comparativa (todos os municípios)\n"),
    }
    let w = name_width(model.chart.points.iter().map(|p| p.name.chars().count()));
    out.push_str(&format!(
        "  {}{:>12}{:>12}\n",
        pad("Município", w),
        "2022",
        "2026"
    ));
    for p in model.chart.points.iter() {
        out.push_str(&format!(
            "  {}{:>12}{:>12}\n",
            pad(&p.name, w),
            format_count(p.votes_cycle1 as i64),
            format_count(p.votes_cycle2 as i64)
        ));
    }
    out.push_str(&format!("{}\n", divider));

    // Detail table
    out.push_str("Análise Detalhada por Município\n");
    let w = name_width(model.table.iter().map(|r| r.name.chars().count()));
    out.push_str(&format!(
        "    {}{:>12}{:>12}{:>14}{:>14}  {}\n",
        pad("Município", w),
        "2022",
        "2026",
        "Cresc.",
        "Cresc. (%)",
        "Cabo Eleitoral"
    ));
    for r in model.table.iter() {
        out.push_str(&format!(
            "  {} {}{:>12}{:>12}{:>14}{:>14}  {}\n",
            sign_marker(r.sign),
            pad(&r.name, w),
            format_count(r.votes_cycle1 as i64),
            format_count(r.votes_cycle2 as i64),
            format_count(r.growth_absolute),
            format_percent(r.growth_percent),
            r.field_agent
        ));
    }
    out
}

// ********* HTML rendering *********

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A self-contained single page with the same sections as the
/// terminal rendering, plus conditional row styling and, when the
/// boundary data is available, the annotated GeoJSON as a data island.
pub fn render_html(model: &DashboardModel, boundaries: Option<&JSValue>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", html_escape(PAGE_TITLE)));
    out.push_str(
        "<style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; margin: 0.5em 0; }\n\
         th, td { border: 1px solid #ccc; padding: 0.25em 0.75em; text-align: right; }\n\
         th:first-child, td:first-child { text-align: left; }\n\
         .cards { display: flex; gap: 2em; }\n\
         .card h2 { margin: 0; }\n\
         .pos { color: green; font-weight: bold; }\n\
         .neg { color: red; }\n\
         </style>\n</head>\n<body>\n",
    );
    out.push_str(&format!("<h1>{}</h1>\n", html_escape(PAGE_TITLE)));
    out.push_str(&format!("<p>{}</p>\n<hr>\n", html_escape(PAGE_SUBTITLE)));

    // Summary cards
    let t = &model.totals;
    out.push_str("<h2>Resumo Geral da Projeção</h2>\n<div class=\"cards\">\n");
    out.push_str(&format!(
        "<div class=\"card\"><h2>{}</h2>Total Votos 2022</div>\n",
        format_count(t.votes_cycle1 as i64)
    ));
    out.push_str(&format!(
        "<div class=\"card\"><h2>{}</h2>Projeção Total 2026 ({})</div>\n",
        format_count(t.votes_cycle2 as i64),
        format_percent(t.growth_percent)
    ));
    out.push_str(&format!(
        "<div class=\"card\"><h2>{}</h2>Crescimento Consolidado</div>\n",
        format_count(t.growth_absolute)
    ));
    out.push_str("</div>\n<hr>\n");

    // Map section, omitted entirely in degraded mode.
    if let Some(map) = &model.map {
        out.push_str("<h2>Análise Geográfica da Projeção</h2>\n");
        out.push_str(&format!(
            "<p>Métrica: {}</p>\n<table>\n<tr><th>Município</th><th>{}</th></tr>\n",
            html_escape(map.metric.label()),
            html_escape(map.metric.label())
        ));
        for e in map.entries.iter() {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}</td></tr>\n",
                html_escape(&e.name),
                e.value
            ));
        }
        out.push_str("</table>\n");
        if let Some(js) = boundaries {
            out.push_str("<script type=\"application/json\" id=\"boundaries\">\n");
            out.push_str(&js.to_string());
            out.push_str("\n</script>\n");
        }
        out.push_str("<hr>\n");
    }

    // Highlights
    out.push_str("<h2>Destaques da Projeção</h2>\n");
    for (title, entries) in [
        ("Top 5 Maiores Crescimentos (Absoluto)", &model.top_gains),
        ("Top 5 Maiores Quedas (Absoluto)", &model.top_losses),
    ] {
        out.push_str(&format!(
            "<h3>{}</h3>\n<table>\n<tr><th>Município</th><th>Crescimento</th></tr>\n",
            title
        ));
        for e in entries.iter() {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&e.name),
                format_count(e.growth_absolute)
            ));
        }
        out.push_str("</table>\n");
    }
    out.push_str("<hr>\n");

    // Comparative chart
    let chart_title = match model.chart.kind {
        ChartKind::Bars => "Comparativo de Votos nos 20 Principais Municípios",
        ChartKind::Lines => "Distribuição de Votos por Todos os Municípios",
    };
    out.push_str(&format!(
        "<h2>Análise Gráfica Comparativa</h2>\n<h3>{}</h3>\n\
         <table>\n<tr><th>Município</th><th>Votos 2022</th><th>Projeção 2026</th></tr>\n",
        chart_title
    ));
    for p in model.chart.points.iter() {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&p.name),
            format_count(p.votes_cycle1 as i64),
            format_count(p.votes_cycle2 as i64)
        ));
    }
    out.push_str("</table>\n<hr>\n");

    // Detail table
    out.push_str(
        "<h2>Análise Detalhada por Município</h2>\n<table>\n\
         <tr><th>Município</th><th>Votos 2022</th><th>Projeção 2026</th>\
         <th>Crescimento (Absoluto)</th><th>Crescimento (%)</th><th>Cabo Eleitoral</th></tr>\n",
    );
    for r in model.table.iter() {
        let class = match r.sign {
            GrowthSign::Positive => " class=\"pos\"",
            GrowthSign::Negative => " class=\"neg\"",
            GrowthSign::Flat => "",
        };
        out.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&r.name),
            format_count(r.votes_cycle1 as i64),
            format_count(r.votes_cycle2 as i64),
            format_count(r.growth_absolute),
            format_percent(r.growth_percent),
            html_escape(&r.field_agent)
        ));
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

// ********* JSON summary *********

/// Machine-readable summary, used by --out and the --reference check.
/// Counts are emitted as strings to keep the representation stable
/// across arithmetic widths.
pub fn summary_json(source: &str, options: &ViewOptions, model: &DashboardModel) -> JSValue {
    let c = SummaryConfig {
        title: PAGE_TITLE.to_string(),
        source: source.to_string(),
        map_metric: options.map_metric.label().to_string(),
        chart: chart_kind_str(options.chart_kind).to_string(),
    };

    let rankings = |entries: &[RankingEntry]| -> Vec<JSValue> {
        entries
            .iter()
            .map(|e| json!({"name": e.name, "growth": e.growth_absolute.to_string()}))
            .collect()
    };

    let map_js: JSValue = match &model.map {
        None => JSValue::Null,
        Some(map) => {
            let entries: Vec<JSValue> = map
                .entries
                .iter()
                .map(|e| {
                    json!({
                        "key": e.key,
                        "name": e.name,
                        "value": format!("{:.2}", e.value),
                    })
                })
                .collect();
            json!({"metric": map.metric.label(), "entries": entries})
        }
    };

    let chart_points: Vec<JSValue> = model
        .chart
        .points
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "votes2022": p.votes_cycle1.to_string(),
                "votes2026": p.votes_cycle2.to_string(),
            })
        })
        .collect();

    let table: Vec<JSValue> = model
        .table
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "votes2022": r.votes_cycle1.to_string(),
                "votes2026": r.votes_cycle2.to_string(),
                "agent": r.field_agent,
                "growth": r.growth_absolute.to_string(),
                "growthPercent": format!("{:.2}", r.growth_percent),
                "sign": sign_str(r.sign),
            })
        })
        .collect();

    json!({
        "config": c,
        "totals": {
            "votes2022": model.totals.votes_cycle1.to_string(),
            "votes2026": model.totals.votes_cycle2.to_string(),
            "growth": model.totals.growth_absolute.to_string(),
            "growthPercent": format!("{:.2}", model.totals.growth_percent),
        },
        "topGains": rankings(&model.top_gains),
        "topLosses": rankings(&model.top_losses),
        "map": map_js,
        "chart": {
            "kind": chart_kind_str(model.chart.kind),
            "points": chart_points,
        },
        "table": table,
    })
}
