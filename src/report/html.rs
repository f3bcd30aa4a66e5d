use crate::analysis::{format_percentage, Analysis};
use crate::core::Result;
use minijinja::{context, Environment, Value};
use serde::Serialize;
use std::path::Path;

// The `.html` name turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = include_str!("report.html");

#[derive(Serialize)]
struct DistributionEntry<'a> {
    label: &'a str,
    count: usize,
    share: String,
    color: String,
}

/// A self-contained HTML page: distribution, inline SVG chart and the labelled table.
pub fn render_html(analysis: &Analysis, chart_width: u32, chart_height: u32) -> Result<String> {
    let svg = analysis.chart.render_svg(chart_width, chart_height)?;

    let distribution: Vec<DistributionEntry> = analysis
        .distribution
        .counts()
        .iter()
        .zip(&analysis.chart.slices)
        .map(|(entry, slice)| DistributionEntry {
            label: &entry.label,
            count: entry.count,
            share: format_percentage(entry.percentage),
            color: slice.color.hex(),
        })
        .collect();

    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let html = env.get_template(TEMPLATE_NAME)?.render(context! {
        title => &analysis.chart.title,
        items_processed => analysis.stats.items_processed,
        seconds => format!("{:.2}", analysis.stats.total_time.as_secs_f64()),
        distribution => distribution,
        svg => Value::from_safe_string(svg),
        columns => analysis.table.columns(),
        rows => analysis.table.rows(),
    })?;

    Ok(html)
}

pub fn write_html(analysis: &Analysis, path: &Path, chart_width: u32, chart_height: u32) -> Result<()> {
    let html = render_html(analysis, chart_width, chart_height)?;
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), "wrote HTML report");
    Ok(())
}
