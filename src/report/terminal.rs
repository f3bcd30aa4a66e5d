use crate::analysis::{format_percentage, SentimentDistribution};
use crate::reviews::ReviewTable;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Cells longer than this many characters are cut and end in `…`.
pub const MAX_CELL_WIDTH: usize = 60;

#[derive(Debug, Clone, Tabled)]
pub struct DistributionRow {
    #[tabled(rename = "Sentiment")]
    pub label: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Share")]
    pub percentage: String,
}

/// Label counts as a table, most frequent first.
pub fn format_distribution(distribution: &SentimentDistribution, title: Option<&str>) -> String {
    if distribution.is_empty() {
        return "No reviews to summarise".to_string();
    }

    let rows: Vec<DistributionRow> = distribution
        .counts()
        .iter()
        .map(|entry| DistributionRow {
            label: entry.label.clone(),
            count: entry.count,
            percentage: format_percentage(entry.percentage),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    match title {
        Some(title) => format!("{}\n{}\n{}", title, "=".repeat(title.chars().count()), table),
        None => table.to_string(),
    }
}

/// The whole review table, header first. `limit` caps the number of rows shown.
pub fn format_review_table(table: &ReviewTable, limit: Option<usize>) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.columns().iter().map(|column| truncate(column)));

    let shown = limit.unwrap_or(table.len()).min(table.len());
    for row in &table.rows()[..shown] {
        builder.push_record(row.iter().map(|cell| truncate(cell)));
    }

    let mut rendered = builder.build();
    rendered.with(Style::rounded());
    let mut output = rendered.to_string();

    if shown < table.len() {
        output.push_str(&format!("\n… {} more rows", table.len() - shown));
    }
    output
}

fn truncate(cell: &str) -> String {
    let single_line = cell.replace(['\r', '\n'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}
