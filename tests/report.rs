// Integration tests for the terminal, HTML and JSON outputs of an analysis.

mod common;

use common::{write_xlsx, KeywordClassifier};
use sentiment_analyzer::analysis::{analyze, Analysis, AnalyzeOptions};
use sentiment_analyzer::report::{
    format_distribution, format_review_table, render_html, to_json, write_html, write_json,
};
use std::path::Path;

fn sample_analysis(dir: &Path) -> Analysis {
    let path = write_xlsx(
        dir,
        "reviews.xlsx",
        &["Reviews", "Branch"],
        &[
            vec!["Fish & chips <3", "Whitby"],
            vec!["Cold and rude", "Scarborough"],
            vec!["Lovely", "Whitby"],
        ],
    );
    analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default()).unwrap()
}

#[test]
fn terminal_output_shows_rows_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = sample_analysis(dir.path());

    let table = format_review_table(&analysis.table, None);
    assert!(table.contains("Branch"));
    assert!(table.contains("Scarborough"));
    assert!(table.contains("NEGATIVE"));

    let summary = format_distribution(&analysis.distribution, Some(analysis.chart.title.as_str()));
    assert!(summary.contains("66.7%"));
    assert!(summary.contains("33.3%"));
}

#[test]
fn html_report_escapes_cells_and_inlines_chart() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = sample_analysis(dir.path());

    let html = render_html(&analysis, 640, 480).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>Review Sentiment Distribution</h1>"));
    assert!(html.contains("Fish &amp; chips &lt;3"));
    assert!(!html.contains("Fish & chips <3"));
    assert!(html.contains("<svg"));
    assert!(html.contains("#008000"));
    assert!(html.contains("#ff0000"));

    let out = dir.path().join("report.html");
    write_html(&analysis, &out, 640, 480).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), html);
}

#[test]
fn json_export_has_rows_distribution_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = sample_analysis(dir.path());

    let value = to_json(&analysis);
    assert_eq!(value["rows"].as_array().unwrap().len(), 3);
    assert_eq!(value["rows"][1]["Sentiment"], "NEGATIVE");
    assert_eq!(value["rows"][1]["Branch"], "Scarborough");
    assert_eq!(value["distribution"][0]["label"], "POSITIVE");
    assert_eq!(value["distribution"][0]["count"], 2);
    assert_eq!(value["total"], 3);
    assert_eq!(value["stats"]["items_processed"], 3);

    let out = dir.path().join("analysis.json");
    write_json(&analysis, &out).unwrap();
    let reread: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(reread["columns"], value["columns"]);
}

#[test]
fn chart_is_written_as_svg() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = sample_analysis(dir.path());

    let out = dir.path().join("chart.svg");
    analysis.chart.save_svg(&out, 640, 480).unwrap();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("66.7%"));
    assert!(svg.contains("Review Sentiment Distribution"));
}
