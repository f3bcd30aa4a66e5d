// Integration tests for the Analyze operation, using deterministic stub classifiers.

mod common;

use common::{write_reviews, write_xlsx, FailingClassifier, KeywordClassifier};
use sentiment_analyzer::analysis::{analyze, analyze_table, AnalyzeOptions};
use sentiment_analyzer::chart::SliceColor;
use sentiment_analyzer::core::AnalyzerError;
use sentiment_analyzer::reviews::ReviewTable;
use std::path::Path;

#[test]
fn every_row_gets_a_label() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let reviews = [
        "Great service",
        "Food was cold",
        "Lovely view",
        "Rude waiter",
        "Would come back",
    ];
    let path = write_reviews(dir.path(), &reviews);

    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default())?;

    assert_eq!(analysis.table.len(), reviews.len());
    assert_eq!(analysis.table.columns(), &["Reviews", "Sentiment"]);
    let labels: Vec<_> = analysis.table.column_values("Sentiment").unwrap().collect();
    assert_eq!(
        labels,
        ["POSITIVE", "NEGATIVE", "POSITIVE", "NEGATIVE", "POSITIVE"]
    );
    assert_eq!(analysis.stats.items_processed, reviews.len());
    Ok(())
}

#[test]
fn no_file_is_missing_input() {
    let err = analyze(None, &KeywordClassifier, &AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyzerError::MissingInput));
    assert_eq!(err.to_string(), "No file uploaded.");
}

#[test]
fn absent_path_is_file_not_found() {
    let path = Path::new("/definitely/not/here/reviews.xlsx");
    let err = analyze(Some(path), &KeywordClassifier, &AnalyzeOptions::default()).unwrap_err();
    match err {
        AnalyzerError::FileNotFound(missing) => assert_eq!(missing, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn sheet_without_reviews_column_is_schema_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_xlsx(
        dir.path(),
        "feedback.xlsx",
        &["Comment", "Stars"],
        &[vec!["Nice", "5"]],
    );

    let classifier = FailingClassifier::new(usize::MAX);
    let err = analyze(Some(path.as_path()), &classifier, &AnalyzeOptions::default()).unwrap_err();

    assert!(matches!(err, AnalyzerError::MissingColumn { ref column, .. } if column == "Reviews"));
    assert!(err
        .to_string()
        .starts_with("Excel file must contain a column named 'Reviews'."));
    assert_eq!(classifier.calls.get(), 0);
    Ok(())
}

#[test]
fn seven_of_ten_positive_is_seventy_percent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut reviews = vec!["Excellent"; 7];
    reviews.extend(["Awful"; 3]);
    let path = write_reviews(dir.path(), &reviews);

    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default())?;

    assert_eq!(analysis.distribution.total(), 10);
    assert!((analysis.distribution.percentage("POSITIVE") - 70.0).abs() < 1e-9);
    assert!((analysis.distribution.percentage("NEGATIVE") - 30.0).abs() < 1e-9);

    let positive = analysis.chart.slice("POSITIVE").unwrap();
    assert_eq!(positive.percentage_text(), "70.0%");
    assert_eq!(analysis.chart.slice("NEGATIVE").unwrap().percentage_text(), "30.0%");
    assert_eq!(analysis.chart.title, "Review Sentiment Distribution");
    Ok(())
}

#[test]
fn single_review_yields_single_known_label() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_reviews(dir.path(), &["Best pizza in town"]);

    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default())?;

    assert_eq!(analysis.table.len(), 1);
    let label = analysis.table.cell(0, "Sentiment").unwrap();
    assert!(["POSITIVE", "NEGATIVE"].contains(&label));
    assert_eq!(analysis.chart.slices.len(), 1);
    assert!((analysis.chart.slices[0].fraction - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn majority_negative_is_still_drawn_red() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_reviews(dir.path(), &["Bad", "Awful", "Never again", "Superb"]);

    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default())?;

    assert_eq!(analysis.chart.slices[0].label, "NEGATIVE");
    assert_eq!(analysis.chart.slices[0].color, SliceColor::RED);
    assert_eq!(analysis.chart.slice("POSITIVE").unwrap().color, SliceColor::GREEN);
    Ok(())
}

#[test]
fn other_columns_survive_unchanged() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_xlsx(
        dir.path(),
        "reviews.xlsx",
        &["Id", "Reviews", "Branch"],
        &[
            vec!["1", "Lovely staff", "Leeds"],
            vec!["2", "Cold chips", "York"],
        ],
    );

    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default())?;

    assert_eq!(
        analysis.table.columns(),
        &["Id", "Reviews", "Branch", "Sentiment"]
    );
    assert_eq!(analysis.table.cell(1, "Id"), Some("2"));
    assert_eq!(analysis.table.cell(1, "Branch"), Some("York"));
    assert_eq!(analysis.table.cell(1, "Sentiment"), Some("NEGATIVE"));
    Ok(())
}

#[test]
fn classifier_failure_aborts_with_row_number() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_reviews(dir.path(), &["one", "two", "three", "four"]);

    let classifier = FailingClassifier::new(3);
    let err = analyze(Some(path.as_path()), &classifier, &AnalyzeOptions::default()).unwrap_err();

    assert!(matches!(err, AnalyzerError::Classification { row: 3, .. }));
    assert_eq!(classifier.calls.get(), 3);
    Ok(())
}

#[test]
fn custom_columns_and_csv_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("feedback.csv");
    std::fs::write(&path, "Feedback,Score\n\"Rude, slow\",1\nDelightful,5\n")?;

    let options = AnalyzeOptions {
        review_column: "Feedback".into(),
        sentiment_column: "Label".into(),
        ..AnalyzeOptions::default()
    };
    let analysis = analyze(Some(path.as_path()), &KeywordClassifier, &options)?;

    assert_eq!(analysis.table.columns(), &["Feedback", "Score", "Label"]);
    assert_eq!(analysis.table.cell(0, "Label"), Some("NEGATIVE"));
    assert_eq!(analysis.table.cell(1, "Label"), Some("POSITIVE"));
    Ok(())
}

#[test]
fn header_only_sheet_gives_empty_results() -> anyhow::Result<()> {
    let table = ReviewTable::from_rows(vec!["Reviews".into()], vec![]);

    let analysis = analyze_table(table, &KeywordClassifier, &AnalyzeOptions::default())?;

    assert!(analysis.table.is_empty());
    assert_eq!(analysis.table.columns(), &["Reviews", "Sentiment"]);
    assert!(analysis.distribution.is_empty());
    assert!(analysis.chart.slices.is_empty());
    assert!(analysis.chart.render_svg(640, 480)?.contains("No reviews"));
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("reviews.txt");
    std::fs::write(&path, "Reviews\nfine\n")?;

    let err = analyze(Some(path.as_path()), &KeywordClassifier, &AnalyzeOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyzerError::UnsupportedFormat(_)));
    Ok(())
}
