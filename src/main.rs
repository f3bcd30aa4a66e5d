use anyhow::{Context, Result};
use clap::Parser;
use sentiment_analyzer::analysis::{analyze, resolve_input, AnalyzeOptions};
use sentiment_analyzer::core::AnalyzerConfig;
use sentiment_analyzer::pipelines::SentimentAnalysisPipelineBuilder;
use sentiment_analyzer::report::{format_distribution, format_review_table, write_html, write_json};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sentiment-analyzer")]
#[command(about = "Label every review in a spreadsheet as positive or negative and chart the split")]
#[command(version)]
struct Args {
    /// Spreadsheet (.xlsx, .xls, .xlsb, .ods) or .csv file with a review column
    file: Option<PathBuf>,

    /// Worksheet to read (default: the first one)
    #[arg(long)]
    sheet: Option<String>,

    /// Column holding the review text
    #[arg(long)]
    review_column: Option<String>,

    /// Write the pie chart as SVG (default: <FILE stem>.sentiment.svg next to FILE,
    /// unless --report is given)
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Write a standalone HTML report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write rows, distribution and timings as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Local model snapshot directory (config.json, weights, tokenizer files)
    #[arg(long, env = "SENTIMENT_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Hugging Face repository of the classifier
    #[arg(long)]
    model_repo: Option<String>,

    /// Revision of --model-repo
    #[arg(long)]
    revision: Option<String>,

    /// Run on the CPU even when CUDA is available
    #[arg(long)]
    cpu: bool,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows of the labelled table to print
    #[arg(long, default_value_t = 20)]
    max_rows: usize,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };

        if let Some(sheet) = &self.sheet {
            config.sheet = Some(sheet.clone());
        }
        if let Some(column) = &self.review_column {
            config.review_column = column.clone();
        }
        if let Some(dir) = &self.model_dir {
            config.model.local_dir = Some(dir.clone());
        }
        if let Some(repo) = &self.model_repo {
            config.model.repo = repo.clone();
        }
        if let Some(revision) = &self.revision {
            config.model.revision = revision.clone();
        }
        config.model.cpu |= self.cpu;

        config.validate()?;
        Ok(config)
    }

    /// Where the SVG chart goes. Without `--chart` it lands next to the input, except
    /// when an HTML report (which inlines the chart) was asked for.
    fn chart_path(&self, input: &Path) -> Option<PathBuf> {
        match (&self.chart, &self.report) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(_)) => None,
            (None, None) => Some(input.with_extension("sentiment.svg")),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,sentiment_analyzer=info",
        1 => "warn,sentiment_analyzer=debug",
        _ => "sentiment_analyzer=trace,info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config()?;
    tracing::debug!(?config, "resolved configuration");

    // Fail on a missing or absent file before paying for model loading.
    let file = resolve_input(args.file.as_deref())?;

    let source = config.model.source();
    tracing::info!(model = %source, "loading sentiment model");
    let mut builder = SentimentAnalysisPipelineBuilder::distilbert(source);
    if config.model.cpu {
        builder = builder.cpu();
    }
    let pipeline = builder.build().context("loading sentiment model")?;

    let analysis = analyze(Some(file), &pipeline, &AnalyzeOptions::from(&config))?;

    println!("{}", format_review_table(&analysis.table, Some(args.max_rows)));
    println!();
    println!(
        "{}",
        format_distribution(&analysis.distribution, Some(analysis.chart.title.as_str()))
    );

    let (width, height) = (config.chart.width, config.chart.height);
    if let Some(path) = args.chart_path(file) {
        analysis
            .chart
            .save_svg(&path, width, height)
            .with_context(|| format!("writing chart {}", path.display()))?;
        println!("\nChart written to {}", path.display());
    }
    if let Some(path) = &args.report {
        write_html(&analysis, path, width, height)
            .with_context(|| format!("writing report {}", path.display()))?;
    }
    if let Some(path) = &args.json {
        write_json(&analysis, path).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_defaults_to_a_file_next_to_the_input() {
        let args = Args::parse_from(["sentiment-analyzer", "data/reviews.xlsx"]);
        assert_eq!(
            args.chart_path(Path::new("data/reviews.xlsx")),
            Some(PathBuf::from("data/reviews.sentiment.svg"))
        );
    }

    #[test]
    fn explicit_chart_path_wins() {
        let args = Args::parse_from([
            "sentiment-analyzer",
            "reviews.xlsx",
            "--chart",
            "out/pie.svg",
            "--report",
            "out/report.html",
        ]);
        assert_eq!(
            args.chart_path(Path::new("reviews.xlsx")),
            Some(PathBuf::from("out/pie.svg"))
        );
    }

    #[test]
    fn report_alone_inlines_the_chart() {
        let args = Args::parse_from(["sentiment-analyzer", "reviews.xlsx", "--report", "r.html"]);
        assert_eq!(args.chart_path(Path::new("reviews.xlsx")), None);
    }
}
