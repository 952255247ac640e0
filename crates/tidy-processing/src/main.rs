//! CLI entry point for the data cleaning and analysis tool.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tidy_processing::analysis::{DEFAULT_TOP_VALUES, histogram, value_counts};
use tidy_processing::config::DEFAULT_Z_THRESHOLD;
use tidy_processing::sample::{DEFAULT_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED};
use tidy_processing::{
    CleaningConfig, CleaningPipeline, CleaningRunReport, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_TOP_GROUPS, DataProfiler, DataQualityAnalyzer, DescriptiveAnalyzer, LoadOptions,
    MissingStrategy, ReportGenerator, SampleDataset, Summary, Table,
};
use tracing::{error, info};

/// CLI-compatible missing value strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    /// Leave missing values untouched
    None,
    /// Drop every row with a missing value
    DropRows,
    /// Fill numeric columns with their mean
    FillMean,
    /// Fill numeric columns with their median
    FillMedian,
    /// Fill every column with its most frequent value
    FillMode,
}

impl From<CliMissingStrategy> for MissingStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::None => MissingStrategy::None,
            CliMissingStrategy::DropRows => MissingStrategy::DropRows,
            CliMissingStrategy::FillMean => MissingStrategy::FillMean,
            CliMissingStrategy::FillMedian => MissingStrategy::FillMedian,
            CliMissingStrategy::FillMode => MissingStrategy::FillMode,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "CSV Data Cleaning and Analysis Tool",
    long_about = "Clean messy CSV data and compute descriptive statistics.\n\n\
                  EXAMPLES:\n  \
                  # Inspect data quality\n  \
                  tidy-processing inspect -i data.csv\n\n  \
                  # Remove duplicates and fill missing values with the median\n  \
                  tidy-processing clean -i data.csv --remove-duplicates --missing-strategy fill-median\n\n  \
                  # Descriptive statistics and grouped means\n  \
                  tidy-processing analyze -i data.csv --group-by city --value purchase_amount\n\n  \
                  # Generate the demo dataset\n  \
                  tidy-processing sample -o sample_data.csv"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a CSV file and list data quality issues
    Inspect(InspectArgs),
    /// Clean a CSV file and write the result
    Clean(CleanArgs),
    /// Compute descriptive statistics for a CSV file
    Analyze(AnalyzeArgs),
    /// Write the demo dataset to a CSV file
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to the CSV file to inspect
    #[arg(short, long)]
    input: PathBuf,

    /// Absolute z-score at which a value is flagged as a potential outlier
    #[arg(long, default_value_t = DEFAULT_Z_THRESHOLD)]
    z_threshold: f64,

    /// Output JSON to stdout instead of human-readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Output file name (without extension)
    #[arg(long, default_value = "cleaned_data")]
    output_name: String,

    /// JSON file with a cleaning configuration
    ///
    /// Flags given on the command line override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remove exact duplicate rows
    #[arg(long)]
    remove_duplicates: bool,

    /// Strategy for handling missing values
    #[arg(long, value_enum)]
    missing_strategy: Option<CliMissingStrategy>,

    /// Trim and lowercase text columns
    #[arg(long)]
    standardize_text: bool,

    /// Remove rows with a z-score outlier in any numeric column
    #[arg(long)]
    remove_outliers: bool,

    /// Absolute z-score at or above which a value is an outlier
    #[arg(long)]
    z_threshold: Option<f64>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <output_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Categorical column to group by
    #[arg(long, requires = "value")]
    group_by: Option<String>,

    /// Numeric column averaged per group
    #[arg(long, requires = "group_by")]
    value: Option<String>,

    /// Number of groups to show
    #[arg(long, default_value_t = DEFAULT_TOP_GROUPS)]
    top: usize,

    /// Numeric column to draw a histogram for
    #[arg(long)]
    histogram: Option<String>,

    /// Number of histogram bins
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Output JSON to stdout instead of human-readable summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Path of the CSV file to write
    #[arg(short, long, default_value = "sample_data.csv")]
    output: PathBuf,

    /// Number of rows, duplicates included
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    seed: u64,
}

impl Command {
    fn json_output(&self) -> bool {
        match self {
            Command::Inspect(args) => args.json,
            Command::Clean(args) => args.json,
            Command::Analyze(args) => args.json,
            Command::Sample(_) => false,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.command.json_output());

    let result = match &cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Clean(args) => run_clean(args, cli.quiet),
        Command::Analyze(args) => run_analyze(args),
        Command::Sample(args) => run_sample(args),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn load_table(input: &Path) -> Result<Table> {
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    info!("Loading dataset from: {}", input.display());
    let table = Table::from_csv_path(input, &LoadOptions::default())
        .with_context(|| format!("Failed to load {}", input.display()))?;
    info!("Dataset loaded successfully: {:?}", table.shape());
    Ok(table)
}

// ============================================================================
// inspect
// ============================================================================

/// Print the profile and quality issues of a table.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn run_inspect(args: &InspectArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let profile = DataProfiler::profile_table(&table)?;
    let issues = DataQualityAnalyzer::identify_issues(&table, &profile, args.z_threshold)?;

    if args.json {
        let output = serde_json::json!({
            "input_file": args.input.display().to_string(),
            "profile": profile,
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DATA QUALITY INSPECTION");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input.display());
    println!("  Rows: {}", profile.shape.0);
    println!("  Columns: {}", profile.shape.1);
    println!(
        "  Duplicate rows: {} ({:.2}%)",
        profile.duplicate_count, profile.duplicate_percentage
    );
    println!("  Missing cells: {}", profile.total_missing);
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<8} {}",
        "Column", "Type", "Kind", "Missing %", "Unique", "Samples"
    );
    println!("{}", "-".repeat(80));
    for col in &profile.column_profiles {
        println!(
            "{:<20} {:<12} {:<10} {:<10.2} {:<8} {}",
            truncate_str(&col.name, 19),
            truncate_str(&col.dtype, 11),
            col.kind,
            col.missing_percentage,
            col.unique_count,
            col.sample_values.join(", ")
        );
    }
    println!();

    println!("DATA QUALITY ISSUES");
    println!("{}", "-".repeat(40));
    if issues.is_empty() {
        println!("  No data quality issues detected");
    } else {
        for issue in &issues {
            let column = issue.column.as_deref().unwrap_or("(all columns)");
            println!("  - [{}] {}: {}", issue.severity, column, issue.description);
            if !issue.examples.is_empty() {
                println!("      e.g. {}", issue.examples.join(", "));
            }
        }
    }
    println!("{}", "=".repeat(80));

    Ok(())
}

// ============================================================================
// clean
// ============================================================================

/// Merge the optional config file with command line flags.
fn build_config(args: &CleanArgs) -> Result<CleaningConfig> {
    let base = match &args.config {
        Some(path) => CleaningConfig::from_json_file(path)?,
        None => CleaningConfig::default(),
    };

    let mut builder = CleaningConfig::builder()
        .remove_duplicates(base.remove_duplicates || args.remove_duplicates)
        .missing_strategy(
            args.missing_strategy
                .map(MissingStrategy::from)
                .unwrap_or(base.missing_strategy),
        )
        .standardize_text(base.standardize_text || args.standardize_text)
        .remove_outliers(base.remove_outliers || args.remove_outliers)
        .outlier_z_threshold(base.outlier_z_threshold);

    if let Some(threshold) = args.z_threshold {
        builder = builder.outlier_z_threshold(threshold);
    }

    Ok(builder.build()?)
}

fn run_clean(args: &CleanArgs, quiet: bool) -> Result<()> {
    let config = build_config(args)?;
    if !config.has_any_step() {
        info!("No cleaning step enabled; the output will match the input");
    }

    let table = load_table(&args.input)?;

    let mut builder = CleaningPipeline::builder().config(config.clone());
    if !quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let (cleaned, report) = builder.build()?.clean(&table)?;

    let generator = ReportGenerator::new(&args.output);
    let output_path = generator.save_table(&cleaned, &format!("{}.csv", args.output_name))?;

    let summary = DescriptiveAnalyzer::summarize(&cleaned)?;
    let run_report = CleaningRunReport::new(
        args.input.display().to_string(),
        Some(&output_path),
        &config,
        &report,
        summary,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run_report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = generator.write_report_to_file(&run_report, &args.output_name)?;
        info!("Report written to: {}", report_path.display());
    }

    print_cleaning_summary(&run_report);
    Ok(())
}

fn print_cleaning_summary(run: &CleaningRunReport) {
    let report = &run.cleaning;

    println!("\n{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}\n", "=".repeat(80));

    println!("  Input:  {}", run.input_file);
    if let Some(output) = &run.output_file {
        println!("  Output: {}", output);
    }
    println!(
        "  Shape:  {} x {} -> {} x {}",
        report.shape_before.0, report.shape_before.1, report.shape_after.0, report.shape_after.1
    );
    println!("  Duration: {} ms", report.duration_ms);
    println!();

    println!("CHANGES");
    println!("{}", "-".repeat(40));
    println!("  Duplicates removed: {}", report.duplicates_removed);
    println!(
        "  Missing values ({}): {} rows dropped, {} cells filled",
        report.missing.strategy.display_name(),
        report.missing.rows_dropped,
        report.missing.cells_filled
    );
    for fill in &report.missing.columns_filled {
        println!(
            "    - {}: {} cells with {}",
            fill.column, fill.cells_filled, fill.value
        );
    }
    println!(
        "  Text columns standardized: {}",
        report.text_columns_normalized.len()
    );
    println!("  Outlier rows removed: {}", report.outlier_rows_removed);
    for col in &report.outliers_by_column {
        println!("    - {}: {}", col.column, col.rows_removed);
    }
    println!();

    println!("STEPS");
    println!("{}", "-".repeat(40));
    for (i, step) in report.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("{}", "=".repeat(80));
}

// ============================================================================
// analyze
// ============================================================================

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let summary = DescriptiveAnalyzer::summarize(&table)?;

    let grouped = match (&args.group_by, &args.value) {
        (Some(category), Some(value)) => Some(DescriptiveAnalyzer::grouped_mean(
            &table, category, value, args.top,
        )?),
        _ => None,
    };
    let bins = args
        .histogram
        .as_deref()
        .map(|column| histogram(&table, column, args.bins))
        .transpose()?;

    if args.json {
        let output = serde_json::json!({
            "input_file": args.input.display().to_string(),
            "summary": summary,
            "grouped_mean": grouped,
            "histogram": bins,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DESCRIPTIVE ANALYSIS");
    println!("{}\n", "=".repeat(80));
    println!("  File: {}", args.input.display());
    println!("  Rows: {}  Columns: {}", summary.row_count, summary.column_count);
    println!();

    print_numeric_stats(&summary);
    print_correlations(&summary);
    print_frequencies(&table)?;

    if let (Some(groups), Some(category), Some(value)) = (&grouped, &args.group_by, &args.value) {
        println!("MEAN {} BY {}", value.to_uppercase(), category.to_uppercase());
        println!("{}", "-".repeat(40));
        for group in groups {
            println!(
                "  {:<24} {:>12} (n={})",
                truncate_str(&group.group, 23),
                fmt_opt(group.mean),
                group.count
            );
        }
        println!();
    }

    if let (Some(bins), Some(column)) = (&bins, &args.histogram) {
        println!("HISTOGRAM: {}", column);
        println!("{}", "-".repeat(40));
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bin in bins {
            let bar = "#".repeat(bin.count * 40 / max_count);
            println!("  [{:>10.2}, {:>10.2}] {:>5} {}", bin.start, bin.end, bin.count, bar);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
    Ok(())
}

fn print_numeric_stats(summary: &Summary) {
    println!("NUMERIC COLUMNS");
    println!("{}", "-".repeat(40));
    if summary.column_stats.is_empty() {
        println!("  No numeric columns");
    } else {
        println!(
            "{:<20} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "Median", "Max"
        );
        println!("{}", "-".repeat(93));
        for stats in &summary.column_stats {
            println!(
                "{:<20} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12}",
                truncate_str(&stats.column, 19),
                stats.count,
                fmt_opt(stats.mean),
                fmt_opt(stats.std),
                fmt_opt(stats.min),
                fmt_opt(stats.median),
                fmt_opt(stats.max)
            );
        }
    }
    println!();
}

fn print_correlations(summary: &Summary) {
    let Some(matrix) = &summary.correlation else {
        return;
    };

    println!("CORRELATION MATRIX");
    println!("{}", "-".repeat(40));
    print!("{:<20}", "");
    for name in &matrix.columns {
        print!(" {:>12}", truncate_str(name, 12));
    }
    println!();
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("{:<20}", truncate_str(name, 19));
        for value in row {
            print!(" {:>12}", fmt_opt(*value));
        }
        println!();
    }
    println!();
}

fn print_frequencies(table: &Table) -> Result<()> {
    for column in table.text_columns() {
        let counts = value_counts(table, &column, DEFAULT_TOP_VALUES)?;
        println!(
            "VALUE COUNTS: {} ({} distinct shown, {} missing)",
            column,
            counts.distinct(),
            counts.missing_count
        );
        println!("{}", "-".repeat(40));
        for entry in &counts.entries {
            println!(
                "  {:<24} {:>7} {:>8.2}%",
                truncate_str(&entry.value, 23),
                entry.count,
                entry.percentage
            );
        }
        println!();
    }
    Ok(())
}

// ============================================================================
// sample
// ============================================================================

fn run_sample(args: &SampleArgs) -> Result<()> {
    let table = SampleDataset::builder()
        .rows(args.rows)
        .seed(args.seed)
        .build()?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    table.write_csv_path(&args.output)?;

    info!(
        "Sample dataset written: {} ({} rows)",
        args.output.display(),
        table.height()
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}
