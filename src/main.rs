// Entry point and high-level CLI flow.
//
// - Load the project and timesheet CSV files, printing diagnostics.
// - Run the analysis once.
// - Write the CSV tables, the full analysis JSON, an executive summary and
//   the plain-text reports, then print previews of each table to the console.
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wtl_report::insights::{derive_insights, Insights};
use wtl_report::{
    analyze, loader, output, reports, text_report, util, AnalysisConfig, AnalysisResult,
};

#[derive(Debug, Parser)]
#[command(name = "wtl_report", about = "Project profitability and labor-efficiency report")]
struct Cli {
    /// Project-financial table (CSV).
    #[arg(long, env = "WTL_PROJECTS")]
    projects: PathBuf,

    /// Timesheet table (CSV).
    #[arg(long, env = "WTL_TIMESHEET")]
    timesheet: PathBuf,

    /// Rates and thresholds (TOML). Built-in defaults when omitted.
    #[arg(long, env = "WTL_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "reports")]
    output_dir: PathBuf,

    /// Override the configured length of the top project lists.
    #[arg(long)]
    top: Option<usize>,

    /// Rows shown in each console preview.
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ExecutiveSummary<'a> {
    generated_at: DateTime<Local>,
    totals: &'a wtl_report::analysis::Totals,
    insights: &'a Insights,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(n) = cli.top {
        config.top_n = n;
    }
    Ok(config)
}

/// Load both tables and run the analysis.
fn handle_load(cli: &Cli, config: &AnalysisConfig) -> Result<AnalysisResult> {
    let (projects, project_report) = loader::load_projects(&cli.projects)
        .with_context(|| format!("loading {}", cli.projects.display()))?;
    let (timesheet, timesheet_report) = loader::load_timesheet(&cli.timesheet)
        .with_context(|| format!("loading {}", cli.timesheet.display()))?;

    println!(
        "Processing dataset... ({} project rows, {} timesheet rows)",
        util::format_int(project_report.total_rows),
        util::format_int(timesheet_report.total_rows)
    );
    let skipped = project_report.parse_errors + timesheet_report.parse_errors;
    if skipped > 0 {
        println!("Note: {} rows skipped as unreadable.", util::format_int(skipped));
    }

    let result = analyze(&projects, &timesheet, config);
    let dq = &result.data_quality;
    if dq.has_issues() {
        println!(
            "Note: {} data-quality issues defaulted ({} orphan timesheet rows, {} hours).",
            util::format_int(dq.issue_count()),
            util::format_int(dq.orphan_entries),
            util::format_number(dq.orphan_hours, 1)
        );
    }
    println!();
    Ok(result)
}

/// Write every export and print console previews.
fn handle_generate_reports(
    cli: &Cli,
    config: &AnalysisConfig,
    result: &AnalysisResult,
) -> Result<()> {
    let dir = &cli.output_dir;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let out = |name: &str| -> PathBuf { dir.join(name) };

    let financial = reports::financial_summary_rows(&result.projects);
    write_csv(&out("financial_summary.csv"), &financial)?;
    let top = reports::financial_summary_rows(&result.top_profitable);
    output::preview_table(
        "Top Profitable Projects",
        Some("sorted by profit"),
        &top,
        cli.preview_rows,
    );

    let departments = reports::department_rows(result);
    write_csv(&out("department_summary.csv"), &departments)?;
    output::preview_table(
        "Department Analysis",
        Some("sorted by labor cost"),
        &departments,
        cli.preview_rows,
    );

    let types = reports::project_type_rows(result);
    write_csv(&out("project_types.csv"), &types)?;
    output::preview_table("Project Type Comparison", None, &types, cli.preview_rows);

    let statuses = reports::status_rows(result);
    write_csv(&out("gs_status.csv"), &statuses)?;
    output::preview_table(
        "GS Project Status Analysis",
        Some("GS projects only"),
        &statuses,
        cli.preview_rows,
    );

    let insights = derive_insights(result, config);
    let generated_at = Local::now();
    let summary = ExecutiveSummary {
        generated_at,
        totals: &result.totals,
        insights: &insights,
    };
    write_json(&out("analysis.json"), result)?;
    write_json(&out("executive_summary.json"), &summary)?;

    let stamp = generated_at.naive_local();
    write_text(
        &out("financial_report.txt"),
        &text_report::financial_report(result, &insights, stamp),
    )?;
    write_text(
        &out("department_report.txt"),
        &text_report::department_report(result, stamp),
    )?;
    match text_report::gs_status_report(result, stamp) {
        Some(text) => write_text(&out("gs_status_report.txt"), &text)?,
        None => warn!("no GS projects; skipping status report"),
    }

    print_summary(result, &insights, dir);
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    output::write_csv(path, rows).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    output::write_json(path, value).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote JSON");
    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    output::write_text(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

fn print_summary(result: &AnalysisResult, insights: &Insights, dir: &Path) {
    let t = &result.totals;
    let e = &result.efficiency;
    println!("{}", "=".repeat(60));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(60));
    println!("\nFinancial Summary:");
    println!("  Total Revenue: ¥{}", util::format_number(t.total_revenue, 2));
    println!("  Total Cost: ¥{}", util::format_number(t.total_cost, 2));
    println!("  Total Profit: ¥{}", util::format_number(t.total_profit, 2));
    println!("  Average Margin: {:.2}%", t.average_margin_pct);
    println!(
        "  Projects: {} ({} profitable, {} loss-making, {} break-even)",
        t.project_count, t.profitable_count, t.loss_count, t.break_even_count
    );
    println!("\nEfficiency:");
    println!("  Mean {:.2} | Median {:.2} | Std {:.2}", e.mean, e.median, e.std_dev);
    println!(
        "  P25 {:.2} | P50 {:.2} | P75 {:.2} | P90 {:.2}",
        e.percentiles.p25, e.percentiles.p50, e.percentiles.p75, e.percentiles.p90
    );
    if !insights.alerts.is_empty() {
        println!("\nAlerts:");
        for alert in &insights.alerts {
            println!("  [{:?}] {}", alert.severity, alert.message);
        }
    }
    println!("\nOutputs saved to {}/", dir.display());
    println!("{}", "=".repeat(60));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let result = handle_load(&cli, &config)?;
    handle_generate_reports(&cli, &config, &result)
}
