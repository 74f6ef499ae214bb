//! The `ieltsgrade grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use ieltsgrade_core::engine::{GradingEngine, GradingEngineConfig, ProgressReporter};
use ieltsgrade_core::parser;
use ieltsgrade_core::report::{GradeReport, GradedAttempt};
use ieltsgrade_report::html::write_html_report;

use crate::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_graded(&self, graded: &GradedAttempt) {
        eprintln!(
            "  Graded: {} :: {} {}/{} ({}%)",
            graded.attempt_id,
            graded.task_id,
            graded.stats.correct_answers,
            graded.stats.total_questions,
            graded.stats.score_percentage,
        );
    }

    fn on_attempt_error(&self, attempt_id: &str, error: &str) {
        eprintln!("  ERROR: {attempt_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.2}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    attempt_path: PathBuf,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let output = output.unwrap_or(config.output_dir);
    let format = format.unwrap_or(config.default_format);

    let attempts = parser::load_attempts(&attempt_path)?;
    anyhow::ensure!(
        !attempts.is_empty(),
        "no attempt records found in {}",
        attempt_path.display()
    );

    eprintln!("ieltsgrade v{}: grading {} attempt(s)", env!("CARGO_PKG_VERSION"), attempts.len());

    let engine = GradingEngine::new(GradingEngineConfig { parallelism });
    let report = engine.grade_all(attempts, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(|s| s.trim()).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    if !report.failed_attempts.is_empty() {
        anyhow::bail!(
            "{} attempt(s) could not be graded: {}",
            report.failed_attempts.len(),
            report.failed_attempts.join(", ")
        );
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Attempt",
        "Task",
        "Correct",
        "Incorrect",
        "Not answered",
        "Score",
        "Tier",
    ]);

    for a in &report.attempts {
        table.add_row(vec![
            Cell::new(&a.attempt_id),
            Cell::new(&a.task_title),
            Cell::new(format!("{}/{}", a.stats.correct_answers, a.stats.total_questions)),
            Cell::new(a.stats.incorrect_answers),
            Cell::new(a.stats.not_answered),
            Cell::new(format!("{}%", a.stats.score_percentage)),
            Cell::new(a.stats.tier),
        ]);
    }

    println!("{table}");
    println!(
        "Mean score: {:.1}% across {} attempt(s)",
        report.summary.mean_score, report.summary.attempts
    );
}
