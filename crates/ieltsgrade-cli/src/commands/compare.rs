//! The `ieltsgrade compare` command.

use std::path::PathBuf;

use anyhow::Result;

use ieltsgrade_core::report::GradeReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: u32,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let baseline = GradeReport::load_json(&baseline_path)?;
    let current = GradeReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                report.declines.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.declines.is_empty() {
                println!("\nDeclines:");
                for c in &report.declines {
                    println!(
                        "  {} ({}) {}% -> {}% ({:+})",
                        c.task_id, c.task_title, c.baseline_score, c.current_score, c.delta
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for c in &report.improvements {
                    println!(
                        "  {} ({}) {}% -> {}% ({:+})",
                        c.task_id, c.task_title, c.baseline_score, c.current_score, c.delta
                    );
                }
            }

            if report.new_tasks > 0 {
                println!("\n{} new task(s)", report.new_tasks);
            }
            if report.removed_tasks > 0 {
                println!("{} removed task(s)", report.removed_tasks);
            }
        }
    }

    if fail_on_decline && report.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
