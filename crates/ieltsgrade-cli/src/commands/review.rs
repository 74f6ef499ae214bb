//! The `ieltsgrade review` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use ieltsgrade_core::parser;
use ieltsgrade_core::review::review_attempt;
use ieltsgrade_core::statistics::build_statistics;

pub fn execute(attempt_path: PathBuf, format: String) -> Result<()> {
    let attempt = parser::parse_attempt(&attempt_path)?;
    let reviews = review_attempt(&attempt);
    let stats = build_statistics(&attempt);

    if format == "json" {
        let payload = serde_json::json!({
            "attempt_id": attempt.id,
            "questions": reviews,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let title = if attempt.task.title.is_empty() {
        attempt.task.id.as_str()
    } else {
        attempt.task.title.as_str()
    };
    println!("{} ({}), attempt {}", title, attempt.task.skill, attempt.id);

    let mut table = Table::new();
    table.set_header(vec!["#", "Part", "Kind", "Result", "Your answer", "Expected"]);
    for r in &reviews {
        table.add_row(vec![
            Cell::new(r.number),
            Cell::new(&r.part_title),
            Cell::new(r.kind),
            Cell::new(r.outcome.label()),
            Cell::new(r.submitted.as_deref().unwrap_or("-")),
            Cell::new(&r.expected),
        ]);
    }
    println!("{table}");

    let mut parts = Table::new();
    parts.set_header(vec!["Part", "Correct", "Incorrect", "Not answered", "Score"]);
    for p in &stats.part_stats {
        parts.add_row(vec![
            Cell::new(&p.title),
            Cell::new(format!("{}/{}", p.correct, p.total_questions)),
            Cell::new(p.incorrect),
            Cell::new(p.not_answered),
            Cell::new(format!("{}%", p.percentage)),
        ]);
    }
    println!("{parts}");

    println!(
        "Score: {}% ({}): {} correct, {} incorrect, {} not answered of {}",
        stats.score_percentage,
        stats.tier,
        stats.correct_answers,
        stats.incorrect_answers,
        stats.not_answered,
        stats.total_questions
    );

    Ok(())
}
