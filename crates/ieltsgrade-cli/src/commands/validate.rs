//! The `ieltsgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(attempt_path: PathBuf) -> Result<()> {
    let attempts = ieltsgrade_core::parser::load_attempts(&attempt_path)?;

    let mut total_warnings = 0;

    for attempt in &attempts {
        println!(
            "Attempt: {} ({} groups, {} questions)",
            attempt.id,
            attempt.task.groups.len(),
            attempt.task.question_count()
        );

        let warnings = ieltsgrade_core::parser::validate_attempt(attempt);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All attempt records valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
