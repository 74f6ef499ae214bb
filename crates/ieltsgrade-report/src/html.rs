//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined: a cohort summary
//! followed by one score card per graded attempt.

use anyhow::Result;
use std::path::Path;

use ieltsgrade_core::aggregate::PartStat;
use ieltsgrade_core::report::{GradeReport, GradedAttempt};
use ieltsgrade_core::statistics::PerformanceTier;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn tier_class(tier: PerformanceTier) -> &'static str {
    match tier {
        PerformanceTier::Expert => "tier-expert",
        PerformanceTier::Competent => "tier-competent",
        PerformanceTier::Modest => "tier-modest",
        PerformanceTier::Limited => "tier-limited",
    }
}

/// Generate an HTML report from a grade report.
pub fn generate_html(report: &GradeReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>ieltsgrade report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>ieltsgrade report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} attempts | {}</p>\n",
        report.summary.attempts,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Cohort summary
    let s = &report.summary;
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Attempts</th><th>Mean score</th><th>Best</th><th>Worst</th><th>Expert</th><th>Competent</th><th>Modest</th><th>Limited</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{:.1}%</td><td>{}%</td><td>{}%</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        s.attempts,
        s.mean_score,
        s.best_score,
        s.worst_score,
        s.tiers.expert,
        s.tiers.competent,
        s.tiers.modest,
        s.tiers.limited,
    ));
    html.push_str("</table>\n");
    if !report.failed_attempts.is_empty() {
        html.push_str(&format!(
            "<p class=\"failed\">Not graded: {}</p>\n",
            html_escape(&report.failed_attempts.join(", "))
        ));
    }
    html.push_str("</section>\n");

    // Per-attempt score cards
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Attempts</h2>\n");
    for attempt in &report.attempts {
        html.push_str(&score_card(attempt));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn score_card(attempt: &GradedAttempt) -> String {
    let stats = &attempt.stats;
    let mut card = String::new();

    card.push_str(&format!(
        "<article class=\"card {}\">\n",
        tier_class(stats.tier)
    ));
    card.push_str(&format!(
        "<h3>{} <span class=\"meta\">({} · attempt {})</span></h3>\n",
        html_escape(&attempt.task_title),
        attempt.skill,
        html_escape(&attempt.attempt_id)
    ));
    card.push_str(&format!(
        "<p class=\"score\">{}% <span class=\"tier\">{}</span></p>\n",
        stats.score_percentage, stats.tier
    ));
    card.push_str(&format!(
        "<p class=\"meta\">{} correct · {} incorrect · {} not answered · {} questions</p>\n",
        stats.correct_answers, stats.incorrect_answers, stats.not_answered, stats.total_questions
    ));
    if let Some(secs) = attempt.duration_seconds {
        card.push_str(&format!(
            "<p class=\"meta\">Time taken: {}m {:02}s</p>\n",
            secs / 60,
            secs % 60
        ));
    }

    card.push_str("<table>\n");
    card.push_str("<thead><tr><th>Part</th><th>Correct</th><th>Questions</th><th>Score</th></tr></thead>\n<tbody>\n");
    for part in &stats.part_stats {
        card.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td></tr>\n",
            html_escape(&part.title),
            part.correct,
            part.total_questions,
            part.percentage
        ));
    }
    card.push_str("</tbody></table>\n");

    if !stats.part_stats.is_empty() {
        card.push_str(&generate_bar_chart(&stats.part_stats));
    }

    card.push_str("</article>\n");
    card
}

fn generate_bar_chart(parts: &[PartStat]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 160;

    let total_height = parts.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, part) in parts.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = part.percentage.min(100) as usize * max_width / 100;

        let color = if part.percentage >= 70 {
            "#22c55e"
        } else if part.percentage >= 40 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&part.title)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            part.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --expert: #dcfce7; --competent: #e0f2fe; --modest: #fef9c3; --limited: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --expert: #064e3b; --competent: #0c4a6e; --modest: #713f12; --limited: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; margin: 1.5rem 0; }
.score { font-size: 2rem; font-weight: bold; margin: 0.5rem 0; }
.tier { font-size: 1rem; font-weight: normal; margin-left: 0.5rem; }
.tier-expert { background: var(--expert); }
.tier-competent { background: var(--competent); }
.tier-modest { background: var(--modest); }
.tier-limited { background: var(--limited); }
.failed { color: #ef4444; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
