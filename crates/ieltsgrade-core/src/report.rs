//! Grade report types with JSON persistence and progress comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Attempt, Skill};
use crate::statistics::{build_statistics, AttemptStats, PerformanceTier};

/// A complete grading report for a batch of attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Graded attempts, in input order.
    pub attempts: Vec<GradedAttempt>,
    /// Attempts that could not be graded.
    #[serde(default)]
    pub failed_attempts: Vec<String>,
    /// Cohort-level summary.
    pub summary: CohortSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Statistics for one attempt plus the identifying details a report needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAttempt {
    pub attempt_id: String,
    pub task_id: String,
    pub task_title: String,
    pub skill: Skill,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    pub stats: AttemptStats,
}

impl GradedAttempt {
    /// Grade an attempt.
    pub fn grade(attempt: &Attempt) -> Self {
        Self {
            attempt_id: attempt.id.clone(),
            task_id: attempt.task.id.clone(),
            task_title: attempt.task.title.clone(),
            skill: attempt.task.skill,
            duration_seconds: attempt.timing.effective_duration_seconds(),
            stats: build_statistics(attempt),
        }
    }
}

/// How many attempts landed in each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub expert: usize,
    pub competent: usize,
    pub modest: usize,
    pub limited: usize,
}

impl TierCounts {
    fn add(&mut self, tier: PerformanceTier) {
        match tier {
            PerformanceTier::Expert => self.expert += 1,
            PerformanceTier::Competent => self.competent += 1,
            PerformanceTier::Modest => self.modest += 1,
            PerformanceTier::Limited => self.limited += 1,
        }
    }
}

/// Aggregate numbers across every graded attempt in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub attempts: usize,
    pub total_questions: u64,
    pub correct_answers: u64,
    pub not_answered: u64,
    /// Mean of the attempts' score percentages.
    pub mean_score: f64,
    pub best_score: u32,
    pub worst_score: u32,
    pub tiers: TierCounts,
}

impl CohortSummary {
    pub fn from_attempts(attempts: &[GradedAttempt]) -> Self {
        if attempts.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            attempts: attempts.len(),
            best_score: u32::MIN,
            worst_score: u32::MAX,
            ..Default::default()
        };
        let mut score_sum = 0u64;
        for a in attempts {
            summary.total_questions += u64::from(a.stats.total_questions);
            summary.correct_answers += u64::from(a.stats.correct_answers);
            summary.not_answered += u64::from(a.stats.not_answered);
            summary.best_score = summary.best_score.max(a.stats.score_percentage);
            summary.worst_score = summary.worst_score.min(a.stats.score_percentage);
            summary.tiers.add(a.stats.tier);
            score_sum += u64::from(a.stats.score_percentage);
        }
        summary.mean_score = score_sum as f64 / attempts.len() as f64;
        summary
    }
}

impl GradeReport {
    /// Build a report from already graded attempts.
    pub fn new(attempts: Vec<GradedAttempt>, failed_attempts: Vec<String>, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            summary: CohortSummary::from_attempts(&attempts),
            attempts,
            failed_attempts,
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline, task by task.
    ///
    /// When a task was attempted several times in one report, its best score
    /// is used. Changes within `threshold` percentage points count as unchanged.
    pub fn compare(&self, baseline: &GradeReport, threshold: u32) -> ProgressReport {
        let best_scores = |report: &GradeReport| -> HashMap<String, (String, u32)> {
            let mut map: HashMap<String, (String, u32)> = HashMap::new();
            for a in &report.attempts {
                let entry = map
                    .entry(a.task_id.clone())
                    .or_insert_with(|| (a.task_title.clone(), 0));
                entry.1 = entry.1.max(a.stats.score_percentage);
            }
            map
        };

        let baseline_scores = best_scores(baseline);
        let current_scores = best_scores(self);
        let threshold = i64::from(threshold);

        let mut declines = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_tasks = 0usize;

        for (task_id, (title, current)) in &current_scores {
            let Some((_, baseline_score)) = baseline_scores.get(task_id) else {
                new_tasks += 1;
                continue;
            };
            let delta = i64::from(*current) - i64::from(*baseline_score);
            let change = ScoreChange {
                task_id: task_id.clone(),
                task_title: title.clone(),
                baseline_score: *baseline_score,
                current_score: *current,
                delta,
            };
            if delta < -threshold {
                declines.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        declines.sort_by(|a, b| a.delta.cmp(&b.delta).then(a.task_id.cmp(&b.task_id)));
        improvements.sort_by(|a, b| b.delta.cmp(&a.delta).then(a.task_id.cmp(&b.task_id)));

        let removed_tasks = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        ProgressReport {
            declines,
            improvements,
            unchanged,
            new_tasks,
            removed_tasks,
        }
    }
}

/// Result of comparing two grade reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Tasks whose score went down by more than the threshold.
    pub declines: Vec<ScoreChange>,
    /// Tasks whose score went up by more than the threshold.
    pub improvements: Vec<ScoreChange>,
    /// Tasks with no significant change.
    pub unchanged: usize,
    /// Tasks in current but not baseline.
    pub new_tasks: usize,
    /// Tasks in baseline but not current.
    pub removed_tasks: usize,
}

/// A per-task score change in percentage points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub task_id: String,
    pub task_title: String,
    pub baseline_score: u32,
    pub current_score: u32,
    pub delta: i64,
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} declines, {} improvements, {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let mut table = |heading: &str, rows: &[ScoreChange]| {
            if rows.is_empty() {
                return;
            }
            md.push_str(&format!("### {heading}\n\n"));
            md.push_str("| Task | Title | Baseline | Current | Delta |\n");
            md.push_str("|------|-------|----------|---------|-------|\n");
            for c in rows {
                md.push_str(&format!(
                    "| {} | {} | {}% | {}% | {:+} |\n",
                    c.task_id, c.task_title, c.baseline_score, c.current_score, c.delta
                ));
            }
            md.push('\n');
        };

        table("Declines", &self.declines);
        table("Improvements", &self.improvements);

        md
    }

    /// Returns true if any task declined.
    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PartStat;

    fn graded(task_id: &str, correct: u32, total: u32) -> GradedAttempt {
        let part = PartStat {
            title: "Part 1".into(),
            total_questions: total,
            correct,
            incorrect: total - correct,
            not_answered: 0,
            percentage: crate::aggregate::percentage(correct, total),
            points_earned: u64::from(correct),
            points_possible: u64::from(total),
        };
        GradedAttempt {
            attempt_id: format!("{task_id}-attempt"),
            task_id: task_id.into(),
            task_title: task_id.to_uppercase(),
            skill: Skill::Reading,
            duration_seconds: None,
            stats: AttemptStats::from_parts(vec![part]),
        }
    }

    fn report(attempts: Vec<GradedAttempt>) -> GradeReport {
        GradeReport::new(attempts, vec![], 0)
    }

    #[test]
    fn summary_of_empty_report_is_zeroed() {
        let summary = CohortSummary::from_attempts(&[]);
        assert_eq!(summary.attempts, 0);
        assert_eq!(summary.best_score, 0);
        assert_eq!(summary.worst_score, 0);
    }

    #[test]
    fn summary_tracks_scores_and_tiers() {
        let r = report(vec![graded("t1", 9, 10), graded("t2", 5, 10), graded("t3", 1, 10)]);
        assert_eq!(r.summary.attempts, 3);
        assert_eq!(r.summary.best_score, 90);
        assert_eq!(r.summary.worst_score, 10);
        assert!((r.summary.mean_score - 50.0).abs() < f64::EPSILON);
        assert_eq!(r.summary.tiers.expert, 1);
        assert_eq!(r.summary.tiers.modest, 1);
        assert_eq!(r.summary.tiers.limited, 1);
    }

    #[test]
    fn compare_identical_reports() {
        let baseline = report(vec![graded("t1", 7, 10)]);
        let current = report(vec![graded("t1", 7, 10)]);
        let progress = current.compare(&baseline, 5);
        assert!(progress.declines.is_empty());
        assert!(progress.improvements.is_empty());
        assert_eq!(progress.unchanged, 1);
    }

    #[test]
    fn compare_detects_decline_and_improvement() {
        let baseline = report(vec![graded("t1", 8, 10), graded("t2", 4, 10)]);
        let current = report(vec![graded("t1", 5, 10), graded("t2", 9, 10)]);
        let progress = current.compare(&baseline, 5);
        assert_eq!(progress.declines.len(), 1);
        assert_eq!(progress.declines[0].task_id, "t1");
        assert_eq!(progress.declines[0].delta, -30);
        assert_eq!(progress.improvements.len(), 1);
        assert!(progress.has_declines());
    }

    #[test]
    fn compare_uses_best_attempt_per_task() {
        let baseline = report(vec![graded("t1", 6, 10)]);
        let current = report(vec![graded("t1", 2, 10), graded("t1", 6, 10)]);
        let progress = current.compare(&baseline, 0);
        assert_eq!(progress.unchanged, 1);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = report(vec![graded("old", 5, 10)]);
        let current = report(vec![graded("new", 5, 10)]);
        let progress = current.compare(&baseline, 5);
        assert_eq!(progress.new_tasks, 1);
        assert_eq!(progress.removed_tasks, 1);
    }

    #[test]
    fn json_roundtrip() {
        let r = report(vec![graded("t1", 3, 4)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");

        r.save_json(&path).unwrap();
        let loaded = GradeReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, r.id);
        assert_eq!(loaded.attempts, r.attempts);
    }

    #[test]
    fn markdown_output() {
        let baseline = report(vec![graded("t1", 9, 10)]);
        let current = report(vec![graded("t1", 3, 10)]);
        let md = current.compare(&baseline, 5).to_markdown();
        assert!(md.contains("Declines"));
        assert!(md.contains("| t1 | T1 | 90% | 30% | -60 |"));
    }
}
