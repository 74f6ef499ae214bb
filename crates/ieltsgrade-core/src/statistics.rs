//! Attempt-level statistics.
//!
//! Groups are aggregated in `section_order` and the per-part subtotals are
//! folded into totals, a headline percentage, and a performance tier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate_group_with, percentage, AnswerSheet, PartStat};
use crate::model::{Attempt, QuestionGroup, Task};

/// Display tier derived from the score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Limited,
    Modest,
    Competent,
    Expert,
}

impl PerformanceTier {
    /// Map a percentage to its tier; lower bounds are inclusive.
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            PerformanceTier::Expert
        } else if percentage >= 70 {
            PerformanceTier::Competent
        } else if percentage >= 40 {
            PerformanceTier::Modest
        } else {
            PerformanceTier::Limited
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTier::Expert => write!(f, "Expert"),
            PerformanceTier::Competent => write!(f, "Competent"),
            PerformanceTier::Modest => write!(f, "Modest"),
            PerformanceTier::Limited => write!(f, "Limited"),
        }
    }
}

/// Statistics for a whole attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStats {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub not_answered: u32,
    pub score_percentage: u32,
    pub tier: PerformanceTier,
    pub points_earned: u64,
    pub points_possible: u64,
    /// One entry per group, in section order.
    pub part_stats: Vec<PartStat>,
}

impl AttemptStats {
    /// Fold ordered part subtotals into attempt totals.
    pub fn from_parts(part_stats: Vec<PartStat>) -> Self {
        let total_questions: u32 = part_stats.iter().map(|p| p.total_questions).sum();
        let correct_answers: u32 = part_stats.iter().map(|p| p.correct).sum();
        let not_answered: u32 = part_stats.iter().map(|p| p.not_answered).sum();
        let score_percentage = percentage(correct_answers, total_questions);

        Self {
            total_questions,
            correct_answers,
            incorrect_answers: total_questions - correct_answers - not_answered,
            not_answered,
            score_percentage,
            tier: PerformanceTier::from_percentage(score_percentage),
            points_earned: part_stats.iter().map(|p| p.points_earned).sum(),
            points_possible: part_stats.iter().map(|p| p.points_possible).sum(),
            part_stats,
        }
    }

    /// Number of questions the learner responded to.
    pub fn answered(&self) -> u32 {
        self.correct_answers + self.incorrect_answers
    }
}

/// The task's groups sorted by `section_order`; ties keep their authored position.
pub fn ordered_groups(task: &Task) -> Vec<&QuestionGroup> {
    let mut groups: Vec<&QuestionGroup> = task.groups.iter().collect();
    groups.sort_by_key(|g| g.section_order);
    groups
}

/// Build the statistics for one attempt.
pub fn build_statistics(attempt: &Attempt) -> AttemptStats {
    let sheet = AnswerSheet::new(&attempt.answers);
    let parts = ordered_groups(&attempt.task)
        .into_iter()
        .map(|group| aggregate_group_with(group, &sheet))
        .collect();
    AttemptStats::from_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AttemptTiming, Choice, Question, QuestionKind, QuestionVariant, SubmittedAnswer,
    };

    fn fill_question(id: &str, order: u32, answer: &str) -> Question {
        Question {
            id: id.into(),
            order,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::FillInBlank {
                blank_index: order,
                correct_answer: answer.into(),
            },
        }
    }

    fn group(id: &str, section_order: u32, questions: Vec<Question>) -> QuestionGroup {
        QuestionGroup {
            id: id.into(),
            section_label: String::new(),
            section_order,
            instruction: String::new(),
            kind: QuestionKind::FillInBlank,
            questions,
            drag_items: vec![],
        }
    }

    fn attempt(groups: Vec<QuestionGroup>, answers: Vec<SubmittedAnswer>) -> Attempt {
        Attempt {
            id: "attempt-1".into(),
            task: Task {
                id: "task-1".into(),
                title: "Sample".into(),
                skill: Default::default(),
                groups,
            },
            answers,
            timing: AttemptTiming::default(),
        }
    }

    fn filled(id: &str, text: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: id.into(),
            filled_text_answer: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(PerformanceTier::from_percentage(100), PerformanceTier::Expert);
        assert_eq!(PerformanceTier::from_percentage(90), PerformanceTier::Expert);
        assert_eq!(PerformanceTier::from_percentage(89), PerformanceTier::Competent);
        assert_eq!(PerformanceTier::from_percentage(70), PerformanceTier::Competent);
        assert_eq!(PerformanceTier::from_percentage(69), PerformanceTier::Modest);
        assert_eq!(PerformanceTier::from_percentage(40), PerformanceTier::Modest);
        assert_eq!(PerformanceTier::from_percentage(39), PerformanceTier::Limited);
        assert_eq!(PerformanceTier::from_percentage(0), PerformanceTier::Limited);
    }

    #[test]
    fn empty_attempt_yields_zeroes() {
        let stats = build_statistics(&attempt(vec![], vec![]));
        assert_eq!(stats.total_questions, 0);
        assert_eq!(stats.correct_answers, 0);
        assert_eq!(stats.incorrect_answers, 0);
        assert_eq!(stats.not_answered, 0);
        assert_eq!(stats.score_percentage, 0);
        assert_eq!(stats.tier, PerformanceTier::Limited);
        assert!(stats.part_stats.is_empty());
    }

    #[test]
    fn parts_follow_section_order() {
        let groups = vec![
            group("second", 2, vec![fill_question("q2", 2, "b")]),
            group("first", 1, vec![fill_question("q1", 1, "a")]),
        ];
        let stats = build_statistics(&attempt(groups, vec![filled("q1", "a")]));
        let titles: Vec<&str> = stats.part_stats.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Part 1", "Part 2"]);
        assert_eq!(stats.part_stats[0].correct, 1);
        assert_eq!(stats.part_stats[1].not_answered, 1);
    }

    #[test]
    fn totals_are_exhaustive() {
        let groups = vec![group(
            "g",
            1,
            vec![
                fill_question("q1", 1, "a"),
                fill_question("q2", 2, "b"),
                fill_question("q3", 3, "c"),
                fill_question("q4", 4, "d"),
            ],
        )];
        let answers = vec![filled("q1", "A"), filled("q2", "x"), filled("q3", " ")];
        let stats = build_statistics(&attempt(groups, answers));
        assert_eq!(stats.correct_answers, 1);
        assert_eq!(stats.incorrect_answers, 1);
        assert_eq!(stats.not_answered, 2);
        assert_eq!(
            stats.total_questions,
            stats.correct_answers + stats.incorrect_answers + stats.not_answered
        );
        assert_eq!(stats.answered(), 2);
        assert_eq!(stats.score_percentage, 25);
    }

    #[test]
    fn mixed_kinds_across_groups() {
        let mcq = Question {
            id: "m1".into(),
            order: 1,
            point: 2,
            explanation: String::new(),
            variant: QuestionVariant::MultipleChoice {
                choices: vec![
                    Choice {
                        id: "A".into(),
                        label: "A".into(),
                        content: "yes".into(),
                        is_correct: true,
                    },
                    Choice {
                        id: "B".into(),
                        label: "B".into(),
                        content: "no".into(),
                        is_correct: false,
                    },
                ],
                number_of_correct_answers: 1,
            },
        };
        let mut mcq_group = group("g1", 1, vec![mcq]);
        mcq_group.kind = QuestionKind::MultipleChoice;
        let groups = vec![mcq_group, group("g2", 2, vec![fill_question("f1", 2, "tide")])];
        let answers = vec![
            SubmittedAnswer {
                question_id: "m1".into(),
                choice_ids: vec!["A".into()],
                ..Default::default()
            },
            filled("f1", "Tide"),
        ];
        let stats = build_statistics(&attempt(groups, answers));
        assert_eq!(stats.correct_answers, 2);
        assert_eq!(stats.score_percentage, 100);
        assert_eq!(stats.tier, PerformanceTier::Expert);
        assert_eq!(stats.points_earned, 3);
        assert_eq!(stats.points_possible, 3);
    }

    #[test]
    fn large_point_weights_sum_across_parts() {
        let heavy = |id: &str, order: u32| {
            let mut q = fill_question(id, order, "tide");
            q.point = u32::MAX;
            q
        };
        let groups = vec![
            group("g1", 1, vec![heavy("f1", 1), heavy("f2", 2)]),
            group("g2", 2, vec![heavy("f3", 3)]),
        ];
        let answers = vec![filled("f1", "tide"), filled("f3", "tide")];
        let stats = build_statistics(&attempt(groups, answers));
        assert_eq!(stats.points_earned, 2 * u64::from(u32::MAX));
        assert_eq!(stats.points_possible, 3 * u64::from(u32::MAX));
        assert_eq!(stats.not_answered, 1);
    }
}
