//! Per-group (part) aggregation.
//!
//! Each group is aggregated independently from a read-only view of the
//! submitted answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matcher::{evaluate, Outcome};
use crate::model::{QuestionGroup, SubmittedAnswer};

/// Lookup from question id to the first answer submitted for it.
#[derive(Debug, Default)]
pub struct AnswerSheet<'a> {
    by_question: HashMap<&'a str, &'a SubmittedAnswer>,
}

impl<'a> AnswerSheet<'a> {
    pub fn new(answers: &'a [SubmittedAnswer]) -> Self {
        let mut by_question = HashMap::with_capacity(answers.len());
        for answer in answers {
            by_question
                .entry(answer.question_id.as_str())
                .or_insert(answer);
        }
        Self { by_question }
    }

    pub fn get(&self, question_id: &str) -> Option<&'a SubmittedAnswer> {
        self.by_question.get(question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }
}

/// Subtotals for one question group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartStat {
    pub title: String,
    pub total_questions: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub not_answered: u32,
    /// `round(correct / total_questions * 100)`, 0 for an empty group.
    pub percentage: u32,
    pub points_earned: u64,
    pub points_possible: u64,
}

impl PartStat {
    fn record(&mut self, outcome: Outcome, point: u32) {
        let point = u64::from(point);
        self.total_questions += 1;
        self.points_possible += point;
        match outcome {
            Outcome::Correct => {
                self.correct += 1;
                self.points_earned += point;
            }
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::NotAnswered => self.not_answered += 1,
        }
    }
}

/// Integer percentage rounded half up; 0 when `total` is 0.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (correct, total) = (u64::from(correct), u64::from(total));
    ((correct * 200 + total) / (total * 2)) as u32
}

/// Aggregate one group against the full list of submitted answers.
pub fn aggregate_group(group: &QuestionGroup, answers: &[SubmittedAnswer]) -> PartStat {
    aggregate_group_with(group, &AnswerSheet::new(answers))
}

/// Aggregate one group using a prebuilt answer sheet.
pub fn aggregate_group_with(group: &QuestionGroup, sheet: &AnswerSheet<'_>) -> PartStat {
    let mut stat = PartStat {
        title: group.title(),
        ..Default::default()
    };

    for question in group.ordered_questions() {
        let outcome = evaluate(question, sheet.get(&question.id));
        stat.record(outcome, question.point);
    }

    stat.percentage = percentage(stat.correct, stat.total_questions);
    stat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DragItem, Question, QuestionKind, QuestionVariant};

    fn drag_group() -> QuestionGroup {
        let zone = |id: &str, index: u32, item: &str| Question {
            id: id.into(),
            order: index + 1,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::DragAndDrop {
                zone_index: index,
                correct_drag_item_id: item.into(),
            },
        };
        QuestionGroup {
            id: "g-dnd".into(),
            section_label: String::new(),
            section_order: 1,
            instruction: "Drag the labels onto the map".into(),
            kind: QuestionKind::DragAndDrop,
            questions: vec![zone("z1", 0, "item-a"), zone("z2", 1, "item-b")],
            drag_items: ["item-a", "item-b", "item-c"]
                .iter()
                .map(|id| DragItem {
                    id: (*id).into(),
                    content: id.to_uppercase(),
                })
                .collect(),
        }
    }

    fn dropped(zone: &str, item: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: zone.into(),
            drag_item_id: Some(item.into()),
            ..Default::default()
        }
    }

    #[test]
    fn percentage_rounds_half_up_and_handles_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn drag_and_drop_group_counts_correct_and_incorrect() {
        let answers = vec![dropped("z1", "item-a"), dropped("z2", "item-c")];
        let stat = aggregate_group(&drag_group(), &answers);
        assert_eq!(stat.title, "Part 1");
        assert_eq!(stat.total_questions, 2);
        assert_eq!(stat.correct, 1);
        assert_eq!(stat.incorrect, 1);
        assert_eq!(stat.not_answered, 0);
        assert_eq!(stat.percentage, 50);
    }

    #[test]
    fn missing_answers_are_not_answered() {
        let stat = aggregate_group(&drag_group(), &[dropped("z2", "item-b")]);
        assert_eq!(stat.correct, 1);
        assert_eq!(stat.incorrect, 0);
        assert_eq!(stat.not_answered, 1);
        assert_eq!(
            stat.total_questions,
            stat.correct + stat.incorrect + stat.not_answered
        );
    }

    #[test]
    fn empty_group_has_zero_percentage() {
        let mut group = drag_group();
        group.questions.clear();
        let stat = aggregate_group(&group, &[]);
        assert_eq!(stat.total_questions, 0);
        assert_eq!(stat.percentage, 0);
    }

    #[test]
    fn points_follow_question_weights() {
        let mut group = drag_group();
        group.questions[0].point = 3;
        let answers = vec![dropped("z1", "item-a"), dropped("z2", "item-a")];
        let stat = aggregate_group(&group, &answers);
        assert_eq!(stat.points_earned, 3);
        assert_eq!(stat.points_possible, 4);
    }

    #[test]
    fn maximal_point_weights_do_not_overflow() {
        let mut group = drag_group();
        for q in &mut group.questions {
            q.point = u32::MAX;
        }
        let answers = vec![dropped("z1", "item-a"), dropped("z2", "item-b")];
        let stat = aggregate_group(&group, &answers);
        assert_eq!(stat.correct, 2);
        assert_eq!(stat.points_earned, 2 * u64::from(u32::MAX));
        assert_eq!(stat.points_possible, 2 * u64::from(u32::MAX));
    }

    #[test]
    fn answer_sheet_keeps_first_answer() {
        let answers = vec![dropped("z1", "item-a"), dropped("z1", "item-b")];
        let sheet = AnswerSheet::new(&answers);
        assert_eq!(sheet.len(), 1);
        assert_eq!(
            sheet.get("z1").and_then(|a| a.drag_item_id.as_deref()),
            Some("item-a")
        );
        assert!(sheet.get("z9").is_none());
    }
}
