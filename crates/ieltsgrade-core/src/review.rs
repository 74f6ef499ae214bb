//! Per-question review.
//!
//! Annotates every question of an attempt with its canonical number, its
//! outcome, and display strings for what was submitted and what was expected.

use serde::{Deserialize, Serialize};

use crate::aggregate::AnswerSheet;
use crate::matcher::{evaluate, response_for, Outcome, Response};
use crate::model::{
    Attempt, Question, QuestionGroup, QuestionKind, QuestionVariant, SubmittedAnswer,
};
use crate::statistics::ordered_groups;

/// Review line for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// Canonical question number, taken from the authored question order.
    pub number: u32,
    pub question_id: String,
    pub group_id: String,
    pub part_title: String,
    pub kind: QuestionKind,
    pub outcome: Outcome,
    /// What the learner submitted, `None` when not answered.
    pub submitted: Option<String>,
    pub expected: String,
    #[serde(default)]
    pub explanation: String,
}

/// Review every question in section order, then question order.
pub fn review_attempt(attempt: &Attempt) -> Vec<QuestionReview> {
    let sheet = AnswerSheet::new(&attempt.answers);
    let mut reviews = Vec::with_capacity(attempt.task.question_count());

    for group in ordered_groups(&attempt.task) {
        let part_title = group.title();
        for question in group.ordered_questions() {
            let answer = sheet.get(&question.id);
            reviews.push(QuestionReview {
                number: question.order,
                question_id: question.id.clone(),
                group_id: group.id.clone(),
                part_title: part_title.clone(),
                kind: question.kind(),
                outcome: evaluate(question, answer),
                submitted: answer.and_then(|a| describe_submitted(group, question, a)),
                expected: describe_expected(group, question),
                explanation: question.explanation.clone(),
            });
        }
    }

    reviews
}

fn choice_label(question: &Question, choice_id: &str) -> String {
    if let QuestionVariant::MultipleChoice { choices, .. } = &question.variant {
        if let Some(choice) = choices.iter().find(|c| c.id == choice_id) {
            if !choice.label.is_empty() {
                return choice.label.clone();
            }
        }
    }
    choice_id.to_string()
}

fn drag_item_label(group: &QuestionGroup, item_id: &str) -> String {
    match group.drag_item(item_id) {
        Some(item) if !item.content.is_empty() => item.content.clone(),
        _ => item_id.to_string(),
    }
}

fn describe_submitted(
    group: &QuestionGroup,
    question: &Question,
    answer: &SubmittedAnswer,
) -> Option<String> {
    let response = response_for(question, answer)?;
    Some(match response {
        Response::Choices(chosen) => chosen
            .into_iter()
            .map(|id| choice_label(question, id))
            .collect::<Vec<_>>()
            .join(", "),
        Response::Text(text) => text.trim().to_string(),
        Response::DragItem(id) => drag_item_label(group, id),
    })
}

fn describe_expected(group: &QuestionGroup, question: &Question) -> String {
    match &question.variant {
        QuestionVariant::MultipleChoice { choices, .. } => choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| choice_label(question, &c.id))
            .collect::<Vec<_>>()
            .join(", "),
        QuestionVariant::FillInBlank { correct_answer, .. } => correct_answer.trim().to_string(),
        QuestionVariant::Matching {
            correct_answer_for_matching,
        } => correct_answer_for_matching.trim().to_string(),
        QuestionVariant::DragAndDrop {
            correct_drag_item_id,
            ..
        } => drag_item_label(group, correct_drag_item_id),
    }
}
