//! Answer matching: the single definition of "correct" for every question kind.
//!
//! A question is judged only against its own answer key and the first
//! submitted answer carrying its id. Answers that are missing, blank, or
//! shaped for a different kind are "not answered", which is tracked apart
//! from "incorrect".

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionVariant, SubmittedAnswer};

/// Result of evaluating one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    NotAnswered,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
            Outcome::NotAnswered => "not answered",
        }
    }
}

/// The part of a submitted answer that is relevant to a question's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<'a> {
    Choices(BTreeSet<&'a str>),
    Text(&'a str),
    DragItem(&'a str),
}

/// Case-fold and trim a free-text answer.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// The first submitted answer whose `question_id` matches.
pub fn first_answer_for<'a>(
    question_id: &str,
    answers: &'a [SubmittedAnswer],
) -> Option<&'a SubmittedAnswer> {
    answers.iter().find(|a| a.question_id == question_id)
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

/// Extract the non-empty response relevant to `question`, if any.
///
/// Returns `None` when the learner left the question blank or submitted a
/// field that belongs to another kind.
pub fn response_for<'a>(question: &Question, answer: &'a SubmittedAnswer) -> Option<Response<'a>> {
    match &question.variant {
        QuestionVariant::MultipleChoice { .. } => {
            let chosen: BTreeSet<&str> = answer
                .choice_ids
                .iter()
                .map(|id| id.as_str())
                .filter(|id| !id.trim().is_empty())
                .collect();
            (!chosen.is_empty()).then_some(Response::Choices(chosen))
        }
        QuestionVariant::FillInBlank { .. } => {
            non_blank(answer.filled_text_answer.as_ref()).map(Response::Text)
        }
        QuestionVariant::Matching { .. } => {
            non_blank(answer.matched_text_answer.as_ref()).map(Response::Text)
        }
        QuestionVariant::DragAndDrop { .. } => {
            non_blank(answer.drag_item_id.as_ref()).map(Response::DragItem)
        }
    }
}

/// Evaluate a question against its (optional) submitted answer.
pub fn evaluate(question: &Question, answer: Option<&SubmittedAnswer>) -> Outcome {
    let Some(response) = answer.and_then(|a| response_for(question, a)) else {
        return Outcome::NotAnswered;
    };

    let correct = match (&question.variant, response) {
        (QuestionVariant::MultipleChoice { choices, .. }, Response::Choices(chosen)) => {
            let expected: BTreeSet<&str> = choices
                .iter()
                .filter(|c| c.is_correct)
                .map(|c| c.id.as_str())
                .collect();
            !expected.is_empty() && chosen == expected
        }
        (QuestionVariant::FillInBlank { correct_answer, .. }, Response::Text(text)) => {
            normalize_text(text) == normalize_text(correct_answer)
        }
        (
            QuestionVariant::Matching {
                correct_answer_for_matching,
            },
            Response::Text(text),
        ) => normalize_text(text) == normalize_text(correct_answer_for_matching),
        (
            QuestionVariant::DragAndDrop {
                correct_drag_item_id,
                ..
            },
            Response::DragItem(id),
        ) => id == correct_drag_item_id.as_str(),
        // response_for only yields the shape that belongs to the variant
        _ => return Outcome::NotAnswered,
    };

    if correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

/// Whether the first answer in `answers` carrying the question's id is correct.
///
/// `answers` may hold answers for other questions; they are ignored.
pub fn is_correct(question: &Question, answers: &[SubmittedAnswer]) -> bool {
    evaluate(question, first_answer_for(&question.id, answers)).is_correct()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;

    fn mcq(correct: &[&str]) -> Question {
        let choices = ["A", "B", "C", "D"]
            .iter()
            .map(|id| Choice {
                id: (*id).into(),
                label: (*id).into(),
                content: format!("option {id}"),
                is_correct: correct.contains(id),
            })
            .collect();
        Question {
            id: "q1".into(),
            order: 1,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::MultipleChoice {
                choices,
                number_of_correct_answers: correct.len() as u32,
            },
        }
    }

    fn fill(correct: &str) -> Question {
        Question {
            id: "q1".into(),
            order: 1,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::FillInBlank {
                blank_index: 0,
                correct_answer: correct.into(),
            },
        }
    }

    fn matching(correct: &str) -> Question {
        Question {
            id: "q1".into(),
            order: 1,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::Matching {
                correct_answer_for_matching: correct.into(),
            },
        }
    }

    fn choices(ids: &[&str]) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: "q1".into(),
            choice_ids: ids.iter().map(|s| (*s).into()).collect(),
            ..Default::default()
        }
    }

    fn filled(text: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: "q1".into(),
            filled_text_answer: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn multiple_choice_is_all_or_nothing() {
        let q = mcq(&["A", "B"]);
        assert!(!is_correct(&q, &[choices(&["A"])]));
        assert!(!is_correct(&q, &[choices(&["A", "C"])]));
        assert!(!is_correct(&q, &[choices(&["A", "B", "C"])]));
        assert!(is_correct(&q, &[choices(&["A", "B"])]));
        assert!(is_correct(&q, &[choices(&["B", "A"])]));
    }

    #[test]
    fn multiple_choice_duplicate_ids_collapse_to_a_set() {
        let q = mcq(&["C"]);
        assert!(is_correct(&q, &[choices(&["C", "C"])]));
    }

    #[test]
    fn multiple_choice_without_key_is_never_correct() {
        let q = mcq(&[]);
        assert_eq!(evaluate(&q, Some(&choices(&["A"]))), Outcome::Incorrect);
    }

    #[test]
    fn text_answers_are_trimmed_and_case_folded() {
        let q = fill("Paris");
        for text in ["Paris", " paris ", "PARIS"] {
            assert!(is_correct(&q, &[filled(text)]), "{text:?} should match");
        }
        assert!(!is_correct(&q, &[filled("Pari")]));
    }

    #[test]
    fn matching_uses_the_same_normalization() {
        let q = matching("iv");
        let answer = SubmittedAnswer {
            question_id: "q1".into(),
            matched_text_answer: Some("  IV".into()),
            ..Default::default()
        };
        assert!(is_correct(&q, &[answer]));
    }

    #[test]
    fn drag_and_drop_compares_item_ids() {
        let q = Question {
            id: "z1".into(),
            order: 1,
            point: 1,
            explanation: String::new(),
            variant: QuestionVariant::DragAndDrop {
                zone_index: 0,
                correct_drag_item_id: "item-a".into(),
            },
        };
        let answer = |id: &str| SubmittedAnswer {
            question_id: "z1".into(),
            drag_item_id: Some(id.into()),
            ..Default::default()
        };
        assert_eq!(evaluate(&q, Some(&answer("item-a"))), Outcome::Correct);
        assert_eq!(evaluate(&q, Some(&answer("item-c"))), Outcome::Incorrect);
    }

    #[test]
    fn blank_or_missing_answers_are_not_answered() {
        let q = fill("London");
        assert_eq!(evaluate(&q, None), Outcome::NotAnswered);
        assert_eq!(evaluate(&q, Some(&filled(""))), Outcome::NotAnswered);
        assert_eq!(evaluate(&q, Some(&filled("   "))), Outcome::NotAnswered);
        assert_eq!(evaluate(&mcq(&["A"]), Some(&choices(&[]))), Outcome::NotAnswered);
    }

    #[test]
    fn answer_shaped_for_another_kind_is_not_answered() {
        let q = fill("London");
        let wrong_shape = SubmittedAnswer {
            question_id: "q1".into(),
            matched_text_answer: Some("London".into()),
            ..Default::default()
        };
        assert_eq!(evaluate(&q, Some(&wrong_shape)), Outcome::NotAnswered);
    }

    #[test]
    fn only_the_first_matching_answer_counts() {
        let q = fill("London");
        let other = SubmittedAnswer {
            question_id: "other".into(),
            filled_text_answer: Some("London".into()),
            ..Default::default()
        };
        assert!(!is_correct(&q, &[other.clone()]));
        assert!(is_correct(&q, &[other.clone(), filled("london"), filled("Paris")]));
        assert!(!is_correct(&q, &[other, filled("Paris"), filled("london")]));
    }
}
