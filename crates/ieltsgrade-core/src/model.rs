//! Core data model types for ieltsgrade.
//!
//! Tasks (reading passages and listening tasks) are made of ordered,
//! homogeneous question groups. Each question is one of four kinds and
//! carries the answer key for that kind.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single question with its answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// 1-based order used for numbering and tie-breaks.
    pub order: u32,
    /// Weight of the question.
    #[serde(default = "default_point")]
    pub point: u32,
    /// Display-only explanation, never used for scoring.
    #[serde(default)]
    pub explanation: String,
    /// Kind-specific answer key.
    #[serde(flatten)]
    pub variant: QuestionVariant,
}

impl Question {
    /// The discriminant of this question's variant.
    pub fn kind(&self) -> QuestionKind {
        self.variant.kind()
    }
}

pub(crate) fn default_point() -> u32 {
    1
}

/// The four question kinds, each with its own answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionVariant {
    MultipleChoice {
        choices: Vec<Choice>,
        /// How many choices the learner is expected to pick.
        #[serde(default = "default_correct_count")]
        number_of_correct_answers: u32,
    },
    FillInBlank {
        /// Position of the blank within the group text.
        blank_index: u32,
        correct_answer: String,
    },
    Matching {
        correct_answer_for_matching: String,
    },
    DragAndDrop {
        zone_index: u32,
        correct_drag_item_id: String,
    },
}

fn default_correct_count() -> u32 {
    1
}

impl QuestionVariant {
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionVariant::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionVariant::FillInBlank { .. } => QuestionKind::FillInBlank,
            QuestionVariant::Matching { .. } => QuestionKind::Matching,
            QuestionVariant::DragAndDrop { .. } => QuestionKind::DragAndDrop,
        }
    }
}

/// One option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    /// Short label shown next to the option (e.g. "A").
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Payload-free discriminant of a question kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    FillInBlank,
    Matching,
    DragAndDrop,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
            QuestionKind::FillInBlank => write!(f, "fill_in_blank"),
            QuestionKind::Matching => write!(f, "matching"),
            QuestionKind::DragAndDrop => write!(f, "drag_and_drop"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "multiple_choice" | "multiplechoice" | "mcq" => Ok(QuestionKind::MultipleChoice),
            "fill_in_blank" | "fillinblank" | "fill_blank" | "gap_fill" => {
                Ok(QuestionKind::FillInBlank)
            }
            "matching" => Ok(QuestionKind::Matching),
            "drag_and_drop" | "draganddrop" | "drag_drop" => Ok(QuestionKind::DragAndDrop),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A draggable token that can be dropped into one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragItem {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// An ordered, homogeneous cluster of questions sharing one instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionGroup {
    pub id: String,
    #[serde(default)]
    pub section_label: String,
    /// Defines part ordering within the task.
    pub section_order: u32,
    #[serde(default)]
    pub instruction: String,
    /// Kind shared by every question in the group.
    pub kind: QuestionKind,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Drag items available across the group (drag-and-drop groups only).
    #[serde(default)]
    pub drag_items: Vec<DragItem>,
}

impl QuestionGroup {
    /// Display title: the section label, or `Part {section_order}` when blank.
    pub fn title(&self) -> String {
        let label = self.section_label.trim();
        if label.is_empty() {
            format!("Part {}", self.section_order)
        } else {
            label.to_string()
        }
    }

    /// Questions sorted by `order`; ties keep their authored position.
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self.questions.iter().collect();
        questions.sort_by_key(|q| q.order);
        questions
    }

    /// Look up a drag item by id.
    pub fn drag_item(&self, id: &str) -> Option<&DragItem> {
        self.drag_items.iter().find(|d| d.id == id)
    }
}

/// Which IELTS skill a task exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    #[default]
    Reading,
    Listening,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skill::Reading => write!(f, "reading"),
            Skill::Listening => write!(f, "listening"),
        }
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reading" | "passage" => Ok(Skill::Reading),
            "listening" => Ok(Skill::Listening),
            other => Err(format!("unknown skill: {other}")),
        }
    }
}

/// A passage or listening task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub skill: Skill,
    #[serde(default)]
    pub groups: Vec<QuestionGroup>,
}

impl Task {
    /// Total number of questions across all groups.
    pub fn question_count(&self) -> usize {
        self.groups.iter().map(|g| g.questions.len()).sum()
    }
}

/// A learner's answer to one question.
///
/// Only the field relevant to the question's kind is consulted; the others
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choice_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_text_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_item_id: Option<String>,
}

/// Timing metadata recorded by the attempt session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptTiming {
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
}

impl AttemptTiming {
    /// Duration in seconds, derived from the timestamps when not recorded.
    pub fn effective_duration_seconds(&self) -> Option<u64> {
        self.duration_seconds.or_else(|| match (self.start_at, self.finished_at) {
            (Some(start), Some(end)) if end >= start => {
                Some((end - start).num_seconds().max(0) as u64)
            }
            _ => None,
        })
    }
}

/// One learner's submission against one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub task: Task,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub timing: AttemptTiming,
}
