//! Attempt record loading and validation.
//!
//! Attempt records arrive as JSON (or TOML) exported by the persistence
//! layer. They are deserialized into loosely-typed wire structs and then
//! converted into the typed model; conversion is where unknown question
//! kinds and missing answer keys are rejected.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::GradingError;
use crate::model::{
    default_point, Attempt, AttemptTiming, Choice, DragItem, Question, QuestionGroup,
    QuestionKind, QuestionVariant, Skill, SubmittedAnswer, Task,
};

/// Intermediate structure for attempt record files.
#[derive(Debug, Deserialize)]
struct RawAttempt {
    #[serde(alias = "attempt_id")]
    id: String,
    task: RawTask,
    #[serde(default)]
    answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    duration_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(alias = "task_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    skill: Option<String>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(alias = "group_id")]
    id: String,
    #[serde(default)]
    section_label: String,
    section_order: u32,
    #[serde(default)]
    instruction: String,
    question_type: KindTag,
    #[serde(default)]
    questions: Vec<RawQuestion>,
    #[serde(default)]
    drag_items: Vec<DragItem>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(alias = "question_id")]
    id: String,
    #[serde(alias = "question_order")]
    order: u32,
    #[serde(default = "default_point")]
    point: u32,
    #[serde(default)]
    explanation: String,
    /// Falls back to the group's `question_type` when absent.
    #[serde(default, alias = "question_type")]
    kind: Option<KindTag>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    number_of_correct_answers: Option<u32>,
    #[serde(default)]
    blank_index: Option<u32>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    correct_answer_for_matching: Option<String>,
    #[serde(default)]
    zone_index: Option<u32>,
    #[serde(default)]
    correct_drag_item_id: Option<String>,
}

/// Kind marker as written in a record: a name such as `"matching"`, or a
/// numeric code (1 multiple choice, 2 fill in blank, 3 matching,
/// 4 drag and drop).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KindTag {
    Code(i64),
    Name(String),
}

impl KindTag {
    fn resolve(&self) -> Option<QuestionKind> {
        match self {
            KindTag::Code(1) => Some(QuestionKind::MultipleChoice),
            KindTag::Code(2) => Some(QuestionKind::FillInBlank),
            KindTag::Code(3) => Some(QuestionKind::Matching),
            KindTag::Code(4) => Some(QuestionKind::DragAndDrop),
            KindTag::Code(_) => None,
            KindTag::Name(name) => name.parse().ok(),
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindTag::Code(code) => write!(f, "{code}"),
            KindTag::Name(name) => write!(f, "{name}"),
        }
    }
}

fn required_text(
    value: Option<String>,
    question_id: &str,
    field: &'static str,
) -> Result<String, GradingError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GradingError::MissingAnswerKey {
            question_id: question_id.to_string(),
            field,
        }),
    }
}

fn convert_question(
    raw: RawQuestion,
    group_id: &str,
    group_kind: QuestionKind,
    position: u32,
) -> Result<Question, GradingError> {
    let kind = match &raw.kind {
        Some(tag) => tag
            .resolve()
            .ok_or_else(|| GradingError::UnknownQuestionKind {
                question_id: raw.id.clone(),
                kind: tag.to_string(),
            })?,
        None => group_kind,
    };

    if kind != group_kind {
        return Err(GradingError::GroupKindMismatch {
            group_id: group_id.to_string(),
            question_id: raw.id,
            expected: group_kind,
            found: kind,
        });
    }

    let variant = match kind {
        QuestionKind::MultipleChoice => {
            if raw.choices.is_empty() {
                return Err(GradingError::MissingAnswerKey {
                    question_id: raw.id,
                    field: "choices",
                });
            }
            let marked = raw.choices.iter().filter(|c| c.is_correct).count() as u32;
            QuestionVariant::MultipleChoice {
                number_of_correct_answers: raw.number_of_correct_answers.unwrap_or(marked.max(1)),
                choices: raw.choices,
            }
        }
        QuestionKind::FillInBlank => QuestionVariant::FillInBlank {
            blank_index: raw.blank_index.unwrap_or(position),
            correct_answer: required_text(raw.correct_answer, &raw.id, "correct_answer")?,
        },
        QuestionKind::Matching => QuestionVariant::Matching {
            correct_answer_for_matching: required_text(
                raw.correct_answer_for_matching,
                &raw.id,
                "correct_answer_for_matching",
            )?,
        },
        QuestionKind::DragAndDrop => QuestionVariant::DragAndDrop {
            zone_index: raw.zone_index.unwrap_or(position),
            correct_drag_item_id: required_text(
                raw.correct_drag_item_id,
                &raw.id,
                "correct_drag_item_id",
            )?,
        },
    };

    Ok(Question {
        id: raw.id,
        order: raw.order,
        point: raw.point,
        explanation: raw.explanation,
        variant,
    })
}

fn convert_group(raw: RawGroup) -> Result<QuestionGroup, GradingError> {
    let kind = raw
        .question_type
        .resolve()
        .ok_or_else(|| GradingError::UnknownGroupKind {
            group_id: raw.id.clone(),
            kind: raw.question_type.to_string(),
        })?;

    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| convert_question(q, &raw.id, kind, i as u32))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuestionGroup {
        id: raw.id,
        section_label: raw.section_label,
        section_order: raw.section_order,
        instruction: raw.instruction,
        kind,
        questions,
        drag_items: raw.drag_items,
    })
}

fn convert_attempt(raw: RawAttempt) -> Result<Attempt> {
    let skill = match raw.task.skill {
        Some(s) => s.parse::<Skill>().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => Skill::default(),
    };

    let groups = raw
        .task
        .groups
        .into_iter()
        .map(convert_group)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("attempt {} cannot be graded", raw.id))?;

    Ok(Attempt {
        id: raw.id,
        task: Task {
            id: raw.task.id,
            title: raw.task.title,
            skill,
            groups,
        },
        answers: raw.answers,
        timing: AttemptTiming {
            start_at: raw.start_at,
            finished_at: raw.finished_at,
            duration_seconds: raw.duration_seconds,
        },
    })
}

/// Record formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Toml,
}

impl RecordFormat {
    /// Pick the format from a file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => RecordFormat::Toml,
            _ => RecordFormat::Json,
        }
    }
}

/// Parse a single attempt record file.
pub fn parse_attempt(path: &Path) -> Result<Attempt> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attempt file: {}", path.display()))?;

    parse_attempt_str(&content, RecordFormat::from_path(path), path)
}

/// Parse an attempt record from a string (useful for testing).
pub fn parse_attempt_str(content: &str, format: RecordFormat, source_path: &Path) -> Result<Attempt> {
    let raw: RawAttempt = match format {
        RecordFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?,
        RecordFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?,
    };

    convert_attempt(raw).with_context(|| format!("invalid attempt record: {}", source_path.display()))
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("toml"))
}

/// Recursively load every attempt record in a directory.
///
/// Fails on the first record that cannot be parsed or graded; a partial
/// cohort would skew aggregate numbers without any signal.
pub fn load_attempt_directory(dir: &Path) -> Result<Vec<Attempt>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    let mut attempts = Vec::new();
    for path in entries {
        if path.is_dir() {
            attempts.extend(load_attempt_directory(&path)?);
        } else if is_record_file(&path) {
            tracing::debug!("loading attempt record {}", path.display());
            attempts.push(parse_attempt(&path)?);
        }
    }

    Ok(attempts)
}

/// Load a single record file or every record under a directory.
pub fn load_attempts(path: &Path) -> Result<Vec<Attempt>> {
    if path.is_dir() {
        load_attempt_directory(path)
    } else {
        Ok(vec![parse_attempt(path)?])
    }
}

/// A non-fatal issue found while validating an attempt.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn general(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }
}

/// Validate an attempt for data issues that do not prevent grading.
pub fn validate_attempt(attempt: &Attempt) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    let mut seen_orders: HashMap<u32, &str> = HashMap::new();
    for group in &attempt.task.groups {
        if group.questions.is_empty() {
            warnings.push(ValidationWarning::general(format!(
                "group {} has no questions",
                group.id
            )));
        }

        for question in &group.questions {
            if !seen_ids.insert(question.id.as_str()) {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!("duplicate question ID: {}", question.id),
                ));
            }
            if let Some(other) = seen_orders.insert(question.order, &question.id) {
                warnings.push(ValidationWarning::question(
                    &question.id,
                    format!("question_order {} is also used by {other}", question.order),
                ));
            }

            match &question.variant {
                QuestionVariant::MultipleChoice {
                    choices,
                    number_of_correct_answers,
                } => {
                    let marked = choices.iter().filter(|c| c.is_correct).count() as u32;
                    if marked == 0 {
                        warnings.push(ValidationWarning::question(
                            &question.id,
                            "no choice is marked correct; the question can never be scored",
                        ));
                    } else if marked != *number_of_correct_answers {
                        warnings.push(ValidationWarning::question(
                            &question.id,
                            format!(
                                "number_of_correct_answers is {number_of_correct_answers} but {marked} choice(s) are marked correct"
                            ),
                        ));
                    }
                }
                QuestionVariant::DragAndDrop {
                    correct_drag_item_id,
                    ..
                } => {
                    if group.drag_item(correct_drag_item_id).is_none() {
                        warnings.push(ValidationWarning::question(
                            &question.id,
                            format!("correct drag item '{correct_drag_item_id}' is not offered by group {}", group.id),
                        ));
                    }
                }
                QuestionVariant::FillInBlank { .. } | QuestionVariant::Matching { .. } => {}
            }
        }
    }

    let mut answered = HashSet::new();
    for answer in &attempt.answers {
        if !seen_ids.contains(answer.question_id.as_str()) {
            warnings.push(ValidationWarning::question(
                &answer.question_id,
                "answer refers to a question that is not part of the task",
            ));
        } else if !answered.insert(answer.question_id.as_str()) {
            warnings.push(ValidationWarning::question(
                &answer.question_id,
                "more than one answer submitted; only the first is graded",
            ));
        }
    }

    warnings
}
