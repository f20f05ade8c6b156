//! Validated quiz content.
//!
//! Values in this module can only be built by [`contract::validate`] and its
//! siblings, so anything holding a [`Quiz`] can rely on the structural
//! invariants: at least one section, every section has questions, every
//! question has two or more answers and at least one of them is correct.

pub mod contract;

pub use contract::{validate, validate_str};

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Synthetic key for a question, assigned in document order at validation time.
///
/// Answers are tracked by this id rather than by question text, so two
/// questions that share a title never overwrite each other's selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(usize);

impl QuestionId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    quiz_title: String,
    course_sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    section_title: String,
    section_questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    question_id: QuestionId,
    question_title: String,
    answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    answer_text: String,
    is_correct: bool,
}

impl Quiz {
    pub fn title(&self) -> &str {
        &self.quiz_title
    }

    pub fn sections(&self) -> &[Section] {
        &self.course_sections
    }

    /// All questions across all sections, in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.course_sections.iter().flat_map(|s| s.section_questions.iter())
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions().nth(id.index())
    }

    pub fn question_count(&self) -> usize {
        self.course_sections.iter().map(|s| s.section_questions.len()).sum()
    }

    /// Run the serialized quiz through validation again. Always yields an equal quiz.
    pub fn revalidate(&self) -> Result<Quiz, QuizError> {
        let value = serde_json::to_value(self)?;
        validate(&value)
    }
}

impl Section {
    pub fn title(&self) -> &str {
        &self.section_title
    }

    pub fn questions(&self) -> &[Question] {
        &self.section_questions
    }
}

impl Question {
    pub fn id(&self) -> QuestionId {
        self.question_id
    }

    pub fn title(&self) -> &str {
        &self.question_title
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Distinct texts of the answers marked correct.
    pub fn correct_texts(&self) -> BTreeSet<&str> {
        self.answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.answer_text.as_str())
            .collect()
    }

    pub fn offers(&self, answer_text: &str) -> bool {
        self.answers.iter().any(|a| a.answer_text == answer_text)
    }
}

impl Answer {
    pub fn text(&self) -> &str {
        &self.answer_text
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}
