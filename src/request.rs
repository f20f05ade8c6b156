//! What a user asks the generator for.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clients::ClientType;
use crate::error::QuizError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Difficulty {
    #[serde(rename = "simple")]
    Simple,
    #[serde(rename = "challenging")]
    Challenging,
    #[default]
    #[serde(rename = "balanced mix of simple and challenging")]
    Balanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Exactly one correct answer per question.
    #[default]
    Single,
    /// One or more correct answers per question.
    Multiple,
}

/// A course section to draw questions from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionBrief {
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub number_of_questions_in_section: u32,
    #[serde(default)]
    pub section_content: String,
}

/// Parameters for one quiz generation.
///
/// Text fields default to empty so that a missing field is reported by
/// [`QuizRequest::check`] rather than by the JSON decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    #[serde(default)]
    pub quiz_title: String,
    #[serde(default)]
    pub quiz_audience: String,
    #[serde(default)]
    pub quiz_difficulty: Difficulty,
    #[serde(default)]
    pub multiple_or_single_answers: AnswerMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_model: Option<ClientType>,
    #[serde(default)]
    pub course_sections: Vec<SectionBrief>,
}

impl QuizRequest {
    pub fn check(&self) -> Result<(), QuizError> {
        let missing = |field: &str| Err(QuizError::InvalidRequest(format!("{field} is required")));

        if self.quiz_title.trim().is_empty() {
            return missing("quizTitle");
        }
        if self.quiz_audience.trim().is_empty() {
            return missing("quizAudience");
        }
        if self.course_sections.is_empty() {
            return missing("courseSections");
        }
        for (i, section) in self.course_sections.iter().enumerate() {
            if section.section_title.trim().is_empty() {
                return missing(&format!("courseSections[{i}].sectionTitle"));
            }
            if section.section_content.trim().is_empty() {
                return missing(&format!("courseSections[{i}].sectionContent"));
            }
            if section.number_of_questions_in_section == 0 {
                return Err(QuizError::InvalidRequest(format!(
                    "courseSections[{i}].numberOfQuestionsInSection must be at least 1"
                )));
            }
        }
        Ok(())
    }

    pub fn total_questions(&self) -> u32 {
        self.course_sections.iter().map(|s| s.number_of_questions_in_section).sum()
    }
}
