use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::answers::UserAnswerSet;
use crate::quiz::{Question, Quiz};

/// Score awarded when every question is answered exactly right.
pub const PERFECT_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAnswer {
    pub answer_text: String,
    pub is_correct: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredQuestion {
    pub question_title: String,
    pub answers: Vec<ScoredAnswer>,
}

/// Outcome of one submission: the percentage plus every question annotated
/// with what was correct and what the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    #[serde(deserialize_with = "percent")]
    pub score: u8,
    pub section_questions: Vec<ScoredQuestion>,
}

impl ScoredResult {
    pub fn is_perfect(&self) -> bool {
        self.score == PERFECT_SCORE
    }
}

/// A loaded score must still be a percentage.
fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let score = u8::deserialize(deserializer)?;
    if score > PERFECT_SCORE {
        return Err(serde::de::Error::custom(format!(
            "score {score} is out of range 0..={PERFECT_SCORE}"
        )));
    }
    Ok(score)
}

/// Checkbox mode applies when more than one answer is marked correct.
pub fn is_multi_select(question: &Question) -> bool {
    question.answers().iter().filter(|a| a.is_correct()).count() > 1
}

/// A question counts only when the selection equals the correct set exactly.
pub fn is_answered_correctly(question: &Question, answers: &UserAnswerSet) -> bool {
    answers.selected(question.id()) == question.correct_texts()
}

/// `round(100 * correct / total)` with halves rounded up; zero questions score 0.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u8
}

pub fn score(quiz: &Quiz, answers: &UserAnswerSet) -> ScoredResult {
    let mut correct = 0usize;
    let mut section_questions = Vec::with_capacity(quiz.question_count());

    for question in quiz.questions() {
        if is_answered_correctly(question, answers) {
            correct += 1;
        }
        section_questions.push(ScoredQuestion {
            question_title: question.title().to_string(),
            answers: question
                .answers()
                .iter()
                .map(|a| ScoredAnswer {
                    answer_text: a.text().to_string(),
                    is_correct: a.is_correct(),
                    is_selected: answers.is_selected(question.id(), a.text()),
                })
                .collect(),
        });
    }

    let score = percentage(correct, section_questions.len());
    debug!(target: "quiz_generator::scoring", correct, total = section_questions.len(), score, "scored submission");
    ScoredResult { score, section_questions }
}
