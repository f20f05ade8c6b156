//! Structural validation of generated quiz payloads.
//!
//! Rules are checked depth-first in document order and the first failure
//! rejects the whole payload. Nothing is repaired: a quiz with one bad
//! question is not servable.

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::{Answer, Question, QuestionId, Quiz, Section};
use crate::error::QuizError;
use crate::json_utils;

/// Fewest answers a question may offer.
pub const MIN_ANSWERS: usize = 2;

/// Validate an already-parsed payload.
///
/// A top-level JSON string is treated as JSON embedded in a string and
/// unwrapped once before validation.
#[instrument(target = "quiz_generator::contract", skip(value))]
pub fn validate(value: &Value) -> Result<Quiz, QuizError> {
    if let Value::String(embedded) = value {
        debug!(target: "quiz_generator::contract", len = embedded.len(), "unwrapping string payload");
        let inner = parse_payload(embedded)?;
        return build_quiz(&inner).map_err(|reason| reject(reason, embedded.clone()));
    }
    build_quiz(value).map_err(|reason| reject(reason, value.to_string()))
}

/// Validate a raw model reply.
///
/// Markdown code fences are stripped. When the reply is not JSON as a whole,
/// the first embedded object carrying a `quizTitle` key is used.
#[instrument(target = "quiz_generator::contract", skip(raw), fields(raw_len = raw.len()))]
pub fn validate_str(raw: &str) -> Result<Quiz, QuizError> {
    let value = parse_payload(raw)?;
    if let Value::String(embedded) = &value {
        let inner = parse_payload(embedded)?;
        return build_quiz(&inner).map_err(|reason| reject(reason, raw));
    }
    build_quiz(&value).map_err(|reason| reject(reason, raw))
}

fn reject(reason: String, raw: impl Into<String>) -> QuizError {
    let raw = raw.into();
    warn!(target: "quiz_generator::contract", %reason, raw_len = raw.len(), "rejected quiz payload");
    QuizError::invalid(reason, raw)
}

fn parse_payload(raw: &str) -> Result<Value, QuizError> {
    let cleaned = json_utils::strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }
    json_utils::find_object_with_key(cleaned, "quizTitle")
        .ok_or_else(|| reject("payload: no JSON quiz object found".to_string(), raw))
}

fn build_quiz(value: &Value) -> Result<Quiz, String> {
    let root = value.as_object().ok_or("payload: expected a JSON object")?;
    let quiz_title = non_empty_str(root, "", "quizTitle")?;
    let raw_sections = non_empty_array(root, "", "courseSections")?;

    let mut next_id = 0usize;
    let mut course_sections = Vec::with_capacity(raw_sections.len());
    for (s_idx, raw_section) in raw_sections.iter().enumerate() {
        let path = format!("courseSections[{s_idx}]");
        let section = as_object(raw_section, &path)?;
        let section_title = non_empty_str(section, &path, "sectionTitle")?;
        let raw_questions = non_empty_array(section, &path, "sectionQuestions")?;

        let mut section_questions = Vec::with_capacity(raw_questions.len());
        for (q_idx, raw_question) in raw_questions.iter().enumerate() {
            let path = format!("{path}.sectionQuestions[{q_idx}]");
            let question = build_question(raw_question, &path, QuestionId::new(next_id))?;
            next_id += 1;
            section_questions.push(question);
        }
        course_sections.push(Section { section_title, section_questions });
    }

    debug!(target: "quiz_generator::contract", sections = course_sections.len(), questions = next_id, "quiz payload accepted");
    Ok(Quiz { quiz_title, course_sections })
}

fn build_question(value: &Value, path: &str, id: QuestionId) -> Result<Question, String> {
    let question = as_object(value, path)?;
    let question_title = non_empty_str(question, path, "questionTitle")?;
    let raw_answers = match question.get("answers") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(format!("{path}.answers: expected an array")),
        None => return Err(format!("{path}.answers: missing")),
    };
    if raw_answers.len() < MIN_ANSWERS {
        return Err(format!(
            "{path}.answers: expected at least {MIN_ANSWERS} answers, found {}",
            raw_answers.len()
        ));
    }

    let answers = raw_answers
        .iter()
        .enumerate()
        .map(|(a_idx, raw)| build_answer(raw, &format!("{path}.answers[{a_idx}]")))
        .collect::<Result<Vec<_>, _>>()?;

    if !answers.iter().any(Answer::is_correct) {
        return Err(format!("{path}: no answer is marked correct"));
    }

    Ok(Question { question_id: id, question_title, answers })
}

fn build_answer(value: &Value, path: &str) -> Result<Answer, String> {
    let answer = as_object(value, path)?;
    let is_correct = match answer.get("isCorrect") {
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(format!("{path}.isCorrect: expected a boolean")),
        None => return Err(format!("{path}.isCorrect: missing")),
    };
    let answer_text = non_empty_str(answer, path, "answerText")?;
    Ok(Answer { answer_text, is_correct })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, String> {
    value.as_object().ok_or_else(|| format!("{path}: expected an object"))
}

fn field_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn non_empty_str(obj: &Map<String, Value>, path: &str, key: &str) -> Result<String, String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("{}: must not be empty", field_path(path, key))),
        Some(_) => Err(format!("{}: expected a string", field_path(path, key))),
        None => Err(format!("{}: missing", field_path(path, key))),
    }
}

fn non_empty_array<'a>(obj: &'a Map<String, Value>, path: &str, key: &str) -> Result<&'a Vec<Value>, String> {
    match obj.get(key) {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items),
        Some(Value::Array(_)) => Err(format!("{}: must not be empty", field_path(path, key))),
        Some(_) => Err(format!("{}: expected an array", field_path(path, key))),
        None => Err(format!("{}: missing", field_path(path, key))),
    }
}
