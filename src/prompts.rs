//! Prompt text sent to the language models.

use std::fmt::Write as _;

use schemars::{schema_for, JsonSchema};
use serde::Serialize;

use crate::request::{AnswerMode, Difficulty, QuizRequest};

pub const QUIZ_SYSTEM: &str =
    "You are an AI quiz generator. You reply with a single JSON object and nothing else.";
pub const OUTLINE_SYSTEM: &str =
    "You are an AI that generates structured quiz JSON without explanations.";
pub const REWRITE_SYSTEM: &str =
    "You rewrite text to match the dialect, style, and language of the specified audience.";
pub const THEME_SYSTEM: &str = "You extract key themes from text.";

/// Audiences offered when inventing a random outline.
pub const OUTLINE_AUDIENCES: [&str; 6] = [
    "Toddler",
    "Aussie Bloke",
    "French Aristocrat",
    "Newfoundlander Bayman",
    "Surfer Dude",
    "Astro-Physicist",
];

// Output shape the model is asked to produce. Only used for schema generation.

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GeneratedQuiz {
    /// The quiz title exactly as given.
    quiz_title: String,
    /// One entry per input section, same order, same titles.
    course_sections: Vec<GeneratedSection>,
}

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GeneratedSection {
    /// EXACT section title from the input.
    section_title: String,
    section_questions: Vec<GeneratedQuestion>,
}

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GeneratedQuestion {
    /// A question based ONLY on the section content.
    question_title: String,
    /// Correct answers shuffled among the incorrect ones.
    answers: Vec<GeneratedAnswer>,
}

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GeneratedAnswer {
    answer_text: String,
    is_correct: bool,
}

fn schema_guidance<T: JsonSchema>(prompt: String) -> String {
    let schema = schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        "{prompt}\n\n## Response Format\nReturn ONLY a JSON object matching this schema. No markdown fences, no commentary:\n{schema_json}"
    )
}

fn difficulty_rule(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Simple => "Answers are taken directly from the section content.",
        Difficulty::Challenging => {
            "Answers are abstract and inferred from several facts in the section content, never listed there verbatim."
        }
        Difficulty::Balanced => {
            "Answers are an even mix of facts taken directly from the section content and conclusions inferred from it."
        }
    }
}

fn answer_rule(mode: AnswerMode) -> &'static str {
    match mode {
        AnswerMode::Single => "Each question has exactly one correct answer.",
        AnswerMode::Multiple => {
            "Each question has 1-4 correct answers, and at least one question has more than one."
        }
    }
}

/// Prompt for generating a full quiz from a request.
pub fn quiz_prompt(request: &QuizRequest) -> String {
    let mut prompt = String::new();
    let answer_type = match request.multiple_or_single_answers {
        AnswerMode::Single => "Single correct answer",
        AnswerMode::Multiple => "Multiple-choice (1-4 correct answers)",
    };
    let difficulty = serde_json::to_value(request.quiz_difficulty)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let _ = writeln!(
        prompt,
        "Generate quiz questions strictly based on the provided section content. Do not use outside knowledge.\n"
    );
    let _ = writeln!(prompt, "### Input Details");
    let _ = writeln!(prompt, "- Title: {}", request.quiz_title);
    let _ = writeln!(prompt, "- Audience: {}", request.quiz_audience);
    let _ = writeln!(prompt, "- Difficulty: {difficulty}");
    let _ = writeln!(prompt, "- Answer Type: {answer_type}");
    let _ = writeln!(prompt, "- Sections Provided: {}\n", request.course_sections.len());

    let rules = [
        "Use the exact section titles provided; do not add, remove or rename sections.",
        "Each section must have exactly the requested number of questions.",
        "Do not repeat questions.",
        "Every question has at least two answers and at least one of them is correct.",
        "Write questions in the dialect and speech pattern of the audience.",
        difficulty_rule(request.quiz_difficulty),
        answer_rule(request.multiple_or_single_answers),
        "Shuffle correct answers among incorrect ones so their positions are unpredictable.",
        "Incorrect answers must match the correct ones in complexity and length.",
    ];
    let _ = writeln!(prompt, "### Rules");
    for (i, rule) in rules.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {rule}", i + 1);
    }

    let _ = writeln!(prompt, "\n### Course Sections");
    for (i, section) in request.course_sections.iter().enumerate() {
        let _ = writeln!(prompt, "- Section {}: {}", i + 1, section.section_title);
        let _ = writeln!(prompt, "  - Content: \"{}\"", section.section_content);
        let _ = writeln!(
            prompt,
            "  - Number of Questions: {}",
            section.number_of_questions_in_section
        );
    }

    schema_guidance::<GeneratedQuiz>(prompt)
}

/// Prompt for inventing a random quiz outline.
///
/// `sections` sections with `questions` or `questions - 1` questions each.
pub fn outline_prompt(sections: u32, questions: u32) -> String {
    let fewer = questions.saturating_sub(1).max(1);
    let audiences = OUTLINE_AUDIENCES
        .iter()
        .map(|a| format!("\"{a}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Generate a structured quiz outline with the following details:\n\
         - Title: any topic\n\
         - Audience: one of {audiences}\n\
         - Difficulty: one of \"simple\", \"challenging\" or \"balanced mix of simple and challenging\"\n\
         - Answer Type: one of \"single\" or \"multiple\"\n\
         - Format: {sections} sections with {questions} or {fewer} questions in each section.\n\
         - Each section has a title, a short content description, and its number of questions.\n\
         - Do NOT include extra text, markdown formatting, or explanations."
    );
    schema_guidance::<QuizRequest>(prompt)
}

pub fn rewrite_prompt(text: &str, audience: &str) -> String {
    format!(
        "Rewrite the following text to sound like it is spoken by a {audience}. \
         Reply with the rewritten text only:\n\n\"{text}\""
    )
}

pub fn theme_prompt(text: &str) -> String {
    format!("Extract a single clear theme from the following text. Reply with the theme only:\n\n{text}")
}

pub fn image_prompt(theme: &str) -> String {
    format!(
        "Create a high-resolution, photorealistic image representing the theme: \"{theme}\". \
         Natural lighting, realistic textures and a sharp focus."
    )
}
