//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use quiz_generator::clients::{ClientType, FlexibleClient, MockHandle, MockMediaClient};
use quiz_generator::core::{MediaClient, RetryConfig};
use quiz_generator::quiz::{validate, Quiz};
use quiz_generator::server::{router, AppState};
use quiz_generator::QuizGenerator;

/// One section, a single-select and a multi-select question.
pub fn sample_quiz_json() -> Value {
    json!({
        "quizTitle": "Ocean Basics",
        "courseSections": [{
            "sectionTitle": "Tides",
            "sectionQuestions": [
                {
                    "questionTitle": "What mainly causes tides?",
                    "answers": [
                        { "answerText": "The Moon", "isCorrect": true },
                        { "answerText": "The wind", "isCorrect": false }
                    ]
                },
                {
                    "questionTitle": "Which bodies pull on the oceans?",
                    "answers": [
                        { "answerText": "Moon", "isCorrect": true },
                        { "answerText": "Sun", "isCorrect": true },
                        { "answerText": "Mars", "isCorrect": false }
                    ]
                }
            ]
        }]
    })
}

pub fn sample_quiz() -> Quiz {
    validate(&sample_quiz_json()).unwrap()
}

pub fn quiz_request_json() -> Value {
    json!({
        "quizTitle": "Ocean Basics",
        "quizAudience": "Surfer Dude",
        "quizDifficulty": "simple",
        "multipleOrSingleAnswers": "multiple",
        "courseSections": [{
            "sectionTitle": "Tides",
            "numberOfQuestionsInSection": 2,
            "sectionContent": "The Moon and the Sun pull on the oceans."
        }]
    })
}

pub fn outline_json() -> Value {
    json!({
        "quizTitle": "Volcanoes",
        "quizAudience": "Aussie Bloke",
        "quizDifficulty": "challenging",
        "multipleOrSingleAnswers": "single",
        "apiModel": "openai",
        "courseSections": [
            { "sectionTitle": "Magma", "numberOfQuestionsInSection": 4, "sectionContent": "Molten rock." },
            { "sectionTitle": "Eruptions", "numberOfQuestionsInSection": 3, "sectionContent": "How it blows." }
        ]
    })
}

/// Server wired to scripted mocks.
pub struct TestApp {
    pub server: TestServer,
    pub text: Arc<MockHandle>,
    pub media: Arc<MockMediaClient>,
}

impl TestApp {
    pub fn new() -> Self {
        let (client, text) = FlexibleClient::mock();
        let generator = QuizGenerator::new(client, RetryConfig::none());
        let media = Arc::new(MockMediaClient::new());

        let mut generators = HashMap::new();
        generators.insert(ClientType::Mock, generator);
        let state = AppState::new(
            generators,
            ClientType::Mock,
            Some(Arc::clone(&media) as Arc<dyn MediaClient>),
        );

        Self {
            server: TestServer::new(router(state)).unwrap(),
            text,
            media,
        }
    }

    /// Start a session on the sample quiz, returning its id.
    pub async fn start_sample_session(&self) -> String {
        let response = self.server.post("/api/sessions").json(&sample_quiz_json()).await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["sessionId"].as_str().unwrap().to_string()
    }
}
