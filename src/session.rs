//! Quiz-taking sessions.
//!
//! A session starts in [`SessionState::Collecting`], where toggles edit the
//! answer set, and moves once to [`SessionState::Scored`] on submission.
//! There is no way back; a new quiz means a new session.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SessionError;
use crate::quiz::{QuestionId, Quiz};
use crate::scoring::{self, ScoredResult, UserAnswerSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Collecting,
    Scored,
}

/// Selection of one question after a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub question_id: QuestionId,
    pub multi_select: bool,
    pub selected: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    answers: UserAnswerSet,
    result: Option<ScoredResult>,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Self {
        Self { quiz, answers: UserAnswerSet::new(), result: None }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &UserAnswerSet {
        &self.answers
    }

    pub fn result(&self) -> Option<&ScoredResult> {
        self.result.as_ref()
    }

    pub fn state(&self) -> SessionState {
        if self.result.is_some() {
            SessionState::Scored
        } else {
            SessionState::Collecting
        }
    }

    /// Toggle one answer. Single- or multi-select follows from the quiz itself.
    pub fn toggle(&mut self, question_id: QuestionId, answer_text: &str) -> Result<Selection, SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        let question = self
            .quiz
            .question(question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if !question.offers(answer_text) {
            return Err(SessionError::UnknownAnswer {
                question_id,
                answer_text: answer_text.to_string(),
            });
        }

        let multi_select = scoring::is_multi_select(question);
        self.answers.toggle(question_id, answer_text, multi_select);
        Ok(Selection {
            question_id,
            multi_select,
            selected: self.answers.selected(question_id).into_iter().map(str::to_string).collect(),
        })
    }

    /// Score the current answers. Only the first call succeeds.
    pub fn submit(&mut self) -> Result<&ScoredResult, SessionError> {
        if self.result.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        let result = scoring::score(&self.quiz, &self.answers);
        Ok(&*self.result.insert(result))
    }
}

/// How long an untouched session is kept before it is evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct Entry {
    session: QuizSession,
    touched: Instant,
}

/// Independent sessions keyed by id, one per quiz-taking flow.
///
/// Sessions not toggled or submitted within the TTL are dropped: lazily on
/// access, and in bulk whenever a new session is created.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.touched.elapsed() >= self.ttl
    }

    pub async fn create(&self, quiz: Quiz) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "expired sessions evicted");
        }

        info!(session = %id, questions = quiz.question_count(), "session started");
        sessions.insert(id, Entry { session: QuizSession::new(quiz), touched: Instant::now() });
        id
    }

    /// Snapshot of a session.
    pub async fn get(&self, id: Uuid) -> Result<QuizSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.session.clone())
            .ok_or(SessionError::NotFound(id))
    }

    /// Live entry for `id`, refreshing its TTL. Expired entries are removed.
    fn touch<'a>(&self, sessions: &'a mut HashMap<Uuid, Entry>, id: Uuid) -> Result<&'a mut QuizSession, SessionError> {
        if sessions.get(&id).is_some_and(|entry| self.is_expired(entry)) {
            sessions.remove(&id);
            debug!(session = %id, "expired session evicted");
        }
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.touched = Instant::now();
        Ok(&mut entry.session)
    }

    pub async fn toggle(&self, id: Uuid, question_id: QuestionId, answer_text: &str) -> Result<Selection, SessionError> {
        let mut sessions = self.sessions.write().await;
        let selection = self.touch(&mut sessions, id)?.toggle(question_id, answer_text)?;
        debug!(session = %id, question = %question_id, selected = selection.selected.len(), "answer toggled");
        Ok(selection)
    }

    pub async fn submit(&self, id: Uuid) -> Result<ScoredResult, SessionError> {
        let mut sessions = self.sessions.write().await;
        let result = self.touch(&mut sessions, id)?.submit()?.clone();
        info!(session = %id, score = result.score, perfect = result.is_perfect(), "answers submitted");
        Ok(result)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::validate;
    use serde_json::json;

    fn quiz() -> Quiz {
        validate(&json!({
            "quizTitle": "Mixed",
            "courseSections": [{ "sectionTitle": "S", "sectionQuestions": [
                { "questionTitle": "Pick one", "answers": [
                    { "answerText": "A", "isCorrect": true },
                    { "answerText": "B", "isCorrect": false }
                ]},
                { "questionTitle": "Pick many", "answers": [
                    { "answerText": "X", "isCorrect": true },
                    { "answerText": "Y", "isCorrect": true },
                    { "answerText": "Z", "isCorrect": false }
                ]}
            ]}]
        }))
        .unwrap()
    }

    #[test]
    fn toggle_derives_mode_from_quiz() {
        let mut session = QuizSession::new(quiz());
        session.toggle(QuestionId::new(0), "A").unwrap();
        let radio = session.toggle(QuestionId::new(0), "B").unwrap();
        assert!(!radio.multi_select);
        assert_eq!(radio.selected, BTreeSet::from(["B".to_string()]));

        session.toggle(QuestionId::new(1), "X").unwrap();
        let checkbox = session.toggle(QuestionId::new(1), "Y").unwrap();
        assert!(checkbox.multi_select);
        assert_eq!(checkbox.selected.len(), 2);
    }

    #[test]
    fn rejects_unknown_question_and_answer() {
        let mut session = QuizSession::new(quiz());
        assert_eq!(
            session.toggle(QuestionId::new(9), "A"),
            Err(SessionError::UnknownQuestion(QuestionId::new(9)))
        );
        assert_eq!(
            session.toggle(QuestionId::new(0), "X"),
            Err(SessionError::UnknownAnswer { question_id: QuestionId::new(0), answer_text: "X".into() })
        );
        assert_eq!(session.answers().answered_count(), 0);
    }

    #[test]
    fn submission_is_one_way() {
        let mut session = QuizSession::new(quiz());
        session.toggle(QuestionId::new(0), "A").unwrap();
        assert_eq!(session.state(), SessionState::Collecting);

        let score = session.submit().unwrap().score;
        assert_eq!(score, 50);
        assert_eq!(session.state(), SessionState::Scored);

        assert_eq!(session.submit().unwrap_err(), SessionError::AlreadySubmitted);
        assert_eq!(session.toggle(QuestionId::new(1), "X").unwrap_err(), SessionError::AlreadySubmitted);
        assert_eq!(session.result().unwrap().score, 50);
        assert!(session.answers().selected(QuestionId::new(1)).is_empty());
    }

    #[tokio::test]
    async fn store_keeps_sessions_isolated() {
        let store = SessionStore::new();
        let first = store.create(quiz()).await;
        let second = store.create(quiz()).await;
        assert_ne!(first, second);

        store.toggle(first, QuestionId::new(0), "A").await.unwrap();
        store.toggle(first, QuestionId::new(1), "X").await.unwrap();
        store.toggle(first, QuestionId::new(1), "Y").await.unwrap();
        store.toggle(second, QuestionId::new(0), "B").await.unwrap();

        assert_eq!(store.submit(first).await.unwrap().score, 100);
        assert_eq!(store.get(second).await.unwrap().state(), SessionState::Collecting);
        assert_eq!(store.submit(second).await.unwrap().score, 0);
    }

    #[tokio::test]
    async fn store_reports_missing_sessions() {
        let store = SessionStore::new();
        let id = store.create(quiz()).await;
        assert_eq!(store.len().await, 1);

        store.remove(id).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.get(id).await.unwrap_err(), SessionError::NotFound(id));
        assert_eq!(store.submit(id).await.unwrap_err(), SessionError::NotFound(id));
        assert_eq!(store.remove(id).await.unwrap_err(), SessionError::NotFound(id));
    }

    #[tokio::test]
    async fn expired_sessions_are_not_found() {
        let store = SessionStore::with_ttl(Duration::from_millis(20));
        let id = store.create(quiz()).await;
        assert!(store.get(id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get(id).await.unwrap_err(), SessionError::NotFound(id));
        assert_eq!(
            store.toggle(id, QuestionId::new(0), "A").await.unwrap_err(),
            SessionError::NotFound(id)
        );
        assert_eq!(store.submit(id).await.unwrap_err(), SessionError::NotFound(id));
    }

    #[tokio::test]
    async fn creating_a_session_evicts_expired_ones() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        for _ in 0..100 {
            store.create(quiz()).await;
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn live_sessions_survive_eviction() {
        let store = SessionStore::new();
        assert_eq!(store.ttl(), DEFAULT_SESSION_TTL);
        let first = store.create(quiz()).await;
        let second = store.create(quiz()).await;
        assert_eq!(store.len().await, 2);
        assert!(store.get(first).await.is_ok());
        assert!(store.get(second).await.is_ok());
    }
}
