use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::quiz::QuestionId;

/// Selected answer texts per question. Order of selection is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAnswerSet {
    selections: BTreeMap<QuestionId, BTreeSet<String>>,
}

impl UserAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user click.
    ///
    /// Multi-select flips membership of `answer_text`; single-select replaces
    /// whatever was chosen for the question with `answer_text` alone.
    pub fn toggle(&mut self, question_id: QuestionId, answer_text: &str, is_multi_select: bool) {
        let selected = self.selections.entry(question_id).or_default();
        if is_multi_select {
            if !selected.remove(answer_text) {
                selected.insert(answer_text.to_string());
            }
        } else {
            selected.clear();
            selected.insert(answer_text.to_string());
        }
    }

    /// Texts selected for a question; empty when the question was never touched.
    pub fn selected(&self, question_id: QuestionId) -> BTreeSet<&str> {
        self.selections
            .get(&question_id)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_selected(&self, question_id: QuestionId, answer_text: &str) -> bool {
        self.selections
            .get(&question_id)
            .is_some_and(|set| set.contains(answer_text))
    }

    /// Number of questions with at least one selection.
    pub fn answered_count(&self) -> usize {
        self.selections.values().filter(|set| !set.is_empty()).count()
    }
}

impl<S: Into<String>> FromIterator<(QuestionId, Vec<S>)> for UserAnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, Vec<S>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, texts) in iter {
            set.selections
                .entry(id)
                .or_default()
                .extend(texts.into_iter().map(Into::into));
        }
        set
    }
}
