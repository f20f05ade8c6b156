use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tokio::fs;
use tracing::info;

use crate::error::QuizError;
use crate::scoring::ScoredResult;

/// A scored result ready to be downloaded or saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsExport {
    pub file_name: String,
    pub body: String,
}

impl ResultsExport {
    pub const CONTENT_TYPE: &'static str = "application/json";

    pub fn new(result: &ScoredResult, date: NaiveDate) -> Result<Self, QuizError> {
        Ok(Self {
            file_name: Self::file_name_for(date),
            body: serde_json::to_string_pretty(result)?,
        })
    }

    /// Export dated with the current UTC day.
    pub fn today(result: &ScoredResult) -> Result<Self, QuizError> {
        Self::new(result, Utc::now().date_naive())
    }

    pub fn file_name_for(date: NaiveDate) -> String {
        format!("quiz-results-{}.json", date.format("%Y-%m-%d"))
    }

    /// `Content-Disposition` value that makes browsers save the file.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }

    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.body).await?;
        info!(path = %path.display(), "results exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ScoredAnswer, ScoredQuestion};
    use uuid::Uuid;

    fn result() -> ScoredResult {
        ScoredResult {
            score: 100,
            section_questions: vec![ScoredQuestion {
                question_title: "Q".into(),
                answers: vec![ScoredAnswer { answer_text: "A".into(), is_correct: true, is_selected: true }],
            }],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn names_file_by_date() {
        let export = ResultsExport::new(&result(), date()).unwrap();
        assert_eq!(export.file_name, "quiz-results-2025-03-07.json");
        assert_eq!(export.content_disposition(), "attachment; filename=\"quiz-results-2025-03-07.json\"");
    }

    #[test]
    fn body_is_two_space_pretty_json() {
        let export = ResultsExport::new(&result(), date()).unwrap();
        assert!(export.body.starts_with("{\n  \"score\": 100,\n  \"sectionQuestions\": [\n    {"));
        let back: ScoredResult = serde_json::from_str(&export.body).unwrap();
        assert_eq!(back, result());
    }

    #[tokio::test]
    async fn writes_into_directory() {
        let dir = std::env::temp_dir().join(format!("quiz-export-{}", Uuid::new_v4()));
        let export = ResultsExport::new(&result(), date()).unwrap();

        let path = export.write_to(&dir).await.unwrap();
        assert_eq!(path, dir.join("quiz-results-2025-03-07.json"));
        assert_eq!(fs::read_to_string(&path).await.unwrap(), export.body);

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
