pub mod answers;
pub mod engine;

pub use answers::UserAnswerSet;
pub use engine::{
    is_answered_correctly, is_multi_select, percentage, score, ScoredAnswer, ScoredQuestion,
    ScoredResult, PERFECT_SCORE,
};
