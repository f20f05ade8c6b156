//! Scoring behaviour over complete quizzes.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use quiz_generator::quiz::{validate, QuestionId, Quiz};
use quiz_generator::scoring::{is_multi_select, score, UserAnswerSet};

fn one_question(answers: Value) -> Quiz {
    validate(&json!({
        "quizTitle": "Scenario",
        "courseSections": [{
            "sectionTitle": "Only",
            "sectionQuestions": [{ "questionTitle": "Q1", "answers": answers }]
        }]
    }))
    .unwrap()
}

fn single() -> Quiz {
    one_question(json!([
        { "answerText": "A", "isCorrect": true },
        { "answerText": "B", "isCorrect": false }
    ]))
}

fn multi() -> Quiz {
    one_question(json!([
        { "answerText": "A", "isCorrect": true },
        { "answerText": "B", "isCorrect": true },
        { "answerText": "C", "isCorrect": false }
    ]))
}

fn picks(texts: &[&str]) -> UserAnswerSet {
    [(QuestionId::new(0), texts.to_vec())].into_iter().collect()
}

#[test]
fn single_select_correct_scores_100() {
    let result = score(&single(), &picks(&["A"]));
    assert_eq!(result.score, 100);
    assert!(result.is_perfect());
}

#[test]
fn single_select_wrong_scores_0() {
    assert_eq!(score(&single(), &picks(&["B"])).score, 0);
}

#[test]
fn multi_select_subset_is_wrong() {
    assert_eq!(score(&multi(), &picks(&["A"])).score, 0);
}

#[test]
fn multi_select_exact_set_is_right() {
    assert_eq!(score(&multi(), &picks(&["A", "B"])).score, 100);
}

#[test]
fn multi_select_superset_is_wrong() {
    assert_eq!(score(&multi(), &picks(&["A", "B", "C"])).score, 0);
}

#[test]
fn half_right_scores_50() {
    let quiz = validate(&json!({
        "quizTitle": "Two",
        "courseSections": [{
            "sectionTitle": "S",
            "sectionQuestions": [
                { "questionTitle": "Q1", "answers": [
                    { "answerText": "A", "isCorrect": true },
                    { "answerText": "B", "isCorrect": false }
                ]},
                { "questionTitle": "Q2", "answers": [
                    { "answerText": "C", "isCorrect": true },
                    { "answerText": "D", "isCorrect": false }
                ]}
            ]
        }]
    }))
    .unwrap();
    let answers: UserAnswerSet =
        [(QuestionId::new(0), vec!["A"]), (QuestionId::new(1), vec!["D"])].into_iter().collect();
    assert_eq!(score(&quiz, &answers).score, 50);
}

#[test]
fn unanswered_quiz_scores_0_and_marks_nothing_selected() {
    let result = score(&multi(), &UserAnswerSet::new());
    assert_eq!(result.score, 0);
    assert!(result.section_questions[0].answers.iter().all(|a| !a.is_selected));
}

fn shuffled_pair() -> (Quiz, Quiz) {
    let q1 = json!({ "questionTitle": "Q1", "answers": [
        { "answerText": "A", "isCorrect": true },
        { "answerText": "B", "isCorrect": false },
        { "answerText": "C", "isCorrect": true }
    ]});
    let q1_shuffled = json!({ "questionTitle": "Q1", "answers": [
        { "answerText": "C", "isCorrect": true },
        { "answerText": "A", "isCorrect": true },
        { "answerText": "B", "isCorrect": false }
    ]});
    let q2 = json!({ "questionTitle": "Q2", "answers": [
        { "answerText": "X", "isCorrect": false },
        { "answerText": "Y", "isCorrect": true }
    ]});
    let wrap = |questions: Vec<Value>| {
        validate(&json!({
            "quizTitle": "Order",
            "courseSections": [{ "sectionTitle": "S", "sectionQuestions": questions }]
        }))
        .unwrap()
    };
    (wrap(vec![q1, q2.clone()]), wrap(vec![q2, q1_shuffled]))
}

/// Same picks expressed against whichever position each question landed in.
fn answers_by_title(quiz: &Quiz, picks: &[(&str, &[&str])]) -> UserAnswerSet {
    picks
        .iter()
        .map(|(title, texts)| {
            let question = quiz.questions().find(|q| q.title() == *title).unwrap();
            (question.id(), texts.to_vec())
        })
        .collect()
}

#[test]
fn score_ignores_answer_and_question_order() {
    let (original, shuffled) = shuffled_pair();
    let picks: &[(&str, &[&str])] = &[("Q1", &["C", "A"]), ("Q2", &["X"])];

    let a = score(&original, &answers_by_title(&original, picks));
    let b = score(&shuffled, &answers_by_title(&shuffled, picks));
    assert_eq!(a.score, 50);
    assert_eq!(a.score, b.score);
}

#[test]
fn score_ignores_section_order() {
    let q = |title: &str, answers: &[(&str, bool)]| {
        let answers: Vec<Value> = answers
            .iter()
            .map(|(text, correct)| json!({ "answerText": text, "isCorrect": correct }))
            .collect();
        json!({ "questionTitle": title, "answers": answers })
    };
    let planets = |reversed: bool| {
        let mut questions = vec![
            q("Largest", &[("Jupiter", true), ("Mars", false)]),
            q("Ringed", &[("Saturn", true), ("Uranus", true), ("Venus", false)]),
        ];
        if reversed {
            questions.reverse();
        }
        json!({ "sectionTitle": "Planets", "sectionQuestions": questions })
    };
    let moons = |reversed: bool| {
        let mut questions = vec![
            q("Titan orbits", &[("Saturn", true), ("Jupiter", false)]),
            q("Io orbits", &[("Jupiter", true), ("Neptune", false)]),
        ];
        if reversed {
            questions.reverse();
        }
        json!({ "sectionTitle": "Moons", "sectionQuestions": questions })
    };

    let original = validate(&json!({
        "quizTitle": "Solar system",
        "courseSections": [planets(false), moons(false)]
    }))
    .unwrap();
    let shuffled = validate(&json!({
        "quizTitle": "Solar system",
        "courseSections": [moons(true), planets(true)]
    }))
    .unwrap();

    let largest = |quiz: &Quiz| quiz.questions().find(|q| q.title() == "Largest").unwrap().id();
    assert_ne!(largest(&original), largest(&shuffled));

    let picks: &[(&str, &[&str])] = &[
        ("Largest", &["Jupiter"]),
        ("Ringed", &["Uranus", "Saturn"]),
        ("Titan orbits", &["Jupiter"]),
        ("Io orbits", &[]),
    ];
    let a = score(&original, &answers_by_title(&original, picks));
    let b = score(&shuffled, &answers_by_title(&shuffled, picks));
    assert_eq!(a.score, 50);
    assert_eq!(b.score, 50);
}

#[test]
fn scoring_is_repeatable() {
    let (quiz, _) = shuffled_pair();
    let answers = answers_by_title(&quiz, &[("Q1", &["A", "C"]), ("Q2", &["Y"])]);
    let first = score(&quiz, &answers);
    let second = score(&quiz, &answers);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn score_stays_in_range_for_every_selection() {
    let quiz = multi();
    let options = ["A", "B", "C"];
    // every subset of the three answers
    for mask in 0u8..8 {
        let chosen: Vec<&str> = options
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, t)| *t)
            .collect();
        let result = score(&quiz, &picks(&chosen));
        assert!(result.score <= 100);
        assert_eq!(result.score == 100, mask == 0b011, "mask {mask:03b}");
    }
}

#[test]
fn multi_select_follows_correct_count() {
    assert!(!is_multi_select(single().questions().next().unwrap()));
    assert!(is_multi_select(multi().questions().next().unwrap()));
}

#[test]
fn revalidation_returns_equal_quiz() {
    let (quiz, _) = shuffled_pair();
    assert_eq!(quiz.revalidate().unwrap(), quiz);
}
