//! Expansion questions parsed out of a model reply.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on questions returned to the user.
pub const MAX_QUESTIONS: usize = 5;

const MIN_QUESTION_CHARS: usize = 5;
const MAX_QUESTION_CHARS: usize = 200;
const MIN_FALLBACK_CHARS: usize = 10;

/// Phrases that mean the model is talking about itself.
const SELF_REFERENCES: &[&str] = &["AI", "인공지능"];

static LABELED_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:\*\*)?질문\s*\d+(?:\*\*)?\s*[:.]\s*(.+)$").expect("labeled question regex")
});

static LISTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:[-*•]|\d+[.)])\s*(.+)$").expect("listed question regex")
});

fn long_enough(q: &str, min: usize) -> bool {
    q.chars().count() > min
}

/// Extract up to [`MAX_QUESTIONS`] questions from `reply`.
///
/// Lines labeled `질문 N:` (optionally bold) are taken as-is; numbered or
/// bulleted lines are taken when they contain `?`. When no line qualifies,
/// the reply is split on `?` and each long enough piece becomes a question.
pub fn parse_questions(reply: &str) -> Vec<String> {
    let mut questions = Vec::new();

    for line in reply.lines().map(str::trim) {
        let candidate = if let Some(caps) = LABELED_RE.captures(line) {
            Some(caps[1].trim().to_string())
        } else if line.contains('?') {
            LISTED_RE.captures(line).map(|caps| caps[1].trim().to_string())
        } else {
            None
        };
        if let Some(q) = candidate.filter(|q| long_enough(q, MIN_QUESTION_CHARS)) {
            questions.push(q);
        }
    }

    if questions.is_empty() && reply.contains('?') {
        return reply
            .split('?')
            .map(str::trim)
            .filter(|piece| long_enough(piece, MIN_FALLBACK_CHARS))
            .take(MAX_QUESTIONS)
            .map(|piece| format!("{piece}?"))
            .collect();
    }

    questions.truncate(MAX_QUESTIONS);
    questions
}

/// Drop questions that are too short or long, lack `?`, or refer to the model.
pub fn validate_questions(questions: Vec<String>) -> Vec<String> {
    questions
        .into_iter()
        .filter(|q| {
            let chars = q.chars().count();
            chars > MIN_QUESTION_CHARS
                && chars < MAX_QUESTION_CHARS
                && q.contains('?')
                && !SELF_REFERENCES.iter().any(|s| q.contains(s))
        })
        .collect()
}
