//! Keyword-table topic classification.
//!
//! Table order is the tie-break: the first topic with any keyword hit wins.
//! `general` is both the no-match fallback and, in [`consecutive_count`], a
//! wildcard that never breaks a streak.

use serde::{Deserialize, Serialize};

use crate::models::ConversationTurn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Family,
    Childhood,
    Education,
    Career,
    Relationship,
    Hobby,
    Values,
    General,
}

const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Family,
        &["가족", "부모", "형제", "자매", "어머니", "아버지"],
    ),
    (
        Topic::Childhood,
        &["어린", "유년", "초등학교", "어릴 때", "학교"],
    ),
    (
        Topic::Education,
        &["학교", "공부", "대학", "교육", "선생님"],
    ),
    (Topic::Career, &["직업", "회사", "일", "직장", "커리어"]),
    (
        Topic::Relationship,
        &["친구", "연인", "결혼", "사랑", "인간관계"],
    ),
    (Topic::Hobby, &["취미", "좋아하는", "즐기는", "여가"]),
    (
        Topic::Values,
        &["가치관", "신념", "철학", "생각", "중요한"],
    ),
];

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Family => "family",
            Topic::Childhood => "childhood",
            Topic::Education => "education",
            Topic::Career => "career",
            Topic::Relationship => "relationship",
            Topic::Hobby => "hobby",
            Topic::Values => "values",
            Topic::General => "general",
        }
    }
}

/// Classify free text against the topic table.
pub fn classify(text: &str) -> Topic {
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::General)
}

/// Topic of the conversation, judged from the last `span` questions.
pub fn current_topic(turns: &[ConversationTurn], span: usize) -> Topic {
    let start = turns.len().saturating_sub(span);
    let joined = turns[start..]
        .iter()
        .map(|t| t.question.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    classify(&joined)
}

/// Count trailing turns whose own topic is `current` or `general`.
pub fn consecutive_count(turns: &[ConversationTurn], current: Topic) -> usize {
    turns
        .iter()
        .rev()
        .take_while(|t| {
            let topic = classify(&t.question);
            topic == current || topic == Topic::General
        })
        .count()
}
