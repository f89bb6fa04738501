//! Answer-length trend and lexical engagement scoring.

use std::sync::LazyLock;

use regex::Regex;

use super::FlowThresholds;
use crate::models::{ConversationTurn, EngagementLevel, LengthAnalysis, LengthTrend};

const EMOTION_KEYWORDS: &[&str] = &[
    "기뻤",
    "슬펐",
    "화났",
    "놀랐",
    "감동",
    "기억에 남",
    "인상적",
    "소중한",
];

const FILLER_WORDS: &[&str] = &["그냥", "별로"];

/// Year, age, or "that time" references.
static SPECIFICITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\d{4}년|\d+살|그때|당시|어릴때").expect("specificity regex")
});

/// Engagement estimate over the most recent answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engagement {
    pub level: EngagementLevel,
    /// Mean per-answer score, rounded to one decimal.
    pub score: f64,
}

/// Compare the last two non-empty answers.
pub fn length_trend(turns: &[ConversationTurn], thresholds: &FlowThresholds) -> LengthAnalysis {
    let lengths: Vec<usize> = turns
        .iter()
        .filter_map(ConversationTurn::answered)
        .map(|a| a.trim().chars().count())
        .collect();

    let &[.., previous, current] = lengths.as_slice() else {
        return LengthAnalysis {
            trend: LengthTrend::Stable,
            current_length: lengths.first().copied().unwrap_or(0),
            previous_length: None,
            change_percent: 0,
        };
    };

    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    let trend = if change < -thresholds.decline_percent {
        LengthTrend::Declining
    } else if change > thresholds.increase_percent {
        LengthTrend::Increasing
    } else {
        LengthTrend::Stable
    };

    LengthAnalysis {
        trend,
        current_length: current,
        previous_length: Some(previous),
        change_percent: (change + 0.5).floor() as i64,
    }
}

/// Score the answered turns among the last `engagement_span` turns.
pub fn engagement(turns: &[ConversationTurn], thresholds: &FlowThresholds) -> Engagement {
    let start = turns.len().saturating_sub(thresholds.engagement_span);
    let answers: Vec<&str> = turns[start..]
        .iter()
        .filter_map(ConversationTurn::answered)
        .collect();

    if answers.is_empty() {
        return Engagement {
            level: EngagementLevel::Low,
            score: 0.0,
        };
    }

    let total: i32 = answers.iter().map(|a| answer_score(a, thresholds)).sum();
    let average = f64::from(total) / answers.len() as f64;

    let level = if average < thresholds.engagement_low {
        EngagementLevel::Low
    } else if average > thresholds.engagement_high {
        EngagementLevel::High
    } else {
        EngagementLevel::Medium
    };

    Engagement {
        level,
        score: (average * 10.0).round() / 10.0,
    }
}

fn answer_score(answer: &str, thresholds: &FlowThresholds) -> i32 {
    let chars = answer.chars().count();
    let mut score = 0;
    if chars > thresholds.detailed_answer_chars {
        score += 1;
    }
    if EMOTION_KEYWORDS.iter().any(|k| answer.contains(k)) {
        score += 1;
    }
    if SPECIFICITY_RE.is_match(answer) {
        score += 1;
    }
    if chars < thresholds.terse_answer_chars || FILLER_WORDS.iter().any(|f| answer.contains(f)) {
        score -= 1;
    }
    score
}
