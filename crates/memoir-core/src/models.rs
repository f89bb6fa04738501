//! Core data models shared by the patcher and the flow advisor.
//!
//! These types represent the selections, patches, conversation turns, and
//! flow decisions that move between the editing UI, the conversation store,
//! and the question-generation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::topic::Topic;

/// A user-highlighted span of text plus its last-known position.
///
/// Offsets are counted in chars and are advisory only: the document may
/// have changed since the selection was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub text: String,
    #[serde(default)]
    pub approx_start: usize,
    #[serde(default)]
    pub approx_end: usize,
}

impl Selection {
    /// A selection with no usable position hint.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            approx_start: 0,
            approx_end: 0,
        }
    }

    pub fn with_offsets(text: impl Into<String>, approx_start: usize, approx_end: usize) -> Self {
        Self {
            text: text.into(),
            approx_start,
            approx_end,
        }
    }
}

/// A request to replace a located span with new text. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub selection: Selection,
    pub replacement: String,
}

/// One question/answer exchange in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub topic_tag: Option<String>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: Option<&str>) -> Self {
        Self {
            question: question.into(),
            answer: answer.map(str::to_string),
            timestamp: Utc::now(),
            topic_tag: None,
        }
    }

    /// The answer, if one was given and it is not blank.
    pub fn answered(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// Why the advisor did (or did not) recommend a topic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionReason {
    TooManyConsecutiveWithLowEngagement,
    SignificantDecline,
    TooManyConsecutive,
    LowEngagement,
    MultipleFactors,
    Continue,
}

impl TransitionReason {
    /// Phrase inserted into the topic-transition prompt to explain the switch.
    pub fn prompt_hint(self) -> &'static str {
        match self {
            TransitionReason::TooManyConsecutive
            | TransitionReason::TooManyConsecutiveWithLowEngagement => {
                "같은 주제에 대해 충분히 이야기했으므로"
            }
            TransitionReason::SignificantDecline => "답변이 짧아져서 새로운 자극이 필요하므로",
            TransitionReason::LowEngagement => "관심도가 낮아 보여서 다른 주제를 시도하므로",
            TransitionReason::MultipleFactors => "여러 요인으로 주제 전환이 필요하므로",
            TransitionReason::Continue => "새로운 주제를 탐색하기 위해",
        }
    }

    /// Map a free-form reason tag (as returned by an LLM analysis) onto a
    /// known reason. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let reason = match tag.as_str() {
            "too_many_consecutive_with_low_engagement"
            | "consecutive_questions_with_low_engagement" => {
                TransitionReason::TooManyConsecutiveWithLowEngagement
            }
            "significant_decline" | "significant_response_decline" | "response_length_drop" => {
                TransitionReason::SignificantDecline
            }
            "too_many_consecutive" | "too_many_consecutive_questions" => {
                TransitionReason::TooManyConsecutive
            }
            "low_engagement" => TransitionReason::LowEngagement,
            "multiple_factors" | "multiple_decline_indicators" => TransitionReason::MultipleFactors,
            "continue" | "continue_current_topic" | "first_question" => TransitionReason::Continue,
            _ => return None,
        };
        Some(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    /// Parse an engagement label from an external analysis.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "낮음" => Some(EngagementLevel::Low),
            "medium" | "moderate" | "보통" => Some(EngagementLevel::Medium),
            "high" | "높음" => Some(EngagementLevel::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTrend {
    Declining,
    Stable,
    Increasing,
}

/// Answer-length comparison between the two most recent answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthAnalysis {
    pub trend: LengthTrend,
    pub current_length: usize,
    pub previous_length: Option<usize>,
    /// Relative change in percent, rounded half-up.
    pub change_percent: i64,
}

/// Which component produced a [`FlowDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Heuristic,
    External,
}

/// Which question-generation strategy the next turn should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextQuestion {
    FollowUp,
    Transition,
}

/// The advisor's verdict for the next turn. Recomputed every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDecision {
    pub should_transition: bool,
    pub reason: TransitionReason,
    pub consecutive_same_topic_count: usize,
    pub engagement_level: EngagementLevel,
    pub current_topic: Topic,
    pub length: LengthAnalysis,
    pub engagement_score: f64,
    pub source: DecisionSource,
}

impl FlowDecision {
    pub fn strategy(&self) -> NextQuestion {
        if self.should_transition {
            NextQuestion::Transition
        } else {
            NextQuestion::FollowUp
        }
    }
}
