//! Follow-up vs. topic-transition decisions.
//!
//! [`FlowAdvisor::decide`] is a pure function of the trailing conversation
//! window. It carries no state between calls and has no failure cases, so it
//! can always stand in when an external analysis is unavailable (see
//! [`crate::analysis`]).
//!
//! # Decision policy
//!
//! 1. Classify the current topic from the last questions.
//! 2. Count trailing same-topic turns (`general` never breaks the streak).
//! 3. Compare the last two answer lengths.
//! 4. Score engagement over the last answers.
//! 5. Transition only when a *required* condition (long streak or steep
//!    length decline) holds together with at least one *additional* signal.
//!
//! Every threshold lives in [`FlowThresholds`]; the defaults are empirically
//! chosen and meant to be tuned.

pub mod signals;
pub mod topic;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    ConversationTurn, DecisionSource, EngagementLevel, FlowDecision, LengthAnalysis, LengthTrend,
    TransitionReason,
};
use signals::Engagement;
use topic::Topic;

pub const DEFAULT_WINDOW: usize = 6;
pub const DEFAULT_TOPIC_SPAN: usize = 3;
pub const DEFAULT_ENGAGEMENT_SPAN: usize = 3;
pub const DEFAULT_CONSECUTIVE_LIMIT: usize = 6;
pub const DEFAULT_DECLINE_PERCENT: f64 = 40.0;
pub const DEFAULT_INCREASE_PERCENT: f64 = 40.0;
pub const DEFAULT_SIGNIFICANT_DECLINE_PERCENT: f64 = 60.0;
pub const DEFAULT_ENGAGEMENT_LOW: f64 = 0.5;
pub const DEFAULT_ENGAGEMENT_HIGH: f64 = 1.5;
pub const DEFAULT_DETAILED_ANSWER_CHARS: usize = 100;
pub const DEFAULT_TERSE_ANSWER_CHARS: usize = 20;

/// Tunable heuristic thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowThresholds {
    /// Trailing turns the advisor looks at.
    pub window: usize,
    /// Questions concatenated to identify the current topic.
    pub topic_span: usize,
    /// Turns scored for engagement.
    pub engagement_span: usize,
    /// Same-topic streak that makes a transition eligible.
    pub consecutive_limit: usize,
    /// Length drop (percent) classified as declining.
    pub decline_percent: f64,
    /// Length rise (percent) classified as increasing.
    pub increase_percent: f64,
    /// Length drop (percent) that makes a transition eligible on its own.
    pub significant_decline_percent: f64,
    /// Average engagement score below which engagement is low.
    pub engagement_low: f64,
    /// Average engagement score above which engagement is high.
    pub engagement_high: f64,
    pub detailed_answer_chars: usize,
    pub terse_answer_chars: usize,
}

impl Default for FlowThresholds {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            topic_span: DEFAULT_TOPIC_SPAN,
            engagement_span: DEFAULT_ENGAGEMENT_SPAN,
            consecutive_limit: DEFAULT_CONSECUTIVE_LIMIT,
            decline_percent: DEFAULT_DECLINE_PERCENT,
            increase_percent: DEFAULT_INCREASE_PERCENT,
            significant_decline_percent: DEFAULT_SIGNIFICANT_DECLINE_PERCENT,
            engagement_low: DEFAULT_ENGAGEMENT_LOW,
            engagement_high: DEFAULT_ENGAGEMENT_HIGH,
            detailed_answer_chars: DEFAULT_DETAILED_ANSWER_CHARS,
            terse_answer_chars: DEFAULT_TERSE_ANSWER_CHARS,
        }
    }
}

/// Heuristic follow-up vs. transition advisor.
#[derive(Debug, Clone, Default)]
pub struct FlowAdvisor {
    thresholds: FlowThresholds,
}

impl FlowAdvisor {
    pub fn new(thresholds: FlowThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FlowThresholds {
        &self.thresholds
    }

    /// The trailing window of `turns` that decisions are based on.
    pub fn recent<'a>(&self, turns: &'a [ConversationTurn]) -> &'a [ConversationTurn] {
        &turns[turns.len().saturating_sub(self.thresholds.window)..]
    }

    /// Decide whether the next turn should change topic.
    pub fn decide(&self, turns: &[ConversationTurn]) -> FlowDecision {
        let recent = self.recent(turns);
        if recent.is_empty() {
            return FlowDecision {
                should_transition: false,
                reason: TransitionReason::Continue,
                consecutive_same_topic_count: 0,
                engagement_level: EngagementLevel::Low,
                current_topic: Topic::General,
                length: LengthAnalysis {
                    trend: LengthTrend::Stable,
                    current_length: 0,
                    previous_length: None,
                    change_percent: 0,
                },
                engagement_score: 0.0,
                source: DecisionSource::Heuristic,
            };
        }

        let t = &self.thresholds;
        let current_topic = topic::current_topic(recent, t.topic_span);
        let consecutive = topic::consecutive_count(recent, current_topic);
        let length = signals::length_trend(recent, t);
        let engagement = signals::engagement(recent, t);

        let should_transition = self.should_transition(consecutive, &length, &engagement);
        let reason = self.reason(consecutive, &length, &engagement);

        debug!(
            topic = current_topic.as_str(),
            consecutive,
            change_percent = length.change_percent,
            engagement = ?engagement.level,
            should_transition,
            ?reason,
            "flow decision"
        );

        FlowDecision {
            should_transition,
            reason,
            consecutive_same_topic_count: consecutive,
            engagement_level: engagement.level,
            current_topic,
            length,
            engagement_score: engagement.score,
            source: DecisionSource::Heuristic,
        }
    }

    fn long_streak(&self, consecutive: usize) -> bool {
        consecutive >= self.thresholds.consecutive_limit
    }

    fn declined_by(&self, length: &LengthAnalysis, percent: f64) -> bool {
        length.trend == LengthTrend::Declining && (length.change_percent as f64) < -percent
    }

    fn should_transition(
        &self,
        consecutive: usize,
        length: &LengthAnalysis,
        engagement: &Engagement,
    ) -> bool {
        let t = &self.thresholds;
        let required = self.long_streak(consecutive)
            || self.declined_by(length, t.significant_decline_percent);
        if !required {
            return false;
        }

        let additional = [
            engagement.level == EngagementLevel::Low,
            self.declined_by(length, t.decline_percent),
            self.long_streak(consecutive) && engagement.level != EngagementLevel::High,
        ];
        additional.iter().any(|signal| *signal)
    }

    fn reason(
        &self,
        consecutive: usize,
        length: &LengthAnalysis,
        engagement: &Engagement,
    ) -> TransitionReason {
        let low = engagement.level == EngagementLevel::Low;
        if self.long_streak(consecutive) && low {
            TransitionReason::TooManyConsecutiveWithLowEngagement
        } else if self.declined_by(length, self.thresholds.significant_decline_percent) {
            TransitionReason::SignificantDecline
        } else if self.long_streak(consecutive) {
            TransitionReason::TooManyConsecutive
        } else if low && length.trend == LengthTrend::Declining {
            TransitionReason::MultipleFactors
        } else {
            TransitionReason::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NextQuestion;

    const FAMILY_QUESTIONS: [&str; 6] = [
        "어머니는 어떤 분이셨나요?",
        "아버지와의 추억이 있나요?",
        "형제들과 자주 다투었나요?",
        "가족 여행을 간 적이 있나요?",
        "부모님께 배운 것은 무엇인가요?",
        "자매와 사이가 좋았나요?",
    ];

    fn family_turns(answer: &str) -> Vec<ConversationTurn> {
        FAMILY_QUESTIONS
            .iter()
            .map(|q| ConversationTurn::new(*q, Some(answer)))
            .collect()
    }

    fn rich_answer() -> String {
        format!(
            "1978년 겨울, 어머니가 처음으로 직접 뜬 목도리를 주셨을 때 정말 기뻤어요. {}",
            "그 따뜻함은 아직도 잊을 수 없는 기억입니다. ".repeat(3)
        )
    }

    #[test]
    fn test_empty_history_continues() {
        let decision = FlowAdvisor::default().decide(&[]);
        assert!(!decision.should_transition);
        assert_eq!(decision.reason, TransitionReason::Continue);
        assert_eq!(decision.consecutive_same_topic_count, 0);
        assert_eq!(decision.strategy(), NextQuestion::FollowUp);
    }

    #[test]
    fn test_long_streak_with_low_engagement_transitions() {
        let decision = FlowAdvisor::default().decide(&family_turns("그냥 그래요"));
        assert_eq!(decision.current_topic, Topic::Family);
        assert_eq!(decision.consecutive_same_topic_count, 6);
        assert_eq!(decision.engagement_level, EngagementLevel::Low);
        assert!(decision.should_transition);
        assert_eq!(
            decision.reason,
            TransitionReason::TooManyConsecutiveWithLowEngagement
        );
        assert_eq!(decision.strategy(), NextQuestion::Transition);
    }

    #[test]
    fn test_long_streak_alone_is_not_enough() {
        let decision = FlowAdvisor::default().decide(&family_turns(&rich_answer()));
        assert_eq!(decision.consecutive_same_topic_count, 6);
        assert_eq!(decision.engagement_level, EngagementLevel::High);
        assert_eq!(decision.length.trend, LengthTrend::Stable);
        assert!(!decision.should_transition);
        assert_eq!(decision.reason, TransitionReason::TooManyConsecutive);
    }

    #[test]
    fn test_significant_decline_transitions() {
        let long = rich_answer();
        let turns = vec![
            ConversationTurn::new("어머니는 어떤 분이셨나요?", Some(&long)),
            ConversationTurn::new("직장 생활은 어땠나요?", Some("그냥 다녔어요")),
        ];
        let decision = FlowAdvisor::default().decide(&turns);
        assert_eq!(decision.length.trend, LengthTrend::Declining);
        assert!(decision.length.change_percent < -60);
        assert!(decision.should_transition);
        assert_eq!(decision.reason, TransitionReason::SignificantDecline);
    }

    #[test]
    fn test_mild_decline_keeps_topic() {
        let turns = vec![
            ConversationTurn::new("친구 이야기를 해주세요", Some(&"가".repeat(120))),
            ConversationTurn::new("그 친구와는 지금도 연락하나요?", Some(&"가".repeat(60))),
        ];
        let decision = FlowAdvisor::default().decide(&turns);
        assert_eq!(decision.length.trend, LengthTrend::Declining);
        assert_eq!(decision.engagement_level, EngagementLevel::Medium);
        assert!(!decision.should_transition);
        assert_eq!(decision.reason, TransitionReason::Continue);
    }

    #[test]
    fn test_window_limits_streak() {
        let mut turns = family_turns("그냥요");
        turns.extend(family_turns("그냥요"));
        let decision = FlowAdvisor::default().decide(&turns);
        assert_eq!(decision.consecutive_same_topic_count, DEFAULT_WINDOW);
    }

    #[test]
    fn test_custom_thresholds() {
        let advisor = FlowAdvisor::new(FlowThresholds {
            consecutive_limit: 3,
            ..FlowThresholds::default()
        });
        let turns = &family_turns("별로 기억이 안 나요")[..3];
        let decision = advisor.decide(turns);
        assert!(decision.should_transition);
        assert_eq!(
            decision.reason,
            TransitionReason::TooManyConsecutiveWithLowEngagement
        );
    }

    #[test]
    fn test_decide_is_deterministic() {
        let turns = family_turns("그냥 그래요");
        let advisor = FlowAdvisor::default();
        assert_eq!(advisor.decide(&turns), advisor.decide(&turns));
    }
}
