//! External flow analysis with heuristic fallback.
//!
//! The conversation flow can be judged by an LLM function call
//! (`analyzeConversationFlow`) that returns a structured verdict plus an
//! empathy message. [`FlowAnalyst`] is the seam for that call; [`advise`]
//! prefers its answer and falls back to [`FlowAdvisor::decide`] whenever the
//! analyst fails, so a decision is always available.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::flow::FlowAdvisor;
use crate::models::{ConversationTurn, DecisionSource, EngagementLevel, FlowDecision, TransitionReason};

/// Name of the function the analysis model is asked to call.
pub const ANALYSIS_FUNCTION: &str = "analyzeConversationFlow";

/// A raw function call as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Followup,
    Transition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    #[serde(default)]
    pub consecutive_questions: Option<f64>,
    #[serde(default)]
    pub emotional_engagement: Option<String>,
    #[serde(default)]
    pub exploration_depth: Option<String>,
    #[serde(default)]
    pub recommended_focus: Option<String>,
}

/// Arguments of an `analyzeConversationFlow` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAnalysis {
    #[serde(default)]
    pub empathy_response: Option<String>,
    pub should_transition: bool,
    #[serde(default)]
    pub transition_reason: Option<String>,
    #[serde(default)]
    pub next_agent_type: Option<AgentType>,
    #[serde(default)]
    pub analysis_details: Option<AnalysisDetails>,
}

impl ExternalAnalysis {
    /// Extract the analysis from a model function call.
    pub fn from_function_call(call: &FunctionCall) -> Result<Self> {
        if call.name != ANALYSIS_FUNCTION {
            bail!("unexpected function call: {}", call.name);
        }
        Ok(serde_json::from_value(call.args.clone())?)
    }

    /// Overlay this verdict on a locally computed decision.
    ///
    /// Topic, streak length, and length trend always come from `local`; the
    /// transition verdict comes from the analysis, and engagement too when the
    /// analysis reports a recognizable level.
    pub fn merge(&self, local: &FlowDecision) -> FlowDecision {
        if let Some(agent) = self.next_agent_type {
            if (agent == AgentType::Transition) != self.should_transition {
                debug!(?agent, should_transition = self.should_transition, "analysis agent type disagrees");
            }
        }

        let reason = self
            .transition_reason
            .as_deref()
            .and_then(TransitionReason::from_tag)
            .unwrap_or(if self.should_transition {
                TransitionReason::MultipleFactors
            } else {
                TransitionReason::Continue
            });

        let engagement_level = self
            .analysis_details
            .as_ref()
            .and_then(|d| d.emotional_engagement.as_deref())
            .and_then(EngagementLevel::from_label)
            .unwrap_or(local.engagement_level);

        FlowDecision {
            should_transition: self.should_transition,
            reason,
            engagement_level,
            source: DecisionSource::External,
            ..local.clone()
        }
    }
}

/// Produces an external flow analysis, normally by calling an LLM.
#[async_trait]
pub trait FlowAnalyst: Send + Sync {
    async fn analyze(&self, recent: &[ConversationTurn]) -> Result<ExternalAnalysis>;
}

/// The decision handed to question generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub decision: FlowDecision,
    /// Immediate empathy message for the user's last answer, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empathy_response: Option<String>,
    /// Free-text reason given by the analyst.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_detail: Option<String>,
    pub fallback_used: bool,
}

impl Advice {
    pub fn heuristic(decision: FlowDecision) -> Self {
        Self {
            decision,
            empathy_response: None,
            reason_detail: None,
            fallback_used: false,
        }
    }
}

/// Ask `analyst` for a verdict, falling back to the heuristic on failure.
pub async fn advise<A>(advisor: &FlowAdvisor, analyst: &A, turns: &[ConversationTurn]) -> Advice
where
    A: FlowAnalyst + ?Sized,
{
    let local = advisor.decide(turns);
    match analyst.analyze(advisor.recent(turns)).await {
        Ok(analysis) => Advice {
            decision: analysis.merge(&local),
            empathy_response: analysis.empathy_response.filter(|s| !s.trim().is_empty()),
            reason_detail: analysis.transition_reason,
            fallback_used: false,
        },
        Err(e) => {
            warn!(error = %e, "flow analysis failed, using heuristic decision");
            Advice {
                fallback_used: true,
                ..Advice::heuristic(local)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::topic::Topic;
    use anyhow::anyhow;

    struct Fixed(Option<ExternalAnalysis>);

    #[async_trait]
    impl FlowAnalyst for Fixed {
        async fn analyze(&self, _recent: &[ConversationTurn]) -> Result<ExternalAnalysis> {
            self.0.clone().ok_or_else(|| anyhow!("model unavailable"))
        }
    }

    fn turns() -> Vec<ConversationTurn> {
        vec![
            ConversationTurn::new("가족에 대해 이야기해 주세요", Some("부모님과 형이 있어요")),
            ConversationTurn::new("어머니는 어떤 분이셨나요?", Some("따뜻한 분이셨어요")),
        ]
    }

    fn parse(json: &str) -> ExternalAnalysis {
        let call: FunctionCall = serde_json::from_str(json).unwrap();
        ExternalAnalysis::from_function_call(&call).unwrap()
    }

    #[test]
    fn test_parse_function_call() {
        let analysis = parse(
            r#"{"name": "analyzeConversationFlow", "args": {
                "empathyResponse": "따뜻한 기억이네요.",
                "shouldTransition": true,
                "transitionReason": "low_engagement",
                "nextAgentType": "transition",
                "analysisDetails": {"consecutiveQuestions": 4, "emotionalEngagement": "low"}
            }}"#,
        );
        assert!(analysis.should_transition);
        assert_eq!(analysis.next_agent_type, Some(AgentType::Transition));
        assert_eq!(
            analysis.analysis_details.unwrap().consecutive_questions,
            Some(4.0)
        );
    }

    #[test]
    fn test_wrong_function_rejected() {
        let call = FunctionCall {
            name: "somethingElse".into(),
            args: serde_json::json!({}),
        };
        assert!(ExternalAnalysis::from_function_call(&call).is_err());
    }

    #[test]
    fn test_merge_keeps_local_counts() {
        let local = FlowAdvisor::default().decide(&turns());
        let analysis = ExternalAnalysis {
            empathy_response: None,
            should_transition: true,
            transition_reason: Some("같은 이야기가 반복됨".into()),
            next_agent_type: Some(AgentType::Transition),
            analysis_details: Some(AnalysisDetails {
                emotional_engagement: Some("high".into()),
                ..AnalysisDetails::default()
            }),
        };
        let merged = analysis.merge(&local);
        assert!(merged.should_transition);
        assert_eq!(merged.reason, TransitionReason::MultipleFactors);
        assert_eq!(merged.engagement_level, EngagementLevel::High);
        assert_eq!(merged.current_topic, Topic::Family);
        assert_eq!(
            merged.consecutive_same_topic_count,
            local.consecutive_same_topic_count
        );
        assert_eq!(merged.source, DecisionSource::External);
    }

    #[tokio::test]
    async fn test_advise_prefers_analyst() {
        let analysis = ExternalAnalysis {
            empathy_response: Some("소중한 이야기 감사합니다.".into()),
            should_transition: false,
            transition_reason: Some("continue_current_topic".into()),
            next_agent_type: Some(AgentType::Followup),
            analysis_details: None,
        };
        let advice = advise(&FlowAdvisor::default(), &Fixed(Some(analysis)), &turns()).await;
        assert!(!advice.fallback_used);
        assert_eq!(advice.decision.source, DecisionSource::External);
        assert_eq!(advice.decision.reason, TransitionReason::Continue);
        assert_eq!(
            advice.empathy_response.as_deref(),
            Some("소중한 이야기 감사합니다.")
        );
    }

    #[tokio::test]
    async fn test_advise_falls_back_on_error() {
        let advisor = FlowAdvisor::default();
        let advice = advise(&advisor, &Fixed(None), &turns()).await;
        assert!(advice.fallback_used);
        assert_eq!(advice.decision, advisor.decide(&turns()));
        assert!(advice.empathy_response.is_none());
    }
}
