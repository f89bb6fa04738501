//! `memoir advise`: follow-up vs. transition advice for a recorded
//! conversation.
//!
//! The conversation is read from a JSON array of turns. An optional analysis
//! file stands in for the model's `analyzeConversationFlow` function call;
//! when it is missing or unreadable the heuristic decision is used.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memoir_core::analysis::{advise, Advice, ExternalAnalysis, FlowAnalyst, FunctionCall};
use memoir_core::{ConversationTurn, FlowAdvisor, NextQuestion};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::edit::read_text;

/// A turn as stored on disk. Timestamps are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnRecord {
    question: String,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    topic_tag: Option<String>,
}

impl From<TurnRecord> for ConversationTurn {
    fn from(r: TurnRecord) -> Self {
        ConversationTurn {
            question: r.question,
            answer: r.answer,
            timestamp: r.timestamp.unwrap_or_else(Utc::now),
            topic_tag: r.topic_tag,
        }
    }
}

pub fn load_turns(path: &Path) -> Result<Vec<ConversationTurn>> {
    let raw = read_text(path)?;
    let records: Vec<TurnRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse conversation turns in {}", path.display()))?;
    Ok(records.into_iter().map(ConversationTurn::from).collect())
}

/// Replays a saved model response.
///
/// The file holds either a full function call (`{"name": ..., "args": ...}`)
/// or just its arguments.
pub struct RecordedAnalyst {
    path: PathBuf,
}

impl RecordedAnalyst {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FlowAnalyst for RecordedAnalyst {
    async fn analyze(&self, _recent: &[ConversationTurn]) -> Result<ExternalAnalysis> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if value.get("name").is_some() {
            let call: FunctionCall = serde_json::from_value(value)?;
            ExternalAnalysis::from_function_call(&call)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

#[derive(Serialize)]
pub struct AdviceReport {
    #[serde(flatten)]
    pub advice: Advice,
    pub strategy: NextQuestion,
    /// Phrase for the topic-transition prompt, when transitioning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_hint: Option<&'static str>,
}

impl From<Advice> for AdviceReport {
    fn from(advice: Advice) -> Self {
        let strategy = advice.decision.strategy();
        let prompt_hint =
            (strategy == NextQuestion::Transition).then(|| advice.decision.reason.prompt_hint());
        Self {
            advice,
            strategy,
            prompt_hint,
        }
    }
}

pub async fn get_advice(
    config: &Config,
    turns: &[ConversationTurn],
    analysis: Option<&Path>,
) -> AdviceReport {
    let advisor = FlowAdvisor::new(config.flow.clone());
    let advice = match analysis {
        Some(path) => advise(&advisor, &RecordedAnalyst::new(path), turns).await,
        None => Advice::heuristic(advisor.decide(turns)),
    };
    AdviceReport::from(advice)
}

pub async fn run_advise(config: &Config, turns_path: &Path, analysis: Option<&Path>) -> Result<()> {
    let turns = load_turns(turns_path)?;
    let report = get_advice(config, &turns, analysis).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
