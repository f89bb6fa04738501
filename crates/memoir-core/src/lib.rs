//! # Memoir Core
//!
//! Shared, WASM-safe logic for Memoir Harness: data models, selection
//! patching, context extraction, conversation flow decisions, and the
//! manuscript helpers built on top of them.
//!
//! This crate contains no tokio, filesystem I/O, or other native-only
//! dependencies. Every function here is a pure computation over its
//! arguments; the caller owns the manuscript and the conversation history.

pub mod analysis;
pub mod context;
pub mod flow;
pub mod intent;
pub mod manuscript;
pub mod models;
pub mod patch;
pub mod questions;
pub mod store;

pub use analysis::{advise, Advice, ExternalAnalysis, FlowAnalyst};
pub use context::{extract_context, ContextWindow};
pub use flow::{FlowAdvisor, FlowThresholds};
pub use intent::EditIntent;
pub use models::{
    ConversationTurn, EngagementLevel, FlowDecision, LengthTrend, NextQuestion, Patch, Selection,
    TransitionReason,
};
pub use patch::{apply, apply_patch, MatchTier, PatchError, Patched};
pub use store::ManuscriptStore;
