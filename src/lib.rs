//! # Memoir Harness
//!
//! Command-line tooling for AI-assisted autobiography writing, built on
//! [`memoir_core`].
//!
//! Two problems are covered:
//!
//! - **Selection patching.** A passage the user selected is relocated in a
//!   manuscript that may have changed since, and replaced with revised text.
//! - **Conversation flow.** Given the interview so far, decide whether the
//!   next question should dig deeper into the current topic or move on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────┐
//! │  CLI (memoir)│──▶│ memoir-core               │
//! │  config/log  │   │ patch · context · flow    │
//! └──────┬───────┘   │ analysis · store · ...    │
//!        │           └───────────────────────────┘
//!        ▼
//!   files on disk (manuscripts, turns, saved model replies)
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`edit`] | `patch`, `context`, and `intent` commands |
//! | [`advise`] | Flow advice from recorded turns and analyses |
//! | [`chapters`] | Chapter listing |
//! | [`questions`] | Expansion question extraction |

pub mod advise;
pub mod chapters;
pub mod config;
pub mod edit;
pub mod logging;
pub mod questions;
