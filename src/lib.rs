//! Agri-Agent: an agricultural advisory agent for Indian farmers.
//!
//! Answers a farmer's natural-language question by consulting a set of
//! independent evidence sources (semantic knowledge-base search, live
//! weather, commodity prices, water/irrigation facts, pest advisories)
//! and synthesizing a single grounded answer through a remote
//! text-generation API.
//!
//! # Architecture
//!
//! ```text
//! Question → ToolSelector (decision LLM, keyword fallback)
//!   ├── Knowledge-base search (always)
//!   ├── Weather / Market / Water / Pest (as selected)
//!   ├── Evidence bundle (ordered, labeled sections)
//!   └── Answer LLM (grounding prompt) → AgentResult
//! ```
//!
//! Both LLM roles share one [`KeyPool`](agent::KeyPool): a rotating set
//! of API credentials with cooldown-based temporary disablement, so a
//! rate-limited key is retired for all callers at once.

pub mod agent;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod tools;

pub use agent::{AgentResult, AgriAgent, GenerationClient, KeyPool, ToolDecision, ToolSelector};
pub use config::AgriConfig;
pub use error::{AgentError, Result};
