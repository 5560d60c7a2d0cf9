//! Agent pipeline: credential pool, generation clients, tool selection,
//! evidence seam, and the orchestrator.

pub mod client;
pub mod decision;
pub mod evidence;
pub mod keypool;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod selector;

pub use client::GenerationClient;
pub use decision::ToolDecision;
pub use evidence::{EvidenceQuery, EvidenceResult, EvidenceSource};
pub use keypool::{KeyPool, PoolStatus};
pub use message::{ChatMessage, ChatRequest, Role};
pub use orchestrator::{AgentResult, AgriAgent};
pub use provider::ChatProvider;
pub use selector::{FallbackKeywords, ToolSelector};
