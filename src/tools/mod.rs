//! Evidence tools: knowledge-base search plus four live/static sources.

pub mod knowledge;
pub mod market;
pub mod pest;
pub mod water;
pub mod weather;

pub use knowledge::{KnowledgeHit, KnowledgeSearch, SearchOutcome, cosine_from_l2_squared};
pub use market::MarketPriceTool;
pub use pest::PestAdvisoryTool;
pub use water::WaterFactsTool;
pub use weather::WeatherTool;
