//! Prompt templates and sampling parameters for both LLM roles.

/// Token budget for the tool-selection call.
pub const DECISION_MAX_TOKENS: u32 = 200;
/// Low temperature keeps the decision output close to pure JSON.
pub const DECISION_TEMPERATURE: f32 = 0.3;

/// Token budget for the answer call.
pub const ANSWER_MAX_TOKENS: u32 = 2000;
/// Temperature for the answer call.
pub const ANSWER_TEMPERATURE: f32 = 0.7;

/// System prompt for the tool-selection role.
pub const DECISION_SYSTEM: &str = "You are a tool router for an agricultural assistant. \
Respond with a single JSON object and nothing else.";

/// Grounding system prompt for the answer role.
pub const ANSWER_SYSTEM: &str = "You are an agricultural advisor helping Indian farmers. \
Strict rules: answer ONLY from the evidence sections provided; never invent \
numbers, prices, or weather values that are not in the evidence; if a section \
says data is unavailable, tell the farmer that data is missing instead of \
guessing; prioritize Telangana farming conditions when advice differs by \
region. Be practical and specific, and answer in simple language.";

/// Builds the user message for the tool-selection call.
#[must_use]
pub fn decision_user(question: &str) -> String {
    format!(
        "Decide which data sources are needed to answer this farmer question.\n\
         Question: {question}\n\n\
         Reply with JSON exactly in this shape:\n\
         {{\"rag\": true, \"weather\": false, \"market\": false, \"water\": false, \"pest\": false}}\n\n\
         rag: agronomy knowledge base (almost always useful)\n\
         weather: current weather conditions\n\
         market: commodity mandi prices\n\
         water: irrigation and groundwater facts\n\
         pest: pest and disease advisories"
    )
}

/// Builds the user message for the answer call from the question and
/// the assembled evidence bundle.
#[must_use]
pub fn answer_user(question: &str, evidence: &str) -> String {
    format!(
        "EVIDENCE:\n{evidence}\n\n\
         FARMER QUESTION: {question}\n\n\
         Give a direct, actionable answer grounded in the evidence above."
    )
}
