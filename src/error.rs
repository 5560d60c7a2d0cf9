//! Error types for the agri-agent crate.
//!
//! A single [`AgentError`] enum covers configuration, transport, parsing
//! and orchestration failures. Evidence-source failures are deliberately
//! absent: sources absorb their own errors and report them as data
//! (see [`EvidenceResult`](crate::agent::evidence::EvidenceResult)).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = AgentError> = std::result::Result<T, E>;

/// Errors produced by the agent pipeline.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No generation API key was configured.
    #[error("No API key configured. Set OPENROUTER_API_KEYS or OPENROUTER_API_KEY.")]
    ApiKeyMissing,

    /// Every credential in the pool is cooling down.
    ///
    /// Distinct from all other generation failures so the caller can
    /// render a service-unavailable message instead of a generic error.
    #[error("All API keys exhausted. Please wait up to {cooldown_secs} seconds.")]
    KeysExhausted {
        /// Configured cooldown window in seconds.
        cooldown_secs: u64,
    },

    /// The retry budget was spent without a rate-limit-class failure.
    #[error("Max retries exceeded: {message}")]
    MaxRetries {
        /// Description of the last underlying error.
        message: String,
    },

    /// A remote API call failed.
    #[error("API request failed{}: {message}", status.map_or_else(String::new, |s| format!(" (status {s})")))]
    ApiRequest {
        /// Error description.
        message: String,
        /// HTTP status code, when the response got far enough to have one.
        status: Option<u16>,
    },

    /// A model response could not be parsed into the expected shape.
    #[error("Failed to parse response: {message}")]
    ResponseParse {
        /// What went wrong.
        message: String,
        /// The raw response content, for diagnostics.
        content: String,
    },

    /// The vector index or document store failed to load or query.
    #[error("Index error: {message}")]
    Index {
        /// What went wrong.
        message: String,
    },

    /// A pipeline-level failure (construction, wiring, invariants).
    #[error("Orchestration error: {message}")]
    Orchestration {
        /// What went wrong.
        message: String,
    },
}

impl AgentError {
    /// Returns `true` if this error signals a rate/quota/unavailability
    /// condition, either by status code or by a marker in the message.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::ApiRequest { message, status } => {
                if let Some(code) = status
                    && crate::agent::keypool::RATE_LIMIT_CODES.contains(code)
                {
                    return true;
                }
                let lower = message.to_lowercase();
                message.contains("429") || lower.contains("quota") || lower.contains("rate limit")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_by_status() {
        for code in [429_u16, 402, 503] {
            let err = AgentError::ApiRequest {
                message: "busy".to_string(),
                status: Some(code),
            };
            assert!(err.is_rate_limit(), "status {code} should be rate-limit");
        }
    }

    #[test]
    fn test_rate_limit_by_message_marker() {
        let err = AgentError::ApiRequest {
            message: "upstream said: Rate Limit reached for model".to_string(),
            status: None,
        };
        assert!(err.is_rate_limit());

        let err = AgentError::ApiRequest {
            message: "monthly quota exceeded".to_string(),
            status: None,
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_plain_error_is_not_rate_limit() {
        let err = AgentError::ApiRequest {
            message: "connection reset by peer".to_string(),
            status: Some(500),
        };
        assert!(!err.is_rate_limit());

        assert!(
            !AgentError::MaxRetries {
                message: "quota".to_string()
            }
            .is_rate_limit()
        );
    }

    #[test]
    fn test_display_includes_status() {
        let err = AgentError::ApiRequest {
            message: "nope".to_string(),
            status: Some(503),
        };
        assert!(err.to_string().contains("503"));
    }
}
