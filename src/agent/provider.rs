//! Generation provider seam.
//!
//! The pipeline talks to the remote generation API only through
//! [`ChatProvider`]. The credential comes in per call: rotation and
//! retry live above this seam, transport below it. Tests substitute
//! scripted providers and never touch the network.

use async_trait::async_trait;

use crate::agent::message::ChatRequest;
use crate::error::Result;

/// A chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends one chat request with the given credential and returns the
    /// assistant message content.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`](crate::error::AgentError::ApiRequest)
    /// on transport or upstream failure, with the HTTP status attached
    /// when one was received, or
    /// [`AgentError::ResponseParse`](crate::error::AgentError::ResponseParse)
    /// when the response body has an unexpected shape.
    async fn chat(&self, api_key: &str, request: &ChatRequest) -> Result<String>;
}
