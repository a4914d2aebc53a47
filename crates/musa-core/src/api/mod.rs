pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::AssistantClient;
pub use types::{BestMarket, ChatRequest, ChatResponse, ResponseData};

/// Remote side of a conversation
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Lightweight connectivity check, no payload
    async fn ping(&self) -> Result<()>;

    async fn supported_languages(&self) -> Result<Vec<String>>;
}
