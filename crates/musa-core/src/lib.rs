pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod language;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{AssistantBackend, AssistantClient, ChatRequest, ChatResponse, ResponseData};
pub use config::Config;
pub use context::{extract, ContextField, ConversationContext, ExtractionResult};
pub use error::ApiError;
pub use format::{format_message, CalendarStamp, Enrichment, OutboundMessage};
pub use language::ChatLanguage;
pub use session::ChatSession;
pub use state::{ChatRole, ChatTurn, ConnectionStatus};
